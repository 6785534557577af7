use serde::{Deserialize, Serialize};

/// Sender used by the ledger for block rewards.
pub const COINBASE_SENDER: &str = "COINBASE";
/// Sender used by the ledger for faucet credits.
pub const FAUCET_SENDER: &str = "FAUCET";

/* ---------- Chain ---------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_address: String,
    pub receiver_address: String,
    pub amount: f64,
    #[serde(default)]
    pub sender_pubkey: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Transaction {
    /// Credits issued by the ledger itself rather than by a peer.
    pub fn is_system_credit(&self) -> bool {
        self.sender_address == COINBASE_SENDER || self.sender_address == FAUCET_SENDER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    #[serde(default)]
    pub hash: Option<String>, // absent while still pending
    pub previous_hash: String,
    pub nonce: u64,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub mining_time: Option<f64>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingSnapshot {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningStats {
    pub current_difficulty: u32,
    pub average_mining_time: f64,
    pub blocks_until_next_difficulty: i64,
    pub difficulty_increment_interval: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub total_blocks: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

/* ---------- Wallet / faucet / tx ---------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWallet {
    pub address: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

#[derive(Serialize)]
pub struct FaucetRequest<'a> {
    pub address: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaucetGrant {
    pub amount: f64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionRequest<'a> {
    pub sender_address: &'a str,
    pub sender_pubkey: &'a str,
    pub receiver_address: &'a str,
    pub amount: f64,
}

/* ---------- Mining ---------- */

#[derive(Serialize)]
pub struct MineRequest<'a> {
    pub miner_address: Option<&'a str>, // serialized as null when absent
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineReport {
    pub message: String,
    #[serde(default)]
    pub mining_time: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub block_index: Option<u64>,
    #[serde(default)]
    pub mining_reward: Option<f64>,
}
