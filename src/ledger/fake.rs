//! Scripted in-memory ledger for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::client::LedgerApi;
use super::model::{
    Block, COINBASE_SENDER, ChainSnapshot, FAUCET_SENDER, FaucetGrant, MineReport, MiningStats,
    NewWallet, PendingSnapshot, Transaction, ValidationReport,
};
use crate::error::{ConsoleError, Result};
use crate::wallet::Wallet;

pub fn tx(sender: &str, receiver: &str, amount: f64) -> Transaction {
    Transaction {
        sender_address: sender.to_string(),
        receiver_address: receiver.to_string(),
        amount,
        sender_pubkey: None,
        signature: None,
    }
}

pub struct FakeState {
    pub chain: Vec<Block>,
    pub pending: Vec<Transaction>,
    pub stats: MiningStats,
    pub balances: HashMap<String, f64>,
    pub validation: ValidationReport,
    pub next_wallets: Vec<NewWallet>,
    /// Endpoint names that answer with `success: false`.
    pub rejecting: HashSet<&'static str>,
    pub mine_time: f64,
    pub calls: Vec<String>,
}

pub struct FakeLedger {
    pub state: Mutex<FakeState>,
    mine_gate: Option<Arc<Notify>>,
    chain_gate: Option<Arc<Notify>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        let genesis = Block {
            index: 0,
            timestamp: 1_700_000_000,
            hash: Some("000genesis".into()),
            previous_hash: "0".into(),
            nonce: 0,
            difficulty: Some(1),
            mining_time: None,
            transactions: Vec::new(),
        };
        Self {
            state: Mutex::new(FakeState {
                chain: vec![genesis],
                pending: Vec::new(),
                stats: MiningStats {
                    current_difficulty: 4,
                    average_mining_time: 2.5,
                    blocks_until_next_difficulty: 3,
                    difficulty_increment_interval: 10,
                },
                balances: HashMap::new(),
                validation: ValidationReport {
                    valid: true,
                    total_blocks: 1,
                    errors: Vec::new(),
                },
                next_wallets: Vec::new(),
                rejecting: HashSet::new(),
                mine_time: 2.5,
                calls: Vec::new(),
            }),
            mine_gate: None,
            chain_gate: None,
        }
    }

    /// Hold every `mine` call until the returned `Notify` is signalled.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut ledger = Self::new();
        ledger.mine_gate = Some(gate.clone());
        (ledger, gate)
    }

    /// Hold every `chain` fetch until the returned `Notify` is signalled.
    pub fn with_chain_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.chain_gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_pending(self, txs: Vec<Transaction>) -> Self {
        self.state.lock().unwrap().pending = txs;
        self
    }

    pub fn set_balance(&self, address: &str, balance: f64) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(address.to_string(), balance);
    }

    pub fn reject(&self, endpoint: &'static str) {
        self.state.lock().unwrap().rejecting.insert(endpoint);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String, endpoint: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.rejecting.contains(endpoint) {
            return Err(ConsoleError::Rejected(format!("{endpoint} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn create_wallet(&self) -> Result<NewWallet> {
        self.record("create_wallet".into(), "create_wallet")?;
        let mut state = self.state.lock().unwrap();
        if state.next_wallets.is_empty() {
            let n = state.calls.len();
            return Ok(NewWallet {
                address: format!("W{n}"),
                public_key: format!("pubkey-{n}"),
            });
        }
        Ok(state.next_wallets.remove(0))
    }

    async fn delete_wallet(&self, address: &str) -> Result<()> {
        self.record(format!("delete_wallet:{address}"), "delete_wallet")
    }

    async fn balance(&self, address: &str) -> Result<f64> {
        self.record(format!("balance:{address}"), "balance")?;
        let state = self.state.lock().unwrap();
        Ok(state.balances.get(address).copied().unwrap_or(0.0))
    }

    async fn request_faucet(&self, address: &str) -> Result<FaucetGrant> {
        self.record(format!("faucet:{address}"), "faucet")?;
        let mut state = self.state.lock().unwrap();
        state.pending.push(tx(FAUCET_SENDER, address, 100.0));
        Ok(FaucetGrant {
            amount: 100.0,
            message: None,
        })
    }

    async fn submit_transaction(
        &self,
        sender: &Wallet,
        receiver: &str,
        amount: f64,
    ) -> Result<()> {
        self.record(
            format!("transaction:{}->{receiver}:{amount}", sender.address),
            "transaction",
        )?;
        let mut state = self.state.lock().unwrap();
        let mut t = tx(&sender.address, receiver, amount);
        t.sender_pubkey = Some(sender.public_key.clone());
        state.pending.push(t);
        Ok(())
    }

    async fn mine(&self, miner_address: Option<&str>) -> Result<MineReport> {
        self.record(format!("mine:{}", miner_address.unwrap_or("-")), "mine")?;
        if let Some(gate) = &self.mine_gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.pending.is_empty() {
            return Err(ConsoleError::Rejected("No transactions to mine".into()));
        }
        let mut transactions: Vec<Transaction> = state.pending.drain(..).collect();
        if let Some(miner) = miner_address {
            transactions.push(tx(COINBASE_SENDER, miner, 50.0));
        }
        for t in &transactions {
            *state.balances.entry(t.receiver_address.clone()).or_default() += t.amount;
            if !t.is_system_credit() {
                *state.balances.entry(t.sender_address.clone()).or_default() -= t.amount;
            }
        }

        let index = state.chain.len() as u64;
        let previous_hash = state
            .chain
            .last()
            .and_then(|b| b.hash.clone())
            .unwrap_or_default();
        let difficulty = state.stats.current_difficulty;
        let mining_time = state.mine_time;
        state.chain.push(Block {
            index,
            timestamp: 1_700_000_000 + index as i64 * 60,
            hash: Some(format!("0000block{index}")),
            previous_hash,
            nonce: 42 + index,
            difficulty: Some(difficulty),
            mining_time: Some(mining_time),
            transactions,
        });
        state.stats.blocks_until_next_difficulty -= 1;

        Ok(MineReport {
            message: format!("Block #{index} mined successfully"),
            mining_time: Some(mining_time),
            difficulty: Some(difficulty),
            block_index: Some(index),
            mining_reward: miner_address.map(|_| 50.0),
        })
    }

    async fn chain(&self) -> Result<ChainSnapshot> {
        self.record("chain".into(), "chain")?;
        if let Some(gate) = &self.chain_gate {
            gate.notified().await;
        }
        let state = self.state.lock().unwrap();
        Ok(ChainSnapshot {
            length: state.chain.len(),
            chain: state.chain.clone(),
        })
    }

    async fn pending(&self) -> Result<PendingSnapshot> {
        self.record("pending".into(), "pending")?;
        let state = self.state.lock().unwrap();
        Ok(PendingSnapshot {
            count: state.pending.len(),
            transactions: state.pending.clone(),
        })
    }

    async fn mining_stats(&self) -> Result<MiningStats> {
        self.record("stats".into(), "stats")?;
        Ok(self.state.lock().unwrap().stats.clone())
    }

    async fn validate_chain(&self) -> Result<ValidationReport> {
        self.record("validate".into(), "validate")?;
        Ok(self.state.lock().unwrap().validation.clone())
    }
}
