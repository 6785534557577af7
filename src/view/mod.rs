//! Text projections of the wallet store and the server snapshots.
//! Nothing here keeps state; `cache` holds the last rendering per view.

pub mod cache;
pub mod format;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

use crate::ledger::{Block, ChainSnapshot, MiningStats, PendingSnapshot, Transaction, ValidationReport};
use crate::mining::MiningStatus;
use crate::snapshot::{Snapshots, View};
use crate::wallet::Wallet;
use self::format::{
    adjustment_progress, difficulty_bar, format_amount, format_duration, format_timestamp,
    short_address, truncate,
};

pub use cache::RenderedViews;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }
}

const PUBKEY_PREVIEW_CHARS: usize = 40;

pub fn render_wallets(wallets: &[Wallet], balances: &HashMap<String, f64>) -> String {
    if wallets.is_empty() {
        return "No wallets created yet. Create one to get started!".to_string();
    }
    let mut out = String::new();
    for (i, wallet) in wallets.iter().enumerate() {
        let balance = match balances.get(&wallet.address) {
            Some(b) => format!("{} coins", format_amount(*b)),
            None => "Loading...".to_string(),
        };
        let _ = writeln!(out, "Wallet #{}", i + 1);
        let _ = writeln!(out, "  Address: {}", wallet.address);
        let _ = writeln!(
            out,
            "  Public Key: {}...",
            truncate(&wallet.public_key, PUBKEY_PREVIEW_CHARS)
        );
        let _ = writeln!(out, "  Balance: {balance}");
    }
    out
}

pub fn render_sender_options(wallets: &[Wallet]) -> String {
    let mut out = String::from("Select a wallet...\n");
    for (i, wallet) in wallets.iter().enumerate() {
        let _ = writeln!(out, "Wallet #{} ({})", i + 1, wallet.address);
    }
    out
}

pub fn render_miner_options(wallets: &[Wallet]) -> String {
    let mut out = String::from("No miner reward\n");
    for (i, wallet) in wallets.iter().enumerate() {
        let _ = writeln!(out, "Wallet #{} - {}", i + 1, wallet.address);
    }
    out
}

pub fn render_transaction(tx: &Transaction) -> String {
    let sender = if tx.is_system_credit() {
        format!("{} ⭐", tx.sender_address)
    } else {
        short_address(&tx.sender_address)
    };
    format!(
        "{sender} → {} {} coins",
        short_address(&tx.receiver_address),
        format_amount(tx.amount)
    )
}

fn render_block(out: &mut String, block: &Block) {
    let _ = writeln!(out, "Block #{}  {}", block.index, format_timestamp(block.timestamp));
    let _ = writeln!(out, "  Hash: {}", block.hash.as_deref().unwrap_or("Pending..."));
    let _ = writeln!(out, "  Previous Hash: {}", block.previous_hash);
    let _ = writeln!(out, "  Nonce: {}", block.nonce);
    match block.difficulty {
        Some(d) => {
            let _ = writeln!(out, "  Difficulty: {d} {}", difficulty_bar(d));
        }
        None => {
            let _ = writeln!(out, "  Difficulty: n/a");
        }
    }
    if let Some(t) = block.mining_time {
        let _ = writeln!(out, "  Mining Time: {}", format_duration(t));
    }
    let _ = writeln!(out, "  Transactions: {}", block.transactions.len());
    for tx in &block.transactions {
        let _ = writeln!(out, "    {}", render_transaction(tx));
    }
}

/// Chain view, newest block first.
pub fn render_chain(chain: Option<&ChainSnapshot>) -> String {
    let Some(chain) = chain else {
        return "Loading blockchain...".to_string();
    };
    let mut out = format!("Blocks: {}\n", chain.length);
    if chain.chain.is_empty() {
        out.push_str("No blocks in chain\n");
        return out;
    }
    for block in chain.chain.iter().rev() {
        render_block(&mut out, block);
    }
    out
}

pub fn render_pending(pending: Option<&PendingSnapshot>) -> String {
    let Some(pending) = pending else {
        return "Loading pending transactions...".to_string();
    };
    let mut out = format!("Pending: {}\n", pending.count);
    if pending.count == 0 {
        out.push_str("No pending transactions\n");
        return out;
    }
    for tx in &pending.transactions {
        let _ = writeln!(out, "[unconfirmed] {}", render_transaction(tx));
    }
    out
}

pub fn render_stats(stats: Option<&MiningStats>) -> String {
    let Some(stats) = stats else {
        return "Loading mining stats...".to_string();
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Difficulty: {} {}",
        stats.current_difficulty,
        difficulty_bar(stats.current_difficulty)
    );
    let _ = writeln!(out, "Average Mining Time: {}", format_duration(stats.average_mining_time));
    let _ = writeln!(out, "Blocks Until Adjustment: {}", stats.blocks_until_next_difficulty);
    let _ = writeln!(out, "Adjustment Progress: {:.1}%", adjustment_progress(stats));
    out
}

pub fn render_validation(report: &ValidationReport) -> StatusMessage {
    if report.valid {
        return StatusMessage::success(format!(
            "✅ Blockchain is valid ({} blocks)",
            report.total_blocks
        ));
    }
    let mut text = format!("❌ Blockchain is invalid ({} blocks):", report.total_blocks);
    for error in &report.errors {
        let _ = write!(text, "\n  - {error}");
    }
    StatusMessage::error(text)
}

pub fn render_mining_status(status: &MiningStatus) -> String {
    let trigger = if status.enabled { "ready" } else { "disabled" };
    match &status.message {
        Some(msg) => format!("Mine: {trigger}\n{}\n", msg.text),
        None => format!("Mine: {trigger}\n"),
    }
}

/// Render one view from the current state.
pub fn render(view: View, wallets: &[Wallet], snapshots: &Snapshots) -> String {
    match view {
        View::Wallets => {
            let mut out = render_wallets(wallets, &snapshots.balances);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("\nSender:\n");
            out.push_str(&render_sender_options(wallets));
            out.push_str("\nMiner:\n");
            out.push_str(&render_miner_options(wallets));
            out
        }
        View::Chain => render_chain(snapshots.chain.as_ref()),
        View::Pending => render_pending(snapshots.pending.as_ref()),
        View::Stats => render_stats(snapshots.stats.as_ref()),
        View::Validation => match &snapshots.validation {
            Some(report) => render_validation(report).text,
            None => "Chain not validated yet".to_string(),
        },
    }
}
