pub mod client;
pub mod model;

#[cfg(test)]
pub mod fake;

pub use client::{HttpLedgerClient, LedgerApi};
pub use model::{
    Block, ChainSnapshot, FaucetGrant, MineReport, MiningStats, NewWallet, PendingSnapshot,
    Transaction, ValidationReport,
};
