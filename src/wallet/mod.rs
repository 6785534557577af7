pub mod model;
pub mod store;

pub use model::Wallet;
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedWallets, WalletStore};

/// Storage key holding the serialized wallet list.
pub const WALLETS_KEY: &str = "wallets";
