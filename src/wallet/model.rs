use serde::{Deserialize, Serialize};

/// A wallet remembered locally. Both fields are issued by the ledger service
/// and never change once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub public_key: String,
}

impl Wallet {
    pub fn new(address: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            public_key: public_key.into(),
        }
    }
}
