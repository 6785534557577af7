use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The request never completed (connect, timeout, broken body).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed ledger response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The ledger answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("invalid ledger url: {0}")]
    InvalidUrl(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("wallet {0} is already stored")]
    DuplicateWallet(String),

    #[error("unknown wallet {0}")]
    UnknownWallet(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance { available: f64, requested: f64 },
}

impl ConsoleError {
    /// True when the ledger was reached and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ConsoleError::Rejected(_))
    }

    /// True for failures caught locally before any request was sent.
    pub fn is_local_guard(&self) -> bool {
        matches!(
            self,
            ConsoleError::DuplicateWallet(_)
                | ConsoleError::UnknownWallet(_)
                | ConsoleError::InvalidAmount(_)
                | ConsoleError::InsufficientBalance { .. }
        )
    }
}
