use thiserror::Error;

/// Failure kinds surfaced by the marketplace flows.
///
/// Every variant renders as the human readable text that ends up on the
/// notification banner.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please configure a wallet provider (RPC_URL and WALLET_KEY)")]
    ProviderMissing,

    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn read(err: impl std::fmt::Display) -> Self {
        AppError::ReadFailed(err.to_string())
    }

    pub fn transaction(err: impl std::fmt::Display) -> Self {
        AppError::TransactionFailed(err.to_string())
    }

    /// Banner text for this error, e.g. `⚠️ Read failed: timeout.`
    pub fn banner(&self) -> String {
        format!("⚠️ {}.", self)
    }
}

pub type AppResult<T> = Result<T, AppError>;
