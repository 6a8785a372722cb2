use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Decimals out of range: {0}")]
    TooManyDecimals(u8),
    #[error("Asset type must not be empty")]
    EmptyAssetType,
    #[error("Incomplete metadata for {0}")]
    IncompleteMetadata(String),
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("Unknown network: {0:?}")]
    UnknownNetwork(String),
}
