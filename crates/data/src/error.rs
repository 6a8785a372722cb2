use sphere_domain::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Indexer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Indexer responded with HTTP {0}")]
    Status(u16),
    #[error("Indexer query failed: {0}")]
    GraphQl(String),
    #[error("Malformed indexer payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected shape for {key}: {found}")]
    UnexpectedShape { key: String, found: String },
    #[error("Invalid row: {0}")]
    InvalidRow(#[from] DomainError),
}
