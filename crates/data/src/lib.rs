//! Indexer access for the Sphere dashboard.
//!
//! This crate talks to the Cedra GraphQL indexer:
//! - Query documents for every balance, metadata and activity table
//! - An HTTP provider built on `reqwest`
//! - Envelope decoding with per-row validation

/// Error types.
pub mod error;
/// Provider implementations.
pub mod providers;
/// GraphQL documents and table descriptors.
pub mod queries;
/// Response decoding.
pub mod response;

pub use error::IndexerError;
pub use queries::{BalanceTable, DEFAULT_ACTIVITY_LIMIT, MetadataTable};

use async_trait::async_trait;
use sphere_domain::{ActivityRecord, AssetMetadata, AssetType, RawBalanceEntry};

/// Read access to the indexer tables the dashboard consumes.
///
/// Every call takes the endpoint explicitly because the endpoint follows the
/// selected network and may change between cycles.
#[async_trait]
pub trait IndexerProvider: Send + Sync {
    /// Fetches positive balances of `address` from one balance table.
    async fn fetch_balances(
        &self,
        endpoint: &str,
        table: BalanceTable,
        address: &str,
    ) -> Result<Vec<RawBalanceEntry>, IndexerError>;

    /// Fetches metadata for `asset_types` from one metadata table.
    async fn fetch_metadata(
        &self,
        endpoint: &str,
        table: MetadataTable,
        asset_types: &[AssetType],
    ) -> Result<Vec<AssetMetadata>, IndexerError>;

    /// Fetches the newest `limit` activity rows of `address`.
    async fn fetch_activities(
        &self,
        endpoint: &str,
        address: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, IndexerError>;
}
