//! HTTP GraphQL client for the Cedra indexer.

use crate::IndexerProvider;
use crate::error::IndexerError;
use crate::queries::{ACTIVITIES_RESULT_KEY, BalanceTable, GraphQlRequest, MetadataTable};
use crate::response::{ActivityRow, BalanceRow, MetadataRow, decode_rows};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sphere_domain::{ActivityRecord, AssetMetadata, AssetType, DomainError, RawBalanceEntry};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Indexer provider that POSTs GraphQL documents over HTTP.
#[derive(Clone)]
pub struct GraphqlIndexer {
    client: reqwest::Client,
}

impl GraphqlIndexer {
    /// Creates a provider with the default timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, IndexerError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a provider whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, IndexerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute<W, T>(
        &self,
        endpoint: &str,
        request: &GraphQlRequest<'_>,
        result_key: &str,
    ) -> Result<Vec<T>, IndexerError>
    where
        W: DeserializeOwned,
        T: TryFrom<W, Error = DomainError>,
    {
        let response = self.client.post(endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexerError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let rows = decode_rows::<W, T>(&body, result_key)?;

        debug!(result_key, rows = rows.len(), "Indexer query complete");
        Ok(rows)
    }
}

#[async_trait]
impl IndexerProvider for GraphqlIndexer {
    async fn fetch_balances(
        &self,
        endpoint: &str,
        table: BalanceTable,
        address: &str,
    ) -> Result<Vec<RawBalanceEntry>, IndexerError> {
        let request = GraphQlRequest::balances(table, address);
        self.execute::<BalanceRow, _>(endpoint, &request, table.result_key())
            .await
    }

    async fn fetch_metadata(
        &self,
        endpoint: &str,
        table: MetadataTable,
        asset_types: &[AssetType],
    ) -> Result<Vec<AssetMetadata>, IndexerError> {
        let keys: Vec<&str> = asset_types.iter().map(AssetType::as_str).collect();
        let request = GraphQlRequest::metadata(table, &keys);
        self.execute::<MetadataRow, _>(endpoint, &request, table.result_key())
            .await
    }

    async fn fetch_activities(
        &self,
        endpoint: &str,
        address: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, IndexerError> {
        let request = GraphQlRequest::activities(address, limit);
        self.execute::<ActivityRow, _>(endpoint, &request, ACTIVITIES_RESULT_KEY)
            .await
    }
}
