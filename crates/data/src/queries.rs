//! GraphQL documents sent to the indexer.
//!
//! Each balance and metadata table has its own document so that an indexer
//! missing one table only fails that request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of activity rows requested per cycle.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 50;

const FUNGIBLE_ASSET_BALANCES_QUERY: &str = r#"query GetFA($address: String!) {
  current_fungible_asset_balances_new(
    where: { owner_address: { _eq: $address }, amount: { _gt: "0" } }
  ) {
    asset_type amount
  }
}"#;

const LEGACY_FUNGIBLE_ASSET_BALANCES_QUERY: &str = r#"query GetLegacyFA($address: String!) {
  current_fungible_asset_balances(
    where: { owner_address: { _eq: $address }, amount: { _gt: "0" } }
  ) {
    asset_type amount
  }
}"#;

const COIN_BALANCES_QUERY: &str = r#"query GetCoins($address: String!) {
  current_coin_balances(where: { owner_address: { _eq: $address }, amount: { _gt: "0" } }) {
    coin_type amount
  }
}"#;

const FUNGIBLE_ASSET_METADATA_QUERY: &str = r#"query GetFAMeta($in: [String!], $offset: Int) {
  fungible_asset_metadata(where: { asset_type: { _in: $in } }, offset: $offset, limit: 100) {
    symbol name decimals asset_type icon_uri
  }
}"#;

const COIN_INFOS_QUERY: &str = r#"query GetCoinMeta($in: [String!]) {
  coin_infos(where: { coin_type: { _in: $in } }) {
    symbol: symbol name: name decimals: decimals asset_type: coin_type
  }
}"#;

/// Activity history, newest first.
pub const ACTIVITIES_QUERY: &str = r#"query GetFungibleAssetActivities(
  $address: String!
  $limit: Int!
) {
  fungible_asset_activities(
    where: { owner_address: { _eq: $address } }
    order_by: { transaction_timestamp: desc }
    limit: $limit
  ) {
    transaction_version
    event_index
    owner_address
    asset_type
    amount
    type
    transaction_timestamp
  }
}"#;

/// Result key of [`ACTIVITIES_QUERY`].
pub const ACTIVITIES_RESULT_KEY: &str = "fungible_asset_activities";

/// Indexer tables holding account balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceTable {
    /// `current_fungible_asset_balances_new`.
    FungibleAssets,
    /// `current_fungible_asset_balances`, kept by older indexer schemas.
    LegacyFungibleAssets,
    /// `current_coin_balances`.
    Coins,
}

impl BalanceTable {
    /// Tables in merge precedence order.
    pub const PRECEDENCE: [BalanceTable; 3] = [
        BalanceTable::FungibleAssets,
        BalanceTable::LegacyFungibleAssets,
        BalanceTable::Coins,
    ];

    pub fn result_key(&self) -> &'static str {
        match self {
            BalanceTable::FungibleAssets => "current_fungible_asset_balances_new",
            BalanceTable::LegacyFungibleAssets => "current_fungible_asset_balances",
            BalanceTable::Coins => "current_coin_balances",
        }
    }

    pub fn query(&self) -> &'static str {
        match self {
            BalanceTable::FungibleAssets => FUNGIBLE_ASSET_BALANCES_QUERY,
            BalanceTable::LegacyFungibleAssets => LEGACY_FUNGIBLE_ASSET_BALANCES_QUERY,
            BalanceTable::Coins => COIN_BALANCES_QUERY,
        }
    }
}

impl fmt::Display for BalanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result_key())
    }
}

/// Indexer tables holding asset metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataTable {
    /// `fungible_asset_metadata`.
    FungibleAssetMetadata,
    /// `coin_infos`.
    CoinInfos,
}

impl MetadataTable {
    /// Tables in merge precedence order.
    pub const PRECEDENCE: [MetadataTable; 2] =
        [MetadataTable::FungibleAssetMetadata, MetadataTable::CoinInfos];

    pub fn result_key(&self) -> &'static str {
        match self {
            MetadataTable::FungibleAssetMetadata => "fungible_asset_metadata",
            MetadataTable::CoinInfos => "coin_infos",
        }
    }

    pub fn query(&self) -> &'static str {
        match self {
            MetadataTable::FungibleAssetMetadata => FUNGIBLE_ASSET_METADATA_QUERY,
            MetadataTable::CoinInfos => COIN_INFOS_QUERY,
        }
    }
}

impl fmt::Display for MetadataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result_key())
    }
}

/// Body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

impl<'a> GraphQlRequest<'a> {
    pub fn balances(table: BalanceTable, address: &str) -> Self {
        Self {
            query: table.query(),
            variables: serde_json::json!({ "address": address.to_lowercase() }),
        }
    }

    pub fn metadata(table: MetadataTable, asset_types: &[&str]) -> Self {
        let variables = match table {
            MetadataTable::FungibleAssetMetadata => {
                serde_json::json!({ "in": asset_types, "offset": 0 })
            }
            MetadataTable::CoinInfos => serde_json::json!({ "in": asset_types }),
        };
        Self {
            query: table.query(),
            variables,
        }
    }

    pub fn activities(address: &str, limit: u32) -> Self {
        Self {
            query: ACTIVITIES_QUERY,
            variables: serde_json::json!({ "address": address.to_lowercase(), "limit": limit }),
        }
    }
}
