//! Decoding of indexer responses into validated domain records.
//!
//! The envelope is checked first (GraphQL errors, shape of the result key).
//! Rows are then validated one by one; a row that fails validation is logged
//! and dropped without failing the rest of the response.

use crate::error::IndexerError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sphere_domain::{
    ActivityRecord, AssetMetadata, AssetType, DomainError, RawBalanceEntry, TokenAmount,
};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct GraphQlErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorItem>>,
}

/// Decodes the rows under `result_key`, converting each through `W`.
///
/// A missing or `null` result key yields an empty list.
pub fn decode_rows<W, T>(body: &[u8], result_key: &str) -> Result<Vec<T>, IndexerError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = DomainError>,
{
    let envelope: Envelope = serde_json::from_slice(body)?;

    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(IndexerError::GraphQl(messages.join("; ")));
    }

    let value = envelope
        .data
        .and_then(|mut data| data.remove(result_key))
        .unwrap_or(serde_json::Value::Null);

    let rows = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(IndexerError::UnexpectedShape {
                key: result_key.to_string(),
                found: other.to_string(),
            });
        }
    };

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let converted = serde_json::from_value::<W>(row)
            .map_err(IndexerError::from)
            .and_then(|wire| T::try_from(wire).map_err(IndexerError::from));
        match converted {
            Ok(record) => decoded.push(record),
            Err(e) => warn!(result_key, error = %e, "Dropping invalid indexer row"),
        }
    }

    Ok(decoded)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn flexible_u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<NumberOrText>::deserialize(deserializer)?
        .map_or(Ok(0), |v| match v {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        })
}

/// Parses indexer timestamps, which omit the zone and are always UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Row of any balance table; coin rows carry `coin_type` instead of `asset_type`.
#[derive(Debug, Deserialize)]
pub struct BalanceRow {
    #[serde(alias = "coin_type")]
    pub asset_type: String,
    pub amount: TokenAmount,
}

impl TryFrom<BalanceRow> for RawBalanceEntry {
    type Error = DomainError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        Ok(RawBalanceEntry::new(AssetType::new(row.asset_type)?, row.amount))
    }
}

#[derive(Debug, Deserialize)]
pub struct MetadataRow {
    pub asset_type: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    #[serde(default)]
    pub icon_uri: Option<String>,
}

impl TryFrom<MetadataRow> for AssetMetadata {
    type Error = DomainError;

    fn try_from(row: MetadataRow) -> Result<Self, Self::Error> {
        let asset_type = AssetType::new(row.asset_type)?;
        let (Some(symbol), Some(name), Some(decimals)) = (row.symbol, row.name, row.decimals)
        else {
            return Err(DomainError::IncompleteMetadata(asset_type.to_string()));
        };
        Ok(AssetMetadata {
            asset_type,
            symbol,
            name,
            decimals,
            icon_uri: row.icon_uri.filter(|uri| !uri.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityRow {
    #[serde(deserialize_with = "flexible_u64")]
    pub transaction_version: u64,
    #[serde(default, deserialize_with = "flexible_u64_or_zero")]
    pub event_index: u64,
    pub owner_address: String,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub amount: Option<TokenAmount>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub transaction_timestamp: String,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = DomainError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let transaction_timestamp = parse_timestamp(&row.transaction_timestamp)
            .ok_or_else(|| DomainError::InvalidTimestamp(row.transaction_timestamp.clone()))?;
        Ok(ActivityRecord {
            transaction_version: row.transaction_version,
            event_index: row.event_index,
            owner_address: row.owner_address,
            asset_type: row.asset_type.and_then(|t| AssetType::new(t).ok()),
            amount: row.amount,
            activity_type: row.activity_type,
            transaction_timestamp,
        })
    }
}
