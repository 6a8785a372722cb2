//! Pure merge and enrichment rules shared by the reconcilers.
//!
//! Every source is a list of rows keyed by some identity. Sources are given in
//! precedence order; the first source that mentions a key owns it and later
//! rows for the same key are skipped. Output order is first-seen order across
//! the whole chain, so re-running a merge over the same snapshots always yields
//! the same result.

use crate::entities::activity::ActivityRecord;
use crate::entities::balance::{EnrichedBalance, RawBalanceEntry};
use crate::entities::token::AssetMetadata;
use crate::value_objects::amount::Amount;
use crate::value_objects::asset_type::{AssetType, NATIVE_NAME, NATIVE_SYMBOL, UNKNOWN_TOKEN_NAME};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Decimals assumed for assets without metadata.
pub const DEFAULT_DECIMALS: u8 = 8;

/// Merges `sources` (highest precedence first) keeping the first row per key.
pub fn merge_by_precedence<T, K, I, F>(sources: I, key: F) -> Vec<T>
where
    I: IntoIterator<Item = Vec<T>>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for source in sources {
        for row in source {
            if seen.insert(key(&row)) {
                merged.push(row);
            }
        }
    }

    merged
}

/// Merges balance tables, dropping zero amounts before they can claim a key.
pub fn merge_balances<I>(sources: I) -> Vec<RawBalanceEntry>
where
    I: IntoIterator<Item = Vec<RawBalanceEntry>>,
{
    let positive = sources
        .into_iter()
        .map(|rows| rows.into_iter().filter(|row| !row.amount.is_zero()).collect::<Vec<_>>());
    merge_by_precedence(positive, |row: &RawBalanceEntry| row.asset_type.clone())
}

/// Merges metadata tables into a lookup keyed by asset type.
pub fn merge_metadata<I>(sources: I) -> HashMap<AssetType, AssetMetadata>
where
    I: IntoIterator<Item = Vec<AssetMetadata>>,
{
    merge_by_precedence(sources, |meta: &AssetMetadata| meta.asset_type.clone())
        .into_iter()
        .map(|meta| (meta.asset_type.clone(), meta))
        .collect()
}

/// De-duplicates activity rows by `(transaction_version, event_index)`.
pub fn merge_activities<I>(sources: I) -> Vec<ActivityRecord>
where
    I: IntoIterator<Item = Vec<ActivityRecord>>,
{
    merge_by_precedence(sources, ActivityRecord::event_key)
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Joins one balance with its metadata, applying the display fallbacks.
pub fn enrich_balance(
    entry: &RawBalanceEntry,
    metadata: Option<&AssetMetadata>,
) -> EnrichedBalance {
    let asset_type = &entry.asset_type;
    let decimals = metadata.map_or(DEFAULT_DECIMALS, |m| m.decimals);

    let symbol = non_empty(metadata.map(|m| &m.symbol))
        .map(str::to_string)
        .unwrap_or_else(|| {
            if asset_type.is_native() {
                NATIVE_SYMBOL.to_string()
            } else {
                asset_type.trailing_segment().to_string()
            }
        });

    let name = non_empty(metadata.map(|m| &m.name))
        .map(str::to_string)
        .unwrap_or_else(|| {
            if asset_type.is_native() {
                NATIVE_NAME.to_string()
            } else {
                UNKNOWN_TOKEN_NAME.to_string()
            }
        });

    EnrichedBalance {
        asset_type: asset_type.clone(),
        amount: entry.amount,
        symbol,
        name,
        icon: metadata.and_then(|m| m.icon_uri.clone()),
        decimals,
        formatted_amount: Amount::new(entry.amount, decimals).to_display_string(),
    }
}

/// Enriches every balance, preserving input order.
pub fn enrich_balances(
    balances: &[RawBalanceEntry],
    metadata: &HashMap<AssetType, AssetMetadata>,
) -> Vec<EnrichedBalance> {
    balances
        .iter()
        .map(|entry| enrich_balance(entry, metadata.get(&entry.asset_type)))
        .collect()
}

/// Puts `primary` in front of `tokens` unless the list already has a native entry.
pub fn with_primary_fallback(
    tokens: Vec<EnrichedBalance>,
    primary: Option<EnrichedBalance>,
) -> Vec<EnrichedBalance> {
    match primary {
        Some(primary) if !tokens.iter().any(|t| t.asset_type.is_native()) => {
            let mut list = Vec::with_capacity(tokens.len() + 1);
            list.push(primary);
            list.extend(tokens);
            list
        }
        _ => tokens,
    }
}
