//! Domain types for the Sphere dashboard.
//!
//! This crate holds the pure parts of the dashboard:
//! - Asset types, raw amounts and exact display formatting
//! - Balance, metadata and activity records
//! - Precedence merge and enrichment rules
//! - Supported networks

/// Records produced by the indexer and derived views.
pub mod entities;
/// Closed sets of values.
pub mod enums;
/// Validation errors.
pub mod error;
/// Merge and enrichment rules.
pub mod reconcile;
/// Validated scalar types.
pub mod value_objects;

pub use entities::activity::{ActivityRecord, HistoryEntry};
pub use entities::balance::{EnrichedBalance, RawBalanceEntry};
pub use entities::token::AssetMetadata;
pub use enums::{ActivityDirection, Network};
pub use error::DomainError;
pub use value_objects::amount::{Amount, TokenAmount};
pub use value_objects::asset_type::AssetType;
