//! Reconciliation of indexer data into dashboard views.
//!
//! Each reconciler rebuilds its whole view every cycle:
//! - Balances from three overlapping balance tables plus metadata
//! - Activity history from the indexer or the wallet SDK

mod activity;
mod reconciler;

pub use activity::*;
pub use reconciler::*;

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A fresh view was published.
    Published {
        /// Entries in the published view.
        count: usize,
    },
    /// No wallet or no data source; nothing was fetched.
    Idle,
    /// A previous cycle was still running.
    Busy,
    /// The session changed mid-cycle; the result was dropped.
    Stale,
}
