//! Dashboard services for a Sphere Connect wallet.
//!
//! This crate wires the indexer and the wallet SDK into live dashboard views:
//! - Explicit session context with change tracking
//! - Balance and activity reconciliation
//! - Cancellable polling
//! - Transfers and network switching

/// Prelude module for convenient imports.
pub mod prelude;

/// Runtime configuration.
pub mod config;
/// Network switching.
pub mod network;
/// Polling loops.
pub mod scheduler;
/// Session context.
pub mod session;
/// Reconciliation of indexer data.
pub mod sync;
/// Transfers.
pub mod transaction;
/// Wallet SDK seam.
pub mod wallet;

#[cfg(test)]
mod testing;
