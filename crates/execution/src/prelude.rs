//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use sphere_execution::prelude::*;
//! ```

// Config
pub use crate::config::{DEFAULT_INDEXER_URL, SphereConfig};

// Network
pub use crate::network::NetworkService;

// Scheduler
pub use crate::scheduler::{
    ACTIVITY_POLL_INTERVAL, BALANCE_POLL_INTERVAL, PollHandle, PollTask, Poller,
};

// Session
pub use crate::session::{Session, SessionSnapshot};

// Sync
pub use crate::sync::{
    ActivityReconciler, ActivityReconcilerConfig, ActivityView, BalanceReconciler,
    BalanceReconcilerConfig, BalanceView, ReconcileOutcome,
};

// Transaction
pub use crate::transaction::{
    TokenLabels, TransferError, TransferForm, TransferReceipt, TransferService,
};

// Wallet
pub use crate::wallet::{NATIVE_ASSET_TYPE, SdkError, TransferRequest, WalletBalance, WalletSdk};
