//! Balance reconciler for the token list.

use super::ReconcileOutcome;
use crate::scheduler::PollTask;
use crate::session::{Session, SessionSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sphere_data::{BalanceTable, IndexerProvider, MetadataTable};
use sphere_domain::reconcile::{
    enrich_balances, merge_balances, merge_metadata, with_primary_fallback,
};
use sphere_domain::{AssetMetadata, AssetType, EnrichedBalance, RawBalanceEntry};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// Configuration for the balance reconciler.
#[derive(Debug, Clone)]
pub struct BalanceReconcilerConfig {
    /// Prefix the SDK's primary balance when the indexer has no native entry.
    pub include_primary: bool,
}

impl Default for BalanceReconcilerConfig {
    fn default() -> Self {
        Self {
            include_primary: true,
        }
    }
}

/// Latest published token list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceView {
    /// Session epoch the list was built for.
    pub epoch: u64,
    /// One entry per asset type.
    pub tokens: Vec<EnrichedBalance>,
    /// When the list was published.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Rebuilds the enriched balance list from the indexer balance tables.
pub struct BalanceReconciler {
    /// Indexer provider.
    indexer: Arc<dyn IndexerProvider>,
    /// Session context.
    session: Arc<Session>,
    /// Configuration.
    config: BalanceReconcilerConfig,
    /// Published view.
    view: watch::Sender<BalanceView>,
    /// Held for the duration of a cycle.
    cycle: Mutex<()>,
}

impl BalanceReconciler {
    /// Creates a new reconciler.
    pub fn new(
        indexer: Arc<dyn IndexerProvider>,
        session: Arc<Session>,
        config: BalanceReconcilerConfig,
    ) -> Self {
        let (view, _) = watch::channel(BalanceView::default());
        Self {
            indexer,
            session,
            config,
            view,
            cycle: Mutex::new(()),
        }
    }

    /// Returns the last published view.
    pub fn latest(&self) -> BalanceView {
        self.view.borrow().clone()
    }

    /// Watches published views.
    pub fn subscribe(&self) -> watch::Receiver<BalanceView> {
        self.view.subscribe()
    }

    /// Drops a list built for an earlier session.
    fn clear(&self, epoch: u64) {
        self.view.send_if_modified(|view| {
            if view.epoch == epoch {
                return false;
            }
            *view = BalanceView {
                epoch,
                ..BalanceView::default()
            };
            true
        });
    }

    /// Fetches one balance table, treating a failure as an empty table.
    async fn fetch_table(
        &self,
        endpoint: &str,
        table: BalanceTable,
        address: &str,
    ) -> Vec<RawBalanceEntry> {
        match self.indexer.fetch_balances(endpoint, table, address).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = %table, error = %e, "Balance source failed, using empty result");
                Vec::new()
            }
        }
    }

    /// Fetches one metadata table, treating a failure as an empty table.
    async fn fetch_metadata_table(
        &self,
        endpoint: &str,
        table: MetadataTable,
        asset_types: &[AssetType],
    ) -> Vec<AssetMetadata> {
        match self.indexer.fetch_metadata(endpoint, table, asset_types).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = %table, error = %e, "Metadata source failed, using empty result");
                Vec::new()
            }
        }
    }

    /// Queries the three balance tables concurrently and merges them by
    /// precedence.
    pub async fn fetch_balances(&self, endpoint: &str, address: &str) -> Vec<RawBalanceEntry> {
        let [modern, legacy, coins] = BalanceTable::PRECEDENCE;
        let (modern, legacy, coins) = tokio::join!(
            self.fetch_table(endpoint, modern, address),
            self.fetch_table(endpoint, legacy, address),
            self.fetch_table(endpoint, coins, address),
        );

        debug!(
            modern = modern.len(),
            legacy = legacy.len(),
            coins = coins.len(),
            "Fetched balance sources"
        );

        merge_balances([modern, legacy, coins])
    }

    /// Queries both metadata tables concurrently for `asset_types`.
    pub async fn fetch_metadata(
        &self,
        endpoint: &str,
        asset_types: &[AssetType],
    ) -> HashMap<AssetType, AssetMetadata> {
        let [modern, coins] = MetadataTable::PRECEDENCE;
        let (modern, coins) = tokio::join!(
            self.fetch_metadata_table(endpoint, modern, asset_types),
            self.fetch_metadata_table(endpoint, coins, asset_types),
        );
        merge_metadata([modern, coins])
    }

    /// Builds the enriched list for `address` without publishing it.
    pub async fn build(&self, endpoint: &str, address: &str) -> Vec<EnrichedBalance> {
        let balances = self.fetch_balances(endpoint, address).await;
        if balances.is_empty() {
            return Vec::new();
        }

        let asset_types: Vec<AssetType> =
            balances.iter().map(|b| b.asset_type.clone()).collect();
        let metadata = self.fetch_metadata(endpoint, &asset_types).await;

        enrich_balances(&balances, &metadata)
    }

    async fn primary_entry(&self, snapshot: &SessionSnapshot) -> Option<EnrichedBalance> {
        let wallet = snapshot.wallet.as_ref()?;
        match wallet.balance(None).await {
            Ok(balance) => balance.to_primary_entry(),
            Err(e) => {
                warn!(error = %e, "Primary balance unavailable");
                None
            }
        }
    }

    /// Runs one reconciliation cycle and publishes the result.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        let Ok(_guard) = self.cycle.try_lock() else {
            debug!("Balance cycle already in flight, skipping");
            return ReconcileOutcome::Busy;
        };

        let snapshot = self.session.snapshot();
        let (Some(address), Some(endpoint)) = (&snapshot.address, &snapshot.indexer_url) else {
            self.clear(snapshot.epoch);
            return ReconcileOutcome::Idle;
        };

        let mut tokens = self.build(endpoint, address).await;
        if self.config.include_primary {
            tokens = with_primary_fallback(tokens, self.primary_entry(&snapshot).await);
        }

        if !self.session.is_current(snapshot.epoch) {
            debug!(epoch = snapshot.epoch, "Session changed during balance cycle, discarding");
            return ReconcileOutcome::Stale;
        }

        let count = tokens.len();
        self.view.send_replace(BalanceView {
            epoch: snapshot.epoch,
            tokens,
            refreshed_at: Some(Utc::now()),
        });

        ReconcileOutcome::Published { count }
    }
}

#[async_trait]
impl PollTask for BalanceReconciler {
    fn name(&self) -> &str {
        "balances"
    }

    async fn run_cycle(&self) {
        let outcome = self.reconcile().await;
        debug!(?outcome, "Balance cycle complete");
    }
}
