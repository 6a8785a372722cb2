//! Activity history reconciler.

use super::ReconcileOutcome;
use crate::scheduler::PollTask;
use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sphere_data::{DEFAULT_ACTIVITY_LIMIT, IndexerProvider};
use sphere_domain::HistoryEntry;
use sphere_domain::reconcile::merge_activities;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// Number of history lines kept for display.
pub const DISPLAYED_ACTIVITY: usize = 10;

/// Configuration for the activity reconciler.
#[derive(Debug, Clone)]
pub struct ActivityReconcilerConfig {
    /// Rows requested from the indexer.
    pub fetch_limit: u32,
    /// Lines kept after de-duplication.
    pub display_limit: usize,
}

impl Default for ActivityReconcilerConfig {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_ACTIVITY_LIMIT,
            display_limit: DISPLAYED_ACTIVITY,
        }
    }
}

/// Latest published history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityView {
    pub epoch: u64,
    /// Newest first.
    pub entries: Vec<HistoryEntry>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Rebuilds the transaction history shown on the activity tab.
pub struct ActivityReconciler {
    indexer: Arc<dyn IndexerProvider>,
    session: Arc<Session>,
    config: ActivityReconcilerConfig,
    view: watch::Sender<ActivityView>,
    cycle: Mutex<()>,
}

impl ActivityReconciler {
    pub fn new(
        indexer: Arc<dyn IndexerProvider>,
        session: Arc<Session>,
        config: ActivityReconcilerConfig,
    ) -> Self {
        let (view, _) = watch::channel(ActivityView::default());
        Self {
            indexer,
            session,
            config,
            view,
            cycle: Mutex::new(()),
        }
    }

    /// Returns the last published history.
    pub fn latest(&self) -> ActivityView {
        self.view.borrow().clone()
    }

    /// Watches published histories.
    pub fn subscribe(&self) -> watch::Receiver<ActivityView> {
        self.view.subscribe()
    }

    /// Drops a history built for an earlier session.
    fn clear(&self, epoch: u64) {
        self.view.send_if_modified(|view| {
            if view.epoch == epoch {
                return false;
            }
            *view = ActivityView {
                epoch,
                ..ActivityView::default()
            };
            true
        });
    }

    /// Reads history from the indexer activity table.
    pub async fn fetch_from_indexer(&self, endpoint: &str, address: &str) -> Vec<HistoryEntry> {
        let rows = match self
            .indexer
            .fetch_activities(endpoint, address, self.config.fetch_limit)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Activity fetch failed, showing empty history");
                return Vec::new();
            }
        };

        merge_activities([rows])
            .iter()
            .take(self.config.display_limit)
            .map(|record| HistoryEntry::from_activity(record, address))
            .collect()
    }

    /// Runs one reconciliation cycle and publishes the result.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        let Ok(_guard) = self.cycle.try_lock() else {
            debug!("Activity cycle already in flight, skipping");
            return ReconcileOutcome::Busy;
        };

        let snapshot = self.session.snapshot();
        let (Some(wallet), Some(address)) = (&snapshot.wallet, &snapshot.address) else {
            self.clear(snapshot.epoch);
            return ReconcileOutcome::Idle;
        };

        let entries = match &snapshot.indexer_url {
            Some(endpoint) => self.fetch_from_indexer(endpoint, address).await,
            None => match wallet.transaction_history().await {
                Ok(history) => history
                    .into_iter()
                    .take(self.config.display_limit)
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "Wallet history unavailable, showing empty history");
                    Vec::new()
                }
            },
        };

        if !self.session.is_current(snapshot.epoch) {
            debug!(epoch = snapshot.epoch, "Session changed during activity cycle, discarding");
            return ReconcileOutcome::Stale;
        }

        let count = entries.len();
        self.view.send_replace(ActivityView {
            epoch: snapshot.epoch,
            entries,
            refreshed_at: Some(Utc::now()),
        });

        ReconcileOutcome::Published { count }
    }
}

#[async_trait]
impl PollTask for ActivityReconciler {
    fn name(&self) -> &str {
        "activity"
    }

    async fn run_cycle(&self) {
        let outcome = self.reconcile().await;
        debug!(?outcome, "Activity cycle complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeIndexer, FakeWallet};
    use chrono::TimeZone;
    use sphere_domain::{ActivityDirection, ActivityRecord, AssetType, Network, TokenAmount};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const ENDPOINT: &str = "https://indexer.test/v1/graphql";
    const OWNER: &str = "0xabc";

    fn record(version: u64, event_index: u64, activity_type: &str) -> ActivityRecord {
        ActivityRecord {
            transaction_version: version,
            event_index,
            owner_address: OWNER.to_string(),
            asset_type: Some(AssetType::new("0x1::cedra_coin::CedraCoin").unwrap()),
            amount: Some(TokenAmount::from(1_000u64)),
            activity_type: activity_type.to_string(),
            transaction_timestamp: Utc.timestamp_opt(1_700_000_000 + version as i64, 0).unwrap(),
        }
    }

    fn history(version: u64) -> HistoryEntry {
        HistoryEntry {
            hash: format!("0x{version:x}"),
            success: true,
            kind: "transfer".to_string(),
            sender: OWNER.to_string(),
            receiver: "0xdef".to_string(),
            amount: None,
            timestamp: 1_700_000_000,
            version: version.to_string(),
            direction: ActivityDirection::Sent,
        }
    }

    fn session(indexer_url: Option<&str>, wallet: FakeWallet) -> Arc<Session> {
        let session = Arc::new(Session::new(
            Network::Testnet,
            indexer_url.map(str::to_string),
        ));
        session.attach_wallet(Arc::new(wallet));
        session
    }

    #[tokio::test]
    async fn test_duplicates_removed_and_display_limited() {
        let indexer = Arc::new(FakeIndexer::new());
        let mut rows: Vec<ActivityRecord> = (0..15)
            .rev()
            .map(|v| record(v, 0, "0x1::fungible_asset::Withdraw"))
            .collect();
        rows.insert(1, record(14, 0, "0x1::fungible_asset::Withdraw"));
        indexer.set_activities(rows);
        let reconciler = ActivityReconciler::new(
            indexer,
            session(Some(ENDPOINT), FakeWallet::new(OWNER)),
            ActivityReconcilerConfig::default(),
        );

        let outcome = reconciler.reconcile().await;

        assert_eq!(outcome, ReconcileOutcome::Published { count: 10 });
        let versions: Vec<String> = reconciler
            .latest()
            .entries
            .into_iter()
            .map(|e| e.version)
            .collect();
        assert_eq!(versions[0], "14");
        assert_eq!(versions[1], "13");
    }

    #[tokio::test]
    async fn test_deposit_is_received() {
        let indexer = Arc::new(FakeIndexer::new());
        indexer.set_activities(vec![record(7, 1, "0x1::coin::DepositEvent")]);
        let reconciler = ActivityReconciler::new(
            indexer,
            session(Some(ENDPOINT), FakeWallet::new(OWNER)),
            ActivityReconcilerConfig::default(),
        );

        reconciler.reconcile().await;
        let entry = reconciler.latest().entries.remove(0);

        assert_eq!(entry.direction, ActivityDirection::Received);
        assert_eq!(entry.receiver, OWNER);
    }

    #[tokio::test]
    async fn test_indexer_failure_yields_empty_history() {
        let indexer = Arc::new(FakeIndexer::new());
        indexer.fail_activities();
        let reconciler = ActivityReconciler::new(
            indexer,
            session(Some(ENDPOINT), FakeWallet::new(OWNER)),
            ActivityReconcilerConfig::default(),
        );

        assert_eq!(
            reconciler.reconcile().await,
            ReconcileOutcome::Published { count: 0 }
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_wallet_history_without_endpoint() {
        let indexer = Arc::new(FakeIndexer::new());
        let wallet = FakeWallet::new(OWNER).with_history((0..12).map(history).collect());
        let reconciler = ActivityReconciler::new(
            indexer.clone(),
            session(None, wallet),
            ActivityReconcilerConfig::default(),
        );

        let outcome = reconciler.reconcile().await;

        assert_eq!(outcome, ReconcileOutcome::Published { count: 10 });
        assert_eq!(reconciler.latest().entries[0], history(0));
        assert_eq!(indexer.activity_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_idle_without_wallet() {
        let indexer = Arc::new(FakeIndexer::new());
        let session = Arc::new(Session::new(Network::Testnet, Some(ENDPOINT.to_string())));
        let reconciler =
            ActivityReconciler::new(indexer, session, ActivityReconcilerConfig::default());

        assert_eq!(reconciler.reconcile().await, ReconcileOutcome::Idle);
    }

    #[tokio::test]
    async fn test_sign_out_clears_published_history() {
        let indexer = Arc::new(FakeIndexer::new());
        indexer.set_activities(vec![record(3, 0, "0x1::fungible_asset::Withdraw")]);
        let session = session(Some(ENDPOINT), FakeWallet::new(OWNER));
        let reconciler = ActivityReconciler::new(
            indexer,
            session.clone(),
            ActivityReconcilerConfig::default(),
        );

        reconciler.reconcile().await;
        assert_eq!(reconciler.latest().entries.len(), 1);

        session.detach_wallet();
        assert_eq!(reconciler.reconcile().await, ReconcileOutcome::Idle);

        let view = reconciler.latest();
        assert!(view.entries.is_empty());
        assert_eq!(view.epoch, session.epoch());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_change_discards_cycle() {
        let indexer = Arc::new(FakeIndexer::new().with_delay(Duration::from_secs(3)));
        indexer.set_activities(vec![record(1, 0, "0x1::fungible_asset::Withdraw")]);
        let session = session(Some(ENDPOINT), FakeWallet::new(OWNER));
        let reconciler = Arc::new(ActivityReconciler::new(
            indexer,
            session.clone(),
            ActivityReconcilerConfig::default(),
        ));

        let cycle = tokio::spawn({
            let reconciler = reconciler.clone();
            async move { reconciler.reconcile().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        session.set_network(Network::Devnet);

        assert_eq!(cycle.await.unwrap(), ReconcileOutcome::Stale);
        assert_eq!(reconciler.latest(), ActivityView::default());
    }
}
