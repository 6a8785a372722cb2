//! In-memory fakes of the indexer and the wallet SDK for unit tests.

use crate::wallet::{SdkError, TransferRequest, WalletBalance, WalletSdk};
use async_trait::async_trait;
use sphere_data::{BalanceTable, IndexerError, IndexerProvider, MetadataTable};
use sphere_domain::{
    ActivityRecord, Amount, AssetMetadata, AssetType, HistoryEntry, Network, RawBalanceEntry,
    TokenAmount,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Rows<T> = Result<Vec<T>, u16>;

#[derive(Default)]
pub struct FakeIndexer {
    balances: Mutex<HashMap<BalanceTable, Rows<RawBalanceEntry>>>,
    metadata: Mutex<HashMap<MetadataTable, Rows<AssetMetadata>>>,
    activities: Mutex<Option<Rows<ActivityRecord>>>,
    delay: Option<Duration>,
    pub balance_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub activity_calls: AtomicUsize,
}

impl FakeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_balances(&self, table: BalanceTable, rows: Vec<RawBalanceEntry>) {
        self.balances.lock().unwrap().insert(table, Ok(rows));
    }

    pub fn fail_balances(&self, table: BalanceTable) {
        self.balances.lock().unwrap().insert(table, Err(503));
    }

    pub fn set_metadata(&self, table: MetadataTable, rows: Vec<AssetMetadata>) {
        self.metadata.lock().unwrap().insert(table, Ok(rows));
    }

    pub fn fail_metadata(&self, table: MetadataTable) {
        self.metadata.lock().unwrap().insert(table, Err(500));
    }

    pub fn set_activities(&self, rows: Vec<ActivityRecord>) {
        *self.activities.lock().unwrap() = Some(Ok(rows));
    }

    pub fn fail_activities(&self) {
        *self.activities.lock().unwrap() = Some(Err(502));
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn into_result<T: Clone>(rows: Option<&Rows<T>>) -> Result<Vec<T>, IndexerError> {
    match rows {
        Some(Ok(rows)) => Ok(rows.clone()),
        Some(Err(status)) => Err(IndexerError::Status(*status)),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl IndexerProvider for FakeIndexer {
    async fn fetch_balances(
        &self,
        _endpoint: &str,
        table: BalanceTable,
        _address: &str,
    ) -> Result<Vec<RawBalanceEntry>, IndexerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        into_result(self.balances.lock().unwrap().get(&table))
    }

    async fn fetch_metadata(
        &self,
        _endpoint: &str,
        table: MetadataTable,
        asset_types: &[AssetType],
    ) -> Result<Vec<AssetMetadata>, IndexerError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        into_result(self.metadata.lock().unwrap().get(&table)).map(|rows| {
            rows.into_iter()
                .filter(|m| asset_types.contains(&m.asset_type))
                .collect()
        })
    }

    async fn fetch_activities(
        &self,
        _endpoint: &str,
        _address: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, IndexerError> {
        self.activity_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        into_result(self.activities.lock().unwrap().as_ref())
            .map(|rows| rows.into_iter().take(limit as usize).collect())
    }
}

pub struct FakeWallet {
    address: String,
    decimals: u8,
    primary: TokenAmount,
    history: Vec<HistoryEntry>,
    reject_with: Option<String>,
    reject_network: bool,
    pub sent: Mutex<Vec<TransferRequest>>,
    pub networks: Mutex<Vec<(Network, String)>>,
    pub refreshes: AtomicUsize,
}

impl FakeWallet {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            decimals: 8,
            primary: TokenAmount::from(100_000_000u64),
            history: Vec::new(),
            reject_with: None,
            reject_network: false,
            sent: Mutex::new(Vec::new()),
            networks: Mutex::new(Vec::new()),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    pub fn rejecting_network_changes(mut self) -> Self {
        self.reject_network = true;
        self
    }
}

#[async_trait]
impl WalletSdk for FakeWallet {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn balance(&self, asset_type: Option<&AssetType>) -> Result<WalletBalance, SdkError> {
        Ok(WalletBalance {
            asset_type: asset_type.cloned(),
            amount: Amount::new(self.primary, self.decimals),
            symbol: None,
        })
    }

    async fn send_transaction(&self, request: &TransferRequest) -> Result<String, SdkError> {
        if let Some(message) = &self.reject_with {
            return Err(SdkError::Rejected(message.clone()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(request.clone());
        Ok(format!("0x{:064x}", sent.len()))
    }

    async fn transaction_history(&self) -> Result<Vec<HistoryEntry>, SdkError> {
        Ok(self.history.clone())
    }

    async fn update_network(&self, network: Network, rpc_endpoint: &str) -> Result<(), SdkError> {
        if self.reject_network {
            return Err(SdkError::Unavailable("network switch refused".to_string()));
        }
        self.networks
            .lock()
            .unwrap()
            .push((network, rpc_endpoint.to_string()));
        Ok(())
    }

    async fn refresh(&self) -> Result<(), SdkError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
