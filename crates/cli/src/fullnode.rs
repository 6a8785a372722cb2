//! Watch-only wallet backed by the fullnode REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sphere_domain::entities::activity::EXTERNAL_PARTY;
use sphere_domain::reconcile::DEFAULT_DECIMALS;
use sphere_domain::value_objects::asset_type::NAMESPACE_SEPARATOR;
use sphere_domain::{ActivityDirection, Amount, AssetType, HistoryEntry, Network, TokenAmount};
use sphere_execution::wallet::{
    NATIVE_ASSET_TYPE, SdkError, TransferRequest, WalletBalance, WalletSdk,
};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

const HISTORY_PAGE: u32 = 25;

#[derive(Debug, Deserialize)]
struct FullnodeTransaction {
    hash: String,
    #[serde(default)]
    success: bool,
    version: String,
    /// Microseconds since the epoch.
    timestamp: String,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    payload: Option<EntryPayload>,
}

#[derive(Debug, Deserialize)]
struct EntryPayload {
    #[serde(default)]
    function: Option<String>,
    #[serde(default)]
    arguments: Vec<serde_json::Value>,
}

impl FullnodeTransaction {
    fn into_history(self, owner: &str) -> HistoryEntry {
        let (kind, receiver, amount) = match &self.payload {
            Some(payload) => {
                let kind = payload
                    .function
                    .as_deref()
                    .and_then(|f| f.rsplit(NAMESPACE_SEPARATOR).next())
                    .unwrap_or("transaction")
                    .to_string();
                let receiver = payload
                    .arguments
                    .first()
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(EXTERNAL_PARTY)
                    .to_string();
                let amount = payload
                    .arguments
                    .get(1)
                    .and_then(serde_json::Value::as_str)
                    .and_then(|a| a.parse::<TokenAmount>().ok());
                (kind, receiver, amount)
            }
            None => ("transaction".to_string(), EXTERNAL_PARTY.to_string(), None),
        };

        let sender = self.sender.unwrap_or_else(|| EXTERNAL_PARTY.to_string());
        let direction = if sender.eq_ignore_ascii_case(owner) {
            ActivityDirection::Sent
        } else {
            ActivityDirection::Received
        };

        HistoryEntry {
            hash: self.hash,
            success: self.success,
            kind,
            sender,
            receiver,
            amount,
            timestamp: self.timestamp.parse::<i64>().unwrap_or_default() / 1_000_000,
            version: self.version,
            direction,
        }
    }
}

/// Reads balances and history of one address; cannot sign.
pub struct FullnodeWallet {
    client: reqwest::Client,
    address: String,
    rpc_endpoint: RwLock<String>,
}

impl FullnodeWallet {
    pub fn new(address: &str, rpc_endpoint: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            address: address.trim().to_lowercase(),
            rpc_endpoint: RwLock::new(rpc_endpoint.trim_end_matches('/').to_string()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let url = format!("{}{}", self.rpc_endpoint.read().await, path);
        debug!(url = %url, "Fullnode request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SdkError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::Unavailable(format!("fullnode returned {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SdkError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl WalletSdk for FullnodeWallet {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn balance(&self, asset_type: Option<&AssetType>) -> Result<WalletBalance, SdkError> {
        let asset_type = match asset_type {
            Some(asset_type) => asset_type.clone(),
            None => AssetType::new(NATIVE_ASSET_TYPE)
                .map_err(|e| SdkError::Unavailable(e.to_string()))?,
        };
        let raw: TokenAmount = self
            .get(&format!("/accounts/{}/balance/{}", self.address, asset_type))
            .await?;

        Ok(WalletBalance {
            asset_type: Some(asset_type),
            amount: Amount::new(raw, DEFAULT_DECIMALS),
            symbol: None,
        })
    }

    async fn send_transaction(&self, _request: &TransferRequest) -> Result<String, SdkError> {
        Err(SdkError::ReadOnly)
    }

    async fn transaction_history(&self) -> Result<Vec<HistoryEntry>, SdkError> {
        let transactions: Vec<FullnodeTransaction> = self
            .get(&format!(
                "/accounts/{}/transactions?limit={HISTORY_PAGE}",
                self.address
            ))
            .await?;

        Ok(transactions
            .into_iter()
            .rev()
            .map(|tx| tx.into_history(&self.address))
            .collect())
    }

    async fn update_network(&self, network: Network, rpc_endpoint: &str) -> Result<(), SdkError> {
        debug!(network = %network, rpc_endpoint, "Switching fullnode");
        *self.rpc_endpoint.write().await = rpc_endpoint.trim_end_matches('/').to_string();
        Ok(())
    }

    async fn refresh(&self) -> Result<(), SdkError> {
        Ok(())
    }
}
