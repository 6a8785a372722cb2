//! Seam to the external wallet SDK.
//!
//! Key management, signing, OAuth and transaction submission live in the SDK.
//! The dashboard only needs the narrow surface below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sphere_domain::value_objects::asset_type::{NATIVE_NAME, NATIVE_SYMBOL};
use sphere_domain::{Amount, AssetType, EnrichedBalance, HistoryEntry, Network, TokenAmount};
use thiserror::Error;

/// Type string of the native coin.
pub const NATIVE_ASSET_TYPE: &str = "0x1::cedra_coin::CedraCoin";

/// Errors reported by the wallet SDK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The SDK refused the operation; the message comes from the SDK.
    #[error("{0}")]
    Rejected(String),
    #[error("Wallet is watch-only")]
    ReadOnly,
    #[error("Wallet SDK unavailable: {0}")]
    Unavailable(String),
}

/// Balance of one asset as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub asset_type: Option<AssetType>,
    pub amount: Amount,
    pub symbol: Option<String>,
}

impl WalletBalance {
    /// Converts the SDK's primary balance into a dashboard token row.
    pub fn to_primary_entry(&self) -> Option<EnrichedBalance> {
        let asset_type = match &self.asset_type {
            Some(asset_type) => asset_type.clone(),
            None => AssetType::new(NATIVE_ASSET_TYPE).ok()?,
        };
        Some(EnrichedBalance {
            asset_type,
            amount: self.amount.raw,
            symbol: self
                .symbol
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| NATIVE_SYMBOL.to_string()),
            name: NATIVE_NAME.to_string(),
            icon: None,
            decimals: self.amount.decimals,
            formatted_amount: self.amount.to_display_string(),
        })
    }
}

/// Transfer handed to the SDK for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    /// Amount in the smallest unit of the asset.
    pub amount: TokenAmount,
    /// `None` sends the native coin.
    pub asset_type: Option<AssetType>,
}

/// Operations the dashboard uses from the wallet SDK.
#[async_trait]
pub trait WalletSdk: Send + Sync {
    /// Account address of the signed-in wallet.
    fn address(&self) -> String;

    /// Balance of `asset_type`, or of the native coin when `None`.
    async fn balance(&self, asset_type: Option<&AssetType>) -> Result<WalletBalance, SdkError>;

    /// Signs and submits a transfer, returning the transaction hash.
    async fn send_transaction(&self, request: &TransferRequest) -> Result<String, SdkError>;

    /// Recent transactions from the fullnode, used when no indexer is configured.
    async fn transaction_history(&self) -> Result<Vec<HistoryEntry>, SdkError>;

    /// Points the SDK at another network.
    async fn update_network(&self, network: Network, rpc_endpoint: &str) -> Result<(), SdkError>;

    /// Reloads cached account data after a state change.
    async fn refresh(&self) -> Result<(), SdkError>;
}
