//! User-initiated transfers through the wallet SDK.

use crate::session::Session;
use crate::wallet::{SdkError, TransferRequest};
use serde::{Deserialize, Serialize};
use sphere_domain::value_objects::asset_type::{NATIVE_NAME, NATIVE_SYMBOL};
use sphere_domain::{Amount, AssetType, DomainError, TokenAmount};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Message shown when the SDK rejects a transfer without saying why.
pub const GENERIC_FAILURE: &str = "Transaction failed";

/// Errors surfaced to the send form. `Display` is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Connect a wallet first")]
    NoWallet,
    #[error("Recipient address is required")]
    MissingRecipient,
    #[error("Amount is required")]
    MissingAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(DomainError),
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("{}", rejection_message(.0))]
    Rejected(String),
}

fn rejection_message(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_FAILURE
    } else {
        message
    }
}

impl From<SdkError> for TransferError {
    fn from(e: SdkError) -> Self {
        match e {
            SdkError::Rejected(message) => Self::Rejected(message),
            other => Self::Rejected(other.to_string()),
        }
    }
}

/// Input of the send form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferForm {
    pub recipient: String,
    /// Decimal text in whole units, e.g. `"1.5"`.
    pub amount: String,
    /// `None` sends the native coin.
    pub asset_type: Option<AssetType>,
}

/// Successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub hash: String,
    pub amount: Amount,
    pub explorer_url: String,
}

/// Labels of the token selected in the send form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLabels {
    pub name: String,
    pub symbol: String,
}

impl TokenLabels {
    /// Resolves display labels, preferring explicit values.
    pub fn resolve(
        asset_type: Option<&AssetType>,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| asset_type.and_then(AssetType::struct_name))
            .unwrap_or_else(|| NATIVE_NAME.to_string());
        let symbol = symbol
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NATIVE_SYMBOL)
            .to_string();
        Self { name, symbol }
    }
}

/// Validates and submits transfers for the signed-in wallet.
pub struct TransferService {
    session: Arc<Session>,
}

impl TransferService {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Sends `form` and returns the transaction receipt. Never retried.
    pub async fn send(&self, form: &TransferForm) -> Result<TransferReceipt, TransferError> {
        let snapshot = self.session.snapshot();
        let wallet = snapshot.wallet.ok_or(TransferError::NoWallet)?;

        let recipient = form.recipient.trim();
        if recipient.is_empty() {
            return Err(TransferError::MissingRecipient);
        }
        if form.amount.trim().is_empty() {
            return Err(TransferError::MissingAmount);
        }

        let balance = wallet.balance(form.asset_type.as_ref()).await?;
        let amount = Amount::parse_decimal(&form.amount, balance.amount.decimals)
            .map_err(TransferError::InvalidAmount)?;
        if amount.raw == TokenAmount::zero() {
            return Err(TransferError::ZeroAmount);
        }

        let request = TransferRequest {
            recipient: recipient.to_string(),
            amount: amount.raw,
            asset_type: form.asset_type.clone(),
        };

        let hash = match wallet.send_transaction(&request).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!(recipient = %request.recipient, error = %e, "Transfer rejected");
                return Err(e.into());
            }
        };
        info!(hash = %hash, recipient = %request.recipient, amount = %amount, "Transfer submitted");

        if let Err(e) = wallet.refresh().await {
            warn!(error = %e, "Wallet refresh after transfer failed");
        }

        Ok(TransferReceipt {
            explorer_url: snapshot.network.explorer_tx_url(&hash),
            hash,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWallet;
    use sphere_domain::Network;
    use std::sync::atomic::Ordering;

    fn service(wallet: Arc<FakeWallet>) -> TransferService {
        let session = Arc::new(Session::new(Network::Testnet, None));
        session.attach_wallet(wallet);
        TransferService::new(session)
    }

    fn form(recipient: &str, amount: &str) -> TransferForm {
        TransferForm {
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            asset_type: None,
        }
    }

    #[tokio::test]
    async fn test_send_converts_to_smallest_unit() {
        let wallet = Arc::new(FakeWallet::new("0xabc"));
        let service = service(wallet.clone());

        let receipt = service.send(&form(" 0xdef ", "1.5")).await.unwrap();

        let sent = wallet.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "0xdef");
        assert_eq!(sent[0].amount, TokenAmount::from(150_000_000u64));
        assert_eq!(receipt.amount.to_display_string(), "1.50000000");
        assert!(receipt.explorer_url.ends_with("?network=testnet"));
        assert_eq!(wallet.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_excess_precision_is_floored() {
        let wallet = Arc::new(FakeWallet::new("0xabc").with_decimals(2));
        let service = service(wallet.clone());

        service.send(&form("0xdef", "0.129")).await.unwrap();

        assert_eq!(
            wallet.sent.lock().unwrap()[0].amount,
            TokenAmount::from(12u64)
        );
    }

    #[tokio::test]
    async fn test_form_validation() {
        let service = service(Arc::new(FakeWallet::new("0xabc")));

        assert_eq!(
            service.send(&form("", "1")).await,
            Err(TransferError::MissingRecipient)
        );
        assert_eq!(
            service.send(&form("0xdef", " ")).await,
            Err(TransferError::MissingAmount)
        );
        assert_eq!(
            service.send(&form("0xdef", "0")).await,
            Err(TransferError::ZeroAmount)
        );
        assert!(matches!(
            service.send(&form("0xdef", "abc")).await,
            Err(TransferError::InvalidAmount(_))
        ));
        assert!(matches!(
            service.send(&form("0xdef", "-1")).await,
            Err(TransferError::InvalidAmount(DomainError::NegativeAmount))
        ));
    }

    #[tokio::test]
    async fn test_no_wallet() {
        let service = TransferService::new(Arc::new(Session::new(Network::Testnet, None)));
        assert_eq!(
            service.send(&form("0xdef", "1")).await,
            Err(TransferError::NoWallet)
        );
    }

    #[tokio::test]
    async fn test_rejection_messages() {
        let silent = service(Arc::new(FakeWallet::new("0xabc").rejecting("")));
        let err = silent.send(&form("0xdef", "1")).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let verbose = service(Arc::new(
            FakeWallet::new("0xabc").rejecting("Insufficient balance"),
        ));
        let err = verbose.send(&form("0xdef", "1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");
    }

    #[test]
    fn test_token_labels() {
        let usdc = AssetType::new("0xcafe::usdc::USDCoin").unwrap();

        let labels = TokenLabels::resolve(Some(&usdc), None, Some("USDC"));
        assert_eq!(labels.name, "USD");
        assert_eq!(labels.symbol, "USDC");

        let labels = TokenLabels::resolve(None, None, None);
        assert_eq!(labels.name, "Cedra");
        assert_eq!(labels.symbol, "CED");

        let labels = TokenLabels::resolve(Some(&usdc), Some("USD Coin"), None);
        assert_eq!(labels.name, "USD Coin");
        assert_eq!(labels.symbol, "CED");
    }
}
