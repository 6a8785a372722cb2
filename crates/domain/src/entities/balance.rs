use crate::value_objects::amount::{Amount, TokenAmount};
use crate::value_objects::asset_type::AssetType;
use serde::{Deserialize, Serialize};

/// One balance row from any of the indexer balance tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalanceEntry {
    pub asset_type: AssetType,
    pub amount: TokenAmount,
}

impl RawBalanceEntry {
    pub fn new(asset_type: AssetType, amount: impl Into<TokenAmount>) -> Self {
        Self {
            asset_type,
            amount: amount.into(),
        }
    }
}

/// Balance joined with its metadata, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedBalance {
    pub asset_type: AssetType,
    pub amount: TokenAmount,
    pub symbol: String,
    pub name: String,
    pub icon: Option<String>,
    pub decimals: u8,
    pub formatted_amount: String,
}

impl EnrichedBalance {
    pub fn amount(&self) -> Amount {
        Amount::new(self.amount, self.decimals)
    }
}
