use crate::value_objects::asset_type::AssetType;
use serde::{Deserialize, Serialize};

/// Display metadata of an asset as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub asset_type: AssetType,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub icon_uri: Option<String>,
}

impl AssetMetadata {
    pub fn new(
        asset_type: AssetType,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            asset_type,
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            icon_uri: None,
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon_uri: impl Into<String>) -> Self {
        self.icon_uri = Some(icon_uri.into());
        self
    }
}
