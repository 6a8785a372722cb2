use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Substring identifying the chain's native coin inside an asset type.
pub const NATIVE_COIN_MARKER: &str = "cedra_coin";
/// Display symbol of the native coin.
pub const NATIVE_SYMBOL: &str = "CED";
/// Display name of the native coin.
pub const NATIVE_NAME: &str = "Cedra";
/// Name shown for assets without metadata.
pub const UNKNOWN_TOKEN_NAME: &str = "Unknown Token";
/// Separator between address, module and struct in a type string.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Unique key of a coin or fungible asset, e.g. `0x1::cedra_coin::CedraCoin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetType(String);

impl AssetType {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyAssetType);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this type refers to the chain's native coin.
    pub fn is_native(&self) -> bool {
        self.0.contains(NATIVE_COIN_MARKER)
    }

    /// Text after the last `::`, or the whole type when there is none.
    pub fn trailing_segment(&self) -> &str {
        self.0
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// Name derived from the struct segment, `0x1::foo::BarCoin` gives `Bar`.
    pub fn struct_name(&self) -> Option<String> {
        let segment = self.0.split(NAMESPACE_SEPARATOR).nth(2)?;
        let stripped = match segment.len().checked_sub(4) {
            Some(cut)
                if segment.is_char_boundary(cut)
                    && segment[cut..].eq_ignore_ascii_case("coin") =>
            {
                &segment[..cut]
            }
            _ => segment,
        };
        Some(stripped.to_string())
    }
}

impl TryFrom<String> for AssetType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetType> for String {
    fn from(value: AssetType) -> Self {
        value.0
    }
}

impl FromStr for AssetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_marker() {
        let native = AssetType::new("0x1::cedra_coin::CedraCoin").unwrap();
        assert!(native.is_native());

        let other = AssetType::new("0xabc::usdt::USDT").unwrap();
        assert!(!other.is_native());
    }

    #[test]
    fn test_trailing_segment() {
        let t = AssetType::new("0xabc::usdt::USDT").unwrap();
        assert_eq!(t.trailing_segment(), "USDT");

        let fa = AssetType::new("0x5e1f").unwrap();
        assert_eq!(fa.trailing_segment(), "0x5e1f");
    }

    #[test]
    fn test_struct_name_strips_coin_suffix() {
        let t = AssetType::new("0x1::cedra_coin::CedraCoin").unwrap();
        assert_eq!(t.struct_name().as_deref(), Some("Cedra"));

        let t = AssetType::new("0x1::moon::MOONCOIN").unwrap();
        assert_eq!(t.struct_name().as_deref(), Some("MOON"));

        let t = AssetType::new("0x5e1f").unwrap();
        assert_eq!(t.struct_name(), None);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(AssetType::new("  "), Err(DomainError::EmptyAssetType));
    }
}
