use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum number of fractional digits shown for a formatted amount.
pub const MAX_DISPLAY_DECIMALS: u8 = 8;

/// Returns `10^exp`, or `None` when it does not fit in 256 bits.
pub(crate) fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// Raw on-chain amount in the smallest unit of an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl FromStr for TokenAmount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidAmount(s.to_string()));
        }
        U256::from_dec_str(trimmed)
            .map(Self)
            .map_err(|_| DomainError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct TokenAmountVisitor;

impl Visitor<'_> for TokenAmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or an integer string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(TokenAmount::from)
            .map_err(|_| E::custom(DomainError::NegativeAmount))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    /// JSON integers above `u64::MAX` arrive as floats. Integral values are
    /// kept; digits beyond the 53-bit mantissa are lost.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() || v.fract() != 0.0 {
            return Err(E::custom(DomainError::InvalidAmount(v.to_string())));
        }
        if v < 0.0 {
            return Err(E::custom(DomainError::NegativeAmount));
        }
        format!("{:.0}", v.abs()).parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

/// A raw amount paired with the number of decimals of its asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub raw: TokenAmount,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: TokenAmount, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Converts a human decimal value into the smallest unit, truncating any
    /// precision below one unit.
    pub fn from_decimal(value: Decimal, decimals: u8) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount);
        }
        let multiplier =
            pow10(u32::from(decimals)).ok_or(DomainError::TooManyDecimals(decimals))?;
        let divisor = pow10(value.scale()).ok_or(DomainError::TooManyDecimals(decimals))?;
        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let scaled = mantissa
            .checked_mul(multiplier)
            .ok_or_else(|| DomainError::InvalidAmount(value.to_string()))?;
        Ok(Self::new(TokenAmount(scaled / divisor), decimals))
    }

    /// Parses user-entered text such as `"1.5"` into the smallest unit.
    pub fn parse_decimal(text: &str, decimals: u8) -> Result<Self, DomainError> {
        let value = Decimal::from_str(text.trim())
            .map_err(|_| DomainError::InvalidAmount(text.to_string()))?;
        Self::from_decimal(value, decimals)
    }

    /// Renders `raw / 10^decimals` with exactly `min(decimals, 8)` fractional
    /// digits, rounding half-up on the dropped digits.
    pub fn to_display_string(&self) -> String {
        let shown = self.decimals.min(MAX_DISPLAY_DECIMALS);
        let width = usize::from(shown);
        let raw = self.raw.as_u256();

        // A power of ten past U256 is larger than any amount.
        let (mut whole, rem) = match pow10(u32::from(self.decimals)) {
            Some(divisor) => (raw / divisor, raw % divisor),
            None => (U256::zero(), raw),
        };
        let (mut frac, round_up) = match pow10(u32::from(self.decimals - shown)) {
            Some(scale) => {
                let tail = rem % scale;
                (rem / scale, !tail.is_zero() && tail >= scale - tail)
            }
            None => (U256::zero(), false),
        };

        if round_up {
            frac += U256::one();
            if frac == U256::exp10(width) {
                frac = U256::zero();
                whole += U256::one();
            }
        }

        if width == 0 {
            whole.to_string()
        } else {
            format!("{}.{:0>width$}", whole, frac.to_string())
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}
