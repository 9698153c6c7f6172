// ethcompat/core/primitives/src/econ.rs

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token amount in atto units, unbounded so no source magnitude is truncated
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    pub fn from_atto(atto: impl Into<BigUint>) -> Self {
        Self(atto.into())
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn atto(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<BigUint> for TokenAmount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<TokenAmount> for BigUint {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Serialized as a decimal string.
impl Serialize for TokenAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str(&s)
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid token amount: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_amount_json() {
        let amount = TokenAmount::from_atto(1_000_000_000u64);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1000000000\"");

        let back: TokenAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);

        assert!(serde_json::from_str::<TokenAmount>("\"-5\"").is_err());
    }

    #[test]
    fn test_token_amount_keeps_wide_values() {
        let wide = BigUint::from_bytes_be(&[0xff; 32]);
        let amount = TokenAmount::from(wide.clone());
        assert_eq!(amount.atto(), &wide);
        assert!(!amount.is_zero());
        assert!(TokenAmount::zero().is_zero());
    }
}
