// ethcompat/core/api/src/config.rs

use serde::{Deserialize, Serialize};

pub const MAINNET_CHAIN_ID: u64 = 314;
pub const CALIBNET_CHAIN_ID: u64 = 314159;
pub const DEVNET_CHAIN_ID: u64 = 31415926;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Chain id transactions must be bound to
    pub chain_id: u64,

    /// Inputs above this size are rejected before parsing
    pub max_transaction_size: usize,

    /// Accept legacy transactions signed without a chain id (v = 27/28)
    pub allow_unprotected_legacy: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl DecoderConfig {
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            max_transaction_size: 131_072, // 128KB
            allow_unprotected_legacy: true,
        }
    }

    pub fn mainnet() -> Self {
        Self::for_chain(MAINNET_CHAIN_ID)
    }

    pub fn calibnet() -> Self {
        Self::for_chain(CALIBNET_CHAIN_ID)
    }

    pub fn devnet() -> Self {
        Self::for_chain(DEVNET_CHAIN_ID)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chain_id == 0 {
            return Err("chain_id must be non-zero".to_string());
        }
        if self.max_transaction_size == 0 {
            return Err("max_transaction_size must be non-zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(DecoderConfig::default().chain_id, 314);
        assert_eq!(DecoderConfig::calibnet().chain_id, 314159);
        assert_eq!(DecoderConfig::devnet().chain_id, 31415926);
        assert!(DecoderConfig::default().allow_unprotected_legacy);
    }

    #[test]
    fn test_validate() {
        assert!(DecoderConfig::mainnet().validate().is_ok());

        let config = DecoderConfig::for_chain(0);
        assert!(config.validate().is_err());

        let config = DecoderConfig {
            max_transaction_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DecoderConfig = serde_json::from_str(r#"{"chain_id": 314159}"#).unwrap();
        assert_eq!(config.chain_id, 314159);
        assert_eq!(config.max_transaction_size, 131_072);
        assert!(config.allow_unprotected_legacy);
    }
}
