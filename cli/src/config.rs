// ethcompat/cli/src/config.rs

use crate::logging::LogConfig;
use anyhow::Context;
use clap::ValueEnum;
use ethcompat_api::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the configured chain id
pub const CHAIN_ID_ENV: &str = "ETHCOMPAT_CHAIN_ID";

/// Named network presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Calibnet,
    Devnet,
}

impl Network {
    pub fn decoder_config(self) -> DecoderConfig {
        match self {
            Network::Mainnet => DecoderConfig::mainnet(),
            Network::Calibnet => DecoderConfig::calibnet(),
            Network::Devnet => DecoderConfig::devnet(),
        }
    }
}

/// CLI configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Layer sources: file (or defaults), then `ETHCOMPAT_CHAIN_ID`, then flags.
    pub fn load(
        path: Option<&Path>,
        env_chain_id: Option<&str>,
        network: Option<Network>,
        chain_id: Option<u64>,
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(raw) = env_chain_id {
            config.decoder.chain_id = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", CHAIN_ID_ENV, raw))?;
        }

        if let Some(network) = network {
            let preset = network.decoder_config();
            config.decoder.chain_id = preset.chain_id;
        }
        if let Some(chain_id) = chain_id {
            config.decoder.chain_id = chain_id;
        }

        config
            .decoder
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid decoder configuration: {}", e))?;
        Ok(config)
    }
}
