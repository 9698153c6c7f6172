// ethcompat/cli/src/commands/inspect.rs
//
// Offline inspection of raw Ethereum transactions

use anyhow::{Context, Result};
use clap::Subcommand;
use ethcompat_api::rpc::decode_raw_hex;
use ethcompat_api::{AddressMapper, EthTxConverter, TransactionType};
use ethcompat_primitives::{Address, EthAddress, Hash, SignedMessage};
use serde::Serialize;

use crate::config::Config;

#[derive(Subcommand)]
pub enum InspectCommands {
    /// Decode a raw transaction and print the native signed message
    Decode {
        /// Raw transaction hex (with or without 0x)
        raw: String,
    },

    /// Recover the sender of a raw transaction
    Sender {
        /// Raw transaction hex (with or without 0x)
        raw: String,
    },

    /// Classify the transaction envelope without decoding it
    Classify {
        /// Raw transaction hex (with or without 0x)
        raw: String,
    },
}

#[derive(Debug, Serialize)]
pub struct DecodeOutput {
    pub tx_type: TransactionType,
    pub chain_id: Option<u64>,
    pub sender: EthAddress,
    pub tx_hash: Hash,
    pub message: SignedMessage,
}

#[derive(Debug, Serialize)]
pub struct SenderOutput {
    pub sender: EthAddress,
    pub native_sender: Address,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub tx_type: TransactionType,
    pub first_byte: String,
    pub size: usize,
}

pub fn execute(cmd: InspectCommands, config: &Config) -> Result<()> {
    let output = match cmd {
        InspectCommands::Decode { raw } => serde_json::to_string_pretty(&decode(&raw, config)?)?,
        InspectCommands::Sender { raw } => serde_json::to_string_pretty(&sender(&raw, config)?)?,
        InspectCommands::Classify { raw } => serde_json::to_string_pretty(&classify(&raw)?)?,
    };
    println!("{}", output);
    Ok(())
}

fn raw_bytes(raw: &str) -> Result<Vec<u8>> {
    decode_raw_hex(raw).context("Invalid transaction hex")
}

pub fn decode(raw: &str, config: &Config) -> Result<DecodeOutput> {
    let converter = EthTxConverter::new(config.decoder.clone());
    let decoded = converter
        .decode(&raw_bytes(raw)?)
        .context("Failed to convert transaction")?;

    tracing::debug!(tx_hash = %decoded.tx_hash, "Decoded transaction");

    Ok(DecodeOutput {
        tx_type: decoded.tx_type,
        chain_id: decoded.chain_id,
        sender: decoded.sender,
        tx_hash: decoded.tx_hash,
        message: decoded.message,
    })
}

pub fn sender(raw: &str, config: &Config) -> Result<SenderOutput> {
    let converter = EthTxConverter::new(config.decoder.clone());
    let recovered = converter
        .recover_sender(&raw_bytes(raw)?)
        .context("Failed to recover sender")?;

    Ok(SenderOutput {
        native_sender: converter.mapper().to_native(&recovered.address),
        sender: recovered.address,
    })
}

pub fn classify(raw: &str) -> Result<ClassifyOutput> {
    let bytes = raw_bytes(raw)?;
    let tx_type = TransactionType::detect(&bytes)?;

    Ok(ClassifyOutput {
        tx_type,
        first_byte: format!("{:#04x}", bytes[0]),
        size: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    const CALIBNET_EIP1559_TX: &str = "0x02f901368304cb2f8201e68459682f008459682f7884023b53a794eb4a9cdb9f42d3a503d580a39b6e3736eb21fffd80b8c4383487be000000000000000000000000000000000000000000000000000000000000006000000000000000000000000000000000000000000000000000000000660d4d120000000000000000000000000000000000000000000000000000000000000001000000000000000000000000000000000000000000000000000000000000003b6261666b726569656f6f75326d36356276376561786e7767656d7562723675787269696867366474646e6c7a663469616f37686c6e6a6d647372750000000000c001a0b9f0afb3fa8821fa414bac6056e613c61a8263ca341b59539096dbbc8600f530a0114a6a032347e132f115accc7664ccc61549be28f5b844c3fc170006feb72f24";

    fn calibnet_config() -> Config {
        Config::load(None, None, Some(Network::Calibnet), None).unwrap()
    }

    #[test]
    fn test_decode_output() {
        let output = decode(CALIBNET_EIP1559_TX, &calibnet_config()).unwrap();
        assert_eq!(output.tx_type, TransactionType::Eip1559);
        assert_eq!(output.chain_id, Some(314159));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["tx_type"], "eip1559");
        assert_eq!(
            json["tx_hash"],
            "0x9f2e70d5737c6b798eccea14895893fb48091ab3c59d0fe95508dc7efdae2e5f"
        );
        assert_eq!(json["message"]["message"]["sequence"], 486);
    }

    #[test]
    fn test_decode_wrong_network_fails() {
        let config = Config::default();
        assert!(decode(CALIBNET_EIP1559_TX, &config).is_err());
    }

    #[test]
    fn test_sender_output() {
        let output = sender(CALIBNET_EIP1559_TX, &calibnet_config()).unwrap();
        assert_eq!(
            output.sender.to_string(),
            "0x4fda4174d5d07c906395bfb77806287cc65fd129"
        );
        assert_eq!(output.native_sender, Address::from_eth_address(&output.sender));
    }

    #[test]
    fn test_classify_output() {
        let output = classify(CALIBNET_EIP1559_TX).unwrap();
        assert_eq!(output.tx_type, TransactionType::Eip1559);
        assert_eq!(output.first_byte, "0x02");

        let output = classify("0x01c0").unwrap();
        assert_eq!(output.tx_type, TransactionType::Eip2930);

        assert!(classify("0x").is_err());
        assert!(classify("zz").is_err());
    }
}
