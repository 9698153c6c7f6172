// ethcompat/core/api/src/rpc.rs
//
// eth_sendRawTransaction front door

use crate::address_mapping::AddressMapper;
use crate::error::TransactionDecoderError;
use crate::eth_tx_decoder::EthTxConverter;
use ethcompat_primitives::{Hash, SignedMessage};
use thiserror::Error;

/// Destination for converted messages (mempool, forwarder, ...)
pub trait MessageSubmitter: Send + Sync {
    fn submit(&self, message: SignedMessage) -> anyhow::Result<()>;
}

#[derive(Error, Debug)]
pub enum RawTransactionError {
    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("failed to parse transaction: {0}")]
    Decode(#[from] TransactionDecoderError),

    #[error("failed to submit transaction: {0}")]
    Submission(String),
}

/// Hex-decode a raw transaction parameter, with or without `0x`.
pub fn decode_raw_hex(raw: &str) -> Result<Vec<u8>, RawTransactionError> {
    let trimmed = raw.trim();
    let data = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(data).map_err(|e| RawTransactionError::InvalidHex(e.to_string()))
}

/// Decode, convert and submit one raw transaction, returning its Ethereum hash.
pub fn send_raw_transaction<M: AddressMapper>(
    converter: &EthTxConverter<M>,
    submitter: &dyn MessageSubmitter,
    raw: &str,
) -> Result<Hash, RawTransactionError> {
    let tx_bytes = decode_raw_hex(raw).map_err(|e| {
        tracing::warn!("Failed to decode hex: {}", e);
        e
    })?;

    tracing::debug!(
        size = tx_bytes.len(),
        first_byte = ?tx_bytes.first(),
        "Decoded raw transaction bytes"
    );

    let decoded = match converter.decode(&tx_bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(kind = e.kind(), "Rejected transaction: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        tx_hash = %decoded.tx_hash,
        sender = %decoded.sender,
        tx_type = %decoded.tx_type,
        nonce = decoded.message.message.sequence,
        "Accepted Ethereum transaction"
    );

    let tx_hash = decoded.tx_hash;
    submitter.submit(decoded.message).map_err(|e| {
        tracing::warn!("Failed to submit transaction {}: {:#}", tx_hash, e);
        RawTransactionError::Submission(format!("{:#}", e))
    })?;

    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSubmitter {
        submitted: Mutex<Vec<SignedMessage>>,
    }

    impl MessageSubmitter for RecordingSubmitter {
        fn submit(&self, message: SignedMessage) -> anyhow::Result<()> {
            self.submitted.lock().unwrap().push(message);
            Ok(())
        }
    }

    struct FailingSubmitter;

    impl MessageSubmitter for FailingSubmitter {
        fn submit(&self, _message: SignedMessage) -> anyhow::Result<()> {
            anyhow::bail!("mempool full")
        }
    }

    #[test]
    fn test_decode_raw_hex() {
        assert_eq!(decode_raw_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_raw_hex("0102").unwrap(), vec![1, 2]);
        assert!(matches!(
            decode_raw_hex("0xzz"),
            Err(RawTransactionError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_invalid_input_is_not_submitted() {
        let converter = EthTxConverter::new(DecoderConfig::default());
        let submitter = RecordingSubmitter::default();

        let err = send_raw_transaction(&converter, &submitter, "0x").unwrap_err();
        assert!(matches!(
            err,
            RawTransactionError::Decode(TransactionDecoderError::EmptyInput)
        ));

        let err = send_raw_transaction(&converter, &submitter, "0x05c0").unwrap_err();
        assert!(matches!(
            err,
            RawTransactionError::Decode(TransactionDecoderError::UnsupportedTransactionType { .. })
        ));

        assert!(submitter.submitted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submission_failure_is_reported() {
        // calibnet EIP-1559 transaction
        let raw = "0x02f901368304cb2f8201e68459682f008459682f7884023b53a794eb4a9cdb9f42d3a503d580a39b6e3736eb21fffd80b8c4383487be000000000000000000000000000000000000000000000000000000000000006000000000000000000000000000000000000000000000000000000000660d4d120000000000000000000000000000000000000000000000000000000000000001000000000000000000000000000000000000000000000000000000000000003b6261666b726569656f6f75326d36356276376561786e7767656d7562723675787269696867366474646e6c7a663469616f37686c6e6a6d647372750000000000c001a0b9f0afb3fa8821fa414bac6056e613c61a8263ca341b59539096dbbc8600f530a0114a6a032347e132f115accc7664ccc61549be28f5b844c3fc170006feb72f24";
        let converter = EthTxConverter::new(DecoderConfig::calibnet());

        let recorder = RecordingSubmitter::default();
        let hash = send_raw_transaction(&converter, &recorder, raw).unwrap();
        assert_eq!(
            hash.to_string(),
            "0x9f2e70d5737c6b798eccea14895893fb48091ab3c59d0fe95508dc7efdae2e5f"
        );
        assert_eq!(recorder.submitted.lock().unwrap().len(), 1);

        let err = send_raw_transaction(&converter, &FailingSubmitter, raw).unwrap_err();
        assert!(matches!(err, RawTransactionError::Submission(msg) if msg.contains("mempool full")));
    }
}
