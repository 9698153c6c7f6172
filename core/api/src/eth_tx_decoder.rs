// ethcompat/core/api/src/eth_tx_decoder.rs

use crate::address_mapping::{AddressMapper, DelegatedAddressMapper};
use crate::config::DecoderConfig;
use crate::eip1559_decoder::parse_eip1559_transaction;
use crate::error::{Result, TransactionDecoderError, UnsupportedReason};
use crate::eth_transaction::{EthTransaction, TransactionType, EIP_2930_TX_TYPE};
use crate::legacy_decoder::parse_legacy_transaction;
use crate::message_builder::build_signed_message;
use crate::signature::RecoveredSender;
use ethcompat_primitives::{EthAddress, Hash, SignedMessage};

/// Detect the envelope of `data` and decode it into a supported transaction.
///
/// Performs no signature recovery.
pub fn parse_eth_transaction(data: &[u8], config: &DecoderConfig) -> Result<EthTransaction> {
    match TransactionType::detect(data)? {
        TransactionType::Eip2930 => Err(TransactionDecoderError::UnsupportedTransactionType {
            type_byte: EIP_2930_TX_TYPE,
            reason: UnsupportedReason::Eip2930,
        }),
        TransactionType::Unknown(type_byte) => Err(TransactionDecoderError::UnsupportedTransactionType {
            type_byte,
            reason: UnsupportedReason::UnknownType,
        }),
        TransactionType::Legacy => {
            check_size(data, config)?;
            parse_legacy_transaction(data, config).map(EthTransaction::Legacy)
        }
        TransactionType::Eip1559 => {
            check_size(data, config)?;
            parse_eip1559_transaction(data, config).map(EthTransaction::Eip1559)
        }
    }
}

fn check_size(data: &[u8], config: &DecoderConfig) -> Result<()> {
    if data.len() > config.max_transaction_size {
        return Err(TransactionDecoderError::TransactionTooLarge {
            size: data.len(),
            max: config.max_transaction_size,
        });
    }
    Ok(())
}

/// Everything learned while converting one raw transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub message: SignedMessage,
    pub transaction: EthTransaction,
    pub tx_type: TransactionType,
    pub chain_id: Option<u64>,
    pub sender: EthAddress,
    pub tx_hash: Hash,
}

/// Converts raw Ethereum transactions into signed native messages.
///
/// Holds only immutable configuration, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct EthTxConverter<M = DelegatedAddressMapper> {
    config: DecoderConfig,
    mapper: M,
}

impl EthTxConverter<DelegatedAddressMapper> {
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_mapper(config, DelegatedAddressMapper)
    }
}

impl Default for EthTxConverter<DelegatedAddressMapper> {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl<M: AddressMapper> EthTxConverter<M> {
    pub fn with_mapper(config: DecoderConfig, mapper: M) -> Self {
        Self { config, mapper }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Convert raw transaction bytes into a signed message.
    pub fn convert(&self, data: &[u8]) -> Result<SignedMessage> {
        self.decode(data).map(|decoded| decoded.message)
    }

    /// Convert raw transaction bytes, keeping the decoded transaction,
    /// sender and hash alongside the message.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedTransaction> {
        let transaction = parse_eth_transaction(data, &self.config)?;
        let sender = transaction.recover_sender()?.address;
        let message = build_signed_message(&transaction, &sender, &self.mapper)?;

        Ok(DecodedTransaction {
            message,
            tx_type: transaction.tx_type(),
            chain_id: transaction.chain_id(),
            sender,
            tx_hash: transaction.tx_hash(),
            transaction,
        })
    }

    /// Decode and recover the sender without assembling a message.
    pub fn recover_sender(&self, data: &[u8]) -> Result<RecoveredSender> {
        parse_eth_transaction(data, &self.config)?.recover_sender()
    }

    /// Rebuild the Ethereum transaction behind a converted message.
    pub fn to_eth_transaction(&self, msg: &SignedMessage) -> Result<EthTransaction> {
        EthTransaction::from_signed_message(msg, self.config.chain_id, &self.mapper)
    }
}

/// Convert with the default address mapping.
pub fn to_signed_message(data: &[u8], config: &DecoderConfig) -> Result<SignedMessage> {
    EthTxConverter::new(config.clone()).convert(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let converter = EthTxConverter::new(DecoderConfig::default());
        assert_eq!(converter.convert(&[]), Err(TransactionDecoderError::EmptyInput));
    }

    #[test]
    fn test_size_limit() {
        let config = DecoderConfig {
            max_transaction_size: 4,
            ..DecoderConfig::default()
        };
        assert_eq!(
            parse_eth_transaction(&[0xc5, 1, 2, 3, 4, 5], &config),
            Err(TransactionDecoderError::TransactionTooLarge { size: 6, max: 4 })
        );
    }

    #[test]
    fn test_size_limit_skips_unsupported_envelopes() {
        let config = DecoderConfig::mainnet();
        let mut data = vec![0x01];
        data.extend(std::iter::repeat(0u8).take(200_000));
        assert_eq!(
            EthTxConverter::new(config.clone()).convert(&data),
            Err(TransactionDecoderError::UnsupportedTransactionType {
                type_byte: 0x01,
                reason: UnsupportedReason::Eip2930,
            })
        );

        data[0] = 0x05;
        assert_eq!(
            parse_eth_transaction(&data, &config),
            Err(TransactionDecoderError::UnsupportedTransactionType {
                type_byte: 0x05,
                reason: UnsupportedReason::UnknownType,
            })
        );

        data[0] = 0x02;
        assert_eq!(
            parse_eth_transaction(&data, &config),
            Err(TransactionDecoderError::TransactionTooLarge { size: 200_001, max: 131_072 })
        );
    }

    #[test]
    fn test_eip2930_rejected() {
        let err = parse_eth_transaction(&[0x01, 0xc0], &DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TransactionDecoderError::UnsupportedTransactionType {
                type_byte: 0x01,
                reason: UnsupportedReason::Eip2930,
            }
        );
        assert!(err.to_string().contains("EIP-2930 unsupported"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        for byte in [0x00u8, 0x03, 0x05, 0x7f] {
            assert_eq!(
                parse_eth_transaction(&[byte, 0xc0], &DecoderConfig::default()),
                Err(TransactionDecoderError::UnsupportedTransactionType {
                    type_byte: byte,
                    reason: UnsupportedReason::UnknownType,
                })
            );
        }
    }

    #[test]
    fn test_short_string_prefix_is_malformed_legacy() {
        assert!(matches!(
            parse_eth_transaction(&[0x83, 1, 2, 3], &DecoderConfig::default()),
            Err(TransactionDecoderError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_converter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EthTxConverter>();
    }
}
