// ethcompat/core/api/src/lib.rs

//! Conversion of signed Ethereum transactions (legacy and EIP-1559) into
//! native signed messages, plus the reverse mapping.

pub mod address_mapping;
pub mod config;
pub mod eip1559_decoder;
pub mod error;
pub mod eth_transaction;
pub mod eth_tx_decoder;
pub mod legacy_decoder;
pub mod message_builder;
pub mod rlp_fields;
pub mod rpc;
pub mod signature;

pub use address_mapping::{AddressMapper, DelegatedAddressMapper};
pub use config::{DecoderConfig, CALIBNET_CHAIN_ID, DEVNET_CHAIN_ID, MAINNET_CHAIN_ID};
pub use eip1559_decoder::Eip1559Transaction;
pub use error::{Result, TransactionDecoderError, UnsupportedReason};
pub use eth_transaction::{EthTransaction, TransactionType};
pub use eth_tx_decoder::{parse_eth_transaction, to_signed_message, DecodedTransaction, EthTxConverter};
pub use legacy_decoder::{derive_chain_id, LegacyTransaction};
pub use rpc::{send_raw_transaction, MessageSubmitter, RawTransactionError};
pub use signature::{pack_sig_fields, PackedSignature, RecoveredSender};
