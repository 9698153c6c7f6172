// ethcompat/core/api/src/error.rs

use num_bigint::BigUint;
use rlp::DecoderError;
use std::fmt;
use thiserror::Error;

/// Why a typed envelope was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Access-list transactions (type 0x01) are never accepted
    Eip2930,
    UnknownType,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::Eip2930 => write!(f, "EIP-2930 unsupported"),
            UnsupportedReason::UnknownType => write!(f, "unknown transaction type"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionDecoderError {
    #[error("empty transaction data")]
    EmptyInput,

    #[error("transaction too large: {size} bytes (max: {max})")]
    TransactionTooLarge { size: usize, max: usize },

    #[error("unsupported transaction type {type_byte:#04x}: {reason}")]
    UnsupportedTransactionType {
        type_byte: u8,
        reason: UnsupportedReason,
    },

    #[error("malformed transaction encoding: {0}")]
    MalformedEncoding(String),

    #[error("field count mismatch: expected {expected} fields, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("invalid chain id: expected {expected}, got {actual}")]
    InvalidChainId { expected: u64, actual: BigUint },

    #[error("access lists are not supported")]
    NonEmptyAccessList,

    #[error("integer overflow in field `{field}`")]
    IntegerOverflow { field: &'static str },

    #[error("signature recovery failed: {0}")]
    SignatureRecoveryFailure(String),

    #[error("legacy transaction without EIP-155 replay protection")]
    UnprotectedTransaction,

    #[error("signed message is not an Ethereum transaction: {0}")]
    NotEthereumMessage(String),
}

impl TransactionDecoderError {
    /// Stable short name of the error kind, for logs and RPC error data
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::TransactionTooLarge { .. } => "transaction_too_large",
            Self::UnsupportedTransactionType { .. } => "unsupported_transaction_type",
            Self::MalformedEncoding(_) => "malformed_encoding",
            Self::FieldCountMismatch { .. } => "field_count_mismatch",
            Self::InvalidChainId { .. } => "invalid_chain_id",
            Self::NonEmptyAccessList => "non_empty_access_list",
            Self::IntegerOverflow { .. } => "integer_overflow",
            Self::SignatureRecoveryFailure(_) => "signature_recovery_failure",
            Self::UnprotectedTransaction => "unprotected_transaction",
            Self::NotEthereumMessage(_) => "not_ethereum_message",
        }
    }
}

impl From<DecoderError> for TransactionDecoderError {
    fn from(err: DecoderError) -> Self {
        TransactionDecoderError::MalformedEncoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransactionDecoderError>;
