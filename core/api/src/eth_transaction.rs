// ethcompat/core/api/src/eth_transaction.rs

use crate::address_mapping::AddressMapper;
use crate::eip1559_decoder::{Eip1559Transaction, EIP_1559_TX_TYPE};
use crate::error::{Result, TransactionDecoderError};
use crate::legacy_decoder::{derive_chain_id, LegacyTransaction};
use crate::message_builder::{eth_call_target, MESSAGE_VERSION};
use crate::signature::{
    keccak256, pack_sig_fields, recover_sender, split_delegated_signature, RecoveredSender,
    EIP_1559_SIG_LEN, EIP_155_SIG_PREFIX, HOMESTEAD_SIG_LEN, HOMESTEAD_SIG_PREFIX,
};
use ethcompat_primitives::{EthAddress, Hash, Signature, SignatureType, SignedMessage};
use ethereum_types::H256;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope type byte of access-list transactions
pub const EIP_2930_TX_TYPE: u8 = 0x01;

/// Envelope classification by first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Legacy,
    Eip2930,
    Eip1559,
    Unknown(u8),
}

impl TransactionType {
    /// Bytes above 0x7f start an RLP list or string and are legacy; lower
    /// bytes are typed-envelope tags.
    pub fn classify(first_byte: u8) -> Self {
        match first_byte {
            0x80..=0xff => TransactionType::Legacy,
            EIP_2930_TX_TYPE => TransactionType::Eip2930,
            EIP_1559_TX_TYPE => TransactionType::Eip1559,
            other => TransactionType::Unknown(other),
        }
    }

    pub fn detect(data: &[u8]) -> Result<Self> {
        data.first()
            .copied()
            .map(Self::classify)
            .ok_or(TransactionDecoderError::EmptyInput)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Legacy => write!(f, "legacy"),
            TransactionType::Eip2930 => write!(f, "eip-2930"),
            TransactionType::Eip1559 => write!(f, "eip-1559"),
            TransactionType::Unknown(byte) => write!(f, "unknown({:#04x})", byte),
        }
    }
}

/// Decoded Ethereum transaction of a supported kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthTransaction {
    Legacy(LegacyTransaction),
    Eip1559(Eip1559Transaction),
}

impl EthTransaction {
    pub fn tx_type(&self) -> TransactionType {
        match self {
            EthTransaction::Legacy(_) => TransactionType::Legacy,
            EthTransaction::Eip1559(_) => TransactionType::Eip1559,
        }
    }

    /// Chain id the signature is bound to; `None` for Homestead legacy
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            EthTransaction::Legacy(tx) => tx.chain_id(),
            EthTransaction::Eip1559(tx) => Some(tx.chain_id),
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            EthTransaction::Legacy(tx) => tx.nonce,
            EthTransaction::Eip1559(tx) => tx.nonce,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            EthTransaction::Legacy(tx) => tx.gas_limit,
            EthTransaction::Eip1559(tx) => tx.gas_limit,
        }
    }

    pub fn to(&self) -> Option<&EthAddress> {
        match self {
            EthTransaction::Legacy(tx) => tx.to.as_ref(),
            EthTransaction::Eip1559(tx) => tx.to.as_ref(),
        }
    }

    pub fn value(&self) -> &BigUint {
        match self {
            EthTransaction::Legacy(tx) => &tx.value,
            EthTransaction::Eip1559(tx) => &tx.value,
        }
    }

    pub fn input(&self) -> &[u8] {
        match self {
            EthTransaction::Legacy(tx) => &tx.input,
            EthTransaction::Eip1559(tx) => &tx.input,
        }
    }

    fn sig_values(&self) -> (&BigUint, &BigUint, &BigUint) {
        match self {
            EthTransaction::Legacy(tx) => (&tx.v, &tx.r, &tx.s),
            EthTransaction::Eip1559(tx) => (&tx.v, &tx.r, &tx.s),
        }
    }

    pub fn recovery_id(&self) -> Result<u8> {
        match self {
            EthTransaction::Legacy(tx) => tx.recovery_id(),
            EthTransaction::Eip1559(tx) => tx.recovery_id(),
        }
    }

    pub fn rlp_unsigned_message(&self) -> Result<Vec<u8>> {
        match self {
            EthTransaction::Legacy(tx) => tx.rlp_unsigned_message(),
            EthTransaction::Eip1559(tx) => Ok(tx.rlp_unsigned_message()),
        }
    }

    /// Hash the sender signed
    pub fn signing_hash(&self) -> Result<H256> {
        Ok(keccak256(&self.rlp_unsigned_message()?))
    }

    /// Canonical signed encoding, byte-identical to a canonical input
    pub fn rlp_signed_message(&self) -> Vec<u8> {
        match self {
            EthTransaction::Legacy(tx) => tx.rlp_signed_message(),
            EthTransaction::Eip1559(tx) => tx.rlp_signed_message(),
        }
    }

    /// Ethereum transaction hash
    pub fn tx_hash(&self) -> Hash {
        Hash::new(keccak256(&self.rlp_signed_message()).to_fixed_bytes())
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        match self {
            EthTransaction::Legacy(tx) => tx.signature_bytes(),
            EthTransaction::Eip1559(tx) => tx.signature_bytes(),
        }
    }

    pub fn signature(&self) -> Result<Signature> {
        Ok(Signature::new_delegated(self.signature_bytes()?))
    }

    /// Recover the sending key and address.
    pub fn recover_sender(&self) -> Result<RecoveredSender> {
        let (v, r, s) = self.sig_values();
        let packed = pack_sig_fields(v, r, s)?;
        let recovery_id = self.recovery_id()?;
        recover_sender(&self.signing_hash()?, recovery_id, &packed.r, &packed.s)
    }

    /// Rebuild the Ethereum transaction a signed message was converted from.
    pub fn from_signed_message<M: AddressMapper>(
        msg: &SignedMessage,
        chain_id: u64,
        mapper: &M,
    ) -> Result<Self> {
        let signature = msg.signature();
        if signature.signature_type() != SignatureType::Delegated {
            return Err(TransactionDecoderError::NotEthereumMessage(format!(
                "signature type {:?} is not delegated",
                signature.signature_type()
            )));
        }

        let message = msg.message();
        if message.version != MESSAGE_VERSION {
            return Err(TransactionDecoderError::NotEthereumMessage(format!(
                "unsupported message version {}",
                message.version
            )));
        }
        mapper.to_eth(&message.from).ok_or_else(|| {
            TransactionDecoderError::NotEthereumMessage("sender has no Ethereum address".to_string())
        })?;

        let (to, input) = eth_call_target(message, mapper)?;
        let sig = signature.bytes();

        if sig.len() == EIP_1559_SIG_LEN {
            let (v, r, s) = split_delegated_signature(sig)?;
            let tx = Eip1559Transaction {
                chain_id,
                nonce: message.sequence,
                max_priority_fee_per_gas: message.gas_premium.atto().clone(),
                max_fee_per_gas: message.gas_fee_cap.atto().clone(),
                gas_limit: message.gas_limit,
                to,
                value: message.value.atto().clone(),
                input,
                v,
                r,
                s,
            };
            tx.recovery_id()
                .map_err(|_| TransactionDecoderError::NotEthereumMessage("invalid y parity".to_string()))?;
            return Ok(EthTransaction::Eip1559(tx));
        }

        if message.gas_fee_cap != message.gas_premium {
            return Err(TransactionDecoderError::NotEthereumMessage(
                "legacy message gas fee cap and premium differ".to_string(),
            ));
        }

        let (v, r, s) = match sig.split_first() {
            Some((&HOMESTEAD_SIG_PREFIX, rest)) if sig.len() == HOMESTEAD_SIG_LEN => {
                let (v, r, s) = split_delegated_signature(rest)?;
                if derive_chain_id(&v).ok() != Some(None) {
                    return Err(TransactionDecoderError::NotEthereumMessage(format!(
                        "homestead signature with v = {}",
                        v
                    )));
                }
                (v, r, s)
            }
            Some((&EIP_155_SIG_PREFIX, rest)) => {
                let (v, r, s) = split_delegated_signature(rest)?;
                if derive_chain_id(&v).ok() != Some(Some(BigUint::from(chain_id))) {
                    return Err(TransactionDecoderError::NotEthereumMessage(format!(
                        "EIP-155 signature with v = {} is not bound to chain {}",
                        v, chain_id
                    )));
                }
                (v, r, s)
            }
            _ => {
                return Err(TransactionDecoderError::NotEthereumMessage(format!(
                    "unrecognized delegated signature of {} bytes",
                    sig.len()
                )))
            }
        };

        Ok(EthTransaction::Legacy(LegacyTransaction {
            nonce: message.sequence,
            gas_price: message.gas_fee_cap.atto().clone(),
            gas_limit: message.gas_limit,
            to,
            value: message.value.atto().clone(),
            input,
            v,
            r,
            s,
        }))
    }
}
