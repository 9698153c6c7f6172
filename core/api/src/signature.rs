// ethcompat/core/api/src/signature.rs
//
// Signature canonicalization, delegated signature layout and sender recovery

use crate::error::{Result, TransactionDecoderError};
use ethcompat_primitives::EthAddress;
use ethereum_types::H256;
use num_bigint::BigUint;
use secp256k1::{
    constants::CURVE_ORDER,
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, Secp256k1,
};
use sha3::{Digest, Keccak256};

/// Width of the r and s components
pub const SIG_COMPONENT_LEN: usize = 32;

/// Length of an EIP-1559 delegated signature: r ‖ s ‖ yParity
pub const EIP_1559_SIG_LEN: usize = 65;

/// Length of a Homestead delegated signature: 0x01 ‖ r ‖ s ‖ v
pub const HOMESTEAD_SIG_LEN: usize = 66;

/// Prefix marking a legacy signature without chain binding
pub const HOMESTEAD_SIG_PREFIX: u8 = 0x01;

/// Prefix marking a legacy EIP-155 signature
pub const EIP_155_SIG_PREFIX: u8 = 0x02;

/// Canonical (v, r, s) in minimal big-endian form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSignature {
    pub v: Vec<u8>,
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

/// Sender recovered from a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredSender {
    pub public_key: PublicKey,
    pub address: EthAddress,
}

/// Keccak-256 of `data`
pub fn keccak256(data: &[u8]) -> H256 {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    H256::from(out)
}

/// Minimal big-endian bytes of `value`; zero becomes a single 0x00 byte.
pub fn format_big_uint(value: &BigUint, field: &'static str, max_len: Option<usize>) -> Result<Vec<u8>> {
    let bytes = value.to_bytes_be();
    if let Some(max) = max_len {
        if bytes.len() > max {
            return Err(TransactionDecoderError::IntegerOverflow { field });
        }
    }
    Ok(bytes)
}

/// Canonicalize signature values; r and s must fit in 32 bytes, v is unbounded.
pub fn pack_sig_fields(v: &BigUint, r: &BigUint, s: &BigUint) -> Result<PackedSignature> {
    Ok(PackedSignature {
        v: format_big_uint(v, "v", None)?,
        r: format_big_uint(r, "r", Some(SIG_COMPONENT_LEN))?,
        s: format_big_uint(s, "s", Some(SIG_COMPONENT_LEN))?,
    })
}

/// Left-pad `bytes` with zeros to 32 bytes.
pub fn pad_to_32(bytes: &[u8], field: &'static str) -> Result<[u8; 32]> {
    if bytes.len() > SIG_COMPONENT_LEN {
        return Err(TransactionDecoderError::IntegerOverflow { field });
    }
    let mut out = [0u8; 32];
    out[SIG_COMPONENT_LEN - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

/// Lay out delegated signature bytes: `prefix? ‖ pad32(r) ‖ pad32(s) ‖ v`.
pub fn encode_delegated_signature(prefix: Option<u8>, packed: &PackedSignature) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(1 + 2 * SIG_COMPONENT_LEN + packed.v.len());
    if let Some(prefix) = prefix {
        out.push(prefix);
    }
    out.extend_from_slice(&pad_to_32(&packed.r, "r")?);
    out.extend_from_slice(&pad_to_32(&packed.s, "s")?);
    out.extend_from_slice(&packed.v);
    Ok(out)
}

/// Split unprefixed delegated signature bytes back into (v, r, s).
pub fn split_delegated_signature(bytes: &[u8]) -> Result<(BigUint, BigUint, BigUint)> {
    if bytes.len() <= 2 * SIG_COMPONENT_LEN {
        return Err(TransactionDecoderError::NotEthereumMessage(format!(
            "signature too short: {} bytes",
            bytes.len()
        )));
    }
    let r = BigUint::from_bytes_be(&bytes[..SIG_COMPONENT_LEN]);
    let s = BigUint::from_bytes_be(&bytes[SIG_COMPONENT_LEN..2 * SIG_COMPONENT_LEN]);
    let v = BigUint::from_bytes_be(&bytes[2 * SIG_COMPONENT_LEN..]);
    Ok((v, r, s))
}

/// Ethereum address of a public key: last 20 bytes of keccak(uncompressed[1..]).
pub fn eth_address_from_public_key(public_key: &PublicKey) -> EthAddress {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.as_bytes()[12..]);
    EthAddress::from(address)
}

/// Recover the signer of `signing_hash` from canonical r and s.
pub fn recover_sender(signing_hash: &H256, recovery_id: u8, r: &[u8], s: &[u8]) -> Result<RecoveredSender> {
    let r = pad_to_32(r, "r")?;
    let s = pad_to_32(s, "s")?;

    if r == [0u8; 32] || s == [0u8; 32] {
        return Err(TransactionDecoderError::SignatureRecoveryFailure(
            "r and s must be non-zero".to_string(),
        ));
    }
    if r >= CURVE_ORDER || s >= CURVE_ORDER {
        return Err(TransactionDecoderError::SignatureRecoveryFailure(
            "signature component not below curve order".to_string(),
        ));
    }

    let recovery_id = RecoveryId::from_i32(i32::from(recovery_id))
        .map_err(|e| TransactionDecoderError::SignatureRecoveryFailure(format!("invalid recovery id: {}", e)))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&r);
    compact[32..].copy_from_slice(&s);

    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| TransactionDecoderError::SignatureRecoveryFailure(format!("invalid signature: {}", e)))?;
    let message = Message::from_slice(signing_hash.as_bytes())
        .map_err(|e| TransactionDecoderError::SignatureRecoveryFailure(format!("invalid message: {}", e)))?;

    let secp = Secp256k1::verification_only();
    let public_key = secp
        .recover_ecdsa(&message, &signature)
        .map_err(|e| TransactionDecoderError::SignatureRecoveryFailure(format!("recovery failed: {}", e)))?;

    Ok(RecoveredSender {
        address: eth_address_from_public_key(&public_key),
        public_key,
    })
}
