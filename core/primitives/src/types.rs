// ethcompat/core/primitives/src/types.rs

use crate::address::{Address, ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID};
use crate::econ::TokenAmount;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Hash type for transaction identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    pub fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let data: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(|e| serde::de::Error::custom(format!("invalid hash hex: {}", e)))?;
        Hash::from_slice(&bytes).ok_or_else(|| serde::de::Error::custom("invalid hash length"))
    }
}

/// Actor method selector
pub type MethodNum = u64;

/// Methods exported by the Ethereum Address Manager actor
pub mod eam {
    use super::MethodNum;

    pub const CREATE_EXTERNAL: MethodNum = 4;
}

/// Methods exported by EVM contract actors
pub mod evm {
    use super::MethodNum;

    /// FRC-42 hash of "InvokeEVM"
    pub const INVOKE_CONTRACT: MethodNum = 3844450837;
}

/// Unsigned host-chain message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub version: u64,
    pub to: Address,
    pub from: Address,
    pub sequence: u64,
    pub value: TokenAmount,
    pub method_num: MethodNum,
    #[serde(with = "hex")]
    pub params: Vec<u8>,
    pub gas_limit: u64,
    pub gas_fee_cap: TokenAmount,
    pub gas_premium: TokenAmount,
}

impl Message {
    /// True when the message targets the Ethereum Address Manager actor
    pub fn is_contract_creation(&self) -> bool {
        self.to.id() == Some(ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID)
            && self.method_num == eam::CREATE_EXTERNAL
    }
}

/// Signature scheme tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SignatureType {
    Secp256k1 = 1,
    Bls = 2,
    /// Signature verified by the account's delegate (Ethereum-style accounts)
    Delegated = 3,
}

/// Signature type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    sig_type: SignatureType,
    #[serde(with = "hex")]
    bytes: Vec<u8>,
}

impl Signature {
    pub fn new(sig_type: SignatureType, bytes: Vec<u8>) -> Self {
        Self { sig_type, bytes }
    }

    pub fn new_delegated(bytes: Vec<u8>) -> Self {
        Self::new(SignatureType::Delegated, bytes)
    }

    pub fn signature_type(&self) -> SignatureType {
        self.sig_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Message together with the signature authorising it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

impl SignedMessage {
    pub fn new(message: Message, signature: Signature) -> Self {
        Self { message, signature }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn from(&self) -> &Address {
        &self.message.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::EthAddress;

    fn create_test_message() -> Message {
        Message {
            version: 0,
            to: Address::new_id(1001),
            from: Address::from_eth_address(&EthAddress::from([0x11; 20])),
            sequence: 7,
            value: TokenAmount::from_atto(10u64),
            method_num: evm::INVOKE_CONTRACT,
            params: vec![],
            gas_limit: 21000,
            gas_fee_cap: TokenAmount::from_atto(11u64),
            gas_premium: TokenAmount::from_atto(12u64),
        }
    }

    #[test]
    fn test_hash_display() {
        let hash = Hash::new([0x12; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(format!("{}", hash), format!("0x{}", "12".repeat(32)));
        assert_eq!(Hash::from_slice(&[0u8; 31]), None);
    }

    #[test]
    fn test_hash_json_roundtrip() {
        let hash = Hash::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_contract_creation_detection() {
        let mut msg = create_test_message();
        assert!(!msg.is_contract_creation());

        msg.to = Address::ETHEREUM_ACCOUNT_MANAGER_ACTOR;
        msg.method_num = eam::CREATE_EXTERNAL;
        assert!(msg.is_contract_creation());
    }

    #[test]
    fn test_signed_message_accessors() {
        let msg = create_test_message();
        let signed = SignedMessage::new(msg.clone(), Signature::new_delegated(vec![1, 2, 3]));
        assert_eq!(signed.message(), &msg);
        assert_eq!(signed.from(), &msg.from);
        assert_eq!(signed.signature().signature_type(), SignatureType::Delegated);
        assert_eq!(signed.signature().bytes(), &[1, 2, 3]);
    }
}
