// ethcompat/core/primitives/src/address.rs

use ethereum_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Actor ID of the Ethereum Address Manager. Delegated addresses it manages
/// live in the namespace of the same number.
pub const ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID: u64 = 10;

/// Maximum length of a delegated sub-address.
pub const MAX_SUBADDRESS_LEN: usize = 54;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid Ethereum address length: {0} bytes (expected 20)")]
    InvalidLength(usize),

    #[error("invalid hex address: {0}")]
    InvalidHex(String),

    #[error("delegated sub-address too long: {0} bytes")]
    SubaddressTooLong(usize),
}

/// 20-byte Ethereum-style account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EthAddress(pub H160);

impl EthAddress {
    pub const LEN: usize = 20;

    /// Prefix of a "masked" ID address: 0xff followed by 11 zero bytes, then
    /// the big-endian actor ID in the last 8 bytes.
    const MASKED_ID_PREFIX: [u8; 12] = [0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != Self::LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        Ok(Self(H160::from_slice(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Encodes a native actor ID as a masked Ethereum address
    pub fn from_id(id: u64) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[..12].copy_from_slice(&Self::MASKED_ID_PREFIX);
        bytes[12..].copy_from_slice(&id.to_be_bytes());
        Self(H160::from(bytes))
    }

    /// Returns the actor ID if this is a masked ID address
    pub fn as_id(&self) -> Option<u64> {
        let bytes = self.0.as_bytes();
        if bytes[..12] != Self::MASKED_ID_PREFIX {
            return None;
        }
        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[12..]);
        Some(u64::from_be_bytes(id))
    }
}

impl From<H160> for EthAddress {
    fn from(value: H160) -> Self {
        Self(value)
    }
}

impl From<[u8; 20]> for EthAddress {
    fn from(value: [u8; 20]) -> Self {
        Self(H160::from(value))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for EthAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// Native host-chain account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// Actor ID address
    Id(u64),
    /// Address delegated to the actor `namespace`, which interprets `subaddress`
    Delegated {
        namespace: u64,
        #[serde(with = "hex")]
        subaddress: Vec<u8>,
    },
}

impl Address {
    pub const ETHEREUM_ACCOUNT_MANAGER_ACTOR: Address = Address::Id(ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID);

    pub fn new_id(id: u64) -> Self {
        Address::Id(id)
    }

    pub fn new_delegated(namespace: u64, subaddress: &[u8]) -> Result<Self, AddressError> {
        if subaddress.len() > MAX_SUBADDRESS_LEN {
            return Err(AddressError::SubaddressTooLong(subaddress.len()));
        }
        Ok(Address::Delegated {
            namespace,
            subaddress: subaddress.to_vec(),
        })
    }

    /// Delegated address in the Ethereum Address Manager namespace
    pub fn from_eth_address(addr: &EthAddress) -> Self {
        Address::Delegated {
            namespace: ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID,
            subaddress: addr.as_bytes().to_vec(),
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Address::Id(id) => Some(*id),
            Address::Delegated { .. } => None,
        }
    }
}
