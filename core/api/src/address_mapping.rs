// ethcompat/core/api/src/address_mapping.rs

use ethcompat_primitives::{Address, EthAddress, ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID};

/// Translation between 20-byte Ethereum addresses and native addresses
pub trait AddressMapper: Send + Sync {
    /// Native address for an Ethereum address. Infallible.
    fn to_native(&self, addr: &EthAddress) -> Address;

    /// Ethereum address for a native address, if it has one
    fn to_eth(&self, addr: &Address) -> Option<EthAddress>;
}

/// Default mapping.
///
/// Masked ID addresses (`0xff`, eleven zero bytes, 8-byte id) map to
/// `Address::Id`; every other address becomes a delegated address in the
/// Ethereum Address Manager namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelegatedAddressMapper;

impl AddressMapper for DelegatedAddressMapper {
    fn to_native(&self, addr: &EthAddress) -> Address {
        match addr.as_id() {
            Some(id) => Address::new_id(id),
            None => Address::from_eth_address(addr),
        }
    }

    fn to_eth(&self, addr: &Address) -> Option<EthAddress> {
        match addr {
            Address::Id(id) => Some(EthAddress::from_id(*id)),
            Address::Delegated {
                namespace,
                subaddress,
            } if *namespace == ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID => {
                EthAddress::from_slice(subaddress).ok()
            }
            Address::Delegated { .. } => None,
        }
    }
}
