// ethcompat/core/primitives/src/lib.rs

pub mod address;
pub mod econ;
pub mod types;

pub use address::{Address, AddressError, EthAddress, ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID};
pub use econ::TokenAmount;
pub use types::*;
