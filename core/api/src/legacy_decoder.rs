// ethcompat/core/api/src/legacy_decoder.rs
//
// Legacy (untyped) transactions, with or without EIP-155 replay protection

use crate::config::DecoderConfig;
use crate::error::{Result, TransactionDecoderError};
use crate::rlp_fields::{
    append_address, append_big_uint, decode_address, decode_big_uint, decode_bytes, decode_list,
    decode_u64, UINT256_LEN,
};
use crate::signature::{
    encode_delegated_signature, pack_sig_fields, EIP_155_SIG_PREFIX, HOMESTEAD_SIG_PREFIX,
};
use ethcompat_primitives::EthAddress;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rlp::RlpStream;

/// Number of RLP items in a signed legacy transaction
pub const LEGACY_TX_FIELDS: usize = 9;

const HOMESTEAD_V_BASE: u32 = 27;
const EIP_155_V_BASE: u32 = 35;

/// Legacy transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: BigUint,
    pub gas_limit: u64,
    pub to: Option<EthAddress>,
    pub value: BigUint,
    pub input: Vec<u8>,
    pub v: BigUint,
    pub r: BigUint,
    pub s: BigUint,
}

/// Chain id bound into `v`.
///
/// `Ok(None)` for Homestead signatures (v = 27 or 28), `Ok(Some(id))` for
/// EIP-155 signatures (v = 2 * id + 35 or 2 * id + 36).
pub fn derive_chain_id(v: &BigUint) -> Result<Option<BigUint>> {
    let homestead = BigUint::from(HOMESTEAD_V_BASE);
    if *v == homestead || *v == homestead + 1u32 {
        return Ok(None);
    }

    let base = BigUint::from(EIP_155_V_BASE);
    if *v < base {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "invalid legacy signature v value: {}",
            v
        )));
    }

    // v - 35 = 2 * chain_id + recovery_id
    Ok(Some((v - base) >> 1))
}

/// Decode a signed legacy transaction and check its replay protection
/// against `config`.
pub fn parse_legacy_transaction(data: &[u8], config: &DecoderConfig) -> Result<LegacyTransaction> {
    let rlp = decode_list(data, LEGACY_TX_FIELDS)?;

    let tx = LegacyTransaction {
        nonce: decode_u64(&rlp, 0, "nonce")?,
        gas_price: decode_big_uint(&rlp, 1, "gas_price", Some(UINT256_LEN))?,
        gas_limit: decode_u64(&rlp, 2, "gas_limit")?,
        to: decode_address(&rlp, 3, "to")?,
        value: decode_big_uint(&rlp, 4, "value", Some(UINT256_LEN))?,
        input: decode_bytes(&rlp, 5, "input")?,
        v: decode_big_uint(&rlp, 6, "v", None)?,
        r: decode_big_uint(&rlp, 7, "r", None)?,
        s: decode_big_uint(&rlp, 8, "s", None)?,
    };

    match derive_chain_id(&tx.v)? {
        None if !config.allow_unprotected_legacy => {
            return Err(TransactionDecoderError::UnprotectedTransaction);
        }
        None => {}
        Some(chain_id) => {
            if chain_id != BigUint::from(config.chain_id) {
                return Err(TransactionDecoderError::InvalidChainId {
                    expected: config.chain_id,
                    actual: chain_id,
                });
            }
        }
    }

    Ok(tx)
}

impl LegacyTransaction {
    /// Chain id carried in `v`, `None` for Homestead signatures
    pub fn chain_id(&self) -> Option<u64> {
        derive_chain_id(&self.v)
            .ok()
            .flatten()
            .and_then(|id| id.to_u64())
    }

    pub fn is_eip155(&self) -> bool {
        matches!(derive_chain_id(&self.v), Ok(Some(_)))
    }

    /// secp256k1 recovery id (0 or 1) encoded in `v`
    pub fn recovery_id(&self) -> Result<u8> {
        let base = match derive_chain_id(&self.v)? {
            None => BigUint::from(HOMESTEAD_V_BASE),
            Some(_) => BigUint::from(EIP_155_V_BASE),
        };
        // EIP-155: odd v carries recovery id 0, even v carries 1
        let offset = &self.v - base;
        Ok(if (offset % 2u32).is_zero() { 0 } else { 1 })
    }

    fn append_unsigned_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        append_big_uint(stream, &self.gas_price);
        stream.append(&self.gas_limit);
        append_address(stream, &self.to);
        append_big_uint(stream, &self.value);
        stream.append(&self.input.as_slice());
    }

    /// Payload whose keccak hash is signed
    pub fn rlp_unsigned_message(&self) -> Result<Vec<u8>> {
        match derive_chain_id(&self.v)? {
            None => {
                let mut stream = RlpStream::new_list(6);
                self.append_unsigned_fields(&mut stream);
                Ok(stream.out().to_vec())
            }
            Some(chain_id) => {
                let mut stream = RlpStream::new_list(9);
                self.append_unsigned_fields(&mut stream);
                append_big_uint(&mut stream, &chain_id);
                stream.append_empty_data();
                stream.append_empty_data();
                Ok(stream.out().to_vec())
            }
        }
    }

    /// Canonical signed encoding
    pub fn rlp_signed_message(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(LEGACY_TX_FIELDS);
        self.append_unsigned_fields(&mut stream);
        append_big_uint(&mut stream, &self.v);
        append_big_uint(&mut stream, &self.r);
        append_big_uint(&mut stream, &self.s);
        stream.out().to_vec()
    }

    /// Delegated signature bytes: `0x01 ‖ r ‖ s ‖ v` or `0x02 ‖ r ‖ s ‖ v`
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        let packed = pack_sig_fields(&self.v, &self.r, &self.s)?;
        let prefix = if self.is_eip155() {
            EIP_155_SIG_PREFIX
        } else {
            HOMESTEAD_SIG_PREFIX
        };
        encode_delegated_signature(Some(prefix), &packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_tx(v: u64) -> LegacyTransaction {
        LegacyTransaction {
            nonce: 5,
            gas_price: BigUint::from(1_000_000_000u64),
            gas_limit: 21000,
            to: Some(EthAddress::from([0x22; 20])),
            value: BigUint::from(7u8),
            input: vec![],
            v: BigUint::from(v),
            r: BigUint::from(1u8),
            s: BigUint::from(2u8),
        }
    }

    #[test]
    fn test_derive_chain_id() {
        assert_eq!(derive_chain_id(&BigUint::from(27u8)).unwrap(), None);
        assert_eq!(derive_chain_id(&BigUint::from(28u8)).unwrap(), None);
        assert_eq!(
            derive_chain_id(&BigUint::from(663u32)).unwrap(),
            Some(BigUint::from(314u32))
        );
        assert_eq!(
            derive_chain_id(&BigUint::from(664u32)).unwrap(),
            Some(BigUint::from(314u32))
        );
        assert!(matches!(
            derive_chain_id(&BigUint::from(30u8)),
            Err(TransactionDecoderError::MalformedEncoding(_))
        ));
        assert!(derive_chain_id(&BigUint::zero()).is_err());
    }

    #[test]
    fn test_recovery_id_parity() {
        assert_eq!(create_test_tx(27).recovery_id().unwrap(), 0);
        assert_eq!(create_test_tx(28).recovery_id().unwrap(), 1);
        assert_eq!(create_test_tx(663).recovery_id().unwrap(), 0);
        assert_eq!(create_test_tx(664).recovery_id().unwrap(), 1);
    }

    #[test]
    fn test_unsigned_payload_shape() {
        let homestead = create_test_tx(27).rlp_unsigned_message().unwrap();
        assert_eq!(rlp::Rlp::new(&homestead).item_count().unwrap(), 6);

        let protected = create_test_tx(663).rlp_unsigned_message().unwrap();
        let rlp = rlp::Rlp::new(&protected);
        assert_eq!(rlp.item_count().unwrap(), 9);
        assert_eq!(rlp.val_at::<u64>(6).unwrap(), 314);
        assert!(rlp.at(7).unwrap().data().unwrap().is_empty());
        assert!(rlp.at(8).unwrap().data().unwrap().is_empty());
    }

    #[test]
    fn test_signature_bytes_prefix() {
        let homestead = create_test_tx(28).signature_bytes().unwrap();
        assert_eq!(homestead.len(), 66);
        assert_eq!(homestead[0], HOMESTEAD_SIG_PREFIX);
        assert_eq!(homestead[65], 28);

        let protected = create_test_tx(664).signature_bytes().unwrap();
        assert_eq!(protected.len(), 67);
        assert_eq!(protected[0], EIP_155_SIG_PREFIX);
        assert_eq!(&protected[65..], &[0x02, 0x98]);
    }

    #[test]
    fn test_parse_checks_chain_binding() {
        let tx = create_test_tx(663);
        let data = tx.rlp_signed_message();

        let parsed = parse_legacy_transaction(&data, &DecoderConfig::mainnet()).unwrap();
        assert_eq!(parsed, tx);

        assert_eq!(
            parse_legacy_transaction(&data, &DecoderConfig::calibnet()),
            Err(TransactionDecoderError::InvalidChainId {
                expected: 314159,
                actual: BigUint::from(314u32),
            })
        );
    }

    #[test]
    fn test_parse_unprotected_policy() {
        let data = create_test_tx(27).rlp_signed_message();
        assert!(parse_legacy_transaction(&data, &DecoderConfig::mainnet()).is_ok());

        let strict = DecoderConfig {
            allow_unprotected_legacy: false,
            ..DecoderConfig::mainnet()
        };
        assert_eq!(
            parse_legacy_transaction(&data, &strict),
            Err(TransactionDecoderError::UnprotectedTransaction)
        );
    }

    #[test]
    fn test_parse_field_count() {
        let mut stream = RlpStream::new_list(8);
        for _ in 0..8 {
            stream.append(&1u8);
        }
        let data = stream.out().to_vec();
        assert_eq!(
            parse_legacy_transaction(&data, &DecoderConfig::mainnet()),
            Err(TransactionDecoderError::FieldCountMismatch { expected: 9, actual: 8 })
        );
    }

    proptest! {
        #[test]
        fn prop_chain_id_roundtrips_through_v(chain_id in 0u64..=u32::MAX as u64 * 4, parity in 0u64..2) {
            let v = BigUint::from(chain_id) * 2u32 + 35u32 + parity;
            prop_assert_eq!(derive_chain_id(&v).unwrap(), Some(BigUint::from(chain_id)));

            let tx = LegacyTransaction { v, ..create_test_tx(27) };
            prop_assert_eq!(tx.recovery_id().unwrap() as u64, parity);
        }
    }
}
