// ethcompat/core/api/src/eip1559_decoder.rs

use crate::config::DecoderConfig;
use crate::error::{Result, TransactionDecoderError};
use crate::rlp_fields::{
    append_address, append_big_uint, decode_address, decode_big_uint, decode_bytes, decode_list,
    decode_u64, UINT256_LEN,
};
use crate::signature::{encode_delegated_signature, pack_sig_fields};
use ethcompat_primitives::EthAddress;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use rlp::RlpStream;

/// Envelope type byte for dynamic-fee transactions
pub const EIP_1559_TX_TYPE: u8 = 0x02;

/// Number of RLP items in a signed EIP-1559 payload
pub const EIP_1559_TX_FIELDS: usize = 12;

const ACCESS_LIST_INDEX: usize = 8;

/// EIP-1559 transaction structure. The access list is always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: BigUint,
    pub max_fee_per_gas: BigUint,
    pub gas_limit: u64,
    pub to: Option<EthAddress>,
    pub value: BigUint,
    pub input: Vec<u8>,
    /// y-parity, 0 or 1
    pub v: BigUint,
    pub r: BigUint,
    pub s: BigUint,
}

/// Decode `0x02 ‖ rlp([...12 fields])` bound to `config.chain_id`.
pub fn parse_eip1559_transaction(data: &[u8], config: &DecoderConfig) -> Result<Eip1559Transaction> {
    // Verify transaction type prefix
    match data.split_first() {
        Some((&EIP_1559_TX_TYPE, _)) => {}
        _ => {
            return Err(TransactionDecoderError::MalformedEncoding(
                "missing EIP-1559 type prefix".to_string(),
            ))
        }
    }
    let rlp = decode_list(&data[1..], EIP_1559_TX_FIELDS)?;

    let chain_id = decode_big_uint(&rlp, 0, "chain_id", Some(UINT256_LEN))?;
    if chain_id != BigUint::from(config.chain_id) {
        return Err(TransactionDecoderError::InvalidChainId {
            expected: config.chain_id,
            actual: chain_id,
        });
    }

    let access_list = rlp.at(ACCESS_LIST_INDEX)?;
    if !access_list.is_list() {
        return Err(TransactionDecoderError::MalformedEncoding(
            "access list must be an RLP list".to_string(),
        ));
    }
    if access_list.item_count()? > 0 {
        return Err(TransactionDecoderError::NonEmptyAccessList);
    }

    let v = decode_big_uint(&rlp, 9, "y_parity", None)?;
    if v > BigUint::one() {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "y_parity must be 0 or 1, got {}",
            v
        )));
    }

    Ok(Eip1559Transaction {
        chain_id: config.chain_id,
        nonce: decode_u64(&rlp, 1, "nonce")?,
        max_priority_fee_per_gas: decode_big_uint(&rlp, 2, "max_priority_fee_per_gas", Some(UINT256_LEN))?,
        max_fee_per_gas: decode_big_uint(&rlp, 3, "max_fee_per_gas", Some(UINT256_LEN))?,
        gas_limit: decode_u64(&rlp, 4, "gas_limit")?,
        to: decode_address(&rlp, 5, "to")?,
        value: decode_big_uint(&rlp, 6, "value", Some(UINT256_LEN))?,
        input: decode_bytes(&rlp, 7, "input")?,
        v,
        r: decode_big_uint(&rlp, 10, "r", None)?,
        s: decode_big_uint(&rlp, 11, "s", None)?,
    })
}

impl Eip1559Transaction {
    pub fn recovery_id(&self) -> Result<u8> {
        match self.v.to_u8() {
            Some(parity @ (0 | 1)) => Ok(parity),
            _ => Err(TransactionDecoderError::MalformedEncoding(format!(
                "y_parity must be 0 or 1, got {}",
                self.v
            ))),
        }
    }

    fn append_unsigned_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.chain_id);
        stream.append(&self.nonce);
        append_big_uint(stream, &self.max_priority_fee_per_gas);
        append_big_uint(stream, &self.max_fee_per_gas);
        stream.append(&self.gas_limit);
        append_address(stream, &self.to);
        append_big_uint(stream, &self.value);
        stream.append(&self.input.as_slice());
        stream.begin_list(0);
    }

    /// Signing payload: `0x02 ‖ rlp([...9 fields])`
    pub fn rlp_unsigned_message(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_unsigned_fields(&mut stream);
        with_type_prefix(&stream.out())
    }

    /// Canonical signed envelope
    pub fn rlp_signed_message(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(EIP_1559_TX_FIELDS);
        self.append_unsigned_fields(&mut stream);
        append_big_uint(&mut stream, &self.v);
        append_big_uint(&mut stream, &self.r);
        append_big_uint(&mut stream, &self.s);
        with_type_prefix(&stream.out())
    }

    /// Delegated signature bytes: `r ‖ s ‖ yParity`
    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        let packed = pack_sig_fields(&self.v, &self.r, &self.s)?;
        encode_delegated_signature(None, &packed)
    }
}

fn with_type_prefix(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(EIP_1559_TX_TYPE);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn create_test_tx() -> Eip1559Transaction {
        Eip1559Transaction {
            chain_id: 314,
            nonce: 1,
            max_priority_fee_per_gas: BigUint::from(100u32),
            max_fee_per_gas: BigUint::from(200u32),
            gas_limit: 30000,
            to: None,
            value: BigUint::zero(),
            input: vec![0x60, 0x80],
            v: BigUint::one(),
            r: BigUint::from(3u8),
            s: BigUint::from(4u8),
        }
    }

    #[test]
    fn test_parse_signed_envelope() {
        let tx = create_test_tx();
        let data = tx.rlp_signed_message();
        assert_eq!(data[0], EIP_1559_TX_TYPE);

        let parsed = parse_eip1559_transaction(&data, &DecoderConfig::mainnet()).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.recovery_id().unwrap(), 1);
    }

    #[test]
    fn test_parse_rejects_wrong_chain() {
        let data = create_test_tx().rlp_signed_message();
        assert_eq!(
            parse_eip1559_transaction(&data, &DecoderConfig::calibnet()),
            Err(TransactionDecoderError::InvalidChainId {
                expected: 314159,
                actual: BigUint::from(314u32),
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_parity() {
        let tx = Eip1559Transaction {
            v: BigUint::from(2u8),
            ..create_test_tx()
        };
        assert!(matches!(
            parse_eip1559_transaction(&tx.rlp_signed_message(), &DecoderConfig::mainnet()),
            Err(TransactionDecoderError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_unsigned_payload_has_empty_access_list() {
        let payload = create_test_tx().rlp_unsigned_message();
        assert_eq!(payload[0], EIP_1559_TX_TYPE);
        let rlp = rlp::Rlp::new(&payload[1..]);
        assert_eq!(rlp.item_count().unwrap(), 9);
        assert_eq!(rlp.at(8).unwrap().as_raw(), &[0xc0]);
    }

    #[test]
    fn test_signature_bytes_layout() {
        let sig = create_test_tx().signature_bytes().unwrap();
        assert_eq!(sig.len(), 65);
        assert_eq!(sig[31], 3);
        assert_eq!(sig[63], 4);
        assert_eq!(sig[64], 1);

        let even = Eip1559Transaction {
            v: BigUint::zero(),
            ..create_test_tx()
        };
        let sig = even.signature_bytes().unwrap();
        assert_eq!(sig.len(), 65);
        assert_eq!(sig[64], 0);
    }
}
