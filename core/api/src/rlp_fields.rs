// ethcompat/core/api/src/rlp_fields.rs
//
// Field-level helpers shared by the legacy and EIP-1559 decoders

use crate::error::{Result, TransactionDecoderError};
use ethcompat_primitives::EthAddress;
use num_bigint::BigUint;
use num_traits::Zero;
use rlp::{Rlp, RlpStream};

/// Width of a 256-bit quantity (fees, value, r, s)
pub const UINT256_LEN: usize = 32;

/// Width of a u64 quantity (nonce, gas limit)
const UINT64_LEN: usize = 8;

/// Open `bytes` as one RLP list holding exactly `expected` items.
///
/// The list must span the whole input; trailing bytes and truncated
/// items are malformed, a well-formed list of the wrong arity is a
/// field-count mismatch.
pub fn decode_list(bytes: &[u8], expected: usize) -> Result<Rlp<'_>> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(TransactionDecoderError::MalformedEncoding(
            "transaction payload is not an RLP list".to_string(),
        ));
    }

    let info = rlp.payload_info()?;
    if info.total() > bytes.len() {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "transaction list declares {} bytes, only {} present",
            info.total(),
            bytes.len()
        )));
    }
    if info.total() < bytes.len() {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "{} trailing bytes after transaction list",
            bytes.len() - info.total()
        )));
    }

    let mut consumed = 0;
    let mut actual = 0;
    for item in rlp.iter() {
        consumed += item.as_raw().len();
        actual += 1;
    }
    if consumed != info.value_len {
        return Err(TransactionDecoderError::MalformedEncoding(
            "transaction list contains a truncated item".to_string(),
        ));
    }

    if actual != expected {
        return Err(TransactionDecoderError::FieldCountMismatch { expected, actual });
    }

    Ok(rlp)
}

fn with_data<T>(
    rlp: &Rlp<'_>,
    index: usize,
    field: &'static str,
    f: impl FnOnce(&[u8]) -> Result<T>,
) -> Result<T> {
    let item = rlp.at(index)?;
    if !item.is_data() {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "field `{}` must be a byte string",
            field
        )));
    }
    f(item.data()?)
}

fn check_canonical(bytes: &[u8], field: &'static str) -> Result<()> {
    if bytes.first() == Some(&0) {
        return Err(TransactionDecoderError::MalformedEncoding(format!(
            "field `{}` has leading zero bytes",
            field
        )));
    }
    Ok(())
}

/// Decode an unsigned integer that must fit in 64 bits.
pub fn decode_u64(rlp: &Rlp<'_>, index: usize, field: &'static str) -> Result<u64> {
    with_data(rlp, index, field, |bytes| {
        check_canonical(bytes, field)?;
        if bytes.len() > UINT64_LEN {
            return Err(TransactionDecoderError::IntegerOverflow { field });
        }
        let mut padded = [0u8; UINT64_LEN];
        padded[UINT64_LEN - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(padded))
    })
}

/// Decode an arbitrary-width unsigned integer, optionally bounded to `max_len` bytes.
pub fn decode_big_uint(
    rlp: &Rlp<'_>,
    index: usize,
    field: &'static str,
    max_len: Option<usize>,
) -> Result<BigUint> {
    with_data(rlp, index, field, |bytes| {
        check_canonical(bytes, field)?;
        if let Some(max) = max_len {
            if bytes.len() > max {
                return Err(TransactionDecoderError::IntegerOverflow { field });
            }
        }
        Ok(BigUint::from_bytes_be(bytes))
    })
}

/// Decode a recipient: empty for contract creation, otherwise 20 bytes.
pub fn decode_address(rlp: &Rlp<'_>, index: usize, field: &'static str) -> Result<Option<EthAddress>> {
    with_data(rlp, index, field, |bytes| match bytes.len() {
        0 => Ok(None),
        EthAddress::LEN => EthAddress::from_slice(bytes)
            .map(Some)
            .map_err(|e| TransactionDecoderError::MalformedEncoding(e.to_string())),
        len => Err(TransactionDecoderError::MalformedEncoding(format!(
            "field `{}` must be empty or {} bytes, got {}",
            field,
            EthAddress::LEN,
            len
        ))),
    })
}

pub fn decode_bytes(rlp: &Rlp<'_>, index: usize, field: &'static str) -> Result<Vec<u8>> {
    with_data(rlp, index, field, |bytes| Ok(bytes.to_vec()))
}

/// Append an integer in canonical form (zero is the empty string).
pub fn append_big_uint(stream: &mut RlpStream, value: &BigUint) {
    if value.is_zero() {
        stream.append_empty_data();
    } else {
        stream.append(&value.to_bytes_be().as_slice());
    }
}

pub fn append_address(stream: &mut RlpStream, to: &Option<EthAddress>) {
    match to {
        Some(addr) => {
            stream.append(&addr.as_bytes());
        }
        None => {
            stream.append_empty_data();
        }
    }
}
