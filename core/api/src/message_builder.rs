// ethcompat/core/api/src/message_builder.rs
//
// Assembles native messages from decoded Ethereum transactions

use crate::address_mapping::AddressMapper;
use crate::error::{Result, TransactionDecoderError};
use crate::eth_transaction::EthTransaction;
use ciborium::value::Value;
use ethcompat_primitives::{
    eam, evm, Address, EthAddress, Message, MethodNum, Signature, SignedMessage, TokenAmount,
};

/// Message format version produced by the converter
pub const MESSAGE_VERSION: u64 = 0;

/// Where a transaction is routed on the native chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub to: Address,
    pub method_num: MethodNum,
    pub params: Vec<u8>,
}

/// Wrap call input as a CBOR byte string; empty input gives empty params.
pub fn encode_params(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut params = Vec::with_capacity(input.len() + 9);
    ciborium::ser::into_writer(&Value::Bytes(input.to_vec()), &mut params).map_err(|e| {
        TransactionDecoderError::MalformedEncoding(format!("failed to encode params: {:?}", e))
    })?;
    Ok(params)
}

/// Inverse of [`encode_params`]; params must be exactly one canonical CBOR byte string.
pub fn decode_params(params: &[u8]) -> Result<Vec<u8>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = ciborium::de::from_reader(params).map_err(|e| {
        TransactionDecoderError::NotEthereumMessage(format!("params are not valid CBOR: {:?}", e))
    })?;
    let input = match value {
        Value::Bytes(bytes) => bytes,
        _ => {
            return Err(TransactionDecoderError::NotEthereumMessage(
                "params must be a CBOR byte string".to_string(),
            ))
        }
    };
    // rejects trailing data and non-minimal headers
    if encode_params(&input)? != params {
        return Err(TransactionDecoderError::NotEthereumMessage(
            "params are not a canonical CBOR byte string".to_string(),
        ));
    }
    Ok(input)
}

/// Calls go to the mapped recipient's InvokeContract; creations go to
/// the Ethereum Address Manager's CreateExternal.
pub fn method_info<M: AddressMapper>(to: Option<&EthAddress>, input: &[u8], mapper: &M) -> Result<MethodInfo> {
    let params = encode_params(input)?;
    Ok(match to {
        Some(recipient) => MethodInfo {
            to: mapper.to_native(recipient),
            method_num: evm::INVOKE_CONTRACT,
            params,
        },
        None => MethodInfo {
            to: Address::ETHEREUM_ACCOUNT_MANAGER_ACTOR,
            method_num: eam::CREATE_EXTERNAL,
            params,
        },
    })
}

/// Inverse of [`method_info`]: recover `(to, input)` from a message.
pub fn eth_call_target<M: AddressMapper>(message: &Message, mapper: &M) -> Result<(Option<EthAddress>, Vec<u8>)> {
    let to = if message.is_contract_creation() {
        None
    } else if message.method_num == evm::INVOKE_CONTRACT {
        let recipient = mapper.to_eth(&message.to).ok_or_else(|| {
            TransactionDecoderError::NotEthereumMessage("recipient has no Ethereum address".to_string())
        })?;
        Some(recipient)
    } else {
        return Err(TransactionDecoderError::NotEthereumMessage(format!(
            "unsupported method {} for {:?}",
            message.method_num, message.to
        )));
    };
    Ok((to, decode_params(&message.params)?))
}

/// Build the signed native message for a decoded transaction and its recovered sender.
pub fn build_signed_message<M: AddressMapper>(
    tx: &EthTransaction,
    sender: &EthAddress,
    mapper: &M,
) -> Result<SignedMessage> {
    let info = method_info(tx.to(), tx.input(), mapper)?;
    let (gas_fee_cap, gas_premium) = match tx {
        EthTransaction::Legacy(legacy) => (legacy.gas_price.clone(), legacy.gas_price.clone()),
        EthTransaction::Eip1559(dynamic) => (
            dynamic.max_fee_per_gas.clone(),
            dynamic.max_priority_fee_per_gas.clone(),
        ),
    };

    let message = Message {
        version: MESSAGE_VERSION,
        to: info.to,
        from: mapper.to_native(sender),
        sequence: tx.nonce(),
        value: TokenAmount::from(tx.value().clone()),
        method_num: info.method_num,
        params: info.params,
        gas_limit: tx.gas_limit(),
        gas_fee_cap: TokenAmount::from(gas_fee_cap),
        gas_premium: TokenAmount::from(gas_premium),
    };
    let signature = Signature::new_delegated(tx.signature_bytes()?);

    Ok(SignedMessage::new(message, signature))
}
