#![allow(dead_code)]

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, Bytes, U256};

use proposal_actions_core::{network, Network, ProposalRecord};

pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

pub fn mainnet() -> &'static Network {
    network("0x1").expect("mainnet is supported")
}

pub fn recipient() -> Address {
    "0x000000000000000000000000000000000000beef"
        .parse()
        .expect("valid recipient")
}

pub fn token() -> Address {
    "0x6b175474e89094c44da98b954eedeac495271d0f"
        .parse()
        .expect("valid token")
}

pub fn dao() -> Address {
    "0x000000000000000000000000000000000000da0a"
        .parse()
        .expect("valid dao")
}

/// ABI-encode a call including its selector.
pub fn encode_call(signature: &str, args: &[DynSolValue]) -> Bytes {
    let function = Function::parse(signature).expect("valid signature");
    function
        .abi_encode_input(args)
        .expect("args match signature")
        .into()
}

pub fn transfer_call(to: Address, amount: U256) -> Bytes {
    encode_call(
        "transfer(address to, uint256 amount)",
        &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)],
    )
}

/// `(operation, to, value, data)` packed the way MultiSend expects.
pub fn pack_transactions(txs: &[(u8, Address, U256, Bytes)]) -> Vec<u8> {
    let mut packed = Vec::new();
    for (operation, to, value, data) in txs {
        packed.push(*operation);
        packed.extend_from_slice(to.as_slice());
        packed.extend_from_slice(&value.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(data);
    }
    packed
}

pub fn multisend_call(txs: &[(u8, Address, U256, Bytes)]) -> Bytes {
    encode_call(
        "multiSend(bytes transactions)",
        &[DynSolValue::Bytes(pack_transactions(txs))],
    )
}

pub fn proposal(proposal_type: &str, data: Bytes) -> ProposalRecord {
    ProposalRecord {
        proposal_id: "1".to_owned(),
        proposal_type: proposal_type.to_owned(),
        proposal_data: data,
        tx_hash: "0x00".to_owned(),
        target: Some(dao()),
    }
}
