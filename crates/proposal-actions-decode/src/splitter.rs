//! MultiSend envelope splitting
//!
//! A batched proposal payload is `multiSend(bytes transactions)` where the
//! bytes argument packs each call as
//! `operation (1) | to (20) | value (32) | dataLength (32) | data`.

use alloy::primitives::{hex, Address, Bytes, U256};
use eyre::{OptionExt, Result};

use proposal_actions_core::{Network, Operation, RawCall, SubActionMeta};

use super::decode_log;

/// `multiSend(bytes)` selector
pub const MULTISEND_SELECTOR: [u8; 4] = [0x8d, 0x80, 0xff, 0x0a];

/// Split a proposal payload into raw calls, pairing each with its metadata.
///
/// Metadata is only attached when its length matches the number of embedded
/// calls. Anything that is not a well-formed MultiSend envelope becomes a
/// single call to `fallback_target`.
pub fn split<'m>(
    network: &Network,
    data: &[u8],
    fallback_target: Address,
    actions_meta: Option<&'m [SubActionMeta]>,
) -> Vec<(RawCall, Option<&'m SubActionMeta>)> {
    let calls = match decode_multisend_bytes(data).and_then(|packed| unpack_multisend(&packed)) {
        Ok(calls) => calls,
        Err(e) => {
            if data.starts_with(&MULTISEND_SELECTOR) {
                tracing::warn!(
                    network = network.name,
                    "malformed MultiSend envelope, decoding as a single call: {e:#}"
                );
            }
            let single = RawCall::new(0, fallback_target, U256::ZERO, Bytes::copy_from_slice(data));
            let meta = actions_meta.and_then(|m| match m {
                [only] => Some(only),
                _ => None,
            });
            return vec![(single, meta)];
        }
    };

    decode_log!("{}: split {} embedded calls", network.name, calls.len());

    let meta: Vec<Option<&SubActionMeta>> = match actions_meta {
        Some(meta) if meta.len() == calls.len() => meta.iter().map(Some).collect(),
        Some(meta) => {
            tracing::warn!(
                expected = meta.len(),
                found = calls.len(),
                "action metadata count does not match embedded calls, ignoring metadata"
            );
            vec![None; calls.len()]
        }
        None => vec![None; calls.len()],
    };

    calls.into_iter().zip(meta).collect()
}

/// Decode the `multiSend(bytes)` call and return the packed transactions.
pub fn decode_multisend_bytes(data: &[u8]) -> Result<Vec<u8>> {
    eyre::ensure!(
        data.starts_with(&MULTISEND_SELECTOR),
        "Not a multiSend call"
    );
    let args = &data[4..];

    // ABI bytes: head word holds the offset of (length, data)
    eyre::ensure!(args.len() >= 64, "Data too short for ABI bytes");

    let offset = read_usize(args, 0).ok_or_eyre("Invalid offset")?;
    let data_start = offset.checked_add(32).ok_or_eyre("Invalid offset")?;
    eyre::ensure!(data_start <= args.len(), "Invalid offset");

    let length = read_usize(args, offset).ok_or_eyre("Invalid length")?;
    let data_end = data_start.checked_add(length).ok_or_eyre("Invalid length")?;
    eyre::ensure!(data_end <= args.len(), "Invalid length");

    Ok(args[data_start..data_end].to_vec())
}

/// Unpack MultiSend packed transactions
pub fn unpack_multisend(packed: &[u8]) -> Result<Vec<RawCall>> {
    let mut calls = Vec::new();
    let mut offset = 0;

    while offset < packed.len() {
        let operation = Operation::from_u8(packed[offset])
            .ok_or_else(|| eyre::eyre!("Invalid operation byte {:#04x}", packed[offset]))?;
        offset += 1;

        let to = packed
            .get(offset..offset + 20)
            .map(Address::from_slice)
            .ok_or_eyre("Incomplete transaction: missing 'to' address")?;
        offset += 20;

        let value = packed
            .get(offset..offset + 32)
            .map(U256::from_be_slice)
            .ok_or_eyre("Incomplete transaction: missing 'value'")?;
        offset += 32;

        let data_length =
            read_usize(packed, offset).ok_or_eyre("Incomplete transaction: missing 'dataLength'")?;
        offset += 32;

        let data_end = offset
            .checked_add(data_length)
            .filter(|end| *end <= packed.len())
            .ok_or_eyre("Incomplete transaction: missing 'data'")?;
        let data = Bytes::copy_from_slice(&packed[offset..data_end]);
        offset = data_end;

        calls.push(RawCall {
            index: calls.len(),
            operation,
            to,
            value,
            data,
        });
    }

    Ok(calls)
}

/// Selector as `0x`-prefixed lowercase hex.
pub fn get_selector(data: &[u8]) -> Option<String> {
    data.get(..4).map(|s| format!("0x{}", hex::encode(s)))
}

/// Read a 32-byte big-endian word at `at` as a `usize`.
fn read_usize(bytes: &[u8], at: usize) -> Option<usize> {
    let word = bytes.get(at..at.checked_add(32)?)?;
    let value = U256::from_be_slice(word);
    (value <= U256::from(usize::MAX)).then(|| value.to::<usize>())
}
