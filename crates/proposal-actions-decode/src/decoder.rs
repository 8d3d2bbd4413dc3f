//! Call decoding against the selector registry
//!
//! Every raw call produces exactly one [`DecodedAction`]; failures are
//! returned as `DecodeError` values carrying the original calldata.

use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::{Function, Param};
use alloy::primitives::{hex, Bytes};
use eyre::{Result, WrapErr};

use proposal_actions_core::{
    ActionError, DecodedAction, DecodedCall, DecodedParam, Network, ParamValue, RawCall,
    SignatureMap, SubActionMeta, ETH_TRANSFER_ACTION, UNKNOWN_ACTION_MESSAGE,
};

use super::decode_log;
use super::registry::AbiRegistry;
use super::splitter::unpack_multisend;

/// How deep nested `multiSend` / `executeAsBaal` payloads are expanded.
pub const DEFAULT_MAX_NESTED_DEPTH: usize = 3;

#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<AbiRegistry>,
    max_nested_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(AbiRegistry::with_defaults())
    }
}

impl Decoder {
    pub fn new(registry: AbiRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            max_nested_depth: DEFAULT_MAX_NESTED_DEPTH,
        }
    }

    pub fn with_max_nested_depth(mut self, depth: usize) -> Self {
        self.max_nested_depth = depth;
        self
    }

    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }

    /// Decoder over a copy of the registry extended with `signatures`.
    pub fn with_signatures(&self, signatures: &SignatureMap) -> Self {
        if signatures.is_empty() {
            return self.clone();
        }
        Self {
            registry: Arc::new(self.registry.with_signatures(signatures)),
            max_nested_depth: self.max_nested_depth,
        }
    }

    /// Decode one raw call. Never fails; see [`DecodedAction::DecodeError`].
    pub fn decode(
        &self,
        network: &Network,
        call: &RawCall,
        meta: Option<&SubActionMeta>,
    ) -> DecodedAction {
        self.decode_at_depth(network, call, meta, 0)
    }

    fn decode_at_depth(
        &self,
        network: &Network,
        call: &RawCall,
        meta: Option<&SubActionMeta>,
        depth: usize,
    ) -> DecodedAction {
        let label = meta.and_then(|m| m.label.clone());

        if !call.has_calldata() {
            return DecodedAction::Decoded(DecodedCall {
                name: ETH_TRANSFER_ACTION.to_owned(),
                signature: String::new(),
                to: call.to,
                value: call.value,
                operation: call.operation,
                label,
                params: vec![],
                nested: vec![],
            });
        }

        let Some(selector) = call.selector() else {
            return decode_error(call, "Calldata too short for a function selector".to_owned());
        };

        let candidates = self.candidates(&selector, meta);
        if candidates.is_empty() {
            decode_log!(
                "{} tx #{}: unknown selector 0x{}",
                network.name,
                call.index,
                hex::encode(selector)
            );
            return decode_error(call, UNKNOWN_ACTION_MESSAGE.to_owned());
        }

        // Try each fragment until one decodes
        let mut failures = Vec::new();
        for function in &candidates {
            match decode_with_function(function, &call.data) {
                Ok(values) => {
                    decode_log!("tx #{}: decoded with {}", call.index, function.signature());
                    let params = function
                        .inputs
                        .iter()
                        .zip(values.iter())
                        .enumerate()
                        .map(|(i, (input, value))| {
                            let name = param_name(&input.name, i);
                            to_param(name, &input.ty, &input.components, value)
                        })
                        .collect();
                    let nested = self.nested_actions(network, function, &values, depth);

                    return DecodedAction::Decoded(DecodedCall {
                        name: function.name.clone(),
                        signature: function.signature(),
                        to: call.to,
                        value: call.value,
                        operation: call.operation,
                        label,
                        params,
                        nested,
                    });
                }
                Err(e) => {
                    decode_log!("tx #{}: {:#}", call.index, e);
                    failures.push(format!("{e:#}"));
                }
            }
        }

        decode_error(call, failures.join("; "))
    }

    /// Candidate fragments for a selector: metadata fragments first, then
    /// registry fragments named like the expected method, then the rest.
    fn candidates(&self, selector: &[u8; 4], meta: Option<&SubActionMeta>) -> Vec<Function> {
        let registered = self.registry.lookup(selector);
        let mut out: Vec<Function> = Vec::new();

        if let Some(meta) = meta {
            for signature in &meta.abi {
                match Function::parse(signature) {
                    Ok(function) if function.selector().0 == *selector => out.push(function),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("invalid metadata signature '{signature}': {e}"),
                }
            }
            out.extend(
                registered
                    .iter()
                    .filter(|f| !meta.method.is_empty() && f.name == meta.method)
                    .cloned(),
            );
        }

        for function in registered {
            let signature = function.signature();
            if !out.iter().any(|f| f.signature() == signature) {
                out.push(function.clone());
            }
        }
        out
    }

    /// Expand the inner payload of batching calls.
    fn nested_actions(
        &self,
        network: &Network,
        function: &Function,
        values: &[DynSolValue],
        depth: usize,
    ) -> Vec<DecodedAction> {
        let inner = match (function.name.as_str(), values) {
            ("multiSend", [DynSolValue::Bytes(packed)]) => match unpack_multisend(packed) {
                Ok(calls) => calls,
                Err(e) => {
                    return vec![DecodedAction::DecodeError(ActionError {
                        message: format!("Malformed MultiSend payload: {e}"),
                        to: None,
                        value: None,
                        data: Bytes::copy_from_slice(packed),
                    })];
                }
            },
            (
                "executeAsBaal",
                [DynSolValue::Address(to), DynSolValue::Uint(value, _), DynSolValue::Bytes(data)],
            ) => vec![RawCall::new(0, *to, *value, Bytes::copy_from_slice(data))],
            _ => return vec![],
        };

        if depth + 1 > self.max_nested_depth {
            tracing::warn!(
                depth,
                "nested payload of {} not expanded: depth limit reached",
                function.name
            );
            return vec![];
        }

        inner
            .iter()
            .map(|call| self.decode_at_depth(network, call, None, depth + 1))
            .collect()
    }
}

/// Decode calldata (selector included) with a parsed fragment.
pub fn decode_with_function(function: &Function, data: &[u8]) -> Result<Vec<DynSolValue>> {
    eyre::ensure!(
        data.len() >= 4,
        "Data too short (need at least 4 bytes for selector)"
    );

    if data.len() == 4 && function.inputs.is_empty() {
        return Ok(vec![]);
    }

    let decoded = function
        .abi_decode_input(&data[4..], true)
        .wrap_err_with(|| format!("ABI decode failed for '{}'", function.signature()))?;

    eyre::ensure!(
        decoded.len() == function.inputs.len(),
        "Decoded {} values for {} inputs",
        decoded.len(),
        function.inputs.len()
    );

    Ok(decoded)
}

fn decode_error(call: &RawCall, message: String) -> DecodedAction {
    DecodedAction::DecodeError(ActionError {
        message,
        to: Some(call.to),
        value: Some(call.value),
        data: call.data.clone(),
    })
}

fn param_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("arg{index}")
    } else {
        name.to_owned()
    }
}

/// Build a param from a decoded value, recursing into arrays and tuples.
fn to_param(name: String, ty: &str, components: &[Param], value: &DynSolValue) -> DecodedParam {
    let value = match value {
        DynSolValue::Address(a) => ParamValue::Address(*a),
        DynSolValue::Uint(u, _) => ParamValue::Uint(*u),
        DynSolValue::Int(i, _) => ParamValue::Int(*i),
        DynSolValue::Bool(b) => ParamValue::Bool(*b),
        // bytesN is right-padded in a 32-byte word
        DynSolValue::FixedBytes(word, size) => {
            ParamValue::Bytes(Bytes::copy_from_slice(&word[..*size]))
        }
        DynSolValue::Bytes(b) => ParamValue::Bytes(Bytes::copy_from_slice(b)),
        DynSolValue::String(s) => ParamValue::String(s.clone()),
        DynSolValue::Function(f) => ParamValue::Raw(format!("0x{}", hex::encode(f))),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let element_ty = strip_array_suffix(ty);
            ParamValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| to_param(format!("{name}[{i}]"), element_ty, components, item))
                    .collect(),
            )
        }
        DynSolValue::Tuple(items) => ParamValue::Tuple(tuple_fields(components, items)),
        DynSolValue::CustomStruct { tuple, .. } => {
            ParamValue::Tuple(tuple_fields(components, tuple))
        }
    };

    DecodedParam {
        name,
        ty: canonical_type(ty, components),
        value,
    }
}

fn tuple_fields(components: &[Param], items: &[DynSolValue]) -> Vec<DecodedParam> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match components.get(i) {
            Some(c) if !c.name.is_empty() => to_param(c.name.clone(), &c.ty, &c.components, item),
            Some(c) => to_param(i.to_string(), &c.ty, &c.components, item),
            None => to_param(i.to_string(), &value_type(item), &[], item),
        })
        .collect()
}

/// `tuple[]` with components `(address, uint256)` becomes `(address,uint256)[]`.
fn canonical_type(ty: &str, components: &[Param]) -> String {
    match ty.strip_prefix("tuple") {
        Some(suffix) => {
            let inner: Vec<String> = components
                .iter()
                .map(|c| canonical_type(&c.ty, &c.components))
                .collect();
            format!("({}){}", inner.join(","), suffix)
        }
        None => ty.to_owned(),
    }
}

fn strip_array_suffix(ty: &str) -> &str {
    if ty.ends_with(']') {
        if let Some(open) = ty.rfind('[') {
            return &ty[..open];
        }
    }
    ty
}

/// Solidity type of a value with no ABI description.
fn value_type(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(_) => "address".to_owned(),
        DynSolValue::Uint(_, bits) => format!("uint{bits}"),
        DynSolValue::Int(_, bits) => format!("int{bits}"),
        DynSolValue::Bool(_) => "bool".to_owned(),
        DynSolValue::FixedBytes(_, size) => format!("bytes{size}"),
        DynSolValue::Bytes(_) => "bytes".to_owned(),
        DynSolValue::String(_) => "string".to_owned(),
        DynSolValue::Function(_) => "function".to_owned(),
        DynSolValue::Array(items) => {
            let inner = items.first().map(value_type).unwrap_or_default();
            format!("{inner}[]")
        }
        DynSolValue::FixedArray(items) => {
            let inner = items.first().map(value_type).unwrap_or_default();
            format!("{inner}[{}]", items.len())
        }
        DynSolValue::Tuple(items) | DynSolValue::CustomStruct { tuple: items, .. } => {
            let inner: Vec<String> = items.iter().map(value_type).collect();
            format!("({})", inner.join(","))
        }
    }
}
