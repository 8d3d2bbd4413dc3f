use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};

use crate::decimal;

/// Name given to calls that carry value but no calldata.
pub const ETH_TRANSFER_ACTION: &str = "ETH Transfer";

/// Message carried by a `DecodeError` when no fragment matches the selector.
pub const UNKNOWN_ACTION_MESSAGE: &str = "Unknown action";

/// Call type of a MultiSend entry (`0` = call, `1` = delegatecall).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    #[default]
    Call,
    DelegateCall,
}

impl Operation {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Call),
            1 => Some(Self::DelegateCall),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Call => 0,
            Self::DelegateCall => 1,
        }
    }
}

/// One call split out of a proposal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCall {
    pub index: usize,
    pub operation: Operation,
    pub to: Address,
    #[serde(with = "decimal::u256")]
    pub value: U256,
    pub data: Bytes,
}

impl RawCall {
    pub fn new(index: usize, to: Address, value: U256, data: Bytes) -> Self {
        Self {
            index,
            operation: Operation::Call,
            to,
            value,
            data,
        }
    }

    /// Leading 4-byte selector, if the calldata is long enough to have one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }

    pub fn has_calldata(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Expected shape of a single call within a known multicall proposal type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubActionMeta {
    /// Display label for the call (usually the target contract's name).
    pub label: Option<String>,
    /// Expected function name.
    pub method: String,
    /// Human-readable function signatures tried before the shared registry.
    pub abi: Vec<String>,
}

/// Per-proposal-type description of the calls a proposal is expected to make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionMeta {
    pub name: String,
    pub actions: Vec<SubActionMeta>,
}

/// Static metadata table keyed by proposal type.
pub type ActionMetaTable = HashMap<String, ActionMeta>;

/// Proposal record as handed over by the data-fetching layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProposalRecord {
    pub proposal_id: String,
    pub proposal_type: String,
    pub proposal_data: Bytes,
    pub tx_hash: String,
    /// Declared target of a non-batched payload (the DAO vault).
    pub target: Option<Address>,
}

/// Semantic type tag of a decoded parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Address,
    Uint,
    Int,
    Bool,
    Bytes,
    String,
    Array(Box<ParamKind>),
    Tuple,
    Other(String),
}

impl ParamKind {
    /// Classify a Solidity type string (`uint256`, `address[]`, `(bool,bytes)`, `tuple[2]`).
    pub fn from_solidity(ty: &str) -> Self {
        let ty = ty.trim();
        if ty.ends_with(']') {
            if let Some(open) = ty.rfind('[') {
                return Self::Array(Box::new(Self::from_solidity(&ty[..open])));
            }
        }
        if ty.starts_with('(') || ty == "tuple" {
            return Self::Tuple;
        }
        match ty {
            "address" => Self::Address,
            "bool" => Self::Bool,
            "string" => Self::String,
            _ if ty.starts_with("uint") => Self::Uint,
            _ if ty.starts_with("int") => Self::Int,
            _ if ty.starts_with("bytes") => Self::Bytes,
            _ => Self::Other(ty.to_owned()),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Uint => f.write_str("uint"),
            Self::Int => f.write_str("int"),
            Self::Bool => f.write_str("bool"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
            Self::Tuple => f.write_str("tuple"),
            Self::Other(ty) => f.write_str(ty),
        }
    }
}

/// Decoded argument value. Compound values nest full `DecodedParam`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ParamValue {
    Address(Address),
    Uint(#[serde(with = "decimal::u256")] U256),
    Int(#[serde(with = "decimal::i256")] I256),
    Bool(bool),
    Bytes(Bytes),
    String(String),
    Array(Vec<DecodedParam>),
    Tuple(Vec<DecodedParam>),
    /// Values the renderer has no dedicated form for (e.g. Solidity `function`).
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedParam {
    pub name: String,
    /// Canonical Solidity type, e.g. `uint256` or `(address,uint256)[]`.
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ParamValue,
}

impl DecodedParam {
    pub fn kind(&self) -> ParamKind {
        ParamKind::from_solidity(&self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedCall {
    pub name: String,
    /// Canonical signature the call was decoded with (empty for plain transfers).
    pub signature: String,
    pub to: Address,
    #[serde(with = "decimal::u256")]
    pub value: U256,
    pub operation: Operation,
    pub label: Option<String>,
    pub params: Vec<DecodedParam>,
    /// Inner actions of a nested batch (`multiSend`, `executeAsBaal`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<DecodedAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionError {
    pub message: String,
    pub to: Option<Address>,
    #[serde(default, with = "decimal::opt_u256")]
    pub value: Option<U256>,
    pub data: Bytes,
}

/// Result of decoding a single `RawCall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DecodedAction {
    Decoded(DecodedCall),
    DecodeError(ActionError),
}

impl DecodedAction {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::DecodeError(_))
    }

    /// Function name, or `None` for undecodable calls.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Decoded(call) => Some(&call.name),
            Self::DecodeError(_) => None,
        }
    }

    pub fn as_decoded(&self) -> Option<&DecodedCall> {
        match self {
            Self::Decoded(call) => Some(call),
            Self::DecodeError(_) => None,
        }
    }

    /// True if this action or any nested action failed to decode.
    pub fn contains_error(&self) -> bool {
        match self {
            Self::DecodeError(_) => true,
            Self::Decoded(call) => call.nested.iter().any(Self::contains_error),
        }
    }
}

/// Decoded actions of a proposal plus the error signal used for the warning banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalActions {
    pub actions: Vec<DecodedAction>,
    pub had_decode_error: bool,
}

impl ProposalActions {
    pub fn new(actions: Vec<DecodedAction>) -> Self {
        let had_decode_error =
            actions.is_empty() || actions.iter().any(DecodedAction::contains_error);
        Self {
            actions,
            had_decode_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DecodeOutcome {
    /// Chain id failed validation; nothing was decoded.
    NotReady,
    Ready(ProposalActions),
}

impl DecodeOutcome {
    pub fn actions(&self) -> Option<&ProposalActions> {
        match self {
            Self::NotReady => None,
            Self::Ready(actions) => Some(actions),
        }
    }
}
