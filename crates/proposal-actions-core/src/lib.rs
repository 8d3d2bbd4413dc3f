pub mod decimal;
pub mod domain;
pub mod network;
pub mod ports;

pub use domain::{
    ActionError, ActionMeta, ActionMetaTable, DecodeOutcome, DecodedAction, DecodedCall,
    DecodedParam, Operation, ParamKind, ParamValue, ProposalActions, ProposalRecord, RawCall,
    SubActionMeta, ETH_TRANSFER_ACTION, UNKNOWN_ACTION_MESSAGE,
};
pub use network::{is_valid_network, network, Network, NetworkError, NETWORKS};
pub use ports::{PortError, SignatureMap, SignatureSource};
