//! Proposal action decoding
//!
//! Turns a proposal's stored payload into a list of decoded actions:
//! - split MultiSend batches into individual calls
//! - decode each call against a selector registry
//! - render arguments for display
//! - flag sensitive actions
//!
//! Signatures for unknown selectors can come from an external source
//! (Sourcify) before the pure decode step runs.

pub mod classify;
pub mod config;
pub mod decoder;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod source;
pub mod sourcify;
pub mod splitter;

pub use classify::{Classification, Classifier, ClassifierConfig};
pub use config::{ConfigError, DecodeConfig};
pub use decoder::Decoder;
pub use pipeline::{decode_proposal_actions, ActionLoader, ActionPipeline, LoadedActions};
pub use registry::{AbiRegistry, DEFAULT_SIGNATURES};
pub use render::{
    dynamic_decimals, format_native, format_units_dynamic, render, render_value, RenderOptions,
    Rendered, RenderedField,
};
pub use source::{NoSignatureSource, StaticSignatures};
pub use sourcify::{SignatureInfo, SourcifyLookup};
pub use splitter::{
    decode_multisend_bytes, get_selector, split, unpack_multisend, MULTISEND_SELECTOR,
};

/// Debug-level decode trace, shared by the submodules.
macro_rules! decode_log {
    ($($arg:tt)*) => {
        tracing::debug!(target: "decode", $($arg)*)
    };
}

pub(crate) use decode_log;
