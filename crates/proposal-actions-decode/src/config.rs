use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classify::ClassifierConfig;
use super::decoder::{Decoder, DEFAULT_MAX_NESTED_DEPTH};
use super::registry::AbiRegistry;
use super::render::RenderOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid extra signature {signature}: {reason}")]
    Signature { signature: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeConfig {
    pub max_nested_depth: usize,
    pub default_token_decimals: u8,
    pub amount_param_names: Vec<String>,
    pub truncate_addresses: bool,
    pub max_bytes_chars: usize,
    /// Extra human-readable signatures registered on top of the defaults.
    pub extra_signatures: Vec<String>,
    pub sourcify_enabled: bool,
    pub sourcify_base_url: String,
    pub sourcify_timeout_ms: u64,
    pub sourcify_max_failed_requests: usize,
    pub classifier: ClassifierConfig,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            max_nested_depth: DEFAULT_MAX_NESTED_DEPTH,
            default_token_decimals: render.default_decimals,
            amount_param_names: render.amount_param_names,
            truncate_addresses: render.truncate_addresses,
            max_bytes_chars: render.max_bytes_chars,
            extra_signatures: vec![],
            sourcify_enabled: false,
            sourcify_base_url: "https://api.4byte.sourcify.dev/signature-database/v1/lookup"
                .to_owned(),
            sourcify_timeout_ms: 10_000,
            sourcify_max_failed_requests: 3,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl DecodeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Decoder over the default registry plus `extra_signatures`.
    pub fn build_decoder(&self) -> Result<Decoder, ConfigError> {
        let mut registry = AbiRegistry::with_defaults();
        for signature in &self.extra_signatures {
            registry
                .register(signature)
                .map_err(|e| ConfigError::Signature {
                    signature: signature.clone(),
                    reason: format!("{e:#}"),
                })?;
        }
        Ok(Decoder::new(registry).with_max_nested_depth(self.max_nested_depth))
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            truncate_addresses: self.truncate_addresses,
            max_bytes_chars: self.max_bytes_chars,
            amount_param_names: self.amount_param_names.clone(),
            default_decimals: self.default_token_decimals,
        }
    }
}
