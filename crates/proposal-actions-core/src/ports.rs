use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port unavailable: {0}")]
    Unavailable(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Candidate text signatures per `0x`-prefixed lowercase selector.
pub type SignatureMap = HashMap<String, Vec<String>>;

/// External collaborator resolving unknown selectors to text signatures.
///
/// Implementations may hit the network; the decoder itself never does.
pub trait SignatureSource: Send + Sync {
    fn lookup_signatures(
        &self,
        selectors: &[String],
    ) -> impl Future<Output = Result<SignatureMap, PortError>> + Send;
}
