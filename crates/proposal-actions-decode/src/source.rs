//! In-process signature sources

use proposal_actions_core::{PortError, SignatureMap, SignatureSource};

/// Source that never resolves anything (offline decoding).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignatureSource;

impl SignatureSource for NoSignatureSource {
    async fn lookup_signatures(&self, _selectors: &[String]) -> Result<SignatureMap, PortError> {
        Ok(SignatureMap::new())
    }
}

/// Fixed selector -> signatures table.
#[derive(Debug, Clone, Default)]
pub struct StaticSignatures {
    signatures: SignatureMap,
}

impl StaticSignatures {
    pub fn new(signatures: SignatureMap) -> Self {
        Self { signatures }
    }
}

impl SignatureSource for StaticSignatures {
    async fn lookup_signatures(&self, selectors: &[String]) -> Result<SignatureMap, PortError> {
        Ok(selectors
            .iter()
            .filter_map(|s| {
                let key = s.to_ascii_lowercase();
                self.signatures.get(&key).map(|sigs| (key, sigs.clone()))
            })
            .collect())
    }
}
