//! Selector registry
//!
//! Maps 4-byte selectors to the ABI fragments that can decode them. Built
//! once from human-readable signatures and read-only afterwards; signatures
//! resolved from an external source are merged into a copy, never into the
//! shared instance.

use std::collections::HashMap;

use alloy::json_abi::Function;
use eyre::{Result, WrapErr};

use proposal_actions_core::SignatureMap;

use super::decode_log;

/// Fragments a Moloch v3 proposal typically calls: the MultiSend envelope,
/// Baal governance/admin/shaman management, the Poster, ERC-20/721 tokens
/// and Safe vault management.
pub const DEFAULT_SIGNATURES: &[&str] = &[
    // MultiSend
    "multiSend(bytes transactions)",
    // Baal
    "executeAsBaal(address _to, uint256 _value, bytes _data)",
    "setShamans(address[] _shamans, uint256[] _permissions)",
    "setAdminConfig(bool pauseShares, bool pauseLoot)",
    "setGovernanceConfig(bytes _governanceConfig)",
    "mintShares(address[] to, uint256[] amount)",
    "burnShares(address[] from, uint256[] amount)",
    "mintLoot(address[] to, uint256[] amount)",
    "burnLoot(address[] from, uint256[] amount)",
    "setTrustedForwarder(address _trustedForwarderAddress)",
    "lockAdmin()",
    "lockManager()",
    "lockGovernor()",
    // Poster
    "post(string content, string tag)",
    // ERC-20
    "transfer(address to, uint256 amount)",
    "approve(address spender, uint256 amount)",
    "transferFrom(address from, address to, uint256 amount)",
    // ERC-721 (transferFrom shares the ERC-20 selector)
    "safeTransferFrom(address from, address to, uint256 tokenId)",
    "safeTransferFrom(address from, address to, uint256 tokenId, bytes data)",
    "setApprovalForAll(address operator, bool approved)",
    // Safe
    "addOwnerWithThreshold(address owner, uint256 _threshold)",
    "removeOwner(address prevOwner, address owner, uint256 _threshold)",
    "swapOwner(address prevOwner, address oldOwner, address newOwner)",
    "changeThreshold(uint256 _threshold)",
    "enableModule(address module)",
    "disableModule(address prevModule, address module)",
];

#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
    fragments: HashMap<[u8; 4], Vec<Function>>,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with [`DEFAULT_SIGNATURES`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for signature in DEFAULT_SIGNATURES {
            if let Err(e) = registry.register(signature) {
                tracing::error!("skipping default signature: {e:#}");
            }
        }
        registry
    }

    /// Parse and register a human-readable signature, returning its selector.
    pub fn register(&mut self, signature: &str) -> Result<[u8; 4]> {
        let function = Function::parse(signature)
            .wrap_err_with(|| format!("Invalid signature '{}'", signature))?;
        Ok(self.insert(function))
    }

    pub fn extend<'a>(&mut self, signatures: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for signature in signatures {
            self.register(signature)?;
        }
        Ok(())
    }

    /// Register a parsed fragment. Fragments with an identical canonical
    /// signature are kept once; collisions with different types are kept in
    /// insertion order.
    pub fn insert(&mut self, function: Function) -> [u8; 4] {
        let selector = function.selector().0;
        let entry = self.fragments.entry(selector).or_default();
        let signature = function.signature();
        if !entry.iter().any(|f| f.signature() == signature) {
            entry.push(function);
        }
        selector
    }

    pub fn lookup(&self, selector: &[u8; 4]) -> &[Function] {
        self.fragments
            .get(selector)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, selector: &[u8; 4]) -> bool {
        self.fragments.contains_key(selector)
    }

    /// Number of distinct selectors.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Copy of this registry with externally resolved signatures appended.
    ///
    /// Candidates whose selector does not match the key they were returned
    /// under, or that fail to parse, are dropped.
    pub fn with_signatures(&self, signatures: &SignatureMap) -> Self {
        let mut registry = self.clone();
        for (selector, candidates) in signatures {
            for candidate in candidates {
                match Function::parse(candidate) {
                    Ok(function) if selector_hex(&function.selector().0) == *selector => {
                        registry.insert(function);
                    }
                    Ok(_) => decode_log!("{} does not hash to {}", candidate, selector),
                    Err(e) => decode_log!("unparseable signature {}: {}", candidate, e),
                }
            }
        }
        registry
    }
}

fn selector_hex(selector: &[u8; 4]) -> String {
    format!("0x{}", alloy::primitives::hex::encode(selector))
}
