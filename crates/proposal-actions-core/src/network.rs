//! Allowlisted networks
//!
//! Chain ids are the hex strings used by the governance front-end (`0x1`,
//! `0x64`, ...). Anything outside this list short-circuits decoding.

use alloy::primitives::{address, Address};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("malformed chain id: {0}")]
    Malformed(String),
    #[error("unsupported chain id: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Hex chain id as used in routes, e.g. `0x64`.
    pub chain_id: &'static str,
    pub id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub explorer: &'static str,
}

/// Safe MultiSend deployments (v1.3.0 and v1.4.1, plus their call-only variants).
const MULTISEND_LIBRARIES: [Address; 4] = [
    address!("a238cbeb142c10ef7ad8442c6d1f9e89e07e7761"),
    address!("40a2accbd92bca938b02010e17a5b8929b49130d"),
    address!("38869bf66a61cf6bdb996a6ae40d5853fd43b526"),
    address!("9641d764fc13c8b624c04430c7356c1c7c8102e2"),
];

pub const NETWORKS: &[Network] = &[
    Network {
        chain_id: "0x1",
        id: 1,
        name: "Mainnet",
        symbol: "ETH",
        explorer: "https://etherscan.io",
    },
    Network {
        chain_id: "0x64",
        id: 100,
        name: "Gnosis",
        symbol: "XDAI",
        explorer: "https://gnosisscan.io",
    },
    Network {
        chain_id: "0x89",
        id: 137,
        name: "Polygon",
        symbol: "MATIC",
        explorer: "https://polygonscan.com",
    },
    Network {
        chain_id: "0xa",
        id: 10,
        name: "Optimism",
        symbol: "ETH",
        explorer: "https://optimistic.etherscan.io",
    },
    Network {
        chain_id: "0xa4b1",
        id: 42161,
        name: "Arbitrum One",
        symbol: "ETH",
        explorer: "https://arbiscan.io",
    },
    Network {
        chain_id: "0x2105",
        id: 8453,
        name: "Base",
        symbol: "ETH",
        explorer: "https://basescan.org",
    },
    Network {
        chain_id: "0xaa36a7",
        id: 11155111,
        name: "Sepolia",
        symbol: "ETH",
        explorer: "https://sepolia.etherscan.io",
    },
];

/// Resolve a chain id against the allowlist. Only the exact keys match:
/// `0x01`, `0X1` and padded forms are rejected.
pub fn network(chain_id: &str) -> Result<&'static Network, NetworkError> {
    if let Some(network) = NETWORKS.iter().find(|n| n.chain_id == chain_id) {
        return Ok(network);
    }
    let is_hex = chain_id
        .strip_prefix("0x")
        .is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_hexdigit()));
    if is_hex {
        Err(NetworkError::Unsupported(chain_id.to_owned()))
    } else {
        Err(NetworkError::Malformed(chain_id.to_owned()))
    }
}

pub fn is_valid_network(chain_id: &str) -> bool {
    network(chain_id).is_ok()
}

impl Network {
    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer, address.to_checksum(None))
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer, tx_hash.trim())
    }

    /// Whether `address` is one of the canonical MultiSend libraries.
    pub fn is_multisend(&self, address: &Address) -> bool {
        MULTISEND_LIBRARIES.contains(address)
    }
}
