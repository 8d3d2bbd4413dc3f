//! Decimal-string serde forms for 256-bit integers (`"1000000000000000000"`).
//!
//! Deserialization also accepts `0x`-prefixed hex.

use alloy::primitives::{I256, U256};
use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub mod u256 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.trim().parse::<U256>().map_err(D::Error::custom)
    }
}

pub mod opt_u256 {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<U256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<U256>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| s.trim().parse::<U256>().map_err(D::Error::custom))
            .transpose()
    }
}

pub mod i256 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<I256, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        match s.strip_prefix("0x") {
            Some(hex) => I256::from_hex_str(hex),
            None => I256::from_dec_str(s),
        }
        .map_err(D::Error::custom)
    }
}
