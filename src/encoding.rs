//! Serde helpers for the chain's JSON conventions.
//!
//! Token amounts (yocto units) overflow JSON numbers, so the chain encodes
//! them as decimal strings. Plain numbers are still accepted on input.

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Text(String),
    Number(u64),
}

fn parse_amount<E: de::Error>(raw: Amount) -> Result<u128, E> {
    match raw {
        Amount::Text(s) => s
            .trim()
            .parse::<u128>()
            .map_err(|e| E::custom(format!("invalid amount '{}': {}", s, e))),
        Amount::Number(n) => Ok(n as u128),
    }
}

/// `u128` as a decimal string
pub mod dec_format {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        parse_amount(Amount::deserialize(deserializer)?)
    }
}

/// `Option<u128>` as a decimal string or null
pub mod option_dec_format {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u128>, D::Error> {
        match Option::<Amount>::deserialize(deserializer)? {
            Some(raw) => parse_amount(raw).map(Some),
            None => Ok(None),
        }
    }
}
