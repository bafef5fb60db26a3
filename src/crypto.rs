use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Public key as the chain reports it, e.g. `ed25519:<base58>`.
///
/// Ed25519 keys are decoded and compare by curve and bytes. Keys on any
/// other curve (the chain also has `secp256k1`) are kept as their text form:
/// they compare by text and never equal an ed25519 key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519([u8; 32]),
    Other(String),
}

const ED25519_PREFIX: &str = "ed25519";

impl PublicKey {
    pub fn ed25519(data: [u8; 32]) -> Self {
        PublicKey::Ed25519(data)
    }

    /// Curve name as used in the text form
    pub fn key_type(&self) -> &str {
        match self {
            PublicKey::Ed25519(_) => ED25519_PREFIX,
            PublicKey::Other(text) => text.split_once(':').map(|(curve, _)| curve).unwrap_or(""),
        }
    }

    pub fn ed25519_bytes(&self) -> Option<&[u8; 32]> {
        match self {
            PublicKey::Ed25519(data) => Some(data),
            PublicKey::Other(_) => None,
        }
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey::Ed25519(key.to_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Ed25519(data) => {
                write!(f, "{}:{}", ED25519_PREFIX, bs58::encode(data).into_string())
            }
            PublicKey::Other(text) => f.write_str(text),
        }
    }
}

impl FromStr for PublicKey {
    type Err = WalletError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A bare base58 string is an ed25519 key
        let (curve, encoded) = s.split_once(':').unwrap_or((ED25519_PREFIX, s));

        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| WalletError::InvalidKey(format!("{}: {}", s, e)))?;
        if curve.is_empty() || bytes.is_empty() {
            return Err(WalletError::InvalidKey(format!("{}: missing curve or key data", s)));
        }

        if !curve.eq_ignore_ascii_case(ED25519_PREFIX) {
            return Ok(PublicKey::Other(s.to_string()));
        }
        let data: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            WalletError::InvalidKey(format!("{}: expected 32 bytes, got {}", s, b.len()))
        })?;
        Ok(PublicKey::Ed25519(data))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Locally held ed25519 key pair
#[derive(Clone)]
pub struct KeyPair {
    pub signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new Ed25519 keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        KeyPair { signing_key: SigningKey::generate(&mut csprng) }
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        KeyPair { signing_key: SigningKey::from_bytes(secret) }
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().into()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("public_key", &self.public_key().to_string()).finish()
    }
}
