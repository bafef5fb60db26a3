use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Access key query failed: {0}")]
    Transport(String),
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid public key: {0}")]
    InvalidKey(String),
    #[error("Wallet session is not signed in")]
    NotSignedIn,
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Serialization(err.to_string())
    }
}

impl From<sled::Error> for WalletError {
    fn from(err: sled::Error) -> Self {
        WalletError::Storage(err.to_string())
    }
}
