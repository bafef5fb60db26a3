pub mod account; // access keys, permission checks, key resolution
pub mod error;
pub mod client;
pub mod crypto;
pub mod encoding;
pub mod keystore;
pub mod storage;
pub mod transaction;
pub mod wallet;
pub mod cli;
pub mod config;

pub use account::{access_key_matches_transaction, AccessKey, ConnectedWalletAccount, Permission};
pub use error::WalletError;
pub use wallet::{SignInCompletion, WalletConnection, WalletSessionState};
