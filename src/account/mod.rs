//! Account access keys and transaction authorization
//!
//! - Access key and permission types as the chain reports them
//! - Permission checks for a (receiver, actions) pair
//! - Key resolution for a wallet-connected account

pub mod types;
pub mod auth;
pub mod connected;

pub use types::{AccessKey, AccountId, FunctionCallPermission, Permission};
pub use auth::{access_key_matches_transaction, MULTISIG_HAS_METHOD};
pub use connected::ConnectedWalletAccount;
