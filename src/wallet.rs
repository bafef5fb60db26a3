//! Wallet session: which account the wallet authorized in this app and which
//! of its keys the wallet granted.
//!
//! The session record lives in a [`SessionStore`] under
//! `<app_key_prefix>_wallet_auth_key`. Sign-in itself happens in the wallet;
//! this module only prepares the request and accepts the completion.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::account::connected::ConnectedWalletAccount;
use crate::account::types::AccountId;
use crate::client::AccessKeySource;
use crate::crypto::{KeyPair, PublicKey};
use crate::error::WalletError;
use crate::keystore::KeyStore;
use crate::storage::SessionStore;
use crate::transaction::Transaction;

pub const LOCAL_STORAGE_KEY_SUFFIX: &str = "_wallet_auth_key";
pub const PENDING_ACCESS_KEY_PREFIX: &str = "pending_key";
const DEFAULT_APP_KEY_PREFIX: &str = "default";

/// In-memory and persisted form of the session
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletSessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub all_keys: Vec<PublicKey>,
}

/// Result of a finished sign-in redirect, delivered by the UI
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignInCompletion {
    pub account_id: AccountId,
    pub all_keys: Vec<PublicKey>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SignInOptions {
    pub contract_id: Option<AccountId>,
    #[serde(default)]
    pub method_names: Vec<String>,
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
}

/// Everything the UI needs to send the user to the wallet
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignInRequest {
    #[serde(flatten)]
    pub options: SignInOptions,
    /// Fresh key the wallet is asked to add; only when a contract is given
    pub public_key: Option<PublicKey>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RequestSignTransactionsOptions {
    pub transactions: Vec<Transaction>,
    pub callback_url: Option<String>,
    /// Sent back by the wallet as a search param of the callback url
    pub meta: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignTransactionsRequest {
    pub account_id: AccountId,
    pub transactions: Vec<Transaction>,
    pub callback_url: Option<String>,
    pub meta: Option<String>,
}

pub trait CanProvideSignIn {
    fn request_sign_in(&self, options: SignInOptions) -> Result<SignInRequest, WalletError>;
    fn complete_sign_in(&self, completion: SignInCompletion) -> Result<(), WalletError>;
    fn is_signed_in(&self) -> bool;
    fn sign_out(&self);
}

pub trait CanSignTransactions {
    fn request_sign_transactions(
        &self,
        options: RequestSignTransactionsOptions,
    ) -> Result<SignTransactionsRequest, WalletError>;
}

pub trait CanReportAccountIdentity: Send + Sync {
    /// Authorized account, or "" when signed out
    fn get_account_id(&self) -> String;
    /// Keys the wallet granted in this session
    fn wallet_keys(&self) -> Vec<PublicKey>;
}

pub struct WalletConnection {
    app_key_prefix: String,
    auth_data_key: String,
    network_id: String,
    store: Arc<dyn SessionStore>,
    key_store: Arc<dyn KeyStore>,
    state: Mutex<WalletSessionState>,
}

impl WalletConnection {
    /// Open the session for an app, reading any persisted record.
    ///
    /// The prefix falls back to the contract name, then to `"default"`.
    pub fn new(
        app_key_prefix: Option<&str>,
        contract_name: Option<&str>,
        network_id: &str,
        store: Arc<dyn SessionStore>,
        key_store: Arc<dyn KeyStore>,
    ) -> Self {
        let app_key_prefix = app_key_prefix
            .filter(|p| !p.is_empty())
            .or(contract_name.filter(|c| !c.is_empty()))
            .unwrap_or(DEFAULT_APP_KEY_PREFIX)
            .to_string();
        let auth_data_key = format!("{}{}", app_key_prefix, LOCAL_STORAGE_KEY_SUFFIX);
        let state = load_state(store.as_ref(), &auth_data_key);

        info!(
            "Wallet session '{}' opened on {}: {}",
            app_key_prefix,
            network_id,
            state.account_id.as_deref().unwrap_or("signed out")
        );

        Self {
            app_key_prefix,
            auth_data_key,
            network_id: network_id.to_string(),
            store,
            key_store,
            state: Mutex::new(state),
        }
    }

    pub fn app_key_prefix(&self) -> &str {
        &self.app_key_prefix
    }

    pub fn auth_data_key(&self) -> &str {
        &self.auth_data_key
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn key_store(&self) -> Arc<dyn KeyStore> {
        self.key_store.clone()
    }

    /// Snapshot of the current session
    pub fn state(&self) -> WalletSessionState {
        self.lock().clone()
    }

    pub fn all_keys(&self) -> Vec<PublicKey> {
        self.lock().all_keys.clone()
    }

    /// Account handle for transaction signing, bound to this session
    pub fn account(
        self: &Arc<Self>,
        source: Arc<dyn AccessKeySource>,
    ) -> Result<ConnectedWalletAccount, WalletError> {
        let account_id = self.get_account_id();
        if account_id.is_empty() {
            return Err(WalletError::NotSignedIn);
        }
        let wallet: Arc<dyn CanReportAccountIdentity> = self.clone();
        Ok(ConnectedWalletAccount::new(account_id, wallet, source)
            .with_key_store(&self.network_id, self.key_store.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, WalletSessionState> {
        // State is replaced whole, so a poisoned lock still holds a valid value
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pending_key_slot(public_key: &PublicKey) -> String {
        format!("{}{}", PENDING_ACCESS_KEY_PREFIX, public_key)
    }

    /// Move the key generated by `request_sign_in` to the signed-in account
    fn promote_pending_key(&self, completion: &SignInCompletion) -> Result<(), WalletError> {
        for public_key in &completion.all_keys {
            let slot = Self::pending_key_slot(public_key);
            if let Some(key_pair) = self.key_store.get_key(&self.network_id, &slot)? {
                self.key_store.set_key(&self.network_id, &completion.account_id, key_pair)?;
                self.key_store.remove_key(&self.network_id, &slot)?;
                info!("Stored local key {} for {}", public_key, completion.account_id);
            }
        }
        Ok(())
    }
}

fn load_state(store: &dyn SessionStore, auth_data_key: &str) -> WalletSessionState {
    let raw = match store.get(auth_data_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return WalletSessionState::default(),
        Err(e) => {
            warn!("Failed to read wallet session '{}': {}. Starting signed out.", auth_data_key, e);
            return WalletSessionState::default();
        }
    };

    match serde_json::from_str::<Option<WalletSessionState>>(&raw) {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring malformed wallet session '{}': {}", auth_data_key, e);
            WalletSessionState::default()
        }
    }
}

impl CanProvideSignIn for WalletConnection {
    fn request_sign_in(&self, options: SignInOptions) -> Result<SignInRequest, WalletError> {
        let public_key = match options.contract_id {
            Some(_) => {
                let key_pair = KeyPair::generate();
                let public_key = key_pair.public_key();
                self.key_store
                    .set_key(&self.network_id, &Self::pending_key_slot(&public_key), key_pair)?;
                debug!("Generated pending key {}", public_key);
                Some(public_key)
            }
            None => None,
        };
        Ok(SignInRequest { options, public_key })
    }

    fn complete_sign_in(&self, completion: SignInCompletion) -> Result<(), WalletError> {
        let state = WalletSessionState {
            account_id: Some(completion.account_id.clone()),
            all_keys: completion.all_keys.clone(),
        };
        let record = serde_json::to_string(&state)?;

        // Memory only follows a record that reached the store
        self.store.set(&self.auth_data_key, &record)?;
        *self.lock() = state;

        if let Err(e) = self.promote_pending_key(&completion) {
            warn!("Failed to store local key for {}: {}", completion.account_id, e);
        }

        info!(
            "Signed in as {} with {} wallet keys",
            completion.account_id,
            completion.all_keys.len()
        );
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        self.lock().account_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    fn sign_out(&self) {
        *self.lock() = WalletSessionState::default();
        if let Err(e) = self.store.remove(&self.auth_data_key) {
            warn!("Failed to remove wallet session '{}': {}", self.auth_data_key, e);
        }
        info!("Signed out of wallet session '{}'", self.app_key_prefix);
    }
}

impl CanSignTransactions for WalletConnection {
    fn request_sign_transactions(
        &self,
        options: RequestSignTransactionsOptions,
    ) -> Result<SignTransactionsRequest, WalletError> {
        let account_id = self.get_account_id();
        if account_id.is_empty() {
            return Err(WalletError::NotSignedIn);
        }
        Ok(SignTransactionsRequest {
            account_id,
            transactions: options.transactions,
            callback_url: options.callback_url,
            meta: options.meta,
        })
    }
}

impl CanReportAccountIdentity for WalletConnection {
    fn get_account_id(&self) -> String {
        self.lock().account_id.clone().unwrap_or_default()
    }

    fn wallet_keys(&self) -> Vec<PublicKey> {
        self.all_keys()
    }
}
