//! Account bound to a wallet session, choosing which key signs a transaction

use std::sync::Arc;
use tracing::debug;

use super::auth::access_key_matches_transaction;
use super::types::{AccessKey, AccountId};
use crate::client::AccessKeySource;
use crate::crypto::PublicKey;
use crate::error::WalletError;
use crate::keystore::KeyStore;
use crate::transaction::Action;
use crate::wallet::CanReportAccountIdentity;

pub struct ConnectedWalletAccount {
    account_id: AccountId,
    wallet: Arc<dyn CanReportAccountIdentity>,
    source: Arc<dyn AccessKeySource>,
    local_keys: Option<(String, Arc<dyn KeyStore>)>,
}

impl ConnectedWalletAccount {
    pub fn new(
        account_id: AccountId,
        wallet: Arc<dyn CanReportAccountIdentity>,
        source: Arc<dyn AccessKeySource>,
    ) -> Self {
        Self {
            account_id,
            wallet,
            source,
            local_keys: None,
        }
    }

    /// Look up local signing keys for this account on `network_id`
    pub fn with_key_store(mut self, network_id: &str, key_store: Arc<dyn KeyStore>) -> Self {
        self.local_keys = Some((network_id.to_string(), key_store));
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub async fn get_access_keys(&self) -> Result<Vec<AccessKey>, WalletError> {
        self.source.get_access_keys(&self.account_id).await
    }

    pub fn access_key_matches_transaction(
        &self,
        access_key: &AccessKey,
        receiver_id: &str,
        actions: &[Action],
    ) -> bool {
        access_key_matches_transaction(access_key, receiver_id, actions, &self.account_id)
    }

    /// Access key allowed to sign `actions` for `receiver_id`.
    ///
    /// A usable `local_key` wins. Otherwise the first key in chain order that
    /// the wallet granted and that allows the actions is returned. `Ok(None)`
    /// means no key qualifies; a failed key query is an error.
    pub async fn access_key_for_transaction(
        &self,
        receiver_id: &str,
        actions: &[Action],
        local_key: Option<&PublicKey>,
    ) -> Result<Option<AccessKey>, WalletError> {
        let access_keys = self.get_access_keys().await?;

        if let Some(local_key) = local_key {
            let local = access_keys.iter().find(|key| &key.public_key == local_key);
            if let Some(access_key) = local {
                if self.access_key_matches_transaction(access_key, receiver_id, actions) {
                    debug!("Using local key {} for {}", local_key, receiver_id);
                    return Ok(Some(access_key.clone()));
                }
            }
        }

        let wallet_keys = self.wallet.wallet_keys();
        let granted = access_keys.into_iter().find(|access_key| {
            wallet_keys.contains(&access_key.public_key)
                && self.access_key_matches_transaction(access_key, receiver_id, actions)
        });

        match &granted {
            Some(access_key) => debug!("Using wallet key {} for {}", access_key.public_key, receiver_id),
            None => debug!("No access key of {} allows this transaction to {}", self.account_id, receiver_id),
        }
        Ok(granted)
    }

    /// Same as [`Self::access_key_for_transaction`], taking the local key
    /// from the key store when one is attached
    pub async fn access_key_for_local_signer(
        &self,
        receiver_id: &str,
        actions: &[Action],
    ) -> Result<Option<AccessKey>, WalletError> {
        let local_key = match &self.local_keys {
            Some((network_id, key_store)) => key_store
                .get_key(network_id, &self.account_id)?
                .map(|key_pair| key_pair.public_key()),
            None => None,
        };
        self.access_key_for_transaction(receiver_id, actions, local_key.as_ref()).await
    }
}
