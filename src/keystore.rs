//! Locally held signing keys, indexed by network and account

use std::collections::HashMap;
use std::sync::Mutex;

use crate::crypto::KeyPair;
use crate::error::WalletError;

pub trait KeyStore: Send + Sync {
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: KeyPair) -> Result<(), WalletError>;
    fn get_key(&self, network_id: &str, account_id: &str) -> Result<Option<KeyPair>, WalletError>;
    fn remove_key(&self, network_id: &str, account_id: &str) -> Result<(), WalletError>;
}

fn slot(network_id: &str, account_id: &str) -> String {
    format!("{}:{}", account_id, network_id)
}

#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: Mutex<HashMap<String, KeyPair>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, KeyPair>>, WalletError> {
        self.keys
            .lock()
            .map_err(|e| WalletError::Storage(format!("Mutex poisoned: {}", e)))
    }
}

impl KeyStore for InMemoryKeyStore {
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: KeyPair) -> Result<(), WalletError> {
        self.lock()?.insert(slot(network_id, account_id), key_pair);
        Ok(())
    }

    fn get_key(&self, network_id: &str, account_id: &str) -> Result<Option<KeyPair>, WalletError> {
        Ok(self.lock()?.get(&slot(network_id, account_id)).cloned())
    }

    fn remove_key(&self, network_id: &str, account_id: &str) -> Result<(), WalletError> {
        self.lock()?.remove(&slot(network_id, account_id));
        Ok(())
    }
}

/// Key store kept in a sled tree, so keys outlive the process.
///
/// Each slot holds the 32 byte ed25519 secret.
pub struct SledKeyStore {
    tree: sled::Tree,
}

impl SledKeyStore {
    pub fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }
}

impl KeyStore for SledKeyStore {
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: KeyPair) -> Result<(), WalletError> {
        self.tree.insert(slot(network_id, account_id).as_bytes(), &key_pair.secret_bytes()[..])?;
        self.tree.flush()?;
        Ok(())
    }

    fn get_key(&self, network_id: &str, account_id: &str) -> Result<Option<KeyPair>, WalletError> {
        let key = slot(network_id, account_id);
        match self.tree.get(key.as_bytes())? {
            Some(data) => {
                let secret: [u8; 32] = data.as_ref().try_into().map_err(|_| {
                    WalletError::Storage(format!("Corrupt key under '{}': {} bytes", key, data.len()))
                })?;
                Ok(Some(KeyPair::from_secret_bytes(&secret)))
            }
            None => Ok(None),
        }
    }

    fn remove_key(&self, network_id: &str, account_id: &str) -> Result<(), WalletError> {
        self.tree.remove(slot(network_id, account_id).as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}
