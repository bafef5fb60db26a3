//! Key-value persistence for the wallet session record

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::WalletError;
use crate::keystore::SledKeyStore;

/// Per-origin string store, the equivalent of browser local storage
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, WalletError>;
    fn set(&self, key: &str, value: &str) -> Result<(), WalletError>;
    fn remove(&self, key: &str) -> Result<(), WalletError>;
}

/// Volatile store, lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, WalletError> {
        self.entries
            .lock()
            .map_err(|e| WalletError::Storage(format!("Mutex poisoned: {}", e)))
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WalletError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Durable store on disk
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Store removed when dropped
    pub fn temporary() -> Result<Self, WalletError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Local signing keys, kept in their own tree of the same database
    pub fn key_store(&self) -> Result<SledKeyStore, WalletError> {
        Ok(SledKeyStore::new(self.db.open_tree("keystore")?))
    }
}

impl SessionStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|e| WalletError::Storage(format!("Non UTF-8 value under '{}': {}", key, e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WalletError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}
