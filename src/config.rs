use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletConfig {
    pub wallet: WalletSettings,
    pub rpc: RpcSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletSettings {
    #[serde(default)]
    pub app_key_prefix: Option<String>,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default = "default_network_id")]
    pub network_id: String,
    #[serde(default = "default_session_db_path")]
    pub session_db_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network_id() -> String {
    "testnet".to_string()
}

fn default_session_db_path() -> String {
    "./data/wallet-session".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RpcSettings {
    pub url: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet: WalletSettings {
                app_key_prefix: None,
                contract_name: None,
                network_id: default_network_id(),
                session_db_path: default_session_db_path(),
                log_level: default_log_level(),
            },
            rpc: RpcSettings {
                url: "https://rpc.testnet.near.org".to_string(),
            },
        }
    }
}

impl WalletConfig {
    /// Read `path`, or write a default config there when it does not exist.
    /// Any failure leaves the defaults in place.
    pub fn load_or_default(path: &str) -> Self {
        let path = Path::new(path);
        if !path.exists() {
            let config = Self::default();
            config.write_default(path);
            return config;
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        toml::from_str(&text).map_err(|e| e.to_string())
    }

    fn write_default(&self, path: &Path) {
        let written = toml::to_string_pretty(self)
            .map_err(|e| e.to_string())
            .and_then(|text| std::fs::write(path, text).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!("Wrote default config to {}", path.display()),
            Err(e) => warn!("Could not write default config to {}: {}", path.display(), e),
        }
    }
}
