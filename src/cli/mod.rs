pub mod session;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "compass-wallet")]
#[command(about = "Wallet session and access key CLI", long_about = None)]
pub struct Cli {
    /// Path to the TOML config
    #[arg(long, default_value = "wallet.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current wallet session
    Status,
    /// Prepare a wallet sign-in, generating a local key for the contract
    RequestSignIn {
        #[arg(long)]
        contract_id: Option<String>,
        /// Method the key may call (repeatable, none means any)
        #[arg(long = "method")]
        method_names: Vec<String>,
        #[arg(long)]
        success_url: Option<String>,
        #[arg(long)]
        failure_url: Option<String>,
    },
    /// Record a completed wallet sign-in
    SignIn {
        #[arg(long)]
        account_id: String,
        /// Wallet-granted public key (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    /// Forget the wallet session
    SignOut,
    /// List the access keys of an account on chain
    Keys {
        /// Defaults to the signed-in account
        #[arg(long)]
        account_id: Option<String>,
    },
    /// Find the key allowed to sign a function call
    Resolve {
        #[arg(long)]
        receiver_id: String,
        #[arg(long)]
        method: String,
        /// Attached deposit in yocto units
        #[arg(long, default_value = "0")]
        deposit: u128,
        #[arg(long, default_value = "30000000000000")]
        gas: u64,
        /// Locally held public key to prefer
        #[arg(long)]
        local_key: Option<String>,
    },
}
