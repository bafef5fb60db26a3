use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use compass_wallet_access::cli::{session, Cli, Commands};
use compass_wallet_access::client::RpcClient;
use compass_wallet_access::config::WalletConfig;
use compass_wallet_access::storage::SledStore;
use compass_wallet_access::transaction::Action;
use compass_wallet_access::wallet::SignInOptions;
use compass_wallet_access::{WalletConnection, WalletError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = WalletConfig::load_or_default(&cli.config);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.wallet.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli.command, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: WalletConfig) -> Result<(), WalletError> {
    let store = Arc::new(SledStore::open(&config.wallet.session_db_path)?);
    let key_store = Arc::new(store.key_store()?);
    let wallet = Arc::new(WalletConnection::new(
        config.wallet.app_key_prefix.as_deref(),
        config.wallet.contract_name.as_deref(),
        &config.wallet.network_id,
        store,
        key_store,
    ));
    let client = Arc::new(RpcClient::new(config.rpc.url.clone()));

    match command {
        Commands::Status => session::handle_status(&wallet),
        Commands::RequestSignIn { contract_id, method_names, success_url, failure_url } => {
            let options = SignInOptions { contract_id, method_names, success_url, failure_url };
            session::handle_request_sign_in(&wallet, options)?
        }
        Commands::SignIn { account_id, keys } => session::handle_sign_in(&wallet, account_id, keys)?,
        Commands::SignOut => session::handle_sign_out(&wallet),
        Commands::Keys { account_id } => session::handle_keys(&wallet, &client, account_id).await?,
        Commands::Resolve { receiver_id, method, deposit, gas, local_key } => {
            let action = Action::function_call(&method, "", gas, deposit);
            session::handle_resolve(wallet, client, receiver_id, action, local_key).await?
        }
    }
    Ok(())
}
