use std::sync::Arc;

use crate::account::ConnectedWalletAccount;
use crate::client::{AccessKeySource, RpcClient};
use crate::crypto::PublicKey;
use crate::error::WalletError;
use crate::transaction::Action;
use crate::wallet::{
    CanProvideSignIn, CanReportAccountIdentity, SignInCompletion, SignInOptions, WalletConnection,
};

pub fn handle_status(wallet: &WalletConnection) {
    if wallet.is_signed_in() {
        println!("Signed in as {}", wallet.get_account_id());
        println!("Wallet keys ({}):", wallet.all_keys().len());
        for key in wallet.all_keys() {
            println!(" - {}", key);
        }
    } else {
        println!("Signed out");
    }
}

pub fn handle_request_sign_in(wallet: &WalletConnection, options: SignInOptions) -> Result<(), WalletError> {
    let request = wallet.request_sign_in(options)?;
    if let Some(key) = &request.public_key {
        println!("Ask the wallet to add {}", key);
    }
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

pub fn handle_sign_in(wallet: &WalletConnection, account_id: String, keys: Vec<String>) -> Result<(), WalletError> {
    let all_keys = keys
        .iter()
        .map(|k| k.parse::<PublicKey>())
        .collect::<Result<Vec<_>, _>>()?;
    wallet.complete_sign_in(SignInCompletion { account_id, all_keys })?;
    println!("✅ Signed in as {}", wallet.get_account_id());
    Ok(())
}

pub fn handle_sign_out(wallet: &WalletConnection) {
    wallet.sign_out();
    println!("Signed out");
}

pub async fn handle_keys(
    wallet: &WalletConnection,
    client: &RpcClient,
    account_id: Option<String>,
) -> Result<(), WalletError> {
    let account_id = match account_id {
        Some(id) => id,
        None if wallet.is_signed_in() => wallet.get_account_id(),
        None => return Err(WalletError::NotSignedIn),
    };

    let keys = client.get_access_keys(&account_id).await?;
    let granted = wallet.all_keys();
    println!("Access keys of {} ({}):", account_id, keys.len());
    for key in keys {
        let mark = if granted.contains(&key.public_key) { "*" } else { " " };
        println!(" {} {} {}", mark, key.public_key, serde_json::to_string(key.permission())?);
    }
    Ok(())
}

pub async fn handle_resolve(
    wallet: Arc<WalletConnection>,
    client: Arc<RpcClient>,
    receiver_id: String,
    action: Action,
    local_key: Option<String>,
) -> Result<(), WalletError> {
    let local_key = local_key.map(|k| k.parse::<PublicKey>()).transpose()?;
    let account: ConnectedWalletAccount = wallet.account(client as Arc<dyn AccessKeySource>)?;

    let resolved = match &local_key {
        Some(key) => account.access_key_for_transaction(&receiver_id, &[action], Some(key)).await?,
        None => account.access_key_for_local_signer(&receiver_id, &[action]).await?,
    };

    match resolved {
        Some(key) => println!("{}", serde_json::to_string_pretty(&key)?),
        None => println!("No access key of {} allows this call; request a new permission", account.account_id()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SledStore;

    fn wallet(db: &Arc<SledStore>) -> WalletConnection {
        WalletConnection::new(None, Some("guest-book.testnet"), "testnet", db.clone(), Arc::new(db.key_store().unwrap()))
    }

    #[test]
    fn test_request_then_sign_in() {
        let db = Arc::new(SledStore::temporary().unwrap());
        let options = SignInOptions {
            contract_id: Some("guest-book.testnet".to_string()),
            ..Default::default()
        };
        handle_request_sign_in(&wallet(&db), options).unwrap();

        let wallet = wallet(&db);
        let err = handle_sign_in(&wallet, "alice.near".to_string(), vec!["ed25519:0OIl".to_string()]).unwrap_err();
        assert!(matches!(err, WalletError::InvalidKey(_)));
        assert!(!wallet.is_signed_in());

        let key = PublicKey::ed25519([1u8; 32]).to_string();
        handle_sign_in(&wallet, "alice.near".to_string(), vec![key]).unwrap();
        assert_eq!(wallet.get_account_id(), "alice.near");
    }
}
