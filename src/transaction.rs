//! Actions and unsigned transactions as the wallet sees them.
//!
//! Only function calls take part in access-key matching; every other action
//! kind is carried along opaquely.

use serde::{Deserialize, Serialize};

use crate::account::types::AccountId;
use crate::crypto::PublicKey;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallAction {
    pub method_name: String,
    /// Base64 encoded call arguments
    #[serde(default)]
    pub args: String,
    #[serde(default)]
    pub gas: u64,
    #[serde(default, with = "crate::encoding::dec_format")]
    pub deposit: u128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Action {
    CreateAccount,
    DeployContract {
        code: String,
    },
    FunctionCall(FunctionCallAction),
    Transfer {
        #[serde(with = "crate::encoding::dec_format")]
        deposit: u128,
    },
    Stake {
        #[serde(with = "crate::encoding::dec_format")]
        stake: u128,
        public_key: PublicKey,
    },
    AddKey {
        public_key: PublicKey,
        access_key: serde_json::Value,
    },
    DeleteKey {
        public_key: PublicKey,
    },
    DeleteAccount {
        beneficiary_id: AccountId,
    },
    /// Any action kind this crate does not model
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl Action {
    pub fn function_call(method_name: &str, args: &str, gas: u64, deposit: u128) -> Self {
        Action::FunctionCall(FunctionCallAction {
            method_name: method_name.to_string(),
            args: args.to_string(),
            gas,
            deposit,
        })
    }

    pub fn transfer(deposit: u128) -> Self {
        Action::Transfer { deposit }
    }

    pub fn as_function_call(&self) -> Option<&FunctionCallAction> {
        match self {
            Action::FunctionCall(call) => Some(call),
            _ => None,
        }
    }
}

/// Transaction handed to the wallet for signing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub signer_id: AccountId,
    pub receiver_id: AccountId,
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_call_wire_form() {
        let json = r#"{"FunctionCall":{"method_name":"vote","args":"e30=","gas":30000000000000,"deposit":"1"}}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        let call = action.as_function_call().unwrap();
        assert_eq!(call.method_name, "vote");
        assert_eq!(call.deposit, 1);
    }

    #[test]
    fn test_deposit_defaults_to_zero() {
        let action: Action =
            serde_json::from_str(r#"{"FunctionCall":{"method_name":"vote"}}"#).unwrap();
        assert_eq!(action.as_function_call().unwrap().deposit, 0);
    }

    #[test]
    fn test_unknown_action_is_opaque() {
        let action: Action =
            serde_json::from_str(r#"{"Delegate":{"sender_id":"alice.near"}}"#).unwrap();
        assert!(matches!(action, Action::Other(_)));
        assert!(action.as_function_call().is_none());

        let unit: Action = serde_json::from_str(r#""CreateAccount""#).unwrap();
        assert_eq!(unit, Action::CreateAccount);
    }

    #[test]
    fn test_transaction_ignores_signing_fields() {
        // Nonce and key are chosen by the wallet when it signs
        let json = r#"{"signer_id":"alice.near","public_key":"ed25519:4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi","receiver_id":"bob.near","nonce":5,"actions":["CreateAccount"]}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.receiver_id, "bob.near");
        assert_eq!(tx.actions, vec![Action::CreateAccount]);

        let out = serde_json::to_value(&tx).unwrap();
        assert!(out.get("nonce").is_none());
    }
}
