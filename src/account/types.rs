//! Access key definitions as reported by the chain

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

/// Account identifier - human-readable name such as `alice.near`
pub type AccountId = String;

/// Permission scope of an access key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Permission {
    /// Unrestricted signing authority
    FullAccess,

    /// Restricted to calling methods on one receiver, without value transfer
    FunctionCall(FunctionCallPermission),

    /// Any permission kind this crate does not understand. Never authorizes.
    #[serde(untagged)]
    Unsupported(serde_json::Value),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallPermission {
    /// Remaining gas budget; reported only, never enforced here
    #[serde(default, with = "crate::encoding::option_dec_format")]
    pub allowance: Option<u128>,
    pub receiver_id: AccountId,
    /// Empty means any method
    #[serde(default)]
    pub method_names: Vec<String>,
}

impl FunctionCallPermission {
    pub fn allows_method(&self, method_name: &str) -> bool {
        self.method_names.is_empty() || self.has_method(method_name)
    }

    pub fn has_method(&self, method_name: &str) -> bool {
        self.method_names.iter().any(|m| m == method_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccessKeyPermission {
    #[serde(default)]
    pub nonce: u64,
    pub permission: Permission,
}

/// One entry of an account's on-chain key list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccessKey {
    pub public_key: PublicKey,
    pub access_key: AccessKeyPermission,
}

impl AccessKey {
    pub fn new(public_key: PublicKey, permission: Permission) -> Self {
        Self {
            public_key,
            access_key: AccessKeyPermission { nonce: 0, permission },
        }
    }

    pub fn full_access(public_key: PublicKey) -> Self {
        Self::new(public_key, Permission::FullAccess)
    }

    pub fn function_call(public_key: PublicKey, receiver_id: &str, method_names: &[&str]) -> Self {
        Self::new(
            public_key,
            Permission::FunctionCall(FunctionCallPermission {
                allowance: None,
                receiver_id: receiver_id.to_string(),
                method_names: method_names.iter().map(|m| m.to_string()).collect(),
            }),
        )
    }

    pub fn permission(&self) -> &Permission {
        &self.access_key.permission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PK: &str = "ed25519:4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";

    #[test]
    fn test_full_access_wire_form() {
        let json = format!(
            r#"{{"public_key":"{}","access_key":{{"nonce":3,"permission":"FullAccess"}}}}"#,
            PK
        );
        let key: AccessKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key.permission(), &Permission::FullAccess);
        assert_eq!(key.access_key.nonce, 3);
        assert_eq!(key.public_key.to_string(), PK);
    }

    #[test]
    fn test_function_call_wire_form() {
        let json = r#"{"FunctionCall":{"allowance":"250000000000000000000000","receiver_id":"bob.near","method_names":["vote"]}}"#;
        let permission: Permission = serde_json::from_str(json).unwrap();
        match permission {
            Permission::FunctionCall(fc) => {
                assert_eq!(fc.receiver_id, "bob.near");
                assert_eq!(fc.allowance, Some(250_000_000_000_000_000_000_000));
                assert!(fc.allows_method("vote"));
                assert!(!fc.allows_method("transfer"));
            }
            other => panic!("unexpected permission {:?}", other),
        }
    }

    #[test]
    fn test_unknown_permission_is_unsupported() {
        let permission: Permission =
            serde_json::from_str(r#"{"Delegated":{"receiver_id":"bob.near"}}"#).unwrap();
        assert!(matches!(permission, Permission::Unsupported(_)));

        // Missing receiver id does not parse as a function call permission
        let permission: Permission =
            serde_json::from_str(r#"{"FunctionCall":{"method_names":[]}}"#).unwrap();
        assert!(matches!(permission, Permission::Unsupported(_)));
    }

    #[test]
    fn test_empty_method_list_allows_any_method() {
        let fc = FunctionCallPermission {
            allowance: None,
            receiver_id: "bob.near".to_string(),
            method_names: vec![],
        };
        assert!(fc.allows_method("anything"));
        assert!(!fc.has_method("anything"));
    }
}
