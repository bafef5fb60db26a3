//! Authorization of transactions against access key permissions

use super::types::{AccessKey, Permission};
use crate::transaction::Action;

/// Method exposed by the multisig contract. A key scoped to it on the
/// account itself lets the wallet wrap any transaction in a multisig request.
pub const MULTISIG_HAS_METHOD: &str = "add_request_and_confirm";

/// Check if an access key allows the actions sent to `receiver_id`.
///
/// * Full access keys authorize everything.
/// * Function call keys on the account itself with the multisig method
///   authorize everything (the wallet relays through multisig).
/// * Function call keys on `receiver_id` authorize exactly one function
///   call with no attached deposit to an allowed method.
/// * Anything else is denied.
pub fn access_key_matches_transaction(
    access_key: &AccessKey,
    receiver_id: &str,
    actions: &[Action],
    self_account_id: &str,
) -> bool {
    match access_key.permission() {
        Permission::FullAccess => true,
        Permission::FunctionCall(allowed) => {
            if allowed.receiver_id == self_account_id && allowed.has_method(MULTISIG_HAS_METHOD) {
                return true;
            }
            if allowed.receiver_id != receiver_id {
                return false;
            }

            let [action] = actions else {
                return false;
            };
            match action.as_function_call() {
                // Scoped keys never move value, whatever their allowance
                Some(call) => call.deposit == 0 && allowed.allows_method(&call.method_name),
                None => false,
            }
        }
        Permission::Unsupported(_) => false,
    }
}
