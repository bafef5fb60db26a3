// RPC client for the chain's JSON-RPC endpoint
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::account::types::AccessKey;
use crate::error::WalletError;

/// Source of an account's current access key list
#[async_trait]
pub trait AccessKeySource: Send + Sync {
    async fn get_access_keys(&self, account_id: &str) -> Result<Vec<AccessKey>, WalletError>;
}

#[derive(Deserialize, Debug)]
struct AccessKeyList {
    keys: Vec<AccessKey>,
}

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // Helper for sending requests
    async fn send_request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, WalletError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let response = self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("RPC request failed: {}", e)))?;

        let json: serde_json::Value = response.json().await
            .map_err(|e| WalletError::Transport(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = json.get("error") {
            return Err(WalletError::Transport(rpc_error_message(error)));
        }

        Ok(json["result"].clone())
    }

    /// `view_access_key_list` at final finality
    pub async fn view_access_key_list(&self, account_id: &str) -> Result<Vec<AccessKey>, WalletError> {
        let result = self.send_request("query", json!({
            "request_type": "view_access_key_list",
            "finality": "final",
            "account_id": account_id,
        })).await?;

        // Query errors may also come back inside a successful envelope
        if let Some(error) = result.get("error").and_then(|e| e.as_str()) {
            return Err(WalletError::Transport(error.to_string()));
        }

        let list: AccessKeyList = serde_json::from_value(result)
            .map_err(|e| WalletError::Transport(format!("Malformed access key list: {}", e)))?;
        debug!("Fetched {} access keys for {}", list.keys.len(), account_id);
        Ok(list.keys)
    }
}

#[async_trait]
impl AccessKeySource for RpcClient {
    async fn get_access_keys(&self, account_id: &str) -> Result<Vec<AccessKey>, WalletError> {
        self.view_access_key_list(account_id).await
    }
}

fn rpc_error_message(error: &serde_json::Value) -> String {
    // Prefer the detailed cause when the node supplies one
    error["data"]
        .as_str()
        .or_else(|| error["cause"]["name"].as_str())
        .or_else(|| error["message"].as_str())
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::types::Permission;
    use crate::crypto::PublicKey;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const SECP: &str = "secp256k1:5ftgm7wYK5gtVqq1kxMGy7gSudkrfYCbpsjL6sH1nwx2oj5NR2JktohjzB6fbEhhRERQpiwJcpwnQjxtoX3GS3cQ";

    /// Serve one HTTP request with `body` and hand back the request text
    async fn serve_once(body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (url, handle)
    }

    fn envelope(result: serde_json::Value) -> String {
        json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string()
    }

    #[tokio::test]
    async fn test_view_access_key_list_from_node() {
        let body = envelope(json!({
            "block_height": 17798231,
            "keys": [
                {"public_key": SECP, "access_key": {"nonce": 2, "permission": "FullAccess"}},
                {
                    "public_key": "ed25519:4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi",
                    "access_key": {"nonce": 7, "permission": "FullAccess"}
                }
            ]
        }));
        let (url, server) = serve_once(body).await;

        let keys = RpcClient::new(url).get_access_keys("alice.near").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].public_key, SECP.parse::<PublicKey>().unwrap());
        assert_eq!(keys[1].public_key, PublicKey::ed25519([1u8; 32]));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST "));
        assert!(request.contains(r#""request_type":"view_access_key_list""#));
        assert!(request.contains(r#""account_id":"alice.near""#));
        assert!(request.contains(r#""finality":"final""#));
    }

    #[tokio::test]
    async fn test_node_error_envelope() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "Server error", "data": "account alice.near does not exist"}
        })
        .to_string();
        let (url, _server) = serve_once(body).await;

        let err = RpcClient::new(url).get_access_keys("alice.near").await.unwrap_err();
        match err {
            WalletError::Transport(msg) => assert_eq!(msg, "account alice.near does not exist"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_error_inside_result() {
        let body = envelope(json!({"error": "UNKNOWN_ACCOUNT", "block_height": 1}));
        let (url, _server) = serve_once(body).await;

        let err = RpcClient::new(url).get_access_keys("alice.near").await.unwrap_err();
        match err {
            WalletError::Transport(msg) => assert_eq!(msg, "UNKNOWN_ACCOUNT"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_responses_are_transport_errors() {
        let bodies = [
            "not json".to_string(),
            envelope(json!({"keys": [{"public_key": "ed25519:0OIl", "access_key": {"nonce": 1, "permission": "FullAccess"}}]})),
            envelope(json!({"block_height": 1})),
        ];
        for body in bodies {
            let (url, _server) = serve_once(body.clone()).await;
            let err = RpcClient::new(url).get_access_keys("alice.near").await.unwrap_err();
            assert!(matches!(err, WalletError::Transport(_)), "body {}", body);
        }
    }

    #[test]
    fn test_parse_access_key_list() {
        let result = json!({
            "block_hash": "9MyXw4g3o3XgBzqW5mS4Y8VL6C43QZp4Y5tNLS2XWmtQ",
            "block_height": 17798231,
            "keys": [
                {
                    "public_key": "ed25519:4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi",
                    "access_key": {"nonce": 7, "permission": "FullAccess"}
                },
                {
                    "public_key": "ed25519:8qbHbw2BbbTHBW1sbeqakYXVKRQM8Ne7pLK7m6CVfeR",
                    "access_key": {
                        "nonce": 1,
                        "permission": {"FunctionCall": {
                            "allowance": "250000000000000000000000",
                            "receiver_id": "bob.near",
                            "method_names": []
                        }}
                    }
                }
            ]
        });

        let list: AccessKeyList = serde_json::from_value(result).unwrap();
        assert_eq!(list.keys.len(), 2);
        assert_eq!(list.keys[0].permission(), &Permission::FullAccess);
        assert!(matches!(list.keys[1].permission(), Permission::FunctionCall(_)));
    }

    #[test]
    fn test_rpc_error_message() {
        let err = json!({"code": -32000, "message": "Server error", "data": "account bob.near does not exist"});
        assert_eq!(rpc_error_message(&err), "account bob.near does not exist");

        let err = json!({"message": "Server error"});
        assert_eq!(rpc_error_message(&err), "Server error");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let client = RpcClient::new("http://127.0.0.1:1".to_string());
        let err = client.get_access_keys("alice.near").await.unwrap_err();
        assert!(matches!(err, WalletError::Transport(_)));
    }
}
