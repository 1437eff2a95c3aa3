//! Minimal Solana JSON-RPC client over `fetch`

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use std::str::FromStr;

use crate::stores::mint::errors::{MintError, MintOutcome};

const COMMITMENT: &str = "confirmed";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    /// `[payload, encoding]`
    data: (String, String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

/// Recent blockhash with the height after which it can no longer land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub hash: Hash,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    /// Reached at least `confirmed` commitment
    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmation_status.as_deref(), Some("confirmed") | Some("finalized"))
    }
}

/// Decode a base58 blockhash
pub fn decode_blockhash(blockhash: &str) -> MintOutcome<Hash> {
    Hash::from_str(blockhash)
        .map_err(|e| MintError::Decode(format!("Invalid blockhash {}: {}", blockhash, e)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolanaRpc {
    url: String,
}

impl SolanaRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> MintOutcome<T> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = Request::post(&self.url).json(&body)?.send().await?;

        if !response.ok() {
            return Err(MintError::Network(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let envelope: RpcResponse<T> = response.json().await?;
        unwrap_response(method, envelope)
    }

    /// Raw account data, `None` when the account does not exist
    pub async fn get_account_data(&self, address: &Pubkey) -> MintOutcome<Option<Vec<u8>>> {
        let params = json!([address.to_string(), { "encoding": "base64", "commitment": COMMITMENT }]);
        let info: WithContext<Option<AccountInfo>> = self.call("getAccountInfo", params).await?;

        match info.value {
            Some(account) => Ok(Some(BASE64.decode(account.data.0)?)),
            None => Ok(None),
        }
    }

    pub async fn get_latest_blockhash(&self) -> MintOutcome<LatestBlockhash> {
        let params = json!([{ "commitment": COMMITMENT }]);
        let latest: WithContext<BlockhashValue> = self.call("getLatestBlockhash", params).await?;

        Ok(LatestBlockhash {
            hash: decode_blockhash(&latest.value.blockhash)?,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    pub async fn get_block_height(&self) -> MintOutcome<u64> {
        self.call("getBlockHeight", json!([{ "commitment": COMMITMENT }])).await
    }

    /// Submits a fully signed transaction, returning its signature
    pub async fn send_transaction(&self, wire: &[u8]) -> MintOutcome<String> {
        let params = json!([
            BASE64.encode(wire),
            { "encoding": "base64", "preflightCommitment": COMMITMENT }
        ]);
        self.call("sendTransaction", params).await
    }

    pub async fn get_signature_status(&self, signature: &str) -> MintOutcome<Option<SignatureStatus>> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([[signature]]))
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

fn unwrap_response<T>(method: &str, envelope: RpcResponse<T>) -> MintOutcome<T> {
    if let Some(error) = envelope.error {
        return Err(MintError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| MintError::Decode(format!("{} returned no result", method)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_rpc_error() {
        let envelope: RpcResponse<u64> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid param"}}"#,
        )
        .unwrap();
        assert_eq!(
            unwrap_response("getBlockHeight", envelope),
            Err(MintError::Rpc { code: -32602, message: "Invalid param".to_string() })
        );
    }

    #[test]
    fn test_missing_account_is_none() {
        let envelope: RpcResponse<WithContext<Option<AccountInfo>>> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":null}}"#,
        )
        .unwrap();
        let info = unwrap_response("getAccountInfo", envelope).unwrap();
        assert!(info.value.is_none());
    }

    #[test]
    fn test_account_data_shape() {
        let envelope: RpcResponse<WithContext<Option<AccountInfo>>> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":{
                "data":["AQID","base64"],"executable":false,"lamports":1,
                "owner":"11111111111111111111111111111111","rentEpoch":0}}}"#,
        )
        .unwrap();
        let info = unwrap_response("getAccountInfo", envelope).unwrap().value.unwrap();
        assert_eq!(BASE64.decode(info.data.0).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_signature_status() {
        let status: SignatureStatus = serde_json::from_str(
            r#"{"slot":5,"confirmations":null,"err":null,"confirmationStatus":"finalized"}"#,
        )
        .unwrap();
        assert!(status.is_confirmed());
        assert!(status.err.is_none());

        let processed = SignatureStatus { err: None, confirmation_status: Some("processed".to_string()) };
        assert!(!processed.is_confirmed());
    }

    #[test]
    fn test_decode_blockhash() {
        let hash = decode_blockhash("11111111111111111111111111111111").unwrap();
        assert_eq!(hash, Hash::default());
        assert!(decode_blockhash("abc").is_err());
    }
}
