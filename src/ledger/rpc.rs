//! JSON-RPC Client
//!
//! HTTP client for the ledger node's JSON-RPC 2.0 interface.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::abi;
use super::error::{DecodeError, LedgerError, LedgerResult};
use super::types::{Address, TxHash};

/// JSON-RPC client for a single ledger endpoint
pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for the given endpoint with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Send a request and return the raw `result` value
    pub async fn request(&self, method: &str, params: Value) -> LedgerResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::trace!(rpc_id = id, method = %method, "Sending JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(LedgerError::transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerError::UpstreamUnavailable(format!(
                "endpoint returned HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let reply: RpcResponse = response.json().await.map_err(LedgerError::transport)?;

        if let Some(error) = reply.error {
            tracing::debug!(rpc_id = id, method = %method, code = error.code, "JSON-RPC error");
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        reply.result.ok_or_else(|| {
            LedgerError::UpstreamUnavailable(format!("{method} response has no result"))
        })
    }

    /// Execute a read-only contract call against the latest block
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> LedgerResult<Vec<u8>> {
        let params = json!([
            { "to": to, "data": abi::encode_hex(data) },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        Ok(abi::decode_hex(as_str(&result, "eth_call")?)?)
    }

    /// Hand a transaction to the endpoint's signer for broadcast
    pub async fn send_transaction(
        &self,
        from: &Address,
        to: &Address,
        data: &[u8],
    ) -> LedgerResult<TxHash> {
        let params = json!([{
            "from": from,
            "to": to,
            "data": abi::encode_hex(data),
        }]);
        let result = self.request("eth_sendTransaction", params).await?;
        as_str(&result, "eth_sendTransaction")?.parse()
    }

    /// Latest block number
    pub async fn block_number(&self) -> LedgerResult<u64> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        Ok(parse_quantity(as_str(&result, "eth_blockNumber")?)?)
    }

    /// Chain id served by the endpoint
    pub async fn chain_id(&self) -> LedgerResult<u64> {
        let result = self.request("eth_chainId", json!([])).await?;
        Ok(parse_quantity(as_str(&result, "eth_chainId")?)?)
    }
}

fn as_str<'a>(value: &'a Value, method: &str) -> Result<&'a str, DecodeError> {
    value
        .as_str()
        .ok_or_else(|| DecodeError::InvalidHex(format!("{method} result is not a string: {value}")))
}

/// Parse a hex quantity such as `0x1b4`
pub fn parse_quantity(s: &str) -> Result<u64, DecodeError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| DecodeError::InvalidHex(format!("{s:?} is missing the 0x prefix")))?;
    u64::from_str_radix(digits, 16).map_err(|e| DecodeError::InvalidHex(format!("{s:?}: {e}")))
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x1b4").unwrap(), 436);
        assert_eq!(parse_quantity("0xaa36a7").unwrap(), 11_155_111);
        assert!(parse_quantity("1b4").is_err());
        assert!(parse_quantity("0xnope").is_err());
    }

    #[test]
    fn test_request_serialization() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_chainId",
            params: json!([]),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": 7, "method": "eth_chainId", "params": []})
        );
    }

    #[test]
    fn test_response_with_error_object() {
        let reply: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        assert!(reply.result.is_none());
        let error = reply.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "execution reverted");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upstream_unavailable() {
        let client = JsonRpcClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client.block_number().await.unwrap_err();
        assert!(matches!(err, LedgerError::UpstreamUnavailable(_)));
    }
}
