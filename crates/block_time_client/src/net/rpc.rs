use std::time::Duration;

use block_time::{BlockRef, ChainTip, hex_to_u64, u64_to_hex};
use reqwest::{Client, Url, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::retry::{RetryPolicy, retry_with_backoff};
use super::{BlockSource, ClientError, http_client, parse_endpoint};

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a [Value],
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// The two fields of `eth_getBlockByNumber` we care about, both hex quantities.
#[derive(Deserialize)]
struct EvmBlock {
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    timestamp: String,
}

/// JSON-RPC 2.0 client for an EVM-compatible node over HTTP(S).
///
/// Every call is retried under the client's `RetryPolicy`: transport errors,
/// non-2xx statuses, undecodable bodies, JSON-RPC `error` objects and
/// missing results all count as a failed attempt.
pub struct RpcClient {
    client: Client,
    url: Url,
    retry: RetryPolicy,
}

impl RpcClient {
    /// Creates a new client for the given JSON-RPC endpoint, e.g. `https://polygon-rpc.com`.
    pub fn new(url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, ClientError> {
        Ok(RpcClient {
            client: http_client(timeout)?,
            url: parse_endpoint(url)?,
            retry,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call_once<T>(&self, method: &str, params: &[Value]) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let request_body = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let res = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status,
                url: self.url.clone(),
            });
        }

        let bytes = res.bytes().await.map_err(ClientError::Transport)?;
        let rpc_response: JsonRpcResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(err) = rpc_response.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| ClientError::Decode(format!("missing result in {method} response")))
    }

    /// Calls `method` with `params`, retrying failed attempts with linear backoff.
    pub async fn call<T>(&self, method: &str, params: &[Value]) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        retry_with_backoff(&self.retry, |attempt| {
            debug!(method, attempt = attempt + 1, "JSON-RPC call");
            self.call_once(method, params)
        })
        .await
        .map_err(|exhausted| ClientError::RpcExhausted {
            method: method.to_string(),
            attempts: exhausted.attempts,
            source: Box::new(exhausted.last),
        })
    }

    /// Returns the latest block number (`eth_blockNumber`).
    pub async fn block_number(&self) -> Result<u64, ClientError> {
        let hex: String = self.call("eth_blockNumber", &[]).await?;
        Ok(hex_to_u64(&hex)?)
    }

    /// Returns the height and timestamp of block `height` (`eth_getBlockByNumber`).
    pub async fn block_by_number(&self, height: u64) -> Result<BlockRef, ClientError> {
        let block: EvmBlock = self
            .call("eth_getBlockByNumber", &[json!(u64_to_hex(height)), json!(false)])
            .await?;
        if block.timestamp.is_empty() {
            return Err(ClientError::Decode(format!(
                "empty block timestamp for height {height}"
            )));
        }

        let number = match block.number.as_deref() {
            Some(n) if !n.is_empty() => hex_to_u64(n)?,
            _ => height,
        };
        Ok(BlockRef::from_unix(number, hex_to_u64(&block.timestamp)?)?)
    }
}

impl BlockSource for RpcClient {
    /// Latest block number, then that block's timestamp.
    async fn latest(&self) -> Result<ChainTip, ClientError> {
        let height = self.block_number().await?;
        Ok(ChainTip::new(self.block_by_number(height).await?))
    }

    async fn block_at(&self, height: u64) -> Result<BlockRef, ClientError> {
        self.block_by_number(height).await
    }
}
