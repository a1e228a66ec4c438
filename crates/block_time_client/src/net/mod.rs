//! Network access: a Tendermint REST client, an EVM JSON-RPC client, and the
//! `BlockSource` seam the reports are written against.
pub mod rest;
pub mod retry;
pub mod rpc;

use std::time::Duration;

use block_time::{BlockRef, ChainTip, ParseError};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

/// Errors that can occur when talking to a REST or JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("only http:// and https:// URLs are supported")]
    NonHttpUrl,
    /// Connection, timeout, or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { status: StatusCode, url: Url },
    /// The body was not JSON, or not the JSON we expected.
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc {method} failed after {attempts} attempts: {source}")]
    RpcExhausted {
        method: String,
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// Anything that can report the chain tip and look up blocks by height.
#[allow(async_fn_in_trait)]
pub trait BlockSource {
    async fn latest(&self) -> Result<ChainTip, ClientError>;
    async fn block_at(&self, height: u64) -> Result<BlockRef, ClientError>;
}

/// Parses an endpoint URL, accepting only `http` and `https`.
pub fn parse_endpoint(url: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ClientError::NonHttpUrl),
    }
}

/// Appends `path` (which may carry a query) to `base`, keeping any path prefix `base` has.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, ClientError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
    parse_endpoint(&joined)
}

/// Builds the HTTP client shared by every request of one endpoint.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ClientError::Transport)
}
