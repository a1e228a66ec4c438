use std::time::Duration;

use block_time::{BlockRef, ChainTip, parse_height, parse_timestamp};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BlockSource, ClientError, endpoint_url, http_client, parse_endpoint};

/// Issues a single GET and decodes the JSON body into `T`. No retries.
pub async fn fetch_json<T>(client: &Client, url: Url) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    debug!(%url, "GET");
    let res = client
        .get(url.clone())
        .send()
        .await
        .map_err(ClientError::Transport)?;

    let status = res.status();
    if !status.is_success() {
        return Err(ClientError::HttpStatus { status, url });
    }

    let bytes = res.bytes().await.map_err(ClientError::Transport)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct StatusResult {
    sync_info: SyncInfo,
}

#[derive(Deserialize)]
struct SyncInfo {
    latest_block_height: String,
    latest_block_time: String,
    #[serde(default)]
    earliest_block_height: Option<String>,
}

/// `/block` responses carry the header under `block` on current nodes and
/// under `block_meta` on older ones.
#[derive(Deserialize)]
struct BlockResult {
    block: Option<HeaderHolder>,
    block_meta: Option<HeaderHolder>,
}

#[derive(Deserialize)]
struct HeaderHolder {
    header: Header,
}

#[derive(Deserialize)]
struct Header {
    #[serde(default)]
    height: String,
    #[serde(default)]
    time: String,
}

#[derive(Deserialize)]
struct LatestSpan {
    height: String,
}

/// Client for a Tendermint RPC-compatible REST API (`/status`, `/block`).
pub struct TendermintClient {
    client: Client,
    base: Url,
}

impl TendermintClient {
    /// Creates a client for the REST API rooted at `base`, e.g.
    /// `https://tendermint-api.polygon.technology`.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(TendermintClient {
            client: http_client(timeout)?,
            base: parse_endpoint(base)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Latest block and earliest retained height from `/status`.
    pub async fn status(&self) -> Result<ChainTip, ClientError> {
        let url = endpoint_url(&self.base, "status")?;
        let status: Envelope<StatusResult> = fetch_json(&self.client, url).await?;
        let info = status.result.sync_info;

        let block = BlockRef::new(
            parse_height(&info.latest_block_height)?,
            parse_timestamp(&info.latest_block_time)?,
        );
        Ok(match info.earliest_block_height.as_deref() {
            Some(earliest) if !earliest.is_empty() => {
                ChainTip::with_earliest(block, parse_height(earliest)?)
            }
            _ => ChainTip::new(block),
        })
    }

    /// Header height and time of the block at `height`, from `/block?height=`.
    pub async fn block(&self, height: u64) -> Result<BlockRef, ClientError> {
        let url = endpoint_url(&self.base, &format!("block?height={height}"))?;
        let resp: Envelope<BlockResult> = fetch_json(&self.client, url).await?;

        let header = resp
            .result
            .block
            .or(resp.result.block_meta)
            .map(|h| h.header)
            .ok_or_else(|| ClientError::Decode(format!("no block header for height {height}")))?;
        if header.time.is_empty() {
            return Err(ClientError::Decode(format!(
                "empty block time for height {height}"
            )));
        }

        let reported = if header.height.is_empty() {
            height
        } else {
            parse_height(&header.height)?
        };
        Ok(BlockRef::new(reported, parse_timestamp(&header.time)?))
    }

    /// Height of the latest span reported by a Heimdall API at `api` (`/bor/latest-span`).
    pub async fn latest_span_height(&self, api: &Url) -> Result<u64, ClientError> {
        let url = endpoint_url(api, "bor/latest-span")?;
        let span: LatestSpan = fetch_json(&self.client, url).await?;
        Ok(parse_height(&span.height)?)
    }
}

impl BlockSource for TendermintClient {
    async fn latest(&self) -> Result<ChainTip, ClientError> {
        self.status().await
    }

    async fn block_at(&self, height: u64) -> Result<BlockRef, ClientError> {
        self.block(height).await
    }
}

/// Takes the tip height from a Heimdall latest-span endpoint and every block
/// time from the Tendermint REST API.
pub struct SpanAnchoredSource<'a> {
    blocks: &'a TendermintClient,
    span_api: Url,
}

impl<'a> SpanAnchoredSource<'a> {
    pub fn new(blocks: &'a TendermintClient, span_api: &str) -> Result<Self, ClientError> {
        Ok(SpanAnchoredSource {
            blocks,
            span_api: parse_endpoint(span_api)?,
        })
    }
}

impl BlockSource for SpanAnchoredSource<'_> {
    async fn latest(&self) -> Result<ChainTip, ClientError> {
        let height = self.blocks.latest_span_height(&self.span_api).await?;
        debug!(height, "latest span height");
        Ok(ChainTip::new(self.blocks.block(height).await?))
    }

    async fn block_at(&self, height: u64) -> Result<BlockRef, ClientError> {
        self.blocks.block(height).await
    }
}
