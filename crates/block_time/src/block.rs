use chrono::{DateTime, Utc};

use crate::error::ParseError;

/// A block height together with the time the block was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl BlockRef {
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        BlockRef { height, time }
    }

    /// Builds a block reference from a unix timestamp in seconds, as reported by EVM nodes.
    pub fn from_unix(height: u64, unix_secs: u64) -> Result<Self, ParseError> {
        let time = i64::try_from(unix_secs)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(ParseError::TimestampOutOfRange(unix_secs))?;
        Ok(BlockRef { height, time })
    }
}

/// The latest block known to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    pub block: BlockRef,
    /// Lowest height the endpoint still serves, when it reports one.
    pub earliest: Option<u64>,
}

impl ChainTip {
    pub fn new(block: BlockRef) -> Self {
        ChainTip {
            block,
            earliest: None,
        }
    }

    pub fn with_earliest(block: BlockRef, earliest: u64) -> Self {
        ChainTip {
            block,
            earliest: Some(earliest),
        }
    }
}

/// Parses a decimal height string, as Tendermint encodes heights.
pub fn parse_height(input: &str) -> Result<u64, ParseError> {
    input.parse().map_err(|source| ParseError::Height {
        input: input.to_string(),
        source,
    })
}

/// Parses an RFC3339 timestamp, with or without fractional seconds, into UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ParseError::Timestamp {
            input: input.to_string(),
            source,
        })
}
