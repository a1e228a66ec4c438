use thiserror::Error;

/// Errors raised while decoding numeric, hex, or time strings reported by a node.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty hex string")]
    EmptyHex,
    #[error("invalid hex {input:?}")]
    InvalidHex { input: String },
    #[error("hex {input:?} out of u64 range")]
    HexOverflow { input: String },
    #[error("invalid height {input:?}: {source}")]
    Height {
        input: String,
        source: std::num::ParseIntError,
    },
    #[error("invalid timestamp {input:?}: {source}")]
    Timestamp {
        input: String,
        source: chrono::ParseError,
    },
    /// Unix timestamp that does not fit a `DateTime<Utc>`.
    #[error("unix timestamp {0} out of range")]
    TimestampOutOfRange(u64),
}

/// Errors raised by the block-time arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    #[error("average block time must be a positive number of seconds, got {0}")]
    InvalidAverage(f64),
    /// The reference block would sit below height zero.
    #[error("latest height {latest} is too low for a {window}-block window")]
    InsufficientHistory { latest: u64, window: u64 },
    #[error("averaging window must span at least one block")]
    EmptyWindow,
    #[error("estimated time is outside the representable range")]
    TimeOutOfRange,
}
