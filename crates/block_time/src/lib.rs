//! Block-time primitives for Tendermint- and EVM-style chains.
//!
//! This crate exposes:
//! - Hex quantities (`quantity`): `hex_to_u64`, `u64_to_hex`
//! - Block samples: `BlockRef`, `ChainTip`, `parse_height`, `parse_timestamp`
//! - Lookback resolution: `LookbackTarget`
//! - Estimates: `estimate::{average, predict, eta}`
//! - Output helpers: `format::{format_dhms, with_commas}`
//!
//! Nothing here performs I/O; callers fetch blocks and feed them in.
pub mod block;
pub mod error;
pub mod estimate;
pub mod format;
pub mod lookback;
pub mod quantity;

pub use block::{BlockRef, ChainTip, parse_height, parse_timestamp};
pub use error::{EstimateError, ParseError};
pub use estimate::average::{AverageSample, average_block_time};
pub use estimate::eta::{Eta, estimate_block_eta, reference_height};
pub use estimate::predict::{HeightPrediction, Prediction, Rounding, predict_height};
pub use lookback::LookbackTarget;
pub use quantity::{hex_to_u64, u64_to_hex};
