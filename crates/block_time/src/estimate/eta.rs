use chrono::{DateTime, TimeDelta, Utc};

use crate::block::BlockRef;
use crate::error::EstimateError;
use crate::estimate::average::AverageSample;

/// Estimated production time of a target block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eta {
    pub seconds_per_block: f64,
    /// Negative when the target block is already behind the tip.
    pub blocks_left: i64,
    pub seconds_left: f64,
    pub estimated_time: DateTime<Utc>,
}

/// Height of the reference block `window` blocks behind `latest`.
pub fn reference_height(latest: u64, window: u64) -> Result<u64, EstimateError> {
    if window == 0 {
        return Err(EstimateError::EmptyWindow);
    }
    latest
        .checked_sub(window)
        .ok_or(EstimateError::InsufficientHistory { latest, window })
}

/// Extrapolates when `target_height` will be produced from the rate observed
/// between `reference` and `latest`. Sub-second remainders are dropped.
pub fn estimate_block_eta(
    latest: &BlockRef,
    reference: &BlockRef,
    target_height: u64,
) -> Result<Eta, EstimateError> {
    let sample = AverageSample::new(*reference, *latest)?;
    let seconds_per_block = sample.seconds_per_block();

    let blocks_left = i64::try_from(i128::from(target_height) - i128::from(latest.height))
        .map_err(|_| EstimateError::TimeOutOfRange)?;
    let seconds_left = seconds_per_block * blocks_left as f64;

    let estimated_time = TimeDelta::try_seconds(seconds_left.trunc() as i64)
        .and_then(|d| latest.time.checked_add_signed(d))
        .ok_or(EstimateError::TimeOutOfRange)?;

    Ok(Eta {
        seconds_per_block,
        blocks_left,
        seconds_left,
        estimated_time,
    })
}
