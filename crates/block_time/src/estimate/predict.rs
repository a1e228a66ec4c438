use chrono::{DateTime, TimeDelta, Utc};

use crate::block::BlockRef;
use crate::error::EstimateError;
use crate::estimate::seconds_f64;

/// How a fractional block count is turned into whole blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Never overshoot the target time.
    #[default]
    Floor,
    /// Closest whole block, halves away from zero.
    Nearest,
}

impl Rounding {
    fn apply(self, blocks: f64) -> f64 {
        match self {
            Rounding::Floor => blocks.floor(),
            Rounding::Nearest => blocks.round(),
        }
    }
}

/// A height extrapolated from the chain tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightPrediction {
    /// Time between the tip block and the target.
    pub delta: TimeDelta,
    /// Unrounded number of blocks expected in `delta`.
    pub exact_blocks: f64,
    pub blocks_to_add: u64,
    pub predicted_height: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// The target lies before the tip block; nothing to extrapolate.
    InThePast { delta: TimeDelta },
    Height(HeightPrediction),
}

/// Predicts the height the chain will reach at `target`, assuming one block
/// every `avg_block_secs` seconds from `latest` onwards.
pub fn predict_height(
    latest: &BlockRef,
    target: DateTime<Utc>,
    avg_block_secs: f64,
    rounding: Rounding,
) -> Result<Prediction, EstimateError> {
    if !avg_block_secs.is_finite() || avg_block_secs <= 0.0 {
        return Err(EstimateError::InvalidAverage(avg_block_secs));
    }

    let delta = target - latest.time;
    if delta < TimeDelta::zero() {
        return Ok(Prediction::InThePast { delta });
    }

    let exact_blocks = seconds_f64(delta) / avg_block_secs;
    // Float to int casts saturate.
    let blocks_to_add = rounding.apply(exact_blocks) as u64;

    Ok(Prediction::Height(HeightPrediction {
        delta,
        exact_blocks,
        blocks_to_add,
        predicted_height: latest.height.saturating_add(blocks_to_add),
    }))
}
