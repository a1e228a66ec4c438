use chrono::TimeDelta;

use crate::block::BlockRef;
use crate::error::EstimateError;
use crate::estimate::seconds_f64;

/// Two blocks sampled from the same chain, `from` strictly older than `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageSample {
    pub from: BlockRef,
    pub to: BlockRef,
}

impl AverageSample {
    pub fn new(from: BlockRef, to: BlockRef) -> Result<Self, EstimateError> {
        if to.height <= from.height {
            return Err(EstimateError::EmptyWindow);
        }
        Ok(AverageSample { from, to })
    }

    /// Number of blocks produced between the two samples.
    pub fn blocks(&self) -> u64 {
        self.to.height - self.from.height
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.to.time - self.from.time
    }

    pub fn seconds_per_block(&self) -> f64 {
        seconds_f64(self.elapsed()) / self.blocks() as f64
    }
}

/// Average seconds per block between `from` and `to`.
pub fn average_block_time(from: &BlockRef, to: &BlockRef) -> Result<f64, EstimateError> {
    AverageSample::new(*from, *to).map(|s| s.seconds_per_block())
}
