//! Linear block-time arithmetic: averages over a window and extrapolation from the tip.
//!
//! Every estimate assumes a constant block production rate between samples.
pub mod average;
pub mod eta;
pub mod predict;

use chrono::TimeDelta;

/// Whole and fractional seconds of `delta`, negative when `delta` is.
pub fn seconds_f64(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}
