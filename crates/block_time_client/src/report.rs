//! The end-to-end flows: fetch blocks from a `BlockSource`, run the block-time
//! arithmetic, and render a human-readable report.
use core::fmt;

use block_time::format::{format_dhms, with_commas, with_commas_signed};
use block_time::{
    AverageSample, BlockRef, ChainTip, EstimateError, Eta, LookbackTarget, Prediction, Rounding,
    estimate_block_eta, predict_height, reference_height,
};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use thiserror::Error;
use tracing::{info, warn};

use crate::net::{BlockSource, ClientError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// What became of one lookback target.
#[derive(Debug)]
pub enum LookbackOutcome {
    Sample {
        target: LookbackTarget,
        sample: AverageSample,
    },
    /// The target did not resolve to a height the endpoint can serve.
    Skipped {
        target: LookbackTarget,
        reason: String,
    },
    /// The target resolved but its block could not be fetched.
    Failed {
        target: LookbackTarget,
        height: u64,
        error: ClientError,
    },
}

#[derive(Debug)]
pub struct AverageReport {
    pub tip: ChainTip,
    pub outcomes: Vec<LookbackOutcome>,
}

impl AverageReport {
    pub fn samples(&self) -> impl Iterator<Item = &AverageSample> {
        self.outcomes.iter().filter_map(|o| match o {
            LookbackOutcome::Sample { sample, .. } => Some(sample),
            _ => None,
        })
    }
}

/// Measures the average block time between the tip and each lookback target.
///
/// Only a failure to fetch the tip is fatal. Targets that do not resolve are
/// skipped and targets whose block cannot be fetched are reported as failed;
/// a target resolving to the tip itself is dropped.
pub async fn average_block_times<S: BlockSource>(
    source: &S,
    targets: &[LookbackTarget],
) -> Result<AverageReport, ClientError> {
    let tip = source.latest().await?;
    let latest = tip.block;
    info!(height = latest.height, earliest = ?tip.earliest, "fetched chain tip");

    let mut outcomes = Vec::with_capacity(targets.len());
    for &target in targets {
        let Some(height) = target.resolve(latest.height, tip.earliest) else {
            outcomes.push(LookbackOutcome::Skipped {
                target,
                reason: skip_reason(target, &tip),
            });
            continue;
        };
        if height == latest.height {
            continue;
        }

        let sampled = source.block_at(height).await.and_then(|from| {
            AverageSample::new(from, latest)
                .map_err(|e| ClientError::Decode(format!("block {height}: {e}")))
        });
        outcomes.push(match sampled {
            Ok(sample) => LookbackOutcome::Sample { target, sample },
            Err(error) => {
                warn!(height, "skipping lookback {target}: {error}");
                LookbackOutcome::Failed {
                    target,
                    height,
                    error,
                }
            }
        });
    }

    Ok(AverageReport { tip, outcomes })
}

fn skip_reason(target: LookbackTarget, tip: &ChainTip) -> String {
    let latest = tip.block.height;
    match (target.resolve(latest, None), tip.earliest) {
        (Some(height), Some(earliest)) => {
            format!("target height {height} < earliest available {earliest}")
        }
        _ => match target {
            LookbackTarget::Relative(delta) if delta < 0 => {
                format!("target reaches below genesis from height {latest}")
            }
            _ => format!("target is beyond the latest height {latest}"),
        },
    }
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for AverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let latest = self.tip.block;
        write!(
            f,
            "Current block: {} at {}",
            with_commas(latest.height),
            iso(latest.time)
        )?;
        if let Some(earliest) = self.tip.earliest {
            write!(f, " (earliest available: {})", with_commas(earliest))?;
        }
        writeln!(f)?;

        for outcome in &self.outcomes {
            writeln!(f)?;
            match outcome {
                LookbackOutcome::Sample { sample, .. } => {
                    let spb = sample.seconds_per_block();
                    writeln!(
                        f,
                        "{:<10} from height {} ({})  →  {}",
                        format!("Δ{}", sample.blocks()),
                        with_commas(sample.from.height),
                        iso(sample.from.time),
                        with_commas(sample.to.height)
                    )?;
                    writeln!(f, "  elapsed    : {}", format_dhms(sample.elapsed()))?;
                    writeln!(
                        f,
                        "  avg block  : {spb:.6} s/block  ({:.3} ms)",
                        spb * 1000.0
                    )?;
                }
                LookbackOutcome::Skipped { target, reason } => {
                    writeln!(f, "{:<10} {}  {reason}", target.to_string(), "SKIP".yellow())?;
                }
                LookbackOutcome::Failed {
                    target,
                    height,
                    error,
                } => {
                    writeln!(
                        f,
                        "{:<10} {} fetching height {height}: {error}",
                        target.to_string(),
                        "ERROR".red()
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PredictReport {
    pub tip: BlockRef,
    pub target: DateTime<Utc>,
    pub avg_block_secs: f64,
    pub rounding: Rounding,
    pub prediction: Prediction,
}

/// Predicts the height at `target` from the current tip and an assumed block time.
pub async fn predict_future_height<S: BlockSource>(
    source: &S,
    target: DateTime<Utc>,
    avg_block_secs: f64,
    rounding: Rounding,
) -> Result<PredictReport, ReportError> {
    let tip = source.latest().await?.block;
    info!(height = tip.height, "fetched chain tip");
    let prediction = predict_height(&tip, target, avg_block_secs, rounding)?;
    Ok(PredictReport {
        tip,
        target,
        avg_block_secs,
        rounding,
        prediction,
    })
}

impl fmt::Display for PredictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Current block : {} at {} (UTC)",
            with_commas(self.tip.height),
            iso(self.tip.time)
        )?;
        writeln!(f, "Target time   : {} (UTC)", iso(self.target))?;
        writeln!(f, "Avg block     : {:.6} s", self.avg_block_secs)?;
        writeln!(f)?;

        match self.prediction {
            Prediction::InThePast { delta } => writeln!(
                f,
                "Target time {} is in the past relative to latest block ({} earlier).",
                iso(self.target),
                format_dhms(delta)
            ),
            Prediction::Height(p) => {
                let rounding = match self.rounding {
                    Rounding::Floor => "floor",
                    Rounding::Nearest => "rounded",
                };
                writeln!(
                    f,
                    "Δtime         : +{} ({} s)",
                    format_dhms(p.delta),
                    with_commas(p.delta.num_seconds().unsigned_abs())
                )?;
                writeln!(
                    f,
                    "Estimated Δblk: +{} ({rounding}), {:.3} exact",
                    with_commas(p.blocks_to_add),
                    p.exact_blocks
                )?;
                writeln!(f)?;
                writeln!(f, "{}", "Predicted block at target:".bold())?;
                writeln!(f, "  height      : {}", with_commas(p.predicted_height))
            }
        }
    }
}

#[derive(Debug)]
pub struct EtaReport {
    pub latest: BlockRef,
    pub reference: BlockRef,
    pub target_height: u64,
    pub eta: Eta,
}

/// Estimates when `target_height` will be produced, using the average block
/// time over the last `window` blocks. A chain shorter than `window` is fatal.
pub async fn estimate_target_block_time<S: BlockSource>(
    source: &S,
    target_height: u64,
    window: u64,
) -> Result<EtaReport, ReportError> {
    let latest = source.latest().await?.block;
    info!(height = latest.height, "fetched chain tip");

    let reference = source
        .block_at(reference_height(latest.height, window)?)
        .await?;
    let eta = estimate_block_eta(&latest, &reference, target_height)?;
    Ok(EtaReport {
        latest,
        reference,
        target_height,
        eta,
    })
}

impl fmt::Display for EtaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current height: {}", with_commas(self.latest.height))?;
        writeln!(f, "Current block time: {}", iso(self.latest.time))?;
        writeln!(
            f,
            "Block time {} blocks ago: {}",
            self.latest.height - self.reference.height,
            iso(self.reference.time)
        )?;
        writeln!(
            f,
            "Average block time: {:.2} seconds",
            self.eta.seconds_per_block
        )?;
        writeln!(f, "Blocks left: {}", with_commas_signed(self.eta.blocks_left))?;
        writeln!(
            f,
            "Estimated block {} mining time: {}",
            with_commas(self.target_height),
            iso(self.eta.estimated_time)
        )
    }
}
