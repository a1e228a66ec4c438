use std::num::NonZeroU32;
use std::time::Duration;

use block_time::{LookbackTarget, ParseError, Rounding, parse_timestamp};
use block_time_client::config::{
    AMOY_HEIMDALL_API_URL, AMOY_TENDERMINT_BASE_URL, BOR_AVG_BLOCK_SECS, BOR_OFFSETS,
    BOR_RPC_URL, BOR_TARGET_TIME, DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS, ETA_TARGET_BLOCK,
    ETA_WINDOW, HEIMDALL_AVG_BLOCK_SECS, HEIMDALL_BASE_URL, HEIMDALL_LOOKBACKS,
    HEIMDALL_TARGET_TIME, REST_TIMEOUT, RPC_TIMEOUT,
};
use block_time_client::net::retry::RetryPolicy;
use block_time_client::net::rest::{SpanAnchoredSource, TendermintClient};
use block_time_client::net::rpc::RpcClient;
use block_time_client::report::{
    average_block_times, estimate_target_block_time, predict_future_height,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blocktime")]
#[command(about = "Block-time averages and height/time predictions for Polygon Heimdall and Bor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average Heimdall block time over several lookback windows
    HeimdallAverage {
        #[command(flatten)]
        rest: RestArgs,
        /// Blocks to look back from the latest height (repeatable)
        #[arg(long = "lookback", default_values_t = HEIMDALL_LOOKBACKS)]
        lookbacks: Vec<u64>,
    },
    /// Predict the Heimdall height at a target time (rounds down)
    HeimdallPredict {
        #[command(flatten)]
        rest: RestArgs,
        /// Target time, RFC3339 with optional fractional seconds
        #[arg(long, default_value = HEIMDALL_TARGET_TIME, value_parser = parse_target)]
        target: DateTime<Utc>,
        /// Assumed average block time in seconds
        #[arg(long, default_value_t = HEIMDALL_AVG_BLOCK_SECS)]
        avg: f64,
    },
    /// Estimate when a target Heimdall block will be mined
    HeimdallEta {
        /// Base URL of the Tendermint RPC-compatible API
        #[arg(long, env = "HEIMDALL_ETA_BASE_URL", default_value = AMOY_TENDERMINT_BASE_URL)]
        base: String,
        /// Take the current height from this Heimdall API's latest span instead of /status
        #[arg(long, env = "HEIMDALL_SPAN_API_URL", default_missing_value = AMOY_HEIMDALL_API_URL, num_args = 0..=1)]
        span_api: Option<String>,
        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = REST_TIMEOUT.as_secs())]
        timeout: u64,
        #[arg(long, default_value_t = ETA_TARGET_BLOCK)]
        target_block: u64,
        /// Number of blocks to average over
        #[arg(long, default_value_t = ETA_WINDOW)]
        window: u64,
    },
    /// Average Bor block time between the tip and several offsets
    BorAverage {
        #[command(flatten)]
        rpc: RpcArgs,
        /// Offset from the latest height, negative looks back (repeatable)
        #[arg(long = "offset", allow_negative_numbers = true, default_values_t = BOR_OFFSETS)]
        offsets: Vec<i64>,
    },
    /// Predict the Bor height at a target time (rounds to nearest)
    BorPredict {
        #[command(flatten)]
        rpc: RpcArgs,
        /// Target time, RFC3339 with optional fractional seconds
        #[arg(long, default_value = BOR_TARGET_TIME, value_parser = parse_target)]
        target: DateTime<Utc>,
        /// Assumed average block time in seconds
        #[arg(long, default_value_t = BOR_AVG_BLOCK_SECS)]
        avg: f64,
    },
}

#[derive(Args, Debug)]
struct RestArgs {
    /// Base URL of the Tendermint RPC-compatible API
    #[arg(long, env = "HEIMDALL_BASE_URL", default_value = HEIMDALL_BASE_URL)]
    base: String,
    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = REST_TIMEOUT.as_secs())]
    timeout: u64,
}

impl RestArgs {
    fn client(&self) -> Result<TendermintClient, Box<dyn std::error::Error>> {
        Ok(TendermintClient::new(
            &self.base,
            Duration::from_secs(self.timeout),
        )?)
    }
}

#[derive(Args, Debug)]
struct RpcArgs {
    /// Bor JSON-RPC endpoint
    #[arg(long, env = "BOR_RPC_URL", default_value = BOR_RPC_URL)]
    rpc: String,
    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = RPC_TIMEOUT.as_secs())]
    timeout: u64,
    /// Attempts per JSON-RPC call before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: NonZeroU32,
    /// Backoff unit in milliseconds; attempt n waits n units
    #[arg(long, default_value_t = DEFAULT_BACKOFF_UNIT.as_millis() as u64)]
    backoff_ms: u64,
}

impl RpcArgs {
    fn client(&self) -> Result<RpcClient, Box<dyn std::error::Error>> {
        let retry = RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms));
        Ok(RpcClient::new(
            &self.rpc,
            Duration::from_secs(self.timeout),
            retry,
        )?)
    }
}

fn parse_target(s: &str) -> Result<DateTime<Utc>, ParseError> {
    parse_timestamp(s)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::HeimdallAverage { rest, lookbacks } => {
            let client = rest.client()?;
            let targets: Vec<_> = lookbacks
                .into_iter()
                .map(LookbackTarget::blocks_back)
                .collect();
            print!("{}", average_block_times(&client, &targets).await?);
        }
        Command::HeimdallPredict { rest, target, avg } => {
            let client = rest.client()?;
            print!(
                "{}",
                predict_future_height(&client, target, avg, Rounding::Floor).await?
            );
        }
        Command::HeimdallEta {
            base,
            span_api,
            timeout,
            target_block,
            window,
        } => {
            let client = TendermintClient::new(&base, Duration::from_secs(timeout))?;
            let report = match span_api {
                Some(api) => {
                    let source = SpanAnchoredSource::new(&client, &api)?;
                    estimate_target_block_time(&source, target_block, window).await?
                }
                None => estimate_target_block_time(&client, target_block, window).await?,
            };
            print!("{report}");
        }
        Command::BorAverage { rpc, offsets } => {
            let client = rpc.client()?;
            let targets: Vec<_> = offsets.into_iter().map(LookbackTarget::Relative).collect();
            print!("{}", average_block_times(&client, &targets).await?);
        }
        Command::BorPredict { rpc, target, avg } => {
            let client = rpc.client()?;
            print!(
                "{}",
                predict_future_height(&client, target, avg, Rounding::Nearest).await?
            );
        }
    }

    Ok(())
}
