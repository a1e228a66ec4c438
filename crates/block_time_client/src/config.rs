//! Public Polygon endpoints and the defaults each report starts from.
//!
//! Nothing here is read implicitly: the binary turns these into flag defaults
//! and passes the resulting values into clients and reports.
use std::time::Duration;

pub use crate::net::retry::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS};

/// Heimdall (consensus layer) Tendermint REST API, mainnet.
pub const HEIMDALL_BASE_URL: &str = "https://tendermint-api.polygon.technology";
/// Heimdall Tendermint REST API, Amoy testnet.
pub const AMOY_TENDERMINT_BASE_URL: &str = "https://tendermint-api-amoy.polygon.technology";
/// Heimdall application API, Amoy testnet (serves `/bor/latest-span`).
pub const AMOY_HEIMDALL_API_URL: &str = "https://heimdall-api-amoy.polygon.technology";
/// Bor (execution layer) JSON-RPC, mainnet.
pub const BOR_RPC_URL: &str = "https://polygon-rpc.com";

pub const REST_TIMEOUT: Duration = Duration::from_secs(15);
pub const RPC_TIMEOUT: Duration = Duration::from_secs(20);

pub const HEIMDALL_LOOKBACKS: [u64; 4] = [10_000, 100_000, 1_000_000, 1_500_000];
pub const BOR_OFFSETS: [i64; 5] = [0, -40_000, -280_000, -560_000, -1_120_000];

pub const HEIMDALL_TARGET_TIME: &str = "2025-09-16T14:00:00.00000000Z";
pub const HEIMDALL_AVG_BLOCK_SECS: f64 = 1.30;
pub const BOR_TARGET_TIME: &str = "2025-10-07T14:00:00.00000000Z";
pub const BOR_AVG_BLOCK_SECS: f64 = 2.15;

pub const ETA_TARGET_BLOCK: u64 = 8_788_500;
pub const ETA_WINDOW: u64 = 2_000;
