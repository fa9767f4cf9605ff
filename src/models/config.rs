//! Configuration module for Locker Scout
//!
//! Defaults come from utils/constants.rs; the environment overrides them.

use alloy_primitives::Address;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::retry::RetryPolicy;
use crate::utils::constants::{
    build_alchemy_url, CLANKER_V1_FACTORY, CLANKER_V1_START_BLOCK, DEFAULT_CACHE_PATH,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_RPC_TIMEOUT_SECS, PUBLIC_BASE_RPC,
    SCAN_WINDOW_BLOCKS, TARGETED_RADIUS_BLOCKS,
};

/// Scan geometry and retry behaviour of the discovery scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Contract whose mint-from-zero marks the locker (full scan)
    pub factory: Address,
    /// First block of the full scan
    pub genesis_block: u64,
    /// Blocks per window in the full scan
    pub window_blocks: u64,
    /// Blocks on each side of a creation-block hint
    pub targeted_radius: u64,
    pub retry: RetryPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            factory: CLANKER_V1_FACTORY,
            genesis_block: CLANKER_V1_START_BLOCK,
            window_blocks: SCAN_WINDOW_BLOCKS,
            targeted_radius: TARGETED_RADIUS_BLOCKS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Process-level configuration
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// HTTP JSON-RPC endpoint (Base)
    pub rpc_url: String,
    /// Timeout for a single RPC request
    pub rpc_timeout: Duration,
    /// File-backed cache location
    pub cache_path: PathBuf,
    pub scanner: ScannerConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ScoutConfig {
    /// Build from environment:
    /// `BASE_RPC_URL`, `ALCHEMY_API_KEY`, `LOCKER_CACHE_PATH`,
    /// `RPC_MAX_ATTEMPTS`, `RPC_RETRY_DELAY_MS`, `RPC_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let max_attempts = env_parse("RPC_MAX_ATTEMPTS").unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let delay_ms = env_parse("RPC_RETRY_DELAY_MS").unwrap_or(DEFAULT_RETRY_DELAY_MS);
        let timeout_secs = env_parse("RPC_TIMEOUT_SECS").unwrap_or(DEFAULT_RPC_TIMEOUT_SECS);

        Self {
            rpc_url: Self::resolve_rpc_url(),
            rpc_timeout: Duration::from_secs(timeout_secs),
            cache_path: std::env::var("LOCKER_CACHE_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            scanner: ScannerConfig {
                retry: RetryPolicy::new(max_attempts, Duration::from_millis(delay_ms)),
                ..ScannerConfig::default()
            },
        }
    }

    /// Explicit URL first, then Alchemy key, then the public endpoint.
    /// The API key is never logged.
    fn resolve_rpc_url() -> String {
        if let Some(url) = std::env::var("BASE_RPC_URL").ok().filter(|u| !u.is_empty()) {
            return url;
        }

        if let Ok(key) = std::env::var("ALCHEMY_API_KEY") {
            if !key.is_empty() && key != "YOUR_API_KEY" {
                info!("🔑 Using ALCHEMY_API_KEY (key hidden)");
                return build_alchemy_url(&key);
            }
        }

        warn!("⚠️ No BASE_RPC_URL or ALCHEMY_API_KEY set, using public RPC {}", PUBLIC_BASE_RPC);
        PUBLIC_BASE_RPC.to_string()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("⚠️ Ignoring invalid {}={}", key, raw);
            None
        }
    }
}
