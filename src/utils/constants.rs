//! Constants Module - Single Source of Truth
//!
//! Protocol addresses, scan geometry, cache layout and RPC defaults.
//! No hardcoded values in other modules.

use alloy_primitives::{address, Address, B256};
use alloy_sol_types::{sol, SolEvent};

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "LockerScout";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("LockerScout/", env!("CARGO_PKG_VERSION"));

// ============================================
// RPC CONSTANTS
// ============================================

/// Default timeout for RPC requests (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

/// Default attempts per RPC call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Public Base RPC, used when nothing else is configured
pub const PUBLIC_BASE_RPC: &str = "https://mainnet.base.org";

/// Build Alchemy URL for Base
pub fn build_alchemy_url(api_key: &str) -> String {
    format!("https://base-mainnet.g.alchemy.com/v2/{}", api_key)
}

// ============================================
// CLANKER V1 PROTOCOL
// ============================================

/// Clanker V1 factory; mints the LP-position NFT to the locker
pub const CLANKER_V1_FACTORY: Address = address!("9B84fcE5Dcd9a38d2D01d5D72373F6b6b067c3e1");

/// First block the full scan visits
pub const CLANKER_V1_START_BLOCK: u64 = 22_963_092;

/// Blocks per `eth_getLogs` window in the full scan
pub const SCAN_WINDOW_BLOCKS: u64 = 10_000;

/// Blocks searched on each side of a creation-block hint
pub const TARGETED_RADIUS_BLOCKS: u64 = 5;

sol! {
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_EVENT_SIGNATURE: B256 = Transfer::SIGNATURE_HASH;

/// Demo token shown in CLI help
pub const EXAMPLE_TOKEN: Address = address!("214535AfB6f037A5da77d3187CA210742D3eA181");

/// Creation block of [`EXAMPLE_TOKEN`]
pub const EXAMPLE_TOKEN_CREATION_BLOCK: u64 = 5_632_427;

// ============================================
// CACHE CONSTANTS
// ============================================

/// Namespace key of the persisted cache document
pub const CACHE_NAMESPACE: &str = "clanker_v1_lockers";

/// Cached lockers stay valid for 24 hours
pub const CACHE_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Default location of the file-backed cache
pub const DEFAULT_CACHE_PATH: &str = "./cache/lockers.json";
