//! Locker Scout Library
//!
//! Locker discovery engine for Clanker-deployed tokens on Base. Given a token
//! address it finds:
//! - the locker contract custodying the token's LP-position NFT
//! - the NFT token id that locker holds
//!
//! by pattern-matching receipt logs, either around a known creation block or
//! across the factory's whole history.

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{LockerScanner, RetryExecutor, RetryPolicy};
pub use models::{
    CacheEntry, DiscoveryError, DiscoveryResult, ErrorCode, LockerMatch, LogEvent, ScanRange,
    ScannerConfig, ScoutConfig, ScoutResult, TokenId,
};
pub use providers::{ChainLogClient, JsonRpcLogClient, LogFilter};
pub use utils::cache::{FileLockerCache, LockerCache, MemoryLockerCache, NoopCache};
pub use utils::progress::{ProgressSink, ERROR_PREFIX, FOUND_MESSAGE};
