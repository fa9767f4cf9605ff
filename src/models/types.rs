//! Type definitions for the locker discovery engine
//! All core data structures shared by the scanner, cache and RPC adapter

use alloy_primitives::{Address, Bytes, B256};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position NFT id; unbounded, it is read from raw event data of any width
pub type TokenId = BigUint;

/// Read-only projection of a chain log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, 0 to 4 words
    pub topics: Vec<B256>,
    /// Opaque data payload
    pub data: Bytes,
    /// Parent transaction
    pub transaction_hash: B256,
    pub block_number: u64,
}

impl LogEvent {
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
            transaction_hash: B256::ZERO,
            block_number: 0,
        }
    }

    /// Attach the parent transaction and block
    pub fn in_tx(mut self, transaction_hash: B256, block_number: u64) -> Self {
        self.transaction_hash = transaction_hash;
        self.block_number = block_number;
        self
    }
}

/// Inclusive block interval `from_block..=to_block`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub from_block: u64,
    pub to_block: u64,
}

impl ScanRange {
    /// Returns None when `from_block > to_block`
    pub fn new(from_block: u64, to_block: u64) -> Option<Self> {
        (from_block <= to_block).then_some(Self { from_block, to_block })
    }

    /// Window of `radius` blocks on both sides of `center`, clamped at block 0
    pub fn around(center: u64, radius: u64) -> Self {
        Self {
            from_block: center.saturating_sub(radius),
            to_block: center.saturating_add(radius),
        }
    }

    /// Split into consecutive non-overlapping windows of at most `size` blocks
    pub fn windows(&self, size: u64) -> ScanWindows {
        ScanWindows {
            next: Some(self.from_block),
            end: self.to_block,
            size: size.max(1),
        }
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from_block, self.to_block)
    }
}

/// Iterator returned by [`ScanRange::windows`]
#[derive(Debug, Clone)]
pub struct ScanWindows {
    next: Option<u64>,
    end: u64,
    size: u64,
}

impl Iterator for ScanWindows {
    type Item = ScanRange;

    fn next(&mut self) -> Option<ScanRange> {
        let from_block = self.next?;
        let to_block = from_block.saturating_add(self.size - 1).min(self.end);
        self.next = if to_block >= self.end {
            None
        } else {
            Some(to_block + 1)
        };
        Some(ScanRange { from_block, to_block })
    }
}

/// Locker located by one of the structural matchers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockerMatch {
    pub locker_address: Address,
    pub token_id: TokenId,
}

/// Successful discovery: which locker custodies the position NFT of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub token_address: Address,
    pub locker_address: Address,
    #[serde(with = "decimal_id")]
    pub token_id: TokenId,
}

impl DiscoveryResult {
    pub fn new(token_address: Address, found: LockerMatch) -> Self {
        Self {
            token_address,
            locker_address: found.locker_address,
            token_id: found.token_id,
        }
    }
}

impl fmt::Display for DiscoveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token: {} | Locker: {} | Token ID: {}",
            self.token_address, self.locker_address, self.token_id
        )
    }
}

/// Persisted cache record, `timestamp` is epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub locker_address: Address,
    #[serde(with = "decimal_id")]
    pub token_id: TokenId,
    #[serde(rename = "timestamp")]
    pub created_at_epoch_millis: i64,
}

impl CacheEntry {
    pub fn new(locker_address: Address, token_id: TokenId, created_at_epoch_millis: i64) -> Self {
        Self {
            locker_address,
            token_id,
            created_at_epoch_millis,
        }
    }

    /// Valid while `now - created_at <= ttl`
    pub fn is_fresh(&self, now_epoch_millis: i64, ttl_millis: i64) -> bool {
        now_epoch_millis.saturating_sub(self.created_at_epoch_millis) <= ttl_millis
    }
}

/// Token ids travel as decimal text, never as hex
pub mod decimal_id {
    use super::TokenId;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TokenId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenId, D::Error> {
        let text = String::deserialize(deserializer)?;
        TokenId::parse_bytes(text.trim().as_bytes(), 10)
            .ok_or_else(|| D::Error::custom(format!("invalid decimal token id: {:?}", text)))
    }
}
