//! Structural log matchers
//!
//! Pure predicates over a receipt's ordered log list. Nothing here touches the
//! network, so synthetic logs are enough to exercise them.
//!
//! - P1 (targeted): two adjacent logs from the same emitter, the first with two
//!   topics, the second with one, carrying byte-identical data.
//! - P2 (historical): a Transfer-from-zero mint emitted by the factory; topic 2
//!   is the locker, topic 3 the position id.

use alloy_primitives::{Address, B256};
use std::collections::HashSet;

use crate::models::{DiscoveryError, LockerMatch, LogEvent, ScoutResult, TokenId};
use crate::utils::constants::TRANSFER_EVENT_SIGNATURE;

/// Interpret an arbitrary-length byte string as a big-endian unsigned integer.
/// Empty input is zero.
pub fn be_uint(bytes: &[u8]) -> TokenId {
    TokenId::from_bytes_be(bytes)
}

/// Low 20 bytes of an indexed address topic
#[inline]
pub fn topic_address(topic: &B256) -> Address {
    Address::from_word(*topic)
}

/// P1: first adjacent locker pair in ascending log order
pub fn find_locker_pair(logs: &[LogEvent]) -> Option<LockerMatch> {
    logs.windows(2).find_map(|pair| {
        let (log, next) = (&pair[0], &pair[1]);
        let matched = log.address == next.address
            && log.topics.len() == 2
            && next.topics.len() == 1
            && log.data == next.data;
        matched.then(|| LockerMatch {
            locker_address: log.address,
            token_id: be_uint(&log.data),
        })
    })
}

/// Distinct parent transactions, in first-seen order
pub fn unique_transactions(logs: &[LogEvent]) -> Vec<B256> {
    let mut seen = HashSet::new();
    logs.iter()
        .map(|log| log.transaction_hash)
        .filter(|hash| seen.insert(*hash))
        .collect()
}

/// Whether `address` emitted any log of the receipt
pub fn involves_address(logs: &[LogEvent], address: Address) -> bool {
    logs.iter().any(|log| log.address == address)
}

/// P2 predicate: Transfer signature, minted from zero, emitted by `factory`
pub fn is_factory_mint(log: &LogEvent, factory: Address) -> bool {
    log.address == factory
        && log.topics.first() == Some(&TRANSFER_EVENT_SIGNATURE)
        && log.topics.get(1) == Some(&B256::ZERO)
}

/// P2: first factory mint in the receipt.
///
/// A mint missing its `to` or `tokenId` topic is a schema mismatch and fails
/// with `InvalidEventFormat` instead of being skipped.
pub fn find_locker_mint(logs: &[LogEvent], factory: Address) -> ScoutResult<Option<LockerMatch>> {
    let Some(mint) = logs.iter().find(|log| is_factory_mint(log, factory)) else {
        return Ok(None);
    };

    match (mint.topics.get(2), mint.topics.get(3)) {
        (Some(to), Some(id)) => Ok(Some(LockerMatch {
            locker_address: topic_address(to),
            token_id: be_uint(id.as_slice()),
        })),
        _ => Err(DiscoveryError::invalid_event_format(format!(
            "Invalid NFT transfer event format in tx {} ({} topics)",
            mint.transaction_hash,
            mint.topics.len()
        ))),
    }
}
