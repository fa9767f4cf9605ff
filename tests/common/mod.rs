//! Scripted in-memory chain for discovery tests

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use locker_scout::utils::constants::TRANSFER_EVENT_SIGNATURE;
use locker_scout::{ChainLogClient, LogEvent, LogFilter, ScanRange};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockChain {
    pub head: u64,
    /// every log on chain, in block order
    logs: Vec<LogEvent>,
    receipts: HashMap<B256, Vec<LogEvent>>,
    /// eth_getLogs windows (by from_block) that always fail
    broken_windows: HashSet<u64>,
    /// receipts that always fail
    broken_receipts: HashSet<B256>,
    /// remaining failures before eth_getLogs starts answering
    flaky_logs: Mutex<usize>,
    pub log_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
    pub queried_ranges: Mutex<Vec<ScanRange>>,
}

impl MockChain {
    pub fn new(head: u64) -> Self {
        Self {
            head,
            ..Self::default()
        }
    }

    /// Register a transaction: its logs become both the receipt and
    /// searchable chain logs
    pub fn add_tx(&mut self, hash: B256, block: u64, logs: Vec<LogEvent>) {
        let logs: Vec<LogEvent> = logs.into_iter().map(|l| l.in_tx(hash, block)).collect();
        self.logs.extend(logs.iter().cloned());
        self.receipts.insert(hash, logs);
    }

    pub fn break_window(&mut self, from_block: u64) {
        self.broken_windows.insert(from_block);
    }

    pub fn break_receipt(&mut self, hash: B256) {
        self.broken_receipts.insert(hash);
    }

    pub fn flaky_logs(&self, failures: usize) {
        *self.flaky_logs.lock().unwrap() = failures;
    }

    pub fn total_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
            + self.receipt_calls.load(Ordering::SeqCst)
            + self.head_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainLogClient for MockChain {
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEvent>> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        self.queried_ranges.lock().unwrap().push(filter.range);

        {
            let mut flaky = self.flaky_logs.lock().unwrap();
            if *flaky > 0 {
                *flaky -= 1;
                return Err(eyre!("HTTP error: 503 Service Unavailable"));
            }
        }
        if self.broken_windows.contains(&filter.range.from_block) {
            return Err(eyre!("query returned more than 10000 results"));
        }

        Ok(self
            .logs
            .iter()
            .filter(|l| l.address == filter.address)
            .filter(|l| l.block_number >= filter.range.from_block && l.block_number <= filter.range.to_block)
            .cloned()
            .collect())
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Vec<LogEvent>> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_receipts.contains(&hash) {
            return Err(eyre!("header not found"));
        }
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| eyre!("No result in response to eth_getTransactionReceipt"))
    }

    async fn get_block_number(&self) -> Result<u64> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head)
    }
}

// ============================================
// LOG BUILDERS
// ============================================

pub fn tx(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn word(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn uint_data(value: u64) -> Bytes {
    Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
}

/// Plain ERC-20 transfer emitted by the token itself
pub fn token_transfer(token: Address) -> LogEvent {
    LogEvent::new(token, vec![TRANSFER_EVENT_SIGNATURE, word(0x01), word(0x02)], uint_data(1_000))
}

/// Adjacent locker pair: two topics then one topic, same data
pub fn locker_pair(locker: Address, token_id: u64) -> Vec<LogEvent> {
    locker_pair_with_data(locker, uint_data(token_id))
}

pub fn locker_pair_with_data(locker: Address, data: Bytes) -> Vec<LogEvent> {
    vec![
        LogEvent::new(locker, vec![word(0xa1), word(0xa2)], data.clone()),
        LogEvent::new(locker, vec![word(0xa3)], data),
    ]
}

/// Position NFT mint from zero by the factory
pub fn factory_mint(factory: Address, locker: Address, token_id: u64) -> LogEvent {
    LogEvent::new(
        factory,
        vec![
            TRANSFER_EVENT_SIGNATURE,
            B256::ZERO,
            locker.into_word(),
            B256::from(U256::from(token_id).to_be_bytes::<32>()),
        ],
        Bytes::new(),
    )
}

/// Non-mint factory event (e.g. TokenCreated)
pub fn factory_event(factory: Address) -> LogEvent {
    LogEvent::new(factory, vec![word(0x0e)], uint_data(0))
}
