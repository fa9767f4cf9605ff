//! Chain Log Client Adapter
//!
//! The only view of the chain the scanner has. Implementations return results
//! in node order (ascending block / log index); callers never re-sort.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{LogEvent, ScanRange};

/// `eth_getLogs` filter: one emitter, optional positional topics, inclusive range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    /// Positional topic constraints; `None` matches anything at that position
    pub topics: Vec<Option<B256>>,
    pub range: ScanRange,
}

impl LogFilter {
    /// Every log of `address` inside `range`
    pub fn address(address: Address, range: ScanRange) -> Self {
        Self {
            address,
            topics: Vec::new(),
            range,
        }
    }

    pub fn with_topics(mut self, topics: Vec<Option<B256>>) -> Self {
        self.topics = topics;
        self
    }
}

#[async_trait]
pub trait ChainLogClient: Send + Sync {
    async fn get_logs(&self, filter: &LogFilter) -> eyre::Result<Vec<LogEvent>>;

    /// Ordered logs of the transaction's receipt
    async fn get_transaction_receipt(&self, hash: B256) -> eyre::Result<Vec<LogEvent>>;

    /// Current chain head
    async fn get_block_number(&self) -> eyre::Result<u64>;
}

#[async_trait]
impl<T: ChainLogClient + ?Sized> ChainLogClient for Arc<T> {
    async fn get_logs(&self, filter: &LogFilter) -> eyre::Result<Vec<LogEvent>> {
        (**self).get_logs(filter).await
    }

    async fn get_transaction_receipt(&self, hash: B256) -> eyre::Result<Vec<LogEvent>> {
        (**self).get_transaction_receipt(hash).await
    }

    async fn get_block_number(&self) -> eyre::Result<u64> {
        (**self).get_block_number().await
    }
}
