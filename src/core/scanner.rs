//! Discovery Scanner
//!
//! Finds the locker contract (and the LP-position NFT id it holds) behind a
//! token. Two strategies:
//!
//! - **Targeted**: a creation-block hint narrows the search to a few blocks
//!   around it; receipts of the token's own transactions are checked for the
//!   adjacent locker event pair.
//! - **Historical**: without a hint, every factory transaction from protocol
//!   genesis up to the chain head is inspected for the position NFT mint.
//!
//! Windows and transactions are processed strictly one after another. The
//! chain head is read once, so blocks mined during a long scan are not visited.

use alloy_primitives::{Address, B256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::patterns::{find_locker_mint, find_locker_pair, involves_address, unique_transactions};
use crate::core::retry::RetryExecutor;
use crate::models::{
    CacheEntry, DiscoveryError, DiscoveryResult, LockerMatch, LogEvent, ScanRange, ScannerConfig,
    ScoutResult,
};
use crate::providers::{ChainLogClient, LogFilter};
use crate::utils::address::parse_token_address;
use crate::utils::cache::LockerCache;
use crate::utils::progress::{Progress, ProgressSink};

pub struct LockerScanner<C> {
    client: C,
    cache: Arc<dyn LockerCache>,
    executor: RetryExecutor,
    config: ScannerConfig,
}

impl<C: ChainLogClient> LockerScanner<C> {
    pub fn new(client: C, cache: Arc<dyn LockerCache>, config: ScannerConfig) -> Self {
        Self {
            client,
            cache,
            executor: RetryExecutor::new(config.retry),
            config,
        }
    }

    /// Locate the locker of `token_address`.
    ///
    /// With `known_block` only the blocks around that hint are searched,
    /// otherwise the whole factory history. A fresh cache entry short-circuits
    /// both. The last progress message is always `"Found!"` on success or
    /// `"Error: <message>"` on failure.
    pub async fn discover(
        &self,
        token_address: &str,
        known_block: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> ScoutResult<DiscoveryResult> {
        let progress = Progress::new(progress);
        let started = Instant::now();

        match self.run(token_address, known_block, progress).await {
            Ok(result) => {
                info!(
                    "🔒 Locker found in {:.2}s | {}",
                    started.elapsed().as_secs_f64(),
                    result
                );
                progress.found();
                Ok(result)
            }
            Err(e) => {
                warn!("❌ Discovery failed for {}: {}", token_address, e);
                progress.error(&e.message);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        token_address: &str,
        known_block: Option<u64>,
        progress: Progress<'_>,
    ) -> ScoutResult<DiscoveryResult> {
        let token = parse_token_address(token_address)?;
        let cache_key = token.to_string();

        if let Some(entry) = self.cache_get(&cache_key).await {
            progress.emit("Loaded from cache");
            return Ok(DiscoveryResult {
                token_address: token,
                locker_address: entry.locker_address,
                token_id: entry.token_id,
            });
        }

        progress.emit("Starting search...");
        let found = match known_block {
            Some(block) => self.search_targeted(token, block, progress).await?,
            None => self.search_history(token, progress).await?,
        };

        self.cache_put(cache_key, &found).await;
        Ok(DiscoveryResult::new(token, found))
    }

    /// File-backed caches do synchronous I/O; keep it off the runtime threads
    async fn cache_get(&self, key: &str) -> Option<CacheEntry> {
        let cache = Arc::clone(&self.cache);
        let key = key.to_string();
        match tokio::task::spawn_blocking(move || cache.get(&key)).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("⚠️ Cache lookup task failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn cache_put(&self, key: String, found: &LockerMatch) {
        let cache = Arc::clone(&self.cache);
        let (locker, token_id) = (found.locker_address, found.token_id.clone());
        if let Err(e) = tokio::task::spawn_blocking(move || cache.put(&key, locker, token_id)).await {
            warn!("⚠️ Cache store task failed: {}", e);
        }
    }

    /// Adjacent-pair search around a creation-block hint
    async fn search_targeted(
        &self,
        token: Address,
        known_block: u64,
        progress: Progress<'_>,
    ) -> ScoutResult<LockerMatch> {
        let range = ScanRange::around(known_block, self.config.targeted_radius);
        progress.emit(format!("Searching blocks {}...", range));

        let token_logs = self.fetch_logs(&LogFilter::address(token, range)).await?;
        let tx_hashes = unique_transactions(&token_logs);
        info!(
            "🔍 {} logs for {} in blocks {} across {} transactions",
            token_logs.len(),
            token,
            range,
            tx_hashes.len()
        );

        for hash in tx_hashes {
            let receipt = self.fetch_receipt(hash).await?;
            debug!("Checking transaction {} ({} logs)", hash, receipt.len());

            if let Some(found) = find_locker_pair(&receipt) {
                info!(
                    "🎯 Locker pattern in tx {}: locker {} token id {}",
                    hash, found.locker_address, found.token_id
                );
                return Ok(found);
            }
        }

        Err(DiscoveryError::not_found(format!(
            "Token not found in block {}",
            known_block
        )))
    }

    /// Factory mint search from protocol genesis to the head snapshot
    async fn search_history(&self, token: Address, progress: Progress<'_>) -> ScoutResult<LockerMatch> {
        let head = self.fetch_head().await?;
        let genesis = self.config.genesis_block;
        let not_found = || {
            DiscoveryError::not_found(format!("Token not found in Clanker V1 events: {}", token))
        };

        let Some(span) = ScanRange::new(genesis, head) else {
            warn!("⚠️ Chain head {} is behind genesis block {}", head, genesis);
            return Err(not_found());
        };
        info!("🔍 Full scan for {} over blocks {}", token, span);

        for window in span.windows(self.config.window_blocks) {
            let pct = percent_complete(window.from_block - genesis, head - genesis);
            progress.emit(format!("Searching blocks {} ({:.1}% complete)...", window, pct));

            match self.scan_window(token, window).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {}
                Err(e) if e.is_transient() => {
                    warn!("⚠️ Error searching blocks {}, continuing: {}", window, e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(not_found())
    }

    async fn scan_window(&self, token: Address, window: ScanRange) -> ScoutResult<Option<LockerMatch>> {
        let factory_logs = self
            .fetch_logs(&LogFilter::address(self.config.factory, window))
            .await?;
        debug!("{} factory logs in blocks {}", factory_logs.len(), window);

        // several factory logs usually share one deployment transaction
        for hash in unique_transactions(&factory_logs) {
            let receipt = self.fetch_receipt(hash).await?;
            if !involves_address(&receipt, token) {
                continue;
            }

            info!("🔎 Found transaction with token: {}", hash);
            match find_locker_mint(&receipt, self.config.factory)? {
                Some(found) => {
                    info!(
                        "🎯 Locker NFT mint in tx {}: locker {} token id {}",
                        hash, found.locker_address, found.token_id
                    );
                    return Ok(Some(found));
                }
                None => debug!("No locker NFT mint found in transaction {}", hash),
            }
        }

        Ok(None)
    }

    async fn fetch_logs(&self, filter: &LogFilter) -> ScoutResult<Vec<LogEvent>> {
        self.executor
            .execute("eth_getLogs", || self.client.get_logs(filter))
            .await
            .map_err(|e| DiscoveryError::transient_rpc("eth_getLogs", e))
    }

    async fn fetch_receipt(&self, hash: B256) -> ScoutResult<Vec<LogEvent>> {
        self.executor
            .execute("eth_getTransactionReceipt", || self.client.get_transaction_receipt(hash))
            .await
            .map_err(|e| DiscoveryError::transient_rpc("eth_getTransactionReceipt", e))
    }

    async fn fetch_head(&self) -> ScoutResult<u64> {
        self.executor
            .execute("eth_blockNumber", || self.client.get_block_number())
            .await
            .map_err(|e| DiscoveryError::transient_rpc("eth_blockNumber", e))
    }
}

/// Share of the span already behind `done`, in percent
pub fn percent_complete(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 * 100.0 / total as f64
}
