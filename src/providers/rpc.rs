//! RPC Client Module - JSON-RPC over HTTP
//!
//! 1. Plain `reqwest` JSON-RPC: eth_getLogs, eth_getTransactionReceipt, eth_blockNumber
//! 2. User-Agent header & API key masking in logs
//! 3. Gzip compression for large `eth_getLogs` responses
//!
//! No retry logic lives here. Each call is a single attempt; the scanner wraps
//! calls in the resilient executor.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::models::LogEvent;
use crate::providers::client::{ChainLogClient, LogFilter};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// JSON-RPC chain client
pub struct JsonRpcLogClient {
    url: String,
    /// HTTP client with custom headers (gzip enabled)
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcLogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: Self::build_client(timeout)?,
            next_id: AtomicU64::new(1),
        })
    }

    fn build_client(timeout: Duration) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }

    /// Execute single JSON-RPC call
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| eyre!("Request failed: {}", e))?;

        let status = response.status();
        if status == 429 {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        let json: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse response: {}", e))?;

        if let Some(error) = json.error {
            return Err(eyre!("RPC error: {} (code: {})", error.message, error.code));
        }

        json.result.ok_or_else(|| eyre!("No result in response to {}", method))
    }

    /// Get RPC URL (masked for logging)
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }
}

/// Hide everything after `/v2/` (Alchemy-style keys)
pub fn mask_url(url: &str) -> String {
    match url.split_once("/v2/") {
        Some((base, _)) => format!("{}/v2/***HIDDEN***", base),
        None => url.to_string(),
    }
}

/// `eth_getLogs` params for a filter
pub fn logs_params(filter: &LogFilter) -> serde_json::Value {
    let mut object = serde_json::json!({
        "address": filter.address,
        "fromBlock": format!("{:#x}", filter.range.from_block),
        "toBlock": format!("{:#x}", filter.range.to_block),
    });
    if !filter.topics.is_empty() {
        object["topics"] = serde_json::json!(filter.topics);
    }
    serde_json::json!([object])
}

#[async_trait]
impl ChainLogClient for JsonRpcLogClient {
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEvent>> {
        let logs: Vec<RpcLog> = self.call("eth_getLogs", logs_params(filter)).await?;
        debug!("📥 eth_getLogs {} [{}]: {} logs", filter.address, filter.range, logs.len());
        Ok(logs.into_iter().filter_map(RpcLog::into_event).collect())
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Vec<LogEvent>> {
        // a null result (unknown or not yet indexed hash) surfaces as an error
        let receipt: RpcReceipt = self
            .call("eth_getTransactionReceipt", serde_json::json!([hash]))
            .await?;
        Ok(receipt.logs.into_iter().filter_map(RpcLog::into_event).collect())
    }

    async fn get_block_number(&self) -> Result<u64> {
        let head: U64 = self.call("eth_blockNumber", serde_json::json!([])).await?;
        Ok(head.to())
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Log as returned by the node
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    #[serde(default)]
    topics: Vec<B256>,
    #[serde(default)]
    data: Bytes,
    transaction_hash: Option<B256>,
    block_number: Option<U64>,
}

impl RpcLog {
    /// Pending logs carry no transaction hash and are dropped
    fn into_event(self) -> Option<LogEvent> {
        let transaction_hash = self.transaction_hash?;
        Some(LogEvent {
            address: self.address,
            topics: self.topics,
            data: self.data,
            transaction_hash,
            block_number: self.block_number.map(|n| n.to::<u64>()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RpcReceipt {
    #[serde(default)]
    logs: Vec<RpcLog>,
}
