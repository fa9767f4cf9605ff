//! Locker Result Cache
//!
//! Best-effort layer in front of the scanner. A failing store never fails a
//! discovery: corrupt or unreadable storage reads as a miss and a failed write
//! is logged and dropped.
//!
//! Features:
//! - 24h TTL, checked lazily at read time (expired entries are left in place)
//! - Address normalization (lowercase)
//! - Cache HIT/MISS logging
//! - Durable JSON file backend and a DashMap in-memory backend

use alloy_primitives::Address;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::models::{CacheEntry, TokenId};
use crate::utils::constants::{CACHE_NAMESPACE, CACHE_TTL_MILLIS};

/// Capability interface of the result cache.
///
/// Both operations are infallible from the caller's point of view.
pub trait LockerCache: Send + Sync {
    /// Fresh entry for `token_address`, None on miss or expiry
    fn get(&self, token_address: &str) -> Option<CacheEntry>;

    /// Upsert; overwrites any previous entry and refreshes its timestamp
    fn put(&self, token_address: &str, locker_address: Address, token_id: TokenId);
}

/// Normalisasi address ke lowercase
#[inline]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Current wall-clock time in epoch milliseconds
#[inline]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ============================================
// IN-MEMORY BACKEND
// ============================================

/// Thread-safe cache without explicit locking
#[derive(Clone)]
pub struct MemoryLockerCache {
    /// lowercase address -> CacheEntry
    store: Arc<DashMap<String, CacheEntry>>,
    ttl_millis: i64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for MemoryLockerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLockerCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL_MILLIS)
    }

    pub fn with_ttl(ttl_millis: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl_millis,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store a prepared entry as-is, timestamp included
    pub fn insert_entry(&self, token_address: &str, entry: CacheEntry) {
        self.store.insert(normalize_address(token_address), entry);
    }

    /// Raw entry regardless of age
    pub fn peek(&self, token_address: &str) -> Option<CacheEntry> {
        self.store
            .get(&normalize_address(token_address))
            .map(|entry| entry.clone())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_millis: self.ttl_millis,
        }
    }
}

impl LockerCache for MemoryLockerCache {
    fn get(&self, token_address: &str) -> Option<CacheEntry> {
        let key = normalize_address(token_address);

        match self.store.get(&key) {
            Some(entry) if entry.is_fresh(now_millis(), self.ttl_millis) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                info!("✅ CACHE HIT: {}", key);
                Some(entry.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS: {}", key);
                None
            }
        }
    }

    fn put(&self, token_address: &str, locker_address: Address, token_id: TokenId) {
        let key = normalize_address(token_address);
        let entry = CacheEntry::new(locker_address, token_id, now_millis());
        self.store.insert(key.clone(), entry);
        info!("💾 CACHE SET: {}", key);
    }
}

/// Statistik cache untuk monitoring
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_millis: i64,
}

// ============================================
// FILE BACKEND
// ============================================

/// Durable cache: one JSON document, entries under [`CACHE_NAMESPACE`].
///
/// ```json
/// { "clanker_v1_lockers": { "0xtoken": { "lockerAddress": "0x..", "tokenId": "42", "timestamp": 1700000000000 } } }
/// ```
pub struct FileLockerCache {
    path: PathBuf,
    ttl_millis: i64,
    /// Serializes read-modify-write cycles inside this process; other
    /// processes only ever observe whole documents
    write_lock: Mutex<()>,
}

impl FileLockerCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, CACHE_TTL_MILLIS)
    }

    pub fn with_ttl(path: impl Into<PathBuf>, ttl_millis: i64) -> Self {
        Self {
            path: path.into(),
            ttl_millis,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> eyre::Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(doc) => Ok(doc),
            other => Err(eyre::eyre!("cache document is not an object: {}", other)),
        }
    }

    fn read_entry(&self, key: &str) -> eyre::Result<Option<CacheEntry>> {
        let doc = self.load_document()?;
        let Some(raw) = doc.get(CACHE_NAMESPACE).and_then(|ns| ns.get(key)) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(raw.clone())?))
    }

    fn write_entry(&self, key: String, entry: &CacheEntry) -> eyre::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        // a corrupt document is replaced rather than blocking every future write
        let mut doc = self.load_document().unwrap_or_default();
        let namespace = doc
            .entry(CACHE_NAMESPACE.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !namespace.is_object() {
            *namespace = Value::Object(Map::new());
        }
        if let Value::Object(entries) = namespace {
            entries.insert(key, serde_json::to_value(entry)?);
        }

        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir
            }
            None => Path::new("."),
        };

        // unique temp name per writer, renamed over the document in one step
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(&Value::Object(doc))?)?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

impl LockerCache for FileLockerCache {
    fn get(&self, token_address: &str) -> Option<CacheEntry> {
        let key = normalize_address(token_address);

        match self.read_entry(&key) {
            Ok(Some(entry)) if entry.is_fresh(now_millis(), self.ttl_millis) => {
                info!("✅ CACHE HIT: {}", key);
                Some(entry)
            }
            Ok(Some(_)) => {
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            }
            Ok(None) => {
                debug!("📭 CACHE MISS: {}", key);
                None
            }
            Err(e) => {
                warn!("⚠️ Cache unreadable at {}, treating as miss: {}", self.path.display(), e);
                None
            }
        }
    }

    fn put(&self, token_address: &str, locker_address: Address, token_id: TokenId) {
        let key = normalize_address(token_address);
        let entry = CacheEntry::new(locker_address, token_id, now_millis());

        match self.write_entry(key.clone(), &entry) {
            Ok(()) => info!("💾 CACHE SET: {} -> {}", key, self.path.display()),
            Err(e) => warn!("⚠️ Failed to save to cache {}: {}", self.path.display(), e),
        }
    }
}

// ============================================
// DISABLED
// ============================================

/// Never hits, never stores
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl LockerCache for NoopCache {
    fn get(&self, _token_address: &str) -> Option<CacheEntry> {
        None
    }

    fn put(&self, _token_address: &str, _locker_address: Address, _token_id: TokenId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x214535AfB6f037A5da77d3187CA210742D3eA181";

    fn locker() -> Address {
        Address::repeat_byte(0x42)
    }

    #[test]
    fn test_memory_set_get() {
        let cache = MemoryLockerCache::new();
        cache.put(TOKEN, locker(), TokenId::from(7u64));

        let entry = cache.get(TOKEN).expect("fresh entry");
        assert_eq!(entry.locker_address, locker());
        assert_eq!(entry.token_id, TokenId::from(7u64));
    }

    #[test]
    fn test_address_normalization() {
        let cache = MemoryLockerCache::new();
        cache.put(&TOKEN.to_uppercase().replace("0X", "0x"), locker(), TokenId::from(1u64));
        assert!(cache.get(&TOKEN.to_lowercase()).is_some());
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_kept() {
        let cache = MemoryLockerCache::new();
        let stale = CacheEntry::new(locker(), TokenId::from(1u64), now_millis() - CACHE_TTL_MILLIS - 1);
        cache.insert_entry(TOKEN, stale.clone());

        assert!(cache.get(TOKEN).is_none());
        // lazy expiry: nothing is deleted on read
        assert_eq!(cache.peek(TOKEN), Some(stale));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let cache = MemoryLockerCache::new();
        cache.insert_entry(TOKEN, CacheEntry::new(locker(), TokenId::from(1u64), 0));
        cache.put(TOKEN, Address::repeat_byte(0x43), TokenId::from(2u64));

        let entry = cache.get(TOKEN).unwrap();
        assert_eq!(entry.locker_address, Address::repeat_byte(0x43));
        assert_eq!(entry.token_id, TokenId::from(2u64));
        assert!(entry.created_at_epoch_millis > 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryLockerCache::new();
        cache.put(TOKEN, locker(), TokenId::from(1u64));
        cache.get(TOKEN); // HIT
        cache.get("0xnonexistent"); // MISS

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_roundtrip_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lockers.json");
        let cache = FileLockerCache::new(&path);

        assert!(cache.get(TOKEN).is_none());
        cache.put(TOKEN, locker(), TokenId::from(99u64));

        let entry = cache.get(TOKEN).expect("persisted");
        assert_eq!(entry.token_id, TokenId::from(99u64));

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let stored = &doc[CACHE_NAMESPACE][TOKEN.to_lowercase()];
        assert_eq!(stored["tokenId"], "99");
        assert!(stored["timestamp"].is_i64());

        // a second handle on the same file sees the entry
        assert!(FileLockerCache::new(&path).get(TOKEN).is_some());
    }

    #[test]
    fn test_file_expired_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lockers.json");
        let stale = serde_json::json!({
            "lockerAddress": locker(),
            "tokenId": "5",
            "timestamp": now_millis() - CACHE_TTL_MILLIS - 1000,
        });
        let mut entries = Map::new();
        entries.insert(TOKEN.to_lowercase(), stale);
        let mut doc = Map::new();
        doc.insert(CACHE_NAMESPACE.to_string(), Value::Object(entries));
        std::fs::write(&path, Value::Object(doc).to_string()).unwrap();

        assert!(FileLockerCache::new(&path).get(TOKEN).is_none());
    }

    #[test]
    fn test_file_corruption_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lockers.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = FileLockerCache::new(&path);
        assert!(cache.get(TOKEN).is_none());

        // write recovers by replacing the corrupt document
        cache.put(TOKEN, locker(), TokenId::from(3u64));
        assert_eq!(cache.get(TOKEN).unwrap().token_id, TokenId::from(3u64));
    }

    #[test]
    fn test_file_preserves_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lockers.json");
        let cache = FileLockerCache::new(&path);
        let other = "0x0000000000000000000000000000000000000001";

        cache.put(TOKEN, locker(), TokenId::from(1u64));
        cache.put(other, locker(), TokenId::from(2u64));

        assert_eq!(cache.get(TOKEN).unwrap().token_id, TokenId::from(1u64));
        assert_eq!(cache.get(other).unwrap().token_id, TokenId::from(2u64));
    }

    #[test]
    fn test_independent_writers_never_leave_partial_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lockers.json");

        // separate handles stand in for separate processes: no shared lock
        let writers: Vec<_> = (0..4u64)
            .map(|n| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let cache = FileLockerCache::new(path);
                    for i in 0..25u64 {
                        let key = format!("0x{:040x}", n * 100 + i);
                        cache.put(&key, Address::repeat_byte(0x42), TokenId::from(i));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc[CACHE_NAMESPACE].as_object().is_some_and(|entries| !entries.is_empty()));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_unwritable_location_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // parent "directory" is a regular file, so every write fails
        let cache = FileLockerCache::new(blocker.join("lockers.json"));

        cache.put(TOKEN, locker(), TokenId::from(1u64));
        assert!(cache.get(TOKEN).is_none());
    }

    #[test]
    fn test_noop_cache() {
        let cache = NoopCache;
        cache.put(TOKEN, locker(), TokenId::from(1u64));
        assert!(cache.get(TOKEN).is_none());
    }
}
