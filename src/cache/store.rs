//! Concurrent Store Module
//!
//! Main store engine: a HashMap behind a single reader/writer lock, plus the
//! purge protocol that reclaims expired entries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::cache::stats::StatsCounters;
use crate::cache::{Entry, StoreStats};
use crate::config::StoreConfig;
use crate::error::Result;

// == Concurrent Store ==
/// Thread-safe key/value store with per-entry TTL.
///
/// Reads take the lock in shared mode; writes, deletes and each individual
/// purge removal take it exclusively. Lookups do not evict: an expired entry
/// stays visible until a purge sweep removes it, so callers wanting tighter
/// expiry should use a shorter purge interval.
///
/// Share the store as `Arc<ConcurrentStore>` and drive the purge loop with
/// [`crate::spawn_purge_task`] or [`ConcurrentStore::run_purge_loop`].
#[derive(Debug)]
pub struct ConcurrentStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, Entry>>,
    /// Lookup and purge counters
    stats: StatsCounters,
    /// Validated configuration
    config: StoreConfig,
}

impl ConcurrentStore {
    // == Constructors ==
    /// Creates a store from a configuration, rejecting a zero purge interval.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Store created: purge_interval={:?}, default_expiration={:?}",
            config.purge_interval, config.default_expiration
        );

        Ok(Self {
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
            config,
        })
    }

    /// Starts building a store. The purge interval must be set before `build`.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // == Get ==
    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.get_entry(key).map(Entry::into_value)
    }

    /// Returns a copy of the full entry stored under `key`, if any.
    pub fn get_entry(&self, key: &str) -> Option<Entry> {
        let entry = self.entries.read().get(key).cloned();
        self.stats.record_lookup(entry.is_some());
        entry
    }

    /// Returns true if `key` is currently stored.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    // == Set ==
    /// Stores `value` under `key` with the default expiration.
    ///
    /// Overwrites any existing entry and resets its creation time.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.set_entry(key, Entry::new(value, self.config.default_expiration));
    }

    /// Stores a caller-built entry under `key`.
    ///
    /// The default expiration is not applied; a zero TTL or the never-expire
    /// flag keeps the entry until it is deleted. The creation time is always
    /// restamped.
    pub fn set_entry(&self, key: impl Into<String>, entry: Entry) {
        let entry = entry.stamped();
        self.entries.write().insert(key.into(), entry);
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    // == Purge ==
    /// Runs a single purge sweep and returns the number of entries removed.
    ///
    /// Candidates are collected under the read lock, which is released before
    /// anything is removed. Each removal then takes the write lock on its own
    /// and re-checks expiry, so a key re-set between scan and removal keeps
    /// its fresh value.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let candidates: Vec<String> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let removed = candidates
            .iter()
            .filter(|key| self.remove_if_expired(key))
            .count();

        self.stats.record_purged(removed);
        removed
    }

    fn remove_if_expired(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        let expired = entries.get(key).is_some_and(Entry::is_expired);
        if expired {
            entries.remove(key);
            trace!("Purged expired key {}", key);
        }
        expired
    }

    /// Periodically purges expired entries until `cancel` fires.
    ///
    /// The timer is re-armed after every sweep. Cancellation is observed
    /// immediately and stops the loop without a further sweep; stored entries
    /// are left untouched. Run at most one loop per store.
    pub async fn run_purge_loop(&self, cancel: CancellationToken) {
        let interval = self.config.purge_interval;
        info!("Starting purge loop with interval of {:?}", interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {
                    let removed = self.purge_expired();
                    if removed > 0 {
                        info!("Purge: removed {} expired entries", removed);
                    } else {
                        debug!("Purge: no expired entries found");
                    }
                }
            }
        }

        info!("Purge loop stopped");
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unpurged included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// == Store Builder ==
/// Builder for [`ConcurrentStore`].
///
/// ```
/// use std::time::Duration;
/// use ttl_store::ConcurrentStore;
///
/// let store = ConcurrentStore::builder()
///     .with_purge_interval(Duration::from_secs(1))
///     .with_default_expiration(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// store.set("greeting", "hello");
/// assert_eq!(store.get("greeting").unwrap().as_ref(), b"hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    purge_interval: Duration,
    default_expiration: Duration,
}

impl StoreBuilder {
    /// Sets the sweep period. Required; must be non-zero.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval;
        self
    }

    /// Sets the TTL applied by `set`. Zero (the default) means no expiry.
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Validates the configuration and creates the store.
    pub fn build(self) -> Result<ConcurrentStore> {
        ConcurrentStore::new(StoreConfig {
            purge_interval: self.purge_interval,
            default_expiration: self.default_expiration,
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::sync::Arc;
    use std::thread::sleep;
    use tokio_test::{assert_pending, assert_ready};

    fn test_store() -> ConcurrentStore {
        ConcurrentStore::builder()
            .with_purge_interval(Duration::from_millis(20))
            .with_default_expiration(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_purge_interval() {
        let result = ConcurrentStore::builder()
            .with_default_expiration(Duration::from_secs(30))
            .build();
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_new() {
        let store = test_store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.config().purge_interval, Duration::from_millis(20));
    }

    #[test]
    fn test_store_set_and_get() {
        let store = test_store();

        assert!(store.get("DeckardCain").is_none());
        store.set("DeckardCain", "Stay awhile, and listen..");

        let value = store.get("DeckardCain").unwrap();
        assert_eq!(value.as_ref(), b"Stay awhile, and listen..");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_default_ttl_applied() {
        let store = test_store();
        store.set("key1", "value1");

        let entry = store.get_entry("key1").unwrap();
        assert_eq!(entry.ttl(), Duration::from_secs(30));
        assert!(entry.created_at().timestamp_millis() > 0);
    }

    #[test]
    fn test_store_no_default_ttl() {
        let store = ConcurrentStore::new(StoreConfig::new(Duration::from_millis(20))).unwrap();
        store.set("key1", "value1");

        let entry = store.get_entry("key1").unwrap();
        assert!(entry.never_expire());
        assert_eq!(entry.ttl(), Duration::ZERO);
    }

    #[test]
    fn test_set_entry_ignores_default_ttl() {
        let store = test_store();
        store.set_entry("key1", Entry::new("value1", Duration::from_secs(5)));
        store.set_entry("key2", Entry::never_expiring("value2"));

        assert_eq!(store.get_entry("key1").unwrap().ttl(), Duration::from_secs(5));
        assert_eq!(store.get_entry("key2").unwrap().ttl(), Duration::ZERO);
    }

    #[test]
    fn test_store_delete() {
        let store = test_store();

        store.set("key1", "value1");
        store.delete("key1");

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let store = test_store();
        store.delete("nonexistent");
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite_resets_creation_time() {
        let store = test_store();

        store.set("key1", "value1");
        let first = store.get_entry("key1").unwrap().created_at();
        sleep(Duration::from_millis(5));
        store.set("key1", "value2");

        let entry = store.get_entry("key1").unwrap();
        assert_eq!(entry.value().as_ref(), b"value2");
        assert!(entry.created_at() > first);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_does_not_evict_expired() {
        let store = test_store();
        store.set_entry("key1", Entry::new("value1", Duration::from_millis(1)));

        sleep(Duration::from_millis(10));

        let entry = store.get_entry("key1").unwrap();
        assert!(entry.is_expired());
        assert!(store.contains_key("key1"));
    }

    #[test]
    fn test_store_purge_expired() {
        let store = test_store();

        store.set_entry("short", Entry::new("value1", Duration::from_millis(1)));
        store.set_entry("long", Entry::new("value2", Duration::from_secs(10)));
        store.set_entry("forever", Entry::never_expiring("value3"));

        sleep(Duration::from_millis(10));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("short").is_none());
        assert!(store.get("long").is_some());
        assert!(store.get("forever").is_some());
        assert_eq!(store.stats().purged, 1);
    }

    #[test]
    fn test_purge_keeps_key_reset_after_scan() {
        let store = test_store();
        store.set_entry("key1", Entry::new("old", Duration::from_millis(1)));
        sleep(Duration::from_millis(10));

        // Simulates a write landing between the scan and the removal.
        store.set("key1", "new");
        assert!(!store.remove_if_expired("key1"));
        assert_eq!(store.get("key1").unwrap().as_ref(), b"new");
    }

    #[test]
    fn test_store_stats() {
        let store = test_store();

        store.set("key1", "value1");
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_purge_loop_removes_expired_entries() {
        let store = Arc::new(test_store());
        store.set_entry("expire_soon", Entry::new("value", Duration::from_millis(1)));
        store.set_entry("long_lived", Entry::new("value", Duration::from_secs(20)));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let store = Arc::clone(&store);
            let cancel = cancel.clone();
            async move { store.run_purge_loop(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.get("expire_soon").is_none());
        assert!(store.get("long_lived").is_some());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_loop_pending_until_cancelled() {
        let store = test_store();
        let cancel = CancellationToken::new();

        let mut task = tokio_test::task::spawn(store.run_purge_loop(cancel.clone()));
        assert_pending!(task.poll());

        cancel.cancel();
        assert!(task.is_woken());
        assert_ready!(task.poll());
    }

    #[tokio::test]
    async fn test_purge_loop_returns_when_already_cancelled() {
        let store = ConcurrentStore::builder()
            .with_purge_interval(Duration::from_secs(3600))
            .build()
            .unwrap();
        store.set_entry("key1", Entry::new("value1", Duration::from_millis(1)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        store.run_purge_loop(cancel).await;

        // Cancellation leaves stored entries alone.
        assert!(store.contains_key("key1"));
    }
}
