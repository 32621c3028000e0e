//! Versioned query cache store
//!
//! Uses `tokio::sync::RwLock` for concurrent access in async contexts. Each
//! entry carries a monotonically increasing version so a rollback whose
//! snapshot predates a newer completed mutation is rejected per key instead
//! of clobbering the newer value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::key::QueryKey;

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    value: Option<Value>,
    /// Bumped on every write to this key, including invalidation.
    version: u64,
    stale: bool,
    fetched_at: Option<Instant>,
    /// Bumped when in-flight fetches for this key are cancelled; a completing
    /// fetch whose ticket carries an older generation is discarded.
    fetch_generation: u64,
}

#[derive(Debug)]
struct CacheStorage {
    entries: HashMap<QueryKey, CacheEntry>,
    revision: u64,
}

/// Ticket handed out when a background fetch begins; required to complete it.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

/// Read-only capture of entry values, taken before an optimistic edit.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    entries: Vec<(QueryKey, Option<Value>, bool)>,
}

impl CacheSnapshot {
    /// Captured value for a key, if the key was part of the snapshot.
    pub fn value(&self, key: &QueryKey) -> Option<&Option<Value>> {
        self.entries.iter().find(|(k, _, _)| k == key).map(|(_, v, _)| v)
    }
}

/// Staged optimistic mutation: the pre-edit snapshot plus the versions the
/// optimistic writes produced, used to validate the later rollback.
#[derive(Debug)]
pub struct StagedMutation {
    snapshot: CacheSnapshot,
    written_versions: Vec<(QueryKey, u64)>,
}

impl StagedMutation {
    /// Keys affected by this mutation.
    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.written_versions.iter().map(|(k, _)| k)
    }

    /// The pre-mutation snapshot.
    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }
}

/// Shared, versioned query cache.
///
/// Cloning shares the underlying storage. The handle is injected explicitly
/// wherever it is needed; there is no ambient singleton.
pub struct QueryCache<C = SystemClock>
where
    C: Clock + Clone,
{
    storage: Arc<RwLock<CacheStorage>>,
    freshness: Duration,
    clock: C,
    revision_tx: Arc<watch::Sender<u64>>,
}

impl QueryCache<SystemClock> {
    /// Create a cache with the given freshness window and the system clock.
    pub fn new(freshness: Duration) -> Self {
        Self::with_clock(freshness, SystemClock)
    }
}

impl<C> QueryCache<C>
where
    C: Clock + Clone,
{
    /// Create a cache with a custom clock (useful for testing).
    pub fn with_clock(freshness: Duration, clock: C) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            storage: Arc::new(RwLock::new(CacheStorage {
                entries: HashMap::new(),
                revision: 0,
            })),
            freshness,
            clock,
            revision_tx: Arc::new(revision_tx),
        }
    }

    /// Last known value for a key, optimistic or confirmed.
    pub async fn get(&self, key: &QueryKey) -> Option<Value> {
        let storage = self.storage.read().await;
        storage.entries.get(key).and_then(|e| e.value.clone())
    }

    /// Whether a key holds a confirmed value inside its freshness window.
    ///
    /// Stale or never-fetched keys report `false`; the next access should
    /// trigger a background refetch.
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let storage = self.storage.read().await;
        let Some(entry) = storage.entries.get(key) else {
            return false;
        };
        if entry.stale || entry.value.is_none() {
            return false;
        }
        match entry.fetched_at {
            Some(at) => self.clock.now().duration_since(at) < self.freshness,
            None => false,
        }
    }

    /// Current version of a key (0 for keys never written).
    pub async fn version(&self, key: &QueryKey) -> u64 {
        let storage = self.storage.read().await;
        storage.entries.get(key).map_or(0, |e| e.version)
    }

    /// Store a server-confirmed value for a key.
    pub async fn put(&self, key: QueryKey, value: Value) {
        let mut storage = self.storage.write().await;
        let now = self.clock.now();
        let entry = storage.entries.entry(key).or_default();
        entry.value = Some(value);
        entry.version += 1;
        entry.stale = false;
        entry.fetched_at = Some(now);
        self.bump_revision(&mut storage);
    }

    /// Mark a key stale so the next access triggers a refetch.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut storage = self.storage.write().await;
        Self::invalidate_entry(&mut storage, key);
        self.bump_revision(&mut storage);
    }

    /// Begin a background fetch for a key.
    ///
    /// The returned ticket is bound to the key's current fetch generation;
    /// a later [`Self::cancel_in_flight`] invalidates it.
    pub async fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let storage = self.storage.read().await;
        let generation = storage.entries.get(key).map_or(0, |e| e.fetch_generation);
        FetchTicket { key: key.clone(), generation }
    }

    /// Complete a background fetch.
    ///
    /// Returns `false` (and stores nothing) when the ticket's generation was
    /// cancelled while the fetch was in flight, so a stale response can never
    /// overwrite an optimistic value.
    pub async fn complete_fetch(&self, ticket: FetchTicket, value: Value) -> bool {
        let mut storage = self.storage.write().await;
        let now = self.clock.now();
        let entry = storage.entries.entry(ticket.key.clone()).or_default();
        if entry.fetch_generation != ticket.generation {
            debug!(key = %ticket.key, "discarding cancelled in-flight fetch result");
            return false;
        }
        entry.value = Some(value);
        entry.version += 1;
        entry.stale = false;
        entry.fetched_at = Some(now);
        self.bump_revision(&mut storage);
        true
    }

    /// Cancel outstanding background fetches for a key.
    pub async fn cancel_in_flight(&self, key: &QueryKey) {
        let mut storage = self.storage.write().await;
        storage.entries.entry(key.clone()).or_default().fetch_generation += 1;
    }

    /// Read-only capture of the current values of a key set.
    pub async fn snapshot(&self, keys: &[QueryKey]) -> CacheSnapshot {
        let storage = self.storage.read().await;
        let entries = keys
            .iter()
            .map(|key| {
                let entry = storage.entries.get(key);
                (
                    key.clone(),
                    entry.and_then(|e| e.value.clone()),
                    entry.is_some_and(|e| e.stale),
                )
            })
            .collect();
        CacheSnapshot { entries }
    }

    /// Stage an optimistic mutation over a key set.
    ///
    /// Under a single write guard: cancels in-flight fetches for the keys,
    /// snapshots their current values, applies the optimistic transform, and
    /// records the written versions. The single guard means no other write
    /// interleaves between snapshot and optimistic apply.
    pub async fn stage<F>(&self, keys: &[QueryKey], transform: F) -> StagedMutation
    where
        F: Fn(&QueryKey, Option<Value>) -> Option<Value>,
    {
        let mut storage = self.storage.write().await;
        let mut snapshot_entries = Vec::with_capacity(keys.len());
        let mut written_versions = Vec::with_capacity(keys.len());

        for key in keys {
            let entry = storage.entries.entry(key.clone()).or_default();
            // Cancellation happens before the snapshot so a stale in-flight
            // response cannot land after a rollback.
            entry.fetch_generation += 1;
            snapshot_entries.push((key.clone(), entry.value.clone(), entry.stale));

            let next = transform(key, entry.value.clone());
            entry.value = next;
            entry.version += 1;
            entry.stale = false;
            written_versions.push((key.clone(), entry.version));
        }
        self.bump_revision(&mut storage);

        StagedMutation { snapshot: CacheSnapshot { entries: snapshot_entries }, written_versions }
    }

    /// Settle a staged mutation after backend confirmation.
    ///
    /// Every affected key is marked stale so the next access refetches ground
    /// truth; the optimistic value is never the final authoritative state.
    pub async fn commit(&self, staged: &StagedMutation) {
        let mut storage = self.storage.write().await;
        for (key, _) in &staged.written_versions {
            Self::invalidate_entry(&mut storage, key);
        }
        self.bump_revision(&mut storage);
    }

    /// Roll a staged mutation back after a backend failure.
    ///
    /// Each key is restored verbatim to its snapshotted value only if its
    /// current version is still the one this mutation wrote; keys rewritten
    /// by a newer mutation in the meantime are left alone. Returns how many
    /// keys were restored.
    pub async fn rollback(&self, staged: &StagedMutation) -> usize {
        let mut storage = self.storage.write().await;
        let mut restored = 0;
        for ((key, written_version), (_, prior_value, prior_stale)) in
            staged.written_versions.iter().zip(&staged.snapshot.entries)
        {
            let entry = storage.entries.entry(key.clone()).or_default();
            if entry.version != *written_version {
                debug!(key = %key, "skipping rollback, key advanced past this mutation");
                continue;
            }
            entry.value = prior_value.clone();
            entry.stale = *prior_stale;
            entry.version += 1;
            restored += 1;
        }
        self.bump_revision(&mut storage);
        restored
    }

    /// Subscribe to change notifications (global revision counter).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    fn invalidate_entry(storage: &mut CacheStorage, key: &QueryKey) {
        let entry = storage.entries.entry(key.clone()).or_default();
        entry.stale = true;
        entry.version += 1;
    }

    fn bump_revision(&self, storage: &mut CacheStorage) {
        storage.revision += 1;
        let _ = self.revision_tx.send(storage.revision);
    }
}

impl<C> Clone for QueryCache<C>
where
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            freshness: self.freshness,
            clock: self.clock.clone(),
            revision_tx: Arc::clone(&self.revision_tx),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cache::MockClock;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn put_and_get_round_trip() {
        let cache = cache();
        let key = QueryKey::estimates_active();

        cache.put(key.clone(), json!([{"id": "e1"}])).await;
        assert_eq!(cache.get(&key).await, Some(json!([{"id": "e1"}])));
        assert!(cache.is_fresh(&key).await);
    }

    #[tokio::test]
    async fn invalidate_marks_stale_but_keeps_value() {
        let cache = cache();
        let key = QueryKey::estimates_active();

        cache.put(key.clone(), json!([1, 2])).await;
        cache.invalidate(&key).await;

        assert!(!cache.is_fresh(&key).await);
        assert_eq!(cache.get(&key).await, Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn freshness_window_expires() {
        let clock = MockClock::new();
        let cache = QueryCache::with_clock(Duration::from_secs(60), clock.clone());
        let key = QueryKey::invoices();

        cache.put(key.clone(), json!([])).await;
        assert!(cache.is_fresh(&key).await);

        clock.advance(Duration::from_secs(61));
        assert!(!cache.is_fresh(&key).await);
    }

    #[tokio::test]
    async fn cancelled_fetch_result_is_discarded() {
        let cache = cache();
        let key = QueryKey::estimates_trash();

        cache.put(key.clone(), json!([{"id": "e1"}])).await;
        let ticket = cache.begin_fetch(&key).await;

        // Optimistic edit cancels the in-flight fetch before snapshotting.
        let staged = cache.stage(&[key.clone()], |_, _| Some(json!([]))).await;
        cache.rollback(&staged).await;

        let applied = cache.complete_fetch(ticket, json!([{"id": "stale"}])).await;
        assert!(!applied);
        assert_eq!(cache.get(&key).await, Some(json!([{"id": "e1"}])));
    }

    #[tokio::test]
    async fn fetch_without_cancellation_applies() {
        let cache = cache();
        let key = QueryKey::users();

        let ticket = cache.begin_fetch(&key).await;
        let applied = cache.complete_fetch(ticket, json!([{"id": "u1"}])).await;
        assert!(applied);
        assert_eq!(cache.get(&key).await, Some(json!([{"id": "u1"}])));
    }

    #[tokio::test]
    async fn rollback_restores_snapshot_verbatim() {
        let cache = cache();
        let key = QueryKey::estimates_trash();
        let original = json!([{"id": "e1", "status": "draft"}]);

        cache.put(key.clone(), original.clone()).await;
        let staged = cache.stage(&[key.clone()], |_, _| Some(json!([]))).await;
        assert_eq!(cache.get(&key).await, Some(json!([])));

        let restored = cache.rollback(&staged).await;
        assert_eq!(restored, 1);
        assert_eq!(cache.get(&key).await, Some(original));
        assert!(cache.is_fresh(&key).await);
    }

    #[tokio::test]
    async fn rollback_restores_missing_entry_to_missing() {
        let cache = cache();
        let key = QueryKey::estimates_active();

        let staged = cache.stage(&[key.clone()], |_, _| Some(json!(["x"]))).await;
        cache.rollback(&staged).await;

        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    async fn stale_rollback_does_not_clobber_newer_mutation() {
        let cache = cache();
        let key = QueryKey::estimates_active();

        cache.put(key.clone(), json!(["a", "b"])).await;
        let first = cache.stage(&[key.clone()], |_, _| Some(json!(["b"]))).await;

        // A second mutation on the same key settles first.
        let second = cache.stage(&[key.clone()], |_, _| Some(json!([]))).await;
        cache.commit(&second).await;

        // The first mutation's rollback is now stale and must be rejected.
        let restored = cache.rollback(&first).await;
        assert_eq!(restored, 0);
        assert_eq!(cache.get(&key).await, Some(json!([])));
    }

    #[tokio::test]
    async fn commit_marks_every_staged_key_stale() {
        let cache = cache();
        let keys = [QueryKey::estimates_active(), QueryKey::estimates_trash()];

        cache.put(keys[0].clone(), json!(["a"])).await;
        cache.put(keys[1].clone(), json!(["t"])).await;

        let staged = cache.stage(&keys, |_, v| v).await;
        cache.commit(&staged).await;

        assert!(!cache.is_fresh(&keys[0]).await);
        assert!(!cache.is_fresh(&keys[1]).await);
    }

    #[tokio::test]
    async fn subscribe_sees_revision_bumps() {
        let cache = cache();
        let mut rx = cache.subscribe();
        let initial = *rx.borrow();

        cache.put(QueryKey::invoices(), json!([])).await;
        rx.changed().await.unwrap();
        assert!(*rx.borrow() > initial);
    }

    #[tokio::test]
    async fn clone_shares_storage() {
        let cache1 = cache();
        let cache2 = cache1.clone();
        let key = QueryKey::users();

        cache1.put(key.clone(), json!([1])).await;
        assert_eq!(cache2.get(&key).await, Some(json!([1])));
    }
}
