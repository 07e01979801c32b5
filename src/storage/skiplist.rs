//! Skip List Engine
//!
//! Ordered key-value index combining the arena [`NodeStore`], a key → node
//! lookup table, a recency cache and a TTL policy.
//!
//! # Locking
//!
//! The node store and lookup table sit behind one instance-owned `RwLock`.
//! `insert`, `delete` and the delete half of a sweep take it exclusively, so
//! writers are serialized. `search` and the sweep scan only read; access
//! stamps are atomics so a successful read can refresh them under the shared
//! guard. The recency cache has its own mutex, always acquired after (never
//! before) the structure guard.
//!
//! # Insert semantics
//!
//! Inserting a key that is already present does **not** replace its value.
//! It only refreshes the access stamp and re-caches the stored value. Callers
//! wanting upsert behaviour must `delete` first.

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{Debug, Display, Write as _};
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::debug;

use super::expiry::ExpirationPolicy;
use super::lru::LruCache;
use super::node::{NodeId, NodeStore};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{Metrics, Op};

/// Result of [`SkipList::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new node was linked in
    Inserted,
    /// The key was present; its value is unchanged and its access time refreshed
    AlreadyExists,
}

/// Cached copy of a value with the instant it was last confirmed live
#[derive(Debug, Clone)]
struct Cached<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
struct Inner<K, V> {
    nodes: NodeStore<K, V>,
    /// Mirrors node store membership; drives sweeps and cache-hit refresh
    index: HashMap<K, NodeId>,
    rng: StdRng,
}

/// Concurrent skip list with LRU read cache and per-entry TTL
#[derive(Debug)]
pub struct SkipList<K, V> {
    inner: RwLock<Inner<K, V>>,
    cache: Mutex<LruCache<K, Cached<V>>>,
    policy: ExpirationPolicy,
    config: Config,
    metrics: Metrics,
}

impl<K, V> SkipList<K, V>
where
    K: Ord + Hash + Clone + Debug,
    V: Clone + Debug,
{
    /// Build an empty list from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            max_level = config.max_level,
            ttl = ?config.ttl,
            cache_capacity = config.cache_capacity,
            "Created skip list"
        );

        Ok(Self {
            inner: RwLock::new(Inner {
                nodes: NodeStore::new(config.max_level),
                index: HashMap::new(),
                rng,
            }),
            cache: Mutex::new(LruCache::new(config.cache_capacity)),
            policy: ExpirationPolicy::new(config.ttl),
            config,
            metrics: Metrics::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn ttl(&self) -> Duration {
        self.policy.ttl()
    }

    /// Number of live nodes (expired but not yet collected ones included)
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current top level in use
    pub fn level(&self) -> usize {
        self.inner.read().nodes.level()
    }

    pub fn max_level(&self) -> usize {
        self.config.max_level
    }

    /// Number of entries currently held by the recency cache
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Insert `key` unless it already exists.
    ///
    /// An existing key keeps its stored value; only its access time and
    /// cache position are refreshed.
    pub fn insert(&self, key: K, value: V) -> InsertOutcome {
        let start = Instant::now();
        let outcome = self.insert_at(key, value, start);
        self.metrics.record_operation(Op::Insert, start.elapsed());
        outcome
    }

    fn insert_at(&self, key: K, value: V, now: Instant) -> InsertOutcome {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let (mut update, found) = inner.nodes.find_predecessors(&key);

        if let Some(id) = found {
            inner.nodes.touch(id, now);
            let existing = inner.nodes.node(id).value.clone();
            debug!(?key, value = ?existing, "Key exists, refreshed access time");
            self.cache.lock().put(
                key,
                Cached {
                    value: existing,
                    stored_at: now,
                },
            );
            return InsertOutcome::AlreadyExists;
        }

        let level = random_level(&mut inner.rng, self.config.max_level);
        debug!(?key, ?value, level, "Inserted key");

        let id = inner
            .nodes
            .link(&mut update, key.clone(), value.clone(), level, now);
        inner.index.insert(key.clone(), id);
        self.cache.lock().put(
            key,
            Cached {
                value,
                stored_at: now,
            },
        );

        InsertOutcome::Inserted
    }

    /// Look up `key`.
    ///
    /// The recency cache answers first. On a miss the list is walked; an
    /// entry past its TTL is deleted on the spot and reported absent. Any
    /// successful lookup refreshes the entry's access time.
    pub fn search(&self, key: &K) -> Option<V> {
        let start = Instant::now();
        let found = self.lookup(key, start);
        self.metrics.record_operation(Op::Search, start.elapsed());
        found
    }

    fn lookup(&self, key: &K, now: Instant) -> Option<V> {
        if let Some(value) = self.cached(key, now) {
            self.metrics.record_cache_hit();
            let inner = self.inner.read();
            if let Some(&id) = inner.index.get(key) {
                inner.nodes.touch(id, now);
            }
            debug!(?key, "Cache hit");
            return Some(value);
        }
        self.metrics.record_cache_miss();

        {
            let inner = self.inner.read();
            let Some(id) = inner.nodes.find(key) else {
                debug!(?key, "Key not found");
                return None;
            };
            if let Some(ttl_left) = self.policy.remaining(inner.nodes.last_access(id), now) {
                inner.nodes.touch(id, now);
                let value = inner.nodes.node(id).value.clone();
                debug!(?key, ?value, ?ttl_left, "Found key, access time refreshed");
                self.cache.lock().put(
                    key.clone(),
                    Cached {
                        value: value.clone(),
                        stored_at: now,
                    },
                );
                return Some(value);
            }
        }

        // Shared guard is released; removal re-checks expiry under the write guard
        self.expire(key);
        None
    }

    /// Cache lookup; stale copies are ignored rather than served
    fn cached(&self, key: &K, now: Instant) -> Option<V> {
        let mut cache = self.cache.lock();
        let entry = cache.get_mut(key)?;
        if self.policy.is_expired(entry.stored_at, now) {
            return None;
        }
        entry.stored_at = now;
        Some(entry.value.clone())
    }

    /// Remove `key`. Returns whether it was present; absent keys are a no-op.
    pub fn delete(&self, key: &K) -> bool {
        let start = Instant::now();
        let removed = self.remove_if(key, |_, _| true);
        self.metrics.record_operation(Op::Delete, start.elapsed());
        removed
    }

    /// Exclusive-guard removal, gated by `check` evaluated under the guard
    fn remove_if<F>(&self, key: &K, check: F) -> bool
    where
        F: FnOnce(&NodeStore<K, V>, NodeId) -> bool,
    {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let (update, found) = inner.nodes.find_predecessors(key);
        let Some(id) = found else {
            return false;
        };
        if !check(&inner.nodes, id) {
            return false;
        }

        inner.nodes.unlink(&update, id);
        inner.index.remove(key);
        self.cache.lock().remove(key);
        debug!(?key, "Deleted key");
        true
    }

    fn expire(&self, key: &K) -> bool {
        let removed = self.remove_if(key, |nodes, id| {
            self.policy.is_expired(nodes.last_access(id), Instant::now())
        });
        if removed {
            self.metrics.record_expired(1);
        }
        removed
    }

    /// Eagerly remove every expired entry, returning how many were dropped.
    ///
    /// Candidates are collected under the shared guard, then each one is
    /// removed through a separate exclusive acquisition. A key refreshed in
    /// between survives.
    pub fn sweep_expired(&self) -> usize {
        let start = Instant::now();

        let candidates: Vec<K> = {
            let inner = self.inner.read();
            inner
                .index
                .iter()
                .filter(|&(_, &id)| self.policy.is_expired(inner.nodes.last_access(id), start))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let removed = candidates.iter().filter(|key| self.expire(key)).count();
        self.metrics.record_operation(Op::Sweep, start.elapsed());
        if removed > 0 {
            debug!(removed, candidates = candidates.len(), "Swept expired keys");
        }
        removed
    }

    /// Membership check that neither consults the cache nor refreshes or
    /// expires anything
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().nodes.find(key).is_some()
    }

    /// Level-0 snapshot in ascending key order, expired entries included
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .read()
            .nodes
            .iter()
            .map(|node| (node.key.clone(), node.value.clone()))
            .collect()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().nodes.iter().map(|node| node.key.clone()).collect()
    }

    /// Drop every entry and empty the cache
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.nodes.clear();
        inner.index.clear();
        self.cache.lock().clear();
        debug!("Cleared skip list");
    }
}

impl<K, V> SkipList<K, V>
where
    K: Ord + Hash + Clone + Debug + Display,
    V: Clone + Debug + Display,
{
    /// Human-readable dump of every level, bottom up
    pub fn render(&self) -> String {
        let inner = self.inner.read();
        let mut out = String::from("*****Skip List*****\n");
        for lvl in 0..=inner.nodes.level() {
            let _ = write!(out, "Level {}: ", lvl);
            for node in inner.nodes.iter_level(lvl) {
                let _ = write!(out, "{}{}{};", node.key, self.config.delimiter, node.value);
            }
            out.push('\n');
        }
        out
    }
}

/// Geometric level draw: start at 1, climb on each heads, cap at `max_level`.
fn random_level<R: Rng>(rng: &mut R, max_level: usize) -> usize {
    let mut level = 1;
    while level < max_level && rng.gen_bool(0.5) {
        level += 1;
    }
    level
}
