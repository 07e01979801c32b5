//! Node Store
//!
//! Arena of skip list nodes addressed by stable indices. Level 0 threads
//! every live node in ascending key order; higher levels are sparser express
//! lanes over the same nodes. A header row of `max_level + 1` entry points
//! stands in for the sentinel node.
//!
//! ```text
//! Level 2:  HEAD ──────────────► 30 ─────────────► NIL
//! Level 1:  HEAD ──► 10 ───────► 30 ──► 40 ──────► NIL
//! Level 0:  HEAD ──► 10 ──► 20 ─► 30 ──► 40 ──► 50 ► NIL
//! ```
//!
//! The store knows nothing about caching or expiry; it only records a
//! last-access stamp per node that the engine reads and refreshes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Stable index of a node inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Position reached while walking down the levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pos {
    Head,
    Node(NodeId),
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub key: K,
    pub value: V,
    /// `forward[i]` is the successor at level i; length is `level + 1`
    forward: Box<[Option<NodeId>]>,
    /// Nanoseconds since the store epoch
    last_access: AtomicU64,
}

impl<K, V> Node<K, V> {
    /// Highest level this node participates in
    pub fn level(&self) -> usize {
        self.forward.len() - 1
    }
}

#[derive(Debug)]
pub(crate) struct NodeStore<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Box<[Option<NodeId>]>,
    /// Current top level in use
    level: usize,
    len: usize,
    epoch: Instant,
}

impl<K: Ord, V> NodeStore<K, V> {
    pub fn new(max_level: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: vec![None; max_level + 1].into_boxed_slice(),
            level: 0,
            len: 0,
            epoch: Instant::now(),
        }
    }

    pub fn max_level(&self) -> usize {
        self.head.len() - 1
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<K, V> {
        // Ids handed out by the store stay valid until `unlink` releases them
        self.slots[id.0].as_ref().expect("dangling node id")
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.0].as_mut().expect("dangling node id")
    }

    #[inline]
    fn next(&self, pos: Pos, level: usize) -> Option<NodeId> {
        match pos {
            Pos::Head => self.head[level],
            Pos::Node(id) => self.node(id).forward[level],
        }
    }

    #[inline]
    fn set_next(&mut self, pos: Pos, level: usize, to: Option<NodeId>) {
        match pos {
            Pos::Head => self.head[level] = to,
            Pos::Node(id) => self.node_mut(id).forward[level] = to,
        }
    }

    /// Top-down scan recording the last node before `key` on every level.
    ///
    /// Returns the predecessor array (sized `max_level + 1`, header-filled
    /// above the current top level) and the node holding `key`, if any.
    pub fn find_predecessors(&self, key: &K) -> (Vec<Pos>, Option<NodeId>) {
        let mut update = vec![Pos::Head; self.head.len()];
        let mut cur = Pos::Head;

        for lvl in (0..=self.level).rev() {
            while let Some(next) = self.next(cur, lvl) {
                if self.node(next).key < *key {
                    cur = Pos::Node(next);
                } else {
                    break;
                }
            }
            update[lvl] = cur;
        }

        let found = self.next(cur, 0).filter(|&id| self.node(id).key == *key);
        (update, found)
    }

    /// Locate `key` without recording predecessors
    pub fn find(&self, key: &K) -> Option<NodeId> {
        let mut cur = Pos::Head;
        for lvl in (0..=self.level).rev() {
            while let Some(next) = self.next(cur, lvl) {
                if self.node(next).key < *key {
                    cur = Pos::Node(next);
                } else {
                    break;
                }
            }
        }
        self.next(cur, 0).filter(|&id| self.node(id).key == *key)
    }

    /// Splice a new node of height `level` after the recorded predecessors.
    ///
    /// `update` must come from `find_predecessors` for the same key with no
    /// mutation in between.
    pub fn link(
        &mut self,
        update: &mut [Pos],
        key: K,
        value: V,
        level: usize,
        now: Instant,
    ) -> NodeId {
        debug_assert!(level <= self.max_level());

        if level > self.level {
            for slot in &mut update[self.level + 1..=level] {
                *slot = Pos::Head;
            }
            self.level = level;
        }

        let forward = (0..=level)
            .map(|lvl| self.next(update[lvl], lvl))
            .collect::<Box<[_]>>();

        let id = self.alloc(Node {
            key,
            value,
            forward,
            last_access: AtomicU64::new(self.stamp(now)),
        });

        for (lvl, pos) in update.iter().enumerate().take(level + 1) {
            self.set_next(*pos, lvl, Some(id));
        }

        self.len += 1;
        id
    }

    /// Unlink `id` at every level it appears on and release its slot.
    pub fn unlink(&mut self, update: &[Pos], id: NodeId) -> Node<K, V> {
        debug_assert!(self.node(id).level() <= self.level);
        for lvl in 0..=self.level {
            if self.next(update[lvl], lvl) != Some(id) {
                break;
            }
            let succ = self.node(id).forward[lvl];
            self.set_next(update[lvl], lvl, succ);
        }

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }

        self.len -= 1;
        self.release(id)
    }

    /// Last access time of `id`
    pub fn last_access(&self, id: NodeId) -> Instant {
        let nanos = self.node(id).last_access.load(Ordering::Relaxed);
        self.epoch + Duration::from_nanos(nanos)
    }

    /// Refresh the access stamp; only needs shared access.
    ///
    /// Stamps never move backwards, so a reader holding an older `now` that
    /// lands last cannot shorten the entry's lifetime.
    pub fn touch(&self, id: NodeId, now: Instant) {
        self.node(id)
            .last_access
            .fetch_max(self.stamp(now), Ordering::Relaxed);
    }

    /// Walk level 0 in key order
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_level(0)
    }

    /// Walk one express lane
    pub fn iter_level(&self, level: usize) -> Iter<'_, K, V> {
        Iter {
            store: self,
            level,
            cursor: self.head.get(level).copied().flatten(),
        }
    }

    /// Release every node; runs in a flat loop regardless of list length.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head.iter_mut().for_each(|slot| *slot = None);
        self.level = 0;
        self.len = 0;
    }

    fn stamp(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.epoch).as_nanos() as u64
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.0].take().expect("dangling node id");
        self.free.push(id.0);
        node
    }
}

pub(crate) struct Iter<'a, K, V> {
    store: &'a NodeStore<K, V>,
    level: usize,
    cursor: Option<NodeId>,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Node<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.store.node(id);
        self.cursor = node.forward[self.level];
        Some(node)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Structural invariants every mutation must preserve
    pub(crate) fn assert_well_formed<K: Ord + std::fmt::Debug, V>(store: &NodeStore<K, V>) {
        assert!(store.level() <= store.max_level());
        if store.level() > 0 {
            assert!(store.head[store.level()].is_some(), "empty top level");
        }
        for lvl in store.level() + 1..=store.max_level() {
            assert!(store.head[lvl].is_none(), "link above top level {}", lvl);
        }

        let base: Vec<&K> = store.iter().map(|n| &n.key).collect();
        assert_eq!(base.len(), store.len());
        assert!(base.windows(2).all(|w| w[0] < w[1]), "level 0 out of order");

        for lvl in 1..=store.level() {
            let lane: Vec<&K> = store.iter_level(lvl).map(|n| &n.key).collect();
            assert!(lane.windows(2).all(|w| w[0] < w[1]));
            for key in &lane {
                assert!(base.contains(key), "{:?} on level {} but not level 0", key, lvl);
            }
            assert!(store.iter_level(lvl).all(|n| n.level() >= lvl));
        }
    }

    fn insert(store: &mut NodeStore<u32, &'static str>, key: u32, value: &'static str, level: usize) {
        let (mut update, found) = store.find_predecessors(&key);
        assert!(found.is_none());
        store.link(&mut update, key, value, level, Instant::now());
    }

    fn remove(store: &mut NodeStore<u32, &'static str>, key: u32) -> Option<&'static str> {
        let (update, found) = store.find_predecessors(&key);
        found.map(|id| store.unlink(&update, id).value)
    }

    #[test]
    fn test_link_keeps_order() {
        let mut store = NodeStore::new(4);
        insert(&mut store, 30, "c", 2);
        insert(&mut store, 10, "a", 1);
        insert(&mut store, 20, "b", 3);
        insert(&mut store, 40, "d", 1);

        assert_eq!(store.len(), 4);
        assert_eq!(store.level(), 3);
        let keys: Vec<u32> = store.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![10, 20, 30, 40]);
        let lane: Vec<u32> = store.iter_level(2).map(|n| n.key).collect();
        assert_eq!(lane, vec![20, 30]);
        assert_well_formed(&store);

        let id = store.find(&30).unwrap();
        assert_eq!(store.node(id).value, "c");
        assert!(store.find(&25).is_none());
    }

    #[test]
    fn test_unlink_shrinks_level() {
        let mut store = NodeStore::new(4);
        insert(&mut store, 1, "a", 1);
        insert(&mut store, 2, "b", 4);
        insert(&mut store, 3, "c", 2);
        assert_eq!(store.level(), 4);

        assert_eq!(remove(&mut store, 2), Some("b"));
        assert_eq!(store.level(), 2);
        assert_well_formed(&store);

        assert_eq!(remove(&mut store, 3), Some("c"));
        assert_eq!(store.level(), 1);
        assert_eq!(remove(&mut store, 9), None);

        assert_eq!(remove(&mut store, 1), Some("a"));
        assert_eq!(store.level(), 0);
        assert_eq!(store.len(), 0);
        assert_well_formed(&store);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut store = NodeStore::new(2);
        insert(&mut store, 1, "a", 1);
        insert(&mut store, 2, "b", 1);
        remove(&mut store, 1);
        insert(&mut store, 3, "c", 2);

        assert_eq!(store.slots.len(), 2);
        let keys: Vec<u32> = store.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![2, 3]);
        assert_well_formed(&store);
    }

    #[test]
    fn test_touch_and_clear() {
        let mut store = NodeStore::new(2);
        insert(&mut store, 1, "a", 1);
        let id = store.find(&1).unwrap();

        let later = Instant::now() + Duration::from_secs(5);
        store.touch(id, later);
        let seen = store.last_access(id);
        assert!(seen + Duration::from_millis(1) >= later && seen <= later);

        store.clear();
        assert_eq!(store.len(), 0);
        assert!(store.find(&1).is_none());
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_touch_never_rewinds() {
        let mut store = NodeStore::new(2);
        let t0 = Instant::now();
        let (mut update, _) = store.find_predecessors(&1);
        let id = store.link(&mut update, 1, "a", 1, t0);

        let newer = t0 + Duration::from_secs(10);
        let older = t0 + Duration::from_secs(3);
        store.touch(id, newer);
        store.touch(id, older);
        assert_eq!(store.last_access(id), newer);

        store.touch(id, t0 + Duration::from_secs(20));
        assert!(store.last_access(id) > newer);
    }

    #[test]
    fn test_long_chain_teardown() {
        let mut store = NodeStore::new(1);
        // Descending keys keep every splice at the front
        for key in (0..100_000u32).rev() {
            let (mut update, _) = store.find_predecessors(&key);
            store.link(&mut update, key, "v", 1, Instant::now());
        }
        assert_eq!(store.len(), 100_000);
        drop(store);
    }
}
