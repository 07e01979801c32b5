//! Recency Cache
//!
//! Fixed-capacity LRU map. Entries live in a dense slab and are threaded
//! through an index-linked doubly linked list (most recent at the head), so
//! lookups, promotion and eviction are all O(1).

use hashbrown::HashMap;
use std::hash::Hash;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Least-recently-used cache with a hard entry limit
#[derive(Debug)]
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    entries: Vec<Entry<K, V>>,
    /// Most recently used
    head: usize,
    /// Least recently used
    tail: usize,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache holding at most `capacity` entries (0 stores nothing)
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `key` and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&self.entries[idx].value)
    }

    /// Like [`get`](Self::get) but hands out a mutable reference
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&mut self.entries[idx].value)
    }

    /// Insert or overwrite `key`, making it most recently used.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&idx) = self.map.get(&key) {
            self.entries[idx].value = value;
            self.promote(idx);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.entries.len();
        self.entries.push(Entry {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.attach_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    /// Drop `key`, returning its value if it was cached
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        Some(self.remove_at(idx).1)
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.map.clear();
        self.entries.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Iterate from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cache: self,
            cursor: self.head,
        }
    }

    fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.map.remove(&self.entries[idx].key);
        Some(self.remove_at(idx))
    }

    /// Unlink and swap-remove the slab slot, repointing the entry that moves in.
    fn remove_at(&mut self, idx: usize) -> (K, V) {
        self.detach(idx);
        let last = self.entries.len() - 1;
        let entry = self.entries.swap_remove(idx);

        if idx != last {
            let (prev, next) = (self.entries[idx].prev, self.entries[idx].next);
            if prev != NIL {
                self.entries[prev].next = idx;
            } else {
                self.head = idx;
            }
            if next != NIL {
                self.entries[next].prev = idx;
            } else {
                self.tail = idx;
            }
            if let Some(slot) = self.map.get_mut(&self.entries[idx].key) {
                *slot = idx;
            }
        }

        (entry.key, entry.value)
    }

    fn promote(&mut self, idx: usize) {
        if self.head != idx {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.entries[idx].prev, self.entries[idx].next);
        if prev != NIL {
            self.entries[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.entries[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        self.entries[idx].prev = NIL;
        self.entries[idx].next = self.head;
        if self.head != NIL {
            self.entries[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let entry = &self.cache.entries[self.cursor];
        self.cursor = entry.next;
        Some((&entry.key, &entry.value))
    }
}
