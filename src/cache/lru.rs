//! LRU List Module
//!
//! Recency ordering for the bounded store, kept as a doubly-linked list
//! threaded through an arena of entry slots so that every operation is O(1).

use crate::cache::entry::CacheEntry;

// == LRU List ==
/// Arena-backed doubly-linked list of cache entries ordered by recency.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Removed slots go onto a free list and are reused by later pushes, so the
/// arena never grows past the peak number of live entries.
#[derive(Debug)]
pub(crate) struct LruList<K, V> {
    /// Entry slots, None when free
    slots: Vec<Option<CacheEntry<K, V>>>,
    /// Indices of free slots
    free: Vec<usize>,
    /// Most recently used slot
    head: Option<usize>,
    /// Least recently used slot
    tail: Option<usize>,
    /// Number of live entries
    len: usize,
}

impl<K, V> Default for LruList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LruList<K, V> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Stores an entry as the most recently used and returns its slot.
    pub fn push_front(&mut self, mut entry: CacheEntry<K, V>) -> usize {
        entry.prev = None;
        entry.next = self.head;

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            if let Some(node) = self.slot_mut(old_head) {
                node.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
        idx
    }

    // == Touch ==
    /// Marks a slot as most recently used.
    pub fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) || self.get(idx).is_none() {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    // == Remove ==
    /// Unlinks a slot and hands back its entry.
    pub fn remove(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        self.get(idx)?;
        self.detach(idx);
        let entry = self.slots[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(entry)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<CacheEntry<K, V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Oldest ==
    /// Returns the least recently used entry without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&CacheEntry<K, V>> {
        self.tail.and_then(|idx| self.get(idx))
    }

    // == Accessors ==
    pub fn get(&self, idx: usize) -> Option<&CacheEntry<K, V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K, V>> {
        self.slot_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every entry and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates entries from least to most recently used.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &CacheEntry<K, V>> + '_ {
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let entry = self.get(cursor?)?;
            cursor = entry.prev;
            Some(entry)
        })
    }

    // == Internal: Linking ==
    fn slot_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K, V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Unlinks a live slot from its neighbours without freeing it.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.get(idx) {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slot_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slot_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slot_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Links a detached live slot in at the head.
    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.slot_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(node) = self.slot_mut(h) {
                node.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }
}
