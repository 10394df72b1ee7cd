//  Copyright 2026 ShardCache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! A bounded, byte-accounted LRU store.
//!
//! Not safe for concurrent access on its own — [`crate::sync_cache::SyncCache`]
//! wraps one behind a mutex. Recency order is kept as a doubly linked list
//! threaded through a slab (`Vec<Option<Node<V>>>`), so both "move to
//! front" and "evict the back" are O(1); a side `HashMap` resolves a key
//! to its slab slot.

use std::collections::HashMap;

use ahash::RandomState;
use shardcache_common::Weighted;

const NONE: usize = usize::MAX;

struct Node<V> {
    key: String,
    value: V,
    weight: usize,
    prev: usize,
    next: usize,
}

/// A single-threaded, byte-budgeted LRU cache of `String -> V`.
///
/// `max_bytes == 0` means unbounded: entries are never evicted for size.
pub struct LruStore<V>
where
    V: Weighted + Clone,
{
    max_bytes: u64,
    cur_bytes: u64,
    slab: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize, RandomState>,
    head: usize,
    tail: usize,
    on_evicted: Option<Box<dyn FnMut(&str, &V) + Send + Sync>>,
}

impl<V> LruStore<V>
where
    V: Weighted + Clone,
{
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            cur_bytes: 0,
            slab: Vec::new(),
            free: Vec::new(),
            index: HashMap::default(),
            head: NONE,
            tail: NONE,
            on_evicted: None,
        }
    }

    pub fn with_evict_callback(
        max_bytes: u64,
        on_evicted: impl FnMut(&str, &V) + Send + Sync + 'static,
    ) -> Self {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(Box::new(on_evicted));
        store
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sum of `len(key) + value.weight()` over all live entries.
    pub fn cur_bytes(&self) -> u64 {
        self.cur_bytes
    }

    /// Insert or update `key`. Overwriting moves the entry to the front
    /// without firing the eviction callback. Afterward, evicts from the
    /// back until the budget is satisfied (which may evict the entry
    /// just inserted, if it alone exceeds `max_bytes`).
    pub fn add(&mut self, key: &str, value: V) {
        if let Some(&slot) = self.index.get(key) {
            let node = self.slab[slot].as_mut().expect("indexed slot must be live");
            let new_weight = key.len() + value.weight();
            self.cur_bytes = self.cur_bytes - node.weight as u64 + new_weight as u64;
            node.value = value;
            node.weight = new_weight;
            self.move_to_front(slot);
        } else {
            let weight = key.len() + value.weight();
            self.cur_bytes += weight as u64;
            let node = Node {
                key: key.to_owned(),
                value,
                weight,
                prev: NONE,
                next: NONE,
            };
            let slot = self.alloc(node);
            self.index.insert(key.to_owned(), slot);
            self.push_front(slot);
        }

        while self.max_bytes != 0 && self.cur_bytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let slot = *self.index.get(key)?;
        self.move_to_front(slot);
        Some(self.slab[slot].as_ref().unwrap().value.clone())
    }

    /// Evict the least-recently-used entry, firing the eviction callback
    /// if one is configured. No-op on an empty store.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        if self.tail == NONE {
            return None;
        }
        let slot = self.tail;
        self.detach(slot);
        let node = self.slab[slot].take().expect("tail slot must be live");
        self.free.push(slot);
        self.index.remove(&node.key);
        self.cur_bytes -= node.weight as u64;
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }

    fn alloc(&mut self, node: Node<V>) -> usize {
        if let Some(slot) = self.free.pop() {
            self.slab[slot] = Some(node);
            slot
        } else {
            self.slab.push(Some(node));
            self.slab.len() - 1
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.slab[slot].as_mut().unwrap();
            node.prev = NONE;
            node.next = old_head;
        }
        if old_head != NONE {
            self.slab[old_head].as_mut().unwrap().prev = slot;
        }
        self.head = slot;
        if self.tail == NONE {
            self.tail = slot;
        }
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.slab[slot].as_ref().unwrap();
            (node.prev, node.next)
        };
        if prev != NONE {
            self.slab[prev].as_mut().unwrap().next = next;
        } else {
            self.head = next;
        }
        if next != NONE {
            self.slab[next].as_mut().unwrap().prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn move_to_front(&mut self, slot: usize) {
        if self.head == slot {
            return;
        }
        self.detach(slot);
        self.push_front(slot);
    }
}
