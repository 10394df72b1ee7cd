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

//! A mutex-guarded [`LruStore`], lazily constructed on first use so a
//! cache with `max_bytes == 0` configured but never touched allocates
//! nothing.

use parking_lot::Mutex;
use shardcache_common::Weighted;

use crate::lru::LruStore;

/// Thread-safe wrapper around [`LruStore`].
///
/// The inner store is built on the first call that needs it, not at
/// construction time, so a freshly created, never-used cache costs only
/// the size of this struct.
pub struct SyncCache<V>
where
    V: Weighted + Clone + Send + 'static,
{
    max_bytes: u64,
    store: Mutex<Option<LruStore<V>>>,
}

impl<V> SyncCache<V>
where
    V: Weighted + Clone + Send + 'static,
{
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            store: Mutex::new(None),
        }
    }

    pub fn add(&self, key: &str, value: V) {
        let mut guard = self.store.lock();
        let store = guard.get_or_insert_with(|| LruStore::new(self.max_bytes));
        store.add(key, value);
    }

    /// A store that has never been written to is never allocated, so a
    /// `get` against it is a not-found rather than an allocation.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().as_mut()?.get(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().as_ref().map_or(0, LruStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cur_bytes(&self) -> u64 {
        self.store.lock().as_ref().map_or(0, LruStore::cur_bytes)
    }
}
