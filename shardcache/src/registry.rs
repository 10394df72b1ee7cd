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

//! Process-wide, name-addressable lookup of cache groups.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::group::CacheGroup;
use crate::loader::Loader;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<CacheGroup>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Create a new cache group and register it under `name`.
///
/// Groups are never unregistered for the lifetime of the process.
/// Creating a second group under a name already in use replaces the
/// registry entry (the old `Arc` lives on in any handle a caller still
/// holds, but a later [`get_cache_group`] sees only the new one).
pub fn new_cache_group(name: impl Into<String>, max_bytes: u64, loader: Arc<dyn Loader>) -> Arc<CacheGroup> {
    let name = name.into();
    let group = CacheGroup::new(name.clone(), max_bytes, loader);

    let mut registry = REGISTRY.write();
    if registry.contains_key(&name) {
        tracing::warn!(%name, "replacing an already-registered cache group");
    }
    registry.insert(name, group.clone());
    group
}

/// Look up a previously-created group by name.
pub fn get_cache_group(name: &str) -> Option<Arc<CacheGroup>> {
    REGISTRY.read().get(name).cloned()
}
