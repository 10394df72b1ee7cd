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

//! The mechanisms underneath a shardcache group: a byte-budgeted LRU
//! store, a mutex-synchronized wrapper around it, request coalescing,
//! and the consistent-hash ring peers are picked from.
//!
//! None of this module knows about peers-over-the-wire or loaders — see
//! the `shardcache` crate for the group that wires these together into
//! a read-through cache.

pub mod lru;
pub mod ring;
pub mod singleflight;
pub mod sync_cache;

pub mod prelude;
