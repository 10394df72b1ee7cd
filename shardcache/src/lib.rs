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

//! A distributed, in-memory, read-through byte cache organized by named
//! groups, in the shape of groupcache: a miss is served by a peer chosen
//! through consistent hashing, falling back to a user-supplied loader,
//! with concurrent misses for the same key coalesced onto one fetch.
//!
//! ```
//! use std::sync::Arc;
//!
//! use shardcache::{new_cache_group, FnLoader};
//! use shardcache_common::ByteView;
//!
//! #[tokio::main]
//! async fn main() {
//!     let loader = FnLoader::new(|key: &str| match key {
//!         "Tom" => Ok(ByteView::from("630")),
//!         other => Err(shardcache_common::ShardCacheError::Loader(format!("{other} not exist").into())),
//!     });
//!     let group = new_cache_group("scores", 2048, Arc::new(loader));
//!     assert_eq!(group.get("Tom").await.unwrap().string(), "630");
//! }
//! ```

pub mod group;
pub mod loader;
pub mod peer;
pub mod registry;

pub mod prelude;

pub use group::CacheGroup;
pub use loader::{FnLoader, Loader};
pub use peer::{HashRingPicker, PeerClient, PeerPicker, RingConfig};
pub use registry::{get_cache_group, new_cache_group};
