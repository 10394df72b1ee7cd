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

//! The source of truth a cache group falls back to on a local miss with
//! no peer able to serve the key.

use shardcache_common::{ByteView, ShardCacheError};

/// Supplies values for keys the cache does not already hold. Called at
/// most once per outstanding key per node — concurrent misses for the
/// same key are coalesced by the group's single-flight before `load` is
/// invoked.
#[async_trait::async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<ByteView, ShardCacheError>;
}

/// Adapts a synchronous closure into a [`Loader`], for the common case
/// where fetching a value does no I/O of its own (e.g. it is backed by
/// an in-memory map, as in tests and examples).
pub struct FnLoader<F>(F);

impl<F> FnLoader<F>
where
    F: Fn(&str) -> Result<ByteView, ShardCacheError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F> Loader for FnLoader<F>
where
    F: Fn(&str) -> Result<ByteView, ShardCacheError> + Send + Sync,
{
    async fn load(&self, key: &str) -> Result<ByteView, ShardCacheError> {
        (self.0)(key)
    }
}
