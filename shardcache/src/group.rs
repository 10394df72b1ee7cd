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

//! A named, read-through cache: local lookup, then peer routing, then
//! the loader — composed behind a single coalesced `get`.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use shardcache_common::{ByteView, ShardCacheError};
use shardcache_core::singleflight::SingleFlight;
use shardcache_core::sync_cache::SyncCache;

use crate::loader::Loader;
use crate::peer::PeerPicker;

/// A single named cache. Construct one with
/// [`crate::registry::new_cache_group`] rather than directly, so it is
/// findable later through the process registry.
pub struct CacheGroup {
    name: String,
    loader: Arc<dyn Loader>,
    cache: SyncCache<ByteView>,
    single_flight: SingleFlight<Result<ByteView, Arc<ShardCacheError>>>,
    picker: OnceCell<Arc<dyn PeerPicker>>,
}

impl CacheGroup {
    pub(crate) fn new(name: impl Into<String>, max_bytes: u64, loader: Arc<dyn Loader>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            loader,
            cache: SyncCache::new(max_bytes),
            single_flight: SingleFlight::new(),
            picker: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a peer picker. May be called at most once per group — a
    /// second call is a programmer error, reported rather than panicking
    /// so a caller embedding this in a larger service can decide how to
    /// react.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<(), ShardCacheError> {
        self.picker.set(picker).map_err(|_| ShardCacheError::DuplicateRegistration)
    }

    /// Number of bytes currently resident in this group's local cache.
    pub fn cache_bytes(&self) -> u64 {
        self.cache.cur_bytes()
    }

    /// Fetch `key`: a local hit returns immediately; a miss coalesces
    /// concurrent callers onto one peer-or-loader fetch and caches the
    /// result before returning it.
    pub async fn get(&self, key: &str) -> Result<ByteView, Arc<ShardCacheError>> {
        if key.is_empty() {
            return Err(Arc::new(ShardCacheError::InvalidKey));
        }
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }
        self.single_flight.do_call(key, self.load(key)).await
    }

    async fn load(&self, key: &str) -> Result<ByteView, Arc<ShardCacheError>> {
        if let Some(picker) = self.picker.get() {
            let (client, remote) = picker.pick(key);
            if remote {
                let client = client.expect("a remote pick always carries a client");
                match client.get(&self.name, key).await {
                    Ok(bytes) => {
                        let value = ByteView::from(bytes);
                        self.cache.add(key, value.clone());
                        return Ok(value);
                    }
                    Err(err) => {
                        tracing::warn!(group = %self.name, %key, error = %err, "peer fetch failed, falling back to loader");
                    }
                }
            }
        }

        match self.loader.load(key).await {
            Ok(value) => {
                self.cache.add(key, value.clone());
                Ok(value)
            }
            Err(err) => Err(Arc::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::loader::FnLoader;
    use crate::peer::{HashRingPicker, PeerClient, RingConfig};

    use super::*;

    fn scores_loader(calls: Arc<AtomicUsize>) -> Arc<dyn Loader> {
        Arc::new(FnLoader::new(move |key: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            match key {
                "Tom" => Ok(ByteView::from("630")),
                "Jack" => Ok(ByteView::from("589")),
                "Sam" => Ok(ByteView::from("567")),
                other => Err(ShardCacheError::Loader(format!("{other} not exist").into())),
            }
        }))
    }

    #[tokio::test]
    async fn basic_hit_only_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls.clone()));

        assert_eq!(group.get("Tom").await.unwrap().string(), "630");
        assert_eq!(group.get("Tom").await.unwrap().string(), "630");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn miss_then_error_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls.clone()));

        let first = group.get("Unknown").await;
        assert!(first.is_err());
        let second = group.get("Unknown").await;
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_key_is_rejected_without_touching_the_loader() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls.clone()));
        assert!(matches!(group.get("").await.unwrap_err().as_ref(), ShardCacheError::InvalidKey));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_misses_for_the_same_key_coalesce() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Arc::new(CacheGroup::new(
            "slow",
            2048,
            Arc::new(FnLoader::new({
                let calls = calls.clone();
                move |_key: &str| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(ByteView::from("X"))
                }
            })) as Arc<dyn Loader>,
        ));

        // The loader itself is synchronous, so the coalescing window is
        // narrow; run a wide fan-out to make it reliably overlap.
        let mut handles = Vec::new();
        for _ in 0..100 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("X").await.unwrap().string() }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), "X");
        }
    }

    struct FakePeer {
        value: Result<&'static str, &'static str>,
    }

    #[async_trait::async_trait]
    impl PeerClient for FakePeer {
        async fn get(&self, _group: &str, _key: &str) -> Result<Vec<u8>, ShardCacheError> {
            match self.value {
                Ok(v) => Ok(v.as_bytes().to_vec()),
                Err(e) => Err(ShardCacheError::Peer(e.into())),
            }
        }
    }

    #[tokio::test]
    async fn successful_peer_fetch_is_cached_locally() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls.clone()));

        let mut peers: HashMap<String, Arc<dyn PeerClient>> = HashMap::new();
        peers.insert("B".into(), Arc::new(FakePeer { value: Ok("remote-value") }));
        let picker = Arc::new(HashRingPicker::new("A", RingConfig::default(), peers));
        group.register_peers(picker).unwrap();

        let value = group.get("any-key").await.unwrap();
        assert_eq!(value.string(), "remote-value");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // A subsequent get for the same key is now a local hit and does
        // not touch the peer or loader again.
        let value2 = group.get("any-key").await.unwrap();
        assert_eq!(value2.string(), "remote-value");
    }

    #[tokio::test]
    async fn peer_failure_falls_back_to_the_loader() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls.clone()));

        let mut peers: HashMap<String, Arc<dyn PeerClient>> = HashMap::new();
        peers.insert("B".into(), Arc::new(FakePeer { value: Err("connection refused") }));
        let picker = Arc::new(HashRingPicker::new("A", RingConfig::default(), peers));
        group.register_peers(picker).unwrap();

        let value = group.get("Tom").await.unwrap();
        assert_eq!(value.string(), "630");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn registering_peers_twice_is_an_error_not_a_panic() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = CacheGroup::new("scores", 2048, scores_loader(calls));
        let picker_a = Arc::new(HashRingPicker::new("A", RingConfig::default(), HashMap::new()));
        let picker_b = Arc::new(HashRingPicker::new("A", RingConfig::default(), HashMap::new()));

        group.register_peers(picker_a).unwrap();
        let err = group.register_peers(picker_b).unwrap_err();
        assert!(matches!(err, ShardCacheError::DuplicateRegistration));
    }

    #[tokio::test]
    async fn lru_eviction_under_a_tight_budget() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cap = ("key1".len() + "v1".len() + "key2".len() + "v1".len()) as u64;
        let group = CacheGroup::new(
            "tight",
            cap,
            Arc::new(FnLoader::new({
                let calls = calls.clone();
                move |key: &str| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    match key {
                        "key1" => Ok(ByteView::from("v1")),
                        "key2" => Ok(ByteView::from("v1")),
                        "key3" => Ok(ByteView::from("v2")),
                        other => Err(ShardCacheError::Loader(format!("{other} not exist").into())),
                    }
                }
            })) as Arc<dyn Loader>,
        );

        group.get("key1").await.unwrap();
        group.get("key2").await.unwrap();
        group.get("key3").await.unwrap();

        // key1 was evicted to make room for key3; re-fetching it must
        // hit the loader again.
        group.get("key1").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn single_flight_coalesces_a_slow_loader() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = Arc::new(CacheGroup::new(
            "slow",
            2048,
            Arc::new(SleepyLoader { calls: calls.clone() }) as Arc<dyn Loader>,
        ));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let group = group.clone();
            handles.push(tokio::spawn(async move { group.get("X").await.unwrap().string() }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), "X");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    struct SleepyLoader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Loader for SleepyLoader {
        async fn load(&self, _key: &str) -> Result<ByteView, ShardCacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(ByteView::from("X"))
        }
    }
}
