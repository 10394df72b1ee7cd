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

//! Routing a key to the node responsible for it.
//!
//! The wire transport itself — HTTP, gRPC, whatever a deployment picks —
//! is out of scope; [`PeerClient`] is the seam an integrator implements.

use std::collections::HashMap;
use std::sync::Arc;

use shardcache_common::ShardCacheError;
use shardcache_core::ring::HashRing;

/// A handle to one remote node, capable of fetching a key on this
/// group's behalf.
#[async_trait::async_trait]
pub trait PeerClient: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>, ShardCacheError>;
}

/// Given a key, decides which peer (if any) owns it.
pub trait PeerPicker: Send + Sync {
    /// Returns the peer responsible for `key` and whether it is remote
    /// (not this node). `picked_remote = false` means the caller should
    /// fall back to its own loader: either the ring is empty, or `key`
    /// hashes to this node itself.
    fn pick(&self, key: &str) -> (Option<Arc<dyn PeerClient>>, bool);
}

/// Configuration for a [`HashRingPicker`]'s ring.
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Virtual nodes hashed per peer address. Spec-recommended default
    /// is 50; higher values trade memory for a more even key spread.
    pub replicas: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { replicas: 50 }
    }
}

/// The default [`PeerPicker`]: a consistent-hash ring over a fixed set
/// of peer addresses, each backed by a [`PeerClient`].
///
/// Built once via [`HashRingPicker::new`] — the ring itself is treated
/// as immutable thereafter, matching the "publish by atomic swap, never
/// mutate a visible ring" guidance for any future reconfiguration
/// support.
pub struct HashRingPicker {
    self_addr: String,
    ring: HashRing,
    clients: HashMap<String, Arc<dyn PeerClient>>,
}

impl HashRingPicker {
    /// `self_addr` must be one of the keys of `peers`, or no key will
    /// ever resolve to "self" and every `pick` will be treated as
    /// remote.
    pub fn new(self_addr: impl Into<String>, config: RingConfig, peers: HashMap<String, Arc<dyn PeerClient>>) -> Self {
        let mut ring = HashRing::new(config.replicas);
        let addrs: Vec<&str> = peers.keys().map(String::as_str).collect();
        ring.add(&addrs);
        Self {
            self_addr: self_addr.into(),
            ring,
            clients: peers,
        }
    }
}

impl PeerPicker for HashRingPicker {
    fn pick(&self, key: &str) -> (Option<Arc<dyn PeerClient>>, bool) {
        match self.ring.get(key) {
            None => (None, false),
            Some(owner) if owner == self.self_addr => (None, false),
            Some(owner) => {
                let client = self.clients.get(owner).cloned();
                let remote = client.is_some();
                (client, remote)
            }
        }
    }
}
