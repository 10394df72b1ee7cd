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

//! A consistent-hash ring with virtual nodes, used to pick which peer
//! owns a key.

use std::collections::HashMap;

/// Hashes an arbitrary byte string to a `u32`. The default, [`Crc32Hash`],
/// matches the reference implementation's choice of CRC32/IEEE.
pub trait RingHash: Send + Sync {
    fn hash(&self, data: &[u8]) -> u32;
}

/// CRC32 (IEEE polynomial) ring hash. Cheap, well distributed, and not
/// meant to resist adversarial key choices — this ring is a load-balancing
/// aid, not a security boundary.
#[derive(Default)]
pub struct Crc32Hash;

impl RingHash for Crc32Hash {
    fn hash(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// Maps keys to one of a set of named nodes (peer addresses, typically)
/// by consistent hashing. Each node is hashed `replicas` times under a
/// `"{i}{key}"` salt so that the ring stays balanced with few real nodes.
///
/// On a hash collision between two virtual node labels, the later
/// insertion in [`HashRing::add`]'s argument order wins — last write
/// takes the slot.
pub struct HashRing {
    replicas: usize,
    hasher: Box<dyn RingHash>,
    /// Sorted ascending; parallel to nothing else, looked up by binary
    /// search and then resolved through `nodes`.
    sorted_hashes: Vec<u32>,
    nodes: HashMap<u32, String>,
}

impl HashRing {
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, Box::new(Crc32Hash))
    }

    pub fn with_hasher(replicas: usize, hasher: Box<dyn RingHash>) -> Self {
        Self {
            replicas,
            hasher,
            sorted_hashes: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    /// Is the ring empty (no nodes added yet)?
    pub fn is_empty(&self) -> bool {
        self.sorted_hashes.is_empty()
    }

    /// Add nodes to the ring. Virtual-node hashes accumulate on top of
    /// whatever is already in the ring rather than replacing it, so this
    /// is meant to be called once at startup with the full peer set
    /// rather than incrementally — repeated calls are expected to pass
    /// disjoint node sets.
    pub fn add(&mut self, nodes: &[impl AsRef<str>]) {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let label = format!("{i}{node}");
                let h = self.hasher.hash(label.as_bytes());
                if !self.nodes.contains_key(&h) {
                    self.sorted_hashes.push(h);
                }
                self.nodes.insert(h, node.to_owned());
            }
        }
        self.sorted_hashes.sort_unstable();
        self.sorted_hashes.dedup();
    }

    /// Returns the node responsible for `key`, or `None` if the ring has
    /// no nodes. Walks clockwise from `hash(key)` to the first node hash
    /// greater than or equal to it, wrapping around to the first node if
    /// `key`'s hash is past every node hash on the ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.sorted_hashes.is_empty() {
            return None;
        }
        let h = self.hasher.hash(key.as_bytes());
        let idx = match self.sorted_hashes.binary_search(&h) {
            Ok(i) => i,
            Err(i) => i % self.sorted_hashes.len(),
        };
        self.nodes.get(&self.sorted_hashes[idx]).map(String::as_str)
    }
}
