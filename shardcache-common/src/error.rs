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

use std::error::Error as StdError;

/// A boxed, type-erased source error, used wherever a loader or peer
/// transport implementation wants to report its own error type without
/// this crate knowing about it.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by a cache group's `Get` path.
///
/// `DuplicateRegistration` and `MissingLoader` are programmer errors: a
/// correct caller never triggers them. They are returned rather than
/// panicking so that a misbehaving plugin or misconfigured group can be
/// reported up the call stack instead of aborting the process.
#[derive(Debug, thiserror::Error)]
pub enum ShardCacheError {
    /// `Get` was called with an empty key.
    #[error("key must not be empty")]
    InvalidKey,

    /// The loader failed to produce a value for the key.
    #[error("loader failed: {0}")]
    Loader(#[source] BoxError),

    /// The peer transport failed for the key. Never returned to a caller
    /// directly: a peer failure falls back to the local loader, and only
    /// surfaces if the loader then also fails.
    #[error("peer fetch failed: {0}")]
    Peer(#[source] BoxError),

    /// `register_peers` was called more than once on the same group.
    #[error("peer picker already registered for this group")]
    DuplicateRegistration,

    /// A group was constructed without a loader.
    #[error("cache group requires a loader")]
    MissingLoader,
}
