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

use bytes::Bytes;

/// Anything that can report the number of bytes it should charge against
/// an LRU budget. Implemented for [`ByteView`]; kept as a trait rather
/// than hard-coding `ByteView` into the LRU store so the store's recency
/// and eviction logic stays agnostic to what it is storing.
pub trait Weighted {
    fn weight(&self) -> usize;
}

/// An immutable view over a byte sequence, backed by a reference-counted
/// buffer so cloning (handing a value from one single-flight waiter to
/// the next, or out of the LRU and back to a caller) is O(1) rather than
/// a deep copy.
///
/// Callers that need their own mutable copy use [`ByteView::bytes`],
/// which always allocates a fresh `Vec<u8>` — internal storage can never
/// be mutated out from under the cache.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ByteView(Bytes);

impl ByteView {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A defensive copy of the underlying bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// A UTF-8 decoding of the underlying bytes. Values are treated as
    /// opaque byte sequences, so invalid UTF-8 is replaced rather than
    /// rejected.
    pub fn string(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Weighted for ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self(Bytes::from(s.into_bytes()))
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}
