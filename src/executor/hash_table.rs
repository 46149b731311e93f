// Copyright 2025 Relalg Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hash table for the join build phase.
//!
//! Key properties:
//!
//! 1. **Pre-allocated**: sized upfront from build side cardinality
//! 2. **Chained entries in a flat vector**: cache-friendly, no per-entry
//!    allocation
//! 3. **Zero-allocation probe**: the probe iterator only holds a reference
//!    to the table
//! 4. **Full hash stored**: quick rejection without touching tuple data
//!
//! # Memory Layout
//!
//! ```text
//! JoinHashTable
//! ├── bucket_heads: Vec<i32>    [bucket_count]     // First entry index per bucket
//! ├── entries: Vec<HashEntry>   [tuple_count]      // One per build tuple
//! └── bucket_mask: u64                             // For fast modulo
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::core::{Register, Tuple};

/// Sentinel value indicating end of chain or empty bucket.
const EMPTY: u32 = u32::MAX;

/// Minimum number of buckets (must be power of 2).
const MIN_BUCKETS: usize = 16;

/// A hash entry in the join hash table.
///
/// Each entry represents one tuple from the build side.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct HashEntry {
    /// Full 64-bit hash for quick rejection during probe.
    hash: u64,
    /// Index into the build tuples vector.
    tuple_idx: u32,
    /// Index of next entry in the chain (EMPTY = end of chain).
    next: u32,
}

/// Hash table mapping a join-key hash to build-side tuple indices.
///
/// Chaining with linked entries stored in a flat vector. Probe results are
/// hash matches only; the caller verifies actual key equality to handle
/// collisions.
pub struct JoinHashTable {
    /// First entry index for each bucket (-1 if empty).
    /// Sized to power of 2 for fast modulo via bitwise AND.
    bucket_heads: Vec<i32>,

    /// Flat storage of all entries, one per build tuple.
    entries: Vec<HashEntry>,

    /// Mask for computing bucket index: bucket = hash & mask
    bucket_mask: u64,

    /// Number of entries inserted.
    len: usize,
}

impl JoinHashTable {
    /// Create a hash table with capacity for the given number of tuples.
    ///
    /// Bucket count is sized to a ~75% load factor and never resized.
    pub fn with_capacity(tuple_count: usize) -> Self {
        let bucket_count = (tuple_count * 4 / 3).max(MIN_BUCKETS).next_power_of_two();

        Self {
            bucket_heads: vec![-1; bucket_count],
            entries: Vec::with_capacity(tuple_count),
            bucket_mask: (bucket_count - 1) as u64,
            len: 0,
        }
    }

    /// Build a hash table over `tuples`, keyed on the register at
    /// `key_column`.
    pub fn build(tuples: &[Tuple], key_column: usize) -> Self {
        let mut table = Self::with_capacity(tuples.len());
        for (idx, tuple) in tuples.iter().enumerate() {
            let hash = hash_register(&tuple[key_column]);
            table.insert(hash, idx as u32);
        }
        table
    }

    /// Insert a tuple index with its pre-computed key hash.
    #[inline]
    pub fn insert(&mut self, hash: u64, tuple_idx: u32) {
        let bucket = (hash & self.bucket_mask) as usize;
        let old_head = self.bucket_heads[bucket];

        let entry_idx = self.len as u32;
        let next = if old_head >= 0 {
            old_head as u32
        } else {
            EMPTY
        };
        self.entries.push(HashEntry {
            hash,
            tuple_idx,
            next,
        });

        self.bucket_heads[bucket] = entry_idx as i32;
        self.len += 1;
    }

    /// Probe for build tuple indices with a matching key hash.
    ///
    /// The caller must verify actual key equality for each returned index.
    #[inline]
    pub fn probe(&self, hash: u64) -> ProbeIter<'_> {
        let bucket = (hash & self.bucket_mask) as usize;
        ProbeIter {
            table: self,
            hash,
            current: self.bucket_heads[bucket],
        }
    }

    /// Number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Zero-allocation iterator over probe results.
pub struct ProbeIter<'a> {
    table: &'a JoinHashTable,
    hash: u64,
    current: i32,
}

impl Iterator for ProbeIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current >= 0 {
            let entry = &self.table.entries[self.current as usize];
            self.current = if entry.next == EMPTY {
                -1
            } else {
                entry.next as i32
            };

            if entry.hash == self.hash {
                return Some(entry.tuple_idx as usize);
            }
        }
        None
    }
}

/// Hash a single register into a u64 with FxHasher.
///
/// The register's `Hash` impl covers the variant tag plus the payload, so
/// equal registers always collide and the hash is stable within a process.
#[inline]
pub fn hash_register(reg: &Register) -> u64 {
    let mut hasher = FxHasher::default();
    reg.hash(&mut hasher);
    hasher.finish()
}
