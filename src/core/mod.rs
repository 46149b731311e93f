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

//! Core types and definitions for relalg
//!
//! This module contains the fundamental types used throughout the engine:
//!
//! - [`Register`] - typed scalar values (INT64, CHAR16)
//! - [`RegisterType`] - the variant tag, doubling as the schema entry
//! - [`Tuple`] - a fixed-length ordered sequence of registers
//! - [`Error`] - error types for all execution operations

pub mod error;
pub mod register;
pub mod tuple;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use register::{Char16, Register, RegisterType, CHAR16_WIDTH};
pub use tuple::Tuple;

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Integration test: tuples over mixed schemas hash and order coherently
    #[test]
    fn test_tuple_register_integration() {
        let a = Tuple::from_values(vec![Register::int(1), Register::string("x").unwrap()]);
        let b = Tuple::from_values(vec![Register::int(1), Register::string("x").unwrap()]);
        let c = Tuple::from_values(vec![Register::int(1), Register::string("y").unwrap()]);

        assert_eq!(a, b);
        assert!(a < c);
        assert_eq!(a.schema(), c.schema());

        use rustc_hash::FxHashMap;
        let mut counts: FxHashMap<Tuple, u64> = FxHashMap::default();
        *counts.entry(a).or_insert(0) += 1;
        *counts.entry(b).or_insert(0) += 1;
        *counts.entry(c).or_insert(0) += 1;
        assert_eq!(counts.len(), 2);
    }
}
