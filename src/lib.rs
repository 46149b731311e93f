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

//! # Relalg - pull-based relational query execution
//!
//! Relalg is the core of a relational query-execution engine built on the
//! Volcano iterator model. Tree-structured physical operators produce
//! tuples on demand: a consumer pulls from the root, which recursively
//! pulls from its children. Together the operators implement the
//! relational algebra needed for SQL-style evaluation - projection,
//! selection, sort, hash join, hash aggregation, and the set-theoretic
//! operations in both duplicate-preserving and duplicate-eliminating
//! variants.
//!
//! ## Key Properties
//!
//! - **Pull-based lifecycle** - every operator follows
//!   open → advance* → close, with `output()` borrowing the current tuple
//! - **Pipelining where possible** - projection and selection stream;
//!   sort, aggregation, and set operations materialize on first advance
//! - **Deterministic emission** - blocking operators emit in a total order
//!   determined by their input multiset
//! - **Fail-fast contracts** - mistyped comparisons and mismatched schemas
//!   are rejected with descriptive errors, most at construction time
//!
//! ## Quick Start
//!
//! ```rust
//! use relalg::{
//!     collect_tuples, CompareOp, MaterializedOperator, Predicate, Projection, Register,
//!     RegisterType, Selection, Tuple,
//! };
//!
//! // A two-column scan source: (a INT64, b CHAR16)
//! let tuples = vec![
//!     Tuple::from_values(vec![Register::int(1), Register::string("x").unwrap()]),
//!     Tuple::from_values(vec![Register::int(2), Register::string("y").unwrap()]),
//!     Tuple::from_values(vec![Register::int(3), Register::string("x").unwrap()]),
//! ];
//! let scan = Box::new(MaterializedOperator::new(
//!     tuples,
//!     vec![RegisterType::Int64, RegisterType::Char16],
//! ));
//!
//! // SELECT b FROM r WHERE a > 1
//! let filter = Selection::new(
//!     scan,
//!     Predicate::IntConstant { column: 0, op: CompareOp::Gt, constant: 1 },
//! )
//! .unwrap();
//! let mut plan = Projection::new(Box::new(filter), vec![1]).unwrap();
//!
//! let rows = collect_tuples(&mut plan).unwrap();
//! assert_eq!(rows.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - fundamental types ([`Register`], [`Tuple`], [`Error`])
//! - [`executor`] - the operator protocol and all physical operators

pub mod core;
pub mod executor;

// Re-export main types for convenience
pub use crate::core::{Char16, Error, Register, RegisterType, Result, Tuple, CHAR16_WIDTH};

// Re-export the operator protocol and operators
pub use executor::{
    collect_tuples, hash_register, AggregateFunc, AggregateSpec, CompareOp, EmptyOperator,
    HashAggregation, HashJoin, JoinHashTable, MaterializedOperator, Operator, Predicate, Print,
    Projection, Selection, SetOpKind, SetOperation, Sort, SortCriterion, SortOrder,
};
