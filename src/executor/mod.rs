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

//! Query operators for pull-based execution.
//!
//! Every operator implements the [`Operator`] trait with the
//! open/advance/output/close lifecycle. A consumer drives the root of the
//! tree; each `advance()` recursively pulls from the children.
//!
//! # Available Operators
//!
//! ## Pipelining
//!
//! - [`Projection`] - column selection, one tuple in, one tuple out
//! - [`Selection`] - predicate filter over three predicate shapes
//! - [`Print`] - formatting sink writing to a byte sink
//!
//! ## Blocking
//!
//! - [`Sort`] - multi-key sort with per-key direction
//! - [`HashJoin`] - equi-join; build side right, probe side left
//! - [`HashAggregation`] - grouped MIN/MAX/SUM/COUNT
//! - [`SetOperation`] - UNION/INTERSECT/EXCEPT, with and without
//!   duplicate elimination
//!
//! Blocking operators materialize their input on the first `advance()` and
//! replay from an internal buffer; `close()` releases the buffer.

pub mod aggregation;
pub mod hash_join;
pub mod hash_table;
pub mod operator;
pub mod print;
pub mod projection;
pub mod selection;
pub mod set_ops;
pub mod sort;

// Re-export all operators and types
pub use aggregation::{AggregateFunc, AggregateSpec, HashAggregation};
pub use hash_join::HashJoin;
pub use hash_table::{hash_register, JoinHashTable};
pub use operator::{collect_tuples, EmptyOperator, MaterializedOperator, Operator};
pub use print::Print;
pub use projection::Projection;
pub use selection::{CompareOp, Predicate, Selection};
pub use set_ops::{SetOpKind, SetOperation};
pub use sort::{Sort, SortCriterion, SortOrder};
