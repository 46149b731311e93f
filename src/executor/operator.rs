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

//! Volcano-style operator interface for pull-based query execution.
//!
//! This module provides the foundation for an execution model where
//! operators produce tuples on demand rather than materializing everything
//! upfront.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ Consumer     │ ← Pulls tuples via advance()/output()
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ HashJoin     │ ← Build side materialized, probe side streamed
//! └──────┬───────┘
//!        │
//! ┌──────┴──────┐
//! │             │
//! ▼             ▼
//! ┌─────┐   ┌─────┐
//! │Scan │   │Scan │ ← Leaf sources feeding the pipeline
//! └─────┘   └─────┘
//! ```
//!
//! An operator is "blocking" if it must consume all its input before it can
//! emit any output, and "pipelining" otherwise. Blocking operators
//! materialize on the first call to `advance()` and then replay from an
//! internal buffer.

use crate::core::{Register, RegisterType, Result, Tuple};

/// Pull-based iterator interface for query operators.
///
/// Each operator implements this trait to participate in the execution
/// pipeline. The lifecycle is open-advance-output-close:
///
/// 1. `open()` - initialize, recursively opening inputs (called once)
/// 2. `advance()` - move to the next tuple, `false` once exhausted
/// 3. `output()` - borrow the current tuple's registers
/// 4. `close()` - release buffers and recursively close inputs
///
/// # Ownership
///
/// `output()` returns borrowed references into storage owned by the
/// producing operator, valid until the next `advance()` or `close()`.
/// Consumers copy registers they wish to retain.
///
/// # Thread Safety
///
/// An operator tree is owned and driven by a single consumer; operators
/// maintain mutable state and are not safe for concurrent use.
pub trait Operator {
    /// Initialize the operator.
    ///
    /// Called exactly once before the first `advance()`. Child operators
    /// are opened here.
    fn open(&mut self) -> Result<()>;

    /// Attempt to produce the next output tuple.
    ///
    /// Returns:
    /// - `Ok(true)` - a tuple is available via `output()`
    /// - `Ok(false)` - no more tuples (exhausted)
    /// - `Err(e)` - a contract violation occurred
    ///
    /// After returning `false`, subsequent calls keep returning `false`.
    fn advance(&mut self) -> Result<bool>;

    /// Borrow the current output tuple.
    ///
    /// Valid only between a successful `advance()` and the next
    /// `advance()`/`close()`; calling it outside that window is
    /// unspecified and may panic. The number and variants of columns are
    /// invariant across calls within one open/close cycle.
    fn output(&self) -> &[Register];

    /// Close the operator and release resources.
    ///
    /// Called once after all tuples have been consumed or when execution
    /// is terminated early. Child operators are closed and buffered state
    /// is dropped.
    fn close(&mut self) -> Result<()>;

    /// The per-position variant sequence of this operator's output.
    fn schema(&self) -> &[RegisterType];

    /// Get a descriptive name for this operator (for diagnostics).
    fn name(&self) -> &str;
}

/// Drain an operator tree into a vector of owned tuples.
///
/// Runs the full open → advance* → close cycle, copying each output tuple.
pub fn collect_tuples(op: &mut dyn Operator) -> Result<Vec<Tuple>> {
    let mut results = Vec::new();
    op.open()?;
    while op.advance()? {
        results.push(Tuple::from_values(op.output().to_vec()));
    }
    op.close()?;
    Ok(results)
}

// ============================================================================
// Leaf Sources
// ============================================================================

/// An operator that produces no tuples.
///
/// Useful as a placeholder or for empty result sets with a known schema.
pub struct EmptyOperator {
    schema: Vec<RegisterType>,
}

impl EmptyOperator {
    /// Create an empty operator with the given schema.
    pub fn new(schema: Vec<RegisterType>) -> Self {
        Self { schema }
    }
}

impl Operator for EmptyOperator {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn output(&self) -> &[Register] {
        &[]
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn schema(&self) -> &[RegisterType] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Empty"
    }
}

/// An operator that yields tuples from a pre-materialized vector.
///
/// This is the scan-shaped leaf source of the engine: any producer that can
/// assemble a `Vec<Tuple>` of a fixed schema plugs into a pipeline through
/// it. It is also the fixture source for the operator tests.
pub struct MaterializedOperator {
    tuples: Vec<Tuple>,
    schema: Vec<RegisterType>,
    cursor: usize,
}

impl MaterializedOperator {
    /// Create an operator from a vector of tuples and their schema.
    ///
    /// Every tuple must match the declared schema; that is the producer's
    /// contract and is only spot-checked in debug builds.
    pub fn new(tuples: Vec<Tuple>, schema: Vec<RegisterType>) -> Self {
        debug_assert!(
            tuples.iter().all(|t| t.schema() == schema),
            "tuple does not match declared schema"
        );
        Self {
            tuples,
            schema,
            cursor: 0,
        }
    }
}

impl Operator for MaterializedOperator {
    fn open(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        if self.cursor >= self.tuples.len() {
            return Ok(false);
        }
        self.cursor += 1;
        Ok(true)
    }

    fn output(&self) -> &[Register] {
        debug_assert!(self.cursor > 0, "output() called before advance()");
        &self.tuples[self.cursor - 1]
    }

    fn close(&mut self) -> Result<()> {
        self.tuples = Vec::new();
        Ok(())
    }

    fn schema(&self) -> &[RegisterType] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Materialized"
    }
}
