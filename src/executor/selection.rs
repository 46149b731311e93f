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

//! Selection operator.
//!
//! Filters the input through exactly one predicate. Tuples for which the
//! predicate holds pass through unchanged, in input order; the rest are
//! dropped. Fully pipelining, zero-copy: the output borrows the input's
//! current tuple.

use std::cmp::Ordering;

use crate::core::{Char16, Error, Register, RegisterType, Result};

use super::operator::Operator;

/// Comparison operator applied by a [`Predicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equality (=)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl CompareOp {
    /// Whether an observed ordering satisfies this operator.
    #[inline]
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Filter predicate, in one of three shapes.
///
/// The constant shapes compare one column against a literal; the pair
/// shape compares two columns of the same tuple. Both sides of any
/// comparison must share a register variant, which [`Selection::new`]
/// verifies against the input schema.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `column <op> integer-constant`; the column must be INT64
    IntConstant {
        column: usize,
        op: CompareOp,
        constant: i64,
    },
    /// `column <op> string-constant`; the column must be CHAR16
    StringConstant {
        column: usize,
        op: CompareOp,
        constant: Char16,
    },
    /// `left-column <op> right-column`; both columns must share a variant
    ColumnPair {
        left: usize,
        right: usize,
        op: CompareOp,
    },
}

impl Predicate {
    /// Validate this predicate against an input schema.
    fn check(&self, schema: &[RegisterType]) -> Result<()> {
        let arity = schema.len();
        let check_index = |index: usize| -> Result<()> {
            if index >= arity {
                return Err(Error::column_out_of_bounds(index, arity));
            }
            Ok(())
        };
        match self {
            Predicate::IntConstant { column, .. } => {
                check_index(*column)?;
                if schema[*column] != RegisterType::Int64 {
                    return Err(Error::IncomparableTypes);
                }
            }
            Predicate::StringConstant { column, .. } => {
                check_index(*column)?;
                if schema[*column] != RegisterType::Char16 {
                    return Err(Error::IncomparableTypes);
                }
            }
            Predicate::ColumnPair { left, right, .. } => {
                check_index(*left)?;
                check_index(*right)?;
                if schema[*left] != schema[*right] {
                    return Err(Error::IncomparableTypes);
                }
            }
        }
        Ok(())
    }

    /// Evaluate this predicate over one tuple.
    pub fn evaluate(&self, regs: &[Register]) -> Result<bool> {
        let ordering = match self {
            Predicate::IntConstant {
                column, constant, ..
            } => regs[*column].compare(&Register::int(*constant))?,
            Predicate::StringConstant {
                column, constant, ..
            } => regs[*column].compare(&Register::Char16(*constant))?,
            Predicate::ColumnPair { left, right, .. } => regs[*left].compare(&regs[*right])?,
        };
        Ok(self.op().matches(ordering))
    }

    fn op(&self) -> CompareOp {
        match self {
            Predicate::IntConstant { op, .. } => *op,
            Predicate::StringConstant { op, .. } => *op,
            Predicate::ColumnPair { op, .. } => *op,
        }
    }
}

/// Pipelining predicate filter.
impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection").finish_non_exhaustive()
    }
}

pub struct Selection {
    input: Box<dyn Operator>,
    predicate: Predicate,
}

impl Selection {
    /// Create a selection over `input`, keeping tuples matching `predicate`.
    ///
    /// Fails if the predicate references columns outside the input schema
    /// or compares across register variants.
    pub fn new(input: Box<dyn Operator>, predicate: Predicate) -> Result<Self> {
        predicate.check(input.schema())?;
        Ok(Self { input, predicate })
    }
}

impl Operator for Selection {
    fn open(&mut self) -> Result<()> {
        self.input.open()
    }

    fn advance(&mut self) -> Result<bool> {
        loop {
            if !self.input.advance()? {
                return Ok(false);
            }
            if self.predicate.evaluate(self.input.output())? {
                return Ok(true);
            }
        }
    }

    fn output(&self) -> &[Register] {
        self.input.output()
    }

    fn close(&mut self) -> Result<()> {
        self.input.close()
    }

    fn schema(&self) -> &[RegisterType] {
        self.input.schema()
    }

    fn name(&self) -> &str {
        "Selection"
    }
}
