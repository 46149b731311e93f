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

//! Hash aggregation operator.
//!
//! Blocking grouped aggregation. Each input tuple is projected onto the
//! grouping columns to form a group key; one bucket per distinct key
//! carries one accumulator per configured aggregate. After the input is
//! drained, groups are emitted sorted ascending by their key columns.
//!
//! An empty grouping list means a single implicit group over the entire
//! input. That group exists even for empty input, so COUNT and SUM report
//! zero there; MIN/MAX over no input are undefined, and a group where any
//! MIN/MAX accumulator never saw a value emits no row.

use rustc_hash::FxHashMap;

use crate::core::{Error, Register, RegisterType, Result, Tuple};

use super::operator::Operator;

/// Aggregate function applied by one [`AggregateSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    /// Running minimum under register ordering
    Min,
    /// Running maximum under register ordering
    Max,
    /// Running INT64 sum; the input column must be INT64
    Sum,
    /// Tuple count per group
    Count,
}

/// One aggregate: a function and the input column it reads
#[derive(Debug, Clone, Copy)]
pub struct AggregateSpec {
    pub func: AggregateFunc,
    pub column: usize,
}

impl AggregateSpec {
    pub fn min(column: usize) -> Self {
        Self {
            func: AggregateFunc::Min,
            column,
        }
    }

    pub fn max(column: usize) -> Self {
        Self {
            func: AggregateFunc::Max,
            column,
        }
    }

    pub fn sum(column: usize) -> Self {
        Self {
            func: AggregateFunc::Sum,
            column,
        }
    }

    pub fn count(column: usize) -> Self {
        Self {
            func: AggregateFunc::Count,
            column,
        }
    }
}

/// Running state of one aggregate within one group bucket.
///
/// MIN/MAX start undefined and take the first value seen; SUM and COUNT
/// start at zero. Input variants are validated against the schema at
/// operator construction, so updates cannot mistype.
#[derive(Debug, Clone)]
enum Accumulator {
    Min(Option<Register>),
    Max(Option<Register>),
    Sum(i64),
    Count(i64),
}

impl Accumulator {
    fn new(spec: &AggregateSpec) -> Self {
        match spec.func {
            AggregateFunc::Min => Accumulator::Min(None),
            AggregateFunc::Max => Accumulator::Max(None),
            AggregateFunc::Sum => Accumulator::Sum(0),
            AggregateFunc::Count => Accumulator::Count(0),
        }
    }

    fn update(&mut self, value: &Register) {
        match self {
            Accumulator::Min(current) => match current {
                None => *current = Some(*value),
                Some(min) => {
                    // Same column, same variant: the total order is the
                    // semantic one.
                    if value.cmp(min) == std::cmp::Ordering::Less {
                        *current = Some(*value);
                    }
                }
            },
            Accumulator::Max(current) => match current {
                None => *current = Some(*value),
                Some(max) => {
                    if value.cmp(max) == std::cmp::Ordering::Greater {
                        *current = Some(*value);
                    }
                }
            },
            Accumulator::Sum(total) => {
                // Int64-ness of the column is checked at construction.
                if let Register::Int64(v) = value {
                    *total += v;
                }
            }
            Accumulator::Count(count) => *count += 1,
        }
    }

    /// Final output register, or None for MIN/MAX that saw no input.
    fn finish(&self) -> Option<Register> {
        match self {
            Accumulator::Min(current) | Accumulator::Max(current) => *current,
            Accumulator::Sum(total) => Some(Register::int(*total)),
            Accumulator::Count(count) => Some(Register::int(*count)),
        }
    }
}

/// Blocking grouped aggregation over MIN/MAX/SUM/COUNT.
///
/// Output tuple layout: group-by columns in configuration order, followed
/// by one register per aggregate in configuration order.
impl std::fmt::Debug for HashAggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashAggregation").finish_non_exhaustive()
    }
}

pub struct HashAggregation {
    input: Box<dyn Operator>,
    group_columns: Vec<usize>,
    specs: Vec<AggregateSpec>,
    schema: Vec<RegisterType>,
    buffer: Vec<Tuple>,
    cursor: usize,
    materialized: bool,
}

impl HashAggregation {
    /// Create an aggregation of `input` grouped by `group_columns`,
    /// computing `specs` per group.
    ///
    /// Fails on out-of-range columns and on SUM over a CHAR16 column.
    pub fn new(
        input: Box<dyn Operator>,
        group_columns: Vec<usize>,
        specs: Vec<AggregateSpec>,
    ) -> Result<Self> {
        let arity = input.schema().len();
        for &column in group_columns.iter().chain(specs.iter().map(|s| &s.column)) {
            if column >= arity {
                return Err(Error::column_out_of_bounds(column, arity));
            }
        }
        for spec in &specs {
            if spec.func == AggregateFunc::Sum
                && input.schema()[spec.column] != RegisterType::Int64
            {
                return Err(Error::SumColumnNotInt64 { index: spec.column });
            }
        }

        let mut schema = Vec::with_capacity(group_columns.len() + specs.len());
        schema.extend(group_columns.iter().map(|&c| input.schema()[c]));
        schema.extend(specs.iter().map(|spec| match spec.func {
            AggregateFunc::Min | AggregateFunc::Max => input.schema()[spec.column],
            AggregateFunc::Sum | AggregateFunc::Count => RegisterType::Int64,
        }));

        Ok(Self {
            input,
            group_columns,
            specs,
            schema,
            buffer: Vec::new(),
            cursor: 0,
            materialized: false,
        })
    }

    fn materialize(&mut self) -> Result<()> {
        let mut groups: FxHashMap<Tuple, Vec<Accumulator>> = FxHashMap::default();

        // With no grouping columns there is exactly one implicit group,
        // present even over empty input.
        if self.group_columns.is_empty() {
            groups.insert(
                Tuple::new(),
                self.specs.iter().map(Accumulator::new).collect(),
            );
        }

        while self.input.advance()? {
            let regs = self.input.output();
            let key: Tuple = self.group_columns.iter().map(|&c| regs[c]).collect();
            let bucket = groups
                .entry(key)
                .or_insert_with(|| self.specs.iter().map(Accumulator::new).collect());
            for (accumulator, spec) in bucket.iter_mut().zip(&self.specs) {
                accumulator.update(&regs[spec.column]);
            }
        }

        // Emit groups sorted ascending by key.
        let mut entries: Vec<(Tuple, Vec<Accumulator>)> = groups.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        'group: for (key, accumulators) in entries {
            let mut tuple: Tuple = key.iter().copied().collect();
            for accumulator in &accumulators {
                match accumulator.finish() {
                    Some(reg) => tuple.push(reg),
                    // MIN/MAX over no input: the row is suppressed.
                    None => continue 'group,
                }
            }
            self.buffer.push(tuple);
        }

        self.materialized = true;
        Ok(())
    }
}

impl Operator for HashAggregation {
    fn open(&mut self) -> Result<()> {
        self.input.open()
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.materialized {
            self.materialize()?;
        }
        if self.cursor >= self.buffer.len() {
            return Ok(false);
        }
        self.cursor += 1;
        Ok(true)
    }

    fn output(&self) -> &[Register] {
        debug_assert!(self.cursor > 0, "output() called before advance()");
        &self.buffer[self.cursor - 1]
    }

    fn close(&mut self) -> Result<()> {
        self.buffer = Vec::new();
        self.input.close()
    }

    fn schema(&self) -> &[RegisterType] {
        &self.schema
    }

    fn name(&self) -> &str {
        "HashAggregation"
    }
}
