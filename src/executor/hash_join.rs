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

//! Hash join operator.
//!
//! Equi-join on one left column and one right column. The join proceeds in
//! two phases:
//!
//! 1. **Build phase** (first `advance()`): drain the right input in full
//!    and build a hash table over its join column.
//! 2. **Probe phase**: stream the left input one tuple at a time, look up
//!    matches in the hash table, and emit one combined tuple per match.
//!
//! Only the build side is materialized; the probe side pipelines. For each
//! matching pair the output is the left tuple's columns in order followed
//! by the right tuple's columns in order, so a key matching m left and n
//! right tuples yields m x n combined tuples.

use crate::core::{Error, Register, RegisterType, Result, Tuple};

use super::hash_table::{hash_register, JoinHashTable};
use super::operator::Operator;

/// Equi-join with a materialized right (build) side and a streaming left
/// (probe) side.
impl std::fmt::Debug for HashJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashJoin").finish_non_exhaustive()
    }
}

pub struct HashJoin {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,

    left_column: usize,
    right_column: usize,

    // Build phase state (populated on first advance)
    build_tuples: Vec<Tuple>,
    hash_table: Option<JoinHashTable>,

    // Probe phase state
    probe_tuple: Tuple,
    matches: Vec<usize>,
    match_idx: usize,

    schema: Vec<RegisterType>,
    output: Tuple,
    opened: bool,
}

impl HashJoin {
    /// Create an equi-join of `left` and `right` on
    /// `left[left_column] == right[right_column]`.
    ///
    /// Fails if either column is out of range or the join columns disagree
    /// on their register variant.
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        left_column: usize,
        right_column: usize,
    ) -> Result<Self> {
        if left_column >= left.schema().len() {
            return Err(Error::column_out_of_bounds(left_column, left.schema().len()));
        }
        if right_column >= right.schema().len() {
            return Err(Error::column_out_of_bounds(
                right_column,
                right.schema().len(),
            ));
        }
        if left.schema()[left_column] != right.schema()[right_column] {
            return Err(Error::ColumnTypeMismatch { index: left_column });
        }

        let mut schema = Vec::with_capacity(left.schema().len() + right.schema().len());
        schema.extend_from_slice(left.schema());
        schema.extend_from_slice(right.schema());

        Ok(Self {
            left,
            right,
            left_column,
            right_column,
            build_tuples: Vec::new(),
            hash_table: None,
            probe_tuple: Tuple::new(),
            matches: Vec::new(),
            match_idx: 0,
            schema,
            output: Tuple::new(),
            opened: false,
        })
    }

    /// Drain the right input and build the hash table over its join column.
    fn build(&mut self) -> Result<()> {
        while self.right.advance()? {
            self.build_tuples
                .push(Tuple::from_values(self.right.output().to_vec()));
        }
        self.hash_table = Some(JoinHashTable::build(&self.build_tuples, self.right_column));
        Ok(())
    }
}

impl Operator for HashJoin {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()?;
        self.opened = true;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.opened {
            return Err(Error::internal("HashJoin::advance called before open"));
        }

        if self.hash_table.is_none() {
            self.build()?;
        }

        loop {
            // Emit remaining matches for the current probe tuple
            while self.match_idx < self.matches.len() {
                let build_idx = self.matches[self.match_idx];
                self.match_idx += 1;

                let build_tuple = &self.build_tuples[build_idx];
                // Verify actual key equality (handle hash collisions)
                if self.probe_tuple[self.left_column] == build_tuple[self.right_column] {
                    self.output = Tuple::from_combined(&self.probe_tuple, build_tuple);
                    return Ok(true);
                }
            }

            // Pull the next probe tuple
            if !self.left.advance()? {
                return Ok(false);
            }
            self.probe_tuple = Tuple::from_values(self.left.output().to_vec());

            let hash = hash_register(&self.probe_tuple[self.left_column]);
            let hash_table = self.hash_table.as_ref().unwrap();
            self.matches.clear();
            self.matches.extend(hash_table.probe(hash));
            self.match_idx = 0;
        }
    }

    fn output(&self) -> &[Register] {
        &self.output
    }

    fn close(&mut self) -> Result<()> {
        self.build_tuples = Vec::new();
        self.hash_table = None;
        self.left.close()?;
        self.right.close()
    }

    fn schema(&self) -> &[RegisterType] {
        &self.schema
    }

    fn name(&self) -> &str {
        "HashJoin"
    }
}
