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

//! Projection operator.
//!
//! Emits, for each input tuple, the columns at the configured positions,
//! in the configured order. Positions may repeat and may appear in any
//! order. One tuple in, one tuple out - fully pipelining.

use crate::core::{Error, Register, RegisterType, Result, Tuple};

use super::operator::Operator;

/// Pipelining column selector.
impl std::fmt::Debug for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projection").finish_non_exhaustive()
    }
}

pub struct Projection {
    input: Box<dyn Operator>,
    indices: Vec<usize>,
    schema: Vec<RegisterType>,
    output: Tuple,
}

impl Projection {
    /// Create a projection of `input` onto the columns at `indices`.
    ///
    /// Fails if any index is outside the input schema.
    pub fn new(input: Box<dyn Operator>, indices: Vec<usize>) -> Result<Self> {
        let arity = input.schema().len();
        for &index in &indices {
            if index >= arity {
                return Err(Error::column_out_of_bounds(index, arity));
            }
        }
        let schema = indices.iter().map(|&i| input.schema()[i]).collect();
        Ok(Self {
            input,
            indices,
            schema,
            output: Tuple::new(),
        })
    }
}

impl Operator for Projection {
    fn open(&mut self) -> Result<()> {
        self.input.open()
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.input.advance()? {
            return Ok(false);
        }
        let regs = self.input.output();
        self.output.clear();
        for &index in &self.indices {
            self.output.push(regs[index]);
        }
        Ok(true)
    }

    fn output(&self) -> &[Register] {
        &self.output
    }

    fn close(&mut self) -> Result<()> {
        self.input.close()
    }

    fn schema(&self) -> &[RegisterType] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Projection"
    }
}
