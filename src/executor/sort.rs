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

//! Sort operator.
//!
//! Blocking: the first `advance()` drains the input into a tuple buffer,
//! sorts it by the configured criteria, then replays from the buffer. The
//! criteria apply left-to-right as primary, secondary, and so on, each with
//! its own direction. The underlying sort is stable, so ties after all
//! criteria keep their input order within a run.

use std::cmp::Ordering;

use crate::core::{Error, Register, RegisterType, Result, Tuple};

use super::operator::Operator;

/// Direction of one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One sort key: a column position and a direction
#[derive(Debug, Clone, Copy)]
pub struct SortCriterion {
    pub column: usize,
    pub order: SortOrder,
}

impl SortCriterion {
    /// Ascending key on `column`.
    pub fn asc(column: usize) -> Self {
        Self {
            column,
            order: SortOrder::Ascending,
        }
    }

    /// Descending key on `column`.
    pub fn desc(column: usize) -> Self {
        Self {
            column,
            order: SortOrder::Descending,
        }
    }
}

/// Blocking multi-key sort.
impl std::fmt::Debug for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sort").finish_non_exhaustive()
    }
}

pub struct Sort {
    input: Box<dyn Operator>,
    criteria: Vec<SortCriterion>,
    buffer: Vec<Tuple>,
    cursor: usize,
    materialized: bool,
}

impl Sort {
    /// Create a sort of `input` by `criteria`, applied left-to-right.
    ///
    /// Fails if any criterion references a column outside the input schema.
    pub fn new(input: Box<dyn Operator>, criteria: Vec<SortCriterion>) -> Result<Self> {
        let arity = input.schema().len();
        for criterion in &criteria {
            if criterion.column >= arity {
                return Err(Error::column_out_of_bounds(criterion.column, arity));
            }
        }
        Ok(Self {
            input,
            criteria,
            buffer: Vec::new(),
            cursor: 0,
            materialized: false,
        })
    }

    fn materialize(&mut self) -> Result<()> {
        while self.input.advance()? {
            self.buffer
                .push(Tuple::from_values(self.input.output().to_vec()));
        }

        let criteria = &self.criteria;
        self.buffer.sort_by(|a, b| {
            for criterion in criteria {
                let cmp = a[criterion.column].cmp(&b[criterion.column]);
                let cmp = match criterion.order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        self.materialized = true;
        Ok(())
    }
}

impl Operator for Sort {
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
        self.input.schema()
    }

    fn name(&self) -> &str {
        "Sort"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::{collect_tuples, MaterializedOperator};

    fn int_source(data: Vec<Vec<i64>>) -> Box<dyn Operator> {
        let arity = data.first().map(|t| t.len()).unwrap_or(0);
        let tuples = data
            .into_iter()
            .map(|vals| vals.into_iter().map(Register::int).collect())
            .collect();
        Box::new(MaterializedOperator::new(
            tuples,
            vec![RegisterType::Int64; arity],
        ))
    }

    fn rows(results: &[Tuple]) -> Vec<Vec<i64>> {
        results
            .iter()
            .map(|t| t.iter().map(|r| r.as_int().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_multi_key_ascending() {
        let input = int_source(vec![vec![1, 2], vec![1, 1], vec![2, 0]]);
        let mut sort = Sort::new(input, vec![SortCriterion::asc(0), SortCriterion::asc(1)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();
        assert_eq!(rows(&results), vec![vec![1, 1], vec![1, 2], vec![2, 0]]);
    }

    #[test]
    fn test_mixed_directions() {
        let input = int_source(vec![vec![1, 2], vec![2, 1], vec![1, 3], vec![2, 9]]);
        let mut sort =
            Sort::new(input, vec![SortCriterion::asc(0), SortCriterion::desc(1)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();
        assert_eq!(
            rows(&results),
            vec![vec![1, 3], vec![1, 2], vec![2, 9], vec![2, 1]]
        );
    }

    #[test]
    fn test_descending_primary() {
        let input = int_source(vec![vec![1], vec![3], vec![2]]);
        let mut sort = Sort::new(input, vec![SortCriterion::desc(0)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();
        assert_eq!(rows(&results), vec![vec![3], vec![2], vec![1]]);
    }

    #[test]
    fn test_ties_are_stable() {
        let input = int_source(vec![vec![1, 10], vec![1, 30], vec![1, 20]]);
        let mut sort = Sort::new(input, vec![SortCriterion::asc(0)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();
        // Single-key ties keep input order.
        assert_eq!(
            rows(&results),
            vec![vec![1, 10], vec![1, 30], vec![1, 20]]
        );
    }

    #[test]
    fn test_string_keys_sort_bytewise() {
        let tuples = vec![
            Tuple::from_values(vec![Register::string("pear").unwrap()]),
            Tuple::from_values(vec![Register::string("fig").unwrap()]),
            Tuple::from_values(vec![Register::string("apple").unwrap()]),
        ];
        let input = Box::new(MaterializedOperator::new(
            tuples,
            vec![RegisterType::Char16],
        ));
        let mut sort = Sort::new(input, vec![SortCriterion::asc(0)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();
        let names: Vec<String> = results.iter().map(|t| t[0].to_string()).collect();
        assert_eq!(names, vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_sort_is_a_permutation() {
        let data = vec![vec![5], vec![3], vec![5], vec![1], vec![3]];
        let input = int_source(data.clone());
        let mut sort = Sort::new(input, vec![SortCriterion::asc(0)]).unwrap();
        let results = collect_tuples(&mut sort).unwrap();

        let mut expected: Vec<i64> = data.into_iter().map(|t| t[0]).collect();
        expected.sort_unstable();
        assert_eq!(
            rows(&results).into_iter().flatten().collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_empty_input() {
        let input = int_source(vec![]);
        let mut sort = Sort::new(input, vec![]).unwrap();
        assert!(collect_tuples(&mut sort).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_criterion_rejected() {
        let input = int_source(vec![vec![1]]);
        let err = Sort::new(input, vec![SortCriterion::asc(3)]).unwrap_err();
        assert_eq!(err, Error::column_out_of_bounds(3, 1));
    }
}
