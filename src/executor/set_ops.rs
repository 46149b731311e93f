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

//! Set operations (UNION, INTERSECT, EXCEPT) in duplicate-preserving and
//! duplicate-eliminating variants.
//!
//! All six operations share one shape: blocking, both inputs drained into
//! per-side multiplicity maps keyed by the whole tuple, the result multiset
//! computed per operation, and the result emitted in ascending
//! tuple-lexicographic order.
//!
//! Result multiplicity per distinct tuple, with l and r the input
//! multiplicities:
//!
//! | Operation    | Multiplicity                       |
//! |--------------|------------------------------------|
//! | Union        | 1 if l + r > 0                     |
//! | UnionAll     | l + r                              |
//! | Intersect    | 1 if l > 0 and r > 0               |
//! | IntersectAll | min(l, r)                          |
//! | Except       | 1 if l > 0 and r = 0               |
//! | ExceptAll    | max(l - r, 0)                      |

use rustc_hash::FxHashMap;

use crate::core::{Error, Register, RegisterType, Result, Tuple};

use super::operator::Operator;

/// Which of the six set operations to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    /// Duplicate-eliminating union
    Union,
    /// Multiset union (sum of multiplicities)
    UnionAll,
    /// Duplicate-eliminating intersection
    Intersect,
    /// Multiset intersection (min of multiplicities)
    IntersectAll,
    /// Duplicate-eliminating left-minus-right
    Except,
    /// Multiset difference (left minus right, floored at zero)
    ExceptAll,
}

impl SetOpKind {
    fn name(&self) -> &'static str {
        match self {
            SetOpKind::Union => "Union",
            SetOpKind::UnionAll => "UnionAll",
            SetOpKind::Intersect => "Intersect",
            SetOpKind::IntersectAll => "IntersectAll",
            SetOpKind::Except => "Except",
            SetOpKind::ExceptAll => "ExceptAll",
        }
    }
}

/// Blocking set operation over two inputs of identical schema.
impl std::fmt::Debug for SetOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetOperation").finish_non_exhaustive()
    }
}

pub struct SetOperation {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    kind: SetOpKind,
    buffer: Vec<Tuple>,
    cursor: usize,
    materialized: bool,
}

impl SetOperation {
    /// Create a set operation over `left` and `right`.
    ///
    /// Both inputs must have the same column count and matching per-column
    /// variants.
    pub fn new(kind: SetOpKind, left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        if left.schema().len() != right.schema().len() {
            return Err(Error::ColumnCountMismatch {
                left: left.schema().len(),
                right: right.schema().len(),
            });
        }
        for (index, (l, r)) in left.schema().iter().zip(right.schema()).enumerate() {
            if l != r {
                return Err(Error::ColumnTypeMismatch { index });
            }
        }
        Ok(Self {
            left,
            right,
            kind,
            buffer: Vec::new(),
            cursor: 0,
            materialized: false,
        })
    }

    /// Duplicate-eliminating union of `left` and `right`.
    pub fn union(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::Union, left, right)
    }

    /// Multiset union of `left` and `right`.
    pub fn union_all(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::UnionAll, left, right)
    }

    /// Duplicate-eliminating intersection of `left` and `right`.
    pub fn intersect(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::Intersect, left, right)
    }

    /// Multiset intersection of `left` and `right`.
    pub fn intersect_all(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::IntersectAll, left, right)
    }

    /// Duplicate-eliminating difference `left` minus `right`.
    pub fn except(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::Except, left, right)
    }

    /// Multiset difference `left` minus `right`.
    pub fn except_all(left: Box<dyn Operator>, right: Box<dyn Operator>) -> Result<Self> {
        Self::new(SetOpKind::ExceptAll, left, right)
    }

    fn drain_into_counts(input: &mut dyn Operator) -> Result<FxHashMap<Tuple, u64>> {
        let mut counts: FxHashMap<Tuple, u64> = FxHashMap::default();
        while input.advance()? {
            let tuple = Tuple::from_values(input.output().to_vec());
            *counts.entry(tuple).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn materialize(&mut self) -> Result<()> {
        let left_counts = Self::drain_into_counts(self.left.as_mut())?;
        let mut right_counts = Self::drain_into_counts(self.right.as_mut())?;

        match self.kind {
            SetOpKind::Union => {
                for tuple in left_counts.into_keys() {
                    right_counts.remove(&tuple);
                    self.buffer.push(tuple);
                }
                self.buffer.extend(right_counts.into_keys());
            }
            SetOpKind::UnionAll => {
                for (tuple, count) in left_counts {
                    let total = count + right_counts.remove(&tuple).unwrap_or(0);
                    self.push_copies(tuple, total);
                }
                for (tuple, count) in right_counts {
                    self.push_copies(tuple, count);
                }
            }
            SetOpKind::Intersect => {
                for tuple in left_counts.into_keys() {
                    if right_counts.contains_key(&tuple) {
                        self.buffer.push(tuple);
                    }
                }
            }
            SetOpKind::IntersectAll => {
                for (tuple, count) in left_counts {
                    if let Some(&right_count) = right_counts.get(&tuple) {
                        self.push_copies(tuple, count.min(right_count));
                    }
                }
            }
            SetOpKind::Except => {
                for tuple in left_counts.into_keys() {
                    if !right_counts.contains_key(&tuple) {
                        self.buffer.push(tuple);
                    }
                }
            }
            SetOpKind::ExceptAll => {
                for (tuple, count) in left_counts {
                    let right_count = right_counts.get(&tuple).copied().unwrap_or(0);
                    self.push_copies(tuple, count.saturating_sub(right_count));
                }
            }
        }

        self.buffer.sort();
        self.materialized = true;
        Ok(())
    }

    fn push_copies(&mut self, tuple: Tuple, count: u64) {
        for _ in 1..count {
            self.buffer.push(tuple.clone());
        }
        if count > 0 {
            self.buffer.push(tuple);
        }
    }
}

impl Operator for SetOperation {
    fn open(&mut self) -> Result<()> {
        self.left.open()?;
        self.right.open()
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
        self.left.close()?;
        self.right.close()
    }

    fn schema(&self) -> &[RegisterType] {
        self.left.schema()
    }

    fn name(&self) -> &str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::{collect_tuples, MaterializedOperator};

    fn int_source(values: Vec<i64>) -> Box<dyn Operator> {
        let tuples = values
            .into_iter()
            .map(|v| Tuple::from_values(vec![Register::int(v)]))
            .collect();
        Box::new(MaterializedOperator::new(
            tuples,
            vec![RegisterType::Int64],
        ))
    }

    fn run(kind: SetOpKind, left: Vec<i64>, right: Vec<i64>) -> Vec<i64> {
        let mut op = SetOperation::new(kind, int_source(left), int_source(right)).unwrap();
        collect_tuples(&mut op)
            .unwrap()
            .iter()
            .map(|t| t[0].as_int().unwrap())
            .collect()
    }

    // The shared fixture: left = {1,1,2,3}, right = {1,3,3,4}.
    const LEFT: [i64; 4] = [1, 1, 2, 3];
    const RIGHT: [i64; 4] = [1, 3, 3, 4];

    #[test]
    fn test_union() {
        assert_eq!(
            run(SetOpKind::Union, LEFT.to_vec(), RIGHT.to_vec()),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_union_all() {
        assert_eq!(
            run(SetOpKind::UnionAll, LEFT.to_vec(), RIGHT.to_vec()),
            vec![1, 1, 1, 2, 3, 3, 3, 4]
        );
    }

    #[test]
    fn test_intersect() {
        assert_eq!(
            run(SetOpKind::Intersect, LEFT.to_vec(), RIGHT.to_vec()),
            vec![1, 3]
        );
    }

    #[test]
    fn test_intersect_all() {
        assert_eq!(
            run(SetOpKind::IntersectAll, LEFT.to_vec(), RIGHT.to_vec()),
            vec![1, 3]
        );
    }

    #[test]
    fn test_except() {
        assert_eq!(
            run(SetOpKind::Except, LEFT.to_vec(), RIGHT.to_vec()),
            vec![2]
        );
    }

    #[test]
    fn test_except_all() {
        assert_eq!(
            run(SetOpKind::ExceptAll, LEFT.to_vec(), RIGHT.to_vec()),
            vec![1, 2]
        );
    }

    #[test]
    fn test_intersect_all_takes_min_multiplicity() {
        assert_eq!(
            run(SetOpKind::IntersectAll, vec![5, 5, 5], vec![5, 5]),
            vec![5, 5]
        );
        assert_eq!(
            run(SetOpKind::IntersectAll, vec![5], vec![5, 5, 5]),
            vec![5]
        );
    }

    #[test]
    fn test_except_all_floors_at_zero() {
        assert_eq!(run(SetOpKind::ExceptAll, vec![7], vec![7, 7, 7]), vec![]);
        assert_eq!(
            run(SetOpKind::ExceptAll, vec![7, 7, 7], vec![7]),
            vec![7, 7]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(run(SetOpKind::Union, vec![], vec![2, 1]), vec![1, 2]);
        assert_eq!(run(SetOpKind::UnionAll, vec![1], vec![]), vec![1]);
        assert_eq!(run(SetOpKind::Intersect, vec![1, 2], vec![]), vec![]);
        assert_eq!(run(SetOpKind::Except, vec![], vec![1]), vec![]);
        assert_eq!(run(SetOpKind::ExceptAll, vec![], vec![]), vec![]);
    }

    #[test]
    fn test_multi_column_tuples_as_keys() {
        let left_tuples = vec![
            Tuple::from_values(vec![Register::int(1), Register::string("a").unwrap()]),
            Tuple::from_values(vec![Register::int(1), Register::string("b").unwrap()]),
        ];
        let right_tuples = vec![Tuple::from_values(vec![
            Register::int(1),
            Register::string("b").unwrap(),
        ])];
        let schema = vec![RegisterType::Int64, RegisterType::Char16];
        let left = Box::new(MaterializedOperator::new(left_tuples, schema.clone()));
        let right = Box::new(MaterializedOperator::new(right_tuples, schema));

        let mut op = SetOperation::except(left, right).unwrap();
        let results = collect_tuples(&mut op).unwrap();

        // (1,"a") differs from (1,"b") in the second column only.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0][1], Register::string("a").unwrap());
    }

    #[test]
    fn test_emission_is_sorted_lexicographically() {
        let left_tuples = vec![
            Tuple::from_values(vec![Register::int(2), Register::int(1)]),
            Tuple::from_values(vec![Register::int(1), Register::int(9)]),
            Tuple::from_values(vec![Register::int(1), Register::int(2)]),
        ];
        let schema = vec![RegisterType::Int64, RegisterType::Int64];
        let left = Box::new(MaterializedOperator::new(left_tuples, schema.clone()));
        let right = Box::new(MaterializedOperator::new(vec![], schema));

        let mut op = SetOperation::union_all(left, right).unwrap();
        let results = collect_tuples(&mut op).unwrap();

        let ordered: Vec<(i64, i64)> = results
            .iter()
            .map(|t| (t[0].as_int().unwrap(), t[1].as_int().unwrap()))
            .collect();
        assert_eq!(ordered, vec![(1, 2), (1, 9), (2, 1)]);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let left = int_source(vec![1]);
        let right_tuples = vec![Tuple::from_values(vec![Register::int(1), Register::int(2)])];
        let right = Box::new(MaterializedOperator::new(
            right_tuples,
            vec![RegisterType::Int64, RegisterType::Int64],
        ));
        assert_eq!(
            SetOperation::union(left, right).unwrap_err(),
            Error::ColumnCountMismatch { left: 1, right: 2 }
        );
    }

    #[test]
    fn test_variant_mismatch_rejected() {
        let left = int_source(vec![1]);
        let right = Box::new(MaterializedOperator::new(
            vec![Tuple::from_values(vec![Register::string("x").unwrap()])],
            vec![RegisterType::Char16],
        ));
        assert_eq!(
            SetOperation::intersect(left, right).unwrap_err(),
            Error::ColumnTypeMismatch { index: 0 }
        );
    }

    #[test]
    fn test_operator_names() {
        let mk = |kind| {
            SetOperation::new(kind, int_source(vec![]), int_source(vec![])).unwrap()
        };
        assert_eq!(mk(SetOpKind::Union).name(), "Union");
        assert_eq!(mk(SetOpKind::ExceptAll).name(), "ExceptAll");
    }
}
