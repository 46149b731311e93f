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

//! End-to-end pipeline tests composing multiple operators.

use relalg::{
    collect_tuples, AggregateSpec, CompareOp, HashAggregation, HashJoin, MaterializedOperator,
    Operator, Predicate, Print, Projection, Register, RegisterType, Selection, SetOperation, Sort,
    SortCriterion, Tuple,
};

fn int_char_source(data: Vec<(i64, &str)>) -> Box<dyn Operator> {
    let tuples = data
        .into_iter()
        .map(|(a, b)| Tuple::from_values(vec![Register::int(a), Register::string(b).unwrap()]))
        .collect();
    Box::new(MaterializedOperator::new(
        tuples,
        vec![RegisterType::Int64, RegisterType::Char16],
    ))
}

fn int_source(data: Vec<Vec<i64>>, arity: usize) -> Box<dyn Operator> {
    let tuples = data
        .into_iter()
        .map(|vals| vals.into_iter().map(Register::int).collect())
        .collect();
    Box::new(MaterializedOperator::new(
        tuples,
        vec![RegisterType::Int64; arity],
    ))
}

fn drive_to_sink(mut print: Print<Vec<u8>>) -> String {
    print.open().unwrap();
    while print.advance().unwrap() {}
    print.close().unwrap();
    String::from_utf8(print.into_sink()).unwrap()
}

/// Projection over selection, printed: SELECT b FROM r WHERE a > 1.
#[test]
fn test_projection_selection_print() {
    let scan = int_char_source(vec![(1, "x"), (2, "y"), (3, "x")]);
    let filter = Selection::new(
        scan,
        Predicate::IntConstant {
            column: 0,
            op: CompareOp::Gt,
            constant: 1,
        },
    )
    .unwrap();
    let project = Projection::new(Box::new(filter), vec![1]).unwrap();
    let print = Print::new(Box::new(project), Vec::new());

    assert_eq!(drive_to_sink(print), "y\nx\n");
}

/// Multi-key sort: ORDER BY a ASC, b ASC.
#[test]
fn test_sort_multi_key() {
    let scan = int_source(vec![vec![1, 2], vec![1, 1], vec![2, 0]], 2);
    let mut sort = Sort::new(scan, vec![SortCriterion::asc(0), SortCriterion::asc(1)]).unwrap();

    let results = collect_tuples(&mut sort).unwrap();
    let rows: Vec<(i64, i64)> = results
        .iter()
        .map(|t| (t[0].as_int().unwrap(), t[1].as_int().unwrap()))
        .collect();
    assert_eq!(rows, vec![(1, 1), (1, 2), (2, 0)]);
}

/// Join multiset: L(a, x) joined with R(b, y) on a = b.
#[test]
fn test_hash_join_multiset() {
    let left = int_char_source(vec![(1, "p"), (2, "q"), (1, "r")]);
    let right = int_char_source(vec![(1, "u"), (1, "v"), (3, "w")]);
    let mut join = HashJoin::new(left, right, 0, 0).unwrap();

    let mut results = collect_tuples(&mut join).unwrap();
    results.sort();

    let expected: Vec<Tuple> = [
        (1, "p", 1, "u"),
        (1, "p", 1, "v"),
        (1, "r", 1, "u"),
        (1, "r", 1, "v"),
    ]
    .iter()
    .map(|&(a, x, b, y)| {
        Tuple::from_values(vec![
            Register::int(a),
            Register::string(x).unwrap(),
            Register::int(b),
            Register::string(y).unwrap(),
        ])
    })
    .collect();
    assert_eq!(results, expected);
}

/// Grouped aggregation: SELECT g, SUM(v), COUNT(v) GROUP BY g.
#[test]
fn test_hash_aggregation_grouped() {
    let scan = int_source(vec![vec![1, 10], vec![1, 20], vec![2, 5]], 2);
    let mut agg = HashAggregation::new(
        scan,
        vec![0],
        vec![AggregateSpec::sum(1), AggregateSpec::count(1)],
    )
    .unwrap();

    let results = collect_tuples(&mut agg).unwrap();
    let rows: Vec<Vec<i64>> = results
        .iter()
        .map(|t| t.iter().map(|r| r.as_int().unwrap()).collect())
        .collect();
    assert_eq!(rows, vec![vec![1, 30, 2], vec![2, 5, 1]]);
}

/// All six set operations over the same pair of single-column inputs.
#[test]
fn test_set_operations_family() {
    let cases: Vec<(fn(Box<dyn Operator>, Box<dyn Operator>) -> relalg::Result<SetOperation>, Vec<i64>)> = vec![
        (SetOperation::union, vec![1, 2, 3, 4]),
        (SetOperation::union_all, vec![1, 1, 1, 2, 3, 3, 3, 4]),
        (SetOperation::intersect, vec![1, 3]),
        (SetOperation::intersect_all, vec![1, 3]),
        (SetOperation::except, vec![2]),
        (SetOperation::except_all, vec![1, 2]),
    ];

    for (build, expected) in cases {
        let left = int_source(vec![vec![1], vec![1], vec![2], vec![3]], 1);
        let right = int_source(vec![vec![1], vec![3], vec![3], vec![4]], 1);
        let mut op = build(left, right).unwrap();

        let results = collect_tuples(&mut op).unwrap();
        let values: Vec<i64> = results.iter().map(|t| t[0].as_int().unwrap()).collect();
        assert_eq!(values, expected);
    }
}

/// Aggregation over empty input with no grouping: COUNT is zero.
#[test]
fn test_empty_input_aggregation() {
    let scan = int_source(vec![], 1);
    let mut agg = HashAggregation::new(scan, vec![], vec![AggregateSpec::count(0)]).unwrap();

    let results = collect_tuples(&mut agg).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0][0], Register::int(0));
}

/// A deeper tree: join feeding aggregation feeding sort feeding print.
#[test]
fn test_join_aggregate_sort_print() {
    // orders(customer, amount) joined against customers(id, name),
    // then total amount per customer id, largest total first.
    let orders = int_source(
        vec![vec![1, 100], vec![2, 50], vec![1, 25], vec![3, 75]],
        2,
    );
    let customers = int_source(vec![vec![1], vec![2], vec![3]], 1);

    let join = HashJoin::new(orders, customers, 0, 0).unwrap();
    let agg = HashAggregation::new(Box::new(join), vec![2], vec![AggregateSpec::sum(1)]).unwrap();
    let sort = Sort::new(Box::new(agg), vec![SortCriterion::desc(1)]).unwrap();
    let print = Print::new(Box::new(sort), Vec::new());

    assert_eq!(drive_to_sink(print), "1,125\n3,75\n2,50\n");
}

/// Close before exhaustion releases the tree without error.
#[test]
fn test_early_close() {
    let scan = int_source(vec![vec![3], vec![1], vec![2]], 1);
    let mut sort = Sort::new(scan, vec![SortCriterion::asc(0)]).unwrap();

    sort.open().unwrap();
    assert!(sort.advance().unwrap());
    assert_eq!(sort.output(), &[Register::int(1)]);
    sort.close().unwrap();
}

/// Blocking operators stay exhausted after the last tuple.
#[test]
fn test_exhaustion_is_stable() {
    let scan = int_source(vec![vec![1]], 1);
    let mut sort = Sort::new(scan, vec![SortCriterion::asc(0)]).unwrap();

    sort.open().unwrap();
    assert!(sort.advance().unwrap());
    assert!(!sort.advance().unwrap());
    assert!(!sort.advance().unwrap());
    sort.close().unwrap();
}
