// Unit tests for dependency ordering.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use crate::error::DecompileError;
use crate::toposort::{toposort, toposort_json};

fn graph(entries: &[(&'static str, &[&'static str])]) -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    entries
        .iter()
        .map(|(node, deps)| (*node, deps.iter().copied().collect()))
        .collect()
}

#[test]
fn test_simple() {
    let data = graph(&[("a", &["b"]), ("b", &[])]);
    assert_eq!(toposort(data).unwrap(), vec!["b", "a"]);
}

#[test]
fn test_adds_orphan_nodes() {
    let data = graph(&[("a", &["b"])]);
    assert_eq!(toposort(data).unwrap(), vec!["b", "a"]);
}

#[test]
fn test_ready_nodes_are_sorted() {
    let data = graph(&[("a", &["c", "b", "f", "j", "q"])]);
    assert_eq!(toposort(data).unwrap(), vec!["b", "c", "f", "j", "q", "a"]);
}

#[test]
fn test_cycle_is_reported() {
    let data = graph(&[("a", &["b"]), ("b", &["a"])]);
    let err = toposort(data).unwrap_err();

    assert!(matches!(err, DecompileError::CyclicDependency { .. }));
    assert!(err.to_string().starts_with("A cyclic dependency"));
}

#[test]
fn test_ignores_self_dependencies() {
    let data = graph(&[("a", &["a", "b"])]);
    assert_eq!(toposort(data).unwrap(), vec!["b", "a"]);
}

#[test]
fn test_empty_input() {
    assert_eq!(toposort(graph(&[])).unwrap(), Vec::<&str>::new());
    assert_eq!(toposort(graph(&[("a", &[])])).unwrap(), vec!["a"]);
}

#[test]
fn test_library_build_order() {
    let data = graph(&[
        ("des_system_lib", &["std", "synopsys", "std_cell_lib", "des_system_lib", "dw02", "dw01", "ramlib", "ieee"]),
        ("dw01", &["ieee", "dw01", "dware", "gtech"]),
        ("dw02", &["ieee", "dw02", "dware"]),
        ("dw03", &["std", "synopsys", "dware", "dw03", "dw02", "dw01", "ieee", "gtech"]),
        ("dw04", &["dw04", "ieee", "dw01", "dware", "gtech"]),
        ("dw05", &["dw05", "ieee", "dware"]),
        ("dw06", &["dw06", "ieee", "dware"]),
        ("dw07", &["ieee", "dware"]),
        ("dware", &["ieee", "dware"]),
        ("gtech", &["ieee", "gtech"]),
        ("ramlib", &["std", "ieee"]),
        ("std_cell_lib", &["ieee", "std_cell_lib"]),
        ("synopsys", &[]),
    ]);

    let expected: Vec<&str> = "ieee std synopsys dware gtech ramlib std_cell_lib \
                               dw01 dw02 dw05 dw06 dw07 des_system_lib dw03 dw04"
        .split_whitespace()
        .collect();
    assert_eq!(toposort(data).unwrap(), expected);
}

#[test]
fn test_json_entry_point() {
    let doc = json!({"a": ["b"], "b": []});
    assert_eq!(toposort_json(&doc).unwrap(), vec!["b", "a"]);
}

#[test]
fn test_json_rejects_non_object() {
    let err = toposort_json(&json!("3")).unwrap_err();
    assert_eq!(err.to_string(), "Data must be a dictionary of sets");
}

#[test]
fn test_json_rejects_non_set_values() {
    for doc in [json!({"a": "b"}), json!({"a": ["a", "a"]}), json!({"a": [1]})] {
        let err = toposort_json(&doc).unwrap_err();
        assert_eq!(err.to_string(), "All values must be sets", "input {}", doc);
    }
}
