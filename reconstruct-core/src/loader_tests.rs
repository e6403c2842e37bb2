// Unit tests for JSON value documents.

use std::io::Write;

use crate::decompile;
use crate::loader::{load_value_file, load_value_str};
use crate::value::{DType, Value};

#[test]
fn test_plain_json_values() {
    let loaded = load_value_str(r#"[1, 2.0, "3", true, null]"#).unwrap();
    let graph = &loaded.graph;

    let Value::List(items) = graph.get(loaded.root) else {
        panic!("root should be a list");
    };
    let kinds: Vec<&str> = items.iter().map(|id| graph.type_name(*id)).collect();
    assert_eq!(kinds, vec!["int", "float", "str", "bool", "NoneType"]);
}

#[test]
fn test_tagged_values_render() {
    let doc = r#"{"$tuple": [
        {"$complex": [1, 2]},
        {"$bytes": "ab"},
        {"$dict": [[1, "one"], [{"$tuple": [0]}, "zero"]]}
    ]}"#;
    let loaded = load_value_str(doc).unwrap();

    assert_eq!(
        decompile(loaded.graph, loaded.root, Some("t")).unwrap(),
        "t = ((1+2j), b'ab', {1: 'one', (0,): 'zero'})"
    );
}

#[test]
fn test_plain_objects_become_string_keyed_dicts() {
    let loaded = load_value_str(r#"{"b": 0, "a": 0}"#).unwrap();

    assert_eq!(
        decompile(loaded.graph, loaded.root, None).unwrap(),
        "object = {'a': 0, 'b': 0}"
    );
}

#[test]
fn test_refs_share_identity() {
    let doc = r#"[{"$id": "big", "$tuple": [1, 2, 3, 4, 5, 6]}, {"$ref": "big"}]"#;
    let loaded = load_value_str(doc).unwrap();

    let Value::List(items) = loaded.graph.get(loaded.root) else {
        panic!("root should be a list");
    };
    assert_eq!(items[0], items[1]);
    assert_eq!(
        decompile(loaded.graph, loaded.root, Some("pair")).unwrap(),
        "object = (1, 2, 3, 4, 5, 6)\npair = [object, object]"
    );
}

#[test]
fn test_child_may_refer_to_its_parent() {
    let doc = r#"{"$id": "fig", "$object": "Figure", "attrs": {
        "axes": [{"$object": "Axes", "attrs": {"figure": {"$ref": "fig"}}}]
    }}"#;
    let loaded = load_value_str(doc).unwrap();
    let graph = &loaded.graph;

    let axes = graph.attr(loaded.root, "axes").unwrap();
    let Value::List(items) = graph.get(axes) else {
        panic!("axes should be a list");
    };
    assert_eq!(graph.attr(items[0], "figure"), Some(loaded.root));
}

#[test]
fn test_ndarray_shape_is_inferred() {
    let loaded = load_value_str(r#"{"$ndarray": {"data": [[1, 2, 3], [4, 5, 6]]}}"#).unwrap();

    match loaded.graph.get(loaded.root) {
        Value::Array(array) => {
            assert_eq!(array.dtype, DType::Float64);
            assert_eq!(array.shape, vec![2, 3]);
            assert_eq!(array.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        }
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn test_ndarray_explicit_shape() {
    let doc = r#"{"$ndarray": {"dtype": "int64", "shape": [2, 2], "data": [1, 2, 3, 4]}}"#;
    let loaded = load_value_str(doc).unwrap();

    match loaded.graph.get(loaded.root) {
        Value::Array(array) => {
            assert_eq!(array.dtype, DType::Int64);
            assert_eq!(array.shape, vec![2, 2]);
        }
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn test_malformed_documents() {
    let cases = [
        (r#"{"$nope": 1}"#, "Unknown tag"),
        (r#"{"$ref": "missing"}"#, "Unknown $ref label"),
        (r#"[{"$id": "a", "$tuple": []}, {"$id": "a", "$tuple": []}]"#, "Duplicate $id"),
        (r#"{"$ndarray": {"shape": [3], "data": [1, 2]}}"#, "shape [3] needs 3"),
        (r#"{"$ndarray": {"data": [[1, 2], [3]]}}"#, "ragged"),
        (r#"{"$ndarray": {"dtype": "int64", "data": [1.5]}}"#, "non-integral"),
        (r#"{"$complex": [1]}"#, "[re, im]"),
        (r#"{"$tuple": [], "$bytes": ""}"#, "more than one tag"),
        (r#"{"$tuple": [], "extra": 1}"#, "Unexpected key extra"),
        (r#"[1,"#, "Invalid JSON"),
    ];

    for (doc, expected) in cases {
        let err = load_value_str(doc).unwrap_err();
        assert!(err.contains(expected), "{} -> {}", doc, err);
    }
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"$tuple": ["x"]}}"#).unwrap();

    let loaded = load_value_file(file.path()).unwrap();
    assert_eq!(decompile(loaded.graph, loaded.root, None).unwrap(), "object = ('x',)");
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = load_value_file(&path).unwrap_err();
    assert!(err.contains("absent.json"), "{}", err);
}
