// Unit tests for statement templates: placeholder parsing, dependency
// extraction and rendering against a name oracle.

use std::collections::HashMap;

use crate::error::{DecompileError, Result};
use crate::statement::{Reference, Statement, StatementGroup};
use crate::value::{ValueGraph, ValueId};

struct Names(HashMap<ValueId, String>);

impl Reference for Names {
    fn reference(&self, value: ValueId) -> Result<String> {
        self.0
            .get(&value)
            .cloned()
            .ok_or(DecompileError::UnregisteredValue { value })
    }
}

fn ids(n: usize) -> Vec<ValueId> {
    let mut graph = ValueGraph::new();
    (0..n).map(|i| graph.int(i as i64)).collect()
}

#[test]
fn test_dependencies_in_order_of_first_appearance() {
    let v = ids(3);
    let s = Statement::new("{{b}} + {{a}} * {{b}}")
        .slot("a", v[0])
        .slot("b", v[1])
        .defines(v[2]);

    assert_eq!(s.dependencies().unwrap(), vec![v[1], v[0]]);
}

#[test]
fn test_unused_slots_are_not_dependencies() {
    let v = ids(3);
    let s = Statement::new("f({{a}})").slot("a", v[0]).slot("unused", v[1]);

    assert_eq!(s.dependencies().unwrap(), vec![v[0]]);
}

#[test]
fn test_placeholders_allow_inner_whitespace() {
    let v = ids(2);
    let s = Statement::new("{{ x }}.set_alpha( {{val}} )")
        .slot("x", v[0])
        .slot("val", v[1]);
    let names = Names(HashMap::from([(v[0], "p".to_string()), (v[1], "0.5".to_string())]));

    assert_eq!(s.render(&names).unwrap(), "p.set_alpha( 0.5 )");
}

#[test]
fn test_other_braces_are_copied() {
    let v = ids(1);
    let s = Statement::new("{'a': {{x}}, 'b': {}}").slot("x", v[0]);
    let names = Names(HashMap::from([(v[0], "x".to_string())]));

    assert_eq!(s.render(&names).unwrap(), "{'a': x, 'b': {}}");
}

#[test]
fn test_missing_slot_is_reported_by_tag() {
    let s = Statement::new("{{x}} + {{y}}").slot("x", ids(1)[0]);

    match s.dependencies() {
        Err(DecompileError::MissingDependency { tag }) => assert_eq!(tag, "y"),
        other => panic!("expected MissingDependency, got {:?}", other),
    }
}

#[test]
fn test_empty_statement_has_no_template() {
    let s = Statement::empty();
    assert!(matches!(s.dependencies(), Err(DecompileError::MissingTemplate)));
    assert!(matches!(s.render(&Names(HashMap::new())), Err(DecompileError::MissingTemplate)));

    let filled = s.with_template("1");
    assert_eq!(filled.dependencies().unwrap(), Vec::<ValueId>::new());
}

#[test]
fn test_verbatim_text_is_not_parsed() {
    let s = Statement::verbatim("'{{x}}'");

    assert!(s.dependencies().unwrap().is_empty());
    assert_eq!(s.render(&Names(HashMap::new())).unwrap(), "'{{x}}'");
}

#[test]
fn test_precedes_follows_output_into_dependencies() {
    let v = ids(2);
    let a = Statement::new("5").defines(v[0]);
    let b = Statement::new("{{x}} + 1").slot("x", v[0]).defines(v[1]);

    assert!(a.precedes(&b).unwrap());
    assert!(!b.precedes(&a).unwrap());
    assert!(!Statement::new("print()").precedes(&b).unwrap());
}

#[test]
fn test_builder_flags() {
    let v = ids(1);
    let s = Statement::new("[]").defines(v[0]).inline(true).hint("items");

    assert_eq!(s.output(), Some(v[0]));
    assert!(s.is_inlined());
    assert_eq!(s.name_hint(), Some("items"));
    assert_eq!(s.template(), Some("[]"));
}

#[test]
fn test_group_dependencies_are_a_union() {
    let v = ids(4);
    let group = StatementGroup::new(vec![
        Statement::new("f({{a}}, {{b}})").slot("a", v[0]).slot("b", v[1]).defines(v[3]),
        Statement::new("{{p}}.g({{c}}, {{a}})")
            .slot("p", v[3])
            .slot("c", v[2])
            .slot("a", v[0]),
    ]);

    assert_eq!(group.dependencies().unwrap(), vec![v[0], v[1], v[3], v[2]]);
    assert_eq!(group.len(), 2);
    assert_eq!(group.first().and_then(Statement::output), Some(v[3]));
}

#[test]
fn test_group_render_keeps_member_order() {
    let v = ids(2);
    let mut group = StatementGroup::from(Statement::new("plt.figure()").defines(v[0]));
    group.push(Statement::new("{{fig}}.show()").slot("fig", v[0]));
    let names = Names(HashMap::from([(v[0], "fig".to_string())]));

    assert_eq!(group.render(&names).unwrap(), vec!["plt.figure()", "fig.show()"]);
}
