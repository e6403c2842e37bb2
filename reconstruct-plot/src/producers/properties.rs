// Artist property tables: (property, default) pairs.
// A setter is written only when the artist's attribute differs from the
// default listed here.

use serde_json::{json, Value as Json};

use reconstruct_core::{Value, ValueGraph, ValueId};

pub type PropertyTable = Vec<(&'static str, Json)>;

pub fn plot_properties() -> PropertyTable {
    vec![
        ("aa", json!(true)),
        ("alpha", Json::Null),
        ("color", Json::Null),
        ("dash_capstyle", json!("butt")),
        ("dash_joinstyle", json!("round")),
        ("fillstyle", json!("full")),
        ("label", Json::Null),
        ("linestyle", json!("-")),
        ("linewidth", json!(1.0)),
        ("marker", json!("None")),
        ("markeredgecolor", Json::Null),
        ("markeredgewidth", json!(0.5)),
        ("markerfacecolor", Json::Null),
        ("markerfacecoloralt", json!("none")),
        ("solid_capstyle", json!("projecting")),
        ("solid_joinstyle", json!("round")),
        ("url", Json::Null),
        ("visible", json!(true)),
        ("zorder", Json::Null),
    ]
}

pub fn scatter_properties() -> PropertyTable {
    vec![
        ("alpha", Json::Null),
        ("dashes", json!([[null, null]])),
        ("edgecolor", json!([[0.0, 0.0, 0.0, 1.0]])),
        ("facecolor", json!([[0.0, 0.0, 0.0, 1.0]])),
        ("label", Json::Null),
        ("linestyle", json!([[null, null]])),
        ("linewidth", json!([1.0])),
        ("urls", Json::Null),
        ("visible", json!(true)),
        ("zorder", Json::Null),
    ]
}

pub fn axes_properties() -> PropertyTable {
    vec![
        ("title", json!("")),
        ("xlabel", json!("")),
        ("ylabel", json!("")),
        ("xlim", json!([0.0, 1.0])),
        ("ylim", json!([0.0, 1.0])),
        ("xscale", json!("linear")),
        ("yscale", json!("linear")),
        ("facecolor", json!("white")),
        ("visible", json!(true)),
        ("zorder", json!(0)),
    ]
}

pub fn figure_properties() -> PropertyTable {
    vec![
        ("figwidth", json!(8.0)),
        ("figheight", json!(6.0)),
        ("dpi", json!(80.0)),
        ("facecolor", json!("white")),
        ("edgecolor", json!("white")),
    ]
}

pub fn rect_properties() -> PropertyTable {
    vec![
        ("alpha", Json::Null),
        ("edgecolor", Json::Null),
        ("facecolor", Json::Null),
        ("fill", json!(true)),
        ("hatch", Json::Null),
        ("label", Json::Null),
        ("linestyle", json!("solid")),
        ("linewidth", Json::Null),
        ("visible", json!(true)),
        ("zorder", json!(1)),
    ]
}

/// Python `==` between a graph value and a table default. Numbers compare
/// across bool/int/float; lists and tuples compare element-wise.
pub fn equals_default(graph: &ValueGraph, value: ValueId, default: &Json) -> bool {
    match (graph.get(value), default) {
        (Value::None, Json::Null) => true,
        (Value::Str(s), Json::String(d)) => s == d,
        (Value::Bool(b), Json::Bool(d)) => b == d,
        (Value::List(items), Json::Array(ds)) | (Value::Tuple(items), Json::Array(ds)) => {
            items.len() == ds.len()
                && items
                    .iter()
                    .zip(ds)
                    .all(|(item, d)| equals_default(graph, *item, d))
        }
        (v, Json::Number(d)) => match (as_number(v), d.as_f64()) {
            (Some(x), Some(d)) => x == d,
            _ => false,
        },
        (v, Json::Bool(d)) => as_number(v) == Some(if *d { 1.0 } else { 0.0 }),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(n) => Some(*n as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}
