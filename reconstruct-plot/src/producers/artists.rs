// Figure, Axes and artist producers.
//
// A figure only creates itself and defers its axes; each axes is created
// from its figure and defers the artists it holds. Every artist statement
// depends on its parent, so the parent is always written first.

use reconstruct_core::{
    DecompileError, Decompiler, Producer, Result, Statement, StatementGroup, Value, ValueId,
};
use tracing::debug;

use super::properties::{
    axes_properties, equals_default, figure_properties, plot_properties, rect_properties,
    scatter_properties, PropertyTable,
};

pub const PLT_IMPORT: &str = "import matplotlib.pyplot as plt";

fn require_attr(dc: &Decompiler, value: ValueId, name: &str) -> Result<ValueId> {
    dc.graph()
        .attr(value, name)
        .ok_or_else(|| DecompileError::MissingDependency {
            tag: format!("{}.{}", dc.graph().type_name(value), name),
        })
}

/// `{{artist}}.set_<prop>({{val}})` for each attribute that is present and
/// differs from its default.
fn property_setters(dc: &Decompiler, artist: ValueId, table: &PropertyTable) -> Vec<Statement> {
    let graph = dc.graph();
    table
        .iter()
        .filter_map(|(prop, default)| {
            let val = graph.attr(artist, prop)?;
            if equals_default(graph, val, default) {
                return None;
            }
            Some(
                Statement::new(format!("{{{{artist}}}}.set_{}({{{{val}}}})", prop))
                    .slot("artist", artist)
                    .slot("val", val),
            )
        })
        .collect()
}

/// Defer every element of the list held in attribute `name`, if any.
fn defer_children(dc: &mut Decompiler, value: ValueId, name: &str) {
    let Some(children) = dc.graph().attr(value, name) else {
        return;
    };
    let items = match dc.graph().get(children) {
        Value::List(items) | Value::Tuple(items) => items.clone(),
        _ => return,
    };
    debug!(%value, attr = name, count = items.len(), "deferring children");
    for item in items {
        dc.defer(item);
    }
}

fn group(head: Statement, rest: Vec<Statement>) -> StatementGroup {
    let mut group = StatementGroup::from(head);
    group.extend(rest);
    group
}

pub struct FigureProducer;

impl Producer for FigureProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        dc.add_preamble(PLT_IMPORT);
        defer_children(dc, value, "axes");

        let head = Statement::new("plt.figure()").defines(value).hint("fig");
        Ok(group(head, property_setters(dc, value, &figure_properties())))
    }
}

pub struct AxesProducer;

impl Producer for AxesProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        dc.add_preamble(PLT_IMPORT);
        let fig = require_attr(dc, value, "figure")?;
        let rect = require_attr(dc, value, "position")?;
        for attr in ["lines", "collections", "patches"] {
            defer_children(dc, value, attr);
        }

        let head = Statement::new("{{fig}}.add_axes({{rect}})")
            .slot("fig", fig)
            .slot("rect", rect)
            .defines(value)
            .hint("ax");
        Ok(group(head, property_setters(dc, value, &axes_properties())))
    }
}

pub struct LineProducer;

impl Producer for LineProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        dc.add_preamble(PLT_IMPORT);
        let ax = require_attr(dc, value, "axes")?;
        let x = require_attr(dc, value, "xdata")?;
        let y = require_attr(dc, value, "ydata")?;
        dc.discover(x, Some("x"))?;
        dc.discover(y, Some("y"))?;

        let head = Statement::new("{{ax}}.plot({{x}}, {{y}})[0]")
            .slot("ax", ax)
            .slot("x", x)
            .slot("y", y)
            .defines(value)
            .hint("p");
        Ok(group(head, property_setters(dc, value, &plot_properties())))
    }
}

pub struct ScatterProducer;

impl Producer for ScatterProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        dc.add_preamble(PLT_IMPORT);
        let ax = require_attr(dc, value, "axes")?;
        let xy = require_attr(dc, value, "offsets")?;
        dc.discover(xy, Some("xy"))?;

        let head = Statement::new("{{ax}}.scatter({{xy}}[:, 0], {{xy}}[:, 1])")
            .slot("ax", ax)
            .slot("xy", xy)
            .defines(value)
            .hint("scatter");
        Ok(group(head, property_setters(dc, value, &scatter_properties())))
    }
}

pub struct RectangleProducer;

impl Producer for RectangleProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        dc.add_preamble(PLT_IMPORT);
        let xy = require_attr(dc, value, "xy")?;
        let width = require_attr(dc, value, "width")?;
        let height = require_attr(dc, value, "height")?;

        let head = Statement::new("plt.Rectangle({{xy}}, {{width}}, {{height}})")
            .slot("xy", xy)
            .slot("width", width)
            .slot("height", height)
            .defines(value)
            .hint("rect");
        let mut rest = Vec::new();
        if let Some(ax) = dc.graph().attr(value, "axes") {
            rest.push(
                Statement::new("{{ax}}.add_patch({{rect}})")
                    .slot("ax", ax)
                    .slot("rect", value),
            );
        }
        rest.extend(property_setters(dc, value, &rect_properties()));
        Ok(group(head, rest))
    }
}
