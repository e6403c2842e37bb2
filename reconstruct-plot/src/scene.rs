// Scene documents: JSON value documents whose root is usually a Figure.

use std::collections::BTreeMap;
use std::path::Path;

use reconstruct_core::loader::{load_value_file, LoadedValue};
use reconstruct_core::{Decompiler, ValueGraph};
use tracing::info;

use crate::producers::plot_producers;

pub fn load_scene(path: &Path) -> Result<LoadedValue, String> {
    let scene = load_value_file(path)?;
    info!(
        path = %path.display(),
        values = scene.graph.len(),
        root = scene.graph.type_name(scene.root),
        "loaded scene"
    );
    Ok(scene)
}

/// Script that rebuilds the scene's root value. `show` appends `plt.show()`.
pub fn build_script(scene: LoadedValue, name: Option<&str>, show: bool) -> Result<String, String> {
    let mut dc = Decompiler::with_producers(scene.graph, plot_producers());
    dc.discover(scene.root, name).map_err(|e| e.to_string())?;
    let mut script = dc.render().map_err(|e| e.to_string())?;
    if show {
        if !script.is_empty() {
            script.push('\n');
        }
        script.push_str("plt.show()");
    }
    Ok(script)
}

pub fn build_script_file(path: &Path, name: Option<&str>, show: bool) -> Result<String, String> {
    build_script(load_scene(path)?, name, show)
}

/// Number of values of each type name.
pub fn type_counts(graph: &ValueGraph) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for id in graph.ids() {
        *counts.entry(graph.type_name(id).to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn inspect_scene(path: &Path) -> Result<String, String> {
    let scene = load_scene(path)?;
    let mut lines = vec![
        format!("Scene: {}", path.display()),
        format!("  Root: {}", scene.graph.type_name(scene.root)),
        format!("  Values: {}", scene.graph.len()),
    ];
    for (type_name, count) in type_counts(&scene.graph) {
        lines.push(format!("  {}: {}", type_name, count));
    }
    Ok(lines.join("\n"))
}
