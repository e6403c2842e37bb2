// Dependency ordering over a node -> dependencies mapping.
// Knows nothing about statements; the registry feeds it statement ids.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use tracing::trace;

use crate::error::{DecompileError, Result};

/// Topologically sort `data`, where each key maps to the nodes it depends on.
///
/// Self-dependencies are ignored and nodes that only appear as dependencies
/// are added with no dependencies of their own. Nodes that become ready at
/// the same time are emitted in ascending order, so equal input always
/// yields equal output.
pub fn toposort<K>(data: BTreeMap<K, BTreeSet<K>>) -> Result<Vec<K>>
where
    K: Ord + Clone + Debug,
{
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut pending: BTreeMap<K, BTreeSet<K>> = BTreeMap::new();
    for (node, mut deps) in data {
        deps.remove(&node);
        pending.insert(node, deps);
    }

    let orphans: Vec<K> = pending
        .values()
        .flatten()
        .filter(|dep| !pending.contains_key(*dep))
        .cloned()
        .collect();
    for orphan in orphans {
        pending.entry(orphan).or_default();
    }

    let mut result = Vec::with_capacity(pending.len());
    loop {
        let ready: BTreeSet<K> = pending
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(node, _)| node.clone())
            .collect();
        if ready.is_empty() {
            break;
        }
        trace!(layer = ready.len(), remaining = pending.len(), "toposort layer");

        pending.retain(|node, _| !ready.contains(node));
        for deps in pending.values_mut() {
            deps.retain(|dep| !ready.contains(dep));
        }
        result.extend(ready);
    }

    if !pending.is_empty() {
        return Err(DecompileError::CyclicDependency {
            remaining: format!("{:?}", pending),
        });
    }

    Ok(result)
}

/// Untyped entry point: `doc` must be a JSON object whose values are arrays
/// of distinct strings.
pub fn toposort_json(doc: &serde_json::Value) -> Result<Vec<String>> {
    let obj = doc.as_object().ok_or_else(|| {
        DecompileError::MalformedInput("Data must be a dictionary of sets".to_string())
    })?;

    let mut data = BTreeMap::new();
    for (node, deps) in obj {
        let deps = deps.as_array().ok_or_else(not_a_set)?;
        let mut set = BTreeSet::new();
        for dep in deps {
            let dep = dep.as_str().ok_or_else(not_a_set)?;
            if !set.insert(dep.to_string()) {
                return Err(not_a_set());
            }
        }
        data.insert(node.clone(), set);
    }

    toposort(data)
}

fn not_a_set() -> DecompileError {
    DecompileError::MalformedInput("All values must be sets".to_string())
}
