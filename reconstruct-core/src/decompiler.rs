// Graph walker: turns a root value into registered statements.
//
// Values are marked visited before their dependencies are explored, so shared
// values are produced once and a dependency may refer back to an ancestor.
// Statements refer to values, not to each other, so such a back-reference is
// only an error if the registry cannot order the resulting statements.

use std::collections::{HashSet, VecDeque};
use std::io::Write;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::error::{DecompileError, Result};
use crate::producer::ProducerRegistry;
use crate::registry::{StatementRegistry, DEFAULT_NAME};
use crate::statement::Reference;
use crate::value::{Category, ValueGraph, ValueId};

#[derive(Clone, Debug)]
pub struct Options {
    /// Containers with at most this many elements are written in place
    /// instead of getting a name of their own.
    pub inline_limit: usize,
    /// Name hint for values whose producer gives none.
    pub default_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            inline_limit: 5,
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

pub struct Decompiler {
    graph: ValueGraph,
    producers: ProducerRegistry,
    registry: StatementRegistry,
    options: Options,
    visited: HashSet<ValueId>,
    preamble: IndexSet<String>,
    deferred: VecDeque<ValueId>,
    depth: usize,
}

impl Decompiler {
    /// Walker over `graph` with the built-in scalar and container producers.
    pub fn new(graph: ValueGraph) -> Self {
        Self::with_producers(graph, ProducerRegistry::with_builtins())
    }

    pub fn with_producers(graph: ValueGraph, producers: ProducerRegistry) -> Self {
        Self::with_options(graph, producers, Options::default())
    }

    pub fn with_options(graph: ValueGraph, producers: ProducerRegistry, options: Options) -> Self {
        let mut registry = StatementRegistry::with_default_name(&options.default_name);
        for name in producers.reserved_names() {
            registry.reserve_name(name);
        }
        Self {
            graph,
            producers,
            registry,
            options,
            visited: HashSet::new(),
            preamble: IndexSet::new(),
            deferred: VecDeque::new(),
            depth: 0,
        }
    }

    pub fn graph(&self) -> &ValueGraph {
        &self.graph
    }

    /// Producers may allocate helper values, e.g. an encoded payload.
    pub fn graph_mut(&mut self) -> &mut ValueGraph {
        &mut self.graph
    }

    pub fn producers_mut(&mut self) -> &mut ProducerRegistry {
        &mut self.producers
    }

    pub fn registry(&self) -> &StatementRegistry {
        &self.registry
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn is_visited(&self, value: ValueId) -> bool {
        self.visited.contains(&value)
    }

    pub fn preamble(&self) -> impl Iterator<Item = &str> {
        self.preamble.iter().map(String::as_str)
    }

    /// Add a declaration line (an import) unless it is already present.
    pub fn add_preamble(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.preamble.insert(line.clone()) {
            debug!(line = %line, "added preamble line");
        }
    }

    /// Discover `value` after the current top-level discovery has finished.
    pub fn defer(&mut self, value: ValueId) {
        if !self.visited.contains(&value) {
            self.deferred.push_back(value);
        }
    }

    /// Recursively turn `value` into statements.
    ///
    /// A top-level call (not made from inside a producer) also materializes
    /// the value as a named statement unless it is a scalar, then drains the
    /// deferred queue. Deferred values are materialized the same way.
    pub fn discover(&mut self, value: ValueId, name_hint: Option<&str>) -> Result<()> {
        let root = self.depth == 0;
        self.depth += 1;
        let result = self.ingest(value, name_hint, root);
        if root && result.is_ok() {
            let drained = self.drain_deferred();
            self.depth -= 1;
            return drained;
        }
        self.depth -= 1;
        result
    }

    fn drain_deferred(&mut self) -> Result<()> {
        while let Some(next) = self.deferred.pop_front() {
            trace!(value = %next, "discovering deferred value");
            self.ingest(next, None, true)?;
        }
        Ok(())
    }

    fn ingest(&mut self, value: ValueId, name_hint: Option<&str>, root: bool) -> Result<()> {
        if self.visited.contains(&value) {
            return Ok(());
        }
        if !self.graph.contains(value) {
            return Err(DecompileError::UnregisteredValue { value });
        }

        let type_name = self.graph.type_name(value).to_string();
        let producer = self
            .producers
            .resolve(&self.graph, value)
            .ok_or_else(|| DecompileError::UnknownType { type_name: type_name.clone() })?;
        debug!(%value, type_name = %type_name, root, "discovering value");

        let mut group = producer.produce(self, value)?;
        let first = match group.first_mut() {
            Some(first) if first.output() == Some(value) => first,
            _ => return Err(DecompileError::ContractViolation { value, type_name }),
        };
        if let Some(hint) = name_hint {
            first.set_name_hint(hint);
        }
        if root && self.graph.category(value) != Category::Scalar {
            first.set_inlined(false);
        }

        let deps = group.dependencies()?;
        self.visited.insert(value);

        for dep in deps {
            self.ingest(dep, None, false)?;
        }

        trace!(%value, statements = group.len(), "submitting statements");
        self.registry.submit_group(group)?;
        Ok(())
    }

    /// Name of `value`, or its definition when it is inlined.
    pub fn reference(&self, value: ValueId) -> Result<String> {
        self.registry.reference(value)
    }

    /// The generated script: preamble lines, then statements in dependency
    /// order.
    pub fn render(&self) -> Result<String> {
        self.registry.render(self.preamble.iter())
    }

    /// Write the script, newline-terminated, to `out`.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        let script = self.render()?;
        writeln!(out, "{}", script)?;
        Ok(())
    }
}
