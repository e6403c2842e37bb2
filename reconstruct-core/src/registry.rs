// Statement registry: the naming and ordering oracle.
// Owns every submitted statement, maps value identity -> defining statement
// and value identity -> display name, and renders the final script.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{DecompileError, Result};
use crate::statement::{Reference, Statement, StatementGroup};
use crate::toposort::toposort;
use crate::value::ValueId;

pub const DEFAULT_NAME: &str = "object";

/// Position of a statement in submission order. Doubles as the tie-break key
/// when ordering statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(usize);

impl StatementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct StatementRegistry {
    statements: Vec<Rc<Statement>>,
    by_ptr: HashMap<*const Statement, StatementId>,
    definitions: HashMap<ValueId, StatementId>,
    /// Group member -> the member submitted just before it.
    follows: HashMap<StatementId, StatementId>,
    names: HashMap<ValueId, String>,
    taken: HashSet<String>,
    default_name: String,
    /// Inlined values whose text is being rendered right now.
    rendering: RefCell<Vec<ValueId>>,
}

impl Default for StatementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::with_default_name(DEFAULT_NAME)
    }

    pub fn with_default_name(default_name: &str) -> Self {
        Self {
            statements: Vec::new(),
            by_ptr: HashMap::new(),
            definitions: HashMap::new(),
            follows: HashMap::new(),
            names: HashMap::new(),
            taken: HashSet::new(),
            default_name: sanitize_ident(default_name, DEFAULT_NAME),
            rendering: RefCell::new(Vec::new()),
        }
    }

    /// Keep `name` away from values, e.g. a module bound by the preamble.
    pub fn reserve_name(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[Rc<Statement>] {
        &self.statements
    }

    pub fn get(&self, id: StatementId) -> Option<&Rc<Statement>> {
        self.statements.get(id.0)
    }

    /// Submit a statement. Submitting the same shared statement twice is a
    /// no-op; a second statement defining an already-defined value fails.
    pub fn submit(&mut self, statement: impl Into<Rc<Statement>>) -> Result<StatementId> {
        let statement = statement.into();
        if let Some(&id) = self.by_ptr.get(&Rc::as_ptr(&statement)) {
            return Ok(id);
        }

        let id = StatementId(self.statements.len());
        if let Some(out) = statement.output() {
            if self.definitions.contains_key(&out) {
                return Err(DecompileError::ConflictingDefinition { value: out });
            }
            self.definitions.insert(out, id);
            if !statement.is_inlined() {
                self.register_name(out, statement.name_hint());
            }
        }

        trace!(statement = id.0, template = ?statement.template(), "submitted statement");
        self.by_ptr.insert(Rc::as_ptr(&statement), id);
        self.statements.push(statement);
        Ok(id)
    }

    /// Submit the members of `group`. Each member is ordered after the one
    /// before it, on top of its own dependencies.
    pub fn submit_group(&mut self, group: StatementGroup) -> Result<Vec<StatementId>> {
        let mut ids: Vec<StatementId> = Vec::with_capacity(group.len());
        for statement in group {
            let fresh = self.statements.len();
            let id = self.submit(statement)?;
            if let Some(&prev) = ids.last() {
                if id.0 == fresh && prev != id {
                    self.follows.insert(id, prev);
                }
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn register_name(&mut self, value: ValueId, hint: Option<&str>) {
        let hint = sanitize_ident(hint.unwrap_or(""), &self.default_name);
        let name = disambiguate(&hint, &self.taken);
        debug!(%value, name = %name, "assigned display name");
        self.taken.insert(name.clone());
        self.names.insert(value, name);
    }

    /// Display name of a named value. Inlined values have none.
    pub fn name(&self, value: ValueId) -> Option<&str> {
        self.names.get(&value).map(String::as_str)
    }

    pub fn defining_statement(&self, value: ValueId) -> Option<&Rc<Statement>> {
        self.definitions
            .get(&value)
            .and_then(|id| self.statements.get(id.0))
    }

    /// Source text that defines `value`.
    pub fn definition(&self, value: ValueId) -> Result<String> {
        let statement = self
            .defining_statement(value)
            .ok_or(DecompileError::UnregisteredValue { value })?;
        statement.render(self)
    }

    /// Statement -> statements that define its dependencies, plus the group
    /// member it follows. Dependencies with no defining statement contribute
    /// no edge.
    pub fn dependency_graph(&self) -> Result<BTreeMap<StatementId, BTreeSet<StatementId>>> {
        let mut graph = BTreeMap::new();
        for (index, statement) in self.statements.iter().enumerate() {
            let id = StatementId(index);
            let mut deps = BTreeSet::new();
            for value in statement.dependencies()? {
                if let Some(&def) = self.definitions.get(&value) {
                    deps.insert(def);
                }
            }
            if let Some(&prev) = self.follows.get(&id) {
                deps.insert(prev);
            }
            graph.insert(id, deps);
        }
        Ok(graph)
    }

    pub fn ordered_ids(&self) -> Result<Vec<StatementId>> {
        toposort(self.dependency_graph()?)
    }

    pub fn ordered_statements(&self) -> Result<Vec<Rc<Statement>>> {
        Ok(self
            .ordered_ids()?
            .into_iter()
            .map(|id| Rc::clone(&self.statements[id.0]))
            .collect())
    }

    /// Preamble lines, then one line per non-inlined statement in dependency
    /// order.
    pub fn render<I, S>(&self, preamble: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<String> = preamble.into_iter().map(|l| l.as_ref().to_string()).collect();

        for statement in self.ordered_statements()? {
            if statement.is_inlined() {
                continue;
            }
            let body = statement.render(self)?;
            match statement.output() {
                Some(out) => lines.push(format!("{} = {}", self.reference(out)?, body)),
                None => lines.push(body),
            }
        }

        Ok(lines.join("\n"))
    }
}

impl Reference for StatementRegistry {
    /// Display name, or the full definition when the value is inlined.
    fn reference(&self, value: ValueId) -> Result<String> {
        let statement = self
            .defining_statement(value)
            .ok_or(DecompileError::UnregisteredValue { value })?;
        if statement.is_inlined() {
            if self.rendering.borrow().contains(&value) {
                return Err(DecompileError::CyclicDependency {
                    remaining: format!("{} (inlined inside its own definition)", value),
                });
            }
            self.rendering.borrow_mut().push(value);
            let text = statement.render(self);
            self.rendering.borrow_mut().pop();
            return text;
        }
        self.names
            .get(&value)
            .cloned()
            .ok_or(DecompileError::UnregisteredValue { value })
    }
}

/// First of `label`, `label_01`, `label_02`, ... not already taken.
pub fn disambiguate(label: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(label) {
        return label.to_string();
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}_{:02}", label, suffix);
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Turn a name hint into a usable identifier.
fn sanitize_ident(hint: &str, fallback: &str) -> String {
    let mut ident: String = hint
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() {
        return fallback.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if PYTHON_RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];
