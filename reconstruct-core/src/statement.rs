// Templated statements with named dependency slots.
//
// A statement like `{{x}} + 5` that defines `y` stands for `y = x + 5`.
// The template never names its inputs or output directly; the registry picks
// names so they cannot collide.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{DecompileError, Result};
use crate::value::ValueId;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"\{\{\s*?(?P<tag>[a-zA-Z]\w*)\s*?\}\}").expect("placeholder pattern is valid")
    })
}

/// Resolves a value to the text used at a placeholder: a display name, or
/// the full definition of an inlined value.
pub trait Reference {
    fn reference(&self, value: ValueId) -> Result<String>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    template: Option<String>,
    slots: BTreeMap<String, ValueId>,
    output: Option<ValueId>,
    inlined: bool,
    name_hint: Option<String>,
    verbatim: bool,
}

impl Statement {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    /// Text copied as-is: no placeholders are recognised and there are no
    /// dependencies. Used for literals, whose text may contain `{{`.
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            template: Some(text.into()),
            verbatim: true,
            ..Self::default()
        }
    }

    /// A statement whose template is filled in later.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn slot(mut self, name: impl Into<String>, value: ValueId) -> Self {
        self.slots.insert(name.into(), value);
        self
    }

    pub fn defines(mut self, value: ValueId) -> Self {
        self.output = Some(value);
        self
    }

    pub fn inline(mut self, inlined: bool) -> Self {
        self.inlined = inlined;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.name_hint = Some(hint.into());
        self
    }

    pub fn set_name_hint(&mut self, hint: impl Into<String>) {
        self.name_hint = Some(hint.into());
    }

    pub fn set_inlined(&mut self, inlined: bool) {
        self.inlined = inlined;
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn output(&self) -> Option<ValueId> {
        self.output
    }

    pub fn is_inlined(&self) -> bool {
        self.inlined
    }

    pub fn name_hint(&self) -> Option<&str> {
        self.name_hint.as_deref()
    }

    pub fn slots(&self) -> &BTreeMap<String, ValueId> {
        &self.slots
    }

    /// Distinct values referenced by the template's placeholders, in order of
    /// first appearance. Slots the template never mentions are not included.
    pub fn dependencies(&self) -> Result<Vec<ValueId>> {
        let template = self.template.as_deref().ok_or(DecompileError::MissingTemplate)?;
        if self.verbatim {
            return Ok(Vec::new());
        }

        let mut result = Vec::new();
        for caps in tag_re().captures_iter(template) {
            let value = self.lookup(&caps["tag"])?;
            if !result.contains(&value) {
                result.push(value);
            }
        }
        Ok(result)
    }

    pub fn render(&self, oracle: &dyn Reference) -> Result<String> {
        let template = self.template.as_deref().ok_or(DecompileError::MissingTemplate)?;
        if self.verbatim {
            return Ok(template.to_string());
        }

        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in tag_re().captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let value = self.lookup(&caps["tag"])?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(&oracle.reference(value)?);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    /// True when `other` uses the value this statement defines.
    /// Diagnostic helper only: ordering goes through the registry's toposort.
    pub fn precedes(&self, other: &Statement) -> Result<bool> {
        match self.output {
            Some(out) => Ok(other.dependencies()?.contains(&out)),
            None => Ok(false),
        }
    }

    fn lookup(&self, tag: &str) -> Result<ValueId> {
        self.slots
            .get(tag)
            .copied()
            .ok_or_else(|| DecompileError::MissingDependency { tag: tag.to_string() })
    }
}

/// Statements that run together, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementGroup {
    statements: Vec<Statement>,
}

impl StatementGroup {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    pub fn first(&self) -> Option<&Statement> {
        self.statements.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut Statement> {
        self.statements.first_mut()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Union of member dependencies, first occurrence wins.
    pub fn dependencies(&self) -> Result<Vec<ValueId>> {
        let mut result = Vec::new();
        for statement in &self.statements {
            for dep in statement.dependencies()? {
                if !result.contains(&dep) {
                    result.push(dep);
                }
            }
        }
        Ok(result)
    }

    pub fn render(&self, oracle: &dyn Reference) -> Result<Vec<String>> {
        self.statements.iter().map(|s| s.render(oracle)).collect()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl From<Statement> for StatementGroup {
    fn from(statement: Statement) -> Self {
        Self { statements: vec![statement] }
    }
}

impl From<Vec<Statement>> for StatementGroup {
    fn from(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl IntoIterator for StatementGroup {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}
