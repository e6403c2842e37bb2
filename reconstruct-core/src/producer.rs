// Producer table and the built-in producers for scalars and containers.
//
// Lookup order for a value:
//   1. per-value override
//   2. exact runtime type name ("tuple", "Line2D", ...)
//   3. value category (Scalar, Sequence, Mapping, Encoded, Custom)

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::decompiler::Decompiler;
use crate::error::{DecompileError, Result};
use crate::statement::{Statement, StatementGroup};
use crate::value::{Category, Value, ValueGraph, ValueId};

/// Turns one value into statements. The first statement must define the
/// value it was handed. Nested values the statements refer to are
/// discovered by the walker; a producer only calls back into it to attach a
/// name hint or to defer a related value.
pub trait Producer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup>;
}

impl<F> Producer for F
where
    F: Fn(&mut Decompiler, ValueId) -> Result<StatementGroup>,
{
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        self(dc, value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProducerKey {
    Type(String),
    Category(Category),
}

#[derive(Clone, Default)]
pub struct ProducerRegistry {
    overrides: HashMap<ValueId, Rc<dyn Producer>>,
    table: HashMap<ProducerKey, Rc<dyn Producer>>,
    reserved: Vec<String>,
}

impl fmt::Debug for ProducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("table", &self.table.keys().collect::<Vec<_>>())
            .field("reserved", &self.reserved)
            .finish()
    }
}

impl ProducerRegistry {
    /// An empty table: every value is an unknown type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scalars, sequences and mappings. Arrays and custom objects still need
    /// producers of their own.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_category(Category::Scalar, LiteralProducer);
        registry.register_category(Category::Sequence, SequenceProducer);
        registry.register_category(Category::Mapping, MappingProducer);
        registry
    }

    pub fn register_type(&mut self, type_name: &str, producer: impl Producer + 'static) {
        self.table
            .insert(ProducerKey::Type(type_name.to_string()), Rc::new(producer));
    }

    pub fn register_category(&mut self, category: Category, producer: impl Producer + 'static) {
        self.table
            .insert(ProducerKey::Category(category), Rc::new(producer));
    }

    /// Use `producer` for this one value, ahead of any type or category entry.
    pub fn override_value(&mut self, value: ValueId, producer: impl Producer + 'static) {
        self.overrides.insert(value, Rc::new(producer));
    }

    /// Names the generated code binds outside of any statement (`np` for
    /// `import numpy as np`). Values are never given these names.
    pub fn reserve_name(&mut self, name: &str) {
        if !self.reserved.iter().any(|n| n == name) {
            self.reserved.push(name.to_string());
        }
    }

    pub fn reserved_names(&self) -> &[String] {
        &self.reserved
    }

    pub fn resolve(&self, graph: &ValueGraph, value: ValueId) -> Option<Rc<dyn Producer>> {
        if let Some(producer) = self.overrides.get(&value) {
            return Some(Rc::clone(producer));
        }
        let v = graph.try_get(value)?;
        self.table
            .get(&ProducerKey::Type(v.type_name().to_string()))
            .or_else(|| self.table.get(&ProducerKey::Category(v.category())))
            .cloned()
    }
}

/// Scalars render as their literal form and are always inlined.
pub struct LiteralProducer;

impl Producer for LiteralProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        let v = dc.graph().get(value);
        let text = v.literal().ok_or_else(|| DecompileError::UnknownType {
            type_name: v.type_name().to_string(),
        })?;
        Ok(Statement::verbatim(text).defines(value).inline(true).into())
    }
}

/// Lists and tuples as literal constructors, one slot per element.
pub struct SequenceProducer;

impl Producer for SequenceProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        let (items, open, close) = match dc.graph().get(value) {
            Value::List(items) => (items.clone(), "[", "]"),
            Value::Tuple(items) if items.len() == 1 => (items.clone(), "(", ",)"),
            Value::Tuple(items) => (items.clone(), "(", ")"),
            other => {
                return Err(DecompileError::UnknownType {
                    type_name: other.type_name().to_string(),
                })
            }
        };

        let slots: Vec<String> = (0..items.len()).map(|i| format!("x_{:03}", i)).collect();
        let body = slots
            .iter()
            .map(|slot| format!("{{{{{}}}}}", slot))
            .collect::<Vec<_>>()
            .join(", ");

        let mut statement = Statement::new(format!("{}{}{}", open, body, close))
            .defines(value)
            .inline(items.len() <= dc.options().inline_limit);
        for (slot, item) in slots.into_iter().zip(items) {
            statement = statement.slot(slot, item);
        }
        Ok(statement.into())
    }
}

/// Dicts as literal constructors with keys in sorted order.
pub struct MappingProducer;

impl Producer for MappingProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        let graph = dc.graph();
        let mut entries = match graph.get(value) {
            Value::Dict(entries) => entries.clone(),
            other => {
                return Err(DecompileError::UnknownType {
                    type_name: other.type_name().to_string(),
                })
            }
        };
        entries.sort_by(|a, b| graph.compare(a.0, b.0));

        let body = (0..entries.len())
            .map(|i| format!("{{{{k_{i:03}}}}}: {{{{v_{i:03}}}}}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut statement = Statement::new(format!("{{{}}}", body))
            .defines(value)
            .inline(entries.len() <= dc.options().inline_limit);
        for (i, (k, v)) in entries.into_iter().enumerate() {
            statement = statement
                .slot(format!("k_{:03}", i), k)
                .slot(format!("v_{:03}", i), v);
        }
        Ok(statement.into())
    }
}
