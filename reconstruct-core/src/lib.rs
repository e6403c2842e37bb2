// Library interface for the reconstruction engine
// Turns an object graph into a flat Python script that rebuilds it.

pub mod decompiler;
pub mod error;
pub mod loader;
pub mod producer;
pub mod registry;
pub mod statement;
pub mod toposort;
pub mod trace;
pub mod value;

pub use decompiler::{Decompiler, Options};
pub use error::{DecompileError, Result};
pub use producer::{Producer, ProducerKey, ProducerRegistry};
pub use registry::{StatementId, StatementRegistry};
pub use statement::{Reference, Statement, StatementGroup};
pub use value::{Category, DType, NdArray, Value, ValueGraph, ValueId};

/// Reconstruct `root` with the built-in producers and return the script.
pub fn decompile(graph: ValueGraph, root: ValueId, name_hint: Option<&str>) -> Result<String> {
    let mut dc = Decompiler::new(graph);
    dc.discover(root, name_hint)?;
    dc.render()
}

#[cfg(test)]
mod statement_tests;


#[cfg(test)]
mod toposort_tests;


#[cfg(test)]
mod loader_tests;
