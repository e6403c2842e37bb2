// Error kinds raised by the reconstruction engine.
// Every failure aborts the whole run; there is no partial-success mode.

use thiserror::Error;

use crate::value::ValueId;

pub type Result<T, E = DecompileError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DecompileError {
    /// No producer is registered for the value's runtime type.
    #[error("Don't know how to decompile objects of type {type_name}")]
    UnknownType { type_name: String },

    /// A producer's first statement does not define the value it was handed.
    #[error("First statement returned from the producer for {type_name} must define {value} as its output")]
    ContractViolation { value: ValueId, type_name: String },

    #[error("Conflicting statements to define {value}")]
    ConflictingDefinition { value: ValueId },

    #[error("No statement that defines {value} is registered")]
    UnregisteredValue { value: ValueId },

    #[error("Missing dependency for {tag}")]
    MissingDependency { tag: String },

    #[error("Statement created without a template")]
    MissingTemplate,

    #[error("A cyclic dependency exists amongst {remaining}")]
    CyclicDependency { remaining: String },

    #[error("{0}")]
    MalformedInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
