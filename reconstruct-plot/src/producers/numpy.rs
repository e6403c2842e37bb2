// ndarray producer
//
// An array is rebuilt from its raw little-endian buffer:
//   np.frombuffer(b'...', dtype='float64').reshape((2, 3))
// The buffer, dtype name and shape are allocated as ordinary values, so the
// walker treats them like any other dependency.

use reconstruct_core::{
    DType, DecompileError, Decompiler, NdArray, Producer, Result, Statement, StatementGroup, Value,
    ValueId,
};
use tracing::trace;

pub const NUMPY_IMPORT: &str = "import numpy as np";

pub struct ArrayProducer;

impl Producer for ArrayProducer {
    fn produce(&self, dc: &mut Decompiler, value: ValueId) -> Result<StatementGroup> {
        let array = match dc.graph().get(value) {
            Value::Array(array) => array.clone(),
            other => {
                return Err(DecompileError::UnknownType {
                    type_name: other.type_name().to_string(),
                })
            }
        };
        dc.add_preamble(NUMPY_IMPORT);

        let payload = encode(&array);
        trace!(%value, bytes = payload.len(), shape = ?array.shape, "encoded array");

        let graph = dc.graph_mut();
        let data = graph.alloc(Value::Bytes(payload));
        let dtype = graph.str(array.dtype.name());
        let dims = array
            .shape
            .iter()
            .map(|d| graph.int(*d as i64))
            .collect();
        let shape = graph.tuple(dims);

        Ok(Statement::new("np.frombuffer({{data}}, dtype={{dtype}}).reshape({{shape}})")
            .slot("data", data)
            .slot("dtype", dtype)
            .slot("shape", shape)
            .defines(value)
            .hint("arr")
            .into())
    }
}

/// Raw buffer in the array's dtype, little-endian.
pub fn encode(array: &NdArray) -> Vec<u8> {
    let mut out = Vec::with_capacity(array.data.len() * 8);
    for x in &array.data {
        match array.dtype {
            DType::Float64 => out.extend_from_slice(&x.to_le_bytes()),
            DType::Int64 => out.extend_from_slice(&(*x as i64).to_le_bytes()),
        }
    }
    out
}
