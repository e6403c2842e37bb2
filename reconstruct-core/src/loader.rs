// JSON value documents -> ValueGraph
//
// Plain JSON maps onto Python-like values; everything JSON cannot express
// goes through a single `$`-tagged object:
//   {"$tuple": [..]}   {"$complex": [re, im]}   {"$bytes": "text" | [0..255]}
//   {"$dict": [[k, v], ..]}   {"$ndarray": {"dtype", "shape", "data"}}
//   {"$object": "Class", "attrs": {..}}   {"$ref": "label"}
// Any value written as an object may carry "$id" so later "$ref"s share it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::value::{DType, NdArray, Value, ValueGraph, ValueId};

/// A loaded document: its values and the id of the top-level one.
#[derive(Debug)]
pub struct LoadedValue {
    pub graph: ValueGraph,
    pub root: ValueId,
}

pub fn load_value_file(path: &Path) -> Result<LoadedValue, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read value document {}: {}", path.display(), e))?;
    load_value_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn load_value_str(text: &str) -> Result<LoadedValue, String> {
    let doc: Json = serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))?;
    load_value(&doc)
}

pub fn load_value(doc: &Json) -> Result<LoadedValue, String> {
    let mut loader = Loader::default();
    let root = loader.load(doc)?;
    debug!(values = loader.graph.len(), labels = loader.labels.len(), "loaded value document");
    Ok(LoadedValue {
        graph: loader.graph,
        root,
    })
}

#[derive(Default)]
struct Loader {
    graph: ValueGraph,
    labels: HashMap<String, ValueId>,
}

impl Loader {
    fn load(&mut self, doc: &Json) -> Result<ValueId, String> {
        match doc {
            Json::Object(obj) => self.load_object(obj),
            other => {
                let value = self.load_plain(other)?;
                Ok(self.graph.alloc(value))
            }
        }
    }

    fn load_plain(&mut self, doc: &Json) -> Result<Value, String> {
        match doc {
            Json::Null => Ok(Value::None),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| format!("Unrepresentable number: {}", n)),
            },
            Json::String(s) => Ok(Value::Str(s.clone())),
            Json::Array(items) => Ok(Value::List(self.load_all(items)?)),
            Json::Object(_) => Err("Objects are loaded through load_object".to_string()),
        }
    }

    fn load_all(&mut self, items: &[Json]) -> Result<Vec<ValueId>, String> {
        items.iter().map(|item| self.load(item)).collect()
    }

    fn load_object(&mut self, obj: &Map<String, Json>) -> Result<ValueId, String> {
        if let Some(label) = obj.get("$ref") {
            if obj.len() != 1 {
                return Err("$ref cannot be combined with other keys".to_string());
            }
            let label = label.as_str().ok_or("$ref must be a string label")?;
            return self
                .labels
                .get(label)
                .copied()
                .ok_or_else(|| format!("Unknown $ref label: {}", label));
        }

        // Reserve the slot first so children may refer back to this value.
        let id = self.graph.reserve();
        if let Some(label) = obj.get("$id") {
            let label = label.as_str().ok_or("$id must be a string label")?;
            if self.labels.insert(label.to_string(), id).is_some() {
                return Err(format!("Duplicate $id label: {}", label));
            }
        }

        let tags: Vec<&String> = obj
            .keys()
            .filter(|key| key.starts_with('$') && key.as_str() != "$id")
            .collect();
        let value = match tags.as_slice() {
            [] => self.load_dict(obj)?,
            [tag] => self.load_tagged(tag, obj)?,
            _ => return Err(format!("Object has more than one tag: {:?}", tags)),
        };
        self.graph.set(id, value);
        Ok(id)
    }

    fn load_dict(&mut self, obj: &Map<String, Json>) -> Result<Value, String> {
        let mut entries = Vec::with_capacity(obj.len());
        for (key, value) in obj {
            if key == "$id" {
                continue;
            }
            let k = self.graph.str(key);
            let v = self.load(value)?;
            entries.push((k, v));
        }
        Ok(Value::Dict(entries))
    }

    fn load_tagged(&mut self, tag: &str, obj: &Map<String, Json>) -> Result<Value, String> {
        let allowed: &[&str] = if tag == "$object" { &["attrs"] } else { &[] };
        if let Some(extra) = obj
            .keys()
            .find(|key| key.as_str() != tag && key.as_str() != "$id" && !allowed.contains(&key.as_str()))
        {
            return Err(format!("Unexpected key {} in {} object", extra, tag));
        }
        let body = &obj[tag];

        match tag {
            "$tuple" => {
                let items = body.as_array().ok_or("$tuple must be an array")?;
                Ok(Value::Tuple(self.load_all(items)?))
            }
            "$complex" => {
                let parts = body.as_array().ok_or("$complex must be [re, im]")?;
                match parts.as_slice() {
                    [re, im] => Ok(Value::Complex {
                        re: re.as_f64().ok_or("$complex real part must be a number")?,
                        im: im.as_f64().ok_or("$complex imaginary part must be a number")?,
                    }),
                    _ => Err("$complex must be [re, im]".to_string()),
                }
            }
            "$bytes" => match body {
                Json::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
                Json::Array(items) => {
                    let bytes = items
                        .iter()
                        .map(|b| {
                            b.as_u64()
                                .and_then(|b| u8::try_from(b).ok())
                                .ok_or_else(|| format!("Invalid byte in $bytes: {}", b))
                        })
                        .collect::<Result<Vec<u8>, String>>()?;
                    Ok(Value::Bytes(bytes))
                }
                _ => Err("$bytes must be a string or an array of bytes".to_string()),
            },
            "$dict" => {
                let pairs = body.as_array().ok_or("$dict must be an array of [key, value] pairs")?;
                let mut entries = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    match pair.as_array().map(Vec::as_slice) {
                        Some([k, v]) => {
                            let k = self.load(k)?;
                            let v = self.load(v)?;
                            entries.push((k, v));
                        }
                        _ => return Err(format!("$dict entry must be [key, value], got {}", pair)),
                    }
                }
                Ok(Value::Dict(entries))
            }
            "$ndarray" => load_ndarray(body).map(Value::Array),
            "$object" => {
                let class = body.as_str().ok_or("$object must name a class")?;
                if class.is_empty() {
                    return Err("$object class name is empty".to_string());
                }
                let mut attrs = Vec::new();
                if let Some(fields) = obj.get("attrs") {
                    let fields = fields.as_object().ok_or("$object attrs must be an object")?;
                    for (name, value) in fields {
                        attrs.push((name.clone(), self.load(value)?));
                    }
                }
                Ok(Value::Object {
                    class: class.to_string(),
                    attrs,
                })
            }
            _ => Err(format!("Unknown tag: {}", tag)),
        }
    }
}

fn load_ndarray(body: &Json) -> Result<NdArray, String> {
    let obj = body.as_object().ok_or("$ndarray must be an object")?;
    let dtype = match obj.get("dtype") {
        Some(name) => {
            let name = name.as_str().ok_or("$ndarray dtype must be a string")?;
            DType::from_name(name).ok_or_else(|| format!("Unsupported dtype: {}", name))?
        }
        None => DType::Float64,
    };
    let data = obj.get("data").ok_or("$ndarray missing data")?;

    let inferred = infer_shape(data);
    let mut flat = Vec::new();
    flatten(data, &inferred, 0, &mut flat)?;

    let shape = match obj.get("shape") {
        Some(shape) => shape
            .as_array()
            .ok_or("$ndarray shape must be an array")?
            .iter()
            .map(|d| {
                d.as_u64()
                    .map(|d| d as usize)
                    .ok_or_else(|| format!("Invalid ndarray dimension: {}", d))
            })
            .collect::<Result<Vec<usize>, String>>()?,
        None => inferred,
    };

    let expected: usize = shape.iter().product();
    if expected != flat.len() {
        return Err(format!(
            "ndarray data has {} elements but shape {:?} needs {}",
            flat.len(),
            shape,
            expected
        ));
    }
    if dtype == DType::Int64 {
        if let Some(x) = flat.iter().find(|x| x.fract() != 0.0) {
            return Err(format!("int64 ndarray holds non-integral element {}", x));
        }
    }

    Ok(NdArray {
        dtype,
        shape,
        data: flat,
    })
}

/// Shape implied by following the first element of each nesting level.
fn infer_shape(data: &Json) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut cursor = data;
    while let Json::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }
    shape
}

fn flatten(data: &Json, shape: &[usize], depth: usize, out: &mut Vec<f64>) -> Result<(), String> {
    match data {
        Json::Array(items) => {
            if shape.get(depth) != Some(&items.len()) {
                return Err("ndarray data is ragged".to_string());
            }
            for item in items {
                flatten(item, shape, depth + 1, out)?;
            }
            Ok(())
        }
        Json::Number(n) if depth == shape.len() => {
            out.push(n.as_f64().ok_or_else(|| format!("Invalid ndarray element: {}", n))?);
            Ok(())
        }
        Json::Number(_) => Err("ndarray data is ragged".to_string()),
        other => Err(format!("ndarray elements must be numbers, got {}", other)),
    }
}
