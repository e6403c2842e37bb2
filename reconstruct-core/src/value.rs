// Value arena for the reconstruction engine.
// Identity is the arena index handed out by ValueGraph, never structural
// equality: two equal lists allocated separately are two different values.

use std::cmp::Ordering;
use std::fmt;

/// Stable identity token for a value in a `ValueGraph`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value #{}", self.0)
    }
}

/// Element type of a numeric array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    Float64,
    Int64,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Int64 => "int64",
        }
    }

    pub fn from_name(name: &str) -> Option<DType> {
        match name {
            "float64" | "f8" | "float" => Some(DType::Float64),
            "int64" | "i8" | "int" => Some(DType::Int64),
            _ => None,
        }
    }
}

/// Dense numeric array. Opaque to the core: only a registered producer
/// knows how to encode it.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    pub dtype: DType,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<ValueId>),
    Tuple(Vec<ValueId>),
    Dict(Vec<(ValueId, ValueId)>),
    Array(NdArray),
    Object { class: String, attrs: Vec<(String, ValueId)> },
}

/// Classification used to pick a producer when no exact type match exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Scalar,
    Sequence,
    Mapping,
    Encoded,
    Custom,
}

impl Value {
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex { .. } => "complex",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Array(_) => "ndarray",
            Value::Object { class, .. } => class,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Complex { .. }
            | Value::Str(_)
            | Value::Bytes(_) => Category::Scalar,
            Value::List(_) | Value::Tuple(_) => Category::Sequence,
            Value::Dict(_) => Category::Mapping,
            Value::Array(_) => Category::Encoded,
            Value::Object { .. } => Category::Custom,
        }
    }

    /// Literal source form of a scalar; `None` for every other category.
    pub fn literal(&self) -> Option<String> {
        let text = match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => float_repr(*x),
            Value::Complex { re, im } => complex_repr(*re, *im),
            Value::Str(s) => str_repr(s),
            Value::Bytes(b) => bytes_repr(b),
            _ => return None,
        };
        Some(text)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

/// Arena owning every value of one reconstruction run.
#[derive(Debug, Default)]
pub struct ValueGraph {
    values: Vec<Value>,
}

impl ValueGraph {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn alloc(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    /// Reserve an identity whose value is filled in later with `set`.
    /// Until then the slot holds `None`.
    pub fn reserve(&mut self) -> ValueId {
        self.alloc(Value::None)
    }

    /// Panics if `id` was not issued by this graph.
    pub fn set(&mut self, id: ValueId, value: Value) {
        self.values[id.index()] = value;
    }

    /// Panics if `id` was not issued by this graph.
    pub fn get(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub fn try_get(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.index())
    }

    pub fn contains(&self, id: ValueId) -> bool {
        id.index() < self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ValueId> + '_ {
        (0..self.values.len()).map(|i| ValueId(i as u32))
    }

    pub fn type_name(&self, id: ValueId) -> &str {
        self.get(id).type_name()
    }

    pub fn category(&self, id: ValueId) -> Category {
        self.get(id).category()
    }

    /// Attribute lookup on an `Object` value.
    pub fn attr(&self, id: ValueId, name: &str) -> Option<ValueId> {
        match self.get(id) {
            Value::Object { attrs, .. } => attrs
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| *value),
            _ => None,
        }
    }

    // Convenience constructors
    pub fn int(&mut self, n: i64) -> ValueId {
        self.alloc(Value::Int(n))
    }

    pub fn float(&mut self, x: f64) -> ValueId {
        self.alloc(Value::Float(x))
    }

    pub fn str(&mut self, s: &str) -> ValueId {
        self.alloc(Value::Str(s.to_string()))
    }

    pub fn list(&mut self, items: Vec<ValueId>) -> ValueId {
        self.alloc(Value::List(items))
    }

    pub fn tuple(&mut self, items: Vec<ValueId>) -> ValueId {
        self.alloc(Value::Tuple(items))
    }

    pub fn object(&mut self, class: &str, attrs: Vec<(&str, ValueId)>) -> ValueId {
        let attrs = attrs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.alloc(Value::Object { class: class.to_string(), attrs })
    }

    /// Python 2 style ordering: numbers compare numerically across bool/int/float,
    /// strings and bytes lexicographically, sequences element-wise, anything
    /// else by type name and then identity.
    pub fn compare(&self, a: ValueId, b: ValueId) -> Ordering {
        let (va, vb) = (self.get(a), self.get(b));
        match (va, vb) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
            (Value::Tuple(xs), Value::Tuple(ys)) | (Value::List(xs), Value::List(ys)) => {
                for (x, y) in xs.iter().zip(ys.iter()) {
                    let ord = self.compare(*x, *y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                xs.len().cmp(&ys.len())
            }
            _ => match (va.as_number(), vb.as_number()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => va
                    .type_name()
                    .cmp(vb.type_name())
                    .then_with(|| a.cmp(&b)),
            },
        }
    }

    /// Human-readable rendering for diagnostics. Self-referencing
    /// containers print as `[...]`.
    pub fn describe(&self, id: ValueId) -> String {
        let mut stack = Vec::new();
        self.describe_inner(id, &mut stack)
    }

    fn describe_inner(&self, id: ValueId, stack: &mut Vec<ValueId>) -> String {
        if stack.contains(&id) {
            return "[...]".to_string();
        }
        let value = self.get(id);
        if let Some(text) = value.literal() {
            return text;
        }
        stack.push(id);
        let text = match value {
            Value::List(items) => format!("[{}]", self.describe_all(items, stack)),
            Value::Tuple(items) if items.len() == 1 => {
                format!("({},)", self.describe_all(items, stack))
            }
            Value::Tuple(items) => format!("({})", self.describe_all(items, stack)),
            Value::Dict(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!("{}: {}", self.describe_inner(*k, stack), self.describe_inner(*v, stack))
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Array(array) => format!("<ndarray {} {:?}>", array.dtype.name(), array.shape),
            Value::Object { class, .. } => format!("<{} {}>", class, id),
            _ => unreachable!("scalars handled above"),
        };
        stack.pop();
        text
    }

    fn describe_all(&self, items: &[ValueId], stack: &mut Vec<ValueId>) -> String {
        items
            .iter()
            .map(|item| self.describe_inner(*item, stack))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "float('nan')".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "float('inf')" } else { "-float('inf')" }.to_string();
    }
    // Debug keeps the trailing `.0` on integral floats and switches to
    // exponent form at the same thresholds; Python writes the exponent with a
    // sign and at least two digits.
    let text = format!("{:?}", x);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

fn complex_part(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = float_repr(x);
    match text.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => text,
    }
}

pub fn complex_repr(re: f64, im: f64) -> String {
    if re == 0.0 && re.is_sign_positive() {
        return format!("{}j", complex_part(im));
    }
    let imag = complex_part(im);
    let sign = if imag.starts_with('-') { "" } else { "+" };
    format!("({}{}{}j)", complex_part(re), sign, imag)
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

pub fn str_repr(s: &str) -> String {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub fn bytes_repr(bytes: &[u8]) -> String {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote);
    out
}
