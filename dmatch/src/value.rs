//! Runtime value representation for the dmatch matcher.
//!
//! This module defines the Value enum that represents all candidate
//! values a pattern can be matched against, along with equality,
//! hashing, and ordering operations the matcher relies on.

use crate::stream::Stream;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Runtime values that patterns are matched against
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UTF-8 string
    String(String),
    /// Symbol - an interned-style atom, distinct from strings
    Symbol(String),

    /// Ordered, index-addressable list of values
    List(Vec<Value>),
    /// Ordered map with Value keys and values
    Map(IndexMap<Value, Value>),
    /// Named-field composite with a type tag
    Object(Object),
    /// One-pass forward cursor over a sequence of values
    Stream(Stream),

    /// Absent/unbound sentinel. Never user data: it marks missing map
    /// keys and object fields during matching, and unbound environment
    /// slots. A bare variable pattern refuses to bind it.
    Nothing,
}

/// A composite value with a type tag and named fields
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl Object {
    /// Create an object with the given type tag and no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The object's type tag
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterate over the object's fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Object(_) => "Object",
            Value::Stream(_) => "Stream",
            Value::Nothing => "Nothing",
        }
    }

    /// Create an integer value
    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    /// Create a float value
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a boolean value
    pub fn boolean(b: bool) -> Self {
        Value::Boolean(b)
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a symbol value
    pub fn symbol(s: impl Into<String>) -> Self {
        Value::Symbol(s.into())
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// Create a map value from key/value pairs, preserving order
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect())
    }

    /// Check for the absent/unbound sentinel
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Total ordering across all values, used to compare key sets for
    /// strict map matching. Values of different types order by type
    /// rank; streams order by handle identity.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Nothing => 0,
                Value::Boolean(_) => 1,
                Value::Integer(_) => 2,
                Value::Float(_) => 3,
                Value::String(_) => 4,
                Value::Symbol(_) => 5,
                Value::List(_) => 6,
                Value::Map(_) => 7,
                Value::Object(_) => 8,
                Value::Stream(_) => 9,
            }
        }

        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ord = ka.total_cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => a
                .type_name
                .cmp(&b.type_name)
                .then_with(|| a.fields.len().cmp(&b.fields.len()))
                .then_with(|| {
                    for ((na, va), (nb, vb)) in a.fields.iter().zip(b.fields.iter()) {
                        let ord = na.cmp(nb).then_with(|| va.total_cmp(vb));
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                }),
            (Value::Stream(a), Value::Stream(b)) => a.handle_id().cmp(&b.handle_id()),
            (Value::Nothing, Value::Nothing) => Ordering::Equal,
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

// Implement Hash for Value so values can be used as Map keys and appear
// inside cache keys
impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Integer(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            Value::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state); // Use bit representation for stable hashing
            }
            Value::Boolean(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            Value::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Symbol(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::List(items) => {
                5u8.hash(state);
                items.hash(state);
            }
            Value::Map(map) => {
                6u8.hash(state);
                // map equality ignores insertion order, so hashing must too
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.total_cmp(b.0));
                for (key, value) in entries {
                    key.hash(state);
                    value.hash(state);
                }
            }
            Value::Object(obj) => {
                7u8.hash(state);
                obj.type_name.hash(state);
                let mut fields: Vec<_> = obj.fields.iter().collect();
                fields.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in fields {
                    name.hash(state);
                    value.hash(state);
                }
            }
            Value::Stream(stream) => {
                8u8.hash(state);
                stream.handle_id().hash(state);
            }
            Value::Nothing => {
                9u8.hash(state);
            }
        }
    }
}

// We need Eq for HashMap/IndexMap usage
impl Eq for Value {}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.fract() == 0.0 {
                    write!(f, "{:.1}", x) // Show 1.0 instead of 1
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Symbol(name) => write!(f, ":{}", name),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => {
                write!(f, "{}{{", obj.type_name)?;
                for (i, (name, value)) in obj.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Stream(_) => write!(f, "#<stream>"),
            Value::Nothing => write!(f, "#<nothing>"),
        }
    }
}
