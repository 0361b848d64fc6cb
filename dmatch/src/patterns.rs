//! Pattern tree for the dmatch compiler.
//!
//! Patterns form a closed variant set, immutable once built. The
//! compiler lowers a tree of these nodes into a reusable matcher;
//! structural equality and hashing let whole trees key the compile
//! cache.

use crate::value::Value;
use regex::Regex;
use std::hash::{Hash, Hasher};

/// A structural pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches by equality against a value
    Literal(Value),
    /// Matches anything, binds nothing
    Wildcard,
    /// Matches anything except the absent sentinel, binds the name
    Var(String),
    /// Captures a contiguous sub-run of a sequence; legal only as an
    /// element of `Seq`
    Splat(String),
    /// Matches the inner pattern and additionally binds the whole value
    Let {
        name: String,
        pattern: Box<Pattern>,
    },
    /// Value must be an object of the named type; each field is read and
    /// matched against its sub-pattern
    Obj {
        type_name: String,
        fields: Vec<(String, Pattern)>,
    },
    /// Value must be a map; each key is looked up (absent keys yield the
    /// absent sentinel) and matched. `strict` requires the key sets to
    /// be equal.
    Map {
        entries: Vec<(Value, Pattern)>,
        strict: bool,
    },
    /// Ordered sequence of element patterns, at most one of which may be
    /// a `Splat`
    Seq(Vec<Pattern>),
    /// Ordered alternatives; the first one to fully match wins
    Or(Vec<Pattern>),
    /// Value must be a string or symbol; named captures become bindings
    Regex(Regex),
    /// Forces exact-key-set checking for any map pattern it wraps,
    /// directly or through nested shapes
    Strict(Box<Pattern>),
    /// Escape hatch: the expression is evaluated at match time through a
    /// caller-supplied context to obtain a sub-pattern or plain value
    Unquote(String),
}

impl Pattern {
    /// A variable binding pattern
    pub fn var(name: impl Into<String>) -> Self {
        Pattern::Var(name.into())
    }

    /// A splat capturing a sub-run of a sequence
    pub fn splat(name: impl Into<String>) -> Self {
        Pattern::Splat(name.into())
    }

    /// Bind `name` to the whole value while also matching `pattern`
    pub fn let_bind(name: impl Into<String>, pattern: Pattern) -> Self {
        Pattern::Let {
            name: name.into(),
            pattern: Box::new(pattern),
        }
    }

    /// An object shape pattern
    pub fn obj(type_name: impl Into<String>, fields: &[(&str, Pattern)]) -> Self {
        Pattern::Obj {
            type_name: type_name.into(),
            fields: fields
                .iter()
                .map(|(name, pattern)| (name.to_string(), pattern.clone()))
                .collect(),
        }
    }

    /// A non-strict map shape pattern
    pub fn map(entries: &[(Value, Pattern)]) -> Self {
        Pattern::Map {
            entries: entries.to_vec(),
            strict: false,
        }
    }

    /// A map shape pattern requiring the key sets to match exactly
    pub fn map_strict(entries: &[(Value, Pattern)]) -> Self {
        Pattern::Map {
            entries: entries.to_vec(),
            strict: true,
        }
    }

    /// A sequence shape pattern
    pub fn seq(elements: Vec<Pattern>) -> Self {
        Pattern::Seq(elements)
    }

    /// An alternation over ordered alternatives
    pub fn any_of(alternatives: Vec<Pattern>) -> Self {
        Pattern::Or(alternatives)
    }

    /// A regex pattern; named captures become bindings
    pub fn regex(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }

    /// Force exact-key-set checking for wrapped map patterns
    pub fn strict(inner: Pattern) -> Self {
        Pattern::Strict(Box::new(inner))
    }

    /// An escape-hatch pattern evaluated at match time
    pub fn unquote(expr: impl Into<String>) -> Self {
        Pattern::Unquote(expr.into())
    }

    /// Whether this node is a splat capture
    pub fn is_splat(&self) -> bool {
        matches!(self, Pattern::Splat(_))
    }
}

// Structural equality; regexes compare by source text
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Literal(a), Pattern::Literal(b)) => a == b,
            (Pattern::Wildcard, Pattern::Wildcard) => true,
            (Pattern::Var(a), Pattern::Var(b)) => a == b,
            (Pattern::Splat(a), Pattern::Splat(b)) => a == b,
            (
                Pattern::Let { name: na, pattern: pa },
                Pattern::Let { name: nb, pattern: pb },
            ) => na == nb && pa == pb,
            (
                Pattern::Obj { type_name: ta, fields: fa },
                Pattern::Obj { type_name: tb, fields: fb },
            ) => ta == tb && fa == fb,
            (
                Pattern::Map { entries: ea, strict: sa },
                Pattern::Map { entries: eb, strict: sb },
            ) => sa == sb && ea == eb,
            (Pattern::Seq(a), Pattern::Seq(b)) => a == b,
            (Pattern::Or(a), Pattern::Or(b)) => a == b,
            (Pattern::Regex(a), Pattern::Regex(b)) => a.as_str() == b.as_str(),
            (Pattern::Strict(a), Pattern::Strict(b)) => a == b,
            (Pattern::Unquote(a), Pattern::Unquote(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Pattern::Literal(value) => {
                0u8.hash(state);
                value.hash(state);
            }
            Pattern::Wildcard => {
                1u8.hash(state);
            }
            Pattern::Var(name) => {
                2u8.hash(state);
                name.hash(state);
            }
            Pattern::Splat(name) => {
                3u8.hash(state);
                name.hash(state);
            }
            Pattern::Let { name, pattern } => {
                4u8.hash(state);
                name.hash(state);
                pattern.hash(state);
            }
            Pattern::Obj { type_name, fields } => {
                5u8.hash(state);
                type_name.hash(state);
                fields.hash(state);
            }
            Pattern::Map { entries, strict } => {
                6u8.hash(state);
                strict.hash(state);
                for (key, pattern) in entries {
                    key.hash(state);
                    pattern.hash(state);
                }
            }
            Pattern::Seq(elements) => {
                7u8.hash(state);
                elements.hash(state);
            }
            Pattern::Or(alternatives) => {
                8u8.hash(state);
                alternatives.hash(state);
            }
            Pattern::Regex(regex) => {
                9u8.hash(state);
                regex.as_str().hash(state);
            }
            Pattern::Strict(inner) => {
                10u8.hash(state);
                inner.hash(state);
            }
            Pattern::Unquote(expr) => {
                11u8.hash(state);
                expr.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(pattern: &Pattern) -> u64 {
        let mut hasher = DefaultHasher::new();
        pattern.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Pattern::var("x"), Pattern::var("x"));
        assert_ne!(Pattern::var("x"), Pattern::var("y"));
        assert_ne!(Pattern::var("x"), Pattern::splat("x"));
        assert_eq!(
            Pattern::seq(vec![Pattern::Literal(Value::integer(1)), Pattern::var("x")]),
            Pattern::seq(vec![Pattern::Literal(Value::integer(1)), Pattern::var("x")])
        );
    }

    #[test]
    fn test_regexes_compare_by_source() {
        let a = Pattern::regex(Regex::new(r"(?P<d>\d+)").unwrap());
        let b = Pattern::regex(Regex::new(r"(?P<d>\d+)").unwrap());
        let c = Pattern::regex(Regex::new(r"(?P<w>\w+)").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_strictness_distinguishes_maps() {
        let entries = [(Value::symbol("a"), Pattern::Wildcard)];
        assert_ne!(Pattern::map(&entries), Pattern::map_strict(&entries));
    }

    #[test]
    fn test_equal_patterns_hash_alike() {
        let make = || {
            Pattern::any_of(vec![
                Pattern::seq(vec![Pattern::Literal(Value::integer(1)), Pattern::var("x")]),
                Pattern::strict(Pattern::map(&[(Value::symbol("k"), Pattern::var("x"))])),
            ])
        };
        assert_eq!(make(), make());
        assert_eq!(hash_of(&make()), hash_of(&make()));
    }
}
