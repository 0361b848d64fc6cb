//! Variable analysis for pattern trees.
//!
//! A single pass over a pattern collects every variable name and how
//! often it binds. The counts drive two compiler decisions: whether an
//! environment needs to be materialized at all, and whether a binding
//! site must emit a consistency check against a prior binding of the
//! same name.

use crate::patterns::Pattern;
use indexmap::IndexMap;

/// Collect variable names and per-name occurrence counts, in first
/// appearance order.
///
/// `Var`, `Splat`, and `Let` names count, as do regex named captures.
/// Alternation branches count independently even though only one branch
/// executes per match. `Unquote` contributes nothing: its names are only
/// known at match time. An empty result is valid and common — the
/// pattern is then a pure shape check.
pub fn variable_occurrences(pattern: &Pattern) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    collect(pattern, &mut counts);
    counts
}

fn collect(pattern: &Pattern, counts: &mut IndexMap<String, usize>) {
    match pattern {
        Pattern::Var(name) | Pattern::Splat(name) => record(name, counts),
        Pattern::Let { name, pattern } => {
            record(name, counts);
            collect(pattern, counts);
        }
        Pattern::Obj { fields, .. } => {
            for (_, field_pattern) in fields {
                collect(field_pattern, counts);
            }
        }
        Pattern::Map { entries, .. } => {
            for (_, entry_pattern) in entries {
                collect(entry_pattern, counts);
            }
        }
        Pattern::Seq(elements) | Pattern::Or(elements) => {
            for element in elements {
                collect(element, counts);
            }
        }
        Pattern::Regex(regex) => {
            for name in regex.capture_names().flatten() {
                record(name, counts);
            }
        }
        Pattern::Strict(inner) => collect(inner, counts),
        Pattern::Literal(_) | Pattern::Wildcard | Pattern::Unquote(_) => {}
    }
}

fn record(name: &str, counts: &mut IndexMap<String, usize>) {
    if let Some(count) = counts.get_mut(name) {
        *count += 1;
    } else {
        counts.insert(name.to_string(), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use regex::Regex;

    #[test]
    fn test_no_variables_is_valid() {
        let pattern = Pattern::seq(vec![
            Pattern::Literal(Value::integer(1)),
            Pattern::Wildcard,
        ]);
        assert!(variable_occurrences(&pattern).is_empty());
    }

    #[test]
    fn test_repeated_variable_counts() {
        let pattern = Pattern::seq(vec![Pattern::var("x"), Pattern::var("x")]);
        let counts = variable_occurrences(&pattern);
        assert_eq!(counts.get("x"), Some(&2));
    }

    #[test]
    fn test_alternation_branches_count_independently() {
        let pattern = Pattern::any_of(vec![Pattern::var("x"), Pattern::var("x")]);
        assert_eq!(variable_occurrences(&pattern).get("x"), Some(&2));
    }

    #[test]
    fn test_let_counts_name_and_inner() {
        let pattern = Pattern::let_bind("whole", Pattern::var("part"));
        let counts = variable_occurrences(&pattern);
        assert_eq!(
            counts.keys().collect::<Vec<_>>(),
            vec!["whole", "part"]
        );
        assert_eq!(counts.get("whole"), Some(&1));
        assert_eq!(counts.get("part"), Some(&1));
    }

    #[test]
    fn test_regex_named_captures_count() {
        let pattern = Pattern::regex(Regex::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap());
        let counts = variable_occurrences(&pattern);
        assert_eq!(counts.get("year"), Some(&1));
        assert_eq!(counts.get("month"), Some(&1));
    }

    #[test]
    fn test_unquote_contributes_nothing() {
        let pattern = Pattern::seq(vec![Pattern::unquote("foo"), Pattern::var("x")]);
        let counts = variable_occurrences(&pattern);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_first_appearance_order() {
        let pattern = Pattern::seq(vec![
            Pattern::var("b"),
            Pattern::var("a"),
            Pattern::var("b"),
        ]);
        let counts = variable_occurrences(&pattern);
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(counts.get("b"), Some(&2));
    }
}
