//! Acceptance tests for unquote patterns and the evaluation capability

use crate::{
    match_value, match_with, Compiler, Error, EvalError, MatchError, Pattern, Unquoted,
    UnquoteEval, Value,
};
use std::collections::HashMap;

/// A lookup-table evaluator standing in for a host-language binding
struct TableEval {
    entries: HashMap<String, Unquoted>,
}

impl TableEval {
    fn new(entries: Vec<(&str, Unquoted)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, unquoted)| (name.to_string(), unquoted))
                .collect(),
        }
    }
}

impl UnquoteEval for TableEval {
    fn evaluate(&self, expr: &str) -> Result<Unquoted, EvalError> {
        self.entries
            .get(expr)
            .cloned()
            .ok_or_else(|| EvalError::new(format!("unknown expression: {expr}")))
    }
}

#[test]
fn test_missing_context_is_an_error_not_a_no_match() {
    let pattern = Pattern::unquote("expected");
    let result = match_value(&pattern, &Value::integer(5));
    assert!(matches!(
        result,
        Err(Error::Match(MatchError::MissingContext { .. }))
    ));
}

#[test]
fn test_unquoted_value_matches_by_equality() {
    let eval = TableEval::new(vec![("expected", Unquoted::Value(Value::integer(5)))]);
    let pattern = Pattern::unquote("expected");

    assert!(match_with(&pattern, &Value::integer(5), &eval)
        .unwrap()
        .is_some());
    assert!(match_with(&pattern, &Value::integer(6), &eval)
        .unwrap()
        .is_none());
}

#[test]
fn test_unquoted_pattern_is_matched_in_place() {
    let eval = TableEval::new(vec![(
        "pair",
        Unquoted::Pattern(Pattern::seq(vec![Pattern::var("a"), Pattern::var("b")])),
    )]);
    let pattern = Pattern::unquote("pair");

    let env = match_with(
        &pattern,
        &Value::list(vec![Value::integer(1), Value::integer(2)]),
        &eval,
    )
    .unwrap()
    .unwrap();
    // the names were unknown statically but are reachable afterwards
    assert_eq!(env.get("a"), Some(&Value::integer(1)));
    assert_eq!(env.get("b"), Some(&Value::integer(2)));
}

#[test]
fn test_unquoted_bindings_unify_with_static_ones() {
    let eval = TableEval::new(vec![("same", Unquoted::Pattern(Pattern::var("x")))]);
    let pattern = Pattern::seq(vec![Pattern::var("x"), Pattern::unquote("same")]);

    let agreeing = Value::list(vec![Value::integer(3), Value::integer(3)]);
    let env = match_with(&pattern, &agreeing, &eval).unwrap().unwrap();
    assert_eq!(env.get("x"), Some(&Value::integer(3)));

    let conflicting = Value::list(vec![Value::integer(3), Value::integer(4)]);
    assert!(match_with(&pattern, &conflicting, &eval)
        .unwrap()
        .is_none());
}

#[test]
fn test_evaluation_results_can_change_between_matches() {
    let pattern = Pattern::unquote("local");
    let compiled = Compiler::compile(&pattern).unwrap();

    let zero = TableEval::new(vec![("local", Unquoted::Value(Value::integer(0)))]);
    let one = TableEval::new(vec![("local", Unquoted::Value(Value::integer(1)))]);

    assert!(compiled.match_with(&Value::integer(0), &zero).unwrap().is_some());
    assert!(compiled.match_with(&Value::integer(1), &zero).unwrap().is_none());
    assert!(compiled.match_with(&Value::integer(0), &one).unwrap().is_none());
    assert!(compiled.match_with(&Value::integer(1), &one).unwrap().is_some());
}

#[test]
fn test_evaluation_failure_surfaces() {
    let eval = TableEval::new(vec![]);
    let pattern = Pattern::unquote("missing");
    let result = match_with(&pattern, &Value::integer(1), &eval);
    assert!(matches!(
        result,
        Err(Error::Match(MatchError::EvalFailed { .. }))
    ));
}

#[test]
fn test_unquoted_malformed_pattern_surfaces_as_eval_failure() {
    let eval = TableEval::new(vec![(
        "bad",
        Unquoted::Pattern(Pattern::seq(vec![
            Pattern::splat("a"),
            Pattern::splat("b"),
        ])),
    )]);
    let pattern = Pattern::unquote("bad");
    let result = match_with(&pattern, &Value::list(vec![]), &eval);
    assert!(matches!(
        result,
        Err(Error::Match(MatchError::EvalFailed { .. }))
    ));
}

#[test]
fn test_unquote_inside_larger_pattern() {
    let eval = TableEval::new(vec![(
        "a_literal",
        Unquoted::Pattern(Pattern::any_of(vec![
            Pattern::Literal(Value::symbol("int")),
            Pattern::Literal(Value::symbol("float")),
            Pattern::Literal(Value::symbol("str")),
        ])),
    )]);
    let pattern = Pattern::seq(vec![Pattern::unquote("a_literal"), Pattern::var("val")]);

    let env = match_with(
        &pattern,
        &Value::list(vec![Value::symbol("float"), Value::float(3.14)]),
        &eval,
    )
    .unwrap()
    .unwrap();
    assert_eq!(env.get("val"), Some(&Value::float(3.14)));

    assert!(match_with(
        &pattern,
        &Value::list(vec![Value::symbol("bool"), Value::boolean(true)]),
        &eval,
    )
    .unwrap()
    .is_none());
}
