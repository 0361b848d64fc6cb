//! Acceptance tests for regex patterns and their dynamically merged
//! captures

use crate::{match_value, Pattern, Value};
use regex::Regex;

fn matches(pattern: &Pattern, value: &Value) -> bool {
    match_value(pattern, value).unwrap().is_some()
}

fn date_pattern() -> Pattern {
    Pattern::regex(Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{2})$").unwrap())
}

#[test]
fn test_named_captures_become_bindings() {
    let env = match_value(&date_pattern(), &Value::string("2024-06"))
        .unwrap()
        .unwrap();
    assert_eq!(env.get("year"), Some(&Value::string("2024")));
    assert_eq!(env.get("month"), Some(&Value::string("06")));
}

#[test]
fn test_capture_names_are_statically_known() {
    use crate::Compiler;

    let compiled = Compiler::compile(&date_pattern()).unwrap();
    assert_eq!(compiled.var_names(), ["year", "month"]);
}

#[test]
fn test_no_regex_match_fails() {
    assert!(!matches(&date_pattern(), &Value::string("June 2024")));
}

#[test]
fn test_only_text_like_values_match() {
    assert!(!matches(&date_pattern(), &Value::integer(202406)));
    assert!(!matches(&date_pattern(), &Value::list(vec![])));
}

#[test]
fn test_symbols_match_like_strings() {
    let pattern = Pattern::regex(Regex::new(r"^(?P<tag>ok|err)$").unwrap());
    let env = match_value(&pattern, &Value::symbol("ok")).unwrap().unwrap();
    assert_eq!(env.get("tag"), Some(&Value::string("ok")));
}

#[test]
fn test_unparticipating_group_stays_unbound() {
    let pattern = Pattern::regex(Regex::new(r"^a(?P<opt>b)?$").unwrap());
    let env = match_value(&pattern, &Value::string("a")).unwrap().unwrap();
    assert_eq!(env.get("opt"), None);
    assert!(!env.is_bound("opt"));
}

#[test]
fn test_captures_unify_with_other_bindings() {
    let pattern = Pattern::seq(vec![
        Pattern::var("word"),
        Pattern::regex(Regex::new(r"^(?P<word>\w+)$").unwrap()),
    ]);

    let agreeing = Value::list(vec![Value::string("hi"), Value::string("hi")]);
    let env = match_value(&pattern, &agreeing).unwrap().unwrap();
    assert_eq!(env.get("word"), Some(&Value::string("hi")));

    let conflicting = Value::list(vec![Value::string("hi"), Value::string("bye")]);
    assert!(!matches(&pattern, &conflicting));
}

#[test]
fn test_regex_without_named_captures_is_a_test() {
    let pattern = Pattern::regex(Regex::new(r"^\d+$").unwrap());
    let env = match_value(&pattern, &Value::string("123")).unwrap().unwrap();
    assert_eq!(env.bindings().count(), 0);
    assert!(!matches(&pattern, &Value::string("12a")));
}
