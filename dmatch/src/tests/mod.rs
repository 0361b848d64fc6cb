//! Acceptance tests for the dmatch public API
//!
//! These tests exercise the compile-then-match pipeline end to end:
//! pattern construction, compilation, matching against values, and the
//! resulting binding environments.

pub mod test_regex_patterns;
pub mod test_unquote_patterns;
