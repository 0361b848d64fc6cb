//! dmatch - a compiling structural pattern matcher for dynamic values.
//!
//! A caller builds a [`Pattern`] tree describing the shape of interest
//! (literals, variables, object/map/sequence shapes, alternatives,
//! regexes), compiles it once, and applies the resulting matcher to any
//! number of runtime [`Value`]s. A successful match yields an [`Env`]
//! of variable bindings; failure is the ordinary `Ok(None)` outcome,
//! not an error.
//!
//! ```
//! use dmatch::{Compiler, Pattern, Value};
//!
//! let pattern = Pattern::seq(vec![
//!     Pattern::Literal(Value::integer(1)),
//!     Pattern::var("x"),
//! ]);
//! let compiled = Compiler::compile(&pattern).unwrap();
//!
//! let env = compiled
//!     .match_value(&Value::list(vec![Value::integer(1), Value::integer(2)]))
//!     .unwrap()
//!     .expect("matches");
//! assert_eq!(env.get("x"), Some(&Value::integer(2)));
//! ```
//!
//! Matchers are immutable and stateless once compiled: share one
//! [`CompiledPattern`] across threads freely. Repeated compilations of
//! equal patterns can be avoided with a [`PatternCache`]. Deeply nested
//! patterns recurse both at compile time and match time, so call-stack
//! depth is the practical nesting limit.

pub mod analysis;
pub mod cache;
pub mod compiler;
pub mod environment;
pub mod error;
pub mod patterns;
pub mod stream;
pub mod value;

// Include tests directory with all acceptance test modules
#[cfg(test)]
#[path = "tests/mod.rs"]
pub mod tests;

// Re-export public API
pub use cache::PatternCache;
pub use compiler::{CompiledPattern, Compiler, Unquoted, UnquoteEval};
pub use environment::Env;
pub use error::{BuildError, Error, EvalError, MatchError};
pub use patterns::Pattern;
pub use stream::Stream;
pub use value::{Object, Value};

/// Compile a pattern and match it against a value in one call.
///
/// Convenient for one-shot matches; for repeated use, compile once via
/// [`Compiler::compile`] or a [`PatternCache`] instead.
pub fn match_value(pattern: &Pattern, value: &Value) -> Result<Option<Env>, Error> {
    let compiled = Compiler::compile(pattern)?;
    Ok(compiled.match_value(value)?)
}

/// Compile a pattern and match it with an unquote evaluation context
pub fn match_with(
    pattern: &Pattern,
    value: &Value,
    eval: &dyn UnquoteEval,
) -> Result<Option<Env>, Error> {
    let compiled = Compiler::compile(pattern)?;
    Ok(compiled.match_with(value, eval)?)
}
