//! Error types for pattern compilation and matching.
//!
//! Failing to match is not an error: matchers report it as `Ok(None)`.
//! The types here cover malformed patterns (compile time) and misuse of
//! the unquote escape hatch (match time), with diagnostics via miette
//! integration.

use miette::Diagnostic;
use thiserror::Error;

/// Structural errors detected while compiling a pattern
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum BuildError {
    #[error("A sequence pattern cannot have more than one splat, found {count}")]
    #[diagnostic(
        code(dmatch::build::multiple_splats),
        help("Keep at most one splat per sequence; nest sequences to capture several runs")
    )]
    MultipleSplats { count: usize },

    #[error("Splat '{name}' is only allowed as an element of a sequence pattern")]
    #[diagnostic(
        code(dmatch::build::splat_outside_sequence),
        help("Use a plain variable to capture a whole value")
    )]
    SplatOutsideSequence { name: String },
}

impl BuildError {
    /// Create a multiple-splats error
    pub fn multiple_splats(count: usize) -> Self {
        Self::MultipleSplats { count }
    }

    /// Create a splat-outside-sequence error
    pub fn splat_outside_sequence(name: impl Into<String>) -> Self {
        Self::SplatOutsideSequence { name: name.into() }
    }
}

/// Failure reported by a caller-supplied unquote evaluation context
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
#[error("{message}")]
#[diagnostic(code(dmatch::unquote::eval_error))]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    /// Create an evaluation error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal errors raised while running a compiled matcher.
///
/// These are genuine misuses, distinct from the ordinary no-match
/// outcome.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum MatchError {
    #[error("Pattern contains unquote '{expr}' but no evaluation context was provided")]
    #[diagnostic(
        code("dmatch::match::missing_context"),
        help("Match with `match_with` and supply an UnquoteEval implementation")
    )]
    MissingContext { expr: String },

    #[error("Evaluating unquote '{expr}' failed")]
    #[diagnostic(code("dmatch::match::eval_failed"))]
    EvalFailed {
        expr: String,
        #[source]
        source: EvalError,
    },
}

impl MatchError {
    /// Create a missing-context error
    pub fn missing_context(expr: impl Into<String>) -> Self {
        Self::MissingContext { expr: expr.into() }
    }

    /// Create an eval-failed error
    pub fn eval_failed(expr: impl Into<String>, source: EvalError) -> Self {
        Self::EvalFailed {
            expr: expr.into(),
            source,
        }
    }
}

/// Either stage's error, for the one-call convenience API
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Match(#[from] MatchError),
}
