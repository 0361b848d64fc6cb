//! Memoization of compiled patterns.
//!
//! Compiling the same pattern repeatedly is wasted work; a cache keyed
//! by structural pattern identity hands back the existing matcher. The
//! cache is an explicit object owned by the caller — there is no global
//! or thread-local state.

use crate::compiler::{CompiledPattern, Compiler};
use crate::error::BuildError;
use crate::patterns::Pattern;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// A check-then-insert cache of compiled patterns.
///
/// Two threads compiling the same pattern concurrently may both do the
/// work; one result is inserted and the other discarded. That race is
/// benign — both matchers are valid — and the map always ends up with
/// exactly one entry per pattern.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<Pattern, Arc<CompiledPattern>>>,
}

impl PatternCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a pattern, or return the cached matcher for an equal
    /// pattern compiled earlier
    pub fn compile(&self, pattern: &Pattern) -> Result<Arc<CompiledPattern>, BuildError> {
        if let Some(hit) = self.compiled.lock().get(pattern) {
            trace!("compiled pattern cache hit");
            return Ok(Arc::clone(hit));
        }

        // compile outside the lock so slow compilations don't serialize
        // unrelated lookups
        let fresh = Arc::new(Compiler::compile(pattern)?);
        let mut map = self.compiled.lock();
        let entry = map.entry(pattern.clone()).or_insert(fresh);
        Ok(Arc::clone(entry))
    }

    /// Number of distinct patterns compiled so far
    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    /// Whether the cache holds no compiled patterns
    pub fn is_empty(&self) -> bool {
        self.compiled.lock().is_empty()
    }
}
