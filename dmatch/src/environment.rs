//! Binding environments produced by successful matches.
//!
//! An `Env` is a closed record with one slot per variable name the
//! compiled pattern can bind, each starting out unbound. Bindings are
//! written in place during one match attempt and the finished record is
//! handed to the caller read-only. Names discovered only at match time
//! (unquote sub-patterns) live in an overflow list with the same lookup
//! and consistency semantics.

use crate::value::Value;
use std::sync::Arc;

/// Variable bindings from a successful match
#[derive(Debug, Clone, PartialEq)]
pub struct Env {
    names: Arc<[String]>,
    slots: Vec<Value>,
    extras: Vec<(String, Value)>,
}

impl Env {
    pub(crate) fn new(names: Arc<[String]>) -> Self {
        let slots = vec![Value::Nothing; names.len()];
        Self {
            names,
            slots,
            extras: Vec::new(),
        }
    }

    /// Look up a binding by name.
    ///
    /// Returns `None` for names that were never reached in the
    /// successful branch (e.g. a variable bound only in an untaken
    /// alternative) as well as for names the pattern does not know.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(idx) = self.names.iter().position(|n| n == name) {
            match &self.slots[idx] {
                Value::Nothing => None,
                value => Some(value),
            }
        } else {
            self.extras
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value)
        }
    }

    /// Whether `name` was bound by the match
    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The statically-known variable names, in slot order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over all bound name/value pairs
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .zip(&self.slots)
            .filter(|(_, value)| !value.is_nothing())
            .map(|(name, value)| (name.as_str(), value))
            .chain(
                self.extras
                    .iter()
                    .map(|(name, value)| (name.as_str(), value)),
            )
    }

    /// Write a value into a slot.
    ///
    /// For variables that bind at more than one site (`repeated`), a
    /// slot that already holds a value is checked for equality instead
    /// of overwritten: unequal values fail the match. This is
    /// left-to-right unification of repeated pattern variables.
    pub(crate) fn bind_slot(&mut self, idx: usize, repeated: bool, value: &Value) -> bool {
        if repeated {
            match &self.slots[idx] {
                Value::Nothing => {
                    self.slots[idx] = value.clone();
                    true
                }
                existing => existing == value,
            }
        } else {
            self.slots[idx] = value.clone();
            true
        }
    }

    /// Bind a name discovered at match time, applying the same
    /// consistency rule whether the name has a static slot or not.
    pub(crate) fn bind_dynamic(&mut self, name: &str, value: &Value) -> bool {
        if let Some(idx) = self.names.iter().position(|n| n == name) {
            match &self.slots[idx] {
                Value::Nothing => {
                    self.slots[idx] = value.clone();
                    true
                }
                existing => existing == value,
            }
        } else if let Some(pos) = self.extras.iter().position(|(n, _)| n == name) {
            self.extras[pos].1 == *value
        } else {
            self.extras.push((name.to_string(), value.clone()));
            true
        }
    }

    /// Merge another environment with the same slot layout into this
    /// one. Unbound slots yield to bound ones; two concrete, unequal
    /// values fail the merge.
    pub(crate) fn merge_from(&mut self, other: &Env) -> bool {
        for idx in 0..self.slots.len() {
            let incoming = &other.slots[idx];
            if incoming.is_nothing() {
                continue;
            }
            match &self.slots[idx] {
                Value::Nothing => self.slots[idx] = incoming.clone(),
                existing => {
                    if existing != incoming {
                        return false;
                    }
                }
            }
        }
        for (name, value) in &other.extras {
            if !self.bind_dynamic(name, value) {
                return false;
            }
        }
        true
    }
}

/// Environment state threaded through one match attempt.
///
/// Starts out unset — "matched so far, nothing bound" — and
/// materializes an `Env` at most once, when the first real binding is
/// about to occur. A pattern with no binding sites never allocates.
/// Failure is signaled by the matcher's return value, not stored here.
#[derive(Debug)]
pub(crate) struct EnvCell {
    names: Arc<[String]>,
    env: Option<Env>,
}

impl EnvCell {
    pub(crate) fn unset(names: Arc<[String]>) -> Self {
        Self { names, env: None }
    }

    /// The environment, materialized on first use
    pub(crate) fn env_mut(&mut self) -> &mut Env {
        let names = &self.names;
        self.env.get_or_insert_with(|| Env::new(names.clone()))
    }

    /// Reconcile a completed alternative into this cell.
    ///
    /// An unset side adopts the other verbatim; otherwise slots merge
    /// with the unification-consistency rule. Returns false when two
    /// concrete values disagree, which fails the whole match.
    pub(crate) fn merge_child(&mut self, child: EnvCell) -> bool {
        match child.env {
            None => true,
            Some(child_env) => match &mut self.env {
                None => {
                    self.env = Some(child_env);
                    true
                }
                Some(env) => env.merge_from(&child_env),
            },
        }
    }

    /// Finish the attempt, producing the caller-facing environment
    pub(crate) fn into_env(self) -> Env {
        match self.env {
            Some(env) => env,
            None => Env::new(self.names),
        }
    }
}
