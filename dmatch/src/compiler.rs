//! Pattern compiler: lowers a pattern tree into a reusable matcher.
//!
//! Compilation is a recursive descent that produces one closure per
//! pattern node. The resulting matcher is immutable and stateless;
//! every invocation threads its own environment cell, so one compiled
//! pattern can serve any number of concurrent matches. A `Compiler`
//! value holds the transient build state (slot table, occurrence
//! counts) for exactly one `compile` call.

use crate::analysis::variable_occurrences;
use crate::environment::{Env, EnvCell};
use crate::error::{BuildError, EvalError, MatchError};
use crate::patterns::Pattern;
use crate::stream::Stream;
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// Caller-supplied evaluation capability for unquote patterns
pub trait UnquoteEval {
    /// Evaluate an unquote expression, yielding either a sub-pattern or
    /// a plain value to match by equality
    fn evaluate(&self, expr: &str) -> Result<Unquoted, EvalError>;
}

/// Result of evaluating an unquote expression
#[derive(Debug, Clone)]
pub enum Unquoted {
    /// A sub-pattern to compile and match in place
    Pattern(Pattern),
    /// A plain value to match by equality
    Value(Value),
}

type Step =
    Box<dyn Fn(&Value, &mut EnvCell, Option<&dyn UnquoteEval>) -> Result<bool, MatchError> + Send + Sync>;

/// A pattern lowered to an executable matcher.
///
/// Owns the original pattern, the matcher, and the ordered list of
/// variable names it can bind. Immutable and freely shareable across
/// threads; each match allocates its own environment.
pub struct CompiledPattern {
    pattern: Pattern,
    names: Arc<[String]>,
    matcher: Step,
}

impl CompiledPattern {
    /// The pattern this matcher was compiled from
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Variable names this pattern can bind, in slot order
    pub fn var_names(&self) -> &[String] {
        &self.names
    }

    /// Match a value, without an unquote evaluation context.
    ///
    /// `Ok(Some(env))` on success, `Ok(None)` on no match. Patterns
    /// containing an unquote fail with `MatchError::MissingContext`.
    pub fn match_value(&self, value: &Value) -> Result<Option<Env>, MatchError> {
        self.run(value, None)
    }

    /// Match a value with an unquote evaluation context
    pub fn match_with(
        &self,
        value: &Value,
        eval: &dyn UnquoteEval,
    ) -> Result<Option<Env>, MatchError> {
        self.run(value, Some(eval))
    }

    fn run(
        &self,
        value: &Value,
        eval: Option<&dyn UnquoteEval>,
    ) -> Result<Option<Env>, MatchError> {
        let mut cell = EnvCell::unset(self.names.clone());
        if (self.matcher)(value, &mut cell, eval)? {
            Ok(Some(cell.into_env()))
        } else {
            Ok(None)
        }
    }
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .field("var_names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Recursive-descent compiler for one pattern tree
pub struct Compiler {
    names: Arc<[String]>,
    counts: Vec<usize>,
}

/// A resolved binding site: slot index plus whether the variable binds
/// elsewhere too (which requires a consistency check)
#[derive(Clone, Copy)]
struct Binder {
    idx: usize,
    repeated: bool,
}

impl Compiler {
    /// Compile a pattern into a reusable matcher.
    ///
    /// Fails on structurally invalid patterns: more than one splat in a
    /// sequence, or a splat outside sequence position.
    pub fn compile(pattern: &Pattern) -> Result<CompiledPattern, BuildError> {
        let occurrences = variable_occurrences(pattern);
        let names: Arc<[String]> = occurrences.keys().cloned().collect::<Vec<_>>().into();
        let counts: Vec<usize> = occurrences.values().copied().collect();
        debug!(variables = names.len(), "compiling pattern");

        let compiler = Compiler {
            names: names.clone(),
            counts,
        };
        let matcher = compiler.compile_node(pattern, false)?;
        Ok(CompiledPattern {
            pattern: pattern.clone(),
            names,
            matcher,
        })
    }

    fn binder(&self, name: &str) -> Binder {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .expect("binding site was collected by variable analysis");
        Binder {
            idx,
            repeated: self.counts[idx] > 1,
        }
    }

    fn compile_node(&self, pattern: &Pattern, strict: bool) -> Result<Step, BuildError> {
        match pattern {
            Pattern::Wildcard => Ok(Box::new(|_, _, _| Ok(true))),

            Pattern::Literal(expected) => {
                let expected = expected.clone();
                Ok(Box::new(move |value, _, _| Ok(*value == expected)))
            }

            Pattern::Var(name) => {
                let binder = self.binder(name);
                Ok(Box::new(move |value, cell, _| {
                    if value.is_nothing() {
                        return Ok(false);
                    }
                    Ok(cell.env_mut().bind_slot(binder.idx, binder.repeated, value))
                }))
            }

            Pattern::Splat(name) => Err(BuildError::splat_outside_sequence(name)),

            Pattern::Let { name, pattern } => {
                let inner = self.compile_node(pattern, strict)?;
                let binder = self.binder(name);
                Ok(Box::new(move |value, cell, eval| {
                    if !inner(value, cell, eval)? {
                        return Ok(false);
                    }
                    Ok(cell.env_mut().bind_slot(binder.idx, binder.repeated, value))
                }))
            }

            Pattern::Strict(inner) => self.compile_node(inner, true),

            Pattern::Obj { type_name, fields } => self.compile_obj(type_name, fields, strict),

            Pattern::Map { entries, strict: own_strict } => {
                self.compile_map(entries, strict || *own_strict)
            }

            Pattern::Seq(elements) => self.compile_seq(elements, strict),

            Pattern::Or(alternatives) => {
                // strict-mode does not cross an alternation boundary
                let steps: Vec<Step> = alternatives
                    .iter()
                    .map(|alt| self.compile_node(alt, false))
                    .collect::<Result<_, _>>()?;
                let names = self.names.clone();
                Ok(Box::new(move |value, cell, eval| {
                    for step in &steps {
                        // each alternative starts from a fresh state:
                        // partial bindings of a failed alternative never
                        // leak into the next one
                        let mut attempt = EnvCell::unset(names.clone());
                        if step(value, &mut attempt, eval)? {
                            return Ok(cell.merge_child(attempt));
                        }
                    }
                    Ok(false)
                }))
            }

            Pattern::Regex(regex) => {
                let regex = regex.clone();
                let capture_names: Vec<String> = regex
                    .capture_names()
                    .flatten()
                    .map(str::to_string)
                    .collect();
                Ok(Box::new(move |value, cell, _| {
                    let text = match value {
                        Value::String(s) => s.as_str(),
                        Value::Symbol(s) => s.as_str(),
                        _ => return Ok(false),
                    };
                    let Some(captures) = regex.captures(text) else {
                        return Ok(false);
                    };
                    if !capture_names.is_empty() {
                        let env = cell.env_mut();
                        for name in &capture_names {
                            // a group that did not participate leaves its
                            // variable unbound
                            if let Some(m) = captures.name(name) {
                                let captured = Value::String(m.as_str().to_string());
                                if !env.bind_dynamic(name, &captured) {
                                    return Ok(false);
                                }
                            }
                        }
                    }
                    Ok(true)
                }))
            }

            Pattern::Unquote(expr) => {
                let expr = expr.clone();
                Ok(Box::new(move |value, cell, eval| {
                    let Some(eval) = eval else {
                        return Err(MatchError::missing_context(&expr));
                    };
                    let unquoted = eval
                        .evaluate(&expr)
                        .map_err(|source| MatchError::eval_failed(&expr, source))?;
                    match unquoted {
                        Unquoted::Value(expected) => Ok(*value == expected),
                        Unquoted::Pattern(pattern) => {
                            let compiled = Compiler::compile(&pattern).map_err(|build| {
                                MatchError::eval_failed(&expr, EvalError::new(build.to_string()))
                            })?;
                            match compiled.run(value, Some(eval))? {
                                None => Ok(false),
                                Some(inner_env) => {
                                    let mut pairs = inner_env.bindings().peekable();
                                    if pairs.peek().is_some() {
                                        let env = cell.env_mut();
                                        for (name, bound) in pairs {
                                            if !env.bind_dynamic(name, bound) {
                                                return Ok(false);
                                            }
                                        }
                                    }
                                    Ok(true)
                                }
                            }
                        }
                    }
                }))
            }
        }
    }

    fn compile_obj(
        &self,
        type_name: &str,
        fields: &[(String, Pattern)],
        strict: bool,
    ) -> Result<Step, BuildError> {
        let type_name = type_name.to_string();
        let ordered = order_by_cost(fields.iter().map(|(_, p)| p));
        let steps: Vec<(String, Step)> = ordered
            .into_iter()
            .map(|i| {
                let (name, pattern) = &fields[i];
                Ok((name.clone(), self.compile_node(pattern, strict)?))
            })
            .collect::<Result<_, BuildError>>()?;

        Ok(Box::new(move |value, cell, eval| {
            let Value::Object(obj) = value else {
                return Ok(false);
            };
            if obj.type_name() != type_name {
                return Ok(false);
            }
            let nothing = Value::Nothing;
            for (field, step) in &steps {
                let field_value = obj.field(field).unwrap_or(&nothing);
                if !step(field_value, cell, eval)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }))
    }

    fn compile_map(
        &self,
        entries: &[(Value, Pattern)],
        strict: bool,
    ) -> Result<Step, BuildError> {
        let ordered = order_by_cost(entries.iter().map(|(_, p)| p));
        let steps: Vec<(Value, Step)> = ordered
            .into_iter()
            .map(|i| {
                let (key, pattern) = &entries[i];
                Ok((key.clone(), self.compile_node(pattern, strict)?))
            })
            .collect::<Result<_, BuildError>>()?;

        let mut pattern_keys: Vec<Value> = entries.iter().map(|(k, _)| k.clone()).collect();
        pattern_keys.sort_by(|a, b| a.total_cmp(b));

        Ok(Box::new(move |value, cell, eval| {
            let Value::Map(map) = value else {
                return Ok(false);
            };
            if strict {
                // exact key set, compared as sorted sequences
                if map.len() != pattern_keys.len() {
                    return Ok(false);
                }
                let mut value_keys: Vec<&Value> = map.keys().collect();
                value_keys.sort_by(|a, b| a.total_cmp(b));
                if !value_keys
                    .iter()
                    .zip(&pattern_keys)
                    .all(|(have, want)| **have == *want)
                {
                    return Ok(false);
                }
            }
            let nothing = Value::Nothing;
            for (key, step) in &steps {
                let entry = map.get(key).unwrap_or(&nothing);
                if !step(entry, cell, eval)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }))
    }

    fn compile_seq(&self, elements: &[Pattern], strict: bool) -> Result<Step, BuildError> {
        let splat_count = elements.iter().filter(|p| p.is_splat()).count();
        if splat_count > 1 {
            return Err(BuildError::multiple_splats(splat_count));
        }
        let splat_site = elements.iter().enumerate().find_map(|(idx, p)| match p {
            Pattern::Splat(name) => Some((idx, name)),
            _ => None,
        });
        let splat_index = splat_site.map(|(idx, _)| idx);
        let total = elements.len();

        // fixed elements before the splat (or all of them), kept in
        // declaration order for the cursor path
        let pre_end = splat_index.unwrap_or(total);
        let pre: Vec<(usize, Step)> = elements[..pre_end]
            .iter()
            .enumerate()
            .map(|(i, p)| Ok((i, self.compile_node(p, strict)?)))
            .collect::<Result<_, BuildError>>()?;

        // the indexable path checks cheap/likely-to-fail elements first
        let pre_order = order_by_cost(elements[..pre_end].iter());

        let splat = splat_site.map(|(idx, name)| SplatBind {
            binder: self.binder(name),
            start: idx,
            open: idx == total - 1,
        });

        let post: Vec<(usize, Step)> = match splat_index {
            Some(idx) => elements[idx + 1..]
                .iter()
                .enumerate()
                .map(|(offset, p)| Ok((idx + 1 + offset, self.compile_node(p, strict)?)))
                .collect::<Result<_, BuildError>>()?,
            None => Vec::new(),
        };

        Ok(Box::new(move |value, cell, eval| match value {
            Value::List(items) => match_indexable(
                items, &pre, &pre_order, &splat, &post, total, cell, eval,
            ),
            Value::Stream(stream) => {
                match_cursor(stream, &pre, &splat, &post, cell, eval)
            }
            _ => Ok(false),
        }))
    }
}

/// Splat capture site within a sequence pattern
struct SplatBind {
    binder: Binder,
    /// element index of the splat, equal to the fixed-prefix length
    start: usize,
    /// true when the splat is the final element
    open: bool,
}

/// Evaluation-order cost of a sub-pattern: cheapest or most
/// failure-likely checks run first. Purely a performance choice; it
/// never changes match outcomes.
fn pattern_cost(pattern: &Pattern) -> u8 {
    match pattern {
        Pattern::Literal(_) | Pattern::Wildcard => 0,
        Pattern::Strict(inner) => pattern_cost(inner),
        Pattern::Obj { .. } | Pattern::Map { .. } | Pattern::Seq(_) => 1,
        Pattern::Or(_) | Pattern::Regex(_) => 2,
        Pattern::Var(_) | Pattern::Splat(_) | Pattern::Let { .. } => 3,
        Pattern::Unquote(_) => 4,
    }
}

/// Indices 0..n sorted by sub-pattern cost, ties keeping declaration
/// order
fn order_by_cost<'a>(patterns: impl Iterator<Item = &'a Pattern>) -> Vec<usize> {
    let costs: Vec<u8> = patterns.map(pattern_cost).collect();
    let mut order: Vec<usize> = (0..costs.len()).collect();
    order.sort_by_key(|&i| costs[i]);
    order
}

#[allow(clippy::too_many_arguments)]
fn match_indexable(
    items: &[Value],
    pre: &[(usize, Step)],
    pre_order: &[usize],
    splat: &Option<SplatBind>,
    post: &[(usize, Step)],
    total: usize,
    cell: &mut EnvCell,
    eval: Option<&dyn UnquoteEval>,
) -> Result<bool, MatchError> {
    match splat {
        Some(_) => {
            if items.len() < total - 1 {
                return Ok(false);
            }
        }
        None => {
            if items.len() != total {
                return Ok(false);
            }
        }
    }

    for &k in pre_order {
        let (index, step) = &pre[k];
        if !step(&items[*index], cell, eval)? {
            return Ok(false);
        }
    }

    if let Some(splat) = splat {
        let end = items.len() - post.len();
        let captured = Value::List(items[splat.start..end].to_vec());
        if !cell
            .env_mut()
            .bind_slot(splat.binder.idx, splat.binder.repeated, &captured)
        {
            return Ok(false);
        }
        for (index, step) in post {
            // trailing fixed elements address from the end
            let position = items.len() - (total - *index);
            if !step(&items[position], cell, eval)? {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn match_cursor(
    stream: &Stream,
    pre: &[(usize, Step)],
    splat: &Option<SplatBind>,
    post: &[(usize, Step)],
    cell: &mut EnvCell,
    eval: Option<&dyn UnquoteEval>,
) -> Result<bool, MatchError> {
    // leading fixed elements are pulled one at a time, in declaration
    // order; running out of elements is an ordinary no-match
    for (_, step) in pre {
        let Some(item) = stream.pull() else {
            return Ok(false);
        };
        if !step(&item, cell, eval)? {
            return Ok(false);
        }
    }

    match splat {
        None => {
            // exact-length pattern: one final pull must find the end
            Ok(stream.pull().is_none())
        }
        Some(splat) if splat.open => {
            // hand the rest of the cursor to the binding without
            // draining it
            let view = Value::Stream(stream.resume_from_here());
            Ok(cell
                .env_mut()
                .bind_slot(splat.binder.idx, splat.binder.repeated, &view))
        }
        Some(splat) => {
            // closed splat: a one-pass source exposes no length, so
            // buffer the remainder and split off the trailing fixed part
            let mut rest = Vec::new();
            while let Some(item) = stream.pull() {
                rest.push(item);
            }
            if rest.len() < post.len() {
                return Ok(false);
            }
            let tail = rest.split_off(rest.len() - post.len());
            let captured = Value::List(rest);
            if !cell
                .env_mut()
                .bind_slot(splat.binder.idx, splat.binder.repeated, &captured)
            {
                return Ok(false);
            }
            for ((_, step), item) in post.iter().zip(&tail) {
                if !step(item, cell, eval)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}
