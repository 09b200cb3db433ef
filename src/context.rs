//! Variable bindings supplied to the evaluator.
//!
//! The evaluator reads variables through the [`Bindings`] trait, so callers can pass
//! whatever map they already have. [`EvalContext`] is the fixed-capacity map provided
//! by this crate; it never allocates, which suits per-pixel loops.

use crate::error::EvalError;
use crate::types::{HString, MAX_BINDINGS, TryIntoHeaplessString};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{Hash, Hasher};
use heapless::FnvIndexMap;

/// Source of variable values for one evaluation.
pub trait Bindings {
    /// The value bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<f64>;
}

/// Evaluation context for expressions.
///
/// Holds up to [`MAX_BINDINGS`] name/value pairs.
///
/// # Examples
///
/// ```
/// use shader_expr::{compile, evaluate, EvalContext};
///
/// let expr = compile("uvx * uvy + time").unwrap();
///
/// let mut ctx = EvalContext::new();
/// ctx.set("uvx", 0.5).unwrap();
/// ctx.set("uvy", 0.25).unwrap();
/// ctx.set("time", 1.0).unwrap();
///
/// assert_eq!(evaluate(&expr, &ctx).unwrap(), 1.125);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    variables: FnvIndexMap<Key, f64, MAX_BINDINGS>,
}

/// Map key that hashes and compares as `str`, so lookups take a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Key(HString);

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_str().hash(state)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl EvalContext {
    /// Creates a new empty evaluation context.
    pub fn new() -> Self {
        Self {
            variables: FnvIndexMap::new(),
        }
    }

    /// Sets a variable, returning the previous value if it existed.
    pub fn set(&mut self, name: &str, value: f64) -> Result<Option<f64>, EvalError> {
        let key = name
            .try_into_heapless()
            .ok_or(EvalError::CapacityExceeded("variable name"))?;
        self.variables
            .insert(Key(key), value)
            .map_err(|_| EvalError::CapacityExceeded("variables"))
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, value: f64) -> Result<Self, EvalError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.variables.remove(name)
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables.iter().map(|(k, v)| (k.0.as_str(), *v))
    }
}

impl Bindings for EvalContext {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}

impl<B: Bindings + ?Sized> Bindings for &B {
    fn lookup(&self, name: &str) -> Option<f64> {
        (**self).lookup(name)
    }
}

/// Linear lookup over `(name, value)` pairs; the last pair for a name wins.
impl Bindings for [(&str, f64)] {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.iter().rev().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> Bindings for [(&str, f64); N] {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.as_slice().lookup(name)
    }
}

impl Bindings for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

#[cfg(feature = "std")]
impl<S: core::hash::BuildHasher> Bindings for std::collections::HashMap<String, f64, S> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Bindings with no variables.
impl Bindings for () {
    fn lookup(&self, _name: &str) -> Option<f64> {
        None
    }
}
