//! The compiled expression artifact.
//!
//! A [`CompiledExpression`] is an immutable RPN program. It keeps no reference to the
//! source text, is `Send + Sync`, and can be evaluated any number of times, from any
//! number of threads, each with its own bindings.

use crate::engine::stack_depth;
use crate::error::ParseError;
use crate::types::RpnItem;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable, reusable RPN program produced by [`compile`](crate::compile).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompiledExpression {
    items: Vec<RpnItem>,
}

impl CompiledExpression {
    pub(crate) fn from_parsed(items: Vec<RpnItem>) -> Self {
        Self { items }
    }

    /// Build a program directly from RPN items, without any checks.
    ///
    /// `compile` rejects unknown calls and missing operands up front; a hand-built
    /// program gets those checks from the evaluator instead and may fail with
    /// [`EvalError::UnknownFunction`](crate::EvalError::UnknownFunction) or
    /// [`EvalError::StackUnderflow`](crate::EvalError::StackUnderflow).
    pub fn from_items(items: Vec<RpnItem>) -> Self {
        Self { items }
    }

    /// Check the program for operand underflow without evaluating it.
    ///
    /// Returns the number of values left on the stack, which is 1 for a complete
    /// expression.
    pub fn validate(&self) -> Result<usize, ParseError> {
        stack_depth(&self.items)
    }

    pub fn items(&self) -> &[RpnItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct variable names the program reads, in first-use order.
    ///
    /// The reserved constants `pi` and `e` are not included.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for item in &self.items {
            if let RpnItem::Variable(name) = item {
                let name = name.as_str();
                if !is_reserved(name) && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Whether the program reads `name` (reserved constants excluded).
    pub fn references(&self, name: &str) -> bool {
        !is_reserved(name)
            && self
                .items
                .iter()
                .any(|item| matches!(item, RpnItem::Variable(v) if v.as_str() == name))
    }
}

pub(crate) fn is_reserved(name: &str) -> bool {
    matches!(name, "pi" | "e")
}

/// Space-separated RPN listing, e.g. `2 3 4 * +`.
impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CompiledExpression {
    type Item = &'a RpnItem;
    type IntoIter = core::slice::Iter<'a, RpnItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
