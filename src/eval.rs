//! RPN stack machine.
//!
//! [`Evaluator`] owns its operand stack and reuses it between calls, so a hot loop
//! (one evaluation per pixel per frame) allocates nothing once the stack has grown to
//! the program's depth. [`evaluate`] is a one-shot wrapper.

use crate::constants::{E, PI};
use crate::context::Bindings;
use crate::error::EvalError;
use crate::expression::CompiledExpression;
use crate::functions::{self, Builtin};
use crate::types::{HString, RpnItem};
use alloc::vec::Vec;

/// Initial capacity of the operand stack (tuned for typical expressions)
const INITIAL_STACK_CAPACITY: usize = 16;

/// What to do when a variable has no binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnboundPolicy {
    /// Read unbound variables as `0.0`. Keeps a live preview running while the user is
    /// still typing a variable name.
    #[default]
    Zero,
    /// Fail with [`EvalError::UnboundVariable`]. Useful when grading, where a silent
    /// zero could hide a typo.
    Error,
}

/// Run-time evaluation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalOptions {
    pub unbound: UnboundPolicy,
}

impl EvalOptions {
    /// Options that reject unbound variables.
    pub fn strict() -> Self {
        Self {
            unbound: UnboundPolicy::Error,
        }
    }
}

/// Reusable evaluation engine to avoid allocations
#[derive(Debug, Clone)]
pub struct Evaluator {
    stack: Vec<f64>,
    options: EvalOptions,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Self {
            stack: Vec::with_capacity(INITIAL_STACK_CAPACITY),
            options,
        }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// Evaluate a compiled program against a set of bindings.
    ///
    /// An error leaves the evaluator ready for the next call.
    pub fn evaluate<B>(&mut self, expr: &CompiledExpression, vars: &B) -> Result<f64, EvalError>
    where
        B: Bindings + ?Sized,
    {
        self.stack.clear();
        for item in expr.items() {
            match item {
                RpnItem::Literal(value) => self.stack.push(*value),
                RpnItem::Variable(name) => {
                    let value = self.resolve(name, vars)?;
                    self.stack.push(value);
                }
                RpnItem::UnaryOp(op) => {
                    let operand = self.pop()?;
                    self.stack.push(op.apply(operand));
                }
                RpnItem::BinaryOp(op) => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    self.stack.push(op.apply(left, right));
                }
                RpnItem::Call { name, argc } => self.call(name, *argc)?,
                RpnItem::Apply(function) => self.apply(function.builtin())?,
            }
        }

        match self.stack.as_slice() {
            [value] => Ok(*value),
            other => Err(EvalError::InvalidExpression {
                remaining: other.len(),
            }),
        }
    }

    /// Evaluate, substituting `default` for any error.
    ///
    /// This is the per-pixel policy: a failed pixel is drawn with a neutral value
    /// instead of aborting the frame.
    pub fn evaluate_or<B>(&mut self, expr: &CompiledExpression, vars: &B, default: f64) -> f64
    where
        B: Bindings + ?Sized,
    {
        self.evaluate(expr, vars).unwrap_or(default)
    }

    fn resolve<B>(&self, name: &HString, vars: &B) -> Result<f64, EvalError>
    where
        B: Bindings + ?Sized,
    {
        match name.as_str() {
            "pi" => Ok(PI),
            "e" => Ok(E),
            other => match (vars.lookup(other), self.options.unbound) {
                (Some(value), _) => Ok(value),
                (None, UnboundPolicy::Zero) => Ok(0.0),
                (None, UnboundPolicy::Error) => Err(EvalError::UnboundVariable {
                    name: name.clone(),
                }),
            },
        }
    }

    #[inline]
    fn pop(&mut self) -> Result<f64, EvalError> {
        self.stack.pop().ok_or(EvalError::StackUnderflow)
    }

    /// Resolve a builtin by name, then apply it to the top `argc` operands.
    fn call(&mut self, name: &HString, argc: usize) -> Result<(), EvalError> {
        let builtin = functions::lookup(name).ok_or_else(|| EvalError::UnknownFunction {
            name: name.clone(),
        })?;
        if self.stack.len() < argc {
            return Err(EvalError::StackUnderflow);
        }
        if builtin.arity != argc {
            return Err(EvalError::ArityMismatch {
                name: name.clone(),
                expected: builtin.arity,
                found: argc,
            });
        }
        self.apply(builtin)
    }

    /// Apply a builtin to the top `arity` operands, first argument deepest.
    #[inline]
    fn apply(&mut self, builtin: &Builtin) -> Result<(), EvalError> {
        let base = self
            .stack
            .len()
            .checked_sub(builtin.arity)
            .ok_or(EvalError::StackUnderflow)?;
        let result = builtin.call(&self.stack[base..]);
        self.stack.truncate(base);
        self.stack.push(result);
        Ok(())
    }
}

/// Evaluate a compiled expression once.
///
/// Unbound variables read as `0.0`. For repeated evaluation keep an [`Evaluator`]
/// around instead.
///
/// # Examples
///
/// ```
/// use shader_expr::{compile, evaluate};
///
/// let expr = compile("clamp(x, 0, 1)").unwrap();
/// assert_eq!(evaluate(&expr, &[("x", 1.5)]).unwrap(), 1.0);
/// assert_eq!(evaluate(&expr, &[("x", -0.5)]).unwrap(), 0.0);
/// ```
pub fn evaluate<B>(expr: &CompiledExpression, vars: &B) -> Result<f64, EvalError>
where
    B: Bindings + ?Sized,
{
    Evaluator::new().evaluate(expr, vars)
}
