//! Equivalence of two expressions under a tolerance.
//!
//! A user's answer `u` matches a reference `r` over a sample set `S` when
//! `max over s in S of |u(s) - r(s)| <= tolerance`. Non-finite values are compared so
//! that the relation stays reflexive: equal infinities and NaN against NaN deviate by
//! zero, while NaN against a number counts as an infinite deviation. Evaluation
//! errors follow the same rule as NaN: the same error on both sides deviates by zero,
//! an error on one side only (or two different errors) by infinity.

use crate::context::Bindings;
use crate::error::EvalError;
use crate::eval::{EvalOptions, Evaluator};
use crate::expression::CompiledExpression;

/// Outcome of comparing two expressions over a sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Largest deviation seen (0 for an empty sample set).
    pub max_deviation: f64,
    /// Index of the sample with the largest deviation.
    pub worst_sample: Option<usize>,
    /// Whether `max_deviation <= tolerance`.
    pub passed: bool,
    /// First evaluation error on either side, with the sample it came from.
    pub first_error: Option<(usize, EvalError)>,
}

/// Distance between two results.
pub fn deviation(a: f64, b: f64) -> f64 {
    if a == b || (a.is_nan() && b.is_nan()) {
        0.0
    } else {
        let d = libm::fabs(a - b);
        if d.is_nan() { f64::INFINITY } else { d }
    }
}

/// Distance between two evaluation outcomes.
pub fn outcome_deviation(a: &Result<f64, EvalError>, b: &Result<f64, EvalError>) -> f64 {
    match (a, b) {
        (Ok(a), Ok(b)) => deviation(*a, *b),
        (Err(a), Err(b)) if a == b => 0.0,
        _ => f64::INFINITY,
    }
}

/// Compare `user` against `reference` at every sample, with default options.
///
/// # Examples
///
/// ```
/// use shader_expr::compile;
/// use shader_expr::compare::equivalent;
///
/// let user = compile("x*x - 1").unwrap();
/// let reference = compile("(x - 1) * (x + 1)").unwrap();
/// let samples = [[("x", -2.0)], [("x", 0.5)], [("x", 3.0)]];
///
/// assert!(equivalent(&user, &reference, &samples, 1e-9).passed);
///
/// // An answer that cannot be evaluated never matches a reference that can
/// let broken = compile("x x").unwrap();
/// let result = equivalent(&broken, &reference, &samples, 1e-9);
/// assert!(!result.passed);
/// assert!(result.first_error.is_some());
/// ```
pub fn equivalent<'s, B, I>(
    user: &CompiledExpression,
    reference: &CompiledExpression,
    samples: I,
    tolerance: f64,
) -> Comparison
where
    B: Bindings + 's,
    I: IntoIterator<Item = &'s B>,
{
    equivalent_with(EvalOptions::default(), user, reference, samples, tolerance)
}

/// [`equivalent`] with explicit evaluation options, e.g. [`EvalOptions::strict`].
pub fn equivalent_with<'s, B, I>(
    options: EvalOptions,
    user: &CompiledExpression,
    reference: &CompiledExpression,
    samples: I,
    tolerance: f64,
) -> Comparison
where
    B: Bindings + 's,
    I: IntoIterator<Item = &'s B>,
{
    let mut engine = Evaluator::with_options(options);
    let mut max_deviation = 0.0;
    let mut worst_sample = None;
    let mut first_error = None;

    for (i, sample) in samples.into_iter().enumerate() {
        let u = engine.evaluate(user, sample);
        let r = engine.evaluate(reference, sample);
        let d = outcome_deviation(&u, &r);

        if first_error.is_none() {
            if let Some(err) = u.err().or(r.err()) {
                first_error = Some((i, err));
            }
        }
        if worst_sample.is_none() || d > max_deviation {
            max_deviation = d;
            worst_sample = Some(i);
        }
    }

    let passed = max_deviation <= tolerance;
    log::debug!(
        "comparison: max deviation {} at sample {:?}, tolerance {}, passed {}",
        max_deviation,
        worst_sample,
        tolerance,
        passed
    );
    Comparison {
        max_deviation,
        worst_sample,
        passed,
        first_error,
    }
}
