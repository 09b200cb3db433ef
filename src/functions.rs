//! Built-in mathematical functions for expression evaluation.
//!
//! The registry is a constant table mapping a function name to a fixed arity and an
//! implementation taking its arguments as a slice. Every function is total: domain
//! problems produce NaN or infinity (or, for `sqrt`, a clamped input) rather than an
//! error, so a live preview never aborts because of a bad pixel.
//!
//! All functions use the `libm` crate, so results do not depend on whether `std`
//! is linked.

use libm::{ceil, cos, floor, sin, sqrt as libm_sqrt, tan};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A builtin function entry.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Name used in expressions.
    pub name: &'static str,
    /// Number of arguments the function takes.
    pub arity: usize,
    /// Implementation. The slice always holds exactly `arity` values.
    pub function: fn(&[f64]) -> f64,
}

impl Builtin {
    const fn new(name: &'static str, arity: usize, function: fn(&[f64]) -> f64) -> Self {
        Self {
            name,
            arity,
            function,
        }
    }

    /// Call the builtin. The caller checks `args.len() == self.arity`.
    #[inline]
    pub fn call(&self, args: &[f64]) -> f64 {
        (self.function)(args)
    }
}

/// The builtin function registry.
pub static BUILTINS: [Builtin; 16] = [
    Builtin::new("abs", 1, |a| abs(a[0])),
    Builtin::new("min", 2, |a| min(a[0], a[1])),
    Builtin::new("max", 2, |a| max(a[0], a[1])),
    Builtin::new("sin", 1, |a| sin(a[0])),
    Builtin::new("cos", 1, |a| cos(a[0])),
    Builtin::new("tan", 1, |a| tan(a[0])),
    Builtin::new("pow", 2, |a| libm::pow(a[0], a[1])),
    Builtin::new("sqrt", 1, |a| sqrt(a[0])),
    Builtin::new("floor", 1, |a| floor(a[0])),
    Builtin::new("ceil", 1, |a| ceil(a[0])),
    Builtin::new("fract", 1, |a| fract(a[0])),
    Builtin::new("mod", 2, |a| modulo(a[0], a[1])),
    Builtin::new("clamp", 3, |a| clamp(a[0], a[1], a[2])),
    Builtin::new("mix", 3, |a| mix(a[0], a[1], a[2])),
    Builtin::new("step", 2, |a| step(a[0], a[1])),
    Builtin::new("smoothstep", 3, |a| smoothstep(a[0], a[1], a[2])),
];

/// A resolved builtin. The discriminant is the builtin's slot in [`BUILTINS`], so
/// calling through a `Function` never searches by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Function {
    Abs,
    Min,
    Max,
    Sin,
    Cos,
    Tan,
    Pow,
    Sqrt,
    Floor,
    Ceil,
    Fract,
    Mod,
    Clamp,
    Mix,
    Step,
    Smoothstep,
}

impl Function {
    /// Every builtin, in registry order.
    pub const ALL: [Function; 16] = [
        Function::Abs,
        Function::Min,
        Function::Max,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Pow,
        Function::Sqrt,
        Function::Floor,
        Function::Ceil,
        Function::Fract,
        Function::Mod,
        Function::Clamp,
        Function::Mix,
        Function::Step,
        Function::Smoothstep,
    ];

    /// Resolve a name against the registry.
    pub fn from_name(name: &str) -> Option<Function> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    #[inline]
    pub fn builtin(self) -> &'static Builtin {
        &BUILTINS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.builtin().name
    }

    pub fn arity(self) -> usize {
        self.builtin().arity
    }
}

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    Function::from_name(name).map(Function::builtin)
}

pub fn abs(a: f64) -> f64 {
    libm::fabs(a)
}

/// Returns the smaller of `a` and `b`.
pub fn min(a: f64, b: f64) -> f64 {
    if a < b { a } else { b }
}

/// Returns the larger of `a` and `b`.
pub fn max(a: f64, b: f64) -> f64 {
    if a > b { a } else { b }
}

/// Square root with negative inputs clamped to zero.
///
/// NaN stays NaN.
pub fn sqrt(a: f64) -> f64 {
    if a < 0.0 { 0.0 } else { libm_sqrt(a) }
}

/// Fractional part, `x - floor(x)`. Always in `[0, 1)` for finite input.
pub fn fract(a: f64) -> f64 {
    a - floor(a)
}

/// Floored modulo.
///
/// Unlike the IEEE remainder the result takes the sign of the divisor, so
/// `mod(-1, 3)` is `2`.
///
/// # Parameters
///
/// * `a` - Dividend
/// * `b` - Divisor
pub fn modulo(a: f64, b: f64) -> f64 {
    ((a % b) + b) % b
}

/// Restrict `x` to `[lo, hi]`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    min(max(x, lo), hi)
}

/// Linear interpolation, `a + (b - a) * t`.
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// `0` if `x < edge`, else `1`.
pub fn step(edge: f64, x: f64) -> f64 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Hermite interpolation between `0` and `1` as `x` moves from `a` to `b`.
///
/// # Parameters
///
/// * `a` - Lower edge
/// * `b` - Upper edge
/// * `x` - Input value
///
/// # Returns
///
/// `t * t * (3 - 2 * t)` where `t = clamp((x - a) / (b - a), 0, 1)`.
pub fn smoothstep(a: f64, b: f64, x: f64) -> f64 {
    let t = clamp((x - a) / (b - a), 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
