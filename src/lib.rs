#![no_std]
#![doc = r#"
# shader-expr

A safe arithmetic expression engine: compile user-typed math once, evaluate it many
times against changing variable bindings.

## Overview

Text goes through three stages:

- the **lexer** turns it into tokens (numbers, identifiers, `+ - * / ^`, parentheses,
  commas),
- the **shunting-yard compiler** turns the tokens into a flat postfix (RPN) program,
  resolving every function call against a fixed builtin registry,
- the **evaluator** runs that program on a small operand stack.

Nothing is ever handed to a dynamic evaluator. The compiled program is immutable,
`Send + Sync`, and cheap to evaluate, which makes it suitable for a per-pixel shader
preview running thousands of evaluations per frame.

## Quick Start

```rust
use shader_expr::{compile, evaluate, EvalContext};

let expr = compile("2 + 3 * 4").unwrap();
assert_eq!(evaluate(&expr, &()).unwrap(), 14.0);

let mut ctx = EvalContext::new();
ctx.set("x", 1.5).unwrap();
let clamp = compile("clamp(x, 0, 1)").unwrap();
assert_eq!(evaluate(&clamp, &ctx).unwrap(), 1.0);
```

## Per-pixel evaluation

Keep one [`Evaluator`] per worker; it reuses its stack between calls.

```rust
use shader_expr::{compile, Evaluator};

let shader = compile("smoothstep(0, 1, uvx) * fract(time)").unwrap();
let mut engine = Evaluator::new();
let (width, height) = (4, 3);

let mut frame = Vec::with_capacity(width * height);
for y in 0..height {
    for x in 0..width {
        let vars = [
            ("uvx", x as f64 / width as f64),
            ("uvy", y as f64 / height as f64),
            ("time", 0.5),
        ];
        frame.push(engine.evaluate_or(&shader, &vars, 0.0));
    }
}
assert_eq!(frame.len(), 12);
```

## Error Handling

Compile errors ([`CompileError`]) come from the lexer or the compiler and produce no
program. Evaluation errors ([`EvalError`]) only affect the call that raised them.

```rust
use shader_expr::{compile, evaluate, CompileError, EvalError, LexError, ParseError};

assert_eq!(compile("(1+2").unwrap_err(), CompileError::Parse(ParseError::MismatchedParens));
assert_eq!(
    compile("1 $ 2").unwrap_err(),
    CompileError::Lex(LexError::UnexpectedCharacter { found: '$', position: 2 })
);

// Two values and no operator between them
let expr = compile("1 2").unwrap();
assert_eq!(evaluate(&expr, &()), Err(EvalError::InvalidExpression { remaining: 2 }));

// Division by zero is not an error
let expr = compile("1 / 0").unwrap();
assert!(evaluate(&expr, &()).unwrap().is_infinite());
```

## Supported Grammar

| Precedence | Operators     | Associativity |
|------------|---------------|---------------|
| 5          | unary `-`     | Right         |
| 4          | `^`           | Right         |
| 3          | `*` `/`       | Left          |
| 2          | `+` `-`       | Left          |

Unary minus binds tighter than `^`: `-2^2` is `(-2)^2 = 4`.

Numbers are `digits` or `digits.digits`; there is no exponent notation and no
leading dot. Identifiers are `[A-Za-z_][A-Za-z0-9_]*`.

### Built-in Functions

`abs`, `min`, `max`, `sin`, `cos`, `tan`, `pow`, `sqrt` (negative input reads as 0),
`floor`, `ceil`, `fract`, `mod` (floored, `mod(-1, 3) = 2`), `clamp(x, lo, hi)`,
`mix(a, b, t)`, `step(edge, x)`, `smoothstep(a, b, x)`.

### Built-in Constants

- `pi`: 3.14159... (π)
- `e`: 2.71828... (Euler's number)

These always win over bindings of the same name. Any other unbound variable reads as
`0.0` unless the evaluator runs with [`EvalOptions::strict`].

## Feature Flags

- `std` (default): `std::error::Error` impls and [`Bindings`] for `HashMap`.
- `serde`: `Serialize`/`Deserialize` for compiled programs.
"#]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod compare;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expression;
pub mod functions;
pub mod lexer;
pub mod types;

pub use context::{Bindings, EvalContext};
pub use engine::compile;
pub use error::{CompileError, EvalError, LexError, ParseError};
pub use eval::{EvalOptions, Evaluator, UnboundPolicy, evaluate};
pub use expression::CompiledExpression;

pub mod constants {
    pub const PI: f64 = core::f64::consts::PI;
    pub const E: f64 = core::f64::consts::E;
    pub const TEST_PRECISION: f64 = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
#[macro_export]
macro_rules! assert_approx_eq {
    // Case 1: assert_approx_eq!(left, right) -> use default epsilon
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    // Case 2: assert_approx_eq!(left, right, epsilon) -> use specified epsilon
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let eps: f64 = $epsilon;
        $crate::assert_approx_eq!(
            left_val,
            right_val,
            eps,
            "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
            left_val,
            right_val,
            eps
        )
    }};
    // Case 3: assert_approx_eq!(left, right, epsilon, "format message with args", args...)
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let eps: f64 = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.is_sign_positive() == right_val.is_sign_positive()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $($arg)+);
        }
    }};
}
