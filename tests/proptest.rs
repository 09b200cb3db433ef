//! Property-based tests for the compile/evaluate pipeline
//!
//! These cover the properties that hold for every input rather than a hand-picked
//! table: literal round-trips, operator precedence, reflexive comparison, and that
//! arbitrary keystroke sequences never panic.

mod test_helpers;

use proptest::prelude::*;
use shader_expr::compare::{equivalent, equivalent_with};
use shader_expr::{EvalContext, EvalOptions, Evaluator, compile, evaluate};

use test_helpers::context;

/// Well-formed numeric literals: `digits` or `digits.digits`
fn literal_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,8}(\\.[0-9]{1,6})?".prop_map(|s| s.to_string())
}

/// Text a user might type into the expression box, including junk
fn keystroke_strategy() -> impl Strategy<Value = String> {
    "[0-9a-z_+*/^(), .$-]{0,24}".prop_map(|s| s.to_string())
}

/// Small sample sets for the variable `x`
fn samples_strategy() -> impl Strategy<Value = Vec<EvalContext>> {
    prop::collection::vec(-100.0..100.0f64, 0..8)
        .prop_map(|xs| xs.into_iter().map(|x| context(&[("x", x)])).collect())
}

/// A few expressions over `x`, some of which produce non-finite values
fn shader_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("x"),
        Just("x * x + 2 * x + 1"),
        Just("1 / x"),
        Just("sqrt(x) / 0 * 0"),
        Just("smoothstep(-10, 10, x) * sin(x)"),
        Just("mod(x, 3) - fract(x)"),
        Just("-x^2"),
    ]
}

proptest! {
    /// A literal evaluates to exactly the value Rust parses from the same text
    #[test]
    fn prop_literal_round_trip(text in literal_strategy()) {
        let expected: f64 = text.parse().unwrap();
        let expr = compile(&text).unwrap();
        prop_assert_eq!(evaluate(&expr, &()).unwrap(), expected);

        let negated = compile(&format!("-{}", text)).unwrap();
        prop_assert_eq!(evaluate(&negated, &()).unwrap(), -expected);
    }

    /// `*` binds tighter than `+` and `-` associates to the left
    #[test]
    fn prop_precedence_and_associativity(
        a in 0u32..1000,
        b in 0u32..1000,
        c in 0u32..1000,
    ) {
        let (fa, fb, fc) = (a as f64, b as f64, c as f64);
        let eval = |text: String| evaluate(&compile(&text).unwrap(), &()).unwrap();

        prop_assert_eq!(eval(format!("{} + {} * {}", a, b, c)), fa + fb * fc);
        prop_assert_eq!(eval(format!("{} - {} - {}", a, b, c)), (fa - fb) - fc);
        prop_assert_eq!(eval(format!("({} + {}) * {}", a, b, c)), (fa + fb) * fc);
    }

    /// Any text either fails to compile or compiles to a stack-safe program, and
    /// evaluating it never panics
    #[test]
    fn prop_arbitrary_input_never_panics(text in keystroke_strategy(), x in -10.0..10.0f64) {
        if let Ok(expr) = compile(&text) {
            prop_assert!(expr.validate().is_ok());
            let mut engine = Evaluator::new();
            let _ = engine.evaluate(&expr, &[("x", x)]);
            let _ = engine.evaluate_or(&expr, &[("x", x)], 0.0);
        }
    }

    /// A reused evaluator gives the same answer as a fresh one
    #[test]
    fn prop_evaluator_reuse_is_stateless(
        shader in shader_strategy(),
        xs in prop::collection::vec(-50.0..50.0f64, 1..16),
    ) {
        let expr = compile(shader).unwrap();
        let mut engine = Evaluator::new();
        for x in xs {
            let reused = engine.evaluate(&expr, &[("x", x)]).unwrap();
            let fresh = evaluate(&expr, &[("x", x)]).unwrap();
            prop_assert!(reused == fresh || (reused.is_nan() && fresh.is_nan()));
        }
    }

    /// Every expression is equivalent to itself at zero tolerance
    #[test]
    fn prop_comparison_is_reflexive(shader in shader_strategy(), samples in samples_strategy()) {
        let expr = compile(shader).unwrap();
        let result = equivalent(&expr, &expr, &samples, 0.0);
        prop_assert!(result.passed);
        prop_assert_eq!(result.max_deviation, 0.0);
    }

    /// Reflexivity also holds for whatever compiles from arbitrary text, including
    /// programs that fail at evaluation, in both unbound-variable modes
    #[test]
    fn prop_comparison_is_reflexive_for_any_program(
        text in keystroke_strategy(),
        samples in samples_strategy(),
    ) {
        if let Ok(expr) = compile(&text) {
            prop_assert!(equivalent(&expr, &expr, &samples, 0.0).passed);
            let strict = equivalent_with(EvalOptions::strict(), &expr, &expr, &samples, 0.0);
            prop_assert!(strict.passed);
        }
    }
}
