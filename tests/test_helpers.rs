use shader_expr::{CompiledExpression, EvalContext, compile, evaluate};

/// Compile an expression, panicking with the error message on failure
#[allow(dead_code)]
pub fn compiled(text: &str) -> CompiledExpression {
    compile(text).unwrap_or_else(|e| panic!("failed to compile {:?}: {}", text, e))
}

/// Compile and evaluate with no bindings
#[allow(dead_code)]
pub fn eval_str(text: &str) -> f64 {
    evaluate(&compiled(text), &()).unwrap_or_else(|e| panic!("failed to evaluate {:?}: {}", text, e))
}

/// Build a context from name/value pairs
#[allow(dead_code)]
pub fn context(pairs: &[(&str, f64)]) -> EvalContext {
    let mut ctx = EvalContext::new();
    for (name, value) in pairs {
        ctx.set(name, *value).expect("context capacity");
    }
    ctx
}

/// Shader bindings for pixel (x, y) of a width x height frame at `time`
#[allow(dead_code)]
pub fn pixel(x: usize, y: usize, width: usize, height: usize, time: f64) -> [(&'static str, f64); 3] {
    [
        ("uvx", x as f64 / width as f64),
        ("uvy", y as f64 / height as f64),
        ("time", time),
    ]
}
