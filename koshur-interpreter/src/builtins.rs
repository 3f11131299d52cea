use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Instant;

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::object::{EvaluationError, Value};

/// Where `wan` and `time` write. Shared so callers can keep a handle to a
/// captured buffer.
pub type Output = Rc<RefCell<dyn Write>>;

pub fn stdout() -> Output {
    Rc::new(RefCell::new(std::io::stdout()))
}

fn output_error(error: std::io::Error) -> EvaluationError {
    EvaluationError::Output(error.to_string().into())
}

fn builtin_wan(output: &Output, args: Vec<Value>) -> Result<Value, EvaluationError> {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    writeln!(output.borrow_mut(), "{}", line).map_err(output_error)?;
    Ok(Value::FALSE)
}

fn builtin_time(
    output: &Output,
    evaluator: &mut Evaluator,
    args: Vec<Value>,
) -> Result<Value, EvaluationError> {
    let function = args.into_iter().next().unwrap_or(Value::FALSE);

    let start = Instant::now();
    let result = evaluator.call(&function, vec![]);
    let elapsed = start.elapsed();

    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "time");
    writeln!(output.borrow_mut(), "time: {}ms", elapsed.as_millis()).map_err(output_error)?;

    result
}

/// Binds `wan` and `time` in `env`.
pub fn install(env: &Environment, output: Output) {
    let wan_output = output.clone();
    env.define(
        "wan".into(),
        Value::native("wan", move |_, args| builtin_wan(&wan_output, args)),
    );
    env.define(
        "time".into(),
        Value::native("time", move |evaluator, args| {
            builtin_time(&output, evaluator, args)
        }),
    );
}
