use std::fmt::Display;
use std::rc::Rc;

use gc::{Finalize, Gc, Trace};
use koshur_core::ast::{BinaryOperator, Lambda};
use thiserror::Error;

use crate::environment::Environment;
use crate::evaluator::Evaluator;

#[derive(Debug, Clone, Trace, Finalize)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    Boolean(bool),
    Closure(Gc<Closure>),
    Native(#[unsafe_ignore_trace] Rc<NativeFunction>),
}

impl Value {
    pub const FALSE: Value = Value::Boolean(false);

    pub fn string(value: &str) -> Value {
        Value::String(value.into())
    }

    pub fn native(
        name: &str,
        func: impl Fn(&mut Evaluator, Vec<Value>) -> Result<Value, EvaluationError> + 'static,
    ) -> Value {
        Value::Native(Rc::new(NativeFunction {
            name: name.into(),
            func: Box::new(func),
        }))
    }

    /// Only the boolean `apuz` is falsy; `0` and `""` are not.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Boolean(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Native(_))
    }
}

/// Strict equality: no coercion between kinds, functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Closure(left), Value::Closure(right)) => Gc::ptr_eq(left, right),
            (Value::Native(left), Value::Native(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", format_number(*value)),
            Value::String(value) => write!(f, "{}", value),
            Value::Boolean(true) => write!(f, "poz"),
            Value::Boolean(false) => write!(f, "apuz"),
            Value::Closure(closure) => write!(f, "banav({})", closure.lambda.params.join(", ")),
            Value::Native(native) => write!(f, "[native {}]", native.name),
        }
    }
}

/// `Infinity` and `NaN` are spelled out; magnitudes outside `[1e-6, 1e21)`
/// use exponent notation with an explicit sign, as in `1e+21`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }

    format!("{}", value)
}

/// A lambda together with the environment it was evaluated in.
#[derive(Trace, Finalize)]
pub struct Closure {
    #[unsafe_ignore_trace]
    pub lambda: Rc<Lambda>,
    pub env: Environment,
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.lambda.params)
            .field("ptr", &(self as *const Closure as usize))
            .finish()
    }
}

pub type NativeFn = dyn Fn(&mut Evaluator, Vec<Value>) -> Result<Value, EvaluationError>;

/// A host function bound in an environment like any other value. Natives
/// are not traced, so they must not capture Koshur values.
pub struct NativeFunction {
    pub name: Rc<str>,
    pub func: Box<NativeFn>,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("Undefined variable {0}")]
    UndefinedVariable(Rc<str>),
    #[error("Cannot assign to {0}")]
    InvalidAssignmentTarget(String),
    #[error("Expected number but got {value} as operand of {operator}")]
    TypeMismatch {
        operator: BinaryOperator,
        value: Value,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("{0} is not a function")]
    NotCallable(Value),
    #[error("Maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
    #[error("Could not write output: {0}")]
    Output(Rc<str>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        let tests = vec![
            (3.0, "3"),
            (3.5, "3.5"),
            (-0.25, "-0.25"),
            (-0.0, "0"),
            (123456789.0, "123456789"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (-2.5e22, "-2.5e+22"),
            (0.000001, "0.000001"),
            (1.5e-7, "1.5e-7"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
            (f64::NAN, "NaN"),
        ];

        for (value, expected) in tests {
            assert_eq!(Value::Number(value).to_string(), expected, "value: {:?}", value);
        }
    }

    #[test]
    fn test_equality_is_strict() {
        let native = Value::native("n", |_, _| Ok(Value::FALSE));
        let tests = vec![
            (Value::Number(1.0), Value::Number(1.0), true),
            (Value::Number(1.0), Value::string("1"), false),
            (Value::string(""), Value::FALSE, false),
            (Value::Number(0.0), Value::FALSE, false),
            (native.clone(), native.clone(), true),
            (native, Value::native("n", |_, _| Ok(Value::FALSE)), false),
        ];

        for (left, right, equal) in tests {
            assert_eq!(left == right, equal, "{:?} == {:?}", left, right);
        }
    }
}
