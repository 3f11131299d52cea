use gc::Gc;
use koshur_core::ast::{BinaryOperator, Node};
use koshur_core::stack::ensure_sufficient_stack;

use crate::environment::Environment;
use crate::object::{Closure, EvaluationError, Value};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested closure and native calls allowed before evaluation fails with
    /// `CallDepthExceeded`.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Default)]
pub struct Evaluator {
    config: EvalConfig,
    depth: usize,
}

/// Evaluates `node` with a default-configured [`Evaluator`].
pub fn evaluate(node: &Node, environment: &Environment) -> Result<Value, EvaluationError> {
    Evaluator::new().evaluate(node, environment)
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self { config, depth: 0 }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn evaluate(
        &mut self,
        node: &Node,
        environment: &Environment,
    ) -> Result<Value, EvaluationError> {
        ensure_sufficient_stack(|| self.eval_node(node, environment))
    }

    fn eval_node(
        &mut self,
        node: &Node,
        environment: &Environment,
    ) -> Result<Value, EvaluationError> {
        match node {
            Node::Number { value } => Ok(Value::Number(*value)),
            Node::String { value } => Ok(Value::String(value.clone())),
            Node::Boolean { value } => Ok(Value::Boolean(*value)),
            Node::Variable { value } => environment
                .get(value)
                .ok_or_else(|| EvaluationError::UndefinedVariable(value.clone())),
            Node::Assignment { left, right } => {
                let Node::Variable { value: name } = &**left else {
                    return Err(EvaluationError::InvalidAssignmentTarget(left.to_string()));
                };
                let value = self.evaluate(right, environment)?;
                environment.set(name.clone(), value)
            }
            Node::Binary {
                operator,
                left,
                right,
            } => self.eval_binary(*operator, left, right, environment),
            Node::Condition {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.evaluate(condition, environment)?;
                if !condition.is_false() {
                    self.evaluate(then, environment)
                } else if let Some(otherwise) = otherwise {
                    self.evaluate(otherwise, environment)
                } else {
                    Ok(Value::FALSE)
                }
            }
            Node::Program { program } => {
                let mut result = Value::FALSE;
                for expression in program {
                    result = self.evaluate(expression, environment)?;
                }
                Ok(result)
            }
            Node::Lambda(lambda) => Ok(Value::Closure(Gc::new(Closure {
                lambda: lambda.clone(),
                env: environment.clone(),
            }))),
            Node::Call { callee, arguments } => {
                let function = self.evaluate(callee, environment)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument, environment))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&function, arguments)
            }
        }
    }

    /// Invokes a closure or native function with already evaluated arguments.
    pub fn call(
        &mut self,
        function: &Value,
        arguments: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        if !function.is_callable() {
            return Err(EvaluationError::NotCallable(function.clone()));
        }
        if self.depth >= self.config.max_call_depth {
            return Err(EvaluationError::CallDepthExceeded(self.config.max_call_depth));
        }

        self.depth += 1;
        let result = match function {
            Value::Closure(closure) => self.apply_closure(closure, arguments),
            Value::Native(native) => {
                tracing::debug!(name = %native.name, depth = self.depth, "calling native function");
                (native.func)(self, arguments)
            }
            _ => Err(EvaluationError::NotCallable(function.clone())),
        };
        self.depth -= 1;

        result
    }

    /// Parameters without a matching argument are bound to `apuz`; surplus
    /// arguments are dropped.
    fn apply_closure(
        &mut self,
        closure: &Closure,
        arguments: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        tracing::debug!(
            params = closure.lambda.params.len(),
            arguments = arguments.len(),
            depth = self.depth,
            "calling closure"
        );

        let scope = Environment::new_enclosed(&closure.env);
        let mut arguments = arguments.into_iter();
        for param in &closure.lambda.params {
            scope.define(param.clone(), arguments.next().unwrap_or(Value::FALSE));
        }

        self.evaluate(&closure.lambda.body, &scope)
    }

    fn eval_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Node,
        right: &Node,
        environment: &Environment,
    ) -> Result<Value, EvaluationError> {
        let left = self.evaluate(left, environment)?;

        match operator {
            BinaryOperator::And if left.is_false() => return Ok(Value::FALSE),
            BinaryOperator::And => return self.evaluate(right, environment),
            BinaryOperator::Or if !left.is_false() => return Ok(left),
            BinaryOperator::Or => return self.evaluate(right, environment),
            _ => {}
        }

        let right = self.evaluate(right, environment)?;
        apply_operator(operator, &left, &right)
    }
}

fn number(operator: BinaryOperator, value: &Value) -> Result<f64, EvaluationError> {
    match value {
        Value::Number(value) => Ok(*value),
        _ => Err(EvaluationError::TypeMismatch {
            operator,
            value: value.clone(),
        }),
    }
}

fn divisor(operator: BinaryOperator, value: &Value) -> Result<f64, EvaluationError> {
    let value = number(operator, value)?;
    if value == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    Ok(value)
}

fn apply_operator(
    operator: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, EvaluationError> {
    use BinaryOperator::*;

    let arithmetic = |f: fn(f64, f64) -> f64| -> Result<Value, EvaluationError> {
        Ok(Value::Number(f(number(operator, left)?, number(operator, right)?)))
    };
    let comparison = |f: fn(&f64, &f64) -> bool| -> Result<Value, EvaluationError> {
        Ok(Value::Boolean(f(&number(operator, left)?, &number(operator, right)?)))
    };

    match operator {
        Plus => arithmetic(|a, b| a + b),
        Minus => arithmetic(|a, b| a - b),
        Multiply => arithmetic(|a, b| a * b),
        Divide => Ok(Value::Number(number(operator, left)? / divisor(operator, right)?)),
        Modulo => Ok(Value::Number(number(operator, left)? % divisor(operator, right)?)),
        LessThan => comparison(f64::lt),
        GreaterThan => comparison(f64::gt),
        LessEqual => comparison(f64::le),
        GreaterEqual => comparison(f64::ge),
        Equal => Ok(Value::Boolean(left == right)),
        NotEqual => Ok(Value::Boolean(left != right)),
        // short-circuited by the caller
        And => Ok(if left.is_false() { Value::FALSE } else { right.clone() }),
        Or => Ok(if left.is_false() { right.clone() } else { left.clone() }),
    }
}
