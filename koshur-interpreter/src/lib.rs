pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod object;

use koshur_core::lexer::{tokenize, LexError};
use koshur_core::parser::{parse, ParseError};
use thiserror::Error;

pub use environment::Environment;
pub use evaluator::{EvalConfig, Evaluator};
pub use object::{EvaluationError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Evaluation(#[from] EvaluationError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(ParseError::Lex(_)) => ErrorKind::Lexical,
            Error::Parse(_) => ErrorKind::Syntax,
            Error::Evaluation(_) => ErrorKind::Runtime,
        }
    }
}

impl From<LexError> for Error {
    fn from(error: LexError) -> Self {
        Error::Parse(ParseError::Lex(error))
    }
}

/// Tokenizes, parses and evaluates `source` in `env`.
pub fn run(source: &str, env: &Environment) -> Result<Value, Error> {
    run_with(&mut Evaluator::new(), source, env)
}

pub fn run_with(
    evaluator: &mut Evaluator,
    source: &str,
    env: &Environment,
) -> Result<Value, Error> {
    let program = parse(tokenize(source))?;
    Ok(evaluator.evaluate(&program, env)?)
}
