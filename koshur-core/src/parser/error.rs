use std::fmt::Display;

use thiserror::Error;

use crate::lexer::{Keyword, LexError, Token};
use crate::position::Position;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("Expecting {expected}, found {found}")]
    UnexpectedToken { expected: Expected, found: Token },
    #[error("Expecting {expected}, found end of input ({position})")]
    PrematureEndOfInput {
        expected: Expected,
        position: Position,
    },
    #[error(transparent)]
    Lex(#[from] LexError),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Expected {
    Punctuation(char),
    Keyword(Keyword),
    Identifier,
    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Punctuation(ch) => write!(f, "punctuation \"{}\"", ch),
            Expected::Keyword(kw) => write!(f, "keyword \"{}\"", kw.as_str()),
            Expected::Identifier => write!(f, "variable name"),
            Expected::Expression => write!(f, "expression"),
        }
    }
}

impl ParseError {
    pub fn unexpected(expected: Expected, got: Option<Token>, position: Position) -> Self {
        match got {
            Some(found) => ParseError::UnexpectedToken { expected, found },
            None => ParseError::PrematureEndOfInput { expected, position },
        }
    }

    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { found, .. } => found.position,
            ParseError::PrematureEndOfInput { position, .. } => *position,
            ParseError::Lex(error) => error.position,
        }
    }
}
