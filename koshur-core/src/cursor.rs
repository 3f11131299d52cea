//! Character cursor over the source text.
//!
//! Tracks the line and column of the next character so that every lexical
//! error can point back at where it happened.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::position::Position;

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LexErrorKind {
    #[error("Can't handle character: {0:?}")]
    UnexpectedCharacter(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{kind} ({position})")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

#[derive(Clone)]
pub struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: Position::start(),
        }
    }

    /// Consumes the current character. Fails only when the input is exhausted.
    pub fn next(&mut self) -> Result<char, LexError> {
        let Some(ch) = self.chars.next() else {
            return Err(self.error(LexErrorKind::UnexpectedEndOfInput));
        };
        self.advance(ch);
        Ok(ch)
    }

    /// The current character, or `None` once the input is exhausted.
    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consumes characters for as long as `predicate` holds.
    pub fn read_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.chars.next_if(|ch| predicate(*ch)) {
            self.advance(ch);
            text.push(ch);
        }
        text
    }

    fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Builds an error tagged with the current position.
    pub fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\nc");
        assert_eq!(cursor.position(), Position { line: 1, column: 0 });

        assert_eq!(cursor.next(), Ok('a'));
        assert_eq!(cursor.next(), Ok('b'));
        assert_eq!(cursor.position(), Position { line: 1, column: 2 });

        assert_eq!(cursor.next(), Ok('\n'));
        assert_eq!(cursor.position(), Position { line: 2, column: 0 });

        assert_eq!(cursor.peek(), Some('c'));
        assert_eq!(cursor.next(), Ok('c'));
        assert_eq!(cursor.position(), Position { line: 2, column: 1 });
    }

    #[test]
    fn next_fails_only_at_end() {
        let mut cursor = Cursor::new("x");
        assert!(!cursor.at_end());
        assert_eq!(cursor.next(), Ok('x'));
        assert!(cursor.at_end());
        assert_eq!(cursor.peek(), None);
        assert_eq!(
            cursor.next(),
            Err(LexError {
                kind: LexErrorKind::UnexpectedEndOfInput,
                position: Position { line: 1, column: 1 },
            })
        );
    }

    #[test]
    fn read_while_counts_newlines() {
        let mut cursor = Cursor::new("  \n\t x");
        assert_eq!(cursor.read_while(char::is_whitespace), "  \n\t ");
        assert_eq!(cursor.position(), Position { line: 2, column: 2 });
        assert_eq!(cursor.peek(), Some('x'));
    }

    #[test]
    fn error_carries_position() {
        let mut cursor = Cursor::new("a\nbc");
        cursor.read_while(|_| true);
        let error = cursor.error(LexErrorKind::UnexpectedCharacter('$'));
        assert_eq!(error.to_string(), "Can't handle character: '$' (2:2)");
    }
}
