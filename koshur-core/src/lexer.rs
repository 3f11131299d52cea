use std::fmt::Display;
use std::iter::FusedIterator;
use std::rc::Rc;

pub use crate::cursor::{LexError, LexErrorKind};
use crate::cursor::Cursor;
use crate::position::Position;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    If,
    Then,
    Else,
    Function,
    Lambda,
    True,
    False,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "yeli",
            Keyword::Then => "teli",
            Keyword::Else => "nate",
            Keyword::Function => "banav",
            Keyword::Lambda => "λ",
            Keyword::True => "poz",
            Keyword::False => "apuz",
        }
    }
}

fn keywords(ident: &str) -> Option<Keyword> {
    match ident {
        "yeli" => Some(Keyword::If),
        "teli" => Some(Keyword::Then),
        "nate" => Some(Keyword::Else),
        "banav" => Some(Keyword::Function),
        "λ" => Some(Keyword::Lambda),
        "poz" => Some(Keyword::True),
        "apuz" => Some(Keyword::False),
        _ => None,
    }
}

/// Booleans are lexed as keywords; the parser promotes `poz`/`apuz` to
/// boolean literals.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    Number(f64),
    String(Rc<str>),
    Punctuation(char),
    Operator(Rc<str>),
    Keyword(Keyword),
    Variable(Rc<str>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(value) => write!(f, "number {}", value),
            TokenKind::String(value) => write!(f, "string {:?}", value),
            TokenKind::Punctuation(ch) => write!(f, "punctuation \"{}\"", ch),
            TokenKind::Operator(op) => write!(f, "operator \"{}\"", op),
            TokenKind::Keyword(kw) => write!(f, "keyword \"{}\"", kw.as_str()),
            TokenKind::Variable(name) => write!(f, "variable \"{}\"", name),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.position)
    }
}

const COMMENT: char = '#';

fn is_id_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == 'λ' || ch == '_'
}

fn is_id(ch: char) -> bool {
    is_id_start(ch) || ch.is_ascii_digit() || "?!-<>=".contains(ch)
}

fn is_op_char(ch: char) -> bool {
    "+-*/%=&|<>!".contains(ch)
}

fn is_punctuation(ch: char) -> bool {
    ",;(){}[]".contains(ch)
}

fn is_whitespace(ch: char) -> bool {
    " \t\n\r".contains(ch)
}

/// Lazily turns source text into tokens, holding at most one token of
/// lookahead.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: Cursor<'a>,
    peeked: Option<Token>,
    failed: bool,
}

pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: Cursor::new(input),
            peeked: None,
            failed: false,
        }
    }

    /// The next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.read_next()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consumes the next token, reading a fresh one if none is buffered.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_next(),
        }
    }

    pub fn at_end(&mut self) -> Result<bool, LexError> {
        Ok(self.peek()?.is_none())
    }

    /// Position just past the last consumed character.
    pub fn position(&self) -> Position {
        self.input.position()
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let mut has_dot = false;
        let number = self.input.read_while(|ch| {
            if ch == '.' {
                if has_dot {
                    return false;
                }
                has_dot = true;
                return true;
            }
            ch.is_ascii_digit()
        });

        number
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| self.input.error(LexErrorKind::InvalidNumber(number)))
    }

    fn read_identifier(&mut self) -> TokenKind {
        let ident = self.input.read_while(is_id);
        match keywords(&ident) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Variable(ident.into()),
        }
    }

    fn read_string(&mut self) -> Result<TokenKind, LexError> {
        // opening quote
        self.input.next()?;

        let mut string = String::new();
        let mut escaped = false;
        while !self.input.at_end() {
            let ch = self.input.next()?;
            if escaped {
                string.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                return Ok(TokenKind::String(string.into()));
            } else {
                string.push(ch);
            }
        }

        Err(self.input.error(LexErrorKind::UnterminatedString))
    }

    fn skip_comment(&mut self) {
        self.input.read_while(|ch| ch != '\n');
        // the newline itself, if the comment is not on the last line
        let _ = self.input.next();
    }

    fn read_next(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.input.read_while(is_whitespace);

            let Some(ch) = self.input.peek() else {
                return Ok(None);
            };

            if ch == COMMENT {
                self.skip_comment();
                continue;
            }

            let position = self.input.position();
            let kind = match ch {
                '"' => self.read_string()?,
                c if c.is_ascii_digit() => self.read_number()?,
                c if is_id_start(c) => self.read_identifier(),
                c if is_punctuation(c) => TokenKind::Punctuation(self.input.next()?),
                c if is_op_char(c) => TokenKind::Operator(self.input.read_while(is_op_char).into()),
                c => return Err(self.input.error(LexErrorKind::UnexpectedCharacter(c))),
            };

            tracing::trace!(%position, token = %kind, "read token");
            return Ok(Some(Token { kind, position }));
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token, LexError>;

    /// Yields at most one error, after which iteration ends.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token().transpose();
        self.failed = matches!(item, Some(Err(_)));
        item
    }
}

impl FusedIterator for Tokenizer<'_> {}
