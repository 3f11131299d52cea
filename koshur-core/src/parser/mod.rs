pub mod error;
pub mod expressions;

use std::rc::Rc;

use crate::ast::Node;
use crate::lexer::{Keyword, Token, TokenKind, Tokenizer};
pub use error::{Expected, ParseError};
use expressions::parse_expression;

pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
}

/// Parses a whole token stream into a `Program` node.
pub fn parse(tokens: Tokenizer<'_>) -> Result<Node, ParseError> {
    Parser::new(tokens).parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Tokenizer<'a>) -> Self {
        Self { tokens }
    }

    pub(crate) fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        Ok(self.tokens.peek()?)
    }

    pub(crate) fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let token = self.tokens.next_token()?;
        if let Some(token) = &token {
            tracing::trace!(%token, "consumed");
        }
        Ok(token)
    }

    pub(crate) fn at_end(&mut self) -> Result<bool, ParseError> {
        Ok(self.tokens.at_end()?)
    }

    pub(crate) fn is_punctuation(&mut self, ch: char) -> Result<bool, ParseError> {
        Ok(matches!(
            self.peek()?,
            Some(Token { kind: TokenKind::Punctuation(c), .. }) if *c == ch
        ))
    }

    pub(crate) fn is_keyword(&mut self, kw: Keyword) -> Result<bool, ParseError> {
        Ok(matches!(
            self.peek()?,
            Some(Token { kind: TokenKind::Keyword(k), .. }) if *k == kw
        ))
    }

    pub(crate) fn unexpected(&self, expected: Expected, got: Option<Token>) -> ParseError {
        ParseError::unexpected(expected, got, self.tokens.position())
    }

    pub(crate) fn expect_punctuation(&mut self, ch: char) -> Result<(), ParseError> {
        let token = self.next_token()?;
        match token {
            Some(Token {
                kind: TokenKind::Punctuation(c),
                ..
            }) if c == ch => Ok(()),
            _ => Err(self.unexpected(Expected::Punctuation(ch), token)),
        }
    }

    pub(crate) fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        let token = self.next_token()?;
        match token {
            Some(Token {
                kind: TokenKind::Keyword(k),
                ..
            }) if k == kw => Ok(()),
            _ => Err(self.unexpected(Expected::Keyword(kw), token)),
        }
    }

    pub(crate) fn parse_varname(&mut self) -> Result<Rc<str>, ParseError> {
        let token = self.next_token()?;
        match token {
            Some(Token {
                kind: TokenKind::Variable(name),
                ..
            }) => Ok(name),
            _ => Err(self.unexpected(Expected::Identifier, token)),
        }
    }

    /// Expressions separated by `;`, which is optional after the last one.
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let mut program = Vec::new();

        while !self.at_end()? {
            program.push(parse_expression(self)?);
            if !self.at_end()? {
                self.expect_punctuation(';')?;
            }
        }

        tracing::debug!(expressions = program.len(), "parsed program");
        Ok(Node::program(program))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::BinaryOperator;
    use crate::lexer::{tokenize, LexError, LexErrorKind};
    use crate::position::Position;

    fn parse_str(input: &str) -> Result<Node, ParseError> {
        parse(tokenize(input))
    }

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let program = parse_str(input).unwrap();
            assert_eq!(program.to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_precedence() {
        let tests = vec![
            ("2 + 3 * 4", "{(2 + (3 * 4))}"),
            ("2 * 3 + 4", "{((2 * 3) + 4)}"),
            ("10 - 3 - 2", "{((10 - 3) - 2)}"),
            ("a * b / c % d", "{(((a * b) / c) % d)}"),
            ("a + b * c + d / e - f", "{(((a + (b * c)) + (d / e)) - f)}"),
            ("1 + 2 < 3 * 4", "{((1 + 2) < (3 * 4))}"),
            ("a < b == c", "{((a < b) == c)}"),
            ("a || b && c", "{(a || (b && c))}"),
            ("a && b || c && d", "{((a && b) || (c && d))}"),
            ("x = 1 + 2", "{(x = (1 + 2))}"),
            ("x = a || b", "{(x = (a || b))}"),
            ("(1 + 2) * 3", "{((1 + 2) * 3)}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_program_separators() {
        let tests = vec![
            ("", "{}"),
            ("a", "{a}"),
            ("a;", "{a}"),
            ("a; b; c", "{a; b; c}"),
            ("# only a comment\n", "{}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_literals() {
        let tests = vec![
            ("poz; apuz", "{poz; apuz}"),
            ("\"hi there\"", "{\"hi there\"}"),
            ("1.5", "{1.5}"),
        ];

        test_parsing(tests);

        assert_eq!(
            parse_str("poz").unwrap(),
            Node::program(vec![Node::boolean(true)])
        );
    }

    #[test]
    fn test_blocks_collapse() {
        assert_eq!(
            parse_str("{}").unwrap(),
            Node::program(vec![Node::FALSE])
        );
        assert_eq!(
            parse_str("{ 1 }").unwrap(),
            Node::program(vec![Node::number(1.0)])
        );
        assert_eq!(
            parse_str("{ 1; 2; }").unwrap(),
            Node::program(vec![Node::program(vec![
                Node::number(1.0),
                Node::number(2.0)
            ])])
        );
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("yeli x teli 1", "{yeli x teli 1}"),
            ("yeli x teli 1 nate 2", "{yeli x teli 1 nate 2}"),
            ("yeli x { 1 } nate { 2 }", "{yeli x teli 1 nate 2}"),
            ("yeli a < b teli a nate b", "{yeli (a < b) teli a nate b}"),
            (
                "yeli n < 2 teli n nate yeli n < 5 teli 1 nate 2",
                "{yeli (n < 2) teli n nate yeli (n < 5) teli 1 nate 2}",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_lambda() {
        let tests = vec![
            ("banav() 1", "{banav() 1}"),
            ("λ(x) x * 2", "{banav(x) (x * 2)}"),
            ("banav(a, b) { a + b }", "{banav(a, b) (a + b)}"),
            ("add = banav(a, b,) a + b", "{(add = banav(a, b) (a + b))}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call() {
        let tests = vec![
            ("f()", "{f()}"),
            ("a + add(b * c) + d", "{((a + add((b * c))) + d)}"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "{add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))}",
            ),
            ("f(x)(y)", "{f(x)(y)}"),
            ("f(x)(y)(z)", "{f(x)(y)(z)}"),
            ("(banav(x) x)(5)", "{banav(x) x(5)}"),
            ("{ f }(1)", "{f(1)}"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn chained_calls_nest() {
        assert_eq!(
            parse_str("f(1)(2)").unwrap(),
            Node::program(vec![Node::call(
                Node::call(Node::variable("f"), vec![Node::number(1.0)]),
                vec![Node::number(2.0)],
            )])
        );
    }

    #[test]
    fn assignment_is_left_associative() {
        assert_eq!(
            parse_str("a = b = 1").unwrap(),
            Node::program(vec![Node::assignment(
                Node::assignment(Node::variable("a"), Node::variable("b")),
                Node::number(1.0),
            )])
        );
    }

    #[test]
    fn comparison_builds_binary_node() {
        assert_eq!(
            parse_str("1 >= 2").unwrap(),
            Node::program(vec![Node::binary(
                BinaryOperator::GreaterEqual,
                Node::number(1.0),
                Node::number(2.0),
            )])
        );
    }

    #[test]
    fn missing_separator() {
        let error = parse_str("a b").unwrap_err();
        assert_eq!(
            error,
            ParseError::UnexpectedToken {
                expected: Expected::Punctuation(';'),
                found: Token {
                    kind: TokenKind::Variable("b".into()),
                    position: Position { line: 1, column: 2 },
                },
            }
        );
        assert_eq!(
            error.to_string(),
            "Expecting punctuation \";\", found variable \"b\" (1:2)"
        );
    }

    #[test]
    fn missing_then_keyword() {
        assert_eq!(
            parse_str("yeli x 1").unwrap_err(),
            ParseError::UnexpectedToken {
                expected: Expected::Keyword(Keyword::Then),
                found: Token {
                    kind: TokenKind::Number(1.0),
                    position: Position { line: 1, column: 7 },
                },
            }
        );
    }

    #[test]
    fn parameter_must_be_a_name() {
        assert_eq!(
            parse_str("banav(a, 1) a").unwrap_err(),
            ParseError::UnexpectedToken {
                expected: Expected::Identifier,
                found: Token {
                    kind: TokenKind::Number(1.0),
                    position: Position { line: 1, column: 9 },
                },
            }
        );
    }

    #[test]
    fn unclosed_argument_list() {
        assert_eq!(
            parse_str("f(1, 2").unwrap_err(),
            ParseError::PrematureEndOfInput {
                expected: Expected::Punctuation(')'),
                position: Position { line: 1, column: 6 },
            }
        );
        assert!(matches!(
            parse_str("f(1 2)").unwrap_err(),
            ParseError::UnexpectedToken {
                expected: Expected::Punctuation(','),
                ..
            }
        ));
    }

    #[test]
    fn unexpected_token_in_expression_position() {
        let tests = vec!["+ 1", ")", "a = ;", "yeli"];
        for input in tests {
            let error = parse_str(input).unwrap_err();
            assert!(
                matches!(
                    error,
                    ParseError::UnexpectedToken {
                        expected: Expected::Expression,
                        ..
                    } | ParseError::PrematureEndOfInput {
                        expected: Expected::Expression,
                        ..
                    }
                ),
                "input: {}, error: {:?}",
                input,
                error
            );
        }
    }

    #[test]
    fn unknown_operator_ends_the_expression() {
        assert!(matches!(
            parse_str("x =- 1").unwrap_err(),
            ParseError::UnexpectedToken {
                expected: Expected::Punctuation(';'),
                ..
            }
        ));
    }

    #[test]
    fn lexical_errors_pass_through() {
        assert_eq!(
            parse_str("a = 1 @ 2").unwrap_err(),
            ParseError::Lex(LexError {
                kind: LexErrorKind::UnexpectedCharacter('@'),
                position: Position { line: 1, column: 6 },
            })
        );
    }

    #[test]
    fn long_chains_parse_and_drop() {
        let source = vec!["1"; 200_000].join(" + ");
        let program = parse_str(&source).unwrap();

        let Node::Program { program: expressions } = &program else {
            panic!("expected a program");
        };
        assert_eq!(expressions.len(), 1);
        assert!(matches!(
            expressions[0],
            Node::Binary {
                operator: BinaryOperator::Plus,
                ..
            }
        ));

        drop(program);
    }

    #[test]
    fn ast_round_trips_through_json() {
        let source = "
            fib = banav(n) yeli n < 2 teli n nate fib(n - 1) + fib(n - 2);
            make-adder = λ(x) λ(y) x + y;
            wan(\"fib:\", fib(10), make-adder(1)(2), {}, { 1; 2 });
        ";
        let program = parse_str(source).unwrap();
        let json = serde_json::to_string_pretty(&program).unwrap();
        let reread: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(reread, program);
        assert_eq!(serde_json::to_string_pretty(&reread).unwrap(), json);
    }
}
