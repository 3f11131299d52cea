use super::error::{Expected, ParseError};
use crate::ast::{BinaryOperator, Node};
use crate::lexer::{Keyword, Token, TokenKind};
use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Assignment = 1,
    Or = 2,
    And = 3,
    Comparison = 7,
    Sum = 10,
    Product = 20,
}

#[derive(Debug, Clone, Copy)]
enum InfixOperator {
    Assign,
    Binary(BinaryOperator),
}

impl InfixOperator {
    fn from_symbol(op: &str) -> Option<Self> {
        if op == "=" {
            Some(InfixOperator::Assign)
        } else {
            BinaryOperator::from_symbol(op).map(InfixOperator::Binary)
        }
    }

    fn precedence(&self) -> Precedence {
        use BinaryOperator::*;
        match self {
            InfixOperator::Assign => Precedence::Assignment,
            InfixOperator::Binary(Or) => Precedence::Or,
            InfixOperator::Binary(And) => Precedence::And,
            InfixOperator::Binary(
                LessThan | GreaterThan | LessEqual | GreaterEqual | Equal | NotEqual,
            ) => Precedence::Comparison,
            InfixOperator::Binary(Plus | Minus) => Precedence::Sum,
            InfixOperator::Binary(Multiply | Divide | Modulo) => Precedence::Product,
        }
    }
}

pub fn parse_expression(parser: &mut Parser) -> Result<Node, ParseError> {
    ensure_sufficient_stack(|| {
        let atom = parse_atom(parser)?;
        let expression = maybe_binary(parser, atom, Precedence::Lowest)?;
        maybe_call(parser, expression)
    })
}

fn peek_infix_operator(parser: &mut Parser) -> Result<Option<InfixOperator>, ParseError> {
    Ok(match parser.peek()? {
        Some(Token {
            kind: TokenKind::Operator(op),
            ..
        }) => InfixOperator::from_symbol(op),
        _ => None,
    })
}

/// Precedence climbing: folds operators binding tighter than `precedence`
/// into `left`. Operators that are not in the table end the expression.
fn maybe_binary(
    parser: &mut Parser,
    mut left: Node,
    precedence: Precedence,
) -> Result<Node, ParseError> {
    loop {
        let Some(operator) = peek_infix_operator(parser)? else {
            return Ok(left);
        };
        let next_precedence = operator.precedence();
        if next_precedence <= precedence {
            return Ok(left);
        }
        parser.next_token()?;

        let atom = parse_atom(parser)?;
        let right = maybe_binary(parser, atom, next_precedence)?;
        left = match operator {
            InfixOperator::Assign => Node::assignment(left, right),
            InfixOperator::Binary(operator) => Node::binary(operator, left, right),
        };
    }
}

fn maybe_call(parser: &mut Parser, mut expression: Node) -> Result<Node, ParseError> {
    while parser.is_punctuation('(')? {
        expression = parse_call(parser, expression)?;
    }
    Ok(expression)
}

/// `start`, then `separator`-separated elements up to `stop`. A trailing
/// separator before `stop` is accepted.
pub(crate) fn delimited<'a, T>(
    parser: &mut Parser<'a>,
    start: char,
    stop: char,
    separator: char,
    mut parse_element: impl FnMut(&mut Parser<'a>) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();
    let mut first = true;

    parser.expect_punctuation(start)?;

    while !parser.at_end()? {
        if parser.is_punctuation(stop)? {
            break;
        }
        if first {
            first = false;
        } else {
            parser.expect_punctuation(separator)?;
        }
        if parser.is_punctuation(stop)? {
            break;
        }
        elements.push(parse_element(parser)?);
    }

    parser.expect_punctuation(stop)?;

    Ok(elements)
}

fn parse_call(parser: &mut Parser, callee: Node) -> Result<Node, ParseError> {
    let arguments = delimited(parser, '(', ')', ',', parse_expression)?;
    Ok(Node::call(callee, arguments))
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Node, ParseError> {
    parser.expect_punctuation('(')?;
    let expression = parse_expression(parser)?;
    parser.expect_punctuation(')')?;

    Ok(expression)
}

/// `{ a; b }`. No expressions collapse to `apuz`, a single one is returned
/// unwrapped.
fn parse_block(parser: &mut Parser) -> Result<Node, ParseError> {
    let mut program = delimited(parser, '{', '}', ';', parse_expression)?;
    Ok(match program.len() {
        0 => Node::FALSE,
        1 => program.remove(0),
        _ => Node::program(program),
    })
}

fn parse_if_expression(parser: &mut Parser) -> Result<Node, ParseError> {
    parser.expect_keyword(Keyword::If)?;
    let condition = Box::new(parse_expression(parser)?);
    if !parser.is_punctuation('{')? {
        parser.expect_keyword(Keyword::Then)?;
    }

    let then = Box::new(parse_expression(parser)?);

    let otherwise = if parser.is_keyword(Keyword::Else)? {
        parser.next_token()?;
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };

    Ok(Node::Condition {
        condition,
        then,
        otherwise,
    })
}

fn parse_lambda(parser: &mut Parser) -> Result<Node, ParseError> {
    // `banav` or `λ`
    parser.next_token()?;
    let params = delimited(parser, '(', ')', ',', Parser::parse_varname)?;
    let body = parse_expression(parser)?;

    Ok(Node::lambda(params, body))
}

fn parse_atom(parser: &mut Parser) -> Result<Node, ParseError> {
    let kind = match parser.peek()? {
        Some(token) => token.kind.clone(),
        None => return Err(parser.unexpected(Expected::Expression, None)),
    };

    let atom = match kind {
        TokenKind::Punctuation('(') => parse_grouped_expression(parser)?,
        TokenKind::Punctuation('{') => parse_block(parser)?,
        TokenKind::Keyword(Keyword::If) => parse_if_expression(parser)?,
        TokenKind::Keyword(Keyword::Function | Keyword::Lambda) => parse_lambda(parser)?,
        TokenKind::Keyword(kw @ (Keyword::True | Keyword::False)) => {
            parser.next_token()?;
            Node::boolean(kw == Keyword::True)
        }
        TokenKind::Variable(value) => {
            parser.next_token()?;
            Node::Variable { value }
        }
        TokenKind::Number(value) => {
            parser.next_token()?;
            Node::Number { value }
        }
        TokenKind::String(value) => {
            parser.next_token()?;
            Node::String { value }
        }
        _ => {
            let token = parser.next_token()?;
            return Err(parser.unexpected(Expected::Expression, token));
        }
    };

    maybe_call(parser, atom)
}
