use std::fmt::Display;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::stack::ensure_sufficient_stack;

/// A Koshur expression tree.
///
/// The serde representation is the JSON written by `--write-ast`: every node
/// is an object tagged by `type`, with the field names below.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "program")]
    Program { program: Vec<Node> },
    #[serde(rename = "assignment")]
    Assignment { left: Box<Node>, right: Box<Node> },
    #[serde(rename = "binary")]
    Binary {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    #[serde(rename = "condition")]
    Condition {
        #[serde(rename = "cond")]
        condition: Box<Node>,
        then: Box<Node>,
        #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Node>>,
    },
    #[serde(rename = "lambda")]
    Lambda(Rc<Lambda>),
    #[serde(rename = "call")]
    Call {
        #[serde(rename = "func")]
        callee: Box<Node>,
        #[serde(rename = "args")]
        arguments: Vec<Node>,
    },
    #[serde(rename = "var")]
    Variable { value: Rc<str> },
    #[serde(rename = "number")]
    Number { value: f64 },
    #[serde(rename = "string")]
    String { value: Rc<str> },
    #[serde(rename = "bool")]
    Boolean { value: bool },
}

/// Shared between the tree and every closure created from it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Lambda {
    #[serde(rename = "vars")]
    pub params: Vec<Rc<str>>,
    pub body: Node,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
}

impl BinaryOperator {
    pub fn from_symbol(op: &str) -> Option<Self> {
        use BinaryOperator::*;
        match op {
            "||" => Some(Or),
            "&&" => Some(And),
            "<" => Some(LessThan),
            ">" => Some(GreaterThan),
            "<=" => Some(LessEqual),
            ">=" => Some(GreaterEqual),
            "==" => Some(Equal),
            "!=" => Some(NotEqual),
            "+" => Some(Plus),
            "-" => Some(Minus),
            "*" => Some(Multiply),
            "/" => Some(Divide),
            "%" => Some(Modulo),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Or => "||",
            And => "&&",
            LessThan => "<",
            GreaterThan => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Node {
    pub const FALSE: Node = Node::Boolean { value: false };

    pub fn program(program: Vec<Node>) -> Self {
        Node::Program { program }
    }

    pub fn variable(name: &str) -> Self {
        Node::Variable { value: name.into() }
    }

    pub fn number(value: f64) -> Self {
        Node::Number { value }
    }

    pub fn string(value: &str) -> Self {
        Node::String {
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Node::Boolean { value }
    }

    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assignment(left: Node, right: Node) -> Self {
        Node::Assignment {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn lambda(params: Vec<Rc<str>>, body: Node) -> Self {
        Node::Lambda(Rc::new(Lambda { params, body }))
    }

    pub fn call(callee: Node, arguments: Vec<Node>) -> Self {
        Node::Call {
            callee: Box::new(callee),
            arguments,
        }
    }
}

impl Node {
    /// Moves the direct children of this node onto `stack`, leaving leaves in
    /// their place.
    fn take_children(&mut self, stack: &mut Vec<Node>) {
        fn take(node: &mut Node) -> Node {
            std::mem::replace(node, Node::FALSE)
        }

        match self {
            Node::Program { program } => stack.append(program),
            Node::Assignment { left, right } | Node::Binary { left, right, .. } => {
                stack.push(take(left));
                stack.push(take(right));
            }
            Node::Condition {
                condition,
                then,
                otherwise,
            } => {
                stack.push(take(condition));
                stack.push(take(then));
                if let Some(otherwise) = otherwise {
                    stack.push(take(otherwise));
                }
            }
            // a lambda still shared with a closure is dropped along with it
            Node::Lambda(lambda) => {
                if let Some(lambda) = Rc::get_mut(lambda) {
                    stack.push(take(&mut lambda.body));
                }
            }
            Node::Call { callee, arguments } => {
                stack.push(take(callee));
                stack.append(arguments);
            }
            Node::Variable { .. }
            | Node::Number { .. }
            | Node::String { .. }
            | Node::Boolean { .. } => {}
        }
    }
}

/// Tears the tree down with a work list so that arbitrarily deep expressions
/// do not overflow the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.take_children(&mut stack);
        }
    }
}

fn write_joined<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ensure_sufficient_stack(|| self.fmt_node(f))
    }
}

impl Node {
    fn fmt_node(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Node::*;
        match self {
            Program { program } => {
                write!(f, "{{")?;
                write_joined(f, program, "; ")?;
                write!(f, "}}")
            }
            Assignment { left, right } => write!(f, "({} = {})", left, right),
            Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Condition {
                condition,
                then,
                otherwise,
            } => {
                write!(f, "yeli {} teli {}", condition, then)?;
                if let Some(otherwise) = otherwise {
                    write!(f, " nate {}", otherwise)?;
                }
                Ok(())
            }
            Node::Lambda(lambda) => write!(f, "{}", lambda),
            Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                write_joined(f, arguments, ", ")?;
                write!(f, ")")
            }
            Variable { value } => write!(f, "{}", value),
            Number { value } => write!(f, "{}", value),
            Node::String { value } => write!(f, "{:?}", value),
            Boolean { value } => write!(f, "{}", if *value { "poz" } else { "apuz" }),
        }
    }
}

impl Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "banav(")?;
        write_joined(f, &self.params, ", ")?;
        write!(f, ") {}", self.body)
    }
}
