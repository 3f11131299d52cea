pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod stack;

pub use ast::Node;
pub use lexer::tokenize;
pub use parser::parse;
