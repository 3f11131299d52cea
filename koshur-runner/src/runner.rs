use std::io::Write;
use std::path::{Path, PathBuf};

use koshur_core::ast::Node;
use koshur_core::lexer::tokenize;
use koshur_core::parser::parse;
use koshur_interpreter::builtins::{self, Output};
use koshur_interpreter::{EvalConfig, Environment, Evaluator, Value};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

pub const SOURCE_EXTENSION: &str = "k";
pub const AST_EXTENSION: &str = "ast";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Usage: koshur [--print-ast] [--write-ast] [--from-ast] <file.{expected}>, got {path:?}")]
    BadExtension { path: PathBuf, expected: &'static str },
    #[error("Could not open file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not write file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid AST in {path:?}: {source}")]
    Ast {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Could not serialize AST: {0}")]
    Serialize(serde_json::Error),
    #[error(transparent)]
    Koshur(#[from] koshur_interpreter::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub print_ast: bool,
    pub write_ast: bool,
    pub from_ast: bool,
    pub config: EvalConfig,
}

/// JSON with four-space indentation, the layout `.ast` files are written in.
pub fn ast_to_json(program: &Node) -> Result<String, RunnerError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    program
        .serialize(&mut serializer)
        .map_err(RunnerError::Serialize)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn check_extension(path: &Path, options: &RunOptions) -> Result<(), RunnerError> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    match extension {
        Some(SOURCE_EXTENSION) => Ok(()),
        Some(AST_EXTENSION) if options.from_ast => Ok(()),
        _ => Err(RunnerError::BadExtension {
            path: path.to_path_buf(),
            expected: if options.from_ast {
                AST_EXTENSION
            } else {
                SOURCE_EXTENSION
            },
        }),
    }
}

fn load(path: &Path, options: &RunOptions) -> Result<Node, RunnerError> {
    let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if options.from_ast {
        tracing::debug!(?path, "reading AST");
        return serde_json::from_str(&text).map_err(|source| RunnerError::Ast {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(?path, bytes = text.len(), "parsing source");
    let program = parse(tokenize(&text)).map_err(koshur_interpreter::Error::from)?;
    Ok(program)
}

/// Runs one file against a fresh root environment holding the built-ins.
pub fn execute(path: &Path, options: &RunOptions, output: Output) -> Result<Value, RunnerError> {
    check_extension(path, options)?;
    let program = load(path, options)?;

    if options.print_ast || options.write_ast {
        let json = ast_to_json(&program)?;
        if options.print_ast {
            writeln!(output.borrow_mut(), "{}", json).map_err(|source| RunnerError::Write {
                path: PathBuf::from("<output>"),
                source,
            })?;
        }
        if options.write_ast {
            let ast_path = path.with_extension(AST_EXTENSION);
            tracing::debug!(path = ?ast_path, "writing AST");
            std::fs::write(&ast_path, json).map_err(|source| RunnerError::Write {
                path: ast_path,
                source,
            })?;
        }
    }

    let env = Environment::new();
    builtins::install(&env, output);

    tracing::debug!("evaluating");
    let value = Evaluator::with_config(options.config)
        .evaluate(&program, &env)
        .map_err(koshur_interpreter::Error::from)?;
    Ok(value)
}
