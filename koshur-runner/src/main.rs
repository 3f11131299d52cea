mod repl;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use koshur_interpreter::builtins;
use koshur_interpreter::evaluator::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
use tracing_subscriber::EnvFilter;

use runner::RunOptions;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Print the AST as JSON before evaluating
    #[arg(long)]
    print_ast: bool,
    /// Write the AST as JSON next to the source file (`x.k` -> `x.ast`)
    #[arg(long)]
    write_ast: bool,
    /// Read PATH as a previously written `.ast` file
    #[arg(long)]
    from_ast: bool,
    /// Nested calls allowed before evaluation is aborted
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
    /// Program to run; starts the REPL when omitted
    path: Option<PathBuf>,
}

fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = EvalConfig {
        max_call_depth: cli.max_call_depth,
    };

    match cli.path {
        None => {
            if let Err(err) = repl::start(config) {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        }
        Some(path) => {
            let options = RunOptions {
                print_ast: cli.print_ast,
                write_ast: cli.write_ast,
                from_ast: cli.from_ast,
                config,
            };
            if let Err(err) = runner::execute(&path, &options, builtins::stdout()) {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
