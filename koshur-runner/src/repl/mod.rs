mod printer;
mod reader;

use koshur_core::ast::Node;
use koshur_interpreter::builtins;
use koshur_interpreter::{Environment, Error, EvalConfig, Evaluator, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use printer::Printer;
use reader::{ReadOutput, Reader};

/// A read-eval-print loop over one root environment, so definitions persist
/// from line to line.
struct Repl {
    reader: Reader,
    evaluator: Evaluator,
    environment: Environment,
    printer: Printer,
}

impl Repl {
    fn evaluate(&mut self, program: &Node) -> Result<Value, Error> {
        Ok(self.evaluator.evaluate(program, &self.environment)?)
    }

    fn run(mut self) {
        loop {
            let input = self.reader.read();
            match input {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Invalid(error) => self.printer.print(Err(error)),
                ReadOutput::Value(program) => {
                    let result = self.evaluate(&program);
                    self.printer.print(result)
                }
            }
        }
    }
}

pub fn start(config: EvalConfig) -> Result<(), ReadlineError> {
    let rl = DefaultEditor::new()?;

    let environment = Environment::new();
    builtins::install(&environment, builtins::stdout());

    Repl {
        reader: Reader::new(rl),
        evaluator: Evaluator::with_config(config),
        environment,
        printer: Printer {},
    }
    .run();

    Ok(())
}
