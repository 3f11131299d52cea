use koshur_core::ast::Node;
use koshur_core::lexer::tokenize;
use koshur_core::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

const PROMPT: &str = ">> ";

pub enum ReadOutput {
    Exit,
    Clear,
    Value(Node),
    Invalid(koshur_interpreter::Error),
}

pub struct Reader {
    rl: Editor<(), DefaultHistory>,
}

impl Reader {
    pub fn new(rl: Editor<(), DefaultHistory>) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> ReadOutput {
        let readline = self.rl.readline(PROMPT);

        let line = match readline {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                return ReadOutput::Clear;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                return ReadOutput::Exit;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                return ReadOutput::Exit;
            }
            Ok(line) => line,
        };

        if line.trim().is_empty() {
            return ReadOutput::Clear;
        }
        if let Err(err) = self.rl.add_history_entry(line.as_str()) {
            tracing::warn!(%err, "could not record history");
        }

        match parse(tokenize(&line)) {
            Ok(program) => ReadOutput::Value(program),
            Err(error) => ReadOutput::Invalid(error.into()),
        }
    }
}
