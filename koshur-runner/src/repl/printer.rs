use koshur_interpreter::{Error, ErrorKind, Value};

pub struct Printer {}

impl Printer {
    pub fn print(&mut self, result: Result<Value, Error>) {
        match &result {
            Ok(Value::String(value)) => println!("{:?}", value),
            Ok(value) => println!("{}", value),
            Err(err) => println!("{}:\n{}", describe(err), err),
        }
    }
}

fn describe(error: &Error) -> &'static str {
    match error.kind() {
        ErrorKind::Lexical => "Error reading",
        ErrorKind::Syntax => "Error parsing",
        ErrorKind::Runtime => "Error evaluating",
    }
}
