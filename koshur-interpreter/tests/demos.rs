use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use koshur_interpreter::builtins::{self, Output};
use koshur_interpreter::{run, Environment};
use pretty_assertions::assert_eq;

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos")
}

fn run_demo(source: &str) -> String {
    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    let output: Output = buffer.clone();
    let env = Environment::new();
    builtins::install(&env, output);

    run(source, &env).unwrap();

    let written = buffer.borrow().clone();
    String::from_utf8(written).unwrap()
}

#[test]
fn demos_print_expected_output() {
    let mut sources = std::fs::read_dir(demos_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "k"))
        .collect::<Vec<_>>();
    sources.sort();
    assert!(!sources.is_empty());

    for path in sources {
        let source = std::fs::read_to_string(&path).unwrap();
        let expected = std::fs::read_to_string(path.with_extension("out")).unwrap();
        assert_eq!(run_demo(&source), expected, "demo: {}", path.display());
    }
}

#[test]
fn demos_survive_an_ast_round_trip() {
    let source = std::fs::read_to_string(demos_dir().join("closures.k")).unwrap();
    let program = koshur_core::parse(koshur_core::tokenize(&source)).unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let reread: koshur_core::Node = serde_json::from_str(&json).unwrap();
    assert_eq!(reread, program);

    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    let env = Environment::new();
    builtins::install(&env, buffer.clone());
    koshur_interpreter::evaluator::evaluate(&reread, &env).unwrap();

    let written = String::from_utf8(buffer.borrow().clone()).unwrap();
    assert_eq!(written, run_demo(&source));
}
