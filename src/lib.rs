// ABOUTME: Library module exposing internal components for testing

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

/// Scans and parses `source` and, if no compile error was reported,
/// evaluates it against `interpreter`'s current environment. This is the
/// one-run unit both the file driver and each REPL line go through
/// (spec.md §2): scan, then parse, then — only if parsing produced no
/// compile error — evaluate.
pub fn run(source: &str, interpreter: &mut interpreter::Interpreter) {
    let tokens = scanner::scan(source);
    let statements = parser::Parser::new(tokens).parse();

    if diagnostics::had_compile_error() {
        return;
    }

    interpreter.interpret(&statements);
}
