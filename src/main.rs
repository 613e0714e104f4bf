// ABOUTME: CLI driver: file execution and the interactive REPL

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::process::ExitCode;
use treewalk_lang::interpreter::Interpreter;
use treewalk_lang::{config, diagnostics};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let progname = args
        .first()
        .map(|s| s.as_str())
        .unwrap_or("treewalk-lang");
    let positional = &args[1..];

    match positional.len() {
        0 => {
            run_repl();
            ExitCode::from(0)
        }
        1 => match run_file(&positional[0]) {
            Ok(code) => ExitCode::from(code as u8),
            Err(err) => {
                eprintln!("{progname}: {err}");
                ExitCode::from(config::EX_SOFTWARE as u8)
            }
        },
        _ => {
            eprintln!("{}", config::usage(progname));
            ExitCode::from(config::EX_USAGE as u8)
        }
    }
}

/// Reads `path` and executes it once, per spec.md §6: exit 0 on success, 65
/// if a compile error was reported, 70 if a runtime error was reported.
fn run_file(path: &str) -> std::io::Result<i32> {
    let source = std::fs::read_to_string(path)?;

    let mut interpreter = Interpreter::new();
    treewalk_lang::run(&source, &mut interpreter);

    if diagnostics::had_compile_error() {
        return Ok(config::EX_DATAERR);
    }
    if diagnostics::had_runtime_error() {
        return Ok(config::EX_SOFTWARE);
    }
    Ok(0)
}

/// Interactive prompt. One `Interpreter` — and so one global environment —
/// persists across every line for the whole session (spec.md §6). The
/// compile-error flag is cleared before each line so that one bad line
/// doesn't poison the next; runtime errors are reported but never stop the
/// loop. The process always exits 0 in REPL mode.
fn run_repl() {
    let mut interpreter = Interpreter::new();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {err}");
            return;
        }
    };

    loop {
        match editor.readline(config::PROMPT) {
            Ok(line) => {
                diagnostics::reset_compile_error();
                let _ = editor.add_history_entry(line.as_str());
                treewalk_lang::run(&line, &mut interpreter);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(_) => break,
        }
    }
}
