// ABOUTME: Process-wide diagnostics sink — sticky error flags and formatted reporting

use crate::token::{Token, TokenKind};
use std::cell::Cell;

thread_local! {
    static HAD_COMPILE_ERROR: Cell<bool> = const { Cell::new(false) };
    static HAD_RUNTIME_ERROR: Cell<bool> = const { Cell::new(false) };
}

/// Returns whether a scan or parse error has been reported since the last reset.
pub fn had_compile_error() -> bool {
    HAD_COMPILE_ERROR.with(Cell::get)
}

/// Returns whether a runtime error has been reported since the last reset.
pub fn had_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.with(Cell::get)
}

/// Clears the compile-error flag. The REPL calls this before each line so
/// that one bad line doesn't poison the next.
pub fn reset_compile_error() {
    HAD_COMPILE_ERROR.with(|flag| flag.set(false));
}

/// Clears the runtime-error flag.
pub fn reset_runtime_error() {
    HAD_RUNTIME_ERROR.with(|flag| flag.set(false));
}

/// Reports a scan or parse error in the form `[line <n>] Error<where>: <message>`.
pub fn report(line: usize, location: &str, message: &str) {
    eprintln!("[line {line}] Error{location}: {message}");
    HAD_COMPILE_ERROR.with(|flag| flag.set(true));
}

/// Reports a scanner error (no token location context).
pub fn scan_error(line: usize, message: &str) {
    report(line, "", message);
}

/// Reports a parse error, formatting the location from the offending token
/// per spec.md §4.2: `" at end"` for `EOF`, `" at '<lexeme>'"` otherwise.
pub fn parse_error(token: &Token, message: &str) {
    let location = if token.kind == TokenKind::Eof {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    };
    report(token.line, &location, message);
}

/// Reports a runtime error in the form `<message>\n[line <n>]`.
pub fn runtime_error(line: usize, message: &str) {
    eprintln!("{message}\n[line {line}]");
    HAD_RUNTIME_ERROR.with(|flag| flag.set(true));
}
