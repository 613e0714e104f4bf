// ABOUTME: Configuration and constants for the interpreter CLI and REPL

/// Exit codes, named after the BSD `sysexits.h` conventions spec.md §6
/// quotes its exit codes from.
pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_SOFTWARE: i32 = 70;

/// REPL prompt string, printed with no trailing newline before each read.
pub const PROMPT: &str = "> ";

/// Builds the CLI-misuse usage message for more-than-one positional argument.
pub fn usage(progname: &str) -> String {
    format!("Usage: {progname} [script]")
}
