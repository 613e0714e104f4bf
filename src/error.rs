// ABOUTME: Error types for parse and runtime failures in the interpreter

use crate::token::Token;
use thiserror::Error;

/// A parse error, raised as a recoverable signal from within expression or
/// statement parsing and caught at the `declaration` boundary (spec.md §4.2,
/// §7). Carries the token the parser was looking at for location reporting.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub token: Token,
}

impl ParseError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            token: token.clone(),
        }
    }
}

/// A runtime error carrying the line of the offending token, per spec.md
/// §4.4. Raised by the evaluator, propagated with `?`, and caught only at
/// the outermost `interpret` call for one top-level run (spec.md §7).
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
            line: token.line,
        }
    }

    pub fn undefined_variable(name_token: &Token) -> Self {
        RuntimeError::new(
            name_token,
            format!("Undefined variable '{}'.", name_token.lexeme),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn undefined_variable_message_includes_name() {
        let token = Token::new(TokenKind::Identifier, "missing", None, 5);
        let err = RuntimeError::undefined_variable(&token);
        assert_eq!(err.message, "Undefined variable 'missing'.");
        assert_eq!(err.line, 5);
    }
}
