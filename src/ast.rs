// ABOUTME: Abstract syntax tree node definitions for expressions and statements

use crate::token::Token;
use crate::value::Value;

/// An expression node. Recursive fields are boxed, the same way the
/// teacher's `Value::Lambda { body: Box<Value>, .. }` boxes a recursive
/// payload to keep the enum's size bounded.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Grouping(Box<Expr>),
    Unary(Token, Box<Expr>),
    Binary(Box<Expr>, Token, Box<Expr>),
    Logical(Box<Expr>, Token, Box<Expr>),
    Comma(Box<Expr>, Token, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Variable(Token),
    Assign(Token, Box<Expr>),
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var(Token, Option<Expr>),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Break(Token),
}

/// An unambiguous pretty-printer used to verify the parser's round-trip
/// property from spec.md §8: printing a parsed `Expr` and feeding the result
/// back through `Parser::expression` yields a structurally equal `Expr`.
///
/// It emits this grammar's own infix syntax rather than an s-expression
/// notation, and relies on a property of this exact recursive-descent
/// parser: wherever a subexpression of lower relative precedence appears as
/// the direct operand of a higher-precedence operator, the only way that
/// tree shape could have been produced is via an explicit `Expr::Grouping`
/// node (the grammar gives no other route there). So reproducing every
/// `Grouping` as literal parens, and every other node with no extra
/// parenthesization, is enough for the printed text to reparse to the same
/// tree — precedence climbing reconstructs exactly the structure that was
/// there, without needing the printer to reason about precedence itself.
pub mod printer {
    use super::*;

    pub fn print_expr(expr: &Expr) -> String {
        match expr {
            Expr::Literal(value) => literal_text(value),
            Expr::Grouping(inner) => format!("({})", print_expr(inner)),
            Expr::Unary(op, right) => format!("{}{}", op.lexeme, print_expr(right)),
            Expr::Binary(left, op, right) => {
                format!("{} {} {}", print_expr(left), op.lexeme, print_expr(right))
            }
            Expr::Logical(left, op, right) => {
                format!("{} {} {}", print_expr(left), op.lexeme, print_expr(right))
            }
            Expr::Comma(left, _op, right) => {
                format!("{}, {}", print_expr(left), print_expr(right))
            }
            Expr::Conditional(cond, then_branch, else_branch) => {
                format!(
                    "{} ? {} : {}",
                    print_expr(cond),
                    print_expr(then_branch),
                    print_expr(else_branch)
                )
            }
            Expr::Variable(name) => name.lexeme.clone(),
            Expr::Assign(name, value) => format!("{} = {}", name.lexeme, print_expr(value)),
        }
    }

    fn literal_text(value: &Value) -> String {
        match value {
            Value::String(s) => format!("\"{s}\""),
            other => format!("{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::printer::print_expr;
    use super::*;
    use crate::token::TokenKind;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, None, 1)
    }

    #[test]
    fn prints_binary_expression_as_infix() {
        let expr = Expr::Binary(
            Box::new(Expr::Literal(Value::Number(1.0))),
            tok(TokenKind::Plus, "+"),
            Box::new(Expr::Binary(
                Box::new(Expr::Literal(Value::Number(2.0))),
                tok(TokenKind::Star, "*"),
                Box::new(Expr::Literal(Value::Number(3.0))),
            )),
        );
        assert_eq!(print_expr(&expr), "1 + 2 * 3");
    }

    #[test]
    fn prints_unary_and_grouping() {
        let expr = Expr::Unary(
            tok(TokenKind::Minus, "-"),
            Box::new(Expr::Grouping(Box::new(Expr::Literal(Value::Number(5.0))))),
        );
        assert_eq!(print_expr(&expr), "-(5)");
    }

    #[test]
    fn prints_string_literal_with_quotes() {
        let expr = Expr::Literal(Value::String("hi".to_string()));
        assert_eq!(print_expr(&expr), "\"hi\"");
    }
}
