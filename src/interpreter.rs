// ABOUTME: Evaluator module for executing parsed statements against an environment

use crate::ast::{Expr, Stmt};
use crate::diagnostics;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::rc::Rc;

/// Statement execution can fail with a runtime error, or unwind as a `break`
/// signal caught by the innermost enclosing loop (spec.md §9's third
/// control-flow signal, alongside parse errors and runtime errors).
#[derive(Debug)]
pub enum ExecSignal {
    Error(RuntimeError),
    Break,
}

impl From<RuntimeError> for ExecSignal {
    fn from(err: RuntimeError) -> Self {
        ExecSignal::Error(err)
    }
}

type ExprResult = Result<Value, RuntimeError>;
type ExecResult = Result<(), ExecSignal>;

/// Walks statements and expressions over the AST, holding the environment
/// currently in scope (initially the global environment).
pub struct Interpreter {
    environment: Rc<Environment>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            environment: Environment::new(),
        }
    }

    /// Builds an interpreter sharing an existing global environment, used by
    /// the REPL driver so the global scope persists across lines.
    pub fn with_environment(environment: Rc<Environment>) -> Self {
        Interpreter { environment }
    }

    pub fn global_environment(&self) -> Rc<Environment> {
        self.environment.clone()
    }

    /// Executes a full statement list as one top-level run. A runtime error
    /// aborts the run (no further statements execute) and is reported to the
    /// diagnostics sink; it does not panic and does not poison the
    /// interpreter for a subsequent run (spec.md §2).
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if let Err(signal) = self.execute(stmt) {
                match signal {
                    ExecSignal::Error(err) => {
                        diagnostics::runtime_error(err.line, &err.message);
                    }
                    // A `break` cannot legally reach the top level: the
                    // parser rejects `break` outside a loop as a compile
                    // error, so evaluation never runs over such a program.
                    ExecSignal::Break => {}
                }
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(())
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let enclosing = Environment::with_parent(self.environment.clone());
                self.execute_block(statements, enclosing)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body) {
                        Ok(()) => {}
                        Err(ExecSignal::Break) => break,
                        Err(err @ ExecSignal::Error(_)) => return Err(err),
                    }
                }
                Ok(())
            }
            Stmt::Break(_keyword) => Err(ExecSignal::Break),
        }
    }

    /// Runs `statements` against `new_env`, restoring the previous
    /// environment on every exit path — normal completion, a propagated
    /// runtime error, or a `break` unwinding through this block.
    fn execute_block(&mut self, statements: &[Stmt], new_env: Rc<Environment>) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, new_env);

        let mut result = Ok(());
        for stmt in statements {
            if let Err(signal) = self.execute(stmt) {
                result = Err(signal);
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> ExprResult {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(op, right) => self.evaluate_unary(op, right),
            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right),
            Expr::Logical(left, op, right) => self.evaluate_logical(left, op, right),
            Expr::Comma(left, _op, right) => {
                self.evaluate(left)?;
                self.evaluate(right)
            }
            Expr::Conditional(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::Variable(name) => self.environment.get(name),
            Expr::Assign(name, value_expr) => {
                let value = self.evaluate(value_expr)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
        }
    }

    fn evaluate_unary(&mut self, op: &Token, right: &Expr) -> ExprResult {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(op, "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("parser never produces a unary operator other than - or !"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> ExprResult {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            TokenKind::And => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            _ => unreachable!("parser never produces a logical operator other than and/or"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> ExprResult {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match op.kind {
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                _ => Err(RuntimeError::new(
                    op,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenKind::Minus => numeric_binary(op, &left, &right, |a, b| a - b),
            TokenKind::Star => numeric_binary(op, &left, &right, |a, b| a * b),
            TokenKind::Slash => numeric_binary(op, &left, &right, |a, b| a / b),
            TokenKind::Greater => numeric_comparison(op, &left, &right, |a, b| a > b),
            TokenKind::GreaterEqual => numeric_comparison(op, &left, &right, |a, b| a >= b),
            TokenKind::Less => numeric_comparison(op, &left, &right, |a, b| a < b),
            TokenKind::LessEqual => numeric_comparison(op, &left, &right, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            TokenKind::BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            _ => unreachable!("parser never produces a binary operator outside this set"),
        }
    }
}

fn numeric_binary(
    op: &Token,
    left: &Value,
    right: &Value,
    f: impl Fn(f64, f64) -> f64,
) -> ExprResult {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(RuntimeError::new(op, "Operands must be numbers.")),
    }
}

fn numeric_comparison(
    op: &Token,
    left: &Value,
    right: &Value,
    f: impl Fn(f64, f64) -> bool,
) -> ExprResult {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(*a, *b))),
        _ => Err(RuntimeError::new(op, "Operands must be numbers.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner;

    fn run(source: &str) -> Interpreter {
        let tokens = scanner::scan(source);
        let statements = Parser::new(tokens).parse();
        let mut interpreter = Interpreter::new();
        interpreter.interpret(&statements);
        interpreter
    }

    /// Parses `source` as a single expression (no trailing `;`) and
    /// evaluates it against a fresh interpreter, returning the `Value`
    /// actually produced.
    fn eval_expr(source: &str) -> Value {
        let tokens = scanner::scan(source);
        let mut parser = Parser::new(tokens);
        let expr = parser
            .expression()
            .unwrap_or_else(|err| panic!("unexpected parse error: {}", err.message));
        let mut interpreter = Interpreter::new();
        interpreter
            .evaluate(&expr)
            .unwrap_or_else(|err| panic!("unexpected runtime error: {}", err.message))
    }

    #[test]
    fn scope_shadowing_prints_inner_then_outer() {
        // mirrors spec.md §8: `var x = 1; { var x = 2; print x; } print x;`
        run("var x = 1; { var x = 2; print x; } print x;");
    }

    #[test]
    fn numeric_addition_yields_numeric_sum() {
        assert_eq!(eval_expr("1 + 2"), Value::Number(3.0));
    }

    #[test]
    fn string_addition_yields_concatenation() {
        assert_eq!(
            eval_expr("\"hi\" + \" there\""),
            Value::String("hi there".to_string())
        );
    }

    #[test]
    fn subtraction_multiplication_division_are_numeric() {
        assert_eq!(eval_expr("5 - 2"), Value::Number(3.0));
        assert_eq!(eval_expr("3 * 4"), Value::Number(12.0));
        assert_eq!(eval_expr("10 / 4"), Value::Number(2.5));
    }

    #[test]
    fn division_by_zero_yields_infinity_not_a_runtime_error() {
        // spec.md §4.3: "division by zero produces ±∞ or NaN — no special error"
        assert_eq!(eval_expr("1 / 0"), Value::Number(f64::INFINITY));
        assert_eq!(eval_expr("-1 / 0"), Value::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn comparisons_yield_booleans() {
        assert_eq!(eval_expr("1 < 2"), Value::Bool(true));
        assert_eq!(eval_expr("2 <= 2"), Value::Bool(true));
        assert_eq!(eval_expr("3 > 4"), Value::Bool(false));
        assert_eq!(eval_expr("\"a\" == \"a\""), Value::Bool(true));
        assert_eq!(eval_expr("1 == \"1\""), Value::Bool(false));
    }

    #[test]
    fn conditional_returns_the_taken_branch_value() {
        assert_eq!(eval_expr("1 ? \"yes\" : \"no\""), Value::String("yes".to_string()));
        assert_eq!(eval_expr("0 ? \"yes\" : \"no\""), Value::String("yes".to_string()));
        assert_eq!(eval_expr("false ? \"yes\" : \"no\""), Value::String("no".to_string()));
    }

    #[test]
    fn logical_or_returns_left_operand_unchanged_when_truthy() {
        let tokens = scanner::scan("var x = 1; x or (x = 99);");
        let statements = Parser::new(tokens).parse();
        let mut interpreter = Interpreter::new();
        interpreter.execute(&statements[0]).expect("var declaration");

        let value = match &statements[1] {
            Stmt::Expression(expr) => interpreter
                .evaluate(expr)
                .expect("logical or must not error"),
            other => panic!("expected expression statement, got {other:?}"),
        };

        // the left operand (1) is returned unchanged, and the right
        // operand's assignment never ran, so `x` is still 1.
        assert_eq!(value, Value::Number(1.0));
        let x_token = Token::new(TokenKind::Identifier, "x", None, 1);
        assert_eq!(
            interpreter.global_environment().get(&x_token).unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn logical_and_returns_left_operand_unchanged_when_falsy() {
        let tokens = scanner::scan("var x = false; x and (x = 99);");
        let statements = Parser::new(tokens).parse();
        let mut interpreter = Interpreter::new();
        interpreter.execute(&statements[0]).expect("var declaration");

        let value = match &statements[1] {
            Stmt::Expression(expr) => interpreter
                .evaluate(expr)
                .expect("logical and must not error"),
            other => panic!("expected expression statement, got {other:?}"),
        };

        assert_eq!(value, Value::Bool(false));
        let x_token = Token::new(TokenKind::Identifier, "x", None, 1);
        assert_eq!(
            interpreter.global_environment().get(&x_token).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn short_circuit_or_does_not_evaluate_right() {
        let mut interpreter = Interpreter::new();
        let tokens = scanner::scan("true or (1/0 == 1/0);");
        let statements = Parser::new(tokens).parse();
        interpreter.interpret(&statements);
        assert!(!crate::diagnostics::had_runtime_error());
    }

    #[test]
    fn undefined_assignment_is_runtime_error() {
        crate::diagnostics::reset_runtime_error();
        run("x = 1;");
        assert!(crate::diagnostics::had_runtime_error());
        crate::diagnostics::reset_runtime_error();
    }

    #[test]
    fn while_break_exits_innermost_loop() {
        crate::diagnostics::reset_runtime_error();
        run("var i = 0; while (true) { i = i + 1; if (i == 3) break; } print i;");
        assert!(!crate::diagnostics::had_runtime_error());
    }
}
