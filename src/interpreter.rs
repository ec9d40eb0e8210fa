//! Tree‑walking evaluator.
//!
//! Statements execute to a three‑way outcome: `Ok(Flow::Normal)`,
//! `Ok(Flow::Return(v))` while a `return` is travelling up to its call, or
//! `Err(RuntimeError)`. Blocks, `if` and `while` hand a `Return` straight
//! back to their caller, and only [`Interpreter::call`] turns it into a value,
//! so the unwind stops exactly at the nearest function boundary.

use std::io::{self, Stdout, Write};
use std::mem;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{Expr, ExprKind, FunctionDecl, LiteralValue, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::resolver::Locals;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::{Callable, Function, NativeFunction, Value};

/// How a statement finished when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
}

/// Result of evaluating or executing one node.
pub type IResult<'a, T> = Result<T, RuntimeError<'a>>;
type Exec<'a> = IResult<'a, Flow<'a>>;

/// Deepest chain of active user-function calls before `Stack overflow.`
pub const MAX_CALL_DEPTH: usize = 1024;

pub struct Interpreter<'a, W: Write = Stdout> {
    globals: EnvRef<'a>,
    environment: EnvRef<'a>,
    locals: Locals,
    call_depth: usize,
    out: W,
}

impl<'a> Interpreter<'a, Stdout> {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl<'a> Default for Interpreter<'a, Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Interpreter whose `print` output goes to `out`; globals are seeded
    /// with the native functions.
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
            call_depth: 0,
            out,
        }
    }

    /// Merge binding distances produced by the resolver.  Must happen before
    /// the statements they describe are executed.
    pub fn resolve(&mut self, locals: Locals) {
        debug!("Recording {} resolved local(s)", locals.len());

        self.locals.extend(locals);
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute a program.  The first runtime error aborts the remaining
    /// statements and is returned.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> IResult<'a, ()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            // The resolver rejects top‑level `return`, so nothing reaches here
            // that would need a call boundary.
            if let Flow::Return(_) = self.execute(stmt)? {
                break;
            }
        }

        self.out.flush().map_err(|e| io_error(e, None))?;

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> Exec<'a> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &'a Stmt<'a>) -> Exec<'a> {
        match stmt {
            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();

                self.execute_block(statements, frame)
            }

            Stmt::Class { name, .. } => Err(unsupported(name)),

            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = self.closure_over(decl);
                self.environment
                    .borrow_mut()
                    .define(decl.name.lexeme, function);

                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Print { keyword, value } => {
                let value = self.evaluate(value)?;

                writeln!(self.out, "{}", value).map_err(|e| io_error(e, Some(*keyword)))?;

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }

                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` with `frame` as the current environment.  The
    /// previous environment is restored on every exit path: normal
    /// completion, `return`, or error.
    pub fn execute_block(&mut self, statements: &'a [Stmt<'a>], frame: EnvRef<'a>) -> Exec<'a> {
        let previous = mem::replace(&mut self.environment, frame);

        let result = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &'a [Stmt<'a>]) -> Exec<'a> {
        for stmt in statements {
            if let flow @ Flow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }

        Ok(Flow::Normal)
    }

    fn closure_over(&self, decl: &'a FunctionDecl<'a>) -> Value<'a> {
        Value::Callable(Callable::Function(Rc::new(Function {
            declaration: decl,
            closure: Rc::clone(&self.environment),
        })))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> IResult<'a, Value<'a>> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &'a Expr<'a>) -> IResult<'a, Value<'a>> {
        match &expr.kind {
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(&expr.id) {
                    Some(&hops) => {
                        Environment::assign_at(&self.environment, hops, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                binary(operator, left, right)
            }

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let Value::Callable(callable) = callee else {
                    return Err(RuntimeError::new(paren, "Can only call functions and classes."));
                };

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                if args.len() != callable.arity() {
                    debug!(
                        "Arity mismatch calling '{}': expected {}, got {}",
                        callable.name(),
                        callable.arity(),
                        args.len()
                    );

                    return Err(RuntimeError::new(paren, "Can only call functions and classes."));
                }

                self.call(&callable, paren, args)
            }

            ExprKind::Get { name, .. } => Err(unsupported(name)),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(*s),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuits = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            ExprKind::Super { keyword, .. } | ExprKind::This(keyword) => Err(unsupported(keyword)),

            ExprKind::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match (operator.token_type, right) {
                    (TokenType::BANG, value) => Ok(Value::Bool(!value.is_truthy())),
                    (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
                    (TokenType::MINUS, value) => Err(RuntimeError::new(
                        operator,
                        format!("Operand must be a number, got {}.", describe(&value)),
                    )),
                    _ => Err(RuntimeError::new(operator, "Invalid unary operator.")),
                }
            }

            ExprKind::Variable(name) => self.look_up_variable(name, expr),
        }
    }

    fn look_up_variable(&self, name: &Token<'a>, expr: &Expr<'a>) -> IResult<'a, Value<'a>> {
        match self.locals.get(&expr.id) {
            Some(&hops) => Environment::get_at(&self.environment, hops, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Invoke a callable whose arity has already been checked.
    pub fn call(
        &mut self,
        callable: &Callable<'a>,
        paren: &Token<'a>,
        args: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        match callable {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                (native.func)(&args).map_err(|msg| RuntimeError::new(paren, msg))
            }

            Callable::Function(function) => {
                let decl = function.declaration;

                debug!("Calling user-defined function '{}'", decl.name.lexeme);

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::new(paren, "Stack overflow."));
                }

                // Parameters live in a frame whose parent is the *closure*,
                // not the caller's frame.
                let mut frame = Environment::with_enclosing(Rc::clone(&function.closure));
                for (param, arg) in decl.params.iter().zip(args) {
                    frame.define(param.lexeme, arg);
                }

                self.call_depth += 1;
                let result = self.execute_block(&decl.body, frame.into_ref());
                self.call_depth -= 1;

                match result? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────────────

fn binary<'a>(op: &Token<'a>, left: Value<'a>, right: Value<'a>) -> IResult<'a, Value<'a>> {
    use Value::{Number, String};

    let value = match (op.token_type, &left, &right) {
        (TokenType::EQUAL_EQUAL, _, _) => Value::Bool(left == right),
        (TokenType::BANG_EQUAL, _, _) => Value::Bool(left != right),

        (TokenType::PLUS, Number(a), Number(b)) => Number(a + b),
        (TokenType::PLUS, String(a), String(b)) => {
            let mut joined = std::string::String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            String(Rc::from(joined))
        }
        (TokenType::PLUS, _, _) => {
            return Err(RuntimeError::new(
                op,
                format!(
                    "Operands must be two numbers or two strings, got {} and {}.",
                    describe(&left),
                    describe(&right)
                ),
            ));
        }

        (TokenType::MINUS, Number(a), Number(b)) => Number(a - b),
        (TokenType::STAR, Number(a), Number(b)) => Number(a * b),
        (TokenType::SLASH, Number(a), Number(b)) => Number(a / b),
        (TokenType::GREATER, Number(a), Number(b)) => Value::Bool(a > b),
        (TokenType::GREATER_EQUAL, Number(a), Number(b)) => Value::Bool(a >= b),
        (TokenType::LESS, Number(a), Number(b)) => Value::Bool(a < b),
        (TokenType::LESS_EQUAL, Number(a), Number(b)) => Value::Bool(a <= b),

        (
            TokenType::MINUS
            | TokenType::STAR
            | TokenType::SLASH
            | TokenType::GREATER
            | TokenType::GREATER_EQUAL
            | TokenType::LESS
            | TokenType::LESS_EQUAL,
            _,
            _,
        ) => {
            return Err(RuntimeError::new(
                op,
                format!(
                    "Operands must be numbers, got {} and {}.",
                    describe(&left),
                    describe(&right)
                ),
            ));
        }

        _ => return Err(RuntimeError::new(op, "Invalid binary operator.")),
    };

    Ok(value)
}

/// Operand rendering for type errors; strings are quoted so `"1"` and `1`
/// read differently.
fn describe(value: &Value<'_>) -> std::string::String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

fn unsupported<'a>(token: &Token<'a>) -> RuntimeError<'a> {
    RuntimeError::new(token, "Classes are not supported yet.")
}

fn io_error<'a>(err: io::Error, at: Option<&Token<'a>>) -> RuntimeError<'a> {
    let message = format!("Failed to write output: {}", err);

    match at {
        Some(token) => RuntimeError::new(token, message),
        None => RuntimeError::new(&Token::new(TokenType::EOF, "", 0), message),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native functions
// ─────────────────────────────────────────────────────────────────────────────

/// Seconds since the Unix epoch, with millisecond resolution.
fn clock<'a>(_args: &[Value<'a>]) -> Result<Value<'a>, std::string::String> {
    let millis = Utc::now().timestamp_millis();

    Ok(Value::Number(millis as f64 / 1000.0))
}
