//! Runs source text through every stage against one long‑lived interpreter.
//!
//! A script is one [`Session::run`]; the REPL calls it once per line, so
//! globals defined on one line are visible on the next.  Tokens and
//! statements borrow the source, and closures created by a run can outlive
//! it, so each run's source, tokens and tree are kept alive until the
//! process exits.

use std::io::{self, Stdout, Write};

use log::{debug, info};

use crate::ast::Stmt;
use crate::diagnostic::Reporter;
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::token::Token;

/// What happened during one [`Session::run`].
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// A lexical, syntactic or static error was reported; nothing ran.
    pub had_error: bool,

    pub had_runtime_error: bool,

    /// Number of lexical, syntactic and static errors reported.
    pub error_count: usize,

    runtime: Option<LoxError>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        !self.had_error && !self.had_runtime_error
    }

    /// Static errors win over a runtime error; the two never both occur
    /// in one run.
    pub fn into_result(self) -> Result<()> {
        if self.had_error {
            return Err(LoxError::Static {
                count: self.error_count,
            });
        }

        match self.runtime {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub struct Session<W: Write = Stdout> {
    interpreter: Interpreter<'static, W>,
}

impl Session<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Session<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(out: W) -> Self {
        info!("Starting session");

        Session {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Whatever `print` has written so far.
    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    /// Scan, parse, resolve and execute `source`.  Every error is handed to
    /// `reporter`; the returned outcome says which kinds occurred.
    pub fn run<R: Reporter>(&mut self, source: impl Into<String>, reporter: &mut R) -> RunOutcome {
        let source: &'static str = Box::leak(source.into().into_boxed_str());
        let mut outcome = RunOutcome::default();

        debug!("Running {} byte(s) of source", source.len());

        let (tokens, lex_errors) = scan_tokens(source);
        for err in &lex_errors {
            reporter.report(err.line, "", &err.message);
        }
        outcome.error_count += lex_errors.len();

        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        let mut statements = Vec::new();
        for result in Parser::new(tokens).parse() {
            match result {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    reporter.report(err.token.line, &err.location(), &err.message);
                    outcome.error_count += 1;
                }
            }
        }

        if outcome.error_count > 0 {
            info!("Skipping execution after {} error(s)", outcome.error_count);

            outcome.had_error = true;
            return outcome;
        }

        let statements: &'static [Stmt<'static>] = Box::leak(statements.into_boxed_slice());

        match Resolver::new().resolve(statements) {
            Ok(locals) => self.interpreter.resolve(locals),
            Err(errors) => {
                for err in &errors {
                    reporter.report(err.token.line, &err.location(), &err.message);
                }

                outcome.error_count += errors.len();
                outcome.had_error = true;
                return outcome;
            }
        }

        if let Err(err) = self.interpreter.interpret(statements) {
            reporter.runtime_error(&err);

            outcome.had_runtime_error = true;
            outcome.runtime = Some(err.into());
        }

        outcome
    }
}
