//! Error hierarchy for the **Lox interpreter**.
//!
//! Every pipeline stage has its own failure type and they are never merged:
//!
//! * [`LexError`]: produced by the scanner, one per bad character or
//!   unterminated string; scanning continues past it.
//! * [`ParseError`]: produced by the parser, one per failed top‑level
//!   declaration; parsing resumes at the next statement boundary.
//! * [`RuntimeError`]: produced by the resolver (static checks) and the
//!   interpreter; aborts the current run.
//!
//! [`LoxError`] is the owned, lifetime‑free summary used at the CLI boundary
//! where `anyhow` takes over.
//!
//! The module **does not** print diagnostics itself.

use std::io;

use log::debug;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Lexical (scanner) error with source line information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct LexError {
    /// 1‑based line where the error occurred.
    pub line: usize,

    /// Human‑readable description.
    pub message: String,
}

impl LexError {
    pub fn new<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        Self { line, message }
    }
}

/// Syntactic error anchored at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] Error{}: {}", .token.line, location(.token), .message)]
pub struct ParseError<'a> {
    pub token: Token<'a>,
    pub message: String,
}

impl<'a> ParseError<'a> {
    pub fn new<S: Into<String>>(token: &Token<'a>, msg: S) -> Self {
        let message: String = msg.into();

        debug!(
            "Creating Parse error: line={}, lexeme={:?}, msg={}",
            token.line, token.lexeme, message
        );

        Self {
            token: token.clone(),
            message,
        }
    }

    /// `" at 'x'"` or `" at end"`, ready to splice after `Error`.
    pub fn location(&self) -> String {
        location(&self.token)
    }
}

/// Runtime (or resolver‑time) failure anchored at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}\n[line {}]", .message, .token.line)]
pub struct RuntimeError<'a> {
    pub token: Token<'a>,
    pub message: String,
}

impl<'a> RuntimeError<'a> {
    pub fn new<S: Into<String>>(token: &Token<'a>, msg: S) -> Self {
        let message: String = msg.into();

        debug!(
            "Creating Runtime error: line={}, lexeme={:?}, msg={}",
            token.line, token.lexeme, message
        );

        Self {
            token: token.clone(),
            message,
        }
    }

    pub fn location(&self) -> String {
        location(&self.token)
    }
}

fn location(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Owned summary of a failed run, free of source lifetimes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// One or more lexical, syntactic or static errors were reported.
    #[error("{count} error(s) reported before execution")]
    Static { count: usize },

    /// Execution stopped on a runtime error.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl LoxError {
    /// Conventional `sysexits` code: 65 for bad input, 70 for runtime faults,
    /// 74 for I/O.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Static { .. } | LoxError::Utf8(_) => 65,
            LoxError::Runtime { .. } => 70,
            LoxError::Io(_) => 74,
        }
    }
}

impl<'a> From<RuntimeError<'a>> for LoxError {
    fn from(err: RuntimeError<'a>) -> Self {
        LoxError::Runtime {
            message: err.message,
            line: err.token.line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
