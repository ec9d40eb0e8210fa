//! Where error reports go.
//!
//! The pipeline never prints.  Each stage hands its failures to a
//! [`Reporter`], and the driver picks the implementation: a stream writer
//! for the CLI, or [`CollectingReporter`] when the caller wants to inspect
//! what was reported.

use std::fmt;
use std::io::{self, Write};

use log::debug;

use crate::error::RuntimeError;

/// Sink for diagnostics from every stage.
pub trait Reporter {
    /// Report a lexical, syntactic or static error.  `location` is either
    /// empty, `" at end"`, or `" at 'lexeme'"`.
    fn report(&mut self, line: usize, location: &str, message: &str);

    /// Report the error that stopped execution.
    fn runtime_error(&mut self, err: &RuntimeError<'_>) {
        self.report(err.token.line, "", &err.message);
    }
}

/// Which stage produced a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Static,
    Runtime,
}

/// An owned record of one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Static => write!(
                f,
                "[line {}] Error{}: {}",
                self.line, self.location, self.message
            ),
            Stage::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
        }
    }
}

/// Writes each report as one line of text and counts them.
pub struct StreamReporter<W: Write> {
    writer: W,
    count: usize,
}

/// The reporter the CLI uses.
pub type StderrReporter = StreamReporter<io::Stderr>;

impl StreamReporter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> StreamReporter<W> {
    pub fn new(writer: W) -> Self {
        StreamReporter { writer, count: 0 }
    }

    /// Number of reports written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.count += 1;

        // Nowhere left to report a failure to write a report.
        let _ = writeln!(self.writer, "{}", diagnostic);
    }
}

impl<W: Write> Reporter for StreamReporter<W> {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        self.emit(&Diagnostic {
            stage: Stage::Static,
            line,
            location: location.to_string(),
            message: message.to_string(),
        });
    }

    fn runtime_error(&mut self, err: &RuntimeError<'_>) {
        self.emit(&Diagnostic {
            stage: Stage::Runtime,
            line: err.token.line,
            location: String::new(),
            message: err.message.clone(),
        });
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered reports, in the order they arrived.
    pub fn lines(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        debug!("Collected diagnostic at line {}: {}", line, message);

        self.diagnostics.push(Diagnostic {
            stage: Stage::Static,
            line,
            location: location.to_string(),
            message: message.to_string(),
        });
    }

    fn runtime_error(&mut self, err: &RuntimeError<'_>) {
        debug!("Collected runtime error at line {}", err.token.line);

        self.diagnostics.push(Diagnostic {
            stage: Stage::Runtime,
            line: err.token.line,
            location: String::new(),
            message: err.message.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};

    #[test]
    fn stream_reporter_renders_and_counts() {
        let mut reporter = StreamReporter::new(Vec::new());
        reporter.report(3, " at 'x'", "Expected ';' after value.");

        let token = Token::new(TokenType::IDENTIFIER, "y", 7);
        reporter.runtime_error(&RuntimeError::new(&token, "Undefined variable 'y'."));

        assert_eq!(reporter.count(), 2);
        assert_eq!(
            String::from_utf8(reporter.into_inner()).unwrap(),
            "[line 3] Error at 'x': Expected ';' after value.\nUndefined variable 'y'.\n[line 7]\n"
        );
    }
}
