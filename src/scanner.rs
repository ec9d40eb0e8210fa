//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms a source `&str` into a sequence of `Token<'a>`s, emitting
//! exactly one `EOF` token at the end. Designed as a `FusedIterator`, it can be
//! chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, LexError>` on each `.next()`. A bad character
//!   produces one `Err` and scanning continues with the next character.
//!
//! - `scan_tokens(src) -> (Vec<Token>, Vec<LexError>)`
//!   Drains a scanner, keeping only the semantic tokens the parser consumes.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators by maximal munch: `!=`, `==`, `<=`, `>=`.
//! - Whitespace runs, newlines and `//` comments are emitted as
//!   `WHITESPACE`, `NEWLINE` and `COMMENT` tokens so tooling can recover them.
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer part, then `.` + fraction only if a digit follows.
//! - Identifiers/keywords: alphanumeric/_ runs, resolved via a perfect‑hash `KEYWORDS` map.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::LexError;
use crate::token::{Literal, Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.  The lifetime `'a` ties every emitted token’s
/// `lexeme` slice back to the original source buffer.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize, // byte index of the first byte of the current lexeme
    curr: usize,  // byte index one past the last byte examined
    line: usize,  // 1‑based line counter
    done: bool,   // EOF already emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes()[self.curr]
        }
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Consume the current byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn lexeme(&self) -> &'a str {
        &self.src[self.start..self.curr]
    }

    fn token(&self, token_type: TokenType) -> Token<'a> {
        Token::new(token_type, self.lexeme(), self.line)
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan exactly one token (semantic or not) starting at `self.curr`.
    fn scan_token(&mut self) -> Result<Token<'a>, LexError> {
        let b = self.advance();

        let tt = match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            // ── two‑character operators (!=, ==, <=, >=) ─────────────────
            b'!' if self.match_byte(b'=') => TokenType::BANG_EQUAL,
            b'!' => TokenType::BANG,
            b'=' if self.match_byte(b'=') => TokenType::EQUAL_EQUAL,
            b'=' => TokenType::EQUAL,
            b'<' if self.match_byte(b'=') => TokenType::LESS_EQUAL,
            b'<' => TokenType::LESS,
            b'>' if self.match_byte(b'=') => TokenType::GREATER_EQUAL,
            b'>' => TokenType::GREATER,

            // ── comments (// … until newline) ────────────────────────────
            b'/' if self.match_byte(b'/') => {
                // The newline itself is left for its own NEWLINE token.
                match memchr(b'\n', &self.bytes()[self.curr..]) {
                    Some(pos) => self.curr += pos,
                    None => self.curr = self.src.len(),
                }

                TokenType::COMMENT
            }
            b'/' => TokenType::SLASH,

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                while matches!(self.peek(), b' ' | b'\r' | b'\t') {
                    self.advance();
                }

                TokenType::WHITESPACE
            }

            b'\n' => {
                let token = self.token(TokenType::NEWLINE);
                self.line += 1;

                return Ok(token);
            }

            b'"' => return self.string(),

            b'0'..=b'9' => return Ok(self.number()),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // Swallow the whole UTF‑8 sequence so one bad character
                // produces exactly one error.
                let c = self.src[self.start..].chars().next().unwrap_or('\u{FFFD}');
                self.curr = self.start + c.len_utf8();

                return Err(LexError::new(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        Ok(self.token(tt))
    }

    /// Scan a double‑quoted string literal; `self.start` points at the opening `"`.
    fn string(&mut self) -> Result<Token<'a>, LexError> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LexError::new(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let contents = &self.src[self.start + 1..self.curr - 1];

        Ok(Token::with_literal(
            TokenType::STRING,
            self.lexeme(),
            Literal::Str(contents),
            self.line,
        ))
    }

    /// Scan a numeric literal (`123`, `3.14`).  A trailing `.` without a digit
    /// after it is not part of the number.
    fn number(&mut self) -> Token<'a> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Only ASCII digits and at most one '.', so parsing cannot fail.
        let n: f64 = self.lexeme().parse::<f64>().unwrap_or(0.0);

        Token::with_literal(TokenType::NUMBER, self.lexeme(), Literal::Number(n), self.line)
    }

    /// Longest alphanumeric/underscore run, checked against the keyword table.
    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        KEYWORDS
            .get(self.lexeme())
            .copied()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.is_at_end() {
            self.done = true;
            debug!("Emitting EOF on line {}", self.line);

            return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
        }

        self.start = self.curr;

        let result = self.scan_token();

        if let Ok(token) = &result {
            debug!("Scanned token ({:?}) on line {}", token.token_type, token.line);
        }

        Some(result)
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan all of `src`, dropping whitespace, newline and comment tokens.
///
/// The token vector always ends with `EOF`; lexical errors are returned in
/// source order alongside it.
pub fn scan_tokens(src: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for result in Scanner::new(src) {
        match result {
            Ok(token) if token.is_semantic() => tokens.push(token),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scanned {} semantic token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}
