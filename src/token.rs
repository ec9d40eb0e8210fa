use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Lox scanner.
///
/// Literal payloads live on [`Token::literal`], so the kind itself is a plain
/// `Copy` tag that can be compared and hashed freely.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal; the unquoted contents are in [`Token::literal`]
    STRING,

    /// A numeric literal; the parsed value is in [`Token::literal`]
    NUMBER,

    /// 'and'
    AND,

    /// 'class'
    CLASS,

    /// 'else'
    ELSE,

    /// 'false'
    FALSE,

    /// 'fun'
    FUN,

    /// 'for'
    FOR,

    /// 'if'
    IF,

    /// 'nil'
    NIL,

    /// 'or'
    OR,

    /// 'print'
    PRINT,

    /// 'return'
    RETURN,

    /// 'super'
    SUPER,

    /// 'this'
    THIS,

    /// 'true'
    TRUE,

    /// 'var'
    VAR,

    /// 'while'
    WHILE,

    /// Spaces, tabs and carriage returns
    WHITESPACE,

    /// A single '\n'
    NEWLINE,

    /// `// …` up to (not including) the end of the line
    COMMENT,

    /// End‑of‑file marker
    EOF,
}

/// Variant names double as the `tokenize` output names.
impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Literal payload carried by `STRING` and `NUMBER` tokens.
///
/// String contents borrow from the source buffer (quotes excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal<'a> {
    Number(f64),
    Str(&'a str),
}

/// A scanned token, including its type, the original lexeme, an optional
/// literal value and the line number where it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// Parsed literal for `STRING` / `NUMBER`, `None` otherwise.
    pub literal: Option<Literal<'a>>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new token without a literal payload.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize) -> Self {
        Self {
            token_type,
            lexeme,
            literal: None,
            line,
        }
    }

    /// Create a `STRING` / `NUMBER` token.
    pub fn with_literal(
        token_type: TokenType,
        lexeme: &'a str,
        literal: Literal<'a>,
        line: usize,
    ) -> Self {
        Self {
            token_type,
            lexeme,
            literal: Some(literal),
            line,
        }
    }

    /// Whitespace, newlines and comments carry no meaning for the parser.
    pub fn is_semantic(&self) -> bool {
        !matches!(
            self.token_type,
            TokenType::WHITESPACE | TokenType::NEWLINE | TokenType::COMMENT
        )
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.token_type;

        match self.literal {
            Some(Literal::Str(s)) => write!(f, "{} {} {}", name, self.lexeme, s),

            // 3 → "3.0", 3.14 → "3.14"
            Some(Literal::Number(n)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                let mut buf = itoa::Buffer::new();
                write!(f, "{} {} {}.0", name, self.lexeme, buf.format(n as i64))
            }

            Some(Literal::Number(n)) => write!(f, "{} {} {}", name, self.lexeme, n),

            None => write!(f, "{} {} null", name, self.lexeme),
        }
    }
}
