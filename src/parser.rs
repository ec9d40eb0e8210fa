/*!
Recursive‑descent parser for Lox.

Time & Space Complexity
-----------------------
* **n** = number of tokens (including the sole EOF).

Each token is consumed once via `advance()`; error recovery (`synchronize`)
only ever moves forward, so a whole parse is **Θ(n)**. The AST borrows its
tokens from the scanner's output, so the only allocations are one `Box` per
interior node plus the argument/statement vectors.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `synchronize` | `debug`| Descent into grammar branches, recovery.  |

Grammar (EBNF)
--------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT ( "<" IDENT )? "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | forStmt | ifStmt | printStmt
               | returnStmt | whileStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
returnStmt     → "return" expression? ";" ;
whileStmt      → "while" "(" expression ")" statement ;
block          → "{" declaration* "}" ;
expression     → assignment ;
assignment     → IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
arguments      → expression ( "," expression )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | IDENT | "(" expression ")" | "super" "." IDENT ;
```

`for` loops are lowered here into `Block` + `While`; no later stage ever
sees them.
*/

use crate::ast::{Expr, ExprKind, FunctionDecl, LiteralValue, Stmt};
use crate::error::ParseError;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Literal, Token, TokenType};

use log::{debug, info};

/// Maximum number of call arguments / function parameters.
pub const MAX_ARITY: usize = 255;

type PResult<'a, T> = Result<T, ParseError<'a>>;

/// Stands in for the end of input when the slice has no trailing `EOF`.
static END: Token<'static> = Token {
    token_type: TokenType::EOF,
    lexeme: "",
    literal: None,
    line: 0,
};

/// Top‑level parser over an immutable slice of semantic tokens.
///
/// The slice normally ends with the `EOF` token that
/// [`crate::scanner::scan_tokens`] produces; running off the end of a slice
/// without one reads as end of input.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,

    /// First error recovered from inside a block of the declaration being
    /// parsed.  Later ones in the same declaration are dropped.
    nested_error: Option<ParseError<'a>>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            nested_error: None,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program: one entry per top‑level declaration, errors
    /// included, so that every independent mistake surfaces in one pass.
    pub fn parse(&mut self) -> Vec<PResult<'a, Stmt<'a>>> {
        info!("Beginning parse phase");

        let results: Vec<_> = self.by_ref().collect();

        info!(
            "Parsed {} declaration(s), {} with errors",
            results.len(),
            results.iter().filter(|r| r.is_err()).count()
        );

        results
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> PResult<'a, Stmt<'a>> {
        ensure_sufficient_stack(|| self.declaration_inner())
    }

    fn declaration_inner(&mut self) -> PResult<'a, Stmt<'a>> {
        debug!("Entering declaration at line {}", self.peek().line);

        if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenType::FUN) {
            Ok(Stmt::Function(self.function("function")?))
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> PResult<'a, Stmt<'a>> {
        let name = self.consume(TokenType::IDENTIFIER, "Expected class name.")?;

        let superclass = if self.matches(TokenType::LESS) {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expected superclass name.")?;
            Some(Expr::new(ExprKind::Variable(super_name)))
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before class body.")?;

        let mut methods = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn function(&mut self, kind: &str) -> PResult<'a, FunctionDecl<'a>> {
        let name = self.consume(TokenType::IDENTIFIER, &format!("Expected {} name.", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expected '(' after {} name.", kind),
        )?;

        let mut params: Vec<&'a Token<'a>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    return Err(ParseError::new(
                        self.peek(),
                        "Can't have more than 255 parameters.",
                    ));
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expected parameter name.")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters.")?;
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body.", kind),
        )?;

        let body = self.block(&format!("Expected '}}' after {} body.", kind))?;

        Ok(FunctionDecl { name, params, body })
    }

    fn var_declaration(&mut self) -> PResult<'a, Stmt<'a>> {
        let name = self.consume(TokenType::IDENTIFIER, "Expected variable name.")?;

        let initializer = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> PResult<'a, Stmt<'a>> {
        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block("Expected '}' after block.")?))
        } else {
            self.expression_statement()
        }
    }

    /// `for (init; cond; incr) body` becomes
    /// `{ init; while (cond) { body; incr; } }`.
    fn for_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenType::SEMICOLON) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment = if self.check(TokenType::RIGHT_PAREN) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or_else(|| Expr::literal(LiteralValue::Bool(true)));

        let mut lowered = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            lowered = Stmt::Block(vec![initializer, lowered]);
        }

        debug!("Lowered for loop into while");

        Ok(lowered)
    }

    fn if_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        let keyword = self.previous();
        let value = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print { keyword, value })
    }

    fn return_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        let keyword = self.previous();

        let value = if self.check(TokenType::SEMICOLON) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn expression_statement(&mut self) -> PResult<'a, Stmt<'a>> {
        let expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    /// Declarations up to the closing brace.  A failing declaration is
    /// skipped so the rest of the block stays inside it; the enclosing
    /// top‑level declaration is then reported with its first error only.
    fn block(&mut self, closing: &str) -> PResult<'a, Vec<Stmt<'a>>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.record_nested(err);
                    self.synchronize_in_block();
                }
            }
        }

        self.consume(TokenType::RIGHT_BRACE, closing)?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> PResult<'a, Expr<'a>> {
        ensure_sufficient_stack(|| self.assignment())
    }

    /// The target is checked after the left side is built: only a bare
    /// variable may be assigned to.
    fn assignment(&mut self) -> PResult<'a, Expr<'a>> {
        let expr = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals = self.previous();
            let value = self.assignment()?;

            return match expr.kind {
                ExprKind::Variable(name) => Ok(Expr::new(ExprKind::Assign {
                    name,
                    value: Box::new(value),
                })),

                _ => Err(ParseError::new(equals, "Invalid assignment target.")),
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> PResult<'a, Expr<'a>> {
        let mut expr = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator = self.previous();
            let right = self.logical_and()?;

            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> PResult<'a, Expr<'a>> {
        let mut expr = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator = self.previous();
            let right = self.equality()?;

            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Shared left‑associative loop for the binary precedence levels.
    fn binary_level(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> PResult<'a, Expr<'a>>,
    ) -> PResult<'a, Expr<'a>> {
        let mut expr = next(self)?;

        while self.matches_any(operators) {
            let operator = self.previous();
            let right = next(self)?;

            expr = Expr::new(ExprKind::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> PResult<'a, Expr<'a>> {
        self.binary_level(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> PResult<'a, Expr<'a>> {
        self.binary_level(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> PResult<'a, Expr<'a>> {
        self.binary_level(&[TokenType::MINUS, TokenType::PLUS], Self::factor)
    }

    fn factor(&mut self) -> PResult<'a, Expr<'a>> {
        self.binary_level(&[TokenType::SLASH, TokenType::STAR], Self::unary)
    }

    fn unary(&mut self) -> PResult<'a, Expr<'a>> {
        ensure_sufficient_stack(|| self.unary_inner())
    }

    fn unary_inner(&mut self) -> PResult<'a, Expr<'a>> {
        if self.matches_any(&[TokenType::BANG, TokenType::MINUS]) {
            let operator = self.previous();
            let right = self.unary()?;

            return Ok(Expr::new(ExprKind::Unary {
                operator,
                right: Box::new(right),
            }));
        }

        self.call()
    }

    fn call(&mut self) -> PResult<'a, Expr<'a>> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name = self.consume(TokenType::IDENTIFIER, "Expected property name after '.'.")?;

                expr = Expr::new(ExprKind::Get {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr<'a>) -> PResult<'a, Expr<'a>> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    return Err(ParseError::new(
                        self.peek(),
                        "Can't have more than 255 arguments.",
                    ));
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments.")?;

        Ok(Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> PResult<'a, Expr<'a>> {
        let token = self.peek();

        let kind = match token.token_type {
            TokenType::FALSE => ExprKind::Literal(LiteralValue::Bool(false)),
            TokenType::TRUE => ExprKind::Literal(LiteralValue::Bool(true)),
            TokenType::NIL => ExprKind::Literal(LiteralValue::Nil),

            TokenType::NUMBER | TokenType::STRING => match token.literal {
                Some(Literal::Number(n)) => ExprKind::Literal(LiteralValue::Number(n)),
                Some(Literal::Str(s)) => ExprKind::Literal(LiteralValue::Str(s)),
                None => return Err(ParseError::new(token, "Malformed literal.")),
            },

            TokenType::IDENTIFIER => ExprKind::Variable(token),
            TokenType::THIS => ExprKind::This(token),

            TokenType::SUPER => {
                self.advance();
                self.consume(TokenType::DOT, "Expected '.' after 'super'.")?;
                let method = self.consume(TokenType::IDENTIFIER, "Expected superclass method name.")?;

                return Ok(Expr::new(ExprKind::Super {
                    keyword: token,
                    method,
                }));
            }

            TokenType::LEFT_PAREN => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression.")?;

                return Ok(Expr::new(ExprKind::Grouping(Box::new(inner))));
            }

            _ => return Err(ParseError::new(token, "Expected expression.")),
        };

        self.advance();

        Ok(Expr::new(kind))
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn matches_any(&mut self, ttypes: &[TokenType]) -> bool {
        ttypes.iter().any(|&t| self.matches(t))
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> PResult<'a, &'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        Err(ParseError::new(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        !self.is_at_end() && self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        self.tokens.get(self.current).unwrap_or(&END)
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        self.tokens
            .get(self.current.saturating_sub(1))
            .unwrap_or(&END)
    }

    /// Discards tokens until it thinks it is at a statement boundary: just
    /// past a `;`, or in front of a statement keyword.
    fn synchronize(&mut self) {
        debug!("Synchronizing after parse error at line {}", self.peek().line);

        while !self.is_at_end() {
            self.advance();

            if self.at_boundary() {
                return;
            }
        }
    }

    /// Like [`Parser::synchronize`], but never consumes the `}` that closes
    /// the enclosing block.
    fn synchronize_in_block(&mut self) {
        debug!("Synchronizing inside block at line {}", self.peek().line);

        while !self.is_at_end() && !self.check(TokenType::RIGHT_BRACE) {
            self.advance();

            if self.at_boundary() {
                return;
            }
        }
    }

    fn at_boundary(&self) -> bool {
        if self.previous().token_type == TokenType::SEMICOLON {
            return true;
        }

        matches!(
            self.peek().token_type,
            TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN
        )
    }

    fn record_nested(&mut self, err: ParseError<'a>) {
        if self.nested_error.is_none() {
            self.nested_error = Some(err);
        } else {
            debug!("Suppressing follow-on error: {}", err);
        }
    }
}

/// Yields one top‑level declaration (or its error) at a time; recovery via
/// [`Parser::synchronize`] happens between items.  A declaration with a
/// failure anywhere inside it is never yielded: its first error comes out
/// instead.
impl<'a> Iterator for Parser<'a> {
    type Item = PResult<'a, Stmt<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_at_end() {
            return None;
        }

        let result = self.declaration();

        match (result, self.nested_error.take()) {
            (Ok(stmt), None) => Some(Ok(stmt)),

            (Ok(_), Some(first)) => {
                debug!("Dropping declaration that failed inside a block");

                Some(Err(first))
            }

            (Err(err), nested) => {
                self.synchronize();

                match nested {
                    Some(first) => {
                        debug!("Suppressing follow-on error: {}", err);

                        Some(Err(first))
                    }
                    None => Some(Err(err)),
                }
            }
        }
    }
}
