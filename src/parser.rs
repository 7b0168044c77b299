//! Precedence-climbing parser from a token vector to an [`Expr`] tree.
//!
//! GRAMMAR (loosest binding first):
//!   expression     --> or
//!   or             --> and ( (OR | "||") and )*
//!   and            --> not ( (AND | "&&") not )*
//!   not            --> (NOT | "!") not | comparison
//!   comparison     --> concat ( ("=" | "!=" | "<" | "<=" | ">" | ">=") concat )*
//!   concat         --> additive ( "&" additive )*
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> power ( ("*" | "/" | "%") power )*
//!   power          --> unary ( "^" power )?
//!   unary          --> ("-" | "+") unary | primary
//!   primary        --> NUMBER | STRING | TRUE | FALSE | NULL
//!                    | IDENT "(" arguments? ")"
//!                    | "$"? IDENT ( "." IDENT )*
//!                    | "(" expression ")"
//!   arguments      --> expression ( "," expression )*
//!
//! Keywords are plain identifiers matched case-insensitively. An identifier
//! directly followed by `(` is always a call, so `NOT(x)` and `AND(a, b)` are
//! the function forms of the logical operators, and one followed by `.` always
//! starts a field path.
//!
//! Parentheses, prefix operators, exponents and every left-associative fold
//! count towards [`ParserOptions::max_depth`], which bounds the depth of the
//! tree handed back to the caller.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::ast::{BinOp, Expr, Literal, Location, Token, TokenKind, UnaryOp};
use crate::error::describe_location;
use crate::lexer::unescape;

/// Default limit on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Malformed grammatical structure: an unexpected or missing token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", describe_location(.location))]
pub struct ParseError {
    pub message: String,
    pub location: Option<Location>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Option<Location>) -> Self {
        ParseError {
            message: message.into(),
            location,
        }
    }
}

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Nesting depth at which parsing stops with an error instead of
    /// recursing further.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    options: ParserOptions,
}

impl Parser {
    /// Creates a parser over a token sequence terminated by exactly one `Eof`.
    pub fn new(tokens: Vec<Token>) -> Result<Self, ParseError> {
        Self::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: ParserOptions) -> Result<Self, ParseError> {
        let Some(last) = tokens.last() else {
            return Err(ParseError::new(
                "Token sequence is empty: expected at least an end-of-input token",
                None,
            ));
        };
        if !last.is(TokenKind::Eof) {
            return Err(ParseError::new(
                "Token sequence is not terminated by an end-of-input token",
                Some(last.location),
            ));
        }
        if let Some(early) = tokens[..tokens.len() - 1]
            .iter()
            .find(|t| t.is(TokenKind::Eof))
        {
            return Err(ParseError::new(
                "End-of-input token appears before the end of the token sequence",
                Some(early.location),
            ));
        }

        Ok(Parser {
            tokens,
            index: 0,
            depth: 0,
            options,
        })
    }

    /// Parses one complete expression; anything left before `Eof` is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;

        if !self.check(TokenKind::Eof) {
            return Err(self.error_here(format!(
                "Unexpected {} after complete expression",
                self.current()
            )));
        }

        debug!(
            root = expr.kind_name(),
            tokens = self.tokens.len(),
            "parsed formula"
        );
        Ok(expr)
    }

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it.
        &self.tokens[self.index]
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    /// Moves to the next token and returns the one just consumed.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.current().is_keyword(keyword)
    }

    fn error_here(&self, message: String) -> ParseError {
        let location = self.current().location;
        debug!(%location, %message, "parse failed");
        ParseError::new(message, Some(location))
    }

    /// Error for a token that cannot start or continue the construct at hand.
    fn unexpected(&self, expected: &str) -> ParseError {
        if self.check(TokenKind::Eof) {
            self.error_here(format!("Unexpected end of input: expected {}", expected))
        } else {
            self.error_here(format!("Expected {}, found {}", expected, self.current()))
        }
    }

    fn too_deep(&self) -> ParseError {
        self.error_here(format!(
            "Expression is nested too deeply (limit is {})",
            self.options.max_depth
        ))
    }

    /// Runs `f` one nesting level deeper, failing once the depth limit is hit.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parses `operand ( op operand )*` into a left-leaning chain.
    ///
    /// Every fold adds a level to the tree, so each one is charged against
    /// the depth limit until the whole chain is built.
    fn fold_left(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Self) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let entry_depth = self.depth;
        let result = self.fold_left_from(operand, operator);
        self.depth = entry_depth;
        result
    }

    fn fold_left_from(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Self) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(self) {
            if self.depth >= self.options.max_depth {
                return Err(self.too_deep());
            }
            self.depth += 1;

            let position = self.advance().location.offset;
            let right = operand(self)?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_and, |p| {
            (p.check(TokenKind::Or) || p.check_keyword("OR")).then_some(BinOp::Or)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_not, |p| {
            (p.check(TokenKind::And) || p.check_keyword("AND")).then_some(BinOp::And)
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        // `NOT(` is the call form and `NOT.` starts a field path; both are
        // left to `parse_primary`.
        let prefix = self.check(TokenKind::Not)
            || (self.check_keyword("NOT")
                && !self
                    .peek(1)
                    .is_some_and(|t| t.is(TokenKind::LParen) || t.is(TokenKind::Dot)));

        if !prefix {
            return self.parse_comparison();
        }

        let position = self.advance().location.offset;
        let operand = self.nested(Self::parse_not)?;
        Ok(Expr::UnaryOp {
            op: UnaryOp::Not,
            operand: Box::new(operand),
            position,
        })
    }

    /// Chains stay left-associative: `a < b < c` is `(a < b) < c`.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_concat, |p| match p.current().kind {
            TokenKind::Equals => Some(BinOp::Equal),
            TokenKind::NotEquals => Some(BinOp::NotEqual),
            TokenKind::Lt => Some(BinOp::LessThan),
            TokenKind::LtEq => Some(BinOp::LessEqual),
            TokenKind::Gt => Some(BinOp::GreaterThan),
            TokenKind::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        })
    }

    /// `&` has its own tier, looser than `+`/`-`: `'a' & 1 + 2` is `'a' & (1 + 2)`.
    fn parse_concat(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_additive, |p| {
            p.check(TokenKind::Ampersand).then_some(BinOp::Concat)
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_multiplicative, |p| match p.current().kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Subtract),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.fold_left(Self::parse_power, |p| match p.current().kind {
            TokenKind::Star => Some(BinOp::Multiply),
            TokenKind::Slash => Some(BinOp::Divide),
            TokenKind::Percent => Some(BinOp::Modulo),
            _ => None,
        })
    }

    /// Right-associative: the right operand recurses back into this tier.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;

        if !self.check(TokenKind::Caret) {
            return Ok(base);
        }

        let position = self.advance().location.offset;
        let exponent = self.nested(Self::parse_power)?;

        Ok(Expr::BinaryOp {
            op: BinOp::Power,
            left: Box::new(base),
            right: Box::new(exponent),
            position,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Minus => {
                let position = self.advance().location.offset;
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOp::Negate,
                    operand: Box::new(operand),
                    position,
                })
            }
            // Unary plus is a no-op and leaves no node behind.
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    /// Parse primary expressions: literals, calls, field paths, `( ... )`
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current();
        let kind = token.kind;
        let position = token.location.offset;

        match kind {
            TokenKind::Number => {
                let value = Decimal::from_str_exact(&token.text).map_err(|e| {
                    self.error_here(format!("Invalid number literal '{}': {}", token.text, e))
                })?;
                self.advance();
                Ok(literal(Literal::Number(value), position))
            }
            TokenKind::String => {
                let value = unescape(&token.text);
                self.advance();
                Ok(literal(Literal::String(value), position))
            }
            TokenKind::Boolean => {
                let value = if token.text.eq_ignore_ascii_case("TRUE") {
                    true
                } else if token.text.eq_ignore_ascii_case("FALSE") {
                    false
                } else {
                    return Err(
                        self.error_here(format!("Invalid boolean literal '{}'", token.text))
                    );
                };
                self.advance();
                Ok(literal(Literal::Boolean(value), position))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(Literal::Null, position))
            }
            TokenKind::FieldMarker => {
                self.advance();
                if !self.check(TokenKind::Identifier) {
                    return Err(self.unexpected("a global variable name after '$'"));
                }
                let name = format!("${}", self.advance().text);
                self.parse_field_path(name, position)
            }
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::LParen => {
                let open = self.advance();
                let expr = self.parse_expression()?;
                if !self.check(TokenKind::RParen) {
                    return Err(self.unexpected(&format!("')' to close '(' at {}", open.location)));
                }
                self.advance();
                Ok(expr)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Classifies an identifier as a call, a field path or a keyword literal.
    fn parse_identifier(&mut self) -> Result<Expr, ParseError> {
        let next_kind = self.peek(1).map(|t| t.kind);
        let token = self.advance();
        let position = token.location.offset;

        match next_kind {
            Some(TokenKind::LParen) => self.parse_call(token.text, position),
            Some(TokenKind::Dot) => self.parse_field_path(token.text, position),
            _ => {
                let keyword = token.text.to_ascii_uppercase();
                match keyword.as_str() {
                    "TRUE" => Ok(literal(Literal::Boolean(true), position)),
                    "FALSE" => Ok(literal(Literal::Boolean(false), position)),
                    "NULL" => Ok(literal(Literal::Null, position)),
                    "AND" | "OR" | "NOT" => {
                        let message = format!(
                            "Expected an expression, found keyword '{}'",
                            token.text
                        );
                        debug!(location = %token.location, %message, "parse failed");
                        Err(ParseError::new(message, Some(token.location)))
                    }
                    _ => Ok(Expr::FieldRef {
                        path: vec![token.text],
                        position,
                    }),
                }
            }
        }
    }

    fn parse_call(&mut self, name: String, position: usize) -> Result<Expr, ParseError> {
        self.advance(); // Consume '('
        let mut args = vec![];

        if self.check(TokenKind::RParen) {
            self.advance();
            return Ok(Expr::FunctionCall {
                name,
                args,
                position,
            });
        }

        loop {
            args.push(self.parse_expression()?);

            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(
                        self.unexpected(&format!("',' or ')' in arguments of {}", name))
                    );
                }
            }
        }

        Ok(Expr::FunctionCall {
            name,
            args,
            position,
        })
    }

    /// Collects `first ( "." IDENT )*` into a single field reference.
    fn parse_field_path(&mut self, first: String, position: usize) -> Result<Expr, ParseError> {
        let mut path = vec![first];

        while self.check(TokenKind::Dot) {
            self.advance(); // Consume '.'
            if !self.check(TokenKind::Identifier) {
                return Err(self.unexpected("a field name after '.'"));
            }
            path.push(self.advance().text);
        }

        Ok(Expr::FieldRef { path, position })
    }
}

fn literal(value: Literal, position: usize) -> Expr {
    Expr::Literal { value, position }
}

/// Parses a token sequence produced by [`crate::tokenize`].
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens)?.parse()
}
