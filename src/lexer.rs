use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{Location, Token, TokenKind};
use crate::error::describe_location;

/// Malformed lexical input: an unexpected character, an unterminated string
/// or comment, a bad escape or a malformed number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", describe_location(.location))]
pub struct LexError {
    pub message: String,
    pub location: Option<Location>,
}

impl LexError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        LexError {
            message: message.into(),
            location: Some(location),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn location(&self) -> Location {
        Location::new(self.position, self.line, self.column)
    }

    fn text_from(&self, start: Location) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn error(&self, message: String, location: Location) -> LexError {
        debug!(%location, %message, "tokenize failed");
        LexError::new(message, location)
    }

    /// Skips whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek_char(1) == Some('*') => {
                    let start = self.location();
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char() {
                            None => {
                                return Err(
                                    self.error("Unterminated comment".to_string(), start)
                                );
                            }
                            Some('*') if self.peek_char(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes a quoted string, leaving the quotes and escapes in the raw text.
    fn read_string(&mut self, quote: char, start: Location) -> Result<(), LexError> {
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(());
                }
                '\\' => {
                    let escape_at = self.location();
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n' | 't' | 'r' | '\'' | '"' | '\\') => self.advance(),
                        Some(other) => {
                            return Err(self.error(
                                format!("Invalid escape sequence '\\{}' in string", other),
                                escape_at,
                            ));
                        }
                        None => break,
                    }
                }
                _ => self.advance(),
            }
        }

        Err(self.error(
            "Unterminated string: missing closing quote".to_string(),
            start,
        ))
    }

    fn read_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Consumes the rest of a bad numeric run so the message shows all of it.
    fn malformed_number(&mut self, start: Location, reason: &str) -> LexError {
        while self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            self.advance();
        }
        let text = self.text_from(start);
        self.error(format!("Malformed number '{}': {}", text, reason), start)
    }

    fn read_number(&mut self, start: Location) -> Result<(), LexError> {
        self.read_digits();

        if self.current_char() == Some('.') {
            if !self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.malformed_number(start, "expected digits after decimal point"));
            }
            self.advance();
            self.read_digits();

            if self.current_char() == Some('.') {
                return Err(self.malformed_number(start, "more than one decimal point"));
            }
        }

        if self
            .current_char()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            return Err(self.malformed_number(start, "unexpected character after digits"));
        }

        let text = self.text_from(start);
        // Digits past Decimal's precision would otherwise be rounded away.
        if let Err(e) = Decimal::from_str_exact(&text) {
            return Err(self.error(
                format!("Number '{}' cannot be represented exactly: {}", text, e),
                start,
            ));
        }
        Ok(())
    }

    /// Consumes `width` characters and yields a token of `kind` for them.
    fn symbol(&mut self, kind: TokenKind, width: usize) -> TokenKind {
        for _ in 0..width {
            self.advance();
        }
        kind
    }

    /// Returns the next token. Once the input is exhausted every call yields
    /// an `Eof` token at the end location.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let start = self.location();
        let kind = match self.current_char() {
            None => return Ok(Token::eof(start)),
            Some('+') => self.symbol(TokenKind::Plus, 1),
            Some('-') => self.symbol(TokenKind::Minus, 1),
            Some('*') => self.symbol(TokenKind::Star, 1),
            Some('/') => self.symbol(TokenKind::Slash, 1),
            Some('^') => self.symbol(TokenKind::Caret, 1),
            Some('%') => self.symbol(TokenKind::Percent, 1),
            Some('(') => self.symbol(TokenKind::LParen, 1),
            Some(')') => self.symbol(TokenKind::RParen, 1),
            Some(',') => self.symbol(TokenKind::Comma, 1),
            Some('.') => self.symbol(TokenKind::Dot, 1),
            Some('$') => self.symbol(TokenKind::FieldMarker, 1),
            Some('=') => match self.peek_char(1) {
                Some('=') => self.symbol(TokenKind::Equals, 2),
                _ => self.symbol(TokenKind::Equals, 1),
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => self.symbol(TokenKind::NotEquals, 2),
                _ => self.symbol(TokenKind::Not, 1),
            },
            Some('<') => match self.peek_char(1) {
                Some('=') => self.symbol(TokenKind::LtEq, 2),
                Some('>') => self.symbol(TokenKind::NotEquals, 2),
                _ => self.symbol(TokenKind::Lt, 1),
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.symbol(TokenKind::GtEq, 2),
                _ => self.symbol(TokenKind::Gt, 1),
            },
            Some('&') => match self.peek_char(1) {
                Some('&') => self.symbol(TokenKind::And, 2),
                _ => self.symbol(TokenKind::Ampersand, 1),
            },
            Some('|') => match self.peek_char(1) {
                Some('|') => self.symbol(TokenKind::Or, 2),
                _ => {
                    return Err(self.error(
                        "Unexpected character '|' (did you mean '||'?)".to_string(),
                        start,
                    ));
                }
            },
            Some(quote @ ('\'' | '"')) => {
                self.read_string(quote, start)?;
                TokenKind::String
            }
            Some(ch) if ch.is_ascii_digit() => {
                self.read_number(start)?;
                TokenKind::Number
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                self.read_identifier();
                TokenKind::Identifier
            }
            Some(ch) => {
                return Err(self.error(format!("Unexpected character '{}'", ch), start));
            }
        };

        let token = Token::new(kind, self.text_from(start), start);
        trace!(kind = kind.name(), text = %token.text, offset = start.offset, "token");
        Ok(token)
    }

    /// Consumes the lexer and returns every token, ending with exactly one `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        debug!(tokens = tokens.len(), "tokenized formula");
        Ok(tokens)
    }
}

/// Tokenizes a whole formula.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// Resolves the raw text of a string token (quotes included) to its value.
///
/// The raw text must come from a string token the lexer accepted; unknown
/// escapes are kept verbatim.
pub fn unescape(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = chars.next();
    let mut body: Vec<char> = chars.collect();
    if quote.is_some() && body.last().copied() == quote {
        body.pop();
    }

    let mut result = String::with_capacity(body.len());
    let mut iter = body.into_iter();
    while let Some(ch) = iter.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match iter.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_stay_identifiers() {
        let mut expected = vec![TokenKind::Identifier; 6];
        expected.push(TokenKind::Eof);
        assert_eq!(kinds("AND or Not true FALSE null"), expected);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        let first = lexer.next_token().unwrap();
        let second = lexer.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::Eof);
        assert_eq!(first, second);
        assert_eq!(first.location, Location::new(1, 1, 2));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("'it\\'s'"), "it's");
        assert_eq!(unescape("'a\\nb'"), "a\nb");
        assert_eq!(unescape("\"say \\\"hi\\\"\""), "say \"hi\"");
        assert_eq!(unescape("'back\\\\slash'"), "back\\slash");
        assert_eq!(unescape("''"), "");
    }

    #[test]
    fn test_crlf_counts_as_one_line() {
        let tokens = tokenize("a\r\nb").unwrap();
        assert_eq!(tokens[1].location, Location::new(3, 2, 1));
    }
}
