use std::fmt;

/// Position of a character in the formula source.
///
/// `offset` counts Unicode scalar values from the start of the source (0-based).
/// `line` and `column` are 1-based, with `\n` starting a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Location of the first character of a source.
    pub const START: Location = Location {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Location {
            offset,
            line,
            column,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Classification of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Integer or decimal number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// String literal in single (or double) quotes
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// 'it\'s'
    /// ```
    String,

    /// Boolean literal.
    ///
    /// The lexer never produces this kind: `TRUE`/`FALSE` come out as
    /// identifiers and are classified by the parser. It exists so that token
    /// vectors assembled by other tools can carry pre-classified literals.
    Boolean,

    /// Null literal, see [`TokenKind::Boolean`].
    Null,

    // Identifiers and references
    /// Field, function or keyword name
    ///
    /// # Examples
    /// ```text
    /// Amount__c
    /// ISBLANK
    /// and
    /// ```
    Identifier,

    /// Global variable marker (`$`)
    ///
    /// # Examples
    /// ```text
    /// $User.Id
    /// $Organization.Name
    /// ```
    FieldMarker,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,

    // Comparison
    /// `=` or `==`
    Equals,
    /// `!=` or `<>`
    NotEquals,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical (symbolic forms; word forms are identifiers)
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,

    /// String concatenation (`&`)
    Ampersand,

    // Punctuation
    LParen,
    RParen,
    Comma,
    Dot,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Identifier => "identifier",
            TokenKind::FieldMarker => "'$'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Caret => "'^'",
            TokenKind::Percent => "'%'",
            TokenKind::Equals => "'='",
            TokenKind::NotEquals => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::Ampersand => "'&'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of input",
        }
    }

    /// Name used in tooling output (`NUMBER`, `LPAREN`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Null => "NULL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::FieldMarker => "FIELD_MARKER",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Caret => "POWER",
            TokenKind::Percent => "MODULO",
            TokenKind::Equals => "EQUALS",
            TokenKind::NotEquals => "NOT_EQUALS",
            TokenKind::Lt => "LESS_THAN",
            TokenKind::LtEq => "LESS_THAN_OR_EQUAL",
            TokenKind::Gt => "GREATER_THAN",
            TokenKind::GtEq => "GREATER_THAN_OR_EQUAL",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Ampersand => "AMPERSAND",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Eof => "EOF",
        }
    }
}

/// A classified lexical unit with the exact source text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw matched text (quotes and escapes included for strings, empty for `Eof`)
    pub text: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Self {
        Token {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn eof(location: Location) -> Self {
        Token::new(TokenKind::Eof, "", location)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for an identifier equal to `keyword`, ignoring ASCII case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Number | TokenKind::String | TokenKind::Boolean | TokenKind::Null => {
                write!(f, "{} {}", self.kind.describe(), self.text)
            }
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
