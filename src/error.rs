use std::fmt;

use thiserror::Error;

/// Location of a token in the source text. `line` and `column` are 1-based;
/// `offset` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The token stream did not match any grammar rule at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: Position,
    pub found: Found,
    /// Alternatives that would have been accepted here.
    pub expected: Vec<String>,
}

impl SyntaxError {
    pub fn is_end_of_input(&self) -> bool {
        self.found == Found::EndOfInput
    }
}

/// What stood at the position of a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    /// The offending token, as written back by the lexer.
    Token(String),
    EndOfInput,
}

impl PartialEq<&str> for Found {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Found::Token(t) if t == other)
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token(t) => write!(f, "\"{}\"", t),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}: ", self.position)?;
        match self.expected.as_slice() {
            [] => {}
            [only] => write!(f, "expected {}, ", only)?,
            [init @ .., last] => write!(f, "expected {} or {}, ", init.join(", "), last)?,
        }
        write!(f, "found {}", self.found)
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lexical error at {position}: {message}")]
    Lex { position: Position, message: String },

    #[error("{0}")]
    Syntax(SyntaxError),

    #[error("internal parser invariant violated: {0}")]
    InvariantViolation(String),
}

impl ParseError {
    /// The syntax error carried by this error, if any.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(e) => Some(e),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lex { position, .. } => Some(*position),
            ParseError::Syntax(e) => Some(e.position),
            _ => None,
        }
    }
}

impl From<SyntaxError> for ParseError {
    fn from(e: SyntaxError) -> Self {
        ParseError::Syntax(e)
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_lists_alternatives() {
        let err = SyntaxError {
            position: Position {
                offset: 9,
                line: 1,
                column: 10,
            },
            found: Found::Token("WHERE".to_string()),
            expected: vec!["TABLE".into(), "VIEW".into(), "MATERIALIZED VIEW".into()],
        };
        assert_eq!(
            err.to_string(),
            "syntax error at line 1, column 10: expected TABLE, VIEW or MATERIALIZED VIEW, found \"WHERE\""
        );
    }

    #[test]
    fn test_syntax_error_display_end_of_input() {
        let err = SyntaxError {
            position: Position::start(),
            found: Found::EndOfInput,
            expected: vec!["identifier".into()],
        };
        assert!(err.is_end_of_input());
        assert_eq!(
            err.to_string(),
            "syntax error at line 1, column 1: expected identifier, found end of input"
        );
    }

    #[test]
    fn test_quoted_token_is_not_end_of_input() {
        let err = SyntaxError {
            position: Position::start(),
            found: Found::Token("end of input".to_string()),
            expected: vec!["TABLE".into()],
        };
        assert!(!err.is_end_of_input());
        assert_eq!(err.found, "end of input");
        assert!(err.to_string().ends_with("found \"end of input\""));
    }
}
