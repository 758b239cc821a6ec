/// SQL lexer (tokenizer) using nom.
///
/// Keywords are matched case-insensitively, unquoted identifiers fold to
/// lower case, and every token records where it started so the parser can
/// report line/column positions.
use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::value,
    IResult,
};

use crate::error::{ParseError, Position, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    All,
    Analyze,
    And,
    As,
    Asc,
    Between,
    By,
    Case,
    Cast,
    Commit,
    Create,
    Cross,
    Data,
    Default,
    Delete,
    Desc,
    Distinct,
    Drop,
    Else,
    End,
    Exists,
    Explain,
    False,
    First,
    From,
    Full,
    Global,
    Group,
    Having,
    If,
    Ilike,
    In,
    Inner,
    Insert,
    Into,
    Is,
    Join,
    Key,
    Last,
    Left,
    Like,
    Limit,
    Local,
    Materialized,
    No,
    Not,
    Null,
    Nulls,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Preserve,
    Primary,
    Replace,
    Returning,
    Right,
    Rows,
    Select,
    Table,
    Tablespace,
    Temp,
    Temporary,
    Then,
    True,
    Unique,
    Unlogged,
    Using,
    Values,
    Verbose,
    View,
    When,
    Where,
    With,

    // Literals
    Number(String),
    StringLit(String),
    Param(u32),

    // Identifiers (already case-folded unless quoted)
    Ident(String),

    // Symbols
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Star,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Slash,
    Percent,
    Concat,      // "||"
    DoubleColon, // "::"
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}

/// Map an upper-cased bare word to its keyword token.
pub fn keyword(upper: &str) -> Option<Token> {
    let token = match upper {
        "ALL" => Token::All,
        "ANALYZE" | "ANALYSE" => Token::Analyze,
        "AND" => Token::And,
        "AS" => Token::As,
        "ASC" => Token::Asc,
        "BETWEEN" => Token::Between,
        "BY" => Token::By,
        "CASE" => Token::Case,
        "CAST" => Token::Cast,
        "COMMIT" => Token::Commit,
        "CREATE" => Token::Create,
        "CROSS" => Token::Cross,
        "DATA" => Token::Data,
        "DEFAULT" => Token::Default,
        "DELETE" => Token::Delete,
        "DESC" => Token::Desc,
        "DISTINCT" => Token::Distinct,
        "DROP" => Token::Drop,
        "ELSE" => Token::Else,
        "END" => Token::End,
        "EXISTS" => Token::Exists,
        "EXPLAIN" => Token::Explain,
        "FALSE" => Token::False,
        "FIRST" => Token::First,
        "FROM" => Token::From,
        "FULL" => Token::Full,
        "GLOBAL" => Token::Global,
        "GROUP" => Token::Group,
        "HAVING" => Token::Having,
        "IF" => Token::If,
        "ILIKE" => Token::Ilike,
        "IN" => Token::In,
        "INNER" => Token::Inner,
        "INSERT" => Token::Insert,
        "INTO" => Token::Into,
        "IS" => Token::Is,
        "JOIN" => Token::Join,
        "KEY" => Token::Key,
        "LAST" => Token::Last,
        "LEFT" => Token::Left,
        "LIKE" => Token::Like,
        "LIMIT" => Token::Limit,
        "LOCAL" => Token::Local,
        "MATERIALIZED" => Token::Materialized,
        "NO" => Token::No,
        "NOT" => Token::Not,
        "NULL" => Token::Null,
        "NULLS" => Token::Nulls,
        "OFFSET" => Token::Offset,
        "ON" => Token::On,
        "OR" => Token::Or,
        "ORDER" => Token::Order,
        "OUTER" => Token::Outer,
        "PRESERVE" => Token::Preserve,
        "PRIMARY" => Token::Primary,
        "REPLACE" => Token::Replace,
        "RETURNING" => Token::Returning,
        "RIGHT" => Token::Right,
        "ROWS" => Token::Rows,
        "SELECT" => Token::Select,
        "TABLE" => Token::Table,
        "TABLESPACE" => Token::Tablespace,
        "TEMP" => Token::Temp,
        "TEMPORARY" => Token::Temporary,
        "THEN" => Token::Then,
        "TRUE" => Token::True,
        "UNIQUE" => Token::Unique,
        "UNLOGGED" => Token::Unlogged,
        "USING" => Token::Using,
        "VALUES" => Token::Values,
        "VERBOSE" => Token::Verbose,
        "VIEW" => Token::View,
        "WHEN" => Token::When,
        "WHERE" => Token::Where,
        "WITH" => Token::With,
        _ => return None,
    };
    Some(token)
}

impl Token {
    /// Keywords that may also be used as plain names (column, table, option
    /// names). Returns the lower-case name the keyword stands for.
    pub fn unreserved_name(&self) -> Option<&'static str> {
        let name = match self {
            Token::Commit => "commit",
            Token::Data => "data",
            Token::Delete => "delete",
            Token::Drop => "drop",
            Token::Explain => "explain",
            Token::First => "first",
            Token::Global => "global",
            Token::If => "if",
            Token::Insert => "insert",
            Token::Key => "key",
            Token::Last => "last",
            Token::Local => "local",
            Token::Materialized => "materialized",
            Token::No => "no",
            Token::Nulls => "nulls",
            Token::Preserve => "preserve",
            Token::Replace => "replace",
            Token::Rows => "rows",
            Token::Tablespace => "tablespace",
            Token::Temp => "temp",
            Token::Temporary => "temporary",
            Token::Unlogged => "unlogged",
            Token::View => "view",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => f.write_str(n),
            Token::StringLit(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Param(n) => write!(f, "${}", n),
            Token::Ident(name) => f.write_str(name),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Dot => f.write_str("."),
            Token::Star => f.write_str("*"),
            Token::Eq => f.write_str("="),
            Token::Ne => f.write_str("<>"),
            Token::Lt => f.write_str("<"),
            Token::Gt => f.write_str(">"),
            Token::Le => f.write_str("<="),
            Token::Ge => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Concat => f.write_str("||"),
            Token::DoubleColon => f.write_str("::"),
            // Keyword variants print as their upper-case spelling.
            keyword => f.write_str(&format!("{:?}", keyword).to_uppercase()),
        }
    }
}

/// Tokenize a SQL string.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut remaining = input;
    let mut position = Position::start();

    loop {
        let rest = skip_trivia(remaining, position)?;
        position = advance(position, &remaining[..remaining.len() - rest.len()]);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        match lex_token(remaining) {
            Ok((rest, token)) => {
                tokens.push(Spanned { token, position });
                position = advance(position, &remaining[..remaining.len() - rest.len()]);
                remaining = rest;
            }
            Err(_) => {
                let message = if remaining.starts_with('\'') {
                    "unterminated string literal".to_string()
                } else if remaining.starts_with('"') {
                    "unterminated quoted identifier".to_string()
                } else {
                    format!(
                        "unexpected character at: '{}'",
                        remaining.chars().take(20).collect::<String>()
                    )
                };
                return Err(ParseError::Lex { position, message });
            }
        }
    }

    Ok(tokens)
}

/// Position just past the end of `input`.
pub fn end_position(input: &str) -> Position {
    advance(Position::start(), input)
}

/// Move `pos` past `consumed`, tracking line breaks.
fn advance(mut pos: Position, consumed: &str) -> Position {
    for c in consumed.chars() {
        pos.offset += c.len_utf8();
        if c == '\n' {
            pos.line += 1;
            pos.column = 1;
        } else {
            pos.column += 1;
        }
    }
    pos
}

/// Skip whitespace, `-- line` comments and (nestable) `/* block */` comments.
fn skip_trivia(input: &str, start: Position) -> Result<&str> {
    let mut rest = input.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(i) => &after[i + 1..],
                None => "",
            };
        } else if rest.starts_with("/*") {
            let mut depth = 0usize;
            let mut i = 0usize;
            let bytes = rest.as_bytes();
            loop {
                if i + 1 >= bytes.len() {
                    let position = advance(start, &input[..input.len() - rest.len()]);
                    return Err(ParseError::Lex {
                        position,
                        message: "unterminated block comment".into(),
                    });
                }
                match (bytes[i], bytes[i + 1]) {
                    (b'/', b'*') => {
                        depth += 1;
                        i += 2;
                    }
                    (b'*', b'/') => {
                        depth -= 1;
                        i += 2;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => i += 1,
                }
            }
            rest = &rest[i..];
        } else {
            return Ok(rest);
        }
        rest = rest.trim_start();
    }
}

fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((
        lex_number,
        lex_symbol,
        lex_string_literal,
        lex_quoted_ident,
        lex_param,
        lex_keyword_or_ident,
    ))(input)
}

fn lex_symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Le, tag("<=")),
        value(Token::Ge, tag(">=")),
        value(Token::Ne, alt((tag("!="), tag("<>")))),
        value(Token::Concat, tag("||")),
        value(Token::DoubleColon, tag("::")),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::LBracket, char('[')),
        value(Token::RBracket, char(']')),
        value(Token::Comma, char(',')),
        value(Token::Semicolon, char(';')),
        value(Token::Dot, char('.')),
        value(Token::Star, char('*')),
        value(Token::Eq, char('=')),
        value(Token::Lt, char('<')),
        value(Token::Gt, char('>')),
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Slash, char('/')),
        value(Token::Percent, char('%')),
    ))(input)
}

/// Scan a `quote`-delimited body where a doubled quote stands for itself.
fn lex_quoted(input: &str, quote: char) -> IResult<&str, String> {
    let (input, _) = char(quote)(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == quote {
            if matches!(chars.peek(), Some((_, next)) if *next == quote) {
                chars.next();
                result.push(quote);
            } else {
                return Ok((&input[i + c.len_utf8()..], result));
            }
        } else {
            result.push(c);
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn lex_string_literal(input: &str) -> IResult<&str, Token> {
    let (rest, s) = lex_quoted(input, '\'')?;
    Ok((rest, Token::StringLit(s)))
}

fn lex_quoted_ident(input: &str) -> IResult<&str, Token> {
    let (rest, s) = lex_quoted(input, '"')?;
    if s.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((rest, Token::Ident(s)))
}

fn lex_param(input: &str) -> IResult<&str, Token> {
    let (rest, _) = char('$')(input)?;
    let (rest, digits) = digit1(rest)?;
    let n: u32 = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, Token::Param(n)))
}

/// Numbers keep their source spelling: `42`, `3.14`, `1.`, `.5`, `1e10`.
fn lex_number(input: &str) -> IResult<&str, Token> {
    let (mut rest, int_part) = take_while(|c: char| c.is_ascii_digit())(input)?;

    if let Some(after_dot) = rest.strip_prefix('.') {
        let (after_frac, frac) = take_while(|c: char| c.is_ascii_digit())(after_dot)?;
        if !int_part.is_empty() || !frac.is_empty() {
            rest = after_frac;
        }
    }

    if rest.len() == input.len() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }

    if let Some(after_e) = rest.strip_prefix(['e', 'E']) {
        let signed = after_e.strip_prefix(['+', '-']).unwrap_or(after_e);
        if let Ok((after_exp, _)) = digit1::<&str, nom::error::Error<&str>>(signed) {
            rest = after_exp;
        }
    }

    // "1abc" is neither a number nor an identifier.
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }

    let text = &input[..input.len() - rest.len()];
    Ok((rest, Token::Number(text.to_string())))
}

fn lex_keyword_or_ident(input: &str) -> IResult<&str, Token> {
    let (remaining, word) =
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '$')(input)?;
    if word.starts_with(|c: char| c.is_ascii_digit() || c == '$') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )));
    }

    let token = keyword(&word.to_uppercase()).unwrap_or_else(|| Token::Ident(word.to_lowercase()));
    Ok((remaining, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<Token> {
        tokenize(sql).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_tokenize_select_into() {
        let tokens = kinds("SELECT * INTO TEMP TABLE t FROM s");
        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Star,
                Token::Into,
                Token::Temp,
                Token::Table,
                Token::Ident("t".to_string()),
                Token::From,
                Token::Ident("s".to_string()),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(kinds("select Into FrOm"), vec![Token::Select, Token::Into, Token::From]);
    }

    #[test]
    fn test_identifiers_fold_unless_quoted() {
        let tokens = kinds("MyTable \"MyTable\" \"select\"");
        assert_eq!(tokens[0], Token::Ident("mytable".to_string()));
        assert_eq!(tokens[1], Token::Ident("MyTable".to_string()));
        // A quoted keyword is an identifier.
        assert_eq!(tokens[2], Token::Ident("select".to_string()));
    }

    #[test]
    fn test_tokenize_numbers_keep_spelling() {
        let tokens = kinds("1 3.14 .5 1e10 2.");
        assert_eq!(tokens[0], Token::Number("1".into()));
        assert_eq!(tokens[1], Token::Number("3.14".into()));
        assert_eq!(tokens[2], Token::Number(".5".into()));
        assert_eq!(tokens[3], Token::Number("1e10".into()));
        assert_eq!(tokens[4], Token::Number("2.".into()));
    }

    #[test]
    fn test_qualified_name_is_not_a_number() {
        let tokens = kinds("myschema.t");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("myschema".into()),
                Token::Dot,
                Token::Ident("t".into())
            ]
        );
    }

    #[test]
    fn test_tokenize_string_literal_with_escape() {
        let tokens = kinds("'it''s'");
        assert_eq!(tokens, vec![Token::StringLit("it's".to_string())]);
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = kinds("a::int || b <> c != d <= e >= f $1");
        assert!(tokens.contains(&Token::DoubleColon));
        assert!(tokens.contains(&Token::Concat));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Ne).count(), 2);
        assert!(tokens.contains(&Token::Le));
        assert!(tokens.contains(&Token::Ge));
        assert!(tokens.contains(&Token::Param(1)));
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = kinds("SELECT -- trailing\n 1 /* block /* nested */ still */ FROM t");
        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Number("1".into()),
                Token::From,
                Token::Ident("t".into())
            ]
        );
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let tokens = tokenize("SELECT a\n  FROM t").unwrap();
        assert_eq!(tokens[0].position, Position { offset: 0, line: 1, column: 1 });
        assert_eq!(tokens[1].position, Position { offset: 7, line: 1, column: 8 });
        assert_eq!(tokens[2].position, Position { offset: 11, line: 2, column: 3 });
    }

    #[test]
    fn test_unterminated_string_is_lex_error() {
        match tokenize("SELECT 'abc") {
            Err(ParseError::Lex { position, message }) => {
                assert_eq!(position.column, 8);
                assert!(message.contains("unterminated string"));
            }
            other => panic!("Expected Lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_character_is_lex_error() {
        assert!(matches!(tokenize("SELECT @"), Err(ParseError::Lex { .. })));
    }

    #[test]
    fn test_keyword_display_is_upper_case() {
        assert_eq!(Token::Materialized.to_string(), "MATERIALIZED");
        assert_eq!(Token::Ident("t".into()).to_string(), "t");
    }
}
