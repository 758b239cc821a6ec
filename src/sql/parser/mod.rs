/// SQL parser: converts token stream into AST.
/// Hand-written recursive descent parser.
use tracing::{debug, trace};

use crate::error::{Found, ParseError, Position, Result, SyntaxError};
use crate::sql::ast::*;
use crate::sql::lexer::{end_position, Spanned, Token};

mod clauses;
mod create;
mod expr;
mod insert;
mod select;

/// Deepest allowed nesting of parentheses and sub-queries.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Where a SELECT appears. Only a top-level SELECT may carry `INTO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SelectContext {
    TopLevel,
    Nested,
}

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    end: Position,
}

impl Parser {
    /// `end` is the position just past the last character of the input,
    /// reported for errors at end of input.
    pub fn new(tokens: Vec<Spanned>, end: Position) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            end,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|s| &s.token)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn advance(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].token.clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Consume `token` if it is next.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_is(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn current_position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .map(|s| s.position)
            .unwrap_or(self.end)
    }

    /// Build a syntax error at the current token.
    fn error<S: AsRef<str>>(&self, expected: &[S]) -> ParseError {
        let found = match self.peek() {
            Some(t) => Found::Token(t.to_string()),
            None => Found::EndOfInput,
        };
        SyntaxError {
            position: self.current_position(),
            found,
            expected: expected.iter().map(|s| s.as_ref().to_string()).collect(),
        }
        .into()
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&[expected.to_string()]))
        }
    }

    /// Identifier, or a keyword usable as a name.
    fn expect_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            Some(t) => match t.unreserved_name() {
                Some(name) => {
                    self.pos += 1;
                    Ok(name.to_string())
                }
                None => Err(self.error(&["identifier"])),
            },
            None => Err(self.error(&["identifier"])),
        }
    }

    fn is_ident_ahead(&self, n: usize) -> bool {
        match self.peek_nth(n) {
            Some(Token::Ident(_)) => true,
            Some(t) => t.unreserved_name().is_some(),
            None => false,
        }
    }

    /// True if one or more `(` followed by SELECT come next.
    fn is_parenthesised_select_ahead(&self) -> bool {
        let mut n = 0;
        while self.peek_nth(n) == Some(&Token::LParen) {
            n += 1;
        }
        n > 0 && self.peek_nth(n) == Some(&Token::Select)
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(&["shallower nesting"]));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Parse every statement in the stream, in order. Empty statements
    /// (stray semicolons) are skipped; the first error aborts the batch.
    pub fn parse_batch(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&Token::Semicolon) {}
            if self.peek().is_none() {
                break;
            }
            let stmt = self.parse()?;
            match self.peek() {
                None => {}
                Some(Token::Semicolon) => {}
                Some(_) => return Err(self.error(&[";", "end of input"])),
            }
            statements.push(stmt);
        }
        Ok(statements)
    }

    /// Statement dispatcher: parse exactly one statement starting at the
    /// current token. Does not consume a trailing semicolon.
    pub fn parse(&mut self) -> Result<Statement> {
        let start = self.current_position();
        let stmt = match self.peek() {
            Some(Token::Select) => {
                Statement::Select(Box::new(self.parse_select(SelectContext::TopLevel)?))
            }
            Some(Token::Insert) => Statement::Insert(Box::new(self.parse_insert()?)),
            Some(Token::Create) => self.parse_create()?,
            Some(Token::Explain) => self.parse_explain()?,
            _ => return Err(self.error(&["SELECT", "INSERT", "CREATE", "EXPLAIN"])),
        };
        trace!(
            line = start.line,
            column = start.column,
            kind = %stmt.statement_type(),
            "parsed statement"
        );
        Ok(stmt)
    }

    /// `EXPLAIN [ANALYZE] [VERBOSE] statement`.
    ///
    /// A `SELECT ... INTO` under EXPLAIN is reinterpreted as the table
    /// creation it performs.
    fn parse_explain(&mut self) -> Result<Statement> {
        self.advance(); // EXPLAIN
        let analyze = self.eat(&Token::Analyze);
        let verbose = self.eat(&Token::Verbose);

        let statement = match self.peek() {
            Some(Token::Select) => {
                let sel = self.parse_select(SelectContext::TopLevel)?;
                match sel.into_create_table_as() {
                    Ok(ctas) => {
                        debug!(relation = %ctas.into.rel.name, "reinterpreting SELECT INTO under EXPLAIN");
                        ctas.check_invariants()?;
                        Statement::CreateTableAs(Box::new(ctas))
                    }
                    Err(sel) => Statement::Select(Box::new(sel)),
                }
            }
            Some(Token::Insert) => Statement::Insert(Box::new(self.parse_insert()?)),
            Some(Token::Create) => {
                let create_pos = self.pos;
                match self.parse_create()? {
                    stmt @ Statement::CreateTableAs(_) => stmt,
                    _ => {
                        self.pos = create_pos;
                        return Err(self.error(&[
                            "SELECT",
                            "INSERT",
                            "CREATE TABLE AS",
                            "CREATE MATERIALIZED VIEW",
                        ]));
                    }
                }
            }
            _ => return Err(self.error(&["SELECT", "INSERT", "CREATE"])),
        };

        Ok(Statement::Explain(Box::new(ExplainStatement {
            analyze,
            verbose,
            statement,
        })))
    }
}

/// Parse a batch of `;`-separated statements.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>> {
    let tokens = crate::sql::lexer::tokenize(sql)?;
    debug!(tokens = tokens.len(), "tokenized SQL batch");
    let mut parser = Parser::new(tokens, end_position(sql));
    let statements = parser.parse_batch()?;
    debug!(statements = statements.len(), "parsed SQL batch");
    Ok(statements)
}

/// Parse exactly one statement; a trailing semicolon is optional.
pub fn parse_statement(sql: &str) -> Result<Statement> {
    let tokens = crate::sql::lexer::tokenize(sql)?;
    let mut parser = Parser::new(tokens, end_position(sql));
    let stmt = parser.parse()?;
    parser.eat(&Token::Semicolon);
    if parser.peek().is_some() {
        return Err(parser.error(&["end of input"]));
    }
    Ok(stmt)
}
