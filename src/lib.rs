//! sqlfront: a SQL front end that parses PostgreSQL-flavoured statements
//! into a typed AST.
//!
//! - nom-based tokenizer with line/column positions
//! - recursive descent parser where node identity carries statement
//!   semantics (`SELECT ... INTO` is never a plain read)
//! - statement classifier with stable category names
//! - deparser whose output re-parses to the same tree

pub mod error;
pub mod sql;

use std::path::Path;

use tracing::debug;

pub use crate::error::{Found, ParseError, Position, Result, SyntaxError};
pub use crate::sql::ast::Statement;
pub use crate::sql::classify::StatementType;
pub use crate::sql::parser::{parse_sql, parse_statement};

/// Read `path` and parse every statement in it.
pub fn parse_file(path: &Path) -> Result<Vec<Statement>> {
    let sql = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = sql.len(), "read SQL file");
    parse_sql(&sql)
}
