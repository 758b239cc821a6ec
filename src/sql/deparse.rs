//! Canonical SQL rendering of AST nodes.
//!
//! Rendering is the inverse of parsing up to whitespace, keyword case and
//! optional noise words: re-parsing the text of a parsed statement yields an
//! equal tree. Names are quoted only when the lexer would otherwise fold or
//! misread them, and compound operands are parenthesised wherever the
//! grammar's precedence would regroup them.
use std::borrow::Cow;
use std::fmt;

use crate::sql::ast::*;
use crate::sql::lexer::keyword;

impl Statement {
    /// Canonical SQL text of this statement, without a trailing semicolon.
    pub fn sql_string(&self) -> String {
        self.to_string()
    }
}

/// Quote `name` as a SQL identifier unless it reads back unchanged as a bare
/// word.
pub fn quote_ident(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => chars
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$'),
        _ => false,
    };
    if plain && keyword(&name.to_ascii_uppercase()).is_none() {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Comma-separated list.
struct Commas<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Commas<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

/// Comma-separated identifiers.
struct Idents<'a>(&'a [String]);

impl fmt::Display for Idents<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&quote_ident(name))?;
        }
        Ok(())
    }
}

/// `a.b.c` with each part quoted as needed.
struct Dotted<'a>(&'a [String]);

impl fmt::Display for Dotted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&quote_ident(part))?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(sel) => fmt::Display::fmt(sel, f),
            Statement::Insert(ins) => fmt::Display::fmt(ins, f),
            Statement::CreateTable(ct) => fmt::Display::fmt(ct, f),
            Statement::CreateTableAs(ctas) => fmt::Display::fmt(ctas, f),
            Statement::CreateView(cv) => fmt::Display::fmt(cv, f),
            Statement::Explain(ex) => fmt::Display::fmt(ex, f),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_ident(schema))?;
        }
        f.write_str(&quote_ident(&self.name))
    }
}

impl fmt::Display for Persistence {
    /// Modifier keyword with its trailing space; empty for permanent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Persistence::Permanent => "",
            Persistence::Temporary => "TEMPORARY ",
            Persistence::Unlogged => "UNLOGGED ",
        })
    }
}

/// Name only; the persistence modifier is placed by the enclosing statement.
impl fmt::Display for RelationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_ident(schema))?;
        }
        f.write_str(&quote_ident(&self.name))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(n) => f.write_str(n),
            OptionValue::String(s) => f.write_str(&quote_literal(s)),
            OptionValue::Word(w) if matches!(w.as_str(), "true" | "false" | "on") => {
                f.write_str(w)
            }
            OptionValue::Word(w) => f.write_str(&quote_ident(w)),
        }
    }
}

impl fmt::Display for StorageOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.name.split('.').enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&quote_ident(part))?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}

/// Everything after the relation name: columns, access method, options,
/// ON COMMIT and tablespace. `WITH NO DATA` follows the query and is
/// written by the statement.
fn fmt_relation_tail(f: &mut fmt::Formatter<'_>, into: &IntoClause) -> fmt::Result {
    if !into.column_names.is_empty() {
        write!(f, " ({})", Idents(&into.column_names))?;
    }
    if let Some(method) = &into.access_method {
        write!(f, " USING {}", quote_ident(method))?;
    }
    if !into.options.is_empty() {
        write!(f, " WITH ({})", Commas(&into.options))?;
    }
    match into.on_commit {
        OnCommit::Noop => {}
        OnCommit::PreserveRows => f.write_str(" ON COMMIT PRESERVE ROWS")?,
        OnCommit::DeleteRows => f.write_str(" ON COMMIT DELETE ROWS")?,
        OnCommit::Drop => f.write_str(" ON COMMIT DROP")?,
    }
    if let Some(tablespace) = &into.tablespace {
        write!(f, " TABLESPACE {}", quote_ident(tablespace))?;
    }
    Ok(())
}

/// `INTO [TEMPORARY | UNLOGGED] TABLE rel ...`
impl fmt::Display for IntoClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INTO {}TABLE {}", self.rel.persistence, self.rel)?;
        fmt_relation_tail(f, self)
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_select(f, self, self.into.as_ref())
    }
}

/// A SELECT with `into` rendered at the INTO position. Shared by plain
/// SELECT INTO and by a CREATE TABLE AS node that came from SELECT INTO.
fn fmt_select(
    f: &mut fmt::Formatter<'_>,
    sel: &SelectStatement,
    into: Option<&IntoClause>,
) -> fmt::Result {
    f.write_str("SELECT")?;
    if sel.distinct {
        f.write_str(" DISTINCT")?;
    }
    if !sel.targets.is_empty() {
        write!(f, " {}", Commas(&sel.targets))?;
    }
    if let Some(into) = into {
        write!(f, " {}", into)?;
    }
    if !sel.from.is_empty() {
        write!(f, " FROM {}", Commas(&sel.from))?;
    }
    if let Some(expr) = &sel.where_clause {
        write!(f, " WHERE {}", expr)?;
    }
    if !sel.group_by.is_empty() {
        write!(f, " GROUP BY {}", Commas(&sel.group_by))?;
    }
    if let Some(expr) = &sel.having {
        write!(f, " HAVING {}", expr)?;
    }
    if !sel.order_by.is_empty() {
        write!(f, " ORDER BY {}", Commas(&sel.order_by))?;
    }
    if let Some(expr) = &sel.limit {
        write!(f, " LIMIT {}", expr)?;
    }
    if let Some(expr) = &sel.offset {
        write!(f, " OFFSET {}", expr)?;
    }
    Ok(())
}

impl fmt::Display for SelectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectTarget::Wildcard => f.write_str("*"),
            SelectTarget::QualifiedWildcard(parts) => write!(f, "{}.*", Dotted(parts)),
            SelectTarget::Expr { expr, alias } => {
                write!(f, "{}", expr)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", quote_ident(alias))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for FromItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alias = match self {
            FromItem::Table { name, alias } => {
                write!(f, "{}", name)?;
                alias
            }
            FromItem::Subquery { query, alias } => {
                write!(f, "({})", query)?;
                alias
            }
            FromItem::Join(join) => return fmt::Display::fmt(join, f),
        };
        if let Some(alias) = alias {
            write!(f, " AS {}", quote_ident(alias))?;
        }
        Ok(())
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        };
        write!(f, "{} {} {}", self.left, kind, self.right)?;
        if let Some(on) = &self.on {
            write!(f, " ON {}", on)?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.descending {
            f.write_str(" DESC")?;
        }
        match self.nulls {
            Some(NullsOrder::First) => f.write_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", quote_ident(alias))?;
        }
        if !self.columns.is_empty() {
            write!(f, " ({})", Idents(&self.columns))?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                f.write_str(" VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({})", Commas(row))?;
                }
            }
            InsertSource::Query(query) => write!(f, " {}", query)?,
            InsertSource::DefaultValues => f.write_str(" DEFAULT VALUES")?,
        }
        if !self.returning.is_empty() {
            write!(f, " RETURNING {}", Commas(&self.returning))?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateTableAsStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Written back in the syntax it came from.
        if self.is_select_into {
            return fmt_select(f, &self.query, Some(&self.into));
        }

        f.write_str("CREATE ")?;
        if self.or_replace {
            f.write_str("OR REPLACE ")?;
        }
        write!(f, "{}", self.into.rel.persistence)?;
        f.write_str(match self.object_kind {
            ObjectKind::Table => "TABLE ",
            ObjectKind::MaterializedView => "MATERIALIZED VIEW ",
        })?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.into.rel)?;
        fmt_relation_tail(f, &self.into)?;
        write!(f, " AS {}", self.query)?;
        if self.into.skip_data {
            f.write_str(" WITH NO DATA")?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE {}TABLE ", self.rel.persistence)?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        write!(f, "{} ({})", self.rel, Commas(&self.columns))
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.name), self.data_type)?;
        for constraint in &self.constraints {
            match constraint {
                ColumnConstraint::NotNull => f.write_str(" NOT NULL")?,
                ColumnConstraint::Null => f.write_str(" NULL")?,
                ColumnConstraint::Default(expr) => write!(f, " DEFAULT {}", expr)?,
                ColumnConstraint::PrimaryKey => f.write_str(" PRIMARY KEY")?,
                ColumnConstraint::Unique => f.write_str(" UNIQUE")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for CreateViewStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE ")?;
        if self.or_replace {
            f.write_str("OR REPLACE ")?;
        }
        write!(f, "{}VIEW {}", self.rel.persistence, self.rel)?;
        if !self.column_names.is_empty() {
            write!(f, " ({})", Idents(&self.column_names))?;
        }
        write!(f, " AS {}", self.query)
    }
}

impl fmt::Display for ExplainStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EXPLAIN")?;
        if self.analyze {
            f.write_str(" ANALYZE")?;
        }
        if self.verbose {
            f.write_str(" VERBOSE")?;
        }
        write!(f, " {}", self.statement)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&quote_ident(word))?;
        }
        if !self.modifiers.is_empty() {
            write!(f, "({})", Commas(&self.modifiers))?;
        }
        if self.with_time_zone {
            f.write_str(" with time zone")?;
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "||",
        })
    }
}

// Binding strength, loosest first. Mirrors the parser's precedence chain.
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARE: u8 = 4;
const PREC_CONCAT: u8 = 5;
const PREC_ADD: u8 = 6;
const PREC_MUL: u8 = 7;
const PREC_NEG: u8 = 8;
const PREC_PRIMARY: u8 = 9;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => PREC_OR,
        BinaryOp::And => PREC_AND,
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => PREC_COMPARE,
        BinaryOp::Concat => PREC_CONCAT,
        BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => PREC_MUL,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp { op, .. } => binary_precedence(*op),
        Expr::UnaryOp {
            op: UnaryOp::Not, ..
        } => PREC_NOT,
        Expr::UnaryOp {
            op: UnaryOp::Neg, ..
        } => PREC_NEG,
        Expr::IsNull { .. }
        | Expr::IsBool { .. }
        | Expr::Like { .. }
        | Expr::InList { .. }
        | Expr::InSubquery { .. }
        | Expr::Between { .. } => PREC_COMPARE,
        _ => PREC_PRIMARY,
    }
}

/// An operand that binds at least as tightly as `min`, parenthesised
/// otherwise.
struct Operand<'a>(&'a Expr, u8);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if precedence(self.0) < self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Negation prefix. A leading `-` on the operand would read as a comment
/// start or fold into a literal, so such operands are parenthesised.
fn fmt_negation(f: &mut fmt::Formatter<'_>, operand: &Expr) -> fmt::Result {
    let signed = match operand {
        Expr::Number(n) => n.starts_with('-'),
        Expr::UnaryOp {
            op: UnaryOp::Neg, ..
        } => true,
        _ => false,
    };
    if signed {
        write!(f, "-({})", operand)
    } else {
        write!(f, "-{}", Operand(operand, PREC_NEG))
    }
}

fn not_kw(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Null => f.write_str("NULL"),
            Expr::Boolean(true) => f.write_str("TRUE"),
            Expr::Boolean(false) => f.write_str("FALSE"),
            Expr::Number(n) => f.write_str(n),
            Expr::String(s) => f.write_str(&quote_literal(s)),
            Expr::Param(n) => write!(f, "${}", n),
            Expr::Default => f.write_str("DEFAULT"),
            Expr::Column(parts) => write!(f, "{}", Dotted(parts)),
            Expr::QualifiedWildcard(parts) => write!(f, "{}.*", Dotted(parts)),
            Expr::BinaryOp { left, op, right } => {
                let prec = binary_precedence(*op);
                // Comparisons do not chain; both sides bind tighter.
                let (left_min, right_min) = if prec == PREC_COMPARE {
                    (prec + 1, prec + 1)
                } else {
                    (prec, prec + 1)
                };
                write!(
                    f,
                    "{} {} {}",
                    Operand(left, left_min),
                    op,
                    Operand(right, right_min)
                )
            }
            Expr::UnaryOp {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "NOT {}", Operand(operand, PREC_NOT)),
            Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand,
            } => fmt_negation(f, operand),
            Expr::IsNull { expr, negated } => write!(
                f,
                "{} IS {}NULL",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated)
            ),
            Expr::IsBool {
                expr,
                value,
                negated,
            } => write!(
                f,
                "{} IS {}{}",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated),
                if *value { "TRUE" } else { "FALSE" }
            ),
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => write!(
                f,
                "{} {}{} {}",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated),
                if *case_insensitive { "ILIKE" } else { "LIKE" },
                Operand(pattern, PREC_CONCAT)
            ),
            Expr::InList {
                expr,
                list,
                negated,
            } => write!(
                f,
                "{} {}IN ({})",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated),
                Commas(list)
            ),
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => write!(
                f,
                "{} {}IN ({})",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated),
                subquery
            ),
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                Operand(expr, PREC_CONCAT),
                not_kw(*negated),
                Operand(low, PREC_CONCAT),
                Operand(high, PREC_CONCAT)
            ),
            Expr::Exists(query) => write!(f, "EXISTS ({})", query),
            Expr::Subquery(query) => write!(f, "({})", query),
            Expr::FunctionCall {
                name,
                args,
                distinct,
                star,
            } => {
                write!(f, "{}(", Dotted(name))?;
                if *star {
                    f.write_str("*")?;
                } else {
                    if *distinct {
                        f.write_str("DISTINCT ")?;
                    }
                    write!(f, "{}", Commas(args))?;
                }
                f.write_str(")")
            }
            Expr::Cast { expr, data_type } => write!(f, "CAST({} AS {})", expr, data_type),
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                for (condition, result) in when_clauses {
                    write!(f, " WHEN {} THEN {}", condition, result)?;
                }
                if let Some(else_clause) = else_clause {
                    write!(f, " ELSE {}", else_clause)?;
                }
                f.write_str(" END")
            }
        }
    }
}
