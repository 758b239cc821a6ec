/// Typed statement and clause nodes.
///
/// Node identity carries statement semantics: a query that creates a relation
/// is either a `SelectStatement` holding an `IntoClause` or a
/// `CreateTableAsStatement`, never a plain read with a flag. Every node is
/// built once by its parser and owned exclusively by its parent.
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Box<SelectStatement>),
    Insert(Box<InsertStatement>),
    CreateTable(CreateTableStatement),
    CreateTableAs(Box<CreateTableAsStatement>),
    CreateView(Box<CreateViewStatement>),
    Explain(Box<ExplainStatement>),
}

impl Statement {
    /// The relation this statement creates when executed, if any.
    pub fn created_relation(&self) -> Option<&RelationReference> {
        match self {
            Statement::Select(sel) => sel.into.as_ref().map(|into| &into.rel),
            Statement::Insert(_) => None,
            Statement::CreateTable(ct) => Some(&ct.rel),
            Statement::CreateTableAs(ctas) => Some(&ctas.into.rel),
            Statement::CreateView(cv) => Some(&cv.rel),
            // Plain EXPLAIN only plans; EXPLAIN ANALYZE runs the statement.
            Statement::Explain(ex) if ex.analyze => ex.statement.created_relation(),
            Statement::Explain(_) => None,
        }
    }

    /// True when the statement is a pure read with no side effects.
    pub fn is_read_only(&self) -> bool {
        match self {
            Statement::Select(sel) => sel.into.is_none(),
            Statement::Explain(ex) => !ex.analyze || ex.statement.is_read_only(),
            _ => false,
        }
    }
}

/// Storage persistence of a relation being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    #[default]
    Permanent,
    Temporary,
    Unlogged,
}

/// A possibly schema-qualified name of an existing object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectName {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        ObjectName {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

/// Target of a relation-creating statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationReference {
    pub schema: Option<String>,
    pub name: String,
    pub persistence: Persistence,
}

impl RelationReference {
    pub fn qualified_name(&self) -> ObjectName {
        ObjectName {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnCommit {
    #[default]
    Noop,
    PreserveRows,
    DeleteRows,
    Drop,
}

/// Value of a `WITH (name = value)` storage option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Number(String),
    String(String),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOption {
    pub name: String,
    pub value: Option<OptionValue>,
}

/// "Create relation `rel` from this query's result."
///
/// Carried either by a `SelectStatement` (`SELECT ... INTO`) or by a
/// `CreateTableAsStatement`, never by both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntoClause {
    pub rel: RelationReference,
    pub column_names: Vec<String>,
    pub access_method: Option<String>,
    pub options: Vec<StorageOption>,
    pub on_commit: OnCommit,
    pub tablespace: Option<String>,
    /// `WITH NO DATA`: create the relation but do not populate it.
    pub skip_data: bool,
}

impl IntoClause {
    pub fn new(rel: RelationReference) -> Self {
        IntoClause {
            rel,
            column_names: Vec::new(),
            access_method: None,
            options: Vec::new(),
            on_commit: OnCommit::Noop,
            tablespace: None,
            skip_data: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub targets: Vec<SelectTarget>,
    /// Present only for `SELECT ... INTO`; absent means a pure read.
    pub into: Option<IntoClause>,
    pub from: Vec<FromItem>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl SelectStatement {
    /// Reinterpret `SELECT ... INTO` as the table creation it denotes.
    ///
    /// The IntoClause moves to the outer node, so the returned statement's
    /// query never carries one. A SELECT without INTO is handed back as-is.
    pub fn into_create_table_as(
        mut self,
    ) -> std::result::Result<CreateTableAsStatement, SelectStatement> {
        match self.into.take() {
            Some(into) => Ok(CreateTableAsStatement {
                query: Box::new(self),
                into,
                object_kind: ObjectKind::Table,
                is_select_into: true,
                if_not_exists: false,
                or_replace: false,
            }),
            None => Err(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectTarget {
    Wildcard,
    /// `t.*` or `s.t.*`; holds the qualifier parts.
    QualifiedWildcard(Vec<String>),
    Expr { expr: Expr, alias: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    Table {
        name: ObjectName,
        alias: Option<String>,
    },
    Subquery {
        query: Box<SelectStatement>,
        alias: Option<String>,
    },
    Join(Box<Join>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub left: FromItem,
    pub right: FromItem,
    pub on: Option<Expr>, // None for CROSS JOIN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub descending: bool,
    pub nulls: Option<NullsOrder>,
}

/// `INSERT INTO` an existing table. Shares the INTO keyword with
/// `SELECT ... INTO` but nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: ObjectName,
    pub alias: Option<String>,
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub returning: Vec<SelectTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Query(Box<SelectStatement>),
    DefaultValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    MaterializedView,
}

/// `CREATE TABLE ... AS` / `CREATE MATERIALIZED VIEW ... AS`, or a
/// `SELECT ... INTO` reinterpreted by an enclosing statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableAsStatement {
    pub query: Box<SelectStatement>,
    pub into: IntoClause,
    pub object_kind: ObjectKind,
    /// Set only when the node came from `SELECT ... INTO` syntax.
    pub is_select_into: bool,
    pub if_not_exists: bool,
    pub or_replace: bool,
}

impl CreateTableAsStatement {
    /// Structural guarantees every constructed node must satisfy. A failure
    /// here is a parser bug, not a user error.
    pub fn check_invariants(&self) -> Result<()> {
        if self.query.into.is_some() {
            return Err(ParseError::InvariantViolation(format!(
                "inner query of {} carries its own INTO clause",
                self.into.rel.name
            )));
        }
        if self.is_select_into && self.object_kind != ObjectKind::Table {
            return Err(ParseError::InvariantViolation(
                "SELECT INTO can only create a table".into(),
            ));
        }
        Ok(())
    }
}

/// Plain `CREATE TABLE name (column definitions)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub rel: RelationReference,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: TypeName,
    pub constraints: Vec<ColumnConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    Default(Expr),
    PrimaryKey,
    Unique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    pub rel: RelationReference,
    pub or_replace: bool,
    pub column_names: Vec<String>,
    pub query: Box<SelectStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplainStatement {
    pub analyze: bool,
    pub verbose: bool,
    pub statement: Statement,
}

/// A type name as written: `integer`, `double precision`, `varchar(20)`,
/// `timestamp with time zone`, `text[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub words: Vec<String>,
    pub modifiers: Vec<String>,
    pub with_time_zone: bool,
    pub array_dims: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Boolean(bool),
    /// Numeric literal in its source spelling.
    Number(String),
    String(String),
    Param(u32),
    /// `DEFAULT` inside an INSERT VALUES row.
    Default,
    /// Possibly qualified column reference, one element per name part.
    Column(Vec<String>),
    /// `t.*` used as a value, e.g. `count(t.*)`.
    QualifiedWildcard(Vec<String>),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool, // true = IS NOT NULL
    },
    IsBool {
        expr: Box<Expr>,
        value: bool,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<SelectStatement>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Exists(Box<SelectStatement>),
    Subquery(Box<SelectStatement>),
    FunctionCall {
        name: Vec<String>,
        args: Vec<Expr>,
        distinct: bool,
        star: bool, // count(*)
    },
    Cast {
        expr: Box<Expr>,
        data_type: TypeName,
    },
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_star_from(table: &str) -> SelectStatement {
        SelectStatement {
            distinct: false,
            targets: vec![SelectTarget::Wildcard],
            into: None,
            from: vec![FromItem::Table {
                name: ObjectName::new(table),
                alias: None,
            }],
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn test_into_create_table_as_moves_into_clause() {
        let mut sel = select_star_from("src");
        sel.into = Some(IntoClause::new(RelationReference {
            schema: None,
            name: "dst".into(),
            persistence: Persistence::Temporary,
        }));

        let ctas = sel.into_create_table_as().unwrap();
        assert!(ctas.is_select_into);
        assert_eq!(ctas.object_kind, ObjectKind::Table);
        assert_eq!(ctas.into.rel.name, "dst");
        assert_eq!(ctas.into.rel.persistence, Persistence::Temporary);
        assert!(ctas.query.into.is_none());
        ctas.check_invariants().unwrap();
    }

    #[test]
    fn test_into_create_table_as_returns_plain_select() {
        let sel = select_star_from("src");
        let back = sel.clone().into_create_table_as().unwrap_err();
        assert_eq!(back, sel);
    }

    #[test]
    fn test_check_invariants_rejects_inner_into() {
        let mut inner = select_star_from("src");
        inner.into = Some(IntoClause::new(RelationReference {
            schema: None,
            name: "leak".into(),
            persistence: Persistence::Permanent,
        }));
        let ctas = CreateTableAsStatement {
            query: Box::new(inner),
            into: IntoClause::new(RelationReference {
                schema: None,
                name: "dst".into(),
                persistence: Persistence::Permanent,
            }),
            object_kind: ObjectKind::Table,
            is_select_into: false,
            if_not_exists: false,
            or_replace: false,
        };
        assert!(matches!(
            ctas.check_invariants(),
            Err(ParseError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_created_relation() {
        let read = Statement::Select(Box::new(select_star_from("src")));
        assert!(read.created_relation().is_none());
        assert!(read.is_read_only());

        let mut sel = select_star_from("src");
        sel.into = Some(IntoClause::new(RelationReference {
            schema: Some("s".into()),
            name: "dst".into(),
            persistence: Persistence::Permanent,
        }));
        let write = Statement::Select(Box::new(sel));
        assert!(!write.is_read_only());
        assert_eq!(
            write.created_relation().map(|r| r.qualified_name()),
            Some(ObjectName::qualified("s", "dst"))
        );
    }
}
