//! Statement categories.
//!
//! The category strings are a public contract used for routing and logging.
//! Every match here is exhaustive over the statement variants, so a new
//! variant cannot be added without choosing its category.
use std::fmt;

use crate::sql::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    SelectInto,
    Insert,
    CreateTable,
    CreateTableAs,
    CreateMaterializedView,
    CreateView,
    Explain,
}

impl StatementType {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementType::Select => "SELECT",
            StatementType::SelectInto => "SELECT INTO",
            StatementType::Insert => "INSERT",
            StatementType::CreateTable => "CREATE TABLE",
            StatementType::CreateTableAs => "CREATE TABLE AS",
            StatementType::CreateMaterializedView => "CREATE MATERIALIZED VIEW",
            StatementType::CreateView => "CREATE VIEW",
            StatementType::Explain => "EXPLAIN",
        }
    }

    /// True for categories whose statements create a relation.
    pub fn creates_relation(self) -> bool {
        !matches!(
            self,
            StatementType::Select | StatementType::Insert | StatementType::Explain
        )
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Statement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            Statement::Select(sel) => sel.statement_type(),
            Statement::Insert(ins) => ins.statement_type(),
            Statement::CreateTable(ct) => ct.statement_type(),
            Statement::CreateTableAs(ctas) => ctas.statement_type(),
            Statement::CreateView(cv) => cv.statement_type(),
            Statement::Explain(ex) => ex.statement_type(),
        }
    }
}

impl SelectStatement {
    pub fn statement_type(&self) -> StatementType {
        match self.into {
            Some(_) => StatementType::SelectInto,
            None => StatementType::Select,
        }
    }
}

impl InsertStatement {
    pub fn statement_type(&self) -> StatementType {
        StatementType::Insert
    }
}

impl CreateTableStatement {
    pub fn statement_type(&self) -> StatementType {
        StatementType::CreateTable
    }
}

impl CreateTableAsStatement {
    /// A node reinterpreted from `SELECT ... INTO` keeps the category of the
    /// syntax it was written in; it also renders back as SELECT INTO.
    pub fn statement_type(&self) -> StatementType {
        match (self.object_kind, self.is_select_into) {
            (ObjectKind::MaterializedView, _) => StatementType::CreateMaterializedView,
            (ObjectKind::Table, true) => StatementType::SelectInto,
            (ObjectKind::Table, false) => StatementType::CreateTableAs,
        }
    }
}

impl CreateViewStatement {
    pub fn statement_type(&self) -> StatementType {
        StatementType::CreateView
    }
}

impl ExplainStatement {
    pub fn statement_type(&self) -> StatementType {
        StatementType::Explain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parser::parse_statement;

    fn classify(sql: &str) -> &'static str {
        parse_statement(sql).unwrap().statement_type().as_str()
    }

    #[test]
    fn test_select_categories() {
        assert_eq!(classify("SELECT * FROM t"), "SELECT");
        assert_eq!(classify("SELECT 1"), "SELECT");
        assert_eq!(classify("SELECT * INTO n FROM t"), "SELECT INTO");
        assert_eq!(classify("SELECT * INTO TABLE n FROM t"), "SELECT INTO");
        assert_eq!(classify("SELECT a INTO TEMP n FROM t"), "SELECT INTO");
    }

    #[test]
    fn test_create_categories() {
        assert_eq!(classify("CREATE TABLE n AS SELECT * FROM t"), "CREATE TABLE AS");
        assert_eq!(
            classify("CREATE MATERIALIZED VIEW mv AS SELECT * FROM t"),
            "CREATE MATERIALIZED VIEW"
        );
        assert_eq!(classify("CREATE TABLE n (a int)"), "CREATE TABLE");
        assert_eq!(classify("CREATE VIEW v AS SELECT 1"), "CREATE VIEW");
    }

    #[test]
    fn test_insert_and_explain_categories() {
        assert_eq!(classify("INSERT INTO t VALUES (1)"), "INSERT");
        assert_eq!(classify("INSERT INTO t SELECT * FROM s"), "INSERT");
        assert_eq!(classify("EXPLAIN SELECT * INTO n FROM t"), "EXPLAIN");
    }

    #[test]
    fn test_reinterpreted_select_into_keeps_category() {
        let stmt = parse_statement("EXPLAIN SELECT * INTO n FROM t").unwrap();
        if let Statement::Explain(ex) = stmt {
            assert_eq!(ex.statement.statement_type(), StatementType::SelectInto);
        } else {
            panic!("Expected Explain");
        }
    }

    #[test]
    fn test_creates_relation() {
        assert!(!StatementType::Select.creates_relation());
        assert!(StatementType::SelectInto.creates_relation());
        assert!(StatementType::CreateMaterializedView.creates_relation());
        assert!(!StatementType::Insert.creates_relation());
        assert_eq!(StatementType::CreateTableAs.to_string(), "CREATE TABLE AS");
    }
}
