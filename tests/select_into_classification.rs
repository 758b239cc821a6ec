//! SELECT ... FROM, SELECT ... INTO, INSERT INTO and CREATE ... AS must land
//! on different node shapes and categories.
use sqlfront::sql::ast::*;
use sqlfront::{parse_sql, Statement, StatementType};

fn parse_one(sql: &str) -> Statement {
    let mut stmts = parse_sql(sql).unwrap();
    assert_eq!(stmts.len(), 1);
    stmts.remove(0)
}

#[test]
fn test_select_from_is_plain_read() {
    let stmt = parse_one("SELECT * FROM tbl");
    assert_eq!(stmt.statement_type().as_str(), "SELECT");
    assert!(stmt.is_read_only());
    if let Statement::Select(sel) = stmt {
        assert!(sel.into.is_none());
    } else {
        panic!("Expected Select");
    }
}

#[test]
fn test_select_into_creates_table() {
    let stmt = parse_one("SELECT * INTO new_tbl FROM src_tbl");
    assert_eq!(stmt.statement_type().as_str(), "SELECT INTO");
    assert!(!stmt.is_read_only());
    assert_eq!(stmt.created_relation().map(|r| r.name.as_str()), Some("new_tbl"));
    if let Statement::Select(sel) = stmt {
        assert_eq!(sel.into.as_ref().unwrap().rel.name, "new_tbl");
    } else {
        panic!("Expected Select");
    }
}

#[test]
fn test_select_into_table_is_equivalent() {
    let a = parse_one("SELECT * INTO TABLE new_tbl FROM src_tbl");
    let b = parse_one("SELECT * INTO new_tbl FROM src_tbl");
    assert_eq!(a.statement_type(), StatementType::SelectInto);
    assert_eq!(a, b);
}

#[test]
fn test_select_columns_into_keeps_from() {
    let stmt = parse_one("SELECT id, name INTO new_tbl FROM users WHERE active = true");
    assert_eq!(stmt.statement_type(), StatementType::SelectInto);
    if let Statement::Select(sel) = stmt {
        assert_eq!(sel.into.as_ref().unwrap().rel.name, "new_tbl");
        assert!(!sel.from.is_empty());
        assert!(sel.where_clause.is_some());
    } else {
        panic!("Expected Select");
    }
}

#[test]
fn test_select_into_temp_table() {
    let stmt = parse_one("SELECT * INTO TEMP TABLE tmp_tbl FROM src_tbl");
    assert_eq!(stmt.statement_type(), StatementType::SelectInto);
    let rel = stmt.created_relation().unwrap();
    assert_eq!(rel.name, "tmp_tbl");
    assert_eq!(rel.persistence, Persistence::Temporary);
}

#[test]
fn test_schema_qualified_select_into() {
    let stmt = parse_one("SELECT * INTO myschema.new_tbl FROM src_tbl");
    assert_eq!(stmt.statement_type(), StatementType::SelectInto);
    let rel = stmt.created_relation().unwrap();
    assert_eq!(rel.name, "new_tbl");
    assert_eq!(rel.schema.as_deref(), Some("myschema"));
}

#[test]
fn test_create_table_as() {
    let stmt = parse_one("CREATE TABLE new_tbl AS SELECT * FROM src_tbl");
    assert_eq!(stmt.statement_type().as_str(), "CREATE TABLE AS");
    if let Statement::CreateTableAs(ctas) = stmt {
        assert!(!ctas.is_select_into);
        assert_eq!(ctas.into.rel.name, "new_tbl");
        assert!(ctas.query.into.is_none());
    } else {
        panic!("Expected CreateTableAs");
    }
}

#[test]
fn test_create_materialized_view() {
    let stmt = parse_one("CREATE MATERIALIZED VIEW mv AS SELECT * FROM tbl");
    assert_eq!(stmt.statement_type().as_str(), "CREATE MATERIALIZED VIEW");
    if let Statement::CreateTableAs(ctas) = stmt {
        assert_eq!(ctas.object_kind, ObjectKind::MaterializedView);
        assert!(!ctas.is_select_into);
    } else {
        panic!("Expected CreateTableAs");
    }
}

#[test]
fn test_insert_into_is_not_select_into() {
    let stmt = parse_one("INSERT INTO tbl (col) VALUES (1)");
    assert_eq!(stmt.statement_type().as_str(), "INSERT");
    assert!(stmt.created_relation().is_none());
    assert!(matches!(stmt, Statement::Insert(_)));
}

#[test]
fn test_select_literal_into() {
    let stmt = parse_one("SELECT 1 INTO tbl");
    assert_eq!(stmt.statement_type().as_str(), "SELECT INTO");
    if let Statement::Select(sel) = stmt {
        assert!(sel.into.is_some());
    } else {
        panic!("Expected Select");
    }
}

#[test]
fn test_explain_select_into_creates_only_when_analyzed() {
    let plan = parse_one("EXPLAIN SELECT * INTO n FROM t");
    assert_eq!(plan.statement_type(), StatementType::Explain);
    assert!(plan.created_relation().is_none());
    assert!(plan.is_read_only());

    let run = parse_one("EXPLAIN ANALYZE SELECT * INTO n FROM t");
    assert_eq!(run.created_relation().map(|r| r.name.as_str()), Some("n"));
    assert!(!run.is_read_only());
}
