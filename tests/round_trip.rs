//! Rendering a parsed statement and parsing the text again preserves its
//! category, its target relation and the whole tree.
use sqlfront::{parse_sql, parse_statement, Statement};

const CORPUS: &[&str] = &[
    "SELECT a, b FROM tbl WHERE a > 1",
    "SELECT * INTO new_tbl FROM src_tbl WHERE id > 100",
    "SELECT * INTO TABLE new_tbl FROM src_tbl",
    "select * into temporary table t1 from src",
    "SELECT * INTO UNLOGGED s.t2 (x, y) WITH (fillfactor = 90) FROM src",
    "SELECT 1 INTO tbl",
    "CREATE OR REPLACE TABLE t AS SELECT 1",
    "CREATE TABLE t AS ((SELECT count(u.*) FROM u))",
    "SELECT DISTINCT ON_time FROM t",
    "SELECT a AS \"A\", \"b c\" FROM \"T\" AS x WHERE x.a <> 'it''s'",
    "SELECT * FROM a LEFT JOIN b ON a.id = b.id RIGHT JOIN c ON c.id = b.id FULL OUTER JOIN d ON TRUE",
    "SELECT (SELECT max(v) FROM w) AS m, EXISTS (SELECT 1) FROM t",
    "SELECT a FROM t WHERE NOT (a = 1 OR b = 2) AND c NOT IN (SELECT c FROM u)",
    "SELECT a * (b + c) / 2 % 3, (a || b) || c, a || (b || c) FROM t",
    "SELECT -(-1), - x, +y, 2 - (-3) FROM t",
    "SELECT CASE a WHEN 1 THEN 'one' ELSE 'many' END, CAST($1 AS bigint) FROM t",
    "SELECT x::character varying(10), y::double precision[][] FROM t",
    "SELECT * FROM t ORDER BY a DESC NULLS FIRST, b LIMIT $1 OFFSET $2",
    "CREATE TABLE new_tbl AS SELECT * FROM src_tbl",
    "CREATE TEMPORARY TABLE IF NOT EXISTS n (a) ON COMMIT DELETE ROWS AS SELECT 1 WITH NO DATA",
    "CREATE MATERIALIZED VIEW mv AS SELECT * FROM tbl",
    "CREATE UNLOGGED MATERIALIZED VIEW IF NOT EXISTS s.mv USING heap TABLESPACE ts AS SELECT 1",
    "CREATE TABLE t (id serial PRIMARY KEY, v numeric(12, 4) DEFAULT 0 NOT NULL, at time with time zone)",
    "CREATE VIEW v AS SELECT a FROM t",
    "INSERT INTO tbl (col) VALUES (1)",
    "INSERT INTO t VALUES (1, 'a'), (DEFAULT, NULL) RETURNING *",
    "INSERT INTO t (a, b) SELECT x, y FROM u WHERE x > 0",
    "EXPLAIN SELECT * INTO n FROM t",
    "EXPLAIN ANALYZE CREATE MATERIALIZED VIEW mv AS SELECT 1",
    "EXPLAIN INSERT INTO t DEFAULT VALUES",
];

fn reparse(stmt: &Statement) -> Statement {
    let text = stmt.sql_string();
    parse_statement(&text).unwrap_or_else(|e| panic!("re-parse of {:?} failed: {}", text, e))
}

#[test]
fn test_classification_survives_round_trip() {
    for sql in CORPUS {
        let stmt = parse_statement(sql).unwrap();
        let again = reparse(&stmt);
        assert_eq!(stmt.statement_type(), again.statement_type(), "{}", sql);
    }
}

#[test]
fn test_target_relation_survives_round_trip() {
    for sql in CORPUS {
        let stmt = parse_statement(sql).unwrap();
        let again = reparse(&stmt);
        assert_eq!(
            stmt.created_relation().map(|r| r.qualified_name()),
            again.created_relation().map(|r| r.qualified_name()),
            "{}",
            sql
        );
    }
}

#[test]
fn test_tree_survives_round_trip() {
    for sql in CORPUS {
        let stmt = parse_statement(sql).unwrap();
        assert_eq!(stmt, reparse(&stmt), "{}", sql);
    }
}

#[test]
fn test_rendering_is_stable() {
    for sql in CORPUS {
        let once = parse_statement(sql).unwrap().sql_string();
        let twice = parse_statement(&once).unwrap().sql_string();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_batch_round_trip() {
    let batch = CORPUS.join(";\n");
    let stmts = parse_sql(&batch).unwrap();
    assert_eq!(stmts.len(), CORPUS.len());

    let rendered: Vec<String> = stmts.iter().map(|s| s.sql_string()).collect();
    let again = parse_sql(&rendered.join("; ")).unwrap();
    assert_eq!(stmts, again);
}
