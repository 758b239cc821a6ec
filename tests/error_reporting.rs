use sqlfront::{parse_sql, parse_statement, ParseError};

#[test]
fn test_error_names_expected_tokens() {
    let err = parse_sql("SELECT * INTO FROM t").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.found, "FROM");
    assert_eq!(syntax.expected, vec!["identifier".to_string()]);
    assert_eq!(
        err.to_string(),
        "syntax error at line 1, column 15: expected identifier, found \"FROM\""
    );
}

#[test]
fn test_first_error_aborts_batch() {
    let err = parse_sql("SELECT 1; SELECT FROM WHERE; SELECT 2").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.found, "WHERE");
    assert_eq!(syntax.position.column, 23);
}

#[test]
fn test_error_at_end_of_input() {
    let err = parse_statement("INSERT INTO").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert!(syntax.is_end_of_input());
    assert_eq!(syntax.position.column, 12);
    assert_eq!(
        err.to_string(),
        "syntax error at line 1, column 12: expected identifier, found end of input"
    );
}

#[test]
fn test_lex_error_has_position() {
    let err = parse_sql("SELECT 1;\n  SELECT #").unwrap_err();
    match err {
        ParseError::Lex { position, .. } => {
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 10);
        }
        other => panic!("expected lex error, got {:?}", other),
    }
}

#[test]
fn test_with_option_requires_value_or_separator() {
    let err = parse_sql("CREATE TABLE t WITH (fillfactor 70) AS SELECT 1").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.found, "70");
    assert_eq!(syntax.expected, vec![",".to_string(), ")".to_string()]);
}

#[test]
fn test_on_commit_requires_action() {
    let err = parse_sql("SELECT 1 INTO TEMP t ON COMMIT KEEP").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.found, "keep");
    assert_eq!(
        syntax.expected,
        vec![
            "PRESERVE ROWS".to_string(),
            "DELETE ROWS".to_string(),
            "DROP".to_string()
        ]
    );
}
