use super::*;

impl Parser {
    /// Everything starting with CREATE. `CREATE TABLE`, `CREATE TABLE ... AS`,
    /// `CREATE MATERIALIZED VIEW` and `CREATE VIEW` share their prefix, so the
    /// modifiers and the object keyword are read before choosing a parser.
    pub(super) fn parse_create(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;

        let or_replace = if self.eat(&Token::Or) {
            self.expect(&Token::Replace)?;
            true
        } else {
            false
        };
        let persistence = self.parse_persistence()?;

        match self.peek() {
            Some(Token::Table) => {
                self.advance();
                let if_not_exists = self.parse_if_not_exists()?;
                let rel = self.parse_new_relation(persistence)?;

                if self.peek_is(&Token::LParen) && !self.is_column_name_list_ahead() {
                    // OR REPLACE only applies to the AS form.
                    if or_replace {
                        return Err(self.error(&["AS", "column name list"]));
                    }
                    let columns = self.parse_column_defs()?;
                    return Ok(Statement::CreateTable(CreateTableStatement {
                        rel,
                        if_not_exists,
                        columns,
                    }));
                }
                self.parse_create_table_as(rel, ObjectKind::Table, if_not_exists, or_replace)
            }
            Some(Token::Materialized) if persistence != Persistence::Temporary => {
                self.advance();
                self.expect(&Token::View)?;
                let if_not_exists = self.parse_if_not_exists()?;
                let rel = self.parse_new_relation(persistence)?;
                self.parse_create_table_as(
                    rel,
                    ObjectKind::MaterializedView,
                    if_not_exists,
                    or_replace,
                )
            }
            Some(Token::View) if persistence != Persistence::Unlogged => {
                self.advance();
                let rel = self.parse_new_relation(persistence)?;
                let column_names = if self.peek_is(&Token::LParen) {
                    self.parse_column_name_list()?
                } else {
                    Vec::new()
                };
                self.expect(&Token::As)?;
                let query = self.parse_nested_select()?;
                Ok(Statement::CreateView(Box::new(CreateViewStatement {
                    rel,
                    or_replace,
                    column_names,
                    query: Box::new(query),
                })))
            }
            _ => {
                let expected: &[&str] = match persistence {
                    Persistence::Temporary => &["TABLE", "VIEW"],
                    Persistence::Unlogged => &["TABLE", "MATERIALIZED VIEW"],
                    Persistence::Permanent => &["TABLE", "VIEW", "MATERIALIZED VIEW"],
                };
                Err(self.error(expected))
            }
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool> {
        if self.eat(&Token::If) {
            self.expect(&Token::Not)?;
            self.expect(&Token::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_new_relation(&mut self, persistence: Persistence) -> Result<RelationReference> {
        let name = self.parse_object_name()?;
        Ok(RelationReference {
            schema: name.schema,
            name: name.name,
            persistence,
        })
    }

    /// True if a parenthesised list of bare names is ahead, which can only be
    /// the column-name list of CREATE TABLE ... AS. Column definitions always
    /// carry a type after the name.
    fn is_column_name_list_ahead(&self) -> bool {
        if self.peek() != Some(&Token::LParen) {
            return false;
        }
        let mut i = 1;
        loop {
            if !self.is_ident_ahead(i) {
                return false;
            }
            match self.peek_nth(i + 1) {
                Some(Token::Comma) => i += 2,
                Some(Token::RParen) => return true,
                _ => return false,
            }
        }
    }

    /// Tail of CREATE TABLE ... AS / CREATE MATERIALIZED VIEW after the
    /// relation name.
    fn parse_create_table_as(
        &mut self,
        rel: RelationReference,
        object_kind: ObjectKind,
        if_not_exists: bool,
        or_replace: bool,
    ) -> Result<Statement> {
        let mut into = self.parse_relation_tail(rel, object_kind == ObjectKind::Table)?;
        self.expect(&Token::As)?;

        // Parsed in the nested context: a textual INTO inside the query is a
        // syntax error there, never the outer target.
        let query = self.parse_nested_select()?;
        into.skip_data = self.parse_with_data()?;

        let ctas = CreateTableAsStatement {
            query: Box::new(query),
            into,
            object_kind,
            is_select_into: false,
            if_not_exists,
            or_replace,
        };
        ctas.check_invariants()?;
        Ok(Statement::CreateTableAs(Box::new(ctas)))
    }

    fn parse_column_defs(&mut self) -> Result<Vec<ColumnDef>> {
        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(columns);
        }
        loop {
            columns.push(self.parse_column_def()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::RParen) => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error(&[",", ")"])),
            }
        }
        Ok(columns)
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_ident()?;
        let data_type = self.parse_type_name()?;

        let mut constraints = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Not) => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    constraints.push(ColumnConstraint::NotNull);
                }
                Some(Token::Null) => {
                    self.advance();
                    constraints.push(ColumnConstraint::Null);
                }
                Some(Token::Default) => {
                    self.advance();
                    constraints.push(ColumnConstraint::Default(self.parse_expr()?));
                }
                Some(Token::Primary) => {
                    self.advance();
                    self.expect(&Token::Key)?;
                    constraints.push(ColumnConstraint::PrimaryKey);
                }
                Some(Token::Unique) => {
                    self.advance();
                    constraints.push(ColumnConstraint::Unique);
                }
                _ => break,
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }
}
