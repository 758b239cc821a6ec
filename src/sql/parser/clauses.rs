//! Clause parsers shared by the statement parsers: target relations, the
//! SELECT INTO clause and the storage tail shared with CREATE TABLE AS.
use super::*;

impl Parser {
    /// `name` or `schema.name`.
    pub(super) fn parse_object_name(&mut self) -> Result<ObjectName> {
        let first = self.expect_ident()?;
        if self.eat(&Token::Dot) {
            let name = self.expect_ident()?;
            Ok(ObjectName {
                schema: Some(first),
                name,
            })
        } else {
            Ok(ObjectName {
                schema: None,
                name: first,
            })
        }
    }

    /// Optional persistence modifier: `TEMP`, `TEMPORARY`, `LOCAL TEMP`,
    /// `GLOBAL TEMP` or `UNLOGGED`.
    ///
    /// The modifiers are also valid relation names, so a modifier is only
    /// taken when a `TABLE` keyword or another name follows it.
    pub(super) fn parse_persistence(&mut self) -> Result<Persistence> {
        match self.peek() {
            Some(Token::Local) | Some(Token::Global)
                if matches!(self.peek_nth(1), Some(Token::Temp | Token::Temporary)) =>
            {
                self.advance(); // LOCAL / GLOBAL
                self.advance(); // TEMP
                Ok(Persistence::Temporary)
            }
            Some(Token::Temp | Token::Temporary) if self.modifier_applies() => {
                self.advance();
                Ok(Persistence::Temporary)
            }
            Some(Token::Unlogged) if self.modifier_applies() => {
                self.advance();
                Ok(Persistence::Unlogged)
            }
            _ => Ok(Persistence::Permanent),
        }
    }

    fn modifier_applies(&self) -> bool {
        matches!(self.peek_nth(1), Some(Token::Table)) || self.is_ident_ahead(1)
    }

    /// Target relation of `SELECT ... INTO`: persistence modifier, an
    /// optional `TABLE` keyword with no meaning of its own, and a possibly
    /// schema-qualified name.
    pub(super) fn parse_target_relation(&mut self) -> Result<RelationReference> {
        let persistence = self.parse_persistence()?;
        self.eat(&Token::Table);
        let name = self.parse_object_name()?;
        Ok(RelationReference {
            schema: name.schema,
            name: name.name,
            persistence,
        })
    }

    /// The INTO clause of a SELECT. Absence is a normal outcome and yields
    /// `None`.
    pub(super) fn parse_into_clause(&mut self) -> Result<Option<IntoClause>> {
        if !self.eat(&Token::Into) {
            return Ok(None);
        }
        let rel = self.parse_target_relation()?;
        let into = self.parse_relation_tail(rel, true)?;
        Ok(Some(into))
    }

    /// Everything that may follow the new relation's name:
    /// `[(col, ...)] [USING method] [WITH (option, ...)] [ON COMMIT ...]
    /// [TABLESPACE name]`.
    pub(super) fn parse_relation_tail(
        &mut self,
        rel: RelationReference,
        allow_on_commit: bool,
    ) -> Result<IntoClause> {
        let mut into = IntoClause::new(rel);

        if self.peek_is(&Token::LParen) {
            into.column_names = self.parse_column_name_list()?;
        }

        if self.eat(&Token::Using) {
            into.access_method = Some(self.expect_ident()?);
        }

        if self.peek_is(&Token::With) && self.peek_nth(1) == Some(&Token::LParen) {
            self.advance(); // WITH
            into.options = self.parse_storage_options()?;
        }

        if allow_on_commit && self.peek_is(&Token::On) {
            into.on_commit = self.parse_on_commit()?;
        }

        if self.eat(&Token::Tablespace) {
            into.tablespace = Some(self.expect_ident()?);
        }

        Ok(into)
    }

    /// `(name, name, ...)`
    pub(super) fn parse_column_name_list(&mut self) -> Result<Vec<String>> {
        self.expect(&Token::LParen)?;
        let mut names = vec![self.expect_ident()?];
        loop {
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
                Some(Token::RParen) => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error(&[",", ")"])),
            }
        }
        Ok(names)
    }

    /// `(name [= value], ...)`, the opening parenthesis next.
    fn parse_storage_options(&mut self) -> Result<Vec<StorageOption>> {
        self.expect(&Token::LParen)?;
        let mut options = Vec::new();
        loop {
            let mut name = self.expect_ident()?;
            // Namespaced options such as toast.autovacuum_enabled.
            while self.eat(&Token::Dot) {
                name.push('.');
                name.push_str(&self.expect_ident()?);
            }
            let value = if self.eat(&Token::Eq) {
                Some(self.parse_option_value()?)
            } else {
                None
            };
            options.push(StorageOption { name, value });

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
        Ok(options)
    }

    fn parse_option_value(&mut self) -> Result<OptionValue> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(OptionValue::Number(n))
            }
            Some(Token::Minus) if matches!(self.peek_nth(1), Some(Token::Number(_))) => {
                self.advance();
                match self.advance() {
                    Some(Token::Number(n)) => Ok(OptionValue::Number(format!("-{}", n))),
                    _ => Err(self.error(&["number"])),
                }
            }
            Some(Token::StringLit(s)) => {
                self.advance();
                Ok(OptionValue::String(s))
            }
            Some(Token::True) => {
                self.advance();
                Ok(OptionValue::Word("true".into()))
            }
            Some(Token::False) => {
                self.advance();
                Ok(OptionValue::Word("false".into()))
            }
            Some(Token::On) => {
                self.advance();
                Ok(OptionValue::Word("on".into()))
            }
            _ => match self.expect_ident() {
                Ok(word) => Ok(OptionValue::Word(word)),
                Err(_) => Err(self.error(&["option value"])),
            },
        }
    }

    /// `ON COMMIT {PRESERVE ROWS | DELETE ROWS | DROP}`
    fn parse_on_commit(&mut self) -> Result<OnCommit> {
        self.expect(&Token::On)?;
        self.expect(&Token::Commit)?;
        match self.peek() {
            Some(Token::Preserve) => {
                self.advance();
                self.expect(&Token::Rows)?;
                Ok(OnCommit::PreserveRows)
            }
            Some(Token::Delete) => {
                self.advance();
                self.expect(&Token::Rows)?;
                Ok(OnCommit::DeleteRows)
            }
            Some(Token::Drop) => {
                self.advance();
                Ok(OnCommit::Drop)
            }
            _ => Err(self.error(&["PRESERVE ROWS", "DELETE ROWS", "DROP"])),
        }
    }

    /// Trailing `WITH [NO] DATA` of CREATE TABLE AS and materialized views.
    /// Returns true for `WITH NO DATA`.
    pub(super) fn parse_with_data(&mut self) -> Result<bool> {
        if !self.peek_is(&Token::With) {
            return Ok(false);
        }
        self.advance(); // WITH
        match self.peek() {
            Some(Token::Data) => {
                self.advance();
                Ok(false)
            }
            Some(Token::No) => {
                self.advance();
                self.expect(&Token::Data)?;
                Ok(true)
            }
            _ => Err(self.error(&["DATA", "NO DATA"])),
        }
    }
}
