use super::*;

impl Parser {
    /// `INSERT INTO table [AS alias] [(col, ...)]
    ///  {VALUES (...), ... | select | DEFAULT VALUES} [RETURNING targets]`
    ///
    /// `INTO` here is fixed INSERT syntax; the SELECT INTO clause parser is
    /// never involved and the result never carries an IntoClause.
    pub(super) fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;
        let table = self.parse_object_name()?;

        let alias = if self.eat(&Token::As) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        // "(" starts either the column list or a parenthesised query.
        let columns = if self.peek_is(&Token::LParen) && !self.is_parenthesised_select_ahead() {
            self.parse_column_name_list()?
        } else {
            Vec::new()
        };

        let source = match self.peek() {
            Some(Token::Values) => {
                self.advance();
                InsertSource::Values(self.parse_values_rows()?)
            }
            Some(Token::Default) => {
                self.advance();
                self.expect(&Token::Values)?;
                InsertSource::DefaultValues
            }
            Some(Token::Select) | Some(Token::LParen) => {
                InsertSource::Query(Box::new(self.parse_nested_select()?))
            }
            _ => return Err(self.error(&["VALUES", "SELECT", "DEFAULT VALUES"])),
        };

        let returning = if self.eat(&Token::Returning) {
            let targets = self.parse_select_targets()?;
            if targets.is_empty() {
                return Err(self.error(&["expression"]));
            }
            targets
        } else {
            Vec::new()
        };

        Ok(InsertStatement {
            table,
            alias,
            columns,
            source,
            returning,
        })
    }

    fn parse_values_rows(&mut self) -> Result<Vec<Vec<Expr>>> {
        let mut rows = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = Vec::new();
            loop {
                if self.eat(&Token::Default) {
                    row.push(Expr::Default);
                } else {
                    row.push(self.parse_expr()?);
                }
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
            rows.push(row);

            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(rows)
    }
}
