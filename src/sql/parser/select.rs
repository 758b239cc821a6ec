use super::*;

/// Clauses that may follow a SELECT target list. INTO is only listed for a
/// top-level SELECT.
const AFTER_TARGETS: &[&str] = &[
    "FROM", "WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT", "OFFSET",
];

impl Parser {
    /// SELECT family parser. Clause order is fixed: target list, INTO,
    /// FROM, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT/OFFSET.
    pub(super) fn parse_select(&mut self, context: SelectContext) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let distinct = if self.eat(&Token::Distinct) {
            true
        } else {
            self.eat(&Token::All);
            false
        };

        let targets = self.parse_select_targets()?;

        // The single decision point between a read and a table-creating
        // query. Nested queries never accept INTO.
        let into = match context {
            SelectContext::TopLevel => self.parse_into_clause()?,
            SelectContext::Nested if self.peek_is(&Token::Into) => {
                return Err(self.error(AFTER_TARGETS));
            }
            SelectContext::Nested => None,
        };

        let from = if self.eat(&Token::From) {
            self.parse_from_list()?
        } else {
            Vec::new()
        };

        let where_clause = if self.eat(&Token::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let group_by = if self.eat(&Token::Group) {
            self.expect(&Token::By)?;
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        let having = if self.eat(&Token::Having) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let order_by = if self.eat(&Token::Order) {
            self.expect(&Token::By)?;
            self.parse_order_by_items()?
        } else {
            Vec::new()
        };

        // LIMIT and OFFSET are accepted in either order.
        let mut limit = None;
        let mut offset = None;
        let mut seen_limit = false;
        loop {
            match self.peek() {
                Some(Token::Limit) if !seen_limit => {
                    self.advance();
                    seen_limit = true;
                    if !self.eat(&Token::All) {
                        limit = Some(self.parse_expr()?);
                    }
                }
                Some(Token::Offset) if offset.is_none() => {
                    self.advance();
                    offset = Some(self.parse_expr()?);
                    self.eat(&Token::Rows);
                }
                _ => break,
            }
        }

        Ok(SelectStatement {
            distinct,
            targets,
            into,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
        })
    }

    /// A SELECT used as a value: sub-queries, view bodies, CTAS and INSERT
    /// sources. Optional surrounding parentheses are accepted.
    pub(super) fn parse_nested_select(&mut self) -> Result<SelectStatement> {
        self.nested(|p| {
            if p.is_parenthesised_select_ahead() {
                p.advance(); // (
                let query = p.parse_nested_select()?;
                p.expect(&Token::RParen)?;
                Ok(query)
            } else {
                p.parse_select(SelectContext::Nested)
            }
        })
    }

    /// Target list; may be empty (`SELECT FROM t`).
    pub(super) fn parse_select_targets(&mut self) -> Result<Vec<SelectTarget>> {
        if matches!(
            self.peek(),
            None | Some(
                Token::From
                    | Token::Into
                    | Token::Where
                    | Token::Group
                    | Token::Having
                    | Token::Order
                    | Token::Limit
                    | Token::Offset
                    | Token::Semicolon
                    | Token::RParen
            )
        ) {
            return Ok(Vec::new());
        }

        let mut targets = Vec::new();
        loop {
            targets.push(self.parse_select_target()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(targets)
    }

    fn parse_select_target(&mut self) -> Result<SelectTarget> {
        if self.eat(&Token::Star) {
            return Ok(SelectTarget::Wildcard);
        }

        if let Some(parts) = self.qualified_wildcard_len() {
            let mut qualifier = Vec::with_capacity(parts);
            for _ in 0..parts {
                qualifier.push(self.expect_ident()?);
                self.expect(&Token::Dot)?;
            }
            self.expect(&Token::Star)?;
            return Ok(SelectTarget::QualifiedWildcard(qualifier));
        }

        let expr = self.parse_expr()?;
        let alias = if self.eat(&Token::As) {
            Some(self.expect_ident()?)
        } else if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        };
        Ok(SelectTarget::Expr { expr, alias })
    }

    /// If the tokens ahead read `name . [name .]* *`, the number of
    /// qualifier parts.
    fn qualified_wildcard_len(&self) -> Option<usize> {
        let mut n = 0;
        loop {
            if !self.is_ident_ahead(2 * n) || self.peek_nth(2 * n + 1) != Some(&Token::Dot) {
                return None;
            }
            n += 1;
            if self.peek_nth(2 * n) == Some(&Token::Star) {
                return Some(n);
            }
        }
    }

    fn parse_from_list(&mut self) -> Result<Vec<FromItem>> {
        let mut items = vec![self.parse_from_item()?];
        while self.eat(&Token::Comma) {
            items.push(self.parse_from_item()?);
        }
        Ok(items)
    }

    /// A table or sub-query followed by any number of joins.
    fn parse_from_item(&mut self) -> Result<FromItem> {
        let mut left = self.parse_from_primary()?;

        loop {
            let kind = match self.peek() {
                Some(Token::Join) => {
                    self.advance();
                    JoinKind::Inner
                }
                Some(Token::Inner) => {
                    self.advance();
                    self.expect(&Token::Join)?;
                    JoinKind::Inner
                }
                Some(Token::Left) | Some(Token::Right) | Some(Token::Full) => {
                    let kind = match self.advance() {
                        Some(Token::Left) => JoinKind::Left,
                        Some(Token::Right) => JoinKind::Right,
                        _ => JoinKind::Full,
                    };
                    self.eat(&Token::Outer);
                    self.expect(&Token::Join)?;
                    kind
                }
                Some(Token::Cross) => {
                    self.advance();
                    self.expect(&Token::Join)?;
                    JoinKind::Cross
                }
                _ => break,
            };

            let right = self.parse_from_primary()?;
            let on = if kind == JoinKind::Cross {
                None
            } else {
                self.expect(&Token::On)?;
                Some(self.parse_expr()?)
            };
            left = FromItem::Join(Box::new(Join {
                kind,
                left,
                right,
                on,
            }));
        }

        Ok(left)
    }

    fn parse_from_primary(&mut self) -> Result<FromItem> {
        if self.peek_is(&Token::LParen) {
            if !self.is_parenthesised_select_ahead() {
                self.advance(); // (
                return Err(self.error(&["SELECT"]));
            }
            let query = self.parse_nested_select()?;
            let alias = self.parse_alias()?;
            return Ok(FromItem::Subquery {
                query: Box::new(query),
                alias,
            });
        }

        let name = self.parse_object_name()?;
        let alias = self.parse_alias()?;
        Ok(FromItem::Table { name, alias })
    }

    /// `[AS] alias`; a bare alias must be a plain identifier.
    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.eat(&Token::As) {
            return Ok(Some(self.expect_ident()?));
        }
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }

    fn parse_order_by_items(&mut self) -> Result<Vec<OrderByItem>> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let descending = if self.eat(&Token::Desc) {
                true
            } else {
                self.eat(&Token::Asc);
                false
            };
            let nulls = if self.eat(&Token::Nulls) {
                match self.peek() {
                    Some(Token::First) => {
                        self.advance();
                        Some(NullsOrder::First)
                    }
                    Some(Token::Last) => {
                        self.advance();
                        Some(NullsOrder::Last)
                    }
                    _ => return Err(self.error(&["FIRST", "LAST"])),
                }
            } else {
                None
            };
            items.push(OrderByItem {
                expr,
                descending,
                nulls,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }
}
