use super::*;

impl Parser {
    // Expression parsing with precedence:
    // parse_expr -> parse_or_expr -> parse_and_expr -> parse_not_expr
    //   -> parse_comparison -> parse_concat -> parse_additive
    //   -> parse_multiplicative -> parse_unary -> parse_postfix -> parse_primary

    pub(super) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or_expr()
    }

    pub(super) fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&Token::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_or_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and_expr()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_not_expr()?;
        while self.eat(&Token::And) {
            let right = self.parse_not_expr()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            let operand = self.nested(|p| p.parse_not_expr())?;
            Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_concat()?;

        // IS [NOT] {NULL | TRUE | FALSE}
        if self.eat(&Token::Is) {
            let negated = self.eat(&Token::Not);
            let expr = Box::new(left);
            let result = match self.peek() {
                Some(Token::Null) => Expr::IsNull { expr, negated },
                Some(Token::True) => Expr::IsBool {
                    expr,
                    value: true,
                    negated,
                },
                Some(Token::False) => Expr::IsBool {
                    expr,
                    value: false,
                    negated,
                },
                _ => return Err(self.error(&["NULL", "TRUE", "FALSE"])),
            };
            self.advance();
            return Ok(result);
        }

        // [NOT] LIKE / ILIKE / IN / BETWEEN
        let saved_pos = self.pos;
        let negated = self.eat(&Token::Not);
        match self.peek() {
            Some(Token::Like) | Some(Token::Ilike) => {
                let case_insensitive = self.advance() == Some(Token::Ilike);
                let pattern = self.parse_concat()?;
                return Ok(Expr::Like {
                    expr: Box::new(left),
                    pattern: Box::new(pattern),
                    negated,
                    case_insensitive,
                });
            }
            Some(Token::In) => {
                self.advance();
                return self.parse_in_rest(left, negated);
            }
            Some(Token::Between) => {
                self.advance();
                let low = self.parse_concat()?;
                self.expect(&Token::And)?;
                let high = self.parse_concat()?;
                return Ok(Expr::Between {
                    expr: Box::new(left),
                    low: Box::new(low),
                    high: Box::new(high),
                    negated,
                });
            }
            _ => {
                // Not a postfix NOT, rewind
                self.pos = saved_pos;
            }
        }

        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_concat()?;
        Ok(Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// After `[NOT] IN`: a value list or a sub-query.
    fn parse_in_rest(&mut self, left: Expr, negated: bool) -> Result<Expr> {
        if self.peek_is(&Token::LParen) && self.peek_nth(1) == Some(&Token::Select) {
            let subquery = self.parse_nested_select()?;
            return Ok(Expr::InSubquery {
                expr: Box::new(left),
                subquery: Box::new(subquery),
                negated,
            });
        }
        self.expect(&Token::LParen)?;
        let list = self.nested(|p| p.parse_expr_list())?;
        self.expect(&Token::RParen)?;
        Ok(Expr::InList {
            expr: Box::new(left),
            list,
            negated,
        })
    }

    fn parse_concat(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        while self.eat(&Token::Concat) {
            let right = self.parse_additive()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op: BinaryOp::Concat,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Plus) {
            return self.nested(|p| p.parse_unary());
        }
        if self.eat(&Token::Minus) {
            let operand = self.nested(|p| p.parse_unary())?;
            // Fold a negated literal into the literal itself.
            return match operand {
                Expr::Number(n) if !n.starts_with('-') => Ok(Expr::Number(format!("-{}", n))),
                _ => Ok(Expr::UnaryOp {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                }),
            };
        }
        self.parse_postfix()
    }

    /// `expr::type`, repeatable.
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::DoubleColon) {
            let data_type = self.parse_type_name()?;
            expr = Expr::Cast {
                expr: Box::new(expr),
                data_type,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::StringLit(s)) => {
                self.advance();
                Ok(Expr::String(s))
            }
            Some(Token::Param(n)) => {
                self.advance();
                Ok(Expr::Param(n))
            }
            Some(Token::Null) => {
                self.advance();
                Ok(Expr::Null)
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expr::Boolean(true))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expr::Boolean(false))
            }
            Some(Token::Case) => self.nested(|p| p.parse_case()),
            Some(Token::Cast) => self.nested(|p| p.parse_cast()),
            Some(Token::Exists) => {
                self.advance(); // EXISTS
                if !self.is_parenthesised_select_ahead() {
                    return Err(self.error(&["(SELECT"]));
                }
                let subquery = self.parse_nested_select()?;
                Ok(Expr::Exists(Box::new(subquery)))
            }
            Some(Token::LParen) => {
                // Scalar sub-query: (SELECT ...)
                if self.peek_nth(1) == Some(&Token::Select) {
                    let subquery = self.parse_nested_select()?;
                    return Ok(Expr::Subquery(Box::new(subquery)));
                }
                self.advance();
                let expr = self.nested(|p| p.parse_expr())?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            // Keyword-named functions such as left(s, 2) or replace(s, a, b).
            Some(Token::Left) | Some(Token::Right)
                if self.peek_nth(1) == Some(&Token::LParen) =>
            {
                let name = if self.advance() == Some(Token::Left) {
                    "left"
                } else {
                    "right"
                };
                self.parse_function_args(vec![name.to_string()])
            }
            Some(Token::Ident(_)) => self.parse_name_or_call(),
            Some(t) if t.unreserved_name().is_some() => self.parse_name_or_call(),
            _ => Err(self.error(&["expression"])),
        }
    }

    /// Column reference `a`, `t.a`, `s.t.a`, a row reference `t.*`, or a
    /// function call `f(...)`, `s.f(...)`.
    fn parse_name_or_call(&mut self) -> Result<Expr> {
        let mut parts = vec![self.expect_ident()?];
        while self.peek_is(&Token::Dot) && self.is_ident_ahead(1) {
            self.advance(); // .
            parts.push(self.expect_ident()?);
        }
        if self.peek_is(&Token::Dot) && self.peek_nth(1) == Some(&Token::Star) {
            self.pos += 2;
            return Ok(Expr::QualifiedWildcard(parts));
        }
        if self.peek_is(&Token::LParen) {
            return self.parse_function_args(parts);
        }
        Ok(Expr::Column(parts))
    }

    /// Argument list of a call, the opening parenthesis next.
    fn parse_function_args(&mut self, name: Vec<String>) -> Result<Expr> {
        self.expect(&Token::LParen)?;

        if self.eat(&Token::Star) {
            self.expect(&Token::RParen)?;
            return Ok(Expr::FunctionCall {
                name,
                args: Vec::new(),
                distinct: false,
                star: true,
            });
        }

        let distinct = self.eat(&Token::Distinct);
        let args = if self.peek_is(&Token::RParen) && !distinct {
            Vec::new()
        } else {
            self.nested(|p| p.parse_expr_list())?
        };
        self.expect(&Token::RParen)?;

        Ok(Expr::FunctionCall {
            name,
            args,
            distinct,
            star: false,
        })
    }

    fn parse_case(&mut self) -> Result<Expr> {
        self.expect(&Token::Case)?;

        // Simple CASE (CASE expr WHEN val THEN ...) vs searched CASE (CASE WHEN cond THEN ...)
        let operand = if !self.peek_is(&Token::When) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        let mut when_clauses = Vec::new();
        while self.eat(&Token::When) {
            let condition = self.parse_expr()?;
            self.expect(&Token::Then)?;
            let result = self.parse_expr()?;
            when_clauses.push((condition, result));
        }
        if when_clauses.is_empty() {
            return Err(self.error(&["WHEN"]));
        }

        let else_clause = if self.eat(&Token::Else) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        self.expect(&Token::End)?;

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    fn parse_cast(&mut self) -> Result<Expr> {
        self.expect(&Token::Cast)?;
        self.expect(&Token::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::As)?;
        let data_type = self.parse_type_name()?;
        self.expect(&Token::RParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// A type name: `int`, `double precision`, `character varying(20)`,
    /// `numeric(10, 2)`, `timestamp with time zone`, `text[]`.
    pub(super) fn parse_type_name(&mut self) -> Result<TypeName> {
        let first = match self.expect_ident() {
            Ok(word) => word,
            Err(_) => return Err(self.error(&["type name"])),
        };
        let mut words = vec![first];

        let second = match (words[0].as_str(), self.peek()) {
            ("double", Some(Token::Ident(w))) if w == "precision" => Some(w.clone()),
            ("character" | "char" | "bit", Some(Token::Ident(w))) if w == "varying" => {
                Some(w.clone())
            }
            _ => None,
        };
        if let Some(word) = second {
            self.advance();
            words.push(word);
        }

        let mut modifiers = Vec::new();
        if self.eat(&Token::LParen) {
            loop {
                match self.peek() {
                    Some(Token::Number(n)) => modifiers.push(n.clone()),
                    _ => return Err(self.error(&["type modifier"])),
                }
                self.advance();
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
        }

        let mut with_time_zone = false;
        if matches!(words[0].as_str(), "timestamp" | "time") {
            let zone_ahead = matches!(self.peek_nth(1), Some(Token::Ident(w)) if w == "time")
                && matches!(self.peek_nth(2), Some(Token::Ident(w)) if w == "zone");
            match self.peek() {
                Some(Token::With) if zone_ahead => {
                    self.pos += 3;
                    with_time_zone = true;
                }
                Some(Token::Ident(w)) if w == "without" && zone_ahead => {
                    self.pos += 3;
                }
                _ => {}
            }
        }

        let mut array_dims = 0;
        while self.peek_is(&Token::LBracket) && self.peek_nth(1) == Some(&Token::RBracket) {
            self.pos += 2;
            array_dims += 1;
        }

        Ok(TypeName {
            words,
            modifiers,
            with_time_zone,
            array_dims,
        })
    }
}
