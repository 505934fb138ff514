use super::*;

impl<'a> Parser<'a> {
    /// Expression parsing (Pratt parsing for operator precedence).
    pub(super) fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let marker = self.mark();

        let mut lhs = if self.curr_token.kind == TK::Minus {
            // -<expr>
            self.advance();
            let operand = self.parse_expr(10)?;
            Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span: self.close(marker),
            }
        } else {
            self.parse_postfix()?
        };

        while let Some((op, bp)) = Self::token_to_binary_op(&self.curr_token.kind) {
            if bp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.parse_expr(bp + 1)?;

            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span: self.close(marker),
            };
        }

        Ok(lhs)
    }

    fn token_to_binary_op(token: &TokenKind) -> Option<(BinOp, u8)> {
        match token {
            TK::EqEq => Some((BinOp::Eq, 1)),
            TK::NotEq => Some((BinOp::NotEq, 1)),
            TK::LessThan => Some((BinOp::Lt, 2)),
            TK::LessThanEq => Some((BinOp::LtEq, 2)),
            TK::GreaterThan => Some((BinOp::Gt, 2)),
            TK::GreaterThanEq => Some((BinOp::GtEq, 2)),
            TK::Plus => Some((BinOp::Add, 3)),
            TK::Minus => Some((BinOp::Sub, 3)),
            TK::Star => Some((BinOp::Mul, 4)),
            TK::Slash => Some((BinOp::Div, 4)),
            _ => None,
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let marker = self.mark();
        let mut expr = self.parse_primary()?;

        loop {
            match self.curr_token.kind {
                TK::Dot => {
                    self.advance();
                    let (field, field_span) = self.expect_ident()?;
                    expr = Expr {
                        kind: ExprKind::Field {
                            object: Box::new(expr),
                            field,
                            field_span,
                        },
                        span: self.close(marker),
                    };
                }
                TK::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while self.curr_token.kind != TK::RParen {
                        args.push(self.parse_expr(0)?);
                        if !self.consume_if(&TK::Comma) {
                            break;
                        }
                    }
                    self.consume(&TK::RParen)?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span: self.close(marker),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let marker = self.mark();
        match &self.curr_token.kind {
            TK::IntLit(value) => {
                let value = *value;
                let span = self.curr_token.span;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::IntLit(value),
                    span,
                })
            }
            TK::KwTrue => {
                let span = self.curr_token.span;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::BoolLit(true),
                    span,
                })
            }
            TK::KwFalse => {
                let span = self.curr_token.span;
                self.advance();
                Ok(Expr {
                    kind: ExprKind::BoolLit(false),
                    span,
                })
            }
            TK::Ident(name) => {
                let name = name.clone();
                let name_span = self.curr_token.span;
                self.advance();
                if self.curr_token.kind == TK::LBrace {
                    self.parse_struct_lit(name, name_span, false, marker)
                } else {
                    Ok(Expr {
                        kind: ExprKind::Var(name),
                        span: name_span,
                    })
                }
            }
            TK::KwManaged => {
                // managed Name{...}
                self.advance();
                let (name, name_span) = self.expect_ident()?;
                self.parse_struct_lit(name, name_span, true, marker)
            }
            TK::KwPrintln => {
                self.advance();
                self.consume(&TK::LParen)?;
                let format = match &self.curr_token.kind {
                    TK::StringLit(text) => {
                        let text = text.clone();
                        self.advance();
                        text
                    }
                    _ => {
                        return Err(ParseError::ExpectedFormatString(self.curr_token.clone()));
                    }
                };
                let mut args = Vec::new();
                while self.consume_if(&TK::Comma) {
                    args.push(self.parse_expr(0)?);
                }
                self.consume(&TK::RParen)?;
                Ok(Expr {
                    kind: ExprKind::Println { format, args },
                    span: self.close(marker),
                })
            }
            TK::LParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.consume(&TK::RParen)?;
                Ok(Expr {
                    span: self.close(marker),
                    ..expr
                })
            }
            _ => Err(ParseError::ExpectedExpr(self.curr_token.clone())),
        }
    }

    fn parse_struct_lit(
        &mut self,
        name: String,
        name_span: Span,
        managed: bool,
        marker: Marker,
    ) -> Result<Expr, ParseError> {
        self.consume(&TK::LBrace)?;
        let mut fields = Vec::new();
        while self.curr_token.kind != TK::RBrace {
            let field_marker = self.mark();
            let (field_name, _) = self.expect_ident()?;
            self.consume(&TK::Colon)?;
            let value = self.parse_expr(0)?;
            fields.push(FieldInit {
                name: field_name,
                value,
                span: self.close(field_marker),
            });
            if !self.consume_if(&TK::Comma) {
                break;
            }
        }
        self.consume(&TK::RBrace)?;
        Ok(Expr {
            kind: ExprKind::StructLit {
                name,
                name_span,
                managed,
                fields,
            },
            span: self.close(marker),
        })
    }
}
