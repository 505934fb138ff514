use super::*;

impl<'a> Parser<'a> {
    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let marker = self.mark();
        self.consume(&TK::LBrace)?;
        let mut stmts = Vec::new();
        while self.curr_token.kind != TK::RBrace {
            stmts.push(self.parse_stmt()?);
        }
        self.consume(&TK::RBrace)?;
        Ok(Block {
            stmts,
            span: self.close(marker),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.curr_token.kind {
            TK::KwLet => self.parse_let(),
            TK::KwReturn => self.parse_return(),
            TK::LBrace => {
                let marker = self.mark();
                let block = self.parse_block()?;
                Ok(Stmt {
                    span: self.close(marker),
                    kind: StmtKind::Block { block },
                })
            }
            _ => {
                // Either an assignment `place = expr;` or a bare expression.
                let marker = self.mark();
                let expr = self.parse_expr(0)?;
                let kind = if self.consume_if(&TK::Equals) {
                    let value = self.parse_expr(0)?;
                    StmtKind::Assign {
                        target: expr,
                        value,
                    }
                } else {
                    StmtKind::Expr { expr }
                };
                self.consume(&TK::Semicolon)?;
                Ok(Stmt {
                    kind,
                    span: self.close(marker),
                })
            }
        }
    }

    /// `let [mut] name [: type] = expr;`
    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let marker = self.mark();
        self.consume(&TK::KwLet)?;
        let mutable = self.consume_if(&TK::KwMut);
        let (name, _) = self.expect_ident()?;
        let annotation = if self.consume_if(&TK::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.consume(&TK::Equals)?;
        let value = self.parse_expr(0)?;
        self.consume(&TK::Semicolon)?;
        Ok(Stmt {
            span: self.close(marker),
            kind: StmtKind::Let {
                name,
                mutable,
                annotation,
                value,
            },
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let marker = self.mark();
        self.consume(&TK::KwReturn)?;
        let value = if self.curr_token.kind == TK::Semicolon {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.consume(&TK::Semicolon)?;
        Ok(Stmt {
            span: self.close(marker),
            kind: StmtKind::Return { value },
        })
    }
}
