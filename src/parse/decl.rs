use super::*;

impl<'a> Parser<'a> {
    /// `struct Name { field: type, ... }`
    pub(super) fn parse_struct_def(&mut self) -> Result<StructDef, ParseError> {
        let marker = self.mark();
        self.consume(&TK::KwStruct)?;
        let (name, _) = self.expect_ident()?;
        self.consume(&TK::LBrace)?;
        let fields = self.parse_field_defs()?;
        self.consume(&TK::RBrace)?;
        Ok(StructDef {
            name,
            fields,
            span: self.close(marker),
        })
    }

    /// `resource Name { field: type, ... cleanup { ... } }`
    /// The cleanup block is optional and must come after the fields.
    pub(super) fn parse_resource_def(&mut self) -> Result<ResourceDef, ParseError> {
        let marker = self.mark();
        self.consume(&TK::KwResource)?;
        let (name, _) = self.expect_ident()?;
        self.consume(&TK::LBrace)?;
        let fields = self.parse_field_defs()?;
        let cleanup = if self.consume_if(&TK::KwCleanup) {
            Some(self.parse_block()?)
        } else {
            None
        };
        self.consume(&TK::RBrace)?;
        Ok(ResourceDef {
            name,
            fields,
            cleanup,
            span: self.close(marker),
        })
    }

    fn parse_field_defs(&mut self) -> Result<Vec<FieldDef>, ParseError> {
        let mut fields = Vec::new();
        while let TK::Ident(_) = self.curr_token.kind {
            let marker = self.mark();
            let (name, _) = self.expect_ident()?;
            self.consume(&TK::Colon)?;
            let ty = self.parse_type_expr()?;
            fields.push(FieldDef {
                name,
                ty,
                span: self.close(marker),
            });
            if !self.consume_if(&TK::Comma) {
                break;
            }
        }
        Ok(fields)
    }

    /// `fn name(params) -> type { ... }`; the return type defaults to `unit`.
    pub(super) fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        let marker = self.mark();
        self.consume(&TK::KwFn)?;
        let (name, _) = self.expect_ident()?;
        self.consume(&TK::LParen)?;
        let mut params = Vec::new();
        while self.curr_token.kind != TK::RParen {
            params.push(self.parse_param()?);
            if !self.consume_if(&TK::Comma) {
                break;
            }
        }
        self.consume(&TK::RParen)?;
        let return_type = if self.consume_if(&TK::Arrow) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FuncDef {
            name,
            params,
            return_type,
            body,
            span: self.close(marker),
        })
    }

    /// `[mut] name: [ref|inout] type`
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let marker = self.mark();
        let mutable = self.consume_if(&TK::KwMut);
        let (name, _) = self.expect_ident()?;
        self.consume(&TK::Colon)?;
        let mode = if self.consume_if(&TK::KwRef) {
            ParamMode::Ref
        } else if self.consume_if(&TK::KwInout) {
            ParamMode::Inout
        } else {
            ParamMode::Move { mutable }
        };
        let ty = self.parse_type_expr()?;
        Ok(Param {
            name,
            mode,
            ty,
            span: self.close(marker),
        })
    }

    pub(super) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let marker = self.mark();
        let kind = match &self.curr_token.kind {
            TK::KwInt => {
                self.advance();
                TypeExprKind::Int
            }
            TK::KwBool => {
                self.advance();
                TypeExprKind::Bool
            }
            TK::KwUnit => {
                self.advance();
                TypeExprKind::Unit
            }
            TK::Ident(name) => {
                let name = name.clone();
                self.advance();
                TypeExprKind::Named(name)
            }
            TK::KwManaged => {
                self.advance();
                let inner = self.parse_type_expr()?;
                TypeExprKind::Managed(Box::new(inner))
            }
            _ => return Err(ParseError::ExpectedType(self.curr_token.clone())),
        };
        Ok(TypeExpr {
            kind,
            span: self.close(marker),
        })
    }
}
