use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::check::errors::{BorrowConflictReason, CheckError, CheckErrorKind};
use crate::check::globals::GlobalContext;
use crate::check::ownership::{LocalContext, VarInfo, VarState};
use crate::diag::Span;
use crate::typed::*;
use crate::types::Type;

#[derive(Debug, Clone)]
pub(super) struct FuncSig {
    pub params: Vec<SigParam>,
    pub return_type: Type,
}

#[derive(Debug, Clone)]
pub(super) struct SigParam {
    pub name: String,
    pub mode: ParamMode,
    pub ty: Type,
}

/// Per-program checker. Definition tables are collected up front; each
/// function (and each resource cleanup block) is then checked against a
/// fresh local context.
pub(super) struct Checker<'a> {
    globals: &'a GlobalContext,
    /// Resolved field lists for every user type (structs and resources).
    user_fields: HashMap<String, Vec<TypedFieldDef>>,
    func_sigs: HashMap<String, FuncSig>,
    locals: LocalContext,
    /// Expected return type of the enclosing function; `None` inside
    /// resource cleanup blocks, where `return` is not allowed.
    return_type: Option<Type>,
}

impl<'a> Checker<'a> {
    pub fn new(globals: &'a GlobalContext) -> Self {
        Self {
            globals,
            user_fields: HashMap::new(),
            func_sigs: HashMap::new(),
            locals: LocalContext::new(),
            return_type: None,
        }
    }

    /// Resolve every declared type up front: struct and resource fields,
    /// parameter and return types. Calls can then be checked against any
    /// signature regardless of definition order.
    pub fn collect_defs(&mut self, program: &Program) -> Result<(), CheckError> {
        for def in &program.structs {
            let fields = self.resolve_fields(&def.fields)?;
            self.user_fields.insert(def.name.clone(), fields);
        }
        for def in &program.resources {
            let fields = self.resolve_fields(&def.fields)?;
            self.user_fields.insert(def.name.clone(), fields);
        }
        for def in &program.funcs {
            let params = def
                .params
                .iter()
                .map(|param| {
                    Ok(SigParam {
                        name: param.name.clone(),
                        mode: param.mode,
                        ty: self.globals.resolve_type(&param.ty)?,
                    })
                })
                .collect::<Result<Vec<_>, CheckError>>()?;
            let return_type = match &def.return_type {
                Some(ty) => self.globals.resolve_type(ty)?,
                None => Type::Unit,
            };
            self.func_sigs.insert(
                def.name.clone(),
                FuncSig {
                    params,
                    return_type,
                },
            );
        }
        Ok(())
    }

    pub fn resolve_fields(
        &mut self,
        fields: &[FieldDef],
    ) -> Result<Vec<TypedFieldDef>, CheckError> {
        fields
            .iter()
            .map(|field| {
                Ok(TypedFieldDef {
                    name: field.name.clone(),
                    ty: self.globals.resolve_type(&field.ty)?,
                })
            })
            .collect()
    }

    pub fn typed_fields(&self, name: &str) -> &[TypedFieldDef] {
        &self.user_fields[name]
    }

    // -------------------------------------------------------------------------
    // Functions and cleanup blocks
    // -------------------------------------------------------------------------

    pub fn check_function(&mut self, func: &FuncDef) -> Result<TypedFuncDef, CheckError> {
        let sig = self.func_sigs[&func.name].clone();
        self.return_type = Some(sig.return_type.clone());
        self.locals = LocalContext::new();
        self.locals.enter_scope();

        for (param, sig_param) in func.params.iter().zip(&sig.params) {
            let (state, is_mutable) = match param.mode {
                ParamMode::Move { mutable } => (VarState::Owned, mutable),
                ParamMode::Ref => (VarState::BorrowedRead, false),
                ParamMode::Inout => (VarState::BorrowedWrite, true),
            };
            self.locals.declare(
                &param.name,
                VarInfo {
                    ty: sig_param.ty.clone(),
                    state,
                    is_mutable,
                    def_site: param.span,
                },
            )?;
        }

        let body = self.check_block(&func.body);
        self.locals.leave_scope();

        Ok(TypedFuncDef {
            name: func.name.clone(),
            params: sig
                .params
                .into_iter()
                .map(|p| TypedParam {
                    name: p.name,
                    mode: p.mode,
                    ty: p.ty,
                })
                .collect(),
            return_type: sig.return_type,
            body: body?,
        })
    }

    /// Cleanup runs with every declared field owned and mutable, and no
    /// enclosing function to return from.
    pub fn check_cleanup(
        &mut self,
        def: &ResourceDef,
        fields: &[TypedFieldDef],
    ) -> Result<Option<TypedBlock>, CheckError> {
        let Some(cleanup) = &def.cleanup else {
            return Ok(None);
        };
        self.return_type = None;
        self.locals = LocalContext::new();
        self.locals.enter_scope();

        for (field, typed) in def.fields.iter().zip(fields) {
            self.locals.declare(
                &field.name,
                VarInfo {
                    ty: typed.ty.clone(),
                    state: VarState::Owned,
                    is_mutable: true,
                    def_site: field.span,
                },
            )?;
        }

        let block = self.check_block(cleanup);
        self.locals.leave_scope();
        Ok(Some(block?))
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn check_block(&mut self, block: &Block) -> Result<TypedBlock, CheckError> {
        self.locals.enter_scope();
        let result = self.check_block_stmts(block);
        self.locals.leave_scope();
        result
    }

    fn check_block_stmts(&mut self, block: &Block) -> Result<TypedBlock, CheckError> {
        let mut stmts = Vec::new();
        for stmt in &block.stmts {
            stmts.push(self.check_stmt(stmt)?);
        }
        Ok(TypedBlock {
            stmts,
            span: block.span,
        })
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<TypedStmt, CheckError> {
        let kind = match &stmt.kind {
            StmtKind::Let {
                name,
                mutable,
                annotation,
                value,
            } => {
                let typed_value = self.check_expr(value)?;
                let ty = match annotation {
                    Some(annotation) => {
                        let annotated = self.globals.resolve_type(annotation)?;
                        if annotated != typed_value.ty {
                            return Err(CheckErrorKind::TypeMismatch(
                                annotated,
                                typed_value.ty,
                                value.span,
                            )
                            .into());
                        }
                        annotated
                    }
                    None => typed_value.ty.clone(),
                };
                if !ty.is_copy() {
                    self.move_source(value)?;
                }
                self.locals.declare(
                    name,
                    VarInfo {
                        ty: ty.clone(),
                        state: VarState::Owned,
                        is_mutable: *mutable,
                        def_site: stmt.span,
                    },
                )?;
                TypedStmtKind::Let {
                    name: name.clone(),
                    mutable: *mutable,
                    ty,
                    value: typed_value,
                }
            }

            StmtKind::Assign { target, value } => {
                let Some(root) = place_root(target) else {
                    return Err(CheckErrorKind::AssignTargetNotAPlace(target.span).into());
                };
                let root = root.to_string();
                let typed_target = self.check_expr(target)?;
                let info = self.locals.read(&root, target.span)?;
                if !info.is_mutable {
                    return Err(CheckErrorKind::AssignToImmutable(root, target.span).into());
                }
                let typed_value = self.check_expr(value)?;
                if typed_target.ty != typed_value.ty {
                    return Err(CheckErrorKind::TypeMismatch(
                        typed_target.ty,
                        typed_value.ty,
                        value.span,
                    )
                    .into());
                }
                if !typed_value.ty.is_copy() {
                    self.move_source(value)?;
                }
                TypedStmtKind::Assign {
                    target: typed_target,
                    value: typed_value,
                }
            }

            StmtKind::Return { value } => {
                let Some(return_type) = self.return_type.clone() else {
                    return Err(CheckErrorKind::ReturnOutsideFunction(stmt.span).into());
                };
                let typed_value = match value {
                    Some(value) => Some(self.check_expr(value)?),
                    None => None,
                };
                let value_ty = typed_value
                    .as_ref()
                    .map(|v| v.ty.clone())
                    .unwrap_or(Type::Unit);
                if value_ty != return_type {
                    return Err(
                        CheckErrorKind::TypeMismatch(return_type, value_ty, stmt.span).into()
                    );
                }
                if let Some(value) = value
                    && !value_ty.is_copy()
                {
                    self.move_source(value)?;
                }
                TypedStmtKind::Return { value: typed_value }
            }

            StmtKind::Expr { expr } => TypedStmtKind::Expr {
                expr: self.check_expr(expr)?,
            },

            StmtKind::Block { block } => TypedStmtKind::Block {
                block: self.check_block(block)?,
            },
        };
        Ok(TypedStmt {
            kind,
            span: stmt.span,
        })
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> Result<TypedExpr, CheckError> {
        match &expr.kind {
            ExprKind::IntLit(value) => Ok(TypedExpr {
                kind: TypedExprKind::IntLit(*value),
                ty: Type::Int,
                span: expr.span,
            }),

            ExprKind::BoolLit(value) => Ok(TypedExpr {
                kind: TypedExprKind::BoolLit(*value),
                ty: Type::Bool,
                span: expr.span,
            }),

            ExprKind::Var(name) => {
                let info = self.locals.read(name, expr.span)?;
                Ok(TypedExpr {
                    ty: info.ty.clone(),
                    kind: TypedExprKind::Var(name.clone()),
                    span: expr.span,
                })
            }

            ExprKind::Unary { op, operand } => {
                let typed_operand = self.check_expr(operand)?;
                if typed_operand.ty != Type::Int {
                    return Err(CheckErrorKind::ArithmeticOperandsNotInt(
                        typed_operand.ty,
                        operand.span,
                    )
                    .into());
                }
                Ok(TypedExpr {
                    kind: TypedExprKind::Unary {
                        op: *op,
                        operand: Box::new(typed_operand),
                    },
                    ty: Type::Int,
                    span: expr.span,
                })
            }

            ExprKind::Binary { op, left, right } => self.check_binary(expr, *op, left, right),

            ExprKind::StructLit {
                name,
                name_span,
                managed,
                fields,
            } => self.check_struct_lit(name, *name_span, fields, expr.span, *managed),

            ExprKind::Field {
                object,
                field,
                field_span,
            } => self.check_field_access(expr, object, field, *field_span),

            ExprKind::Call { callee, args } => self.check_call(expr, callee, args),

            ExprKind::Println { format, args } => {
                // The format string is opaque; arguments are observable
                // reads of any type, with no move or borrow effects.
                let mut typed_args = Vec::new();
                for arg in args {
                    typed_args.push(self.check_expr(arg)?);
                }
                Ok(TypedExpr {
                    kind: TypedExprKind::Println {
                        format: format.clone(),
                        args: typed_args,
                    },
                    ty: Type::Unit,
                    span: expr.span,
                })
            }
        }
    }

    fn check_binary(
        &mut self,
        expr: &Expr,
        op: BinOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<TypedExpr, CheckError> {
        let typed_left = self.check_expr(left)?;
        let typed_right = self.check_expr(right)?;

        let ty = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                self.require_int(&typed_left, left.span)?;
                self.require_int(&typed_right, right.span)?;
                Type::Int
            }
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                self.require_int(&typed_left, left.span)?;
                self.require_int(&typed_right, right.span)?;
                Type::Bool
            }
            BinOp::Eq | BinOp::NotEq => {
                if typed_left.ty != typed_right.ty {
                    return Err(CheckErrorKind::TypeMismatch(
                        typed_left.ty,
                        typed_right.ty,
                        right.span,
                    )
                    .into());
                }
                if !typed_left.ty.is_copy() {
                    return Err(CheckErrorKind::EqualityOperandsNotCopyKind(
                        typed_left.ty,
                        expr.span,
                    )
                    .into());
                }
                Type::Bool
            }
        };

        Ok(TypedExpr {
            kind: TypedExprKind::Binary {
                op,
                left: Box::new(typed_left),
                right: Box::new(typed_right),
            },
            ty,
            span: expr.span,
        })
    }

    fn require_int(&self, operand: &TypedExpr, span: Span) -> Result<(), CheckError> {
        if operand.ty != Type::Int {
            return Err(CheckErrorKind::ArithmeticOperandsNotInt(operand.ty.clone(), span).into());
        }
        Ok(())
    }

    /// Check a struct construction. `managed` is true when the literal is
    /// written `managed T{...}` or appears nested inside one: the managed
    /// context distributes into nested literal constructions, but only those
    /// that appear literally as field initializers.
    fn check_struct_lit(
        &mut self,
        name: &str,
        name_span: Span,
        field_inits: &[FieldInit],
        span: Span,
        managed: bool,
    ) -> Result<TypedExpr, CheckError> {
        if !self.globals.is_user_type(name) {
            return Err(CheckErrorKind::UnknownType(name.to_string(), name_span).into());
        }
        if managed && self.globals.is_resource(name) {
            return Err(CheckErrorKind::ResourceNotManageable(name.to_string(), span).into());
        }
        let decl_fields = self.user_fields[name].clone();

        let mut seen = HashSet::new();
        for init in field_inits {
            if !decl_fields.iter().any(|f| f.name == init.name) {
                return Err(CheckErrorKind::UnknownFieldInStructLiteral(
                    init.name.clone(),
                    name.to_string(),
                    init.span,
                )
                .into());
            }
            if !seen.insert(init.name.as_str()) {
                return Err(CheckErrorKind::FieldSetMismatch(name.to_string(), init.span).into());
            }
        }
        for field in &decl_fields {
            if !field_inits.iter().any(|init| init.name == field.name) {
                return Err(CheckErrorKind::FieldSetMismatch(name.to_string(), span).into());
            }
        }

        let mut typed_fields = Vec::new();
        for init in field_inits {
            let declared = decl_fields
                .iter()
                .find(|f| f.name == init.name)
                .map(|f| f.ty.clone())
                .unwrap();
            // Inside a managed construction, fields of named user type hold
            // managed handles, not inline values.
            let expected = if managed && self.globals.is_named_user_type(&declared) {
                Type::managed(declared)
            } else {
                declared
            };
            let typed_value = match &init.value.kind {
                ExprKind::StructLit {
                    name: nested_name,
                    name_span: nested_name_span,
                    fields: nested_fields,
                    ..
                } if managed => self.check_struct_lit(
                    nested_name,
                    *nested_name_span,
                    nested_fields,
                    init.value.span,
                    true,
                )?,
                _ => self.check_expr(&init.value)?,
            };
            if typed_value.ty != expected {
                return Err(CheckErrorKind::TypeMismatch(
                    expected,
                    typed_value.ty,
                    init.value.span,
                )
                .into());
            }
            if !typed_value.ty.is_copy() {
                self.move_source(&init.value)?;
            }
            typed_fields.push((init.name.clone(), typed_value));
        }

        let (ty, alloc) = if managed {
            (Type::managed(Type::Named(name.to_string())), AllocKind::Managed)
        } else {
            (Type::Named(name.to_string()), AllocKind::Linear)
        };
        Ok(TypedExpr {
            kind: TypedExprKind::StructLit {
                name: name.to_string(),
                alloc,
                fields: typed_fields,
            },
            ty,
            span,
        })
    }

    fn check_field_access(
        &mut self,
        expr: &Expr,
        object: &Expr,
        field: &str,
        field_span: Span,
    ) -> Result<TypedExpr, CheckError> {
        let typed_object = self.check_expr(object)?;

        let (type_name, via_handle) = match &typed_object.ty {
            Type::Named(name) => (name.clone(), false),
            Type::Managed(inner) => match inner.as_ref() {
                Type::Named(name) => (name.clone(), true),
                _ => {
                    return Err(CheckErrorKind::FieldAccessOnManagedNonStruct(
                        typed_object.ty.clone(),
                        expr.span,
                    )
                    .into());
                }
            },
            _ => {
                return Err(CheckErrorKind::FieldAccessOnNonStruct(
                    typed_object.ty.clone(),
                    expr.span,
                )
                .into());
            }
        };

        let raw_ty = self
            .user_fields
            .get(&type_name)
            .and_then(|fields| fields.iter().find(|f| f.name == field))
            .map(|f| f.ty.clone())
            .ok_or_else(|| {
                CheckError::from(CheckErrorKind::UnknownField(
                    field.to_string(),
                    type_name.clone(),
                    field_span,
                ))
            })?;

        // Managed-field lift: reading a struct-typed field of a managed
        // object yields a managed handle to the field, decided purely from
        // the observed object type.
        let ty = if via_handle && self.globals.is_named_user_type(&raw_ty) {
            Type::managed(raw_ty.clone())
        } else {
            raw_ty.clone()
        };

        Ok(TypedExpr {
            kind: TypedExprKind::Field {
                object: Box::new(typed_object),
                field: field.to_string(),
                raw_ty,
                via_handle,
            },
            ty,
            span: expr.span,
        })
    }

    fn check_call(
        &mut self,
        expr: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<TypedExpr, CheckError> {
        let ExprKind::Var(name) = &callee.kind else {
            return Err(CheckErrorKind::DynamicCallNotSupported(callee.span).into());
        };
        let Some(sig) = self.func_sigs.get(name).cloned() else {
            return Err(CheckErrorKind::NoSuchFunction(name.clone(), callee.span).into());
        };
        if args.len() != sig.params.len() {
            return Err(CheckErrorKind::ArityMismatch(
                name.clone(),
                sig.params.len(),
                args.len(),
                expr.span,
            )
            .into());
        }

        let mut typed_args = Vec::new();
        for (arg, param) in args.iter().zip(&sig.params) {
            let typed_arg = self.check_expr(arg)?;
            if typed_arg.ty != param.ty {
                return Err(
                    CheckErrorKind::TypeMismatch(param.ty.clone(), typed_arg.ty, arg.span).into(),
                );
            }
            match param.mode {
                ParamMode::Move { .. } => {
                    if !typed_arg.ty.is_copy() {
                        self.move_source(arg)?;
                    }
                }
                ParamMode::Ref => {
                    let root = self.borrow_root(arg)?;
                    self.locals.borrow_shared(&root, arg.span)?;
                }
                ParamMode::Inout => {
                    let root = self.borrow_root(arg)?;
                    self.locals.borrow_mut(&root, arg.span)?;
                }
            }
            typed_args.push(typed_arg);
        }

        Ok(TypedExpr {
            kind: TypedExprKind::Call {
                name: name.clone(),
                args: typed_args,
            },
            ty: sig.return_type,
            span: expr.span,
        })
    }

    /// Borrow arguments must be places; borrowing a field borrows the base
    /// variable (there is no per-field borrow tracking).
    fn borrow_root(&self, arg: &Expr) -> Result<String, CheckError> {
        place_root(arg)
            .map(|root| root.to_string())
            .ok_or_else(|| {
                CheckError::from(CheckErrorKind::BorrowConflict(
                    "temporary".to_string(),
                    BorrowConflictReason::Temporary,
                    arg.span,
                ))
            })
    }

    /// Moving a temporary is a no-op on the engine: only variables have a
    /// record to invalidate. Field paths have no record either, so moving
    /// out of a field leaves the container untouched.
    fn move_source(&mut self, expr: &Expr) -> Result<(), CheckError> {
        if let ExprKind::Var(name) = &expr.kind {
            self.locals.move_out(name, expr.span)?;
        }
        Ok(())
    }
}

/// The root variable of a place expression: a variable, or a chain of field
/// accesses rooted in one.
fn place_root(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Var(name) => Some(name),
        ExprKind::Field { object, .. } => place_root(object),
        _ => None,
    }
}
