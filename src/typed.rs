//! Typed program
//!
//! The checker's output: the same program shape as the untyped AST, with
//! every expression annotated with its final type, struct constructions
//! tagged linear or managed, and field accesses carrying both the raw
//! declared field type and whether the access goes through a managed
//! handle. The emitter picks `.` vs `->` and placement-new from these tags.

use crate::ast::{BinOp, ParamMode, UnaryOp};
use crate::diag::Span;
use crate::types::Type;

#[derive(Debug, Clone, Default)]
pub struct TypedProgram {
    pub structs: Vec<TypedStructDef>,
    pub resources: Vec<TypedResourceDef>,
    pub funcs: Vec<TypedFuncDef>,
}

#[derive(Debug, Clone)]
pub struct TypedStructDef {
    pub name: String,
    pub fields: Vec<TypedFieldDef>,
}

#[derive(Debug, Clone)]
pub struct TypedResourceDef {
    pub name: String,
    pub fields: Vec<TypedFieldDef>,
    pub cleanup: Option<TypedBlock>,
}

#[derive(Debug, Clone)]
pub struct TypedFieldDef {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TypedFuncDef {
    pub name: String,
    pub params: Vec<TypedParam>,
    pub return_type: Type,
    pub body: TypedBlock,
}

#[derive(Debug, Clone)]
pub struct TypedParam {
    pub name: String,
    pub mode: ParamMode,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TypedBlock {
    pub stmts: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedStmt {
    pub kind: TypedStmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedStmtKind {
    Let {
        name: String,
        mutable: bool,
        ty: Type,
        value: TypedExpr,
    },
    Assign {
        target: TypedExpr,
        value: TypedExpr,
    },
    Return {
        value: Option<TypedExpr>,
    },
    Expr {
        expr: TypedExpr,
    },
    Block {
        block: TypedBlock,
    },
}

#[derive(Debug, Clone)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedExprKind {
    IntLit(i64),
    BoolLit(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Binary {
        op: BinOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    StructLit {
        name: String,
        alloc: AllocKind,
        /// Initializers in source order.
        fields: Vec<(String, TypedExpr)>,
    },
    Field {
        object: Box<TypedExpr>,
        field: String,
        /// The field type as declared, before any managed lift.
        raw_ty: Type,
        /// True when the object is a managed handle (emitted as `->`).
        via_handle: bool,
    },
    Call {
        name: String,
        args: Vec<TypedExpr>,
    },
    Println {
        format: String,
        args: Vec<TypedExpr>,
    },
}

/// Where a struct construction places its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocKind {
    Linear,
    Managed,
}
