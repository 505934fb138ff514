use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::diag::Span;
use crate::types::Type;

/// The single error surfaced by the checker. The boxed kind keeps the
/// `Result` payload a pointer wide; the kind enum is the internal taxonomy.
#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct CheckError(Box<CheckErrorKind>);

impl CheckError {
    pub fn kind(&self) -> &CheckErrorKind {
        &self.0
    }

    pub fn span(&self) -> Option<Span> {
        self.0.span()
    }
}

impl From<CheckErrorKind> for CheckError {
    fn from(kind: CheckErrorKind) -> Self {
        CheckError(Box::new(kind))
    }
}

/// Which top-level namespace a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Struct,
    Resource,
    Function,
}

impl Display for DefKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DefKind::Struct => write!(f, "struct"),
            DefKind::Resource => write!(f, "resource"),
            DefKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CheckErrorKind {
    #[error("Duplicate {0} definition: {1}")]
    DuplicateDefinition(DefKind, String, Span),

    #[error("Unknown type: {0}")]
    UnknownType(String, Span),

    #[error("Unknown field {0} in literal of {1}")]
    UnknownFieldInStructLiteral(String, String, Span),

    #[error("Literal of {0} must initialize exactly the declared fields")]
    FieldSetMismatch(String, Span),

    #[error("Unknown field {0} on type {1}")]
    UnknownField(String, String, Span),

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String, Span),

    #[error("Variable already defined in current scope: {0}")]
    DuplicateLocalBinding(String, Span),

    #[error("Use of moved value: {0}")]
    UseOfMovedValue(String, Span),

    #[error("Expected {0} but got {1}")]
    TypeMismatch(Type, Type, Span),

    #[error("Invalid argument count for function {0}: expected {1}, found {2}")]
    ArityMismatch(String, usize, usize, Span),

    #[error("Dynamic call targets are not supported")]
    DynamicCallNotSupported(Span),

    #[error("Undefined function: {0}")]
    NoSuchFunction(String, Span),

    #[error("Field access on non-struct type: {0}")]
    FieldAccessOnNonStruct(Type, Span),

    #[error("Field access on managed non-struct type: {0}")]
    FieldAccessOnManagedNonStruct(Type, Span),

    #[error("Cannot assign to immutable variable: {0}")]
    AssignToImmutable(String, Span),

    #[error("Cannot mutably borrow immutable variable: {0}")]
    MutableBorrowOfImmutable(String, Span),

    #[error("Invalid assignment target")]
    AssignTargetNotAPlace(Span),

    #[error("Cannot move out of borrowed variable: {0}")]
    MoveFromBorrowed(String, Span),

    #[error("Cannot move {0}: value already moved")]
    MoveAlreadyMoved(String, Span),

    #[error("Cannot borrow {0}: {1}")]
    BorrowConflict(String, BorrowConflictReason, Span),

    #[error("Resource {0} cannot be allocated as managed")]
    ResourceNotManageable(String, Span),

    #[error("Equality requires copy-kind operands, found {0}")]
    EqualityOperandsNotCopyKind(Type, Span),

    #[error("Operand must be an integer, found {0}")]
    ArithmeticOperandsNotInt(Type, Span),

    #[error("Return outside of a function body")]
    ReturnOutsideFunction(Span),

    #[error("No 'main' function")]
    MainMissing,

    #[error("'main' function cannot have parameters")]
    MainHasParameters(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowConflictReason {
    AlreadyBorrowed,
    AlreadyMutablyBorrowed,
    ValueMoved,
    Temporary,
}

impl Display for BorrowConflictReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BorrowConflictReason::AlreadyBorrowed => write!(f, "already borrowed"),
            BorrowConflictReason::AlreadyMutablyBorrowed => write!(f, "already mutably borrowed"),
            BorrowConflictReason::ValueMoved => write!(f, "value was moved"),
            BorrowConflictReason::Temporary => {
                write!(f, "only variables and fields can be borrowed")
            }
        }
    }
}

impl CheckErrorKind {
    pub fn span(&self) -> Option<Span> {
        match self {
            CheckErrorKind::DuplicateDefinition(_, _, span) => Some(*span),
            CheckErrorKind::UnknownType(_, span) => Some(*span),
            CheckErrorKind::UnknownFieldInStructLiteral(_, _, span) => Some(*span),
            CheckErrorKind::FieldSetMismatch(_, span) => Some(*span),
            CheckErrorKind::UnknownField(_, _, span) => Some(*span),
            CheckErrorKind::UndefinedVariable(_, span) => Some(*span),
            CheckErrorKind::DuplicateLocalBinding(_, span) => Some(*span),
            CheckErrorKind::UseOfMovedValue(_, span) => Some(*span),
            CheckErrorKind::TypeMismatch(_, _, span) => Some(*span),
            CheckErrorKind::ArityMismatch(_, _, _, span) => Some(*span),
            CheckErrorKind::DynamicCallNotSupported(span) => Some(*span),
            CheckErrorKind::NoSuchFunction(_, span) => Some(*span),
            CheckErrorKind::FieldAccessOnNonStruct(_, span) => Some(*span),
            CheckErrorKind::FieldAccessOnManagedNonStruct(_, span) => Some(*span),
            CheckErrorKind::AssignToImmutable(_, span) => Some(*span),
            CheckErrorKind::MutableBorrowOfImmutable(_, span) => Some(*span),
            CheckErrorKind::AssignTargetNotAPlace(span) => Some(*span),
            CheckErrorKind::MoveFromBorrowed(_, span) => Some(*span),
            CheckErrorKind::MoveAlreadyMoved(_, span) => Some(*span),
            CheckErrorKind::BorrowConflict(_, _, span) => Some(*span),
            CheckErrorKind::ResourceNotManageable(_, span) => Some(*span),
            CheckErrorKind::EqualityOperandsNotCopyKind(_, span) => Some(*span),
            CheckErrorKind::ArithmeticOperandsNotInt(_, span) => Some(*span),
            CheckErrorKind::ReturnOutsideFunction(span) => Some(*span),
            CheckErrorKind::MainMissing => None,
            CheckErrorKind::MainHasParameters(span) => Some(*span),
        }
    }
}
