use super::*;
use crate::check::errors::CheckErrorKind;

fn owned(ty: Type, is_mutable: bool) -> VarInfo {
    VarInfo {
        ty,
        state: VarState::Owned,
        is_mutable,
        def_site: Span::default(),
    }
}

fn borrowed(ty: Type, state: VarState) -> VarInfo {
    VarInfo {
        ty,
        state,
        is_mutable: state == VarState::BorrowedWrite,
        def_site: Span::default(),
    }
}

fn point() -> Type {
    Type::Named("Point".to_string())
}

#[test]
fn test_move_owned_then_use() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), false)).unwrap();

    locals.move_out("p", Span::default()).unwrap();

    let err = locals.read("p", Span::default()).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::UseOfMovedValue(name, _) if name == "p"
    ));
}

#[test]
fn test_move_twice() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), false)).unwrap();

    locals.move_out("p", Span::default()).unwrap();
    let err = locals.move_out("p", Span::default()).unwrap_err();
    assert!(matches!(err.kind(), CheckErrorKind::MoveAlreadyMoved(_, _)));
}

#[test]
fn test_move_from_borrowed() {
    for state in [VarState::BorrowedRead, VarState::BorrowedWrite] {
        let mut locals = LocalContext::new();
        locals.enter_scope();
        locals.declare("p", borrowed(point(), state)).unwrap();

        let err = locals.move_out("p", Span::default()).unwrap_err();
        assert!(matches!(err.kind(), CheckErrorKind::MoveFromBorrowed(_, _)));
    }
}

#[test]
fn test_read_does_not_change_state() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), false)).unwrap();

    locals.read("p", Span::default()).unwrap();
    locals.read("p", Span::default()).unwrap();
    assert_eq!(locals.get("p").unwrap().state, VarState::Owned);
}

#[test]
fn test_shared_borrow_of_read_borrow_ok() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals
        .declare("p", borrowed(point(), VarState::BorrowedRead))
        .unwrap();

    locals.borrow_shared("p", Span::default()).unwrap();
}

#[test]
fn test_mut_borrow_of_read_borrow_rejected() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    let mut info = borrowed(point(), VarState::BorrowedRead);
    info.is_mutable = true;
    locals.declare("p", info).unwrap();

    let err = locals.borrow_mut("p", Span::default()).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::BorrowConflict(_, BorrowConflictReason::AlreadyBorrowed, _)
    ));
}

#[test]
fn test_any_borrow_of_write_borrow_rejected() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals
        .declare("p", borrowed(point(), VarState::BorrowedWrite))
        .unwrap();

    assert!(locals.borrow_shared("p", Span::default()).is_err());
    assert!(locals.borrow_mut("p", Span::default()).is_err());
}

#[test]
fn test_mut_borrow_requires_mutable_binding() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), false)).unwrap();

    let err = locals.borrow_mut("p", Span::default()).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::MutableBorrowOfImmutable(_, _)
    ));

    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), true)).unwrap();
    locals.borrow_mut("p", Span::default()).unwrap();
}

#[test]
fn test_borrow_of_moved_rejected() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), true)).unwrap();
    locals.move_out("p", Span::default()).unwrap();

    let err = locals.borrow_shared("p", Span::default()).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::BorrowConflict(_, BorrowConflictReason::ValueMoved, _)
    ));
}

#[test]
fn test_redeclaration_in_same_scope_rejected() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("x", owned(Type::Int, false)).unwrap();

    let err = locals.declare("x", owned(Type::Int, false)).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::DuplicateLocalBinding(_, _)
    ));
}

#[test]
fn test_shadowing_in_child_scope_allowed() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("x", owned(Type::Int, false)).unwrap();

    locals.enter_scope();
    locals.declare("x", owned(Type::Bool, false)).unwrap();
    assert_eq!(locals.get("x").unwrap().ty, Type::Bool);
    locals.leave_scope();

    assert_eq!(locals.get("x").unwrap().ty, Type::Int);
}

#[test]
fn test_child_scope_moves_do_not_leak() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    locals.declare("p", owned(point(), false)).unwrap();

    locals.enter_scope();
    locals.move_out("p", Span::default()).unwrap();
    assert_eq!(locals.get("p").unwrap().state, VarState::Moved);
    locals.leave_scope();

    // The parent's record is untouched by the child's transition.
    assert_eq!(locals.get("p").unwrap().state, VarState::Owned);
}

#[test]
fn test_undefined_variable() {
    let mut locals = LocalContext::new();
    locals.enter_scope();
    let err = locals.read("ghost", Span::default()).unwrap_err();
    assert!(matches!(
        err.kind(),
        CheckErrorKind::UndefinedVariable(name, _) if name == "ghost"
    ));
}
