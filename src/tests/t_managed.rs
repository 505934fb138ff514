use crate::check::{CheckError, CheckErrorKind, check};
use crate::context::{CheckedContext, ParsedContext};
use crate::lexer::{LexError, Lexer, Token};
use crate::parse::Parser;
use crate::typed::{AllocKind, TypedExprKind, TypedStmtKind};
use crate::types::Type;

fn check_source(source: &str) -> Result<CheckedContext, CheckError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .collect::<Result<Vec<Token>, LexError>>()
        .expect("Failed to tokenize");
    let mut parser = Parser::new(&tokens);
    let program = parser.parse().expect("Failed to parse");
    check(ParsedContext::new(program))
}

fn check_err(source: &str) -> CheckError {
    check_source(source).err().expect("Expected a check error")
}

#[test]
fn test_nested_managed_propagation() {
    let ctx = check_source(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let foo = managed Foo{bar: Bar{val: 42}};
            let b: managed Bar = foo.bar;
        }
        "#,
    )
    .expect("nested managed construction should check");

    // `foo.bar` is lifted to a managed handle.
    let main = &ctx.program.funcs[0];
    let TypedStmtKind::Let { ty, value, .. } = &main.body.stmts[1].kind else {
        panic!("expected let");
    };
    assert_eq!(*ty, Type::managed(Type::Named("Bar".to_string())));
    assert!(
        matches!(&value.kind, TypedExprKind::Field { via_handle: true, raw_ty, .. }
            if *raw_ty == Type::Named("Bar".to_string()))
    );

    // The nested literal was itself checked as a managed construction.
    let TypedStmtKind::Let { value, .. } = &main.body.stmts[0].kind else {
        panic!("expected let");
    };
    let TypedExprKind::StructLit { alloc, fields, .. } = &value.kind else {
        panic!("expected struct literal");
    };
    assert_eq!(*alloc, AllocKind::Managed);
    let (_, bar_value) = &fields[0];
    assert!(
        matches!(&bar_value.kind, TypedExprKind::StructLit { alloc: AllocKind::Managed, .. })
    );
    assert_eq!(bar_value.ty, Type::managed(Type::Named("Bar".to_string())));
}

#[test]
fn test_linear_value_in_managed_slot() {
    let err = check_err(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let linear_bar = Bar{val: 1};
            let foo = managed Foo{bar: linear_bar};
        }
        "#,
    );
    assert!(err.to_string().contains("Expected managed Bar but got Bar"));
}

#[test]
fn test_managed_field_into_linear_slot() {
    let err = check_err(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let foo = managed Foo{bar: Bar{val: 42}};
            let c: Bar = foo.bar;
        }
        "#,
    );
    assert!(err.to_string().contains("Expected Bar but got managed Bar"));
}

#[test]
fn test_resource_on_managed_heap() {
    let err = check_err(
        r#"
        resource F { fd: int }
        fn main() -> unit {
            let f: managed F = managed F{fd: 6};
        }
        "#,
    );
    assert!(err.to_string().contains("cannot be allocated as managed"));
    assert!(matches!(
        err.kind(),
        CheckErrorKind::ResourceNotManageable(name, _) if name == "F"
    ));
}

#[test]
fn test_managed_resource_type_is_valid_when_never_constructed() {
    // The resource ban is scoped to construction sites. A managed-resource
    // parameter type validates on its own; no call site could ever produce
    // a value for it.
    check_source(
        r#"
        resource F { fd: int }
        fn take(f: managed F) -> unit { }
        fn main() -> unit { }
        "#,
    )
    .expect("managed resource in type position should check without construction");
}

#[test]
fn test_managed_handles_copy_instead_of_moving() {
    check_source(
        r#"
        struct P { x: int }
        fn take(h: managed P) -> unit { }
        fn main() -> unit {
            let m = managed P{x: 1};
            let m2 = m;
            take(m);
            take(m2);
            println("{} {}", m, m2);
        }
        "#,
    )
    .expect("managed handles are copy-kind and never move");
}

#[test]
fn test_primitive_fields_stay_raw_in_managed_context() {
    let ctx = check_source(
        r#"
        struct P { x: int }
        fn main() -> unit {
            let m = managed P{x: 1};
            let x: int = m.x;
        }
        "#,
    )
    .expect("primitive fields of managed objects are not lifted");

    let main = &ctx.program.funcs[0];
    let TypedStmtKind::Let { ty, value, .. } = &main.body.stmts[1].kind else {
        panic!("expected let");
    };
    assert_eq!(*ty, Type::Int);
    // The access still goes through the handle.
    assert!(matches!(
        &value.kind,
        TypedExprKind::Field { via_handle: true, .. }
    ));
}

#[test]
fn test_field_access_on_managed_primitive() {
    let err = check_err(
        r#"
        fn f(h: managed int) -> unit {
            let y = h.x;
        }
        fn main() -> unit { }
        "#,
    );
    assert!(matches!(
        err.kind(),
        CheckErrorKind::FieldAccessOnManagedNonStruct(_, _)
    ));
    assert!(err.to_string().contains("managed int"));
}

#[test]
fn test_linear_variable_cannot_be_coerced_into_managed_annotation() {
    let err = check_err(
        r#"
        struct Bar { val: int }
        fn main() -> unit {
            let b = Bar{val: 1};
            let m: managed Bar = b;
        }
        "#,
    );
    assert!(err.to_string().contains("Expected managed Bar but got Bar"));
}

#[test]
fn test_explicitly_managed_field_type() {
    // A field declared `managed Bar` takes a handle in both linear and
    // managed constructions.
    check_source(
        r#"
        struct Bar { val: int }
        struct Holder { bar: managed Bar }
        fn main() -> unit {
            let h = Holder{bar: managed Bar{val: 1}};
            let m = managed Holder{bar: Bar{val: 2}};
        }
        "#,
    )
    .expect("managed-typed fields accept handles");
}

#[test]
fn test_bare_literal_in_managed_typed_field_of_linear_literal() {
    let err = check_err(
        r#"
        struct Bar { val: int }
        struct Holder { bar: managed Bar }
        fn main() -> unit {
            let h = Holder{bar: Bar{val: 1}};
        }
        "#,
    );
    assert!(err.to_string().contains("Expected managed Bar but got Bar"));
}

// -----------------------------------------------------------------------------
// Equality
// -----------------------------------------------------------------------------

#[test]
fn test_equality_on_primitives() {
    check_source(
        r#"
        fn main() -> unit {
            let a = 1 == 2;
            let b = true != false;
        }
        "#,
    )
    .expect("primitive equality should check");
}

#[test]
fn test_equality_on_managed_handles() {
    check_source(
        r#"
        struct P { x: int }
        fn main() -> unit {
            let m1 = managed P{x: 1};
            let m2 = m1;
            let same = m1 == m2;
        }
        "#,
    )
    .expect("managed handle equality should check");
}

#[test]
fn test_equality_on_move_kind_rejected() {
    let err = check_err(
        r#"
        struct P { x: int }
        fn main() -> unit {
            let a = P{x: 1};
            let b = P{x: 2};
            let same = a == b;
        }
        "#,
    );
    assert!(matches!(
        err.kind(),
        CheckErrorKind::EqualityOperandsNotCopyKind(_, _)
    ));
}

#[test]
fn test_equality_operand_types_must_match() {
    let err = check_err("fn main() -> unit { let x = 1 == true; }");
    assert!(err.to_string().contains("Expected int but got bool"));
}
