mod common;

use common::{compile_source, first_error};

#[test]
fn test_full_program_compiles_to_cpp() {
    let source = r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }

        resource File {
            fd: int
            cleanup {
                println("closing fd {}", fd);
            }
        }

        fn sum(a: int, b: int) -> int {
            return a + b;
        }

        fn main() -> unit {
            let foo = managed Foo{bar: Bar{val: 42}};
            let b: managed Bar = foo.bar;
            let f = File{fd: 3};
            let total = sum(b.val, 8);
            println("total = {}", total);
        }
    "#;

    let output = compile_source(source).expect("program should compile");
    assert!(output.cpp.contains("#include \"gc.h\""));
    assert!(output.cpp.contains("new (GC_malloc(sizeof(Foo))) Foo{"));
    assert!(output.cpp.contains("~File()"));
    assert!(output.cpp.contains("foo->bar"));
    assert!(output.cpp.contains("int main() {"));
}

#[test]
fn test_move_then_use_is_reported() {
    let message = first_error(
        r#"
        struct P { x: int, y: int }
        fn main() -> unit {
            let p = P{x: 10, y: 20};
            let p2 = p;
            println("{}", p);
        }
        "#,
    );
    assert!(message.contains("Use of moved value"));
}

#[test]
fn test_linear_into_managed_slot_is_reported() {
    let message = first_error(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let linear_bar = Bar{val: 1};
            let foo = managed Foo{bar: linear_bar};
        }
        "#,
    );
    assert!(message.contains("Expected managed Bar but got Bar"));
}

#[test]
fn test_resource_on_managed_heap_is_reported() {
    let message = first_error(
        r#"
        resource F { fd: int }
        fn main() -> unit {
            let f: managed F = managed F{fd: 6};
        }
        "#,
    );
    assert!(message.contains("cannot be allocated as managed"));
}

#[test]
fn test_missing_main_is_reported() {
    let message = first_error("fn helper() -> unit { }");
    assert!(message.contains("No 'main' function"));
}

#[test]
fn test_parse_errors_surface_through_the_driver() {
    let message = first_error("fn main() -> unit { let x = 1 }");
    assert!(message.contains("Expected"));
}

#[test]
fn test_compilation_is_deterministic() {
    let source = r#"
        struct P { x: int }
        fn main() -> unit {
            let p = managed P{x: 1};
            println("{}", p.x);
        }
    "#;
    let first = compile_source(source).expect("program should compile").cpp;
    let second = compile_source(source).expect("program should compile").cpp;
    assert_eq!(first, second);
}
