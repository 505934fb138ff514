use crate::compile::{CompileOptions, compile};

fn emit(source: &str) -> String {
    compile(source, &CompileOptions::default())
        .expect("Failed to compile")
        .cpp
}

#[test]
fn test_prelude_and_main_wrapping() {
    let cpp = emit("fn main() -> unit { }");
    assert!(cpp.contains("#include \"gc.h\""));
    assert!(cpp.contains("int main() {"));
    assert!(cpp.contains("GC_init();"));
    assert!(cpp.contains("return 0;"));
}

#[test]
fn test_struct_definition() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn main() -> unit { }
        "#,
    );
    assert!(cpp.contains("struct Point {"));
    assert!(cpp.contains("int64_t x;"));
    assert!(cpp.contains("int64_t y;"));
}

#[test]
fn test_linear_literal_brace_init() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn main() -> unit {
            let p = Point{x: 1, y: 2};
        }
        "#,
    );
    assert!(cpp.contains("Point p = Point{1, 2};"));
}

#[test]
fn test_literal_fields_reordered_to_declaration_order() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn main() -> unit {
            let p = Point{y: 2, x: 1};
        }
        "#,
    );
    assert!(cpp.contains("Point{1, 2}"));
}

#[test]
fn test_managed_literal_uses_placement_new() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn main() -> unit {
            let p = managed Point{x: 1, y: 2};
        }
        "#,
    );
    assert!(cpp.contains("Point* p = new (GC_malloc(sizeof(Point))) Point{1, 2};"));
}

#[test]
fn test_field_access_through_handle_uses_arrow() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn main() -> unit {
            let m = managed Point{x: 1, y: 2};
            let a = m.x;
            let p = Point{x: 3, y: 4};
            let b = p.x;
        }
        "#,
    );
    assert!(cpp.contains("m->x"));
    assert!(cpp.contains("p.x"));
}

#[test]
fn test_resource_destructor_holds_cleanup() {
    let cpp = emit(
        r#"
        resource File {
            fd: int
            cleanup {
                println("closing {}", fd);
            }
        }
        fn main() -> unit {
            let f = File{fd: 3};
        }
        "#,
    );
    assert!(cpp.contains("~File() {"));
    assert!(cpp.contains("closing %lld"));
}

#[test]
fn test_param_modes_map_to_cpp_references() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn by_value(p: Point) -> unit { }
        fn by_ref(p: ref Point) -> unit { }
        fn by_inout(p: inout Point) -> unit { }
        fn main() -> unit { }
        "#,
    );
    assert!(cpp.contains("void by_value(Point p)"));
    assert!(cpp.contains("void by_ref(const Point& p)"));
    assert!(cpp.contains("void by_inout(Point& p)"));
}

#[test]
fn test_managed_type_is_a_pointer() {
    let cpp = emit(
        r#"
        struct Point { x: int, y: int }
        fn take(h: managed Point) -> unit { }
        fn main() -> unit { }
        "#,
    );
    assert!(cpp.contains("void take(Point* h)"));
}

#[test]
fn test_println_formats_by_type() {
    let cpp = emit(
        r#"
        fn main() -> unit {
            println("n={} b={}", 42, true);
        }
        "#,
    );
    assert!(cpp.contains("printf(\"n=%lld b=%s\\n\", (long long)(42), (true) ? \"true\" : \"false\");"));
}

#[test]
fn test_println_escapes_percent() {
    let cpp = emit(
        r#"
        fn main() -> unit {
            println("100%");
        }
        "#,
    );
    assert!(cpp.contains("printf(\"100%%\\n\")"));
}

#[test]
fn test_function_return_value() {
    let cpp = emit(
        r#"
        fn add(a: int, b: int) -> int {
            return a + b;
        }
        fn main() -> unit {
            let x = add(1, 2);
        }
        "#,
    );
    assert!(cpp.contains("int64_t add(int64_t a, int64_t b)"));
    assert!(cpp.contains("return (a + b);"));
    assert!(cpp.contains("int64_t x = add(1, 2);"));
}

#[test]
fn test_prototypes_precede_definitions() {
    let cpp = emit(
        r#"
        fn main() -> unit {
            helper();
        }
        fn helper() -> unit { }
        "#,
    );
    let proto = cpp.find("void helper();").expect("prototype missing");
    let def = cpp.find("void helper() {").expect("definition missing");
    assert!(proto < def);
}

#[test]
fn test_nested_managed_literal_is_one_allocation() {
    let cpp = emit(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let foo = managed Foo{bar: Bar{val: 42}};
        }
        "#,
    );
    // The nested construction initializes the inline slot; only the
    // outermost literal allocates.
    assert!(cpp.contains("new (GC_malloc(sizeof(Foo))) Foo{Bar{42}}"));
    assert!(!cpp.contains("GC_malloc(sizeof(Bar))"));
}

#[test]
fn test_lifted_field_access_takes_the_field_address() {
    let cpp = emit(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let foo = managed Foo{bar: Bar{val: 42}};
            let b: managed Bar = foo.bar;
            let v = b.val;
        }
        "#,
    );
    assert!(cpp.contains("Bar* b = (&foo->bar);"));
    assert!(cpp.contains("b->val"));
}

#[test]
fn test_handle_into_inline_slot_copies_the_pointee() {
    let cpp = emit(
        r#"
        struct Bar { val: int }
        struct Foo { bar: Bar }
        fn main() -> unit {
            let b = managed Bar{val: 1};
            let foo = managed Foo{bar: b};
        }
        "#,
    );
    assert!(cpp.contains("Foo{*(b)}"));
}

#[test]
fn test_emission_is_deterministic() {
    let source = r#"
        struct P { x: int }
        fn main() -> unit {
            let p = managed P{x: 1};
            println("{}", p.x);
        }
    "#;
    assert_eq!(emit(source), emit(source));
}
