use thirc_backend::OptLevel;
use thirc_cli::{compile, ThircOptions};
use thirc_error::ErrorKind;

fn opts() -> ThircOptions {
    ThircOptions {
        input: "test.th".to_string(),
        output: None,
        opt_level: OptLevel::Debug,
        print_thir: false,
    }
}

// S1: forward reference between functions builds and links through.
#[test]
fn s1_forward_reference_compiles() {
    let out = compile(&opts(), "fn b() i32 @extern; fn a() { b(); } fn main() @entry { a(); }").unwrap();
    assert!(out.contains("declare @b() -> i32"));
    assert!(out.contains("define @main() -> void entry"));
}

// S2: struct with a nested struct field.
#[test]
fn s2_struct_with_nested_field_compiles() {
    let out = compile(
        &opts(),
        "type Vector_2 ( i32 x, i32 y ); type Vector_3 ( Vector_2 xy, i32 z ); fn main() @entry {}",
    )
    .unwrap();
    assert!(out.contains("%Vector_2"));
    assert!(out.contains("%Vector_3"));
    assert!(out.contains("xy: Vector_2,"));
}

// S3: member assignment then read.
#[test]
fn s3_member_assignment_and_read_compiles() {
    let out = compile(
        &opts(),
        "type Vector_3 ( i32 x, i32 y, i32 z ); \
         fn printf(String fmt, ...) @extern; \
         fn main() @entry { Vector_3 v; v.z = 100; printf(\"v.z = '%d'\\n\", v.z); }",
    )
    .unwrap();
    assert!(out.contains("store 100, %v.z"));
}

// S4: mutual recursion is a dependency cycle.
#[test]
fn s4_cycle_is_reported() {
    let err = compile(&opts(), "fn a() { b(); } fn b() { a(); }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
}

// S5: wrong arity on a non-variadic call.
#[test]
fn s5_wrong_arity_is_reported() {
    let err = compile(&opts(), "fn f(i32 x) {} fn main() @entry { f(); }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongArity);
}

// S6: variadic extern accepts extra trailing arguments.
#[test]
fn s6_variadic_extern_call_compiles() {
    let out = compile(
        &opts(),
        "fn printf(String fmt, ...) @extern; fn main() @entry { printf(\"%d %d\\n\", 1, 2); }",
    )
    .unwrap();
    assert!(out.contains("declare @printf(String %fmt, ...) -> void"));
}

#[test]
fn missing_entry_point_is_reported() {
    let err = compile(&opts(), "fn a() i32 @extern;").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EntryPointMissing);
}

#[test]
fn syntax_error_is_reported() {
    let err = compile(&opts(), "fn (").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}
