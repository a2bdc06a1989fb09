//! Integration tests for the compile-time diagnostics a bad program produces,
//! exercised through [`loxi::run_source`] rather than any single stage, since
//! that's the surface a host actually sees: scan, parse, and resolve errors
//! all come back batched as [`loxi::RunError::Compile`].

use loxi::{Interpreter, NoPrint, RunError};

fn compile_errors(source: &str) -> Vec<loxi::Diagnostic> {
    let mut interpreter = Interpreter::new(false);
    let mut print = NoPrint;
    match loxi::run_source(source, &mut interpreter, &mut print) {
        Err(RunError::Compile(diagnostics)) => diagnostics,
        Err(RunError::Runtime(error)) => panic!("expected a compile error, got a runtime one: {error}"),
        Ok(()) => panic!("expected a compile error, source ran to completion"),
    }
}

#[test]
fn unterminated_string_is_reported() {
    let diagnostics = compile_errors("print \"oops;");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("Unterminated string"));
}

#[test]
fn unexpected_character_is_reported_with_the_offending_character() {
    let diagnostics = compile_errors("var x = @;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unexpected character '@'.");
}

#[test]
fn missing_semicolon_is_reported_at_the_right_location() {
    let diagnostics = compile_errors("print 1");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Expect ';' after value.");
}

#[test]
fn invalid_assignment_target_is_reported() {
    let diagnostics = compile_errors("1 + 2 = 3;");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("Invalid assignment target"));
}

#[test]
fn return_from_top_level_code_is_a_resolve_error() {
    let diagnostics = compile_errors("return 1;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Cannot return from top-level code.");
}

#[test]
fn this_outside_a_class_is_a_resolve_error() {
    let diagnostics = compile_errors("print this;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Cannot use 'this' outside of a class.");
}

#[test]
fn super_with_no_superclass_is_a_resolve_error() {
    let diagnostics = compile_errors("class A { f() { super.f(); } }");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Cannot use 'super' in a class with no superclass.");
}

#[test]
fn self_referential_initializer_is_a_resolve_error() {
    let diagnostics = compile_errors("{ var a = a; }");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Cannot read local variable in its own initializer.");
}

#[test]
fn duplicate_local_declaration_is_a_resolve_error() {
    let diagnostics = compile_errors("{ var a = 1; var a = 2; }");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Variable with this name already declared in this scope.");
}

#[test]
fn redeclaring_a_global_is_not_an_error() {
    let mut interpreter = Interpreter::new(false);
    let mut print = NoPrint;
    let result = loxi::run_source("var a = 1; var a = 2;", &mut interpreter, &mut print);
    assert!(result.is_ok());
}

#[test]
fn scan_parse_and_resolve_errors_on_one_line_are_all_reported_together() {
    let diagnostics = compile_errors("return 1; this;");
    assert_eq!(diagnostics.len(), 2);
}

#[test]
fn diagnostic_display_matches_the_compile_time_format() {
    let diagnostics = compile_errors("return 1;");
    let rendered = diagnostics[0].to_string();
    assert!(rendered.starts_with("[line 1] Error"));
    assert!(rendered.ends_with("Cannot return from top-level code."));
}
