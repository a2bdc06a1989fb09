//! Integration tests for a REPL-style session: one `Interpreter` fed many
//! independently-compiled lines, the way `loxi-cli`'s prompt loop drives it.
//!
//! Each assertion exercises a property the external interface promises: globals
//! persist between lines, a bad line doesn't poison later ones, and the session
//! never replays earlier input (it genuinely isn't kept around to replay).

use loxi::{run_source, CollectStringPrint, Interpreter, RunError};

fn feed(interpreter: &mut Interpreter, print: &mut CollectStringPrint, line: &str) -> Result<(), RunError> {
    run_source(line, interpreter, print)
}

#[test]
fn globals_persist_across_lines() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    feed(&mut interpreter, &mut print, "var count = 0;").unwrap();
    feed(&mut interpreter, &mut print, "count = count + 1;").unwrap();
    feed(&mut interpreter, &mut print, "count = count + 1;").unwrap();
    feed(&mut interpreter, &mut print, "print count;").unwrap();

    assert_eq!(print.as_str(), "2\n");
}

#[test]
fn function_declared_in_one_line_is_callable_in_a_later_line() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    feed(&mut interpreter, &mut print, "fun greet(name) { print \"hi \" + name; }").unwrap();
    feed(&mut interpreter, &mut print, "greet(\"lox\");").unwrap();

    assert_eq!(print.as_str(), "hi lox\n");
}

#[test]
fn a_later_redefinition_is_what_subsequent_calls_see() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    feed(&mut interpreter, &mut print, "fun f() { return 1; }").unwrap();
    feed(&mut interpreter, &mut print, "print f();").unwrap();
    feed(&mut interpreter, &mut print, "fun f() { return 2; }").unwrap();
    feed(&mut interpreter, &mut print, "print f();").unwrap();

    assert_eq!(print.as_str(), "1\n2\n");
}

#[test]
fn runtime_error_on_one_line_preserves_state_from_earlier_lines() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    feed(&mut interpreter, &mut print, "var x = 41;").unwrap();
    let result = feed(&mut interpreter, &mut print, "print x + nil;");
    assert!(matches!(result, Err(RunError::Runtime(_))));

    feed(&mut interpreter, &mut print, "print x;").unwrap();
    assert_eq!(print.as_str(), "41\n");
}

#[test]
fn a_compile_error_on_one_line_does_not_abort_the_session() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    let result = feed(&mut interpreter, &mut print, "return 1;");
    assert!(matches!(result, Err(RunError::Compile(_))));

    feed(&mut interpreter, &mut print, "print 1 + 1;").unwrap();
    assert_eq!(print.as_str(), "2\n");
}

#[test]
fn classes_declared_across_lines_still_resolve_inheritance() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();

    feed(&mut interpreter, &mut print, "class A { greet() { print \"A\"; } }").unwrap();
    feed(&mut interpreter, &mut print, "class B < A { greet() { super.greet(); print \"B\"; } }").unwrap();
    feed(&mut interpreter, &mut print, "B().greet();").unwrap();

    assert_eq!(print.as_str(), "A\nB\n");
}

#[test]
fn help_env_and_quit_are_only_defined_in_interactive_mode() {
    let mut batch = Interpreter::new(false);
    let mut print = CollectStringPrint::new();
    let result = feed(&mut batch, &mut print, "help();");
    assert!(matches!(result, Err(RunError::Runtime(_))), "help() should be undefined in file mode");

    let mut interactive = Interpreter::new(true);
    let mut print = CollectStringPrint::new();
    feed(&mut interactive, &mut print, "help();").unwrap();
}

#[test]
fn quit_sets_the_quit_requested_flag() {
    let mut interpreter = Interpreter::new(true);
    let mut print = CollectStringPrint::new();
    assert!(!interpreter.quit_requested());

    feed(&mut interpreter, &mut print, "quit();").unwrap();
    assert!(interpreter.quit_requested());
}

#[test]
fn clock_is_available_in_both_modes_and_increases() {
    let mut interpreter = Interpreter::new(false);
    let mut print = CollectStringPrint::new();
    feed(&mut interpreter, &mut print, "var a = clock();").unwrap();
    feed(&mut interpreter, &mut print, "var b = clock();").unwrap();
    feed(&mut interpreter, &mut print, "print b >= a;").unwrap();
    assert_eq!(print.as_str(), "true\n");
}
