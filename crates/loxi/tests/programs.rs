//! End-to-end program scenarios: whole Lox programs run through
//! [`loxi::run_source`] and checked against their exact `print`ed output,
//! or against the runtime error they're expected to raise.
//!
//! Complements `repl.rs` (session/state behavior) and `parse_errors.rs`
//! (compile-time diagnostics) with the evaluator's dynamic semantics:
//! arithmetic, recursion, inheritance, `init`, `for`-desugaring, and the
//! runtime error messages a misbehaving program triggers.

use loxi::{CollectStringPrint, Interpreter, NoLimitTracker, RunError};

fn output(source: &str) -> String {
    let mut interpreter = Interpreter::with_tracker(NoLimitTracker, false);
    let mut print = CollectStringPrint::new();
    loxi::run_source(source, &mut interpreter, &mut print).unwrap();
    print.into_string()
}

fn runtime_error(source: &str) -> String {
    let mut interpreter = Interpreter::with_tracker(NoLimitTracker, false);
    let mut print = CollectStringPrint::new();
    match loxi::run_source(source, &mut interpreter, &mut print) {
        Err(RunError::Runtime(error)) => error.to_string(),
        Err(RunError::Compile(diagnostics)) => panic!("expected a runtime error, got compile diagnostics: {diagnostics:?}"),
        Ok(()) => panic!("expected a runtime error, source ran to completion"),
    }
}

#[test]
fn arithmetic() {
    assert_eq!(output("print 1 + 2;"), "3\n");
}

#[test]
fn string_plus_number_concatenation() {
    assert_eq!(output(r#"var a = "foo"; var b = 2; print a + b;"#), "foo2\n");
}

#[test]
fn recursive_fibonacci() {
    let source = "fun f(n){ if (n<2) return n; return f(n-1)+f(n-2);} print f(10);";
    assert_eq!(output(source), "55\n");
}

#[test]
fn single_inheritance_with_super_call() {
    let source = r#"
        class A { greet(){ print "A"; } }
        class B < A { greet(){ super.greet(); print "B"; } }
        B().greet();
    "#;
    assert_eq!(output(source), "A\nB\n");
}

#[test]
fn initializer_sets_a_field_and_returns_this() {
    assert_eq!(output("class C { init(x){ this.x = x; } } print C(42).x;"), "42\n");
}

#[test]
fn desugared_for_loop_accumulates() {
    assert_eq!(output("var x = 0; for (var i=0; i<3; i=i+1) x = x + i; print x;"), "3\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert_eq!(runtime_error("print 1/0;"), "Division by zero.\n[line 1]\n");
}

#[test]
fn property_access_on_an_instance_with_no_such_field_is_undefined_property() {
    let error = runtime_error("class A {} A().x;");
    assert!(error.starts_with("Undefined property 'x'."), "{error}");
}

#[test]
fn calling_a_non_callable_is_a_runtime_error() {
    let error = runtime_error("var a = 1; a();");
    assert!(error.starts_with("Can only call functions and classes"), "{error}");
}

#[test]
fn wrong_arity_is_a_runtime_error() {
    let error = runtime_error("fun f(a, b) { return a + b; } f(1);");
    assert!(error.starts_with("Expected 2 arguments but got 1."), "{error}");
}

#[test]
fn property_get_on_a_non_instance_is_a_runtime_error() {
    let error = runtime_error(r#"print "abc".length;"#);
    assert!(error.starts_with("Only instances have properties"), "{error}");
}

#[test]
fn grandparent_method_is_reachable_through_two_levels_of_super() {
    let source = r#"
        class A { who(){ print "A"; } }
        class B < A {}
        class C < B { who(){ super.who(); } }
        C().who();
    "#;
    assert_eq!(output(source), "A\n");
}

#[test]
fn fields_shadow_methods_of_the_same_name() {
    let source = r#"
        class Box { contents(){ return "method"; } }
        var b = Box();
        b.contents = "field";
        print b.contents;
    "#;
    assert_eq!(output(source), "field\n");
}

#[test]
fn closures_capture_their_defining_environment_per_call() {
    let source = r#"
        fun make_counter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        var a = make_counter();
        var b = make_counter();
        print a();
        print a();
        print b();
    "#;
    assert_eq!(output(source), "1\n2\n1\n");
}

#[test]
fn logical_or_short_circuits_and_does_not_evaluate_the_right_side() {
    let source = r#"
        fun boom() { print "evaluated"; return true; }
        print true or boom();
    "#;
    assert_eq!(output(source), "true\n");
}

#[test]
fn logical_and_short_circuits_on_a_falsey_left_side() {
    let source = r#"
        fun boom() { print "evaluated"; return true; }
        print false and boom();
    "#;
    assert_eq!(output(source), "false\n");
}

#[test]
fn a_superclass_that_is_not_a_class_is_a_runtime_error() {
    let source = r#"
        var NotAClass = 1;
        class A < NotAClass {}
    "#;
    assert_eq!(runtime_error(source), "Superclass must be a class.\n[line 3]\n");
}

#[test]
fn class_with_no_init_takes_no_arguments() {
    let error = runtime_error("class A {} A(1);");
    assert!(error.starts_with("Expected 0 arguments but got 1."), "{error}");
}

#[test]
fn negative_zero_prints_with_its_sign() {
    assert_eq!(output("print -0.0;"), "-0\n");
}
