//! Top-level facade: wires the scanner, parser, resolver, and evaluator
//! into the single `source in, result out` entry point every host (REPL,
//! file runner, integration test) goes through.
//!
//! Kept as a thin orchestration layer, the way the reference driver's `run`
//! function is a few lines gluing together stages it does not itself
//! implement.

use crate::exception::{Diagnostic, RuntimeError};
use crate::interpreter::Interpreter;
use crate::io::PrintWriter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::resource::ResourceTracker;
use crate::scanner;

/// Either a batch of compile-time diagnostics (scan/parse/resolve) or a
/// single runtime failure, matching the two shapes [`crate::exception`]
/// distinguishes.
#[derive(Debug)]
pub enum RunError {
    Compile(Vec<Diagnostic>),
    Runtime(RuntimeError),
}

/// Scans, parses, resolves, and executes `source` against `interpreter`.
///
/// Compile errors from any of the first three stages are accumulated and
/// reported together rather than stopping at the first stage that finds
/// one, so a single bad line reports everything wrong with it at once.
/// Execution never starts if any stage reported a diagnostic.
pub fn run_source<T: ResourceTracker>(
    source: &str,
    interpreter: &mut Interpreter<T>,
    print: &mut impl PrintWriter,
) -> Result<(), RunError> {
    let mut diagnostics = Vec::new();

    let (tokens, scan_errors) = scanner::scan(source, interpreter.interns_mut());
    diagnostics.extend(scan_errors);

    let (mut statements, parse_report) = Parser::new(tokens, interpreter.interns()).parse();
    diagnostics.extend(parse_report.diagnostics().iter().cloned());

    let resolve_report = Resolver::new(interpreter.interns_mut()).resolve(&mut statements);
    diagnostics.extend(resolve_report.diagnostics().iter().cloned());

    if !diagnostics.is_empty() {
        return Err(RunError::Compile(diagnostics));
    }

    interpreter.execute_program(&statements, print).map_err(RunError::Runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectStringPrint;

    fn run(source: &str) -> Result<String, RunError> {
        let mut interpreter = Interpreter::new(false);
        let mut print = CollectStringPrint::new();
        run_source(source, &mut interpreter, &mut print)?;
        Ok(print.into_string())
    }

    #[test]
    fn arithmetic_prints_the_expected_result() {
        assert_eq!(run("print 1 + 2;").unwrap(), "3\n");
    }

    #[test]
    fn a_bad_line_does_not_poison_a_later_one() {
        let mut interpreter = Interpreter::new(false);
        let mut print = CollectStringPrint::new();
        assert!(run_source("print 1/0;", &mut interpreter, &mut print).is_err());
        assert!(run_source("print 2 + 2;", &mut interpreter, &mut print).is_ok());
        assert_eq!(print.into_string(), "4\n");
    }

    #[test]
    fn compile_errors_are_reported_as_a_batch_not_just_the_first() {
        let err = run("return 1; this;").unwrap_err();
        match err {
            RunError::Compile(diagnostics) => assert_eq!(diagnostics.len(), 2),
            RunError::Runtime(_) => panic!("expected compile errors"),
        }
    }
}
