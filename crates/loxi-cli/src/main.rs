//! `loxi` — run a Lox script or start an interactive prompt.
//!
//! Two modes per the external interface: no argument starts a REPL, one
//! argument runs it as a file. Exit codes follow the reference CLI: 0 on
//! success, 65 for a compile-time (scan/parse/resolve) error, 70 for a
//! runtime error, -1 for a usage error or anything fatal.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use loxi::{Diagnostic, Interpreter, RunError, StdPrint};

const USAGE_ERROR: i32 = -1;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: loxi [script]");
            std::process::exit(USAGE_ERROR);
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {path}: {err}");
            std::process::exit(USAGE_ERROR);
        }
    };

    let mut interpreter = Interpreter::new(false);
    let mut print = StdPrint;
    match loxi::run_source(&source, &mut interpreter, &mut print) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Compile(diagnostics)) => {
            report_diagnostics(&diagnostics);
            ExitCode::from(65)
        }
        Err(RunError::Runtime(error)) => {
            eprint!("{error}");
            ExitCode::from(70)
        }
    }
}

/// Interactive prompt: `<N>> ` where `N` is a 1-based line counter, per the
/// external interface. `help();`/`env();`/`quit();` are available because
/// the interpreter is constructed with `interactive = true`; a bad line
/// reports its errors and the session continues.
fn run_prompt() -> ExitCode {
    println!("loxi — a tree-walking Lox interpreter.");
    println!("Type an expression or statement and press Enter. Try help();");

    let mut interpreter = Interpreter::new(true);
    let mut print = StdPrint;
    let stdin = io::stdin();
    let mut line_number: usize = 1;

    loop {
        print!("{line_number}> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF (Ctrl-D)
            Ok(_) => {}
            Err(_) => break,
        }

        match loxi::run_source(&line, &mut interpreter, &mut print) {
            Ok(()) => {}
            Err(RunError::Compile(diagnostics)) => report_diagnostics(&diagnostics),
            Err(RunError::Runtime(error)) => eprint!("{error}"),
        }

        interpreter.collect_garbage();
        line_number += 1;

        if interpreter.quit_requested() {
            break;
        }
    }

    ExitCode::SUCCESS
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}
