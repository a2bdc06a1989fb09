//! `help()` — prints a short summary of the REPL-only natives.

use crate::io::PrintWriter;

pub fn call(print: &mut impl PrintWriter) {
    print.print_line("Available: clock(), help(), env(), quit().");
    print.print_line("Enter a Lox statement and press Enter to run it.");
}
