//! Error taxonomy and diagnostic formatting.
//!
//! Scan, parse, and resolve problems all render through [`Diagnostic`]'s
//! compile-time format; runtime failures unwind as a [`RuntimeError`] and
//! render through its own, differently-shaped format. Keeping both shapes in
//! one module (rather than splitting "internal" vs "public" error types the
//! way a richer exception hierarchy might) matches the size of Lox's error
//! surface: there is no user-catchable exception object, just these two
//! report shapes.

use std::fmt;

/// A scan/parse/resolve error: `[line <N>] Error<location>: <message>`.
///
/// `location` is one of `""`, `" at end"`, or `" at '<lexeme>'"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error{}: {}", self.line, self.location, self.message)
    }
}

/// A runtime error: renders as `<message>\n[line <N>]\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self { message: message.into(), line }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n[line {}]\n", self.message, self.line)
    }
}

/// Accumulates compile-time diagnostics across scan/parse/resolve, tracking
/// whether any were reported ("had error") so the caller can decide to abort
/// before evaluation.
#[derive(Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    #[must_use]
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_matches_the_compile_time_contract() {
        let d = Diagnostic { line: 3, location: " at 'foo'".to_owned(), message: "Undefined variable.".to_owned() };
        assert_eq!(d.to_string(), "[line 3] Error at 'foo': Undefined variable.");
    }

    #[test]
    fn runtime_error_format_matches_the_runtime_contract() {
        let e = RuntimeError::new("Division by zero.", 7);
        assert_eq!(e.to_string(), "Division by zero.\n[line 7]\n");
    }
}
