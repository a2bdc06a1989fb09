//! Output sinks for the `print` statement.
//!
//! Generic over a [`PrintWriter`] so tests can capture output into a string
//! instead of going through stdout, the same split the reference
//! interpreter's host embedding uses.

/// Receives the text produced by Lox's `print` statement, one line at a time.
pub trait PrintWriter {
    fn print_line(&mut self, line: &str);
}

/// Writes to the process's standard output.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn print_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Discards everything written to it.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn print_line(&mut self, _line: &str) {}
}

/// Collects every line into an in-memory buffer, newline-joined. Used by
/// tests that assert on exact program output.
#[derive(Debug, Default)]
pub struct CollectStringPrint {
    buffer: String,
}

impl CollectStringPrint {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl PrintWriter for CollectStringPrint {
    fn print_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}
