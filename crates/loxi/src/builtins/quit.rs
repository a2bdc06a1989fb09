//! `quit()` — requests that the REPL stop after the current line finishes.
//!
//! The actual exit happens in `repl.rs`, which checks the `quit_requested`
//! flag threaded out of `NativeFn::call` after every line: this keeps the
//! non-local exit confined to the REPL's own loop rather than needing a
//! process-wide `std::process::exit` call from deep inside evaluation.
