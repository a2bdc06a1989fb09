//! Interpreter-wide configuration surface.
//!
//! Most of the resolver/evaluator's behavior is fixed by the language
//! semantics, but a couple of knobs are genuinely configurable per the
//! reference implementation's open questions, and are collected here rather
//! than threaded through call sites as ad-hoc booleans.

/// Cap on parameters in a function declaration and arguments at a call site.
pub const MAX_PARAMETERS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// When `true`, reading a `var` that was declared but never assigned
    /// raises `"Accessing uninitialized variable 'X'."` instead of yielding
    /// `Nil`. Off by default, matching the reference configuration.
    pub uninitialized_variable_is_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { uninitialized_variable_is_error: false }
    }
}
