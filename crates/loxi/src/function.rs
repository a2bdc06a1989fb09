//! The `Function` payload: a closure over a declaration and a captured
//! environment, plus the `isInitializer` flag the call protocol consults to
//! special-case `init` returns.

use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::EnvId;

#[derive(Debug, Clone)]
pub struct FunctionObj {
    pub declaration: Rc<FunctionDecl>,
    /// The environment that was current when this function's declaring
    /// statement executed (possibly extended with `this`/`super` for bound
    /// methods — see invariant 4 in the data model).
    pub closure: EnvId,
    pub is_initializer: bool,
}

impl FunctionObj {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvId, is_initializer: bool) -> Self {
        Self { declaration, closure, is_initializer }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}
