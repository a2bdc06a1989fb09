//! Static resolution: binds every variable reference to a `(depth, slot)`
//! lexical address, rejects invalid `this`/`super`/`return`, and desugars the
//! scopes a class body introduces for them.
//!
//! Mirrors the reference resolver's single-pass, stack-of-scopes design: no
//! separate declare/define AST rewrite, just two mutations per local
//! (declared, then defined) recorded directly on the binding's scope entry.

use ahash::AHashMap;

use crate::ast::{Expr, FunctionDecl, Name, Resolution, Stmt};
use crate::exception::{Diagnostic, Report};
use crate::intern::{Interns, StringId};
use crate::token::Token;

const MAX_LOCALS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

struct ScopeEntry {
    slot: u32,
    defined: bool,
}

/// One lexical scope: name to slot, in declaration order. The global scope
/// is never pushed here — an unresolved name simply falls through to it.
type Scope = AHashMap<StringId, ScopeEntry>;

pub struct Resolver<'a> {
    interns: &'a mut Interns,
    scopes: Vec<Scope>,
    current_function: FunctionKind,
    current_class: ClassKind,
    report: Report,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(interns: &'a mut Interns) -> Self {
        Self { interns, scopes: Vec::new(), current_function: FunctionKind::None, current_class: ClassKind::None, report: Report::new() }
    }

    /// Resolves a whole program (top-level statement list), mutating each
    /// node's embedded `resolution` field in place.
    #[must_use]
    pub fn resolve(mut self, statements: &mut [Stmt]) -> Report {
        self.resolve_statements(statements);
        self.report
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        let location = if token.kind == crate::token::TokenType::Eof {
            " at end".to_owned()
        } else {
            format!(" at '{}'", self.interns.get(token.lexeme))
        };
        self.report.push(Diagnostic { line: token.line, location, message: message.into() });
    }

    // -- Scopes --------------------------------------------------------

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declares `name` in the innermost scope: not yet readable. A duplicate
    /// declaration in the same scope is an error.
    fn declare(&mut self, token: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        let slot = scope.len() as u32;
        if scope.contains_key(&token.lexeme) {
            self.error(token, "Variable with this name already declared in this scope.");
            return;
        }
        if slot as usize >= MAX_LOCALS {
            self.error(token, "Too many local variables in function.");
        }
        self.scopes.last_mut().unwrap().insert(token.lexeme, ScopeEntry { slot, defined: false });
    }

    fn define(&mut self, token: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if let Some(entry) = scope.get_mut(&token.lexeme) {
            entry.defined = true;
        }
    }

    /// Declares and immediately defines a synthetic binding (`this`, `super`)
    /// that always occupies slot 0 of a freshly pushed scope.
    fn declare_synthetic(&mut self, name: StringId) {
        let scope = self.scopes.last_mut().expect("declare_synthetic requires an active scope");
        scope.insert(name, ScopeEntry { slot: 0, defined: true });
    }

    /// Walks the scope stack innermost-out, returning `(depth, slot)` on the
    /// first match. `None` means the name resolves through the globals table.
    fn resolve_local(&self, name: StringId) -> Option<Resolution> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(entry) = scope.get(&name) {
                return Some(Resolution { depth: depth as u32, slot: entry.slot });
            }
        }
        None
    }

    fn resolve_name(&mut self, name: &mut Name) {
        if let Some(scope) = self.scopes.last() {
            if let Some(entry) = scope.get(&name.token.lexeme) {
                if !entry.defined {
                    self.error(&name.token, "Cannot read local variable in its own initializer.");
                }
            }
        }
        name.resolution = self.resolve_local(name.token.lexeme);
    }

    // -- Statements ------------------------------------------------------

    fn resolve_statements(&mut self, statements: &mut [Stmt]) {
        for statement in statements {
            self.resolve_statement(statement);
        }
    }

    fn resolve_statement(&mut self, statement: &mut Stmt) {
        match statement {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::Class { name, name_resolution, superclass, methods } => {
                self.resolve_class(name, name_resolution, superclass, methods);
            }
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.error(keyword, "Cannot return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.error(keyword, "Cannot return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_statement(body);
            }
        }
    }

    fn resolve_function(&mut self, decl: &mut FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        self.current_function = kind;
        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        let body = std::rc::Rc::get_mut(&mut decl.body)
            .expect("function body is resolved before any closure clones the Rc");
        self.resolve_statements(body);
        self.end_scope();
        self.current_function = enclosing_function;
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        name_resolution: &mut Option<Resolution>,
        superclass: &mut Option<Name>,
        methods: &mut [std::rc::Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(name);
        self.define(name);
        *name_resolution = self.resolve_local(name.lexeme);

        if let Some(superclass_name) = superclass.as_mut() {
            if superclass_name.token.lexeme == name.lexeme {
                self.error(&superclass_name.token, "A class cannot inherit from itself.");
            }
            self.current_class = ClassKind::Subclass;
            superclass_name.resolution = self.resolve_local(superclass_name.token.lexeme);
            self.begin_scope();
            let super_id = self.interns.intern("super");
            self.declare_synthetic(super_id);
        }

        self.begin_scope();
        let this_id = self.interns.intern("this");
        self.declare_synthetic(this_id);

        for method in methods {
            let kind =
                if self.interns.get(method.name.lexeme) == "init" { FunctionKind::Initializer } else { FunctionKind::Method };
            let method = std::rc::Rc::get_mut(method).expect("method declarations are resolved once, before evaluation");
            self.resolve_function(method, kind);
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }
        self.current_class = enclosing_class;
    }

    // -- Expressions -----------------------------------------------------

    fn resolve_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Assign { name, value } => {
                self.resolve_expr(value);
                name.resolution = self.resolve_local(name.token.lexeme);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Literal(_) => {}
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            Expr::Super { keyword, resolution, .. } => {
                match self.current_class {
                    ClassKind::None => self.error(keyword, "Cannot use 'super' outside of a class."),
                    ClassKind::Class => self.error(keyword, "Cannot use 'super' in a class with no superclass."),
                    ClassKind::Subclass => {}
                }
                let super_id = self.interns.intern("super");
                *resolution = self.resolve_local(super_id);
            }
            Expr::This { keyword, resolution } => {
                if self.current_class == ClassKind::None {
                    self.error(keyword, "Cannot use 'this' outside of a class.");
                }
                let this_id = self.interns.intern("this");
                *resolution = self.resolve_local(this_id);
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Variable(name) => self.resolve_name(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interns;
    use crate::parser::Parser;
    use crate::scanner;

    fn resolve_source(source: &str) -> (Vec<Stmt>, Report, Interns) {
        let mut interns = Interns::new();
        let (tokens, scan_errors) = scanner::scan(source, &mut interns);
        assert!(scan_errors.is_empty(), "unexpected scan errors: {scan_errors:?}");
        let (mut statements, parse_report) = Parser::new(tokens, &interns).parse();
        assert!(!parse_report.had_error(), "unexpected parse errors");
        let resolve_report = Resolver::new(&mut interns).resolve(&mut statements);
        (statements, resolve_report, interns)
    }

    #[test]
    fn top_level_return_is_rejected() {
        let (_, report, _) = resolve_source("return 1;");
        assert!(report.had_error());
        assert_eq!(report.diagnostics()[0].message, "Cannot return from top-level code.");
    }

    #[test]
    fn this_outside_a_class_is_rejected() {
        let (_, report, _) = resolve_source("print this;");
        assert_eq!(report.diagnostics()[0].message, "Cannot use 'this' outside of a class.");
    }

    #[test]
    fn super_with_no_superclass_is_rejected() {
        let (_, report, _) = resolve_source("class A { m() { super.m(); } }");
        assert_eq!(report.diagnostics()[0].message, "Cannot use 'super' in a class with no superclass.");
    }

    #[test]
    fn self_referential_initializer_is_rejected() {
        let (_, report, _) = resolve_source("{ var a = a; }");
        assert_eq!(report.diagnostics()[0].message, "Cannot read local variable in its own initializer.");
    }

    #[test]
    fn duplicate_local_is_rejected() {
        let (_, report, _) = resolve_source("{ var a = 1; var a = 2; }");
        assert_eq!(report.diagnostics()[0].message, "Variable with this name already declared in this scope.");
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        let (_, report, _) = resolve_source("var a = 1; var a = 2;");
        assert!(!report.had_error());
    }

    #[test]
    fn a_local_variable_resolves_to_depth_zero() {
        let (statements, report, _) = resolve_source("{ var a = 1; print a; }");
        assert!(!report.had_error());
        let Stmt::Block(block) = &statements[0] else { panic!("expected a block") };
        let Stmt::Print(Expr::Variable(name)) = &block[1] else { panic!("expected print a;") };
        assert_eq!(name.resolution, Some(Resolution { depth: 0, slot: 0 }));
    }
}
