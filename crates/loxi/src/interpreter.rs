//! The evaluator: a tree-walking visitor over the resolved AST.
//!
//! Consults the resolver's embedded `(depth, slot)` addresses for local
//! lookups and the globals table otherwise, the way §4.5 of the reference
//! design describes; owns the pieces a single run needs end to end (GC,
//! interned strings, the current environment pointer) so a REPL can keep
//! one `Interpreter` alive across many independently-compiled lines.

use std::rc::Rc;
use std::time::Instant;

use ahash::AHashMap;

use crate::ast::{BinaryOp, Expr, FunctionDecl, LogicalOp, Name, Resolution, Stmt, UnaryOp};
use crate::builtins::NativeFn;
use crate::callable::{self, Invocation};
use crate::class::ClassObj;
use crate::config::Config;
use crate::environment::{EnvId, GLOBAL_ENV_ID};
use crate::exception::RuntimeError;
use crate::function::FunctionObj;
use crate::gc::Gc;
use crate::intern::{Interns, StringId};
use crate::io::PrintWriter;
use crate::resource::{DefaultLimits, ResourceTracker};
use crate::token::{Literal, Token, TokenType};
use crate::value::{stringify_number, Value};

/// Outcome of executing a statement: either normal fall-through or an
/// in-flight `return` bubbling toward the nearest function frame. Kept
/// distinct from [`RuntimeError`] per the design notes: `Return` targets the
/// nearest function frame, `Error` targets the outermost entry.
enum Flow {
    Normal,
    Return(Value),
}

/// Execution state for one interpreter session: globals, the GC, interned
/// strings, and the environment currently in scope. Persisting one instance
/// across multiple [`crate::run_source`] calls is what lets a REPL share
/// globals between lines without replaying earlier ones.
pub struct Interpreter<T: ResourceTracker = DefaultLimits> {
    gc: Gc<T>,
    current: EnvId,
    current_line: usize,
    interns: Interns,
    config: Config,
    start: Instant,
    quit_requested: bool,
}

impl Interpreter<DefaultLimits> {
    /// Builds an interpreter with the reference resource caps. `interactive`
    /// controls whether `help()`/`env()`/`quit()` are defined, per §4.6.
    #[must_use]
    pub fn new(interactive: bool) -> Self {
        Self::with_tracker(DefaultLimits::default(), interactive)
    }
}

impl<T: ResourceTracker> Interpreter<T> {
    pub fn with_tracker(tracker: T, interactive: bool) -> Self {
        let mut gc = Gc::with_tracker(tracker);
        let mut interns = Interns::new();
        Self::define_natives(&mut gc, &mut interns, interactive);
        Self {
            gc,
            current: GLOBAL_ENV_ID,
            current_line: 0,
            interns,
            config: Config::default(),
            start: Instant::now(),
            quit_requested: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    fn define_native(gc: &mut Gc<T>, interns: &mut Interns, native: NativeFn) {
        let name: &'static str = native.into();
        let id = interns.intern(name);
        gc.environment_mut(GLOBAL_ENV_ID).define_global(id, Value::Native(native));
    }

    fn define_natives(gc: &mut Gc<T>, interns: &mut Interns, interactive: bool) {
        Self::define_native(gc, interns, NativeFn::Clock);
        if interactive {
            for native in NativeFn::INTERACTIVE_ONLY {
                Self::define_native(gc, interns, native);
            }
        }
    }

    #[must_use]
    pub fn interns(&self) -> &Interns {
        &self.interns
    }

    pub fn interns_mut(&mut self) -> &mut Interns {
        &mut self.interns
    }

    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Runs a collection with no extra roots, per §5's "explicit collection
    /// call made at REPL iteration boundaries".
    pub fn collect_garbage(&mut self) {
        self.gc.collect(&[]);
    }

    // -- Top-level entry ---------------------------------------------------

    /// Executes a whole (already resolved) program. On a runtime-error
    /// unwind, resets the current environment to globals and clears the pin
    /// stack — a safety net, since every statement/expression path already
    /// restores its own environment pointer on every exit.
    pub fn execute_program(&mut self, statements: &[Stmt], print: &mut impl PrintWriter) -> Result<(), RuntimeError> {
        let result = self.execute_statements(statements, print);
        if result.is_err() {
            self.current = GLOBAL_ENV_ID;
            self.gc.clear_pins();
        }
        debug_assert_eq!(self.current, GLOBAL_ENV_ID, "top-level execution must always return to globals");
        result.map(|_| ())
    }

    // -- Line tracking -------------------------------------------------------

    fn expr_line(expr: &Expr) -> usize {
        match expr {
            Expr::Assign { name, .. } => name.token.line,
            Expr::Binary { op_line, .. } | Expr::Unary { op_line, .. } => *op_line,
            Expr::Call { close_paren_line, .. } => *close_paren_line,
            Expr::Get { name, .. } | Expr::Set { name, .. } => name.line,
            Expr::Grouping(inner) => Self::expr_line(inner),
            Expr::Literal(token) => token.line,
            Expr::Logical { left, .. } => Self::expr_line(left),
            Expr::Super { keyword, .. } | Expr::This { keyword, .. } => keyword.line,
            Expr::Variable(name) => name.token.line,
        }
    }

    fn stmt_line(stmt: &Stmt) -> usize {
        match stmt {
            Stmt::Block(inner) => inner.first().map_or(0, Self::stmt_line),
            Stmt::Class { name, .. } => name.line,
            Stmt::Expression(e) | Stmt::Print(e) => Self::expr_line(e),
            Stmt::Function(decl) => decl.name.line,
            Stmt::If { condition, .. } => Self::expr_line(condition),
            Stmt::Return { keyword, .. } => keyword.line,
            Stmt::Var { name, .. } => name.line,
            Stmt::While { condition, .. } => Self::expr_line(condition),
        }
    }

    // -- Statements ----------------------------------------------------------

    fn execute_statements(&mut self, statements: &[Stmt], print: &mut impl PrintWriter) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.execute_statement(statement, print)? {
                Flow::Normal => {}
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_statement(&mut self, stmt: &Stmt, print: &mut impl PrintWriter) -> Result<Flow, RuntimeError> {
        self.current_line = Self::stmt_line(stmt);
        match stmt {
            Stmt::Block(statements) => self.execute_block(statements, print),
            Stmt::Class { name, name_resolution, superclass, methods } => {
                self.execute_class(name, *name_resolution, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr, print)?;
                Ok(Flow::Normal)
            }
            Stmt::Function(decl) => {
                let function = FunctionObj::new(Rc::clone(decl), self.current, false);
                let id = self.gc.allocate_function(function, &[]);
                self.define_variable(&decl.name, Some(Value::Function(id)))?;
                Ok(Flow::Normal)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition, print)?.is_truthy() {
                    self.execute_statement(then_branch, print)
                } else if let Some(else_branch) = else_branch {
                    self.execute_statement(else_branch, print)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, print)?;
                let line = value.stringify(self.gc.heap(), &self.interns);
                print.print_line(&line);
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, print)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => Some(self.evaluate(expr, print)?),
                    None => None,
                };
                self.define_variable(name, value)?;
                Ok(Flow::Normal)
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, print)?.is_truthy() {
                    match self.execute_statement(body, print)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn execute_block(&mut self, statements: &[Stmt], print: &mut impl PrintWriter) -> Result<Flow, RuntimeError> {
        let saved = self.current;
        let line = self.current_line;
        let child = self.gc.new_environment(saved, &[]).map_err(|e| RuntimeError::new(e.to_string(), line))?;
        self.current = child;
        let result = self.execute_statements(statements, print);
        self.gc.deactivate_environment(child);
        self.current = saved;
        result
    }

    /// Declares `token` in the environment currently in scope: appends a
    /// local slot, or defines/redefines a global by name. `value` of `None`
    /// marks the slot unassigned rather than storing an explicit `nil`, so
    /// [`Config::uninitialized_variable_is_error`] has something to key off.
    fn define_variable(&mut self, token: &Token, value: Option<Value>) -> Result<(), RuntimeError> {
        let line = token.line;
        if self.current == GLOBAL_ENV_ID {
            match value {
                Some(v) => {
                    self.gc.environment_mut(GLOBAL_ENV_ID).define_global(token.lexeme, v);
                }
                None => {
                    self.gc.environment_mut(GLOBAL_ENV_ID).define_global_uninitialized(token.lexeme);
                }
            }
        } else {
            let slot_result = match value {
                Some(v) => self.gc.environment_mut(self.current).define(v),
                None => self.gc.environment_mut(self.current).define_uninitialized(),
            };
            slot_result.map_err(|e| RuntimeError::new(e.to_string(), line))?;
        }
        Ok(())
    }

    fn execute_class(
        &mut self,
        name: &Token,
        name_resolution: Option<Resolution>,
        superclass: Option<&Name>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<(), RuntimeError> {
        // Define the name to Nil first so methods can reference their own class.
        self.define_variable(name, Some(Value::Nil))?;

        let superclass_id = match superclass {
            Some(superclass_name) => {
                let value = self.read_name(superclass_name)?;
                let Value::Class(id) = value else {
                    return Err(RuntimeError::new("Superclass must be a class.", superclass_name.token.line));
                };
                Some((id, value))
            }
            None => None,
        };

        let enclosing_env = self.current;
        let super_env = match &superclass_id {
            Some((_, value)) => {
                let env = self
                    .gc
                    .new_environment(enclosing_env, &[value])
                    .map_err(|e| RuntimeError::new(e.to_string(), name.line))?;
                self.gc
                    .environment_mut(env)
                    .define(value.clone())
                    .expect("a fresh environment always has room for its first slot");
                Some(env)
            }
            None => None,
        };
        self.current = super_env.unwrap_or(enclosing_env);

        let mut built_methods = AHashMap::new();
        let mut pinned = 0usize;
        for method in methods {
            let is_initializer = self.interns.get(method.name.lexeme) == "init";
            let function = FunctionObj::new(Rc::clone(method), self.current, is_initializer);
            let id = self.gc.allocate_function(function, &[]);
            self.gc
                .pin(Value::Function(id))
                .map_err(|e| RuntimeError::new(e.to_string(), method.name.line))?;
            pinned += 1;
            built_methods.insert(method.name.lexeme, id);
        }
        let class = ClassObj::new(name.lexeme, superclass_id.map(|(id, _)| id), built_methods);
        let class_id = self.gc.allocate_class(class, &[]);
        for _ in 0..pinned {
            self.gc.unpin();
        }

        if let Some(env) = super_env {
            self.gc.deactivate_environment(env);
        }
        self.current = enclosing_env;

        let class_value = Value::Class(class_id);
        match name_resolution {
            Some(Resolution { depth, slot }) => self.assign_at(depth, slot, class_value),
            None => {
                self.gc.environment_mut(GLOBAL_ENV_ID).define_global(name.lexeme, class_value);
            }
        }
        Ok(())
    }

    // -- Expressions -----------------------------------------------------------

    fn evaluate(&mut self, expr: &Expr, print: &mut impl PrintWriter) -> Result<Value, RuntimeError> {
        self.current_line = Self::expr_line(expr);
        match expr {
            Expr::Assign { name, value } => {
                let v = self.evaluate(value, print)?;
                match name.resolution {
                    Some(Resolution { depth, slot }) => self.assign_at(depth, slot, v.clone()),
                    None => {
                        if !self.gc.environment_mut(GLOBAL_ENV_ID).assign_global(name.token.lexeme, v.clone()) {
                            return Err(self.undefined_variable(name.token.lexeme, name.token.line));
                        }
                    }
                }
                Ok(v)
            }
            Expr::Binary { left, op, op_line, right } => self.evaluate_binary(left, *op, *op_line, right, print),
            Expr::Call { callee, close_paren_line, args } => self.evaluate_call(callee, args, *close_paren_line, print),
            Expr::Get { object, name } => self.evaluate_get(object, name, print),
            Expr::Grouping(inner) => self.evaluate(inner, print),
            Expr::Literal(token) => Ok(self.evaluate_literal(token)),
            Expr::Logical { left, op, right } => {
                let l = self.evaluate(left, print)?;
                match op {
                    LogicalOp::Or if l.is_truthy() => Ok(l),
                    LogicalOp::And if !l.is_truthy() => Ok(l),
                    _ => self.evaluate(right, print),
                }
            }
            Expr::Set { object, name, value } => self.evaluate_set(object, name, value, print),
            Expr::Super { keyword, method, resolution } => self.evaluate_super(keyword.line, method, *resolution),
            Expr::This { resolution, .. } => {
                let res = resolution.expect("resolver always resolves `this` inside a class body");
                Ok(self.get_at(res.depth, res.slot))
            }
            Expr::Unary { op, op_line, right } => {
                let v = self.evaluate(right, print)?;
                match op {
                    UnaryOp::Negate => match v {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(RuntimeError::new(
                            format!("Operand must be a number, found {}.", other.type_name()),
                            *op_line,
                        )),
                    },
                    UnaryOp::Not => Ok(Value::Boolean(!v.is_truthy())),
                }
            }
            Expr::Variable(name) => self.read_name(name),
        }
    }

    fn evaluate_literal(&mut self, token: &Token) -> Value {
        match token.kind {
            TokenType::True => Value::Boolean(true),
            TokenType::False => Value::Boolean(false),
            TokenType::Nil => Value::Nil,
            TokenType::Number => match token.literal {
                Literal::Number(n) => Value::Number(n),
                _ => unreachable!("a Number token always carries a Literal::Number payload"),
            },
            TokenType::String => match token.literal {
                Literal::Str(id) => Value::string(self.interns.get(id).to_owned()),
                _ => unreachable!("a String token always carries a Literal::Str payload"),
            },
            other => unreachable!("{other} cannot appear as a literal token"),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        op_line: usize,
        right: &Expr,
        print: &mut impl PrintWriter,
    ) -> Result<Value, RuntimeError> {
        let l = self.evaluate(left, print)?;
        self.gc.pin(l.clone()).map_err(|e| RuntimeError::new(e.to_string(), op_line))?;
        let r = self.evaluate(right, print)?;
        self.gc.unpin();
        apply_binary(op, l, r, op_line)
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        line: usize,
        print: &mut impl PrintWriter,
    ) -> Result<Value, RuntimeError> {
        let callee_value = self.evaluate(callee, print)?;
        self.gc.pin(callee_value.clone()).map_err(|e| RuntimeError::new(e.to_string(), line))?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            let v = self.evaluate(arg, print)?;
            self.gc.pin(v.clone()).map_err(|e| RuntimeError::new(e.to_string(), line))?;
            arg_values.push(v);
        }
        for _ in 0..=args.len() {
            self.gc.unpin();
        }
        self.invoke(callee_value, arg_values, line, print)
    }

    fn invoke(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        line: usize,
        print: &mut impl PrintWriter,
    ) -> Result<Value, RuntimeError> {
        let invocation = callable::prepare_call(
            &callee,
            args,
            line,
            &mut self.gc,
            &mut self.interns,
            self.start,
            print,
            &mut self.quit_requested,
        )?;
        match invocation {
            Invocation::Immediate(v) => Ok(v),
            Invocation::Enter { closure, function } => self.call_function(closure, &function, print),
        }
    }

    fn call_function(
        &mut self,
        closure: EnvId,
        function: &FunctionObj,
        print: &mut impl PrintWriter,
    ) -> Result<Value, RuntimeError> {
        let saved = self.current;
        self.current = closure;
        let body = Rc::clone(&function.declaration.body);
        let flow = self.execute_statements(&body, print);
        self.gc.deactivate_environment(closure);
        self.current = saved;
        let flow = flow?;
        if function.is_initializer {
            // Per §4.5: an initializer's non-error exit always yields `this`,
            // bound at slot 0 of the function's own closure (not the call
            // frame: bind_method wraps a separate environment for `this`
            // around the one `bind_arguments` allocates for parameters).
            Ok(self.gc.environment(function.closure).get(0).clone())
        } else {
            Ok(match flow {
                Flow::Return(v) => v,
                Flow::Normal => Value::Nil,
            })
        }
    }

    fn evaluate_get(&mut self, object: &Expr, name: &Token, print: &mut impl PrintWriter) -> Result<Value, RuntimeError> {
        let obj = self.evaluate(object, print)?;
        let Value::Instance(instance_id) = obj else {
            return Err(RuntimeError::new(
                format!("Only instances have properties, found {}.", obj.type_name()),
                name.line,
            ));
        };
        if let Some(field) = self.gc.heap().instance(instance_id).get_field(name.lexeme).cloned() {
            return Ok(field);
        }
        self.gc
            .pin(Value::Instance(instance_id))
            .map_err(|e| RuntimeError::new(e.to_string(), name.line))?;
        let class_id = self.gc.heap().instance(instance_id).class;
        let method_id = callable::find_method(&self.gc, class_id, name.lexeme);
        let result = match method_id {
            Some(method_id) => {
                let bound = callable::bind_method(&mut self.gc, method_id, instance_id, &[]);
                let fn_id = self.gc.allocate_function(bound, &[]);
                Ok(Value::Function(fn_id))
            }
            None => Err(self.undefined_property(name.lexeme, name.line)),
        };
        self.gc.unpin();
        result
    }

    fn evaluate_set(
        &mut self,
        object: &Expr,
        name: &Token,
        value: &Expr,
        print: &mut impl PrintWriter,
    ) -> Result<Value, RuntimeError> {
        let obj = self.evaluate(object, print)?;
        let Value::Instance(instance_id) = obj else {
            return Err(RuntimeError::new(
                format!("Only instances have fields, found {}.", obj.type_name()),
                name.line,
            ));
        };
        self.gc
            .pin(Value::Instance(instance_id))
            .map_err(|e| RuntimeError::new(e.to_string(), name.line))?;
        let v = self.evaluate(value, print);
        self.gc.unpin();
        let v = v?;
        self.gc
            .instance_mut(instance_id)
            .set_field(name.lexeme, v.clone())
            .map_err(|()| RuntimeError::new("Too many fields in one instance.", name.line))?;
        Ok(v)
    }

    fn evaluate_super(&mut self, keyword_line: usize, method: &Token, resolution: Option<Resolution>) -> Result<Value, RuntimeError> {
        let res = resolution.expect("resolver rejects `super` outside a subclass before evaluation ever runs");
        let Value::Class(superclass_id) = self.get_at(res.depth, res.slot) else {
            unreachable!("`super`'s resolution always addresses the Class value bound by the class declaration");
        };
        let this_value = self.get_at(res.depth - 1, 0);
        let Value::Instance(instance_id) = this_value else {
            unreachable!("`this` always addresses an Instance value inside a bound method");
        };
        match callable::find_method(&self.gc, superclass_id, method.lexeme) {
            Some(method_id) => {
                let bound = callable::bind_method(&mut self.gc, method_id, instance_id, &[]);
                let fn_id = self.gc.allocate_function(bound, &[]);
                Ok(Value::Function(fn_id))
            }
            None => Err(self.undefined_property(method.lexeme, keyword_line)),
        }
    }

    // -- Variable access -----------------------------------------------------

    fn read_name(&mut self, name: &Name) -> Result<Value, RuntimeError> {
        match name.resolution {
            Some(Resolution { depth, slot }) => {
                if self.config.uninitialized_variable_is_error && self.is_uninitialized_at(depth, slot) {
                    return Err(self.uninitialized_variable(name.token.lexeme, name.token.line));
                }
                Ok(self.get_at(depth, slot))
            }
            None => {
                let global = self.gc.environment(GLOBAL_ENV_ID);
                match global.get_global(name.token.lexeme).cloned() {
                    Some(_) if self.config.uninitialized_variable_is_error && global.is_global_uninitialized(name.token.lexeme) => {
                        Err(self.uninitialized_variable(name.token.lexeme, name.token.line))
                    }
                    Some(value) => Ok(value),
                    None => Err(self.undefined_variable(name.token.lexeme, name.token.line)),
                }
            }
        }
    }

    fn get_at(&self, depth: u32, slot: u32) -> Value {
        let mut env = self.current;
        for _ in 0..depth {
            env = self.gc.environment(env).enclosing().expect("resolver-recorded depth exceeds the live enclosing chain");
        }
        self.gc.environment(env).get(slot as usize).clone()
    }

    fn is_uninitialized_at(&self, depth: u32, slot: u32) -> bool {
        let mut env = self.current;
        for _ in 0..depth {
            env = self.gc.environment(env).enclosing().expect("resolver-recorded depth exceeds the live enclosing chain");
        }
        self.gc.environment(env).is_uninitialized(slot as usize)
    }

    fn assign_at(&mut self, depth: u32, slot: u32, value: Value) {
        let mut env = self.current;
        for _ in 0..depth {
            env = self.gc.environment(env).enclosing().expect("resolver-recorded depth exceeds the live enclosing chain");
        }
        self.gc.environment_mut(env).assign(slot as usize, value);
    }

    fn undefined_variable(&self, name: StringId, line: usize) -> RuntimeError {
        RuntimeError::new(format!("Undefined variable '{}'.", self.interns.get(name)), line)
    }

    fn uninitialized_variable(&self, name: StringId, line: usize) -> RuntimeError {
        RuntimeError::new(format!("Accessing uninitialized variable '{}'.", self.interns.get(name)), line)
    }

    fn undefined_property(&self, name: StringId, line: usize) -> RuntimeError {
        RuntimeError::new(format!("Undefined property '{}'.", self.interns.get(name)), line)
    }
}

fn as_numbers(l: &Value, r: &Value, line: usize) -> Result<(f64, f64), RuntimeError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::new("Operands must be numbers.", line)),
    }
}

fn apply_binary(op: BinaryOp, l: Value, r: Value, line: usize) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
            (Value::String(a), Value::Number(b)) => Ok(Value::string(format!("{a}{}", stringify_number(*b)))),
            (Value::Number(a), Value::String(b)) => Ok(Value::string(format!("{}{b}", stringify_number(*a)))),
            _ => Err(RuntimeError::new("Operands must be two numbers or two strings.", line)),
        },
        BinaryOp::Subtract => as_numbers(&l, &r, line).map(|(a, b)| Value::Number(a - b)),
        BinaryOp::Multiply => as_numbers(&l, &r, line).map(|(a, b)| Value::Number(a * b)),
        BinaryOp::Divide => {
            let (a, b) = as_numbers(&l, &r, line)?;
            if b == 0.0 {
                return Err(RuntimeError::new("Division by zero.", line));
            }
            Ok(Value::Number(a / b))
        }
        BinaryOp::Less => as_numbers(&l, &r, line).map(|(a, b)| Value::Boolean(a < b)),
        BinaryOp::LessEqual => as_numbers(&l, &r, line).map(|(a, b)| Value::Boolean(a <= b)),
        BinaryOp::Greater => as_numbers(&l, &r, line).map(|(a, b)| Value::Boolean(a > b)),
        BinaryOp::GreaterEqual => as_numbers(&l, &r, line).map(|(a, b)| Value::Boolean(a >= b)),
        BinaryOp::Equal => Ok(Value::Boolean(l.equals(&r))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!l.equals(&r))),
    }
}
