//! The call protocol: arity checking and frame setup shared by native
//! functions, Lox functions, and class construction.
//!
//! Kept as its own module the way the reference interpreter separates
//! "what it means to be callable" from the evaluator's tree walk, since
//! three different `Value` variants (`Native`, `Function`, `Class`) all
//! answer to `()`.

use std::time::Instant;

use crate::class::InstanceObj;
use crate::environment::{EnvId, GLOBAL_ENV_ID};
use crate::exception::RuntimeError;
use crate::function::FunctionObj;
use crate::gc::Gc;
use crate::heap::HeapId;
use crate::intern::{Interns, StringId};
use crate::io::PrintWriter;
use crate::resource::ResourceTracker;
use crate::value::Value;

/// What to do after a value is invoked: either the call protocol produced a
/// result outright (native calls, and class construction when there is no
/// `init`), or the caller must push a frame and evaluate a function body.
pub enum Invocation {
    Immediate(Value),
    Enter { closure: EnvId, function: FunctionObj },
}

/// Resolves `callee(args)` down to either an immediate result or a prepared
/// call frame, enforcing arity and the "only functions and classes" rule.
///
/// # Errors
/// - `"Can only call functions and classes."` if `callee` is not callable.
/// - `"Expected N arguments but got M."` on arity mismatch.
#[allow(clippy::too_many_arguments)]
pub fn prepare_call<T: ResourceTracker>(
    callee: &Value,
    args: Vec<Value>,
    line: usize,
    gc: &mut Gc<T>,
    interns: &mut Interns,
    start: Instant,
    print: &mut impl PrintWriter,
    quit_requested: &mut bool,
) -> Result<Invocation, RuntimeError> {
    match callee {
        Value::Native(native) => {
            check_arity(native.arity(), args.len(), line)?;
            let value =
                native.call(args, start, print, quit_requested, gc.environment(GLOBAL_ENV_ID), gc.heap(), interns)?;
            Ok(Invocation::Immediate(value))
        }
        Value::Function(id) => {
            let function = gc.heap().function(*id).clone();
            check_arity(function.arity(), args.len(), line)?;
            let closure = bind_arguments(&function, args, gc)?;
            Ok(Invocation::Enter { closure, function })
        }
        Value::Class(id) => {
            let class_id = *id;
            let instance_id = instantiate(class_id, gc, &[]);
            let instance_value = Value::Instance(instance_id);
            match find_method(gc, class_id, interns.intern("init")) {
                Some(init_id) => {
                    let bound = bind_method(gc, init_id, instance_id, &[&instance_value]);
                    check_arity(bound.arity(), args.len(), line)?;
                    let closure = bind_arguments(&bound, args, gc)?;
                    Ok(Invocation::Enter { closure, function: bound })
                }
                None => {
                    if !args.is_empty() {
                        return Err(RuntimeError::new(
                            format!("Expected 0 arguments but got {}.", args.len()),
                            line,
                        ));
                    }
                    Ok(Invocation::Immediate(instance_value))
                }
            }
        }
        other => Err(RuntimeError::new(
            format!("Can only call functions and classes, found {}.", other.type_name()),
            line,
        )),
    }
}

fn check_arity(expected: usize, got: usize, line: usize) -> Result<(), RuntimeError> {
    if expected != got {
        return Err(RuntimeError::new(format!("Expected {expected} arguments but got {got}."), line));
    }
    Ok(())
}

/// Allocates the call frame environment, binding each argument into its own
/// slot ahead of the function's own locals.
fn bind_arguments<T: ResourceTracker>(function: &FunctionObj, args: Vec<Value>, gc: &mut Gc<T>) -> Result<EnvId, RuntimeError> {
    let roots: Vec<&Value> = args.iter().collect();
    let closure = gc
        .new_environment(function.closure, &roots)
        .map_err(|e| RuntimeError::new(e.to_string(), function.declaration.name.line))?;
    for arg in args {
        gc.environment_mut(closure)
            .define(arg)
            .map_err(|e| RuntimeError::new(e.to_string(), function.declaration.name.line))?;
    }
    Ok(closure)
}

/// Allocates a fresh instance of `class_id`.
pub fn instantiate<T: ResourceTracker>(class_id: HeapId, gc: &mut Gc<T>, roots: &[&Value]) -> HeapId {
    gc.allocate_instance(InstanceObj::new(class_id), roots)
}

/// Walks the inheritance chain for a method, returning the first match.
#[must_use]
pub fn find_method<T: ResourceTracker>(gc: &Gc<T>, class_id: HeapId, name: StringId) -> Option<HeapId> {
    let mut current = Some(class_id);
    while let Some(id) = current {
        let class = gc.heap().class(id);
        if let Some(method) = class.own_method(name) {
            return Some(method);
        }
        current = class.superclass;
    }
    None
}

/// Produces a bound method: a copy of `method_id`'s declaration whose closure
/// is a fresh environment with `this` defined ahead of the method's own
/// closure, per invariant 4 in the data model.
#[must_use]
pub fn bind_method<T: ResourceTracker>(gc: &mut Gc<T>, method_id: HeapId, instance_id: HeapId, roots: &[&Value]) -> FunctionObj {
    let method = gc.heap().function(method_id).clone();
    let instance_value = Value::Instance(instance_id);
    let mut extra_roots = roots.to_vec();
    extra_roots.push(&instance_value);
    let bound_closure = gc
        .new_environment(method.closure, &extra_roots)
        .expect("binding `this` must not exceed the environment cap right after a successful call");
    gc.environment_mut(bound_closure)
        .define(instance_value)
        .expect("a fresh environment always has room for its first slot");
    FunctionObj::new(method.declaration, bound_closure, method.is_initializer)
}
