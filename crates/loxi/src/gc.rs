//! Mark-and-sweep garbage collector over the environment chain and the
//! value heap, plus the pin stack that roots in-flight temporaries during
//! compound expression evaluation.
//!
//! This is the single composition point the evaluator and resolver-adjacent
//! call sites thread through (`&mut Gc`), the way the reference
//! implementation threads a `Heap<T: ResourceTracker>` through every call
//! that might allocate.

use crate::class::{ClassObj, InstanceObj};
use crate::environment::{EnvId, Environment, Environments, GLOBAL_ENV_ID};
use crate::function::FunctionObj;
use crate::heap::{Heap, HeapId, Payload};
use crate::resource::{DefaultLimits, ResourceError, ResourceTracker};
use crate::value::Value;

/// Runs a mark-and-sweep collection when live counts cross this threshold,
/// matching the pacing rule: re-armed after each collection to
/// `max(2 * live_count, total_pool_count)`.
#[derive(Debug)]
struct Pacer {
    env_threshold: usize,
    value_threshold: usize,
}

impl Default for Pacer {
    fn default() -> Self {
        Self { env_threshold: 64, value_threshold: 64 }
    }
}

pub struct Gc<T: ResourceTracker = DefaultLimits> {
    environments: Environments,
    heap: Heap,
    /// Temporarily-rooted values that must survive the next allocation
    /// (operands of a binary expression while the other side evaluates, a
    /// callee during argument evaluation, etc).
    pin_stack: Vec<Value>,
    env_marks: Vec<u32>,
    value_marks: Vec<u32>,
    current_mark: u32,
    pacer: Pacer,
    tracker: T,
}

impl Gc<DefaultLimits> {
    pub fn new() -> Self {
        Self::with_tracker(DefaultLimits::default())
    }
}

impl Default for Gc<DefaultLimits> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceTracker> Gc<T> {
    pub fn with_tracker(tracker: T) -> Self {
        Self {
            environments: Environments::new(),
            heap: Heap::new(),
            pin_stack: Vec::new(),
            env_marks: vec![0],
            value_marks: Vec::new(),
            current_mark: 1,
            pacer: Pacer::default(),
            tracker,
        }
    }

    // -- Environment chain -------------------------------------------------

    pub fn environments(&self) -> &Environments {
        &self.environments
    }

    pub fn environment(&self, id: EnvId) -> &Environment {
        self.environments.get(id)
    }

    pub fn environment_mut(&mut self, id: EnvId) -> &mut Environment {
        self.environments.get_mut(id)
    }

    pub fn deactivate_environment(&mut self, id: EnvId) {
        self.environments.deactivate(id);
    }

    /// Allocates a new local environment enclosed by `enclosing`, running a
    /// collection first if the live-environment threshold has been reached.
    ///
    /// # Errors
    /// Returns [`ResourceError::StackOverflow`] if the environment cap would
    /// still be exceeded after collecting.
    pub fn new_environment(&mut self, enclosing: EnvId, roots: &[&Value]) -> Result<EnvId, ResourceError> {
        if self.environments.live_count() >= self.pacer.env_threshold {
            self.collect(roots);
        }
        self.tracker.check_environment_cap(self.environments.live_count())?;
        let id = self.environments.new_local(enclosing);
        if self.env_marks.len() <= id.index() {
            self.env_marks.resize(id.index() + 1, 0);
        }
        Ok(id)
    }

    // -- Pin stack -----------------------------------------------------------

    /// Pins `value` so it survives the next allocation. Every push must be
    /// matched by a pop along every control-flow path, including error
    /// unwind (see [`Gc::clear_pins`]).
    pub fn pin(&mut self, value: Value) -> Result<(), ResourceError> {
        self.tracker.check_pin_stack_depth(self.pin_stack.len())?;
        self.pin_stack.push(value);
        Ok(())
    }

    pub fn unpin(&mut self) -> Value {
        self.pin_stack.pop().expect("unpin called with an empty pin stack")
    }

    #[must_use]
    pub fn pin_depth(&self) -> usize {
        self.pin_stack.len()
    }

    /// Clears every pinned temporary. Called on runtime-error unwind.
    pub fn clear_pins(&mut self) {
        self.pin_stack.clear();
    }

    // -- Value heap ------------------------------------------------------

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    fn allocate_payload(&mut self, payload: Payload, roots: &[&Value]) -> HeapId {
        if self.heap.live_count() >= self.pacer.value_threshold {
            self.collect(roots);
        }
        let id = self.heap.allocate(payload);
        if self.value_marks.len() <= id.index() {
            self.value_marks.resize(id.index() + 1, 0);
        }
        id
    }

    pub fn allocate_function(&mut self, function: FunctionObj, roots: &[&Value]) -> HeapId {
        self.allocate_payload(Payload::Function(function), roots)
    }

    pub fn allocate_class(&mut self, class: ClassObj, roots: &[&Value]) -> HeapId {
        self.allocate_payload(Payload::Class(class), roots)
    }

    pub fn allocate_instance(&mut self, instance: InstanceObj, roots: &[&Value]) -> HeapId {
        self.allocate_payload(Payload::Instance(instance), roots)
    }

    pub fn instance_mut(&mut self, id: HeapId) -> &mut InstanceObj {
        self.heap.instance_mut(id)
    }

    // -- Collection --------------------------------------------------------

    /// Runs a full mark-and-sweep collection.
    ///
    /// Roots: every pinned value, every environment flagged `active` (and
    /// transitively every value reachable through its slots and its
    /// enclosing chain), and every payload reachable from those values
    /// (`Function` closures, `Class` methods/superclasses, `Instance`
    /// fields/class).
    pub fn collect(&mut self, extra_roots: &[&Value]) {
        for value in extra_roots.iter().copied().chain(self.pin_stack.iter()).cloned().collect::<Vec<_>>() {
            self.mark_value(&value);
        }
        for id in self.environments.live_ids().collect::<Vec<_>>() {
            if self.environments.get(id).active {
                self.mark_environment(id);
            }
        }
        self.sweep();
        self.current_mark += 1;
        self.pacer.env_threshold = (2 * self.environments.live_count()).max(self.environments.total_capacity());
        self.pacer.value_threshold = (2 * self.heap.live_count()).max(self.heap.total_capacity());
    }

    fn mark_environment(&mut self, id: EnvId) {
        if self.env_marks[id.index()] == self.current_mark {
            return;
        }
        self.env_marks[id.index()] = self.current_mark;
        let values: Vec<Value> = self.environments.get(id).slot_values().to_vec();
        for value in &values {
            self.mark_value(value);
        }
        if let Some(enclosing) = self.environments.get(id).enclosing() {
            self.mark_environment(enclosing);
        }
    }

    fn mark_value(&mut self, value: &Value) {
        match value {
            Value::Function(id) => self.mark_function(*id),
            Value::Class(id) => self.mark_class(*id),
            Value::Instance(id) => self.mark_instance(*id),
            Value::Nil | Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Native(_) => {}
        }
    }

    fn mark_function(&mut self, id: HeapId) {
        if self.value_marks[id.index()] == self.current_mark {
            return;
        }
        self.value_marks[id.index()] = self.current_mark;
        let closure = self.heap.function(id).closure;
        self.mark_environment(closure);
    }

    fn mark_class(&mut self, id: HeapId) {
        if self.value_marks[id.index()] == self.current_mark {
            return;
        }
        self.value_marks[id.index()] = self.current_mark;
        let class = self.heap.class(id).clone();
        if let Some(superclass) = class.superclass {
            self.mark_class(superclass);
        }
        for method in class.methods.values() {
            self.mark_function(*method);
        }
    }

    fn mark_instance(&mut self, id: HeapId) {
        if self.value_marks[id.index()] == self.current_mark {
            return;
        }
        self.value_marks[id.index()] = self.current_mark;
        let instance = self.heap.instance(id).clone();
        self.mark_class(instance.class);
        for value in instance.fields.values() {
            self.mark_value(value);
        }
    }

    fn sweep(&mut self) {
        for id in self.environments.live_ids().collect::<Vec<_>>() {
            if self.env_marks[id.index()] != self.current_mark {
                self.environments.free(id);
            }
        }
        for id in self.heap.live_ids().collect::<Vec<_>>() {
            if self.value_marks[id.index()] != self.current_mark {
                self.heap.free(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interns;

    #[test]
    fn unreachable_environment_is_collected() {
        let mut gc: Gc = Gc::new();
        let child = gc.new_environment(GLOBAL_ENV_ID, &[]).unwrap();
        gc.deactivate_environment(child);
        let before = gc.environments.live_count();
        gc.collect(&[]);
        assert!(gc.environments.live_count() < before);
    }

    #[test]
    fn environment_kept_alive_by_a_closure_survives_collection() {
        let mut interns = Interns::new();
        let mut gc: Gc = Gc::new();
        let child = gc.new_environment(GLOBAL_ENV_ID, &[]).unwrap();
        gc.environment_mut(child).define(Value::Nil).unwrap();
        gc.deactivate_environment(child);

        let decl = std::rc::Rc::new(crate::ast::FunctionDecl {
            name: crate::token::Token::new(
                crate::token::TokenType::Identifier,
                interns.intern("f"),
                crate::token::Literal::None,
                1,
                crate::token::Span { start: 0, end: 0 },
            ),
            params: vec![],
            body: std::rc::Rc::new(vec![]),
        });
        let function = FunctionObj::new(decl, child, false);
        let fn_id = gc.allocate_function(function, &[]);
        let root = Value::Function(fn_id);

        gc.collect(&[&root]);
        assert_eq!(gc.environments.get(child).len(), 1);
        // The environment backing the closure must still be reachable.
        assert!(gc.heap.live_ids().any(|id| id == fn_id));
    }

    #[test]
    fn pin_stack_is_cleared_on_unwind() {
        let mut gc: Gc = Gc::new();
        gc.pin(Value::Number(1.0)).unwrap();
        gc.pin(Value::Number(2.0)).unwrap();
        gc.clear_pins();
        assert_eq!(gc.pin_depth(), 0);
    }

    #[test]
    fn pin_stack_overflow_is_reported() {
        let tracker = DefaultLimits { environment_cap: 1000, pin_stack_cap: 2 };
        let mut gc = Gc::with_tracker(tracker);
        gc.pin(Value::Nil).unwrap();
        gc.pin(Value::Nil).unwrap();
        assert_eq!(gc.pin(Value::Nil), Err(ResourceError::StackOverflow));
    }
}
