//! The environment chain: fixed-capacity local frames linked to an
//! enclosing frame, rooted at a single global frame with a name-keyed table.
//!
//! Storage only — lives here as plain arena bookkeeping the way the
//! reference implementation's namespace module separates "where slots live"
//! from "when they may be collected" (that policy belongs to [`crate::gc`]).

use ahash::AHashMap;

use crate::intern::StringId;
use crate::resource::{ResourceError, MAX_LOCAL_SLOTS};
use crate::value::Value;

/// Identifies one environment within an [`Environments`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(u32);

impl EnvId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single lexical frame.
///
/// The root environment (index 0) is [`Kind::Global`]; every other
/// environment is [`Kind::Local`] with a non-null `enclosing` link, per
/// invariant 1 in the data model.
#[derive(Debug)]
pub struct Environment {
    kind: Kind,
    enclosing: Option<EnvId>,
    /// Set false when a block/call frame is exited; the GC does not treat an
    /// inactive environment as a root, though it may still be kept alive by a
    /// closure that captured it.
    pub active: bool,
}

#[derive(Debug)]
enum Kind {
    Local { slots: Vec<Value>, uninitialized: Vec<bool> },
    Global { slots: Vec<Value>, names: AHashMap<StringId, usize>, uninitialized: Vec<bool> },
}

impl Environment {
    fn local(enclosing: EnvId) -> Self {
        Self { kind: Kind::Local { slots: Vec::new(), uninitialized: Vec::new() }, enclosing: Some(enclosing), active: true }
    }

    fn global() -> Self {
        Self {
            kind: Kind::Global { slots: Vec::new(), names: AHashMap::new(), uninitialized: Vec::new() },
            enclosing: None,
            active: true,
        }
    }

    pub fn enclosing(&self) -> Option<EnvId> {
        self.enclosing
    }

    /// Number of slots currently populated (used_slots invariant check in tests).
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.kind {
            Kind::Local { slots, .. } => slots.len(),
            Kind::Global { slots, .. } => slots.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> &[Value] {
        match &self.kind {
            Kind::Local { slots, .. } => slots,
            Kind::Global { slots, .. } => slots,
        }
    }

    fn slots_mut(&mut self) -> &mut Vec<Value> {
        match &mut self.kind {
            Kind::Local { slots, .. } => slots,
            Kind::Global { slots, .. } => slots,
        }
    }

    fn uninitialized_mut(&mut self) -> &mut Vec<bool> {
        match &mut self.kind {
            Kind::Local { uninitialized, .. } => uninitialized,
            Kind::Global { uninitialized, .. } => uninitialized,
        }
    }

    /// Defines a new slot, appending to the next free index. Locals are
    /// capped at [`MAX_LOCAL_SLOTS`]; globals may grow without bound (backed
    /// by a hash table, not a fixed array).
    pub fn define(&mut self, value: Value) -> Result<usize, ResourceError> {
        if matches!(self.kind, Kind::Local { .. }) && self.slots().len() >= MAX_LOCAL_SLOTS {
            return Err(ResourceError::TooManyConstants);
        }
        self.slots_mut().push(value);
        self.uninitialized_mut().push(false);
        Ok(self.slots().len() - 1)
    }

    /// Defines a new local slot whose value has not actually been assigned
    /// yet (`var x;` with no initializer). The slot still holds
    /// [`Value::Nil`] so the environment's shape stays uniform; only
    /// [`Environment::is_uninitialized`] distinguishes it from an explicit
    /// `nil`.
    pub fn define_uninitialized(&mut self) -> Result<usize, ResourceError> {
        let slot = self.define(Value::Nil)?;
        self.uninitialized_mut()[slot] = true;
        Ok(slot)
    }

    pub fn get(&self, slot: usize) -> &Value {
        &self.slots()[slot]
    }

    /// True if the slot was defined via [`Environment::define_uninitialized`]
    /// (or [`Environment::define_global_uninitialized`]) and has not since
    /// been assigned.
    #[must_use]
    pub fn is_uninitialized(&self, slot: usize) -> bool {
        match &self.kind {
            Kind::Local { uninitialized, .. } | Kind::Global { uninitialized, .. } => uninitialized[slot],
        }
    }

    pub fn assign(&mut self, slot: usize, value: Value) {
        self.slots_mut()[slot] = value;
        self.uninitialized_mut()[slot] = false;
    }

    /// Defines or redefines a global by name, returning its slot.
    pub fn define_global(&mut self, name: StringId, value: Value) -> usize {
        let Kind::Global { slots, names, uninitialized } = &mut self.kind else {
            unreachable!("define_global called on a local environment");
        };
        if let Some(&slot) = names.get(&name) {
            slots[slot] = value;
            uninitialized[slot] = false;
            slot
        } else {
            slots.push(value);
            uninitialized.push(false);
            let slot = slots.len() - 1;
            names.insert(name, slot);
            slot
        }
    }

    /// Defines or redefines a global by name, marking it unassigned
    /// (`var x;` with no initializer at global scope).
    pub fn define_global_uninitialized(&mut self, name: StringId) -> usize {
        let slot = self.define_global(name, Value::Nil);
        self.uninitialized_mut()[slot] = true;
        slot
    }

    pub fn get_global(&self, name: StringId) -> Option<&Value> {
        let Kind::Global { slots, names, .. } = &self.kind else {
            unreachable!("get_global called on a local environment");
        };
        names.get(&name).map(|&slot| &slots[slot])
    }

    /// True if `name` is defined and was defined via
    /// [`Environment::define_global_uninitialized`] without a later assignment.
    #[must_use]
    pub fn is_global_uninitialized(&self, name: StringId) -> bool {
        let Kind::Global { names, uninitialized, .. } = &self.kind else {
            unreachable!("is_global_uninitialized called on a local environment");
        };
        names.get(&name).is_some_and(|&slot| uninitialized[slot])
    }

    /// Assigns an existing global, returning false if it was never defined.
    pub fn assign_global(&mut self, name: StringId, value: Value) -> bool {
        let Kind::Global { slots, names, uninitialized } = &mut self.kind else {
            unreachable!("assign_global called on a local environment");
        };
        if let Some(&slot) = names.get(&name) {
            slots[slot] = value;
            uninitialized[slot] = false;
            true
        } else {
            false
        }
    }

    /// Values reachable directly from this environment's slots, for GC marking.
    pub fn slot_values(&self) -> &[Value] {
        self.slots()
    }

    /// Every name currently bound in this global environment, paired with its
    /// value. Used by the `env()` native to report live globals.
    ///
    /// # Panics
    /// Panics if called on a local environment.
    pub fn global_entries(&self) -> impl Iterator<Item = (StringId, &Value)> + '_ {
        let Kind::Global { slots, names, .. } = &self.kind else {
            unreachable!("global_entries called on a local environment");
        };
        names.iter().map(move |(&name, &slot)| (name, &slots[slot]))
    }
}

/// Root index: the global environment is always at slot 0.
pub const GLOBAL_ENV_ID: EnvId = EnvId(0);

/// Owns every environment allocated during a run.
#[derive(Debug)]
pub struct Environments {
    arena: Vec<Option<Environment>>,
    free: Vec<EnvId>,
}

impl Environments {
    pub fn new() -> Self {
        let mut arena = Vec::new();
        arena.push(Some(Environment::global()));
        Self { arena, free: Vec::new() }
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.arena.len()
    }

    pub fn get(&self, id: EnvId) -> &Environment {
        self.arena[id.index()].as_ref().expect("Environments::get: environment already freed")
    }

    pub fn get_mut(&mut self, id: EnvId) -> &mut Environment {
        self.arena[id.index()].as_mut().expect("Environments::get_mut: environment already freed")
    }

    /// Allocates a new local environment enclosed by `enclosing`, reusing a
    /// freed slot when one is available.
    pub fn new_local(&mut self, enclosing: EnvId) -> EnvId {
        if let Some(id) = self.free.pop() {
            self.arena[id.index()] = Some(Environment::local(enclosing));
            id
        } else {
            let id = EnvId(self.arena.len().try_into().expect("environment arena overflow"));
            self.arena.push(Some(Environment::local(enclosing)));
            id
        }
    }

    /// Marks `id` inactive (it stops being a GC root on its own, though a
    /// closure may still keep it reachable).
    pub fn deactivate(&mut self, id: EnvId) {
        if let Some(env) = self.arena[id.index()].as_mut() {
            env.active = false;
        }
    }

    /// Frees `id`'s slot after a sweep has determined it is unreachable.
    pub(crate) fn free(&mut self, id: EnvId) {
        self.arena[id.index()] = None;
        self.free.push(id);
    }

    /// Iterates every currently-live environment id, for the GC's root scan.
    pub(crate) fn live_ids(&self) -> impl Iterator<Item = EnvId> + '_ {
        self.arena.iter().enumerate().filter_map(|(i, slot)| slot.is_some().then(|| EnvId(i as u32)))
    }
}

impl Default for Environments {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_environment_has_no_enclosing_link() {
        let envs = Environments::new();
        assert_eq!(envs.get(GLOBAL_ENV_ID).enclosing(), None);
    }

    #[test]
    fn local_environments_always_have_an_enclosing_link() {
        let mut envs = Environments::new();
        let child = envs.new_local(GLOBAL_ENV_ID);
        assert_eq!(envs.get(child).enclosing(), Some(GLOBAL_ENV_ID));
    }

    #[test]
    fn define_appends_sequential_slots() {
        let mut envs = Environments::new();
        let child = envs.new_local(GLOBAL_ENV_ID);
        let env = envs.get_mut(child);
        assert_eq!(env.define(Value::Nil).unwrap(), 0);
        assert_eq!(env.define(Value::Boolean(true)).unwrap(), 1);
    }

    #[test]
    fn local_slots_are_capped() {
        let mut envs = Environments::new();
        let child = envs.new_local(GLOBAL_ENV_ID);
        let env = envs.get_mut(child);
        for _ in 0..MAX_LOCAL_SLOTS {
            env.define(Value::Nil).unwrap();
        }
        assert_eq!(env.define(Value::Nil), Err(ResourceError::TooManyConstants));
    }

    #[test]
    fn freed_environments_are_reused() {
        let mut envs = Environments::new();
        let a = envs.new_local(GLOBAL_ENV_ID);
        envs.free(a);
        let b = envs.new_local(GLOBAL_ENV_ID);
        assert_eq!(a, b);
    }
}
