//! The value heap: an arena of `Function`/`Class`/`Instance` payloads.
//!
//! Storage only, mirroring `environment.rs`: allocation policy and
//! reachability live in [`crate::gc`]. `Number`/`Boolean`/`Nil`/`String`/
//! `Native` values never occupy a slot here — only the three reference-kind
//! payloads do, which is also what the mark-sweep GC walks.

use crate::class::{ClassObj, InstanceObj};
use crate::function::FunctionObj;

/// Identifies a payload within the heap arena. Equality of `HeapId` *is*
/// reference identity for `Function`/`Class`/`Instance` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(u32);

impl HeapId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index.try_into().expect("heap arena overflow"))
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Function(FunctionObj),
    Class(ClassObj),
    Instance(InstanceObj),
}

/// Owns every `Function`/`Class`/`Instance` payload allocated during a run.
#[derive(Debug, Default)]
pub struct Heap {
    arena: Vec<Option<Payload>>,
    free: Vec<HeapId>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.arena.len()
    }

    pub fn allocate(&mut self, payload: Payload) -> HeapId {
        if let Some(id) = self.free.pop() {
            self.arena[id.index()] = Some(payload);
            id
        } else {
            let id = HeapId::from_index(self.arena.len());
            self.arena.push(Some(payload));
            id
        }
    }

    pub(crate) fn free(&mut self, id: HeapId) {
        self.arena[id.index()] = None;
        self.free.push(id);
    }

    pub(crate) fn live_ids(&self) -> impl Iterator<Item = HeapId> + '_ {
        self.arena.iter().enumerate().filter_map(|(i, slot)| slot.is_some().then(|| HeapId::from_index(i)))
    }

    fn get(&self, id: HeapId) -> &Payload {
        self.arena[id.index()].as_ref().expect("Heap::get: payload already freed")
    }

    pub fn function(&self, id: HeapId) -> &FunctionObj {
        match self.get(id) {
            Payload::Function(f) => f,
            other => panic!("HeapId {id:?} is not a Function, found {other:?}"),
        }
    }

    pub fn class(&self, id: HeapId) -> &ClassObj {
        match self.get(id) {
            Payload::Class(c) => c,
            other => panic!("HeapId {id:?} is not a Class, found {other:?}"),
        }
    }

    pub fn instance(&self, id: HeapId) -> &InstanceObj {
        match self.get(id) {
            Payload::Instance(i) => i,
            other => panic!("HeapId {id:?} is not an Instance, found {other:?}"),
        }
    }

    pub fn instance_mut(&mut self, id: HeapId) -> &mut InstanceObj {
        match self.arena[id.index()].as_mut().expect("Heap::instance_mut: payload already freed") {
            Payload::Instance(i) => i,
            other => panic!("HeapId {id:?} is not an Instance, found {other:?}"),
        }
    }
}
