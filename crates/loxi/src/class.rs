//! The `Class` and `Instance` payloads.

use ahash::AHashMap;

use crate::heap::HeapId;
use crate::intern::StringId;
use crate::resource::DEFAULT_MAX_FIELDS;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ClassObj {
    pub name: StringId,
    pub superclass: Option<HeapId>,
    /// Method name to `Function` heap id.
    pub methods: AHashMap<StringId, HeapId>,
}

impl ClassObj {
    pub fn new(name: StringId, superclass: Option<HeapId>, methods: AHashMap<StringId, HeapId>) -> Self {
        Self { name, superclass, methods }
    }

    /// Own method, ignoring superclasses.
    #[must_use]
    pub fn own_method(&self, name: StringId) -> Option<HeapId> {
        self.methods.get(&name).copied()
    }
}

#[derive(Debug, Clone)]
pub struct InstanceObj {
    pub class: HeapId,
    pub fields: AHashMap<StringId, Value>,
}

impl InstanceObj {
    pub fn new(class: HeapId) -> Self {
        Self { class, fields: AHashMap::new() }
    }

    pub fn get_field(&self, name: StringId) -> Option<&Value> {
        self.fields.get(&name)
    }

    /// Sets a field, enforcing the static per-instance field cap.
    ///
    /// # Errors
    /// Returns `Err(())` if this would exceed [`DEFAULT_MAX_FIELDS`] and
    /// `name` is not already present (updating an existing field never
    /// grows the table).
    pub fn set_field(&mut self, name: StringId, value: Value) -> Result<(), ()> {
        if !self.fields.contains_key(&name) && self.fields.len() >= DEFAULT_MAX_FIELDS {
            return Err(());
        }
        self.fields.insert(name, value);
        Ok(())
    }
}
