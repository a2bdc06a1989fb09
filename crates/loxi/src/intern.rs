//! String interning for identifiers and string literals.
//!
//! Mirrors the shape of the string memory pool described as an external
//! collaborator in the system overview: callers hand the interner raw bytes
//! and get back a small copyable [`StringId`] that can be compared and hashed
//! in O(1) instead of repeatedly allocating and comparing `String`s.

use ahash::AHashMap;

/// Index into the interner's backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns every interned string for a single run of the interpreter.
#[derive(Debug, Default)]
pub struct Interns {
    strings: Vec<Box<str>>,
    lookup: AHashMap<Box<str>, StringId>,
}

impl Interns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning the existing id if it was already seen.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let id = StringId(self.strings.len().try_into().expect("too many interned strings"));
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, id);
        id
    }

    /// Returns the text for a previously interned id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this `Interns` instance.
    #[must_use]
    pub fn get(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_text_returns_the_same_id() {
        let mut interns = Interns::new();
        let a = interns.intern("foo");
        let b = interns.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_gets_distinct_ids() {
        let mut interns = Interns::new();
        let a = interns.intern("foo");
        let b = interns.intern("bar");
        assert_ne!(a, b);
        assert_eq!(interns.get(a), "foo");
        assert_eq!(interns.get(b), "bar");
    }
}
