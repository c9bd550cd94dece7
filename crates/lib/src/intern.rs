//! Interned field names.
//!
//! Every field keyword is stored once per graph and referred to by a compact
//! [`FieldName`], so field lookups compare integers instead of strings.

use std::collections::HashMap;

/// Interned field keyword (4 bytes instead of a heap string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FieldName(u32);

impl FieldName {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Dictionary mapping field keywords to [`FieldName`]s and back.
#[derive(Debug, Default, Clone)]
pub struct FieldNames {
    by_name: HashMap<String, FieldName>,
    names: Vec<String>,
}

impl FieldNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing id if it is already known.
    pub fn intern(&mut self, name: &str) -> FieldName {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = FieldName(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a name without interning it.
    pub fn get(&self, name: &str) -> Option<FieldName> {
        self.by_name.get(name).copied()
    }

    /// The keyword behind an interned id.
    pub fn name(&self, id: FieldName) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
