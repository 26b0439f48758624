//! Schema resolution: raw `definitions` map → closed `Definitions` map.
//!
//! Two phases. Every key is collected as a known reference first, then each
//! body is interpreted against that set, so forward references between
//! sibling definitions always resolve and the result is all-or-nothing.
pub mod definition;
pub mod reference;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaError;
use crate::ir::{Ty, TypeRef};

pub use reference::{resolve, KnownRefs, DEFINITIONS_POINTER};

/// Resolved type definitions of one blueprint. Read-only once built; terms
/// borrow it rather than copy it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    types: IndexMap<TypeRef, Ty>,
}

pub fn known_refs(raw: &IndexMap<String, Value>) -> KnownRefs {
    raw.keys().map(|k| TypeRef::new(k.as_str())).collect()
}

impl Definitions {
    pub fn from_raw(raw: &IndexMap<String, Value>) -> Result<Self, SchemaError> {
        Self::build(raw, &known_refs(raw))
    }

    pub(crate) fn build(raw: &IndexMap<String, Value>, known: &KnownRefs) -> Result<Self, SchemaError> {
        let mut types = IndexMap::with_capacity(raw.len());
        for (name, fragment) in raw {
            let reference = TypeRef::new(name.as_str());
            let ty = definition::build(&reference, fragment, known).map_err(|source| {
                SchemaError::Definition { reference: reference.clone(), source }
            })?;
            debug!(%reference, %ty, "resolved definition");
            types.insert(reference, ty);
        }
        Ok(Self { types })
    }

    pub fn get(&self, reference: &TypeRef) -> Option<&Ty> {
        self.types.get(reference)
    }

    /// Lookup by plain name, returning the canonical key alongside the type.
    pub fn get_by_name(&self, name: &str) -> Option<(&TypeRef, &Ty)> {
        self.types.get_key_value(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeRef, &Ty)> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
