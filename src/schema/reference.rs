use indexmap::IndexSet;

use crate::error::ReferenceError;
use crate::ir::TypeRef;

/// The only pointer form blueprints use.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Names of every definition in a document, collected before any body is read.
pub type KnownRefs = IndexSet<TypeRef>;

pub fn resolve(pointer: &str, known: &KnownRefs) -> Result<TypeRef, ReferenceError> {
    let Some(path) = pointer.strip_prefix(DEFINITIONS_POINTER) else {
        return Err(ReferenceError::InvalidReference(pointer.to_string()));
    };
    let name = unescape(path);
    match known.get(name.as_str()) {
        Some(found) => Ok(found.clone()),
        None => Err(ReferenceError::UnknownReference {
            pointer: pointer.to_string(),
            name,
        }),
    }
}

/// `~1` is the sole escape: it stands for `/` inside a definition name.
pub fn unescape(path: &str) -> String {
    path.replace("~1", "/")
}

pub fn escape(name: &str) -> String {
    name.replace('/', "~1")
}

pub fn pointer_to(reference: &TypeRef) -> String {
    format!("{DEFINITIONS_POINTER}{}", escape(reference.as_str()))
}
