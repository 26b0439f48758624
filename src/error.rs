//! Error taxonomy for schema loading and term construction.
//!
//! Schema-side errors (`ReferenceError`, `DefinitionError`, `SchemaError`) are
//! load-time and permanent for a given document. `TermError` is per-call and
//! always carries the structural position of the offending host value.
use serde_json::Value;
use thiserror::Error;

use crate::ir::TypeRef;
use crate::term::ValuePath;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("invalid reference `{0}`: only `#/definitions/<name>` pointers are supported")]
    InvalidReference(String),
    #[error("unknown reference `{pointer}`: no definition named `{name}`")]
    UnknownReference { pointer: String, name: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("unsupported definition: {content}")]
    UnsupportedDefinition { content: Value },
    #[error("constructor `{constructor}` declares index {declared} but is alternative #{position}")]
    ConstructorIndexMismatch {
        constructor: String,
        declared: u64,
        position: usize,
    },
}

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document itself does not have the blueprint shape.
    #[error("malformed blueprint document: {0}")]
    Document(String),
    #[error("parameter `{title}`: {source}")]
    Parameter {
        title: String,
        #[source]
        source: ReferenceError,
    },
    #[error("definition `{reference}`: {source}")]
    Definition {
        reference: TypeRef,
        #[source]
        source: DefinitionError,
    },
    #[error("no validator titled `{0}` in blueprint")]
    ValidatorNotFound(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TermError {
    #[error("at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: ValuePath,
        expected: String,
        found: String,
    },
    #[error("at {path}: expected {expected} element(s) for {shape}, found {found}")]
    ArityMismatch {
        path: ValuePath,
        shape: String,
        expected: usize,
        found: usize,
    },
    #[error("at {path}: constructor index {index} out of range for `{enum_name}` ({count} constructor(s))")]
    ConstructorIndexOutOfRange {
        path: ValuePath,
        enum_name: String,
        index: usize,
        count: usize,
    },
    #[error("at {path}: type `{reference}` is not in the definitions map")]
    UnresolvedReference { path: ValuePath, reference: TypeRef },
    #[error("no constructor `{constructor}` on type `{reference}`")]
    UnknownConstructor { reference: String, constructor: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostValueError {
    #[error("at {path}: {reason}")]
    Invalid { path: ValuePath, reason: String },
}
