// Closed type algebra for resolved blueprint definitions. Children are stored as
// `TypeRef` keys into the owning `Definitions` map, never as nested `Ty` nodes.
use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic name of one entry in a definitions map (e.g. `cheque/Cheque`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    ByteArray,
    Data,        // opaque, already-lowered wire term
    Integer,
    String,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "Bool",
            Primitive::ByteArray => "ByteArray",
            Primitive::Data => "Data",
            Primitive::Integer => "Integer",
            Primitive::String => "String",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Primitive(Primitive),
    List(TypeRef),                 // homogeneous, unbounded
    Tuple(Vec<TypeRef>),           // exact arity >= 2
    Pair(TypeRef, TypeRef),
    Enum(EnumTy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTy {
    pub name: String,
    pub constructors: Vec<Constructor>, // index == position
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub index: usize,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl Ty {
    pub const BOOL: Ty = Ty::Primitive(Primitive::Bool);
    pub const BYTE_ARRAY: Ty = Ty::Primitive(Primitive::ByteArray);
    pub const DATA: Ty = Ty::Primitive(Primitive::Data);
    pub const INTEGER: Ty = Ty::Primitive(Primitive::Integer);
    pub const STRING: Ty = Ty::Primitive(Primitive::String);

    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Ty::Primitive(p) => p.name(),
            Ty::List(_) => "List",
            Ty::Tuple(_) => "Tuple",
            Ty::Pair(..) => "Pair",
            Ty::Enum(_) => "Enum",
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Primitive(p) => f.write_str(p.name()),
            Ty::List(item) => write!(f, "List<{item}>"),
            Ty::Tuple(fields) => {
                let names = fields.iter().map(TypeRef::as_str).collect::<Vec<_>>();
                write!(f, "Tuple<{}>", names.join(", "))
            }
            Ty::Pair(fst, snd) => write!(f, "Pair<{fst}, {snd}>"),
            Ty::Enum(e) => f.write_str(&e.name),
        }
    }
}

impl EnumTy {
    pub fn constructor(&self, index: usize) -> Option<&Constructor> {
        self.constructors.get(index)
    }
    pub fn constructor_by_name(&self, name: &str) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.name == name)
    }
}

impl Constructor {
    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}
