//! Typed argument construction for compiled smart-contract blueprints.
//!
//! raw blueprint JSON → [`schema`] (references + type model) → [`blueprint::Blueprint`]
//! → per call: [`value::HostValue`] → [`term::Term`] → [`wire::WireTerm`] (via [`lower`]).
pub mod blueprint;
pub mod error;
pub mod ir;
pub mod lower;
pub mod namespace;
pub mod path_de;
pub mod schema;
pub mod term;
pub mod value;
pub mod wire;

pub use blueprint::{Blueprint, Parameter};
pub use error::{DefinitionError, HostValueError, ReferenceError, SchemaError, TermError};
pub use ir::{Constructor, EnumTy, Field, Primitive, Ty, TypeRef};
pub use namespace::{ConstructorHandle, Namespace};
pub use schema::Definitions;
pub use term::{build_term, Term, TermValue, ValuePath};
pub use value::HostValue;
pub use wire::WireTerm;
