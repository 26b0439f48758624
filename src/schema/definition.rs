//! Interpret one raw definition fragment as a node of the type algebra.
//!
//! Dispatch is structural, in this order:
//! 1. `dataType` primitive tags (`integer`, `bytes`, `#string`, ...)
//! 2. `dataType` list tags: one `items` ref → List, two or more → Tuple
//! 3. `dataType: "#pair"` with `left`/`right`
//! 4. `anyOf`: the False/True shape collapses to Bool, anything else is an Enum
//! 5. a bare `{"title": "Data"}` is the opaque Data primitive
//!
//! Children are resolved as bare references only, so definitions can be
//! built in any order.
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::reference::{resolve, KnownRefs};
use crate::error::DefinitionError;
use crate::ir::{Constructor, EnumTy, Field, Ty, TypeRef};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    items: Option<RawItems>,
    #[serde(default)]
    any_of: Option<Vec<Object<RawConstructor>>>,
    #[serde(default)]
    left: Option<Object<RawRef>>,
    #[serde(default)]
    right: Option<Object<RawRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItems {
    One(Object<RawRef>),
    Many(Vec<Object<RawRef>>),
}

/// A fragment that must be written as a JSON object. Derived structs on
/// their own also accept a positional array.
#[derive(Debug)]
struct Object<T>(T);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Object<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        T::deserialize(Value::Object(object)).map(Object).map_err(D::Error::custom)
    }
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "$ref")]
    pointer: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConstructor {
    title: String,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    index: Option<u64>,
    #[serde(default)]
    fields: Vec<Object<RawRef>>,
}

pub fn build(reference: &TypeRef, raw: &Value, known: &KnownRefs) -> Result<Ty, DefinitionError> {
    let unsupported = || DefinitionError::UnsupportedDefinition { content: raw.clone() };
    let Object(def) = Object::<RawDefinition>::deserialize(raw).map_err(|_| unsupported())?;

    if let Some(data_type) = def.data_type.as_deref() {
        return match data_type {
            "integer" | "#integer" => Ok(Ty::INTEGER),
            "bytes" | "#bytes" => Ok(Ty::BYTE_ARRAY),
            "#string" | "string" => Ok(Ty::STRING),
            "#boolean" => Ok(Ty::BOOL),
            "list" | "#list" => match def.items {
                Some(RawItems::One(Object(item))) => Ok(Ty::List(resolve(&item.pointer, known)?)),
                Some(RawItems::Many(items)) if items.len() >= 2 => {
                    let fields = items
                        .iter()
                        .map(|Object(item)| resolve(&item.pointer, known))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Ty::Tuple(fields))
                }
                _ => Err(unsupported()),
            },
            "#pair" => match (def.left, def.right) {
                (Some(Object(left)), Some(Object(right))) => Ok(Ty::Pair(
                    resolve(&left.pointer, known)?,
                    resolve(&right.pointer, known)?,
                )),
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        };
    }

    if let Some(alternatives) = def.any_of {
        let alternatives = alternatives.into_iter().map(|Object(alt)| alt).collect::<Vec<_>>();
        if is_bool_shape(&alternatives) {
            return Ok(Ty::BOOL);
        }
        let mut constructors = Vec::with_capacity(alternatives.len());
        for (position, alt) in alternatives.into_iter().enumerate() {
            if alt.data_type.as_deref().is_some_and(|dt| dt != "constructor") {
                return Err(unsupported());
            }
            if let Some(declared) = alt.index {
                if declared != position as u64 {
                    return Err(DefinitionError::ConstructorIndexMismatch {
                        constructor: alt.title,
                        declared,
                        position,
                    });
                }
            }
            let fields = alt
                .fields
                .into_iter()
                .map(|Object(f)| -> Result<Field, DefinitionError> {
                    Ok(Field { ty: resolve(&f.pointer, known)?, name: f.title })
                })
                .collect::<Result<Vec<_>, _>>()?;
            constructors.push(Constructor { name: alt.title, index: position, fields });
        }
        let name = def.title.unwrap_or_else(|| reference.to_string());
        return Ok(Ty::Enum(EnumTy { name, constructors }));
    }

    let bare = def.items.is_none() && def.left.is_none() && def.right.is_none();
    if bare && def.title.as_deref() == Some("Data") {
        return Ok(Ty::DATA);
    }

    Err(unsupported())
}

// exactly [False, True], in that order, both plain constructors without fields
fn is_bool_shape(alternatives: &[RawConstructor]) -> bool {
    let unit = |alt: &RawConstructor, title: &str| {
        alt.title == title
            && alt.fields.is_empty()
            && alt.data_type.as_deref().is_none_or(|dt| dt == "constructor")
    };
    matches!(alternatives, [f, t] if unit(f, "False") && unit(t, "True"))
}
