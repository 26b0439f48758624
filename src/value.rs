//! Caller-side values, before they are checked against a type.
//!
//! JSON notation accepted by [`HostValue::from_json`]:
//!
//! | JSON                                   | HostValue            |
//! |----------------------------------------|----------------------|
//! | `true` / `false`                       | `Bool`               |
//! | `42`, `{"int": "1000000000000000000000"}` | `Integer`         |
//! | `"text"`                               | `Text`               |
//! | `[a, b, ...]`                          | `Sequence`           |
//! | `{"bytes": "00ff"}`                    | `Bytes`              |
//! | `{"constructor": 1, "fields": [...]}`  | `Enum`               |
//! | `{"data": <detailed wire JSON>}`       | `Data`               |
use num_bigint::BigInt;
use serde_json::Value;

use crate::error::HostValueError;
use crate::term::ValuePath;
use crate::wire::{from_json_at as wire_from_json_at, integer_from_json, WireTerm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostValue {
    Bool(bool),
    Bytes(Vec<u8>),
    Integer(BigInt),
    Text(String),
    Sequence(Vec<HostValue>),
    Pair(Box<HostValue>, Box<HostValue>),
    Enum { index: usize, fields: Vec<HostValue> },
    Data(WireTerm),
}

impl HostValue {
    pub fn pair(fst: impl Into<HostValue>, snd: impl Into<HostValue>) -> Self {
        HostValue::Pair(Box::new(fst.into()), Box::new(snd.into()))
    }

    pub fn enum_value(index: usize, fields: Vec<HostValue>) -> Self {
        HostValue::Enum { index, fields }
    }

    /// Short rendering for mismatch diagnostics.
    pub fn describe(&self) -> String {
        match self {
            HostValue::Bool(b) => format!("boolean {b}"),
            HostValue::Bytes(b) => format!("bytes #{}", hex::encode(b)),
            HostValue::Integer(n) => format!("integer {n}"),
            HostValue::Text(s) => format!("text {s:?}"),
            HostValue::Sequence(items) => format!("sequence of {} element(s)", items.len()),
            HostValue::Pair(..) => "pair".to_string(),
            HostValue::Enum { index, fields } => {
                format!("enum value #{index} with {} field(s)", fields.len())
            }
            HostValue::Data(term) => format!("data {term}"),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self, HostValueError> {
        from_json_at(value, &mut ValuePath::root())
    }
}

fn invalid(path: &ValuePath, reason: impl Into<String>) -> HostValueError {
    HostValueError::Invalid { path: path.clone(), reason: reason.into() }
}

fn from_json_at(value: &Value, path: &mut ValuePath) -> Result<HostValue, HostValueError> {
    match value {
        Value::Null => Err(invalid(path, "null has no host value")),
        Value::Bool(b) => Ok(HostValue::Bool(*b)),
        Value::Number(_) => integer_from_json(value)
            .map(HostValue::Integer)
            .ok_or_else(|| invalid(path, format!("not an integer: {value}"))),
        Value::String(s) => Ok(HostValue::Text(s.clone())),
        Value::Array(items) => Ok(HostValue::Sequence(sequence_from_json(items, path)?)),
        Value::Object(object) => {
            let keys = object.keys().map(String::as_str).collect::<Vec<_>>();
            match keys.as_slice() {
                ["int"] => integer_from_json(&object["int"])
                    .map(HostValue::Integer)
                    .ok_or_else(|| invalid(path, format!("not an integer: {}", object["int"]))),
                ["bytes"] => object["bytes"]
                    .as_str()
                    .and_then(|s| hex::decode(s).ok())
                    .map(HostValue::Bytes)
                    .ok_or_else(|| invalid(path, format!("not a hex string: {}", object["bytes"]))),
                ["data"] => {
                    path.push_field("data");
                    let term = wire_from_json_at(&object["data"], path)?;
                    path.pop();
                    Ok(HostValue::Data(term))
                }
                ["constructor", "fields"] | ["fields", "constructor"] => {
                    let index = object["constructor"]
                        .as_u64()
                        .and_then(|i| usize::try_from(i).ok())
                        .ok_or_else(|| invalid(path, format!("bad constructor index: {}", object["constructor"])))?;
                    let fields = object["fields"]
                        .as_array()
                        .ok_or_else(|| invalid(path, "`fields` must be an array"))?;
                    Ok(HostValue::Enum { index, fields: sequence_from_json(fields, path)? })
                }
                _ => Err(invalid(path, format!("unrecognized object: {value}"))),
            }
        }
    }
}

fn sequence_from_json(items: &[Value], path: &mut ValuePath) -> Result<Vec<HostValue>, HostValueError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        path.push_index(i);
        out.push(from_json_at(item, path)?);
        path.pop();
    }
    Ok(out)
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Integer(n.into())
    }
}

impl From<u64> for HostValue {
    fn from(n: u64) -> Self {
        HostValue::Integer(n.into())
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Integer(n.into())
    }
}

impl From<BigInt> for HostValue {
    fn from(n: BigInt) -> Self {
        HostValue::Integer(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Text(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Text(s)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::Sequence(items)
    }
}

impl From<WireTerm> for HostValue {
    fn from(term: WireTerm) -> Self {
        HostValue::Data(term)
    }
}
