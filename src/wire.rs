//! Abstract shape accepted by the evaluator: tagged constructor, integer,
//! byte string, ordered sequence.
//!
//! Two renderings are provided: the textual data syntax used on the evaluator
//! command line (`Constr 0 [I 1, B #00]`) and the detailed JSON schema
//! (`{"constructor": 0, "fields": [{"int": 1}, {"bytes": "00"}]}`).
use std::fmt;

use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::HostValueError;
use crate::term::ValuePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireTerm {
    Constr { tag: u64, fields: Vec<WireTerm> },
    Integer(BigInt),
    ByteString(Vec<u8>),
    List(Vec<WireTerm>),
}

impl WireTerm {
    pub fn integer(n: impl Into<BigInt>) -> Self {
        WireTerm::Integer(n.into())
    }

    /// `(con data (...))`, the form an argument takes on the evaluator CLI.
    pub fn to_uplc_constant(&self) -> String {
        format!("(con data ({self}))")
    }

    pub fn to_json(&self) -> Value {
        match self {
            WireTerm::Constr { tag, fields } => json!({
                "constructor": tag,
                "fields": fields.iter().map(WireTerm::to_json).collect::<Vec<_>>(),
            }),
            WireTerm::Integer(n) => json!({ "int": integer_to_json(n) }),
            WireTerm::ByteString(bytes) => json!({ "bytes": hex::encode(bytes) }),
            WireTerm::List(items) => json!({ "list": items.iter().map(WireTerm::to_json).collect::<Vec<_>>() }),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self, HostValueError> {
        from_json_at(value, &mut ValuePath::root())
    }
}

fn integer_to_json(n: &BigInt) -> Value {
    if let Ok(i) = i64::try_from(n) {
        Value::from(i)
    } else if let Ok(u) = u64::try_from(n) {
        Value::from(u)
    } else {
        Value::from(n.to_string())
    }
}

pub(crate) fn integer_from_json(value: &Value) -> Option<BigInt> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from)),
        Value::String(s) => s.parse::<BigInt>().ok(),
        _ => None,
    }
}

fn invalid(path: &ValuePath, reason: impl Into<String>) -> HostValueError {
    HostValueError::Invalid { path: path.clone(), reason: reason.into() }
}

fn only_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if object.len() == 1 { object.get(key) } else { None }
}

pub(crate) fn from_json_at(value: &Value, path: &mut ValuePath) -> Result<WireTerm, HostValueError> {
    let Value::Object(object) = value else {
        return Err(invalid(path, format!("expected a data object, found {value}")));
    };
    if let Some(n) = only_key(object, "int") {
        let n = integer_from_json(n).ok_or_else(|| invalid(path, format!("not an integer: {n}")))?;
        return Ok(WireTerm::Integer(n));
    }
    if let Some(hex_str) = only_key(object, "bytes") {
        let bytes = hex_str
            .as_str()
            .and_then(|s| hex::decode(s).ok())
            .ok_or_else(|| invalid(path, format!("not a hex string: {hex_str}")))?;
        return Ok(WireTerm::ByteString(bytes));
    }
    if let Some(items) = only_key(object, "list") {
        let items = items
            .as_array()
            .ok_or_else(|| invalid(path, "`list` must be an array"))?;
        return Ok(WireTerm::List(sequence_from_json(items, path)?));
    }
    if object.len() == 2 {
        if let (Some(tag), Some(fields)) = (object.get("constructor"), object.get("fields")) {
            let tag = tag
                .as_u64()
                .ok_or_else(|| invalid(path, format!("bad constructor tag: {tag}")))?;
            let fields = fields
                .as_array()
                .ok_or_else(|| invalid(path, "`fields` must be an array"))?;
            return Ok(WireTerm::Constr { tag, fields: sequence_from_json(fields, path)? });
        }
    }
    Err(invalid(path, format!("unrecognized data object: {value}")))
}

fn sequence_from_json(items: &[Value], path: &mut ValuePath) -> Result<Vec<WireTerm>, HostValueError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        path.push_index(i);
        out.push(from_json_at(item, path)?);
        path.pop();
    }
    Ok(out)
}

impl Serialize for WireTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[WireTerm]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for WireTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireTerm::Constr { tag, fields } => {
                write!(f, "Constr {tag} ")?;
                write_seq(f, fields)
            }
            WireTerm::Integer(n) => write!(f, "I {n}"),
            WireTerm::ByteString(bytes) => write!(f, "B #{}", hex::encode(bytes)),
            WireTerm::List(items) => {
                f.write_str("List ")?;
                write_seq(f, items)
            }
        }
    }
}
