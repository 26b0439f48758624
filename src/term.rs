//! Typed terms: a host value checked against a resolved type.
//!
//! The shape check happens once, in [`Term::build`]. A `Term` can only be
//! obtained from there, so its payload always mirrors its type and lowering
//! (see `lower`) never fails.
use std::fmt;

use num_bigint::BigInt;
use tracing::trace;

use crate::error::TermError;
use crate::ir::{Primitive, Ty, TypeRef};
use crate::schema::Definitions;
use crate::value::HostValue;
use crate::wire::WireTerm;

// ————————————————————————————————————————————————————————————————————————————
// VALUE PATHS
// ————————————————————————————————————————————————————————————————————————————

/// Structural position inside a host value, rendered like `$.cheques[0].NormalCheque.0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath(Vec<Segment>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Index(usize),
    Field(String),
}

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }
    pub fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }
    pub fn push_field(&mut self, name: impl Into<String>) {
        self.0.push(Segment::Field(name.into()));
    }
    pub fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TERMS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct Term<'d> {
    value: TermValue<'d>,
    ty: &'d Ty,
    definitions: &'d Definitions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TermValue<'d> {
    Bool(bool),
    Bytes(Vec<u8>),
    Integer(BigInt),
    Text(String),
    Data(WireTerm),
    Sequence(Vec<Term<'d>>),                  // List and Tuple
    Pair(Box<Term<'d>>, Box<Term<'d>>),
    Enum { index: usize, fields: Vec<Term<'d>> },
}

impl<'d> Term<'d> {
    pub fn build(value: &HostValue, ty: &'d Ty, definitions: &'d Definitions) -> Result<Self, TermError> {
        Builder { definitions, path: ValuePath::root() }.build(value, ty)
    }

    /// Same as [`Term::build`], starting from a reference instead of a resolved type.
    pub fn build_ref(value: &HostValue, reference: &TypeRef, definitions: &'d Definitions) -> Result<Self, TermError> {
        let mut builder = Builder { definitions, path: ValuePath::root() };
        let ty = builder.lookup(reference)?;
        builder.build(value, ty)
    }

    pub(crate) fn build_at(
        value: &HostValue,
        reference: &TypeRef,
        definitions: &'d Definitions,
        path: ValuePath,
    ) -> Result<Self, TermError> {
        let mut builder = Builder { definitions, path };
        let ty = builder.lookup(reference)?;
        builder.build(value, ty)
    }

    pub fn value(&self) -> &TermValue<'d> {
        &self.value
    }
    pub fn ty(&self) -> &'d Ty {
        self.ty
    }
    pub fn definitions(&self) -> &'d Definitions {
        self.definitions
    }
}

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.encode(), self.ty)
    }
}

pub fn build_term<'d>(value: &HostValue, ty: &'d Ty, definitions: &'d Definitions) -> Result<Term<'d>, TermError> {
    Term::build(value, ty, definitions)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

struct Builder<'d> {
    definitions: &'d Definitions,
    path: ValuePath,
}

impl<'d> Builder<'d> {
    fn lookup(&self, reference: &TypeRef) -> Result<&'d Ty, TermError> {
        self.definitions.get(reference).ok_or_else(|| TermError::UnresolvedReference {
            path: self.path.clone(),
            reference: reference.clone(),
        })
    }

    fn arity(&self, ty: &Ty, expected: usize, found: usize) -> TermError {
        TermError::ArityMismatch { path: self.path.clone(), shape: ty.to_string(), expected, found }
    }

    fn build_child(&mut self, value: &HostValue, reference: &TypeRef) -> Result<Term<'d>, TermError> {
        let ty = self.lookup(reference)?;
        self.build(value, ty)
    }

    fn build(&mut self, value: &HostValue, ty: &'d Ty) -> Result<Term<'d>, TermError> {
        let payload = match (ty, value) {
            (Ty::Primitive(Primitive::Bool), HostValue::Bool(b)) => TermValue::Bool(*b),
            (Ty::Primitive(Primitive::ByteArray), HostValue::Bytes(b)) => TermValue::Bytes(b.clone()),
            (Ty::Primitive(Primitive::Integer), HostValue::Integer(n)) => TermValue::Integer(n.clone()),
            (Ty::Primitive(Primitive::String), HostValue::Text(s)) => TermValue::Text(s.clone()),
            (Ty::Primitive(Primitive::Data), HostValue::Data(d)) => TermValue::Data(d.clone()),
            (Ty::List(item), HostValue::Sequence(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item_value) in items.iter().enumerate() {
                    self.path.push_index(i);
                    out.push(self.build_child(item_value, item)?);
                    self.path.pop();
                }
                TermValue::Sequence(out)
            }
            (Ty::Tuple(fields), HostValue::Sequence(items)) => {
                if items.len() != fields.len() {
                    return Err(self.arity(ty, fields.len(), items.len()));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (item_value, field)) in items.iter().zip(fields).enumerate() {
                    self.path.push_index(i);
                    out.push(self.build_child(item_value, field)?);
                    self.path.pop();
                }
                TermValue::Sequence(out)
            }
            (Ty::Pair(fst, snd), HostValue::Pair(a, b)) => self.pair(fst, snd, a, b)?,
            (Ty::Pair(fst, snd), HostValue::Sequence(items)) => match items.as_slice() {
                [a, b] => self.pair(fst, snd, a, b)?,
                _ => return Err(self.arity(ty, 2, items.len())),
            },
            (Ty::Enum(enum_ty), HostValue::Enum { index, fields }) => {
                let Some(constructor) = enum_ty.constructor(*index) else {
                    return Err(TermError::ConstructorIndexOutOfRange {
                        path: self.path.clone(),
                        enum_name: enum_ty.name.clone(),
                        index: *index,
                        count: enum_ty.constructors.len(),
                    });
                };
                if fields.len() != constructor.arity() {
                    return Err(TermError::ArityMismatch {
                        path: self.path.clone(),
                        shape: format!("{}.{}", enum_ty.name, constructor.name),
                        expected: constructor.arity(),
                        found: fields.len(),
                    });
                }
                self.path.push_field(constructor.name.as_str());
                let mut out = Vec::with_capacity(fields.len());
                for (i, (field_value, field)) in fields.iter().zip(&constructor.fields).enumerate() {
                    match &field.name {
                        Some(name) => self.path.push_field(name.as_str()),
                        None => self.path.push_field(i.to_string()),
                    }
                    out.push(self.build_child(field_value, &field.ty)?);
                    self.path.pop();
                }
                self.path.pop();
                TermValue::Enum { index: *index, fields: out }
            }
            _ => {
                return Err(TermError::TypeMismatch {
                    path: self.path.clone(),
                    expected: ty.to_string(),
                    found: value.describe(),
                });
            }
        };
        trace!(path = %self.path, %ty, "built term");
        Ok(Term { value: payload, ty, definitions: self.definitions })
    }

    fn pair(
        &mut self,
        fst: &TypeRef,
        snd: &TypeRef,
        a: &HostValue,
        b: &HostValue,
    ) -> Result<TermValue<'d>, TermError> {
        self.path.push_field("fst");
        let a = self.build_child(a, fst)?;
        self.path.pop();
        self.path.push_field("snd");
        let b = self.build_child(b, snd)?;
        self.path.pop();
        Ok(TermValue::Pair(Box::new(a), Box::new(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::{json, Value};

    fn defs() -> Definitions {
        let raw: IndexMap<String, Value> = serde_json::from_value(json!({
            "Amount": {"title": "Amount", "dataType": "integer"},
            "Index": {"title": "Index", "dataType": "integer"},
            "Bytes32": {"title": "Bytes32", "dataType": "bytes"},
            "Name": {"dataType": "#string"},
            "Bool": {"title": "Bool", "anyOf": [
                {"title": "False", "dataType": "constructor", "index": 0, "fields": []},
                {"title": "True", "dataType": "constructor", "index": 1, "fields": []}
            ]},
            "Data": {"title": "Data", "description": "Any Plutus data."},
            "List$Amount": {"dataType": "list", "items": {"$ref": "#/definitions/Amount"}},
            "Normal": {"title": "Normal", "dataType": "list", "items": [
                {"$ref": "#/definitions/Index"},
                {"$ref": "#/definitions/Amount"}
            ]},
            "Pair$Bytes32_Amount": {"dataType": "#pair",
                "left": {"$ref": "#/definitions/Bytes32"},
                "right": {"$ref": "#/definitions/Amount"}},
            "Cheque": {"title": "Cheque", "anyOf": [
                {"title": "NormalCheque", "dataType": "constructor", "index": 0,
                 "fields": [{"$ref": "#/definitions/Normal"}]},
                {"title": "Void", "dataType": "constructor", "index": 1, "fields": []},
                {"title": "Signed", "dataType": "constructor", "index": 2,
                 "fields": [{"title": "signer", "$ref": "#/definitions/Bytes32"}]}
            ]}
        }))
        .unwrap();
        Definitions::from_raw(&raw).unwrap()
    }

    fn build<'d>(defs: &'d Definitions, name: &str, value: HostValue) -> Result<Term<'d>, TermError> {
        Term::build_ref(&value, &TypeRef::new(name), defs)
    }

    #[test]
    fn primitives_accept_their_own_kind() {
        let d = defs();
        assert!(matches!(build(&d, "Amount", 42.into()).unwrap().value(), TermValue::Integer(_)));
        assert!(matches!(build(&d, "Bool", true.into()).unwrap().value(), TermValue::Bool(true)));
        assert!(matches!(build(&d, "Name", "paluh".into()).unwrap().value(), TermValue::Text(_)));
        assert!(matches!(
            build(&d, "Bytes32", HostValue::Bytes(vec![1; 32])).unwrap().value(),
            TermValue::Bytes(_)
        ));
        assert!(matches!(
            build(&d, "Data", WireTerm::integer(1).into()).unwrap().value(),
            TermValue::Data(_)
        ));
    }

    #[test]
    fn primitives_reject_every_other_kind() {
        let d = defs();
        let cases: [(&str, HostValue); 5] = [
            ("Amount", "42".into()),
            ("Bool", 1.into()),
            ("Name", HostValue::Bytes(b"paluh".to_vec())),
            ("Bytes32", "00".into()),
            ("Data", 1.into()),
        ];
        for (name, value) in cases {
            let err = build(&d, name, value).unwrap_err();
            assert!(matches!(err, TermError::TypeMismatch { .. }), "{name}: {err}");
        }
        let err = build(&d, "Amount", "42".into()).unwrap_err();
        assert_eq!(err.to_string(), "at $: expected Integer, found text \"42\"");
    }

    #[test]
    fn list_keeps_element_order() {
        let d = defs();
        let term = build(&d, "List$Amount", vec![3.into(), 1.into(), 2.into()].into()).unwrap();
        let TermValue::Sequence(items) = term.value() else { panic!("expected sequence") };
        let ns = items
            .iter()
            .map(|t| match t.value() {
                TermValue::Integer(n) => n.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(ns, [BigInt::from(3), BigInt::from(1), BigInt::from(2)]);
        assert_eq!(term.ty(), &Ty::List(TypeRef::new("Amount")));
    }

    #[test]
    fn list_element_errors_carry_the_index() {
        let d = defs();
        let err = build(&d, "List$Amount", vec![1.into(), true.into()].into()).unwrap_err();
        let TermError::TypeMismatch { path, .. } = err else { panic!("expected mismatch") };
        assert_eq!(path.to_string(), "$[1]");
    }

    #[test]
    fn tuple_arity_is_exact() {
        let d = defs();
        assert!(build(&d, "Normal", vec![1.into(), 100.into()].into()).is_ok());
        for len in [0usize, 1, 3] {
            let value = HostValue::Sequence((0..len).map(|i| HostValue::from(i as i64)).collect());
            let err = build(&d, "Normal", value).unwrap_err();
            assert!(
                matches!(err, TermError::ArityMismatch { expected: 2, found, .. } if found == len),
                "{err}"
            );
        }
    }

    #[test]
    fn pair_accepts_pair_or_two_element_sequence() {
        let d = defs();
        let bytes = HostValue::Bytes(vec![0; 32]);
        assert!(build(&d, "Pair$Bytes32_Amount", HostValue::pair(bytes.clone(), 5)).is_ok());
        assert!(build(&d, "Pair$Bytes32_Amount", vec![bytes.clone(), 5.into()].into()).is_ok());
        let err = build(&d, "Pair$Bytes32_Amount", vec![bytes.clone()].into()).unwrap_err();
        assert!(matches!(err, TermError::ArityMismatch { expected: 2, found: 1, .. }));
        let err = build(&d, "Pair$Bytes32_Amount", HostValue::pair(5, bytes)).unwrap_err();
        let TermError::TypeMismatch { path, .. } = err else { panic!("expected mismatch") };
        assert_eq!(path.to_string(), "$.fst");
    }

    #[test]
    fn enum_checks_index_then_arity_then_fields() {
        let d = defs();
        let ok = HostValue::enum_value(0, vec![vec![1.into(), 100.into()].into()]);
        let term = build(&d, "Cheque", ok).unwrap();
        assert!(matches!(term.value(), TermValue::Enum { index: 0, fields } if fields.len() == 1));

        let err = build(&d, "Cheque", HostValue::enum_value(3, vec![])).unwrap_err();
        assert!(matches!(err, TermError::ConstructorIndexOutOfRange { index: 3, count: 3, .. }));

        let err = build(&d, "Cheque", HostValue::enum_value(1, vec![1.into()])).unwrap_err();
        assert!(matches!(err, TermError::ArityMismatch { expected: 0, found: 1, .. }));

        let err = build(&d, "Cheque", HostValue::enum_value(0, vec![vec![1.into()].into()])).unwrap_err();
        let TermError::ArityMismatch { path, .. } = err else { panic!("expected arity") };
        assert_eq!(path.to_string(), "$.NormalCheque.0");

        let err = build(&d, "Cheque", HostValue::enum_value(2, vec![1.into()])).unwrap_err();
        let TermError::TypeMismatch { path, .. } = err else { panic!("expected mismatch") };
        assert_eq!(path.to_string(), "$.Signed.signer");
    }

    #[test]
    fn enum_types_reject_non_enum_values() {
        let d = defs();
        let err = build(&d, "Cheque", 0.into()).unwrap_err();
        assert!(matches!(err, TermError::TypeMismatch { .. }));
    }

    #[test]
    fn unknown_reference_is_reported() {
        let d = defs();
        let err = build(&d, "Nope", 1.into()).unwrap_err();
        assert!(matches!(err, TermError::UnresolvedReference { .. }));
    }
}
