use crate::term::{Term, TermValue};
use crate::wire::WireTerm;

// Total: a `Term` payload already agrees with its type, so every arm has
// exactly one wire shape.
pub fn encode(term: &Term<'_>) -> WireTerm {
    match term.value() {
        TermValue::Bool(b) => WireTerm::Constr { tag: u64::from(*b), fields: Vec::new() },
        TermValue::Bytes(bytes) => WireTerm::ByteString(bytes.clone()),
        TermValue::Integer(n) => WireTerm::Integer(n.clone()),
        // no text leaf on the wire; strings travel as their UTF-8 bytes
        TermValue::Text(s) => WireTerm::ByteString(s.as_bytes().to_vec()),
        TermValue::Data(d) => d.clone(),
        TermValue::Sequence(items) => WireTerm::List(items.iter().map(encode).collect()),
        TermValue::Pair(fst, snd) => WireTerm::List(vec![encode(fst), encode(snd)]),
        TermValue::Enum { index, fields } => WireTerm::Constr {
            tag: *index as u64,
            fields: fields.iter().map(encode).collect(),
        },
    }
}

impl Term<'_> {
    pub fn encode(&self) -> WireTerm {
        encode(self)
    }
}
