//! Runtime registry over a resolved definitions map.
//!
//! Definition keys are split on `/` into a module tree (`cheque/Cheque` lives
//! in module `cheque` as `Cheque`), and enum constructors are looked up by
//! name instead of by index.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use tracing::warn;

use crate::error::TermError;
use crate::ir::{Ty, TypeRef};
use crate::schema::Definitions;
use crate::value::HostValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub modules: BTreeMap<String, Module>,
    pub types: BTreeMap<String, TypeRef>,
}

#[derive(Debug, Clone)]
pub struct Namespace<'d> {
    definitions: &'d Definitions,
    root: Module,
}

/// One enum constructor, ready to be applied to field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructorHandle<'d> {
    pub reference: &'d TypeRef,
    pub name: &'d str,
    pub index: usize,
    pub arity: usize,
}

pub fn identifier(segment: &str) -> String {
    segment.replace('$', "_")
}

impl<'d> Namespace<'d> {
    /// A key whose identifier path is already taken (`A$B` next to a
    /// literal `A_B`) keeps its raw spelling, so no definition is shadowed.
    pub fn from_definitions(definitions: &'d Definitions) -> Self {
        let mut claimed = definitions
            .iter()
            .map(|(reference, _)| reference.as_str())
            .filter(|key| !key.contains('$'))
            .map(str::to_string)
            .collect::<BTreeSet<_>>();
        let mut root = Module::default();
        for (reference, _) in definitions.iter() {
            let key = reference.as_str();
            let mut segments = if key.contains('$') {
                let converted = identifier(key);
                if claimed.insert(converted) {
                    key.split('/').map(identifier).collect::<Vec<_>>()
                } else {
                    warn!(reference = %reference, "identifier collides with another definition, keeping raw name");
                    key.split('/').map(str::to_string).collect::<Vec<_>>()
                }
            } else {
                key.split('/').map(str::to_string).collect::<Vec<_>>()
            };
            let Some(type_name) = segments.pop() else { continue };
            let mut module = &mut root;
            for segment in segments {
                module = module.modules.entry(segment).or_default();
            }
            module.types.insert(type_name, reference.clone());
        }
        Self { definitions, root }
    }

    pub fn root(&self) -> &Module {
        &self.root
    }

    /// Accepts either a raw definition key (`List$cheque/Cheque`) or its
    /// identifier path (`List_cheque/Cheque`).
    pub fn lookup(&self, path: &str) -> Option<&'d TypeRef> {
        if let Some((reference, _)) = self.definitions.get_by_name(path) {
            return Some(reference);
        }
        let mut segments = path.split('/').collect::<Vec<_>>();
        let type_name = segments.pop()?;
        let mut module = &self.root;
        for segment in segments {
            module = module.modules.get(segment)?;
        }
        let reference = module.types.get(type_name)?;
        self.definitions.get_by_name(reference.as_str()).map(|(r, _)| r)
    }

    pub fn constructor(&self, type_path: &str, name: &str) -> Result<ConstructorHandle<'d>, TermError> {
        let unknown = || TermError::UnknownConstructor {
            reference: type_path.to_string(),
            constructor: name.to_string(),
        };
        let reference = self.lookup(type_path).ok_or_else(unknown)?;
        let Some(Ty::Enum(enum_ty)) = self.definitions.get(reference) else {
            return Err(unknown());
        };
        let constructor = enum_ty.constructor_by_name(name).ok_or_else(unknown)?;
        Ok(ConstructorHandle {
            reference,
            name: constructor.name.as_str(),
            index: constructor.index,
            arity: constructor.arity(),
        })
    }

    /// Indented listing of the module tree with each type's shape.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_module(&self.root, 0, &mut out);
        out
    }

    fn render_module(&self, module: &Module, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        for (name, reference) in &module.types {
            let shape = self.definitions.get(reference).map(describe).unwrap_or_default();
            let _ = writeln!(out, "{indent}{name} = {shape}");
        }
        for (name, child) in &module.modules {
            let _ = writeln!(out, "{indent}{name}/");
            self.render_module(child, depth + 1, out);
        }
    }
}

fn describe(ty: &Ty) -> String {
    match ty {
        Ty::Enum(e) => e
            .constructors
            .iter()
            .map(|c| {
                if c.fields.is_empty() {
                    c.name.clone()
                } else {
                    let fields = c.fields.iter().map(|f| f.ty.as_str()).collect::<Vec<_>>();
                    format!("{}({})", c.name, fields.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

impl ConstructorHandle<'_> {
    pub fn apply(&self, fields: Vec<HostValue>) -> Result<HostValue, TermError> {
        if fields.len() != self.arity {
            let mut path = crate::term::ValuePath::root();
            path.push_field(self.name);
            return Err(TermError::ArityMismatch {
                path,
                shape: format!("{}.{}", self.reference, self.name),
                expected: self.arity,
                found: fields.len(),
            });
        }
        Ok(HostValue::Enum { index: self.index, fields })
    }

    /// Zero-field constructors are plain constants.
    pub fn value(&self) -> Result<HostValue, TermError> {
        self.apply(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;

    const CHEQUE: &str = include_str!("../tests/fixtures/cheque.json");

    #[test]
    fn module_tree_follows_slashes() {
        let bp = Blueprint::from_json_str(CHEQUE).unwrap();
        let ns = Namespace::from_definitions(bp.definitions());
        let cheque = ns.root().modules.get("cheque").unwrap();
        assert_eq!(cheque.types.get("Cheque").unwrap().as_str(), "cheque/Cheque");
        assert_eq!(cheque.types.get("HashLock").unwrap().as_str(), "cheque/HashLock");
        assert!(ns.root().modules.contains_key("List_cheque"));
        assert!(ns.root().types.contains_key("Amount"));
    }

    #[test]
    fn lookup_by_key_or_identifier_path() {
        let bp = Blueprint::from_json_str(CHEQUE).unwrap();
        let ns = Namespace::from_definitions(bp.definitions());
        assert_eq!(ns.lookup("List$cheque/Cheque").unwrap().as_str(), "List$cheque/Cheque");
        assert_eq!(ns.lookup("List_cheque/Cheque").unwrap().as_str(), "List$cheque/Cheque");
        assert!(ns.lookup("cheque/Nope").is_none());
    }

    #[test]
    fn constructors_by_name() {
        let bp = Blueprint::from_json_str(CHEQUE).unwrap();
        let ns = Namespace::from_definitions(bp.definitions());
        let htlc = ns.constructor("cheque/Cheque", "HtlcCheque").unwrap();
        assert_eq!((htlc.index, htlc.arity), (1, 1));

        let lock = ns.constructor("cheque/HashLock", "Sha3256Lock").unwrap();
        let value = lock.apply(vec![HostValue::Bytes(vec![0; 32])]).unwrap();
        assert_eq!(value, HostValue::enum_value(2, vec![HostValue::Bytes(vec![0; 32])]));

        let err = lock.value().unwrap_err();
        assert!(matches!(err, TermError::ArityMismatch { expected: 1, found: 0, .. }));

        assert!(matches!(
            ns.constructor("cheque/Cheque", "Bogus"),
            Err(TermError::UnknownConstructor { .. })
        ));
        assert!(ns.constructor("Amount", "Anything").is_err());
    }

    #[test]
    fn colliding_identifiers_keep_both_definitions() {
        let raw = serde_json::from_value(serde_json::json!({
            "A$B": {"dataType": "integer"},
            "A_B": {"dataType": "bytes"},
            "m/C$D": {"dataType": "integer"},
            "m/C_D": {"dataType": "bytes"}
        }))
        .unwrap();
        let defs = Definitions::from_raw(&raw).unwrap();
        let ns = Namespace::from_definitions(&defs);
        assert_eq!(ns.root().types.get("A_B").unwrap().as_str(), "A_B");
        assert_eq!(ns.root().types.get("A$B").unwrap().as_str(), "A$B");
        assert_eq!(ns.lookup("A_B").unwrap().as_str(), "A_B");
        assert_eq!(ns.lookup("A$B").unwrap().as_str(), "A$B");
        let m = ns.root().modules.get("m").unwrap();
        assert_eq!(m.types.len(), 2);
        assert_eq!(ns.lookup("m/C_D").unwrap().as_str(), "m/C_D");
        assert_eq!(ns.lookup("m/C$D").unwrap().as_str(), "m/C$D");
    }

    #[test]
    fn render_lists_shapes() {
        let bp = Blueprint::from_json_str(CHEQUE).unwrap();
        let listing = Namespace::from_definitions(bp.definitions()).render();
        assert!(listing.contains("Normal = Tuple<Index, Amount>"), "{listing}");
        assert!(listing.contains("cheque/\n"), "{listing}");
        assert!(listing.contains("  Cheque = NormalCheque(Normal) | HtlcCheque(Htlc)"), "{listing}");
    }
}
