//! Blueprint loading and per-call argument construction.
//!
//! A blueprint is loaded once (names first, bodies second, all-or-nothing)
//! and then read by any number of calls; arguments borrow its definitions.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{SchemaError, TermError};
use crate::ir::{Ty, TypeRef};
use crate::path_de;
use crate::schema::{self, resolve, Definitions, KnownRefs};
use crate::term::{Term, ValuePath};
use crate::value::HostValue;
use crate::wire::WireTerm;

// ————————————————————————————————————————————————————————————————————————————
// RAW DOCUMENTS
// ————————————————————————————————————————————————————————————————————————————

/// Single-validator export (`aiken export --module .. --name ..`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlueprint {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
    pub compiled_code: String,
    pub hash: String,
}

/// Project blueprint (`plutus.json`): many validators, one shared definitions map.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlutusJson {
    pub validators: Vec<RawValidator>,
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidator {
    pub title: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub compiled_code: String,
    pub hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    pub title: String,
    pub schema: RawSchemaRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSchemaRef {
    #[serde(rename = "$ref")]
    pub pointer: String,
}

// ————————————————————————————————————————————————————————————————————————————
// LOADED BLUEPRINT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    parameters: Vec<Parameter>,
    definitions: Definitions,
    compiled_code: String,
    hash: String,
}

impl Blueprint {
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        Self::from_raw(path_de::from_str_with_path(src)?)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        Self::from_raw(path_de::from_value_with_path(value)?)
    }

    pub fn from_raw(raw: RawBlueprint) -> Result<Self, SchemaError> {
        Self::assemble(raw.name, raw.parameters, &raw.definitions, raw.compiled_code, raw.hash)
    }

    /// Select one validator, by title, out of a project `plutus.json`.
    pub fn from_plutus_json(src: &str, validator: &str) -> Result<Self, SchemaError> {
        let raw: RawPlutusJson = path_de::from_str_with_path(src)?;
        let Some(found) = raw.validators.into_iter().find(|v| v.title == validator) else {
            return Err(SchemaError::ValidatorNotFound(validator.to_string()));
        };
        Self::assemble(found.title, found.parameters, &raw.definitions, found.compiled_code, found.hash)
    }

    fn assemble(
        name: String,
        raw_parameters: Vec<RawParameter>,
        raw_definitions: &IndexMap<String, Value>,
        compiled_code: String,
        hash: String,
    ) -> Result<Self, SchemaError> {
        let known: KnownRefs = schema::known_refs(raw_definitions);

        let mut parameters = Vec::with_capacity(raw_parameters.len());
        for RawParameter { title, schema } in raw_parameters {
            match resolve(&schema.pointer, &known) {
                Ok(ty) => {
                    debug!(parameter = %title, %ty, "resolved parameter");
                    parameters.push(Parameter { name: title, ty });
                }
                Err(source) => return Err(SchemaError::Parameter { title, source }),
            }
        }

        let definitions = Definitions::build(raw_definitions, &known)?;
        info!(
            blueprint = %name,
            parameters = parameters.len(),
            definitions = definitions.len(),
            "loaded blueprint"
        );
        Ok(Self { name, parameters, definitions, compiled_code, hash })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
    pub fn compiled_code(&self) -> &str {
        &self.compiled_code
    }
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_type(&self, name: &str) -> Option<&Ty> {
        self.parameter(name).and_then(|p| self.definitions.get(&p.ty))
    }

    /// Pair `args` with the declared parameters, by position, and type-check each one.
    pub fn build_arguments<'b>(&'b self, args: &[HostValue]) -> Result<Vec<Term<'b>>, TermError> {
        if args.len() != self.parameters.len() {
            return Err(TermError::ArityMismatch {
                path: ValuePath::root(),
                shape: format!("parameters of `{}`", self.name),
                expected: self.parameters.len(),
                found: args.len(),
            });
        }
        self.parameters
            .iter()
            .zip(args)
            .map(|(parameter, arg)| {
                let mut path = ValuePath::root();
                path.push_field(parameter.name.as_str());
                Term::build_at(arg, &parameter.ty, &self.definitions, path)
            })
            .collect()
    }

    pub fn encode_arguments(&self, args: &[HostValue]) -> Result<Vec<WireTerm>, TermError> {
        let terms = self.build_arguments(args)?;
        Ok(terms.iter().map(Term::encode).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DefinitionError, ReferenceError};
    use serde_json::json;

    const CHEQUE: &str = include_str!("../tests/fixtures/cheque.json");
    const PLUTUS: &str = include_str!("../tests/fixtures/plutus.json");

    #[test]
    fn loads_the_export_document() {
        let bp = Blueprint::from_json_str(CHEQUE).unwrap();
        assert_eq!(bp.name(), "cheque.accept_cheques");
        assert_eq!(bp.hash(), "9f7a498b186048b088d21bb6b1b7875e67fe7939ab7cdcb26a95acea");
        assert!(bp.compiled_code().starts_with("5837"));
        assert_eq!(
            bp.parameters(),
            [Parameter { name: "cheques".into(), ty: TypeRef::new("List$cheque/Cheque") }]
        );
        assert_eq!(bp.definitions().len(), 9);
        assert_eq!(
            bp.parameter_type("cheques"),
            Some(&Ty::List(TypeRef::new("cheque/Cheque")))
        );
        let (_, htlc) = bp.definitions().get_by_name("Htlc").unwrap();
        assert!(matches!(htlc, Ty::Tuple(fields) if fields.len() == 4));
    }

    #[test]
    fn bad_parameter_reference_fails_loading() {
        let err = Blueprint::from_value(json!({
            "name": "m.f",
            "parameters": [{"title": "x", "schema": {"$ref": "#/definitions/Missing"}}],
            "definitions": {"Int": {"dataType": "integer"}},
            "compiledCode": "00",
            "hash": "00"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Parameter { ref title, source: ReferenceError::UnknownReference { .. } } if title == "x"
        ));
    }

    #[test]
    fn bad_definition_fails_loading() {
        let err = Blueprint::from_value(json!({
            "name": "m.f",
            "parameters": [],
            "definitions": {"Weird": {"dataType": "float"}},
            "compiledCode": "00",
            "hash": "00"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Definition { source: DefinitionError::UnsupportedDefinition { .. }, .. }
        ));
    }

    #[test]
    fn malformed_document_reports_json_path() {
        let err = Blueprint::from_value(json!({
            "name": "m.f",
            "parameters": [{"title": "x", "schema": {}}],
            "compiledCode": "00",
            "hash": "00"
        }))
        .unwrap_err();
        let SchemaError::Document(message) = err else { panic!("expected document error") };
        assert!(message.contains("parameters[0].schema"), "{message}");
    }

    #[test]
    fn selects_a_validator_from_plutus_json() {
        let bp = Blueprint::from_plutus_json(PLUTUS, "hello.greet").unwrap();
        assert_eq!(bp.hash(), "00aa");
        assert_eq!(bp.parameters()[0].ty.as_str(), "hello/Entity");

        let flag = Blueprint::from_plutus_json(PLUTUS, "hello.accept_bool").unwrap();
        assert_eq!(flag.parameter_type("flag"), Some(&Ty::BOOL));

        let spend = Blueprint::from_plutus_json(PLUTUS, "hello.spend").unwrap();
        assert!(spend.parameters().is_empty());

        let err = Blueprint::from_plutus_json(PLUTUS, "hello.nope").unwrap_err();
        assert!(matches!(err, SchemaError::ValidatorNotFound(name) if name == "hello.nope"));
    }

    #[test]
    fn arguments_pair_with_parameters_by_position() {
        let bp = Blueprint::from_plutus_json(PLUTUS, "hello.accept_bool").unwrap();
        assert_eq!(
            bp.encode_arguments(&[true.into()]).unwrap(),
            [WireTerm::Constr { tag: 1, fields: vec![] }]
        );
        let err = bp.build_arguments(&[]).unwrap_err();
        assert!(matches!(err, TermError::ArityMismatch { expected: 1, found: 0, .. }));

        let err = bp.build_arguments(&[1.into()]).unwrap_err();
        let TermError::TypeMismatch { path, .. } = err else { panic!("expected mismatch") };
        assert_eq!(path.to_string(), "$.flag");
    }
}
