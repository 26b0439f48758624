use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaError;

fn with_path<T>(result: Result<T, serde_path_to_error::Error<serde_json::Error>>) -> Result<T, SchemaError> {
    result.map_err(|err| {
        let path = err.path().to_string();
        SchemaError::Document(format!("at JSON path {path} → {}", err.into_inner()))
    })
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    with_path(serde_path_to_error::deserialize::<_, T>(de))
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, SchemaError> {
    with_path(serde_path_to_error::deserialize::<_, T>(value))
}
