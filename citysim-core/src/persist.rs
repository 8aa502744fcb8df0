//! Save/load contract for simulation entities.
//!
//! Entities write their fields into a [`VariantMap`] (a JSON object) and
//! restore themselves from one. Every field covered by `save` must be
//! restored by `load`; the map encoding itself is left to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Key/value stream entities save into.
pub type VariantMap = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid field '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode field '{field}': {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Bidirectional persistence with round-trip fidelity.
pub trait Persist {
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError>;

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError>;
}

/// Write one field.
pub fn put<T: Serialize>(
    stream: &mut VariantMap,
    field: &'static str,
    value: &T,
) -> Result<(), PersistError> {
    let value =
        serde_json::to_value(value).map_err(|source| PersistError::Encode { field, source })?;
    stream.insert(field.to_string(), value);
    Ok(())
}

/// Read one required field.
pub fn get<T: DeserializeOwned>(stream: &VariantMap, field: &'static str) -> Result<T, PersistError> {
    let value = stream
        .get(field)
        .ok_or(PersistError::MissingField(field))?;
    serde_json::from_value(value.clone()).map_err(|source| PersistError::InvalidField { field, source })
}

/// Read an optional field, falling back to `default` when absent.
pub fn get_or<T: DeserializeOwned>(
    stream: &VariantMap,
    field: &'static str,
    default: T,
) -> Result<T, PersistError> {
    match stream.get(field) {
        Some(_) => get(stream, field),
        None => Ok(default),
    }
}

/// Read a nested object.
pub fn get_map<'a>(stream: &'a VariantMap, field: &'static str) -> Result<&'a VariantMap, PersistError> {
    match stream.get(field) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(PersistError::InvalidField {
            field,
            source: <serde_json::Error as serde::de::Error>::custom("expected an object"),
        }),
        None => Err(PersistError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let mut stream = VariantMap::new();
        put(&mut stream, "level", &42.5f32).unwrap();
        put(&mut stream, "name", &"senate").unwrap();
        assert_eq!(get::<f32>(&stream, "level").unwrap(), 42.5);
        assert_eq!(get::<String>(&stream, "name").unwrap(), "senate");
    }

    #[test]
    fn test_missing_field() {
        let stream = VariantMap::new();
        let err = get::<u32>(&stream, "size").unwrap_err();
        assert!(matches!(err, PersistError::MissingField("size")));
        assert_eq!(get_or(&stream, "size", 7u32).unwrap(), 7);
    }

    #[test]
    fn test_invalid_field() {
        let mut stream = VariantMap::new();
        stream.insert("size".into(), Value::String("big".into()));
        let err = get::<u32>(&stream, "size").unwrap_err();
        assert!(matches!(err, PersistError::InvalidField { field: "size", .. }));
        assert!(get_map(&stream, "size").is_err());
    }
}
