//! Required-field lookups over decoded JSON.
//!
//! Each helper checks one step of a document shape so callers can chain them
//! with `?` instead of nesting optional matches.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field '{0}' is missing")]
    Missing(String),
    #[error("field '{field}' is not {expected}")]
    WrongType { field: String, expected: &'static str },
    #[error("field '{0}' is empty")]
    Empty(String),
}

/// Treat a whole document as a JSON object
pub fn object(value: &Value) -> Result<&Map<String, Value>, FieldError> {
    value.as_object().ok_or_else(|| FieldError::WrongType {
        field: "$".to_owned(),
        expected: "an object",
    })
}

fn require<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a Value, FieldError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(FieldError::Missing(field.to_owned())),
        Some(value) => Ok(value),
    }
}

fn wrong_type(field: &str, expected: &'static str) -> FieldError {
    FieldError::WrongType { field: field.to_owned(), expected }
}

pub fn require_str<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a str, FieldError> {
    require(map, field)?.as_str().ok_or_else(|| wrong_type(field, "a string"))
}

pub fn require_i64(map: &Map<String, Value>, field: &str) -> Result<i64, FieldError> {
    require(map, field)?.as_i64().ok_or_else(|| wrong_type(field, "an integer"))
}

pub fn require_object<'a>(
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Map<String, Value>, FieldError> {
    require(map, field)?.as_object().ok_or_else(|| wrong_type(field, "an object"))
}

pub fn require_array<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a [Value], FieldError> {
    require(map, field)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| wrong_type(field, "an array"))
}

/// First element of an array field, which must itself be an object
pub fn first<'a>(items: &'a [Value], field: &str) -> Result<&'a Map<String, Value>, FieldError> {
    items
        .first()
        .ok_or_else(|| FieldError::Empty(field.to_owned()))?
        .as_object()
        .ok_or_else(|| wrong_type(field, "an array of objects"))
}
