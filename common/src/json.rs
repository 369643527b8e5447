//! Fluent navigation over `serde_json` values.
//!
//! Walking a path that does not exist yields a null node instead of an error,
//! so callers can chain lookups like `root.get("FireREST").get("title")` and
//! decide at the end whether a missing value matters.

use serde_json::Value;

use crate::error::{BeaconError, Result};

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy)]
pub struct JsonNode<'a> {
    value: &'a Value,
}

impl<'a> JsonNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Steps into the member `key` of an object, null otherwise.
    pub fn get(&self, key: &str) -> JsonNode<'a> {
        match self.value {
            Value::Object(map) => JsonNode::new(map.get(key).unwrap_or(&NULL)),
            _ => JsonNode::new(&NULL),
        }
    }

    /// Steps into element `index` of an array, null otherwise.
    pub fn at(&self, index: usize) -> JsonNode<'a> {
        match self.value {
            Value::Array(items) => JsonNode::new(items.get(index).unwrap_or(&NULL)),
            _ => JsonNode::new(&NULL),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Integer value, parsing strings where needed. Floats are truncated.
    pub fn as_int(&self, default: Option<i64>) -> Result<Option<i64>> {
        match self.value {
            Value::Null => Ok(default),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None => n
                    .as_f64()
                    .map(|f| Some(f as i64))
                    .ok_or_else(|| self.coercion("integer")),
            },
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.coercion("integer")),
            _ => Err(self.coercion("integer")),
        }
    }

    pub fn as_double(&self, default: Option<f64>) -> Result<Option<f64>> {
        match self.value {
            Value::Null => Ok(default),
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| self.coercion("number")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.coercion("number")),
            _ => Err(self.coercion("number")),
        }
    }

    /// String form of the value. Objects and arrays render as JSON text.
    pub fn as_string(&self, default: Option<&str>) -> Result<Option<String>> {
        match self.value {
            Value::Null => Ok(default.map(str::to_string)),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Array(_) | Value::Object(_) => Ok(Some(self.value.to_string())),
            Value::Bool(_) => Err(self.coercion("string")),
        }
    }

    fn coercion(&self, expected: &'static str) -> BeaconError {
        BeaconError::Coercion {
            expected,
            found: self.value.to_string(),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
