//! Format-agnostic component field values.
//!
//! The [`Value`] enum captures serialized component field data without
//! committing to a wire format. Transforms read and rewrite fields through
//! it; the engine itself never interprets field contents, since persistence
//! is all-or-nothing at the document granularity.

use serde::{Deserialize, Serialize};

/// Format-agnostic value representation for component fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    List(Vec<Value>),
    /// Key-value pairs in declaration order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Creates an empty map value.
    pub fn map() -> Self {
        Value::Map(Vec::new())
    }

    /// Looks up a key in a map value. Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Map(entries) => entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Sets a key in a map value, replacing any existing entry.
    /// No-op on non-map values.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if let Value::Map(entries) = self {
            let key = key.into();
            let value = value.into();
            if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
                entry.1 = value;
            } else {
                entries.push((key, value));
            }
        }
    }

    /// Removes a key from a map value, returning the removed value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        match self {
            Value::Map(entries) => {
                let index = entries.iter().position(|(k, _)| k == key)?;
                Some(entries.remove(index).1)
            }
            _ => None,
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut value = Value::map();
        value.set("speed", 4.5f32);
        value.set("name", "runner");

        assert_eq!(value.get("speed").and_then(Value::as_f32), Some(4.5));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("runner"));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn set_replaces_existing() {
        let mut value = Value::map().with("count", 1i64);
        value.set("count", 2i64);

        assert_eq!(value.get("count").and_then(Value::as_i64), Some(2));
        let Value::Map(entries) = &value else {
            panic!("expected map")
        };
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn remove_returns_value() {
        let mut value = Value::map().with("flag", true);
        assert_eq!(value.remove("flag"), Some(Value::Bool(true)));
        assert_eq!(value.remove("flag"), None);
    }

    #[test]
    fn set_on_scalar_is_noop() {
        let mut value = Value::I64(3);
        value.set("key", 1i64);
        assert_eq!(value, Value::I64(3));
    }

    #[test]
    fn nested_maps() {
        let value = Value::map().with("speed", Value::map().with("base", 2.0f32).with("increment", 0.5f32));

        let speed = value.get("speed").unwrap();
        assert_eq!(speed.get("base").and_then(Value::as_f32), Some(2.0));
        assert_eq!(speed.get("increment").and_then(Value::as_f32), Some(0.5));
    }
}
