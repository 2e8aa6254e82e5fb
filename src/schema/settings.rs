use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{DictLoadError, FieldError, FieldErrorKind};
use crate::config::{lookup, Mapping};

/// Validated settings: exactly the schema's fields, converted to their
/// declared types.
///
/// Settings are only produced by a [`Validator`](super::Validator) and offer
/// no way to modify them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: Mapping,
}

impl Settings {
    pub(crate) fn new(values: Mapping) -> Self {
        Self { values }
    }

    /// Returns the value at a dotted key path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.values, path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_list(&self, path: &str) -> Option<&[Value]> {
        self.get(path).and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }

    /// Deserializes the settings into an application type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DictLoadError> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(|e| {
            DictLoadError::new(vec![FieldError::new(
                "",
                FieldErrorKind::Deserialize(e.to_string()),
            )])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => Settings::new(map),
            other => panic!("not a mapping: {other}"),
        }
    }

    #[test]
    fn test_typed_accessors() {
        let s = settings(json!({
            "db": {"host": "a", "port": 5432, "ratio": 0.5, "tls": true},
            "tags": ["x"]
        }));
        assert_eq!(s.get_str("db.host"), Some("a"));
        assert_eq!(s.get_i64("db.port"), Some(5432));
        assert_eq!(s.get_f64("db.ratio"), Some(0.5));
        assert_eq!(s.get_bool("db.tls"), Some(true));
        assert_eq!(s.get_list("tags"), Some(&[json!("x")][..]));
        assert_eq!(s.get_i64("db.host"), None);
        assert!(!s.contains("db.user"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Db {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct AppConfig {
        db: Db,
    }

    #[test]
    fn test_deserialize_into_struct() {
        let s = settings(json!({"db": {"host": "a", "port": 5432}}));
        let config: AppConfig = s.deserialize().unwrap();
        assert_eq!(
            config,
            AppConfig {
                db: Db {
                    host: "a".into(),
                    port: 5432
                }
            }
        );
    }

    #[test]
    fn test_deserialize_failure_is_reported() {
        let s = settings(json!({"db": {"host": "a", "port": 70000}}));
        let err = s.deserialize::<AppConfig>().unwrap_err();
        assert!(matches!(
            err.errors()[0].kind,
            FieldErrorKind::Deserialize(_)
        ));
    }
}
