//! Highest-precedence values supplied by the command line or the environment.

use serde_json::Value;
use thiserror::Error;

use super::merge::merge_at_path;
use super::Mapping;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum OverrideError {
    #[error("override '{0}' is not of the form KEY=VALUE")]
    MissingSeparator(String),

    #[error("override '{0}' has an empty key segment")]
    InvalidKey(String),
}

/// A mapping of override values keyed by dotted path.
///
/// Values parsed from text stay strings; the settings validator decides how
/// they convert to the declared field types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    values: Mapping,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `value` at a dotted key path such as `db.port`.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Parses a `db.port=9999` assignment, as passed with `--set`.
    pub fn parse_assignment(mut self, assignment: &str) -> Result<Self, OverrideError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| OverrideError::MissingSeparator(assignment.to_string()))?;
        let key = key.trim();
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(OverrideError::InvalidKey(assignment.to_string()));
        }
        self.insert(key, Value::String(value.to_string()));
        Ok(self)
    }

    /// Merges an already nested mapping of overrides.
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        merge_at_path(&mut self.values, &[], Value::Object(mapping));
        self
    }

    /// Collects environment variables named `<prefix><separator><path>`.
    ///
    /// Path segments are split on the separator and lower-cased, so with
    /// prefix `APP` and separator `__`, `APP__DB__PORT=1` sets `db.port`.
    pub fn from_env(prefix: &str, separator: &str) -> Self {
        Self::from_vars(std::env::vars(), prefix, separator)
    }

    pub fn from_vars<I>(vars: I, prefix: &str, separator: &str) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::new();
        if separator.is_empty() {
            return overrides;
        }
        let prefix_with_sep = format!("{prefix}{separator}");

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            let path: Vec<String> = path_str
                .split(separator)
                .map(str::to_lowercase)
                .collect();
            if path.iter().any(String::is_empty) {
                continue;
            }
            merge_at_path(&mut overrides.values, &path, Value::String(value));
        }

        overrides
    }

    /// Merges `other` on top of these overrides.
    pub fn extend(&mut self, other: Overrides) {
        merge_at_path(&mut self.values, &[], Value::Object(other.values));
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.values
    }

    pub fn into_mapping(self) -> Mapping {
        self.values
    }

    fn insert(&mut self, path: &str, value: Value) {
        let path: Vec<String> = path.split('.').map(str::to_string).collect();
        merge_at_path(&mut self.values, &path, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_nested() {
        let overrides = Overrides::new().set("db.port", 9999).set("db.host", "b");
        assert_eq!(
            Value::Object(overrides.into_mapping()),
            json!({"db": {"port": 9999, "host": "b"}})
        );
    }

    #[test]
    fn test_parse_assignment_keeps_string() {
        let overrides = Overrides::new()
            .parse_assignment("db.port=9999")
            .unwrap()
            .parse_assignment("url=http://x/?a=b")
            .unwrap();
        assert_eq!(overrides.as_mapping()["db"]["port"], json!("9999"));
        assert_eq!(overrides.as_mapping()["url"], json!("http://x/?a=b"));
    }

    #[test]
    fn test_parse_assignment_errors() {
        assert_eq!(
            Overrides::new().parse_assignment("db.port"),
            Err(OverrideError::MissingSeparator("db.port".into()))
        );
        assert_eq!(
            Overrides::new().parse_assignment("db..port=1"),
            Err(OverrideError::InvalidKey("db..port=1".into()))
        );
        assert!(Overrides::new().parse_assignment("=1").is_err());
    }

    #[test]
    fn test_from_vars() {
        let vars = vec![
            ("APP__DB__HOST".to_string(), "localhost".to_string()),
            ("APP__DB__PORT".to_string(), "5432".to_string()),
            ("APP__".to_string(), "ignored".to_string()),
            ("APP__DB____X".to_string(), "ignored".to_string()),
            ("OTHER__DB__HOST".to_string(), "ignored".to_string()),
        ];
        let overrides = Overrides::from_vars(vars, "APP", "__");
        assert_eq!(
            Value::Object(overrides.into_mapping()),
            json!({"db": {"host": "localhost", "port": "5432"}})
        );
    }

    #[test]
    fn test_extend_later_wins() {
        let mut env = Overrides::new().set("db.port", "1").set("db.host", "a");
        env.extend(Overrides::new().set("db.port", "2"));
        assert_eq!(
            Value::Object(env.into_mapping()),
            json!({"db": {"port": "2", "host": "a"}})
        );
    }
}
