use std::fmt;

use thiserror::Error;

/// Why a single setting failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldErrorKind {
    /// Required and not defined by any source.
    Missing,
    /// The value does not have, and cannot be converted to, the declared type.
    TypeMismatch { expected: String, found: String },
    /// Present in the configuration but not declared in the schema.
    UnknownKey,
    /// The validated settings do not fit the requested application type.
    Deserialize(String),
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Missing => f.write_str("field required"),
            FieldErrorKind::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            FieldErrorKind::UnknownKey => f.write_str("unknown key"),
            FieldErrorKind::Deserialize(message) => f.write_str(message),
        }
    }
}

/// A validation failure of one setting, addressed by its key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, FieldErrorKind::Missing)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Every field error of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid setting(s):\n{}", .errors.len(), render(.errors))]
pub struct DictLoadError {
    errors: Vec<FieldError>,
}

impl DictLoadError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Paths of all required settings that were not defined.
    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(|e| e.kind == FieldErrorKind::Missing)
            .map(|e| e.path.as_str())
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A schema that cannot be used for validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field path '{0}' has an empty segment")]
    InvalidPath(String),

    #[error("field '{nested}' is nested under field '{parent}'")]
    NestedUnderField { parent: String, nested: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_field() {
        let err = DictLoadError::new(vec![
            FieldError::missing("db.host"),
            FieldError::new(
                "db.port",
                FieldErrorKind::TypeMismatch {
                    expected: "integer".into(),
                    found: "string \"abc\"".into(),
                },
            ),
        ]);
        assert_eq!(
            err.to_string(),
            "2 invalid setting(s):\n  db.host: field required\n  db.port: expected integer, found string \"abc\""
        );
        assert_eq!(err.missing_fields().collect::<Vec<_>>(), ["db.host"]);
    }
}
