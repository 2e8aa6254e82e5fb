//! Declarative settings schemas and validation into typed settings.

mod error;
mod field;
mod settings;
mod validate;

use std::collections::{BTreeSet, HashMap};

pub use error::{DictLoadError, FieldError, FieldErrorKind, SchemaError};
pub use field::{Field, FieldType};
pub use settings::Settings;
pub use validate::{Coercion, UnknownKeys, Validator};

use crate::config::Mapping;

/// The settings an application expects: names, types, defaults and
/// required flags.
///
/// ```
/// use confme::{Field, FieldType, Schema};
///
/// let schema = Schema::builder()
///     .field(Field::new("db.host", FieldType::String))
///     .field(Field::new("db.port", FieldType::Integer).default_value(5432))
///     .build()?;
/// assert_eq!(schema.fields().len(), 2);
/// # Ok::<(), confme::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    /// Key paths that contain declared fields, e.g. `db` for `db.host`.
    parents: BTreeSet<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, path: &str) -> Option<&Field> {
        self.index.get(path).map(|&i| &self.fields[i])
    }

    pub(crate) fn is_parent(&self, path: &str) -> bool {
        self.parents.contains(path)
    }

    /// Validates `mapping` with the default [`Validator`].
    pub fn validate(&self, mapping: &Mapping) -> Result<Settings, DictLoadError> {
        Validator::default().validate(self, mapping)
    }

    /// Renders the schema as a Markdown table for user documentation.
    pub fn describe(&self) -> String {
        let mut out = String::from(
            "| Setting | Type | Default | Required | Description |\n\
             | ------- | ---- | ------- | -------- | ----------- |\n",
        );
        for field in &self.fields {
            let default = field
                .default()
                .map(|value| format!("`{value}`"))
                .unwrap_or_default();
            let required = if field.is_required() { "yes" } else { "no" };
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                field.path(),
                field.field_type(),
                default,
                required,
                field.description().unwrap_or_default().replace('|', "\\|"),
            ));
        }
        out
    }
}

#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Checks that every path is well formed, unique, and not nested under
    /// another field.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut index = HashMap::with_capacity(self.fields.len());
        let mut parents = BTreeSet::new();

        for (i, field) in self.fields.iter().enumerate() {
            let path = field.path();
            if path.split('.').any(str::is_empty) {
                return Err(SchemaError::InvalidPath(path.to_string()));
            }
            if index.insert(path.to_string(), i).is_some() {
                return Err(SchemaError::DuplicateField(path.to_string()));
            }
            let mut prefix = String::new();
            for segment in path.split('.').take(path.split('.').count() - 1) {
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(segment);
                parents.insert(prefix.clone());
            }
        }

        for field in &self.fields {
            if parents.contains(field.path()) {
                let nested = self
                    .fields
                    .iter()
                    .map(Field::path)
                    .find(|other| {
                        other
                            .strip_prefix(field.path())
                            .is_some_and(|rest| rest.starts_with('.'))
                    })
                    .unwrap_or_default();
                return Err(SchemaError::NestedUnderField {
                    parent: field.path().to_string(),
                    nested: nested.to_string(),
                });
            }
        }

        Ok(Schema {
            fields: self.fields,
            index,
            parents,
        })
    }
}
