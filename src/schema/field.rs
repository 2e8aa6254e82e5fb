use std::fmt;

use serde_json::Value;

/// Declared type of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List(Box<FieldType>),
    /// A free-form mapping; its contents are not validated.
    Map,
    /// Any value is accepted as is.
    Any,
}

impl FieldType {
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("string"),
            FieldType::Integer => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::List(item) => write!(f, "list of {item}"),
            FieldType::Map => f.write_str("mapping"),
            FieldType::Any => f.write_str("any"),
        }
    }
}

/// One entry of a [`Schema`](super::Schema), addressed by a dotted key path.
///
/// Fields are required unless they have a default or are marked optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    path: String,
    field_type: FieldType,
    default: Option<Value>,
    required: bool,
    description: Option<String>,
}

impl Field {
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path: path.into(),
            field_type,
            default: None,
            required: true,
            description: None,
        }
    }

    /// Value used when no source defines the field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the field as optional: when absent and without default it is
    /// simply left out of the settings.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required && self.default.is_none()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn segments(&self) -> Vec<String> {
        self.path.split('.').map(str::to_string).collect()
    }
}
