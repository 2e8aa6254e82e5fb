//! Conversion of a merged mapping into [`Settings`].
//!
//! Validation never stops at the first problem: every missing field, type
//! mismatch and (optionally) unknown key is collected into one
//! [`DictLoadError`].

use serde_json::{Number, Value};

use super::{DictLoadError, FieldError, FieldErrorKind, FieldType, Schema, Settings};
use crate::config::{lookup, merge_at_path, Mapping};

/// How strictly values must match their declared types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coercion {
    /// Values must carry the declared type natively. Integers are accepted
    /// for float fields.
    Strict,
    /// Additionally converts text, as produced by dotenv files, environment
    /// variables and command-line overrides:
    ///
    /// - integer and float fields parse decimal strings;
    /// - boolean fields accept `true/false`, `yes/no`, `on/off` and `1/0`
    ///   in any case, as strings or as the integers 1 and 0;
    /// - list fields accept a JSON array or a comma-separated string;
    /// - string fields accept numbers and booleans in their text form;
    /// - integer fields accept floats without a fractional part.
    #[default]
    Lenient,
}

/// What to do with keys that the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Leave them out of the settings.
    #[default]
    Ignore,
    /// Report each as [`FieldErrorKind::UnknownKey`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    coercion: Coercion,
    unknown_keys: UnknownKeys,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    pub fn unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    /// Validates `mapping` against `schema`.
    ///
    /// An explicit `null` is treated like an absent key, so defaults apply.
    pub fn validate(&self, schema: &Schema, mapping: &Mapping) -> Result<Settings, DictLoadError> {
        let mut errors = Vec::new();
        let mut values = Mapping::new();

        for field in schema.fields() {
            let path = field.path();
            let value = match lookup(mapping, path).filter(|v| !v.is_null()) {
                Some(value) => value,
                None => match field.default() {
                    Some(default) => default,
                    None => {
                        if field.is_required() {
                            errors.push(FieldError::missing(path));
                        }
                        continue;
                    }
                },
            };

            if let Some(converted) = self.convert(value, field.field_type(), path, &mut errors) {
                merge_at_path(&mut values, &field.segments(), converted);
            }
        }

        if self.unknown_keys == UnknownKeys::Reject {
            collect_unknown(schema, mapping, "", &mut errors);
        }

        if errors.is_empty() {
            Ok(Settings::new(values))
        } else {
            Err(DictLoadError::new(errors))
        }
    }

    fn convert(
        &self,
        value: &Value,
        field_type: &FieldType,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<Value> {
        let lenient = self.coercion == Coercion::Lenient;
        let converted = match (field_type, value) {
            (FieldType::Any, value) => Some(value.clone()),
            (FieldType::Map, Value::Object(_)) => Some(value.clone()),

            (FieldType::String, Value::String(_)) => Some(value.clone()),
            (FieldType::String, Value::Number(n)) if lenient => Some(Value::String(n.to_string())),
            (FieldType::String, Value::Bool(b)) if lenient => Some(Value::String(b.to_string())),

            (FieldType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(value.clone())
            }
            (FieldType::Integer, Value::Number(n)) if lenient => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::Number((f as i64).into())),
            (FieldType::Integer, Value::String(s)) if lenient => {
                s.trim().parse::<i64>().ok().map(|i| Value::Number(i.into()))
            }

            (FieldType::Float, Value::Number(n)) => {
                n.as_f64().and_then(Number::from_f64).map(Value::Number)
            }
            (FieldType::Float, Value::String(s)) if lenient => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),

            (FieldType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldType::Boolean, Value::String(s)) if lenient => parse_bool(s).map(Value::Bool),
            (FieldType::Boolean, Value::Number(n)) if lenient => match n.as_i64() {
                Some(1) => Some(Value::Bool(true)),
                Some(0) => Some(Value::Bool(false)),
                _ => None,
            },

            (FieldType::List(item), Value::Array(items)) => {
                return self.convert_items(items, item, path, errors);
            }
            (FieldType::List(item), Value::String(s)) if lenient => match split_list(s) {
                Some(items) => return self.convert_items(&items, item, path, errors),
                None => None,
            },

            _ => None,
        };

        if converted.is_none() {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::TypeMismatch {
                    expected: field_type.to_string(),
                    found: describe(value),
                },
            ));
        }
        converted
    }

    fn convert_items(
        &self,
        items: &[Value],
        item_type: &FieldType,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Option<Value> {
        let before = errors.len();
        let converted: Vec<Value> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.convert(item, item_type, &format!("{path}[{i}]"), errors))
            .collect();
        (errors.len() == before).then_some(Value::Array(converted))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Splits list text: a JSON array, or comma-separated items as strings.
fn split_list(s: &str) -> Option<Vec<Value>> {
    let trimmed = s.trim();
    if trimmed.starts_with('[') {
        return match serde_json::from_str(trimmed) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        };
    }
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    Some(
        trimmed
            .split(',')
            .map(|item| Value::String(item.trim().to_string()))
            .collect(),
    )
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "a sequence".to_string(),
        Value::Object(_) => "a mapping".to_string(),
    }
}

fn collect_unknown(schema: &Schema, mapping: &Mapping, prefix: &str, errors: &mut Vec<FieldError>) {
    for (key, value) in mapping {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if schema.field(&path).is_some() {
            continue;
        }
        if schema.is_parent(&path) {
            if let Value::Object(nested) = value {
                collect_unknown(schema, nested, &path, errors);
            }
            continue;
        }
        errors.push(FieldError::new(path, FieldErrorKind::UnknownKey));
    }
}
