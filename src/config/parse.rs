//! Per-format parsers turning document text into a raw [`Mapping`].
//!
//! Parsers never coerce values beyond what their format encodes natively:
//! dotenv values stay strings, TOML datetimes become their string form.
//! Non-finite floats (`.nan`, `inf`) are a parse error.

use std::path::Path;

use serde_json::{Map, Number, Value};

use super::error::Location;
use super::{ConfigError, Format, Mapping};

#[derive(Debug)]
struct SyntaxError {
    message: String,
    location: Option<Location>,
}

impl SyntaxError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    fn into_config_error(self, path: &Path, format: Format) -> ConfigError {
        ConfigError::ParseError {
            path: path.to_path_buf(),
            format,
            message: self.message,
            location: self.location,
        }
    }
}

/// Parses `content` as `format`.
///
/// `path` only labels errors. With [`Format::Unknown`] every known parser is
/// tried and [`ConfigError::UnsupportedFormat`] is returned if none succeeds.
pub fn parse(content: &str, format: Format, path: &Path) -> Result<Mapping, ConfigError> {
    if format == Format::Unknown {
        return parse_any(content)
            .map(|(_, mapping)| mapping)
            .ok_or_else(|| ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
    }
    parse_as(content, format).map_err(|e| e.into_config_error(path, format))
}

/// Tries each format of [`Format::PROBE_ORDER`] and returns the first that
/// yields a mapping.
pub(crate) fn parse_any(content: &str) -> Option<(Format, Mapping)> {
    Format::PROBE_ORDER.into_iter().find_map(|format| {
        parse_as(content, format)
            .ok()
            .map(|mapping| (format, mapping))
    })
}

fn parse_as(content: &str, format: Format) -> Result<Mapping, SyntaxError> {
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match format {
        Format::Json => parse_json(content),
        Format::Toml => parse_toml(content),
        Format::Yaml => parse_yaml(content),
        Format::Dotenv => parse_dotenv(content),
        Format::Unknown => Err(SyntaxError::new("format could not be determined")),
    }
}

fn parse_json(content: &str) -> Result<Mapping, SyntaxError> {
    let value: Value = serde_json::from_str(content).map_err(|e| SyntaxError {
        message: e.to_string(),
        location: Some(Location {
            line: e.line(),
            column: e.column(),
        }),
    })?;
    into_mapping(value)
}

fn parse_toml(content: &str) -> Result<Mapping, SyntaxError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| SyntaxError {
        message: e.message().trim().to_string(),
        location: e
            .span()
            .map(|span| Location::from_offset(content, span.start)),
    })?;
    from_toml_table(table)
}

fn parse_yaml(content: &str) -> Result<Mapping, SyntaxError> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| SyntaxError {
        message: e.to_string(),
        location: e.location().map(|loc| Location {
            line: loc.line(),
            column: loc.column(),
        }),
    })?;
    if value.is_null() {
        return Ok(Mapping::new());
    }
    into_mapping(from_yaml(value)?)
}

fn parse_dotenv(content: &str) -> Result<Mapping, SyntaxError> {
    let mut mapping = Mapping::new();
    for entry in dotenv_entries(content) {
        for item in dotenvy::from_read_iter(entry.text.as_bytes()) {
            match item {
                Ok((key, value)) => {
                    mapping.insert(key, Value::String(value));
                }
                Err(dotenvy::Error::LineParse(fragment, index)) => {
                    return Err(SyntaxError {
                        message: format!("invalid line '{}'", content[entry.span.clone()].trim()),
                        location: Some(Location::from_offset(
                            content,
                            entry.source_offset(&fragment, index),
                        )),
                    });
                }
                Err(e) => return Err(SyntaxError::new(e.to_string())),
            }
        }
    }
    Ok(mapping)
}

/// One logical dotenv line, with every `$` that dotenvy would substitute
/// escaped as `\$`.
#[derive(Debug, Default)]
struct DotenvEntry {
    text: String,
    /// Byte offset in the source of each char of `text`.
    origin: Vec<usize>,
    span: std::ops::Range<usize>,
}

impl DotenvEntry {
    fn push(&mut self, c: char, offset: usize) {
        self.text.push(c);
        self.origin.push(offset);
    }

    /// Maps a dotenvy error position back into the source. dotenvy reports
    /// either the whole line or the trimmed value, both suffixes of the line.
    fn source_offset(&self, fragment: &str, index: usize) -> usize {
        let line = self.text.trim_end().chars().count();
        let prefix = line.saturating_sub(fragment.trim_end().chars().count());
        self.origin
            .get(prefix + index)
            .copied()
            .unwrap_or(self.span.end)
    }
}

/// Splits dotenv text into logical lines the way dotenvy does (quoted
/// values may span lines, comments are dropped) and escapes `$` outside
/// single quotes so values come back exactly as written.
fn dotenv_entries(content: &str) -> Vec<DotenvEntry> {
    #[derive(Clone, Copy, PartialEq)]
    enum Split {
        Complete,
        Escape,
        Space,
        Weak,
        WeakEscape,
        Strong,
        StrongEscape,
    }

    let mut entries = Vec::new();
    let mut entry = DotenvEntry::default();
    let mut split = Split::Complete;
    // Quoting as dotenvy's value parser sees it.
    let (mut strong, mut weak, mut escaped) = (false, false, false);
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if entry.text.is_empty() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            entry.span.start = line_start;
        }

        let mut comment = false;
        for (pos, c) in line.char_indices() {
            let at = line_start + pos;
            split = match split {
                Split::Space if c == '#' => {
                    comment = true;
                    break;
                }
                Split::Escape => Split::Complete,
                Split::Complete | Split::Space => match c {
                    '\\' => Split::Escape,
                    '"' => Split::Weak,
                    '\'' => Split::Strong,
                    c if c.is_whitespace() && c != '\n' && c != '\r' => Split::Space,
                    _ => Split::Complete,
                },
                Split::Weak => match c {
                    '\\' => Split::WeakEscape,
                    '"' => Split::Complete,
                    _ => Split::Weak,
                },
                Split::WeakEscape => Split::Weak,
                Split::Strong => match c {
                    '\\' => Split::StrongEscape,
                    '\'' => Split::Complete,
                    _ => Split::Strong,
                },
                Split::StrongEscape => Split::Strong,
            };

            if escaped {
                escaped = false;
            } else if strong {
                strong = c != '\'';
            } else if c == '$' {
                entry.push('\\', at);
            } else if weak {
                match c {
                    '"' => weak = false,
                    '\\' => escaped = true,
                    _ => {}
                }
            } else {
                match c {
                    '\'' => strong = true,
                    '"' => weak = true,
                    '\\' => escaped = true,
                    _ => {}
                }
            }
            entry.push(c, at);
        }

        if comment || split == Split::Complete {
            while entry.text.ends_with(['\n', '\r']) {
                entry.text.pop();
                entry.origin.pop();
            }
            entry.span.end = entry.origin.last().map_or(line_start, |&at| {
                at + content[at..].chars().next().map_or(0, char::len_utf8)
            });
            entries.push(std::mem::take(&mut entry));
            split = Split::Complete;
            (strong, weak, escaped) = (false, false, false);
        }
    }

    if !entry.text.is_empty() {
        entry.span.end = content.len();
        entries.push(entry);
    }
    entries
}

fn into_mapping(value: Value) -> Result<Mapping, SyntaxError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SyntaxError::new(format!(
            "top level must be a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// NaN and infinities have no place in a mapping value and are rejected.
fn float(f: f64) -> Result<Value, SyntaxError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| SyntaxError::new(format!("unsupported non-finite float '{f}'")))
}

fn from_toml(value: toml::Value) -> Result<Value, SyntaxError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => float(f)?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_toml)
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(from_toml_table(table)?),
    })
}

fn from_toml_table(table: toml::Table) -> Result<Mapping, SyntaxError> {
    table
        .into_iter()
        .map(|(key, value)| Ok((key, from_toml(value)?)))
        .collect()
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, SyntaxError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                float(n.as_f64().unwrap_or(f64::NAN))?
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(yaml_key(key)?, from_yaml(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, SyntaxError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => Err(SyntaxError::new(
            "mapping keys must be scalars",
        )),
    }
}

/// Parses in-memory configuration text.
///
/// [`Format::Unknown`] infers the format from the content.
pub fn load_dict_from_str(content: &str, format: Format) -> Result<Mapping, ConfigError> {
    parse(content, format, Path::new("<string>"))
}
