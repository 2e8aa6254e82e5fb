use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::file::{load_files, ErrorHandling, LoadOptions};
use super::merge::deep_merge;
use super::{ConfigError, Format, Mapping, Overrides};
use crate::schema::{Schema, Settings, Validator};
use crate::Error;

/// Builder for loading settings from files, the environment and
/// command-line overrides.
///
/// Sources are merged with fixed precedence, lowest first:
///
/// 1. defaults given with [`with_defaults`](Self::with_defaults)
///    (schema defaults apply after merging, for keys still absent)
/// 2. files, in registration order, later files overriding earlier ones
/// 3. environment variables registered with [`with_env`](Self::with_env)
/// 4. overrides registered with [`with_overrides`](Self::with_overrides)
///
/// Nested mappings are merged recursively; other values (including
/// sequences) are replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use confme::{Config, Field, FieldType, Overrides, Schema};
///
/// let schema = Schema::builder()
///     .field(Field::new("db.host", FieldType::String))
///     .field(Field::new("db.port", FieldType::Integer).default_value(5432))
///     .build()?;
///
/// let settings = Config::builder()
///     .with_file("/etc/myapp/config.toml")
///     .with_file("config.yaml")
///     .require_file(true)
///     .with_env("MYAPP", "__")
///     .with_overrides(Overrides::new().set("db.port", 9999))
///     .build(&schema)?;
///
/// assert_eq!(settings.get_i64("db.port"), Some(9999));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    files: Vec<PathBuf>,
    required: Vec<PathBuf>,
    options: LoadOptions,
    defaults: Mapping,
    env: Vec<EnvSource>,
    overrides: Overrides,
    validator: Validator,
}

#[derive(Debug)]
struct EnvSource {
    prefix: String,
    separator: String,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a candidate configuration file. Missing files are skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_files<P: AsRef<Path>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.files
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Adds a configuration file that must exist. Loading fails with
    /// [`ConfigError::FileNotFound`] if it is missing.
    pub fn with_required_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.required.push(path.clone());
        self.files.push(path);
        self
    }

    /// If `true`, loading fails unless at least one candidate file exists.
    pub fn require_file(mut self, required: bool) -> Self {
        self.options.require_file = required;
        self
    }

    /// Parses every file as `format` instead of detecting it.
    pub fn with_format(mut self, format: Format) -> Self {
        self.options.format = format;
        self
    }

    pub fn error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.options.error_handling = error_handling;
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.options.max_file_size = bytes;
        self
    }

    /// Adds lowest-precedence values, merged below every file.
    pub fn with_defaults(mut self, defaults: Mapping) -> Self {
        deep_merge(&mut self.defaults, defaults);
        self
    }

    /// Reads environment variables named `<prefix><separator><path>` at load
    /// time, e.g. `MYAPP__DB__PORT` for `db.port`.
    ///
    /// Values stay strings; the validator converts them.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.env.push(EnvSource {
            prefix: prefix.into(),
            separator: separator.into(),
        });
        self
    }

    /// Adds highest-precedence values, typically from the command line.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Loads and merges all sources into one untyped mapping.
    pub fn load(&self) -> Result<Mapping, ConfigError> {
        for path in &self.required {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile(path.clone()));
            }
        }

        let mut merged = self.defaults.clone();

        for file in load_files(&self.files, &self.options)? {
            deep_merge(&mut merged, file.mapping);
        }

        for source in &self.env {
            let env = Overrides::from_env(&source.prefix, &source.separator);
            deep_merge(&mut merged, env.into_mapping());
        }

        deep_merge(&mut merged, self.overrides.as_mapping().clone());
        Ok(merged)
    }

    /// Loads all sources and validates the result against `schema`.
    pub fn build(self, schema: &Schema) -> Result<Settings, Error> {
        let merged = self.load()?;
        Ok(self.validator.validate(schema, &merged)?)
    }

    /// Like [`build`](Self::build), then deserializes into `T`.
    pub fn build_into<T: DeserializeOwned>(self, schema: &Schema) -> Result<T, Error> {
        Ok(self.build(schema)?.deserialize()?)
    }
}
