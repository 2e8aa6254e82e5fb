pub mod cli;
pub mod config;
mod error;
pub mod schema;

pub use cli::ConfigArgs;
pub use config::{Config, ConfigError, Format, Mapping, Overrides};
pub use error::Error;
pub use schema::{
    Coercion, DictLoadError, Field, FieldError, FieldErrorKind, FieldType, Schema, SchemaError,
    Settings, UnknownKeys, Validator,
};
