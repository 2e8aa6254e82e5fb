use crate::config::{ConfigError, OverrideError};
use crate::schema::DictLoadError;
use thiserror::Error;

/// Top-level error type for the confme library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid override: {0}")]
    Override(#[from] OverrideError),

    #[error(transparent)]
    Settings(#[from] DictLoadError),
}
