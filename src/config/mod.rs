//! Configuration discovery, parsing and merging.

mod builder;
mod error;
mod file;
mod format;
mod merge;
mod overrides;
mod parse;

pub use builder::Config;
pub use error::{ConfigError, Location};
pub use file::{
    load_dict_from_file, load_files, settings_config_load, settings_config_load_function,
    ErrorHandling, LoadOptions, LoadedFile, MAX_CONFIG_FILE_SIZE,
};
pub use format::{determine_config_file_type, Format};
pub use merge::{deep_merge, lookup, merge_all, merge_at_path};
pub use overrides::{OverrideError, Overrides};
pub use parse::load_dict_from_str;

/// An untyped configuration tree as produced by one source or by merging.
pub type Mapping = serde_json::Map<String, serde_json::Value>;
