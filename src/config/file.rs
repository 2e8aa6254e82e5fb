//! Loading of configuration files from disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::merge::merge_all;
use super::parse::{parse, parse_any};
use super::{ConfigError, Format, Mapping};

/// Files above this size are refused.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// What the loader does with a candidate file that exists but cannot be
/// read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log a warning and continue with the next candidate.
    Ignore,
}

/// Options shared by every file of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Forces a format for all files; [`Format::Unknown`] infers it per file.
    pub format: Format,
    /// Fail with [`ConfigError::NoConfigFileFound`] when no candidate exists.
    pub require_file: bool,
    pub error_handling: ErrorHandling,
    pub max_file_size: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: Format::Unknown,
            require_file: false,
            error_handling: ErrorHandling::Propagate,
            max_file_size: MAX_CONFIG_FILE_SIZE,
        }
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub format: Format,
    pub mapping: Mapping,
}

/// Loads a single configuration file into a raw mapping.
///
/// With [`Format::Unknown`] the format is taken from the file suffix, or, when
/// the suffix is not recognized, from the first parser that accepts the content.
pub fn load_dict_from_file(
    path: impl AsRef<Path>,
    format: Format,
    max_file_size: u64,
) -> Result<Mapping, ConfigError> {
    load_file(path.as_ref(), format, max_file_size).map(|loaded| loaded.mapping)
}

fn load_file(path: &Path, format: Format, max_file_size: u64) -> Result<LoadedFile, ConfigError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_file() {
        return Err(ConfigError::NotAFile(path.to_path_buf()));
    }
    if metadata.len() > max_file_size {
        return Err(ConfigError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_file_size,
        });
    }

    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let format = match format {
        Format::Unknown => Format::from_path(path),
        known => known,
    };
    let (format, mapping) = match format {
        Format::Unknown => parse_any(&contents).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?,
        known => (known, parse(&contents, known, path)?),
    };

    tracing::debug!("loaded {} config file {}", format, path.display());
    Ok(LoadedFile {
        path: path.to_path_buf(),
        format,
        mapping,
    })
}

/// Loads every existing file of `paths`, in order.
///
/// Candidates that do not exist are skipped. If `options.require_file` is set
/// and none of them exists, [`ConfigError::NoConfigFileFound`] is returned.
pub fn load_files<P>(paths: &[P], options: &LoadOptions) -> Result<Vec<LoadedFile>, ConfigError>
where
    P: AsRef<Path>,
{
    let mut loaded = Vec::with_capacity(paths.len());
    let mut found_any = false;

    for path in paths.iter().map(AsRef::as_ref) {
        if !path.is_file() {
            tracing::trace!("skipping missing config file {}", path.display());
            continue;
        }
        found_any = true;

        match load_file(path, options.format, options.max_file_size) {
            Ok(file) => loaded.push(file),
            Err(e) if options.error_handling == ErrorHandling::Ignore => {
                tracing::warn!("ignoring config file {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
    }

    if options.require_file && !found_any {
        return Err(ConfigError::NoConfigFileFound {
            searched: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
        });
    }

    Ok(loaded)
}

/// Loads `paths` and merges them, later files overriding earlier ones.
pub fn settings_config_load<P>(paths: &[P], options: &LoadOptions) -> Result<Mapping, ConfigError>
where
    P: AsRef<Path>,
{
    let files = load_files(paths, options)?;
    Ok(merge_all(files.into_iter().map(|file| file.mapping)))
}

/// Returns a reusable loader for a fixed set of candidate files.
///
/// Each call re-reads the files; nothing is cached between calls.
pub fn settings_config_load_function<P>(
    paths: impl IntoIterator<Item = P>,
    options: LoadOptions,
) -> impl Fn() -> Result<Mapping, ConfigError> + Send + Sync
where
    P: AsRef<Path>,
{
    let paths: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();
    move || settings_config_load(&paths, &options)
}
