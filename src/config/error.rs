use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::Format;

/// Position of a syntax error inside a configuration document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Computes line and column of a byte offset into `content`.
    pub fn from_offset(content: &str, offset: usize) -> Self {
        let offset = offset.min(content.len());
        let before = &content.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        Self {
            line,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config path is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("no config file found, searched: {}", display_paths(.searched))]
    NoConfigFileFound { searched: Vec<PathBuf> },

    #[error("config file '{path}' is {size} bytes, exceeding the limit of {limit} bytes")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported format for config file '{path}'")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse {format} config '{path}'{}: {message}", display_location(.location))]
    ParseError {
        path: PathBuf,
        format: Format,
        message: String,
        location: Option<Location>,
    },
}

impl ConfigError {
    /// The file this error refers to, if it concerns a single file.
    pub fn path(&self) -> Option<&std::path::Path> {
        let path = match self {
            Self::FileNotFound(path) | Self::NotAFile(path) => path,
            Self::FileTooLarge { path, .. }
            | Self::ReadError { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::ParseError { path, .. } => path,
            Self::NoConfigFileFound { .. } => return None,
        };
        Some(path.as_path())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidates)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_location(location: &Option<Location>) -> String {
    location.map(|loc| format!(" at {loc}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let content = "a = 1\nb = \nc = 3\n";
        assert_eq!(
            Location::from_offset(content, 0),
            Location { line: 1, column: 1 }
        );
        assert_eq!(
            Location::from_offset(content, 10),
            Location { line: 2, column: 5 }
        );
    }

    #[test]
    fn test_parse_error_display_includes_location() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("conf.yaml"),
            format: Format::Yaml,
            message: "bad indentation".into(),
            location: Some(Location { line: 3, column: 7 }),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse YAML config 'conf.yaml' at line 3, column 7: bad indentation"
        );
    }

    #[test]
    fn test_no_config_file_found_lists_candidates() {
        let err = ConfigError::NoConfigFileFound {
            searched: vec![PathBuf::from("a.toml"), PathBuf::from("b.yaml")],
        };
        assert_eq!(err.to_string(), "no config file found, searched: a.toml, b.yaml");
        assert!(err.path().is_none());
    }
}
