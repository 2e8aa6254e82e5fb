//! Detection of configuration file formats.

use std::fmt;
use std::path::Path;

use super::parse::parse_any;

/// Known configuration data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    Json,
    Toml,
    Yaml,
    /// Flat `KEY=value` lines with string values. `$VAR` and `${VAR}` are
    /// kept literally; nothing is read from the process environment.
    Dotenv,
    /// Not determined; the content decides which parser applies.
    #[default]
    Unknown,
}

impl Format {
    /// Formats in the order they are tried when the format is not known up front.
    pub const PROBE_ORDER: [Format; 4] = [Format::Json, Format::Toml, Format::Yaml, Format::Dotenv];

    /// Determines the format from the file name alone.
    ///
    /// | Suffix | Format |
    /// | ------ | ------ |
    /// | `.json`, `.jsn` | JSON |
    /// | `.toml`, `.tml`, `.ini`, `.config`, `.cfg` | TOML |
    /// | `.yaml`, `.yml` | YAML |
    /// | `.env`, or a file named `.env` / `.env.*` | dotenv |
    ///
    /// Anything else is [`Format::Unknown`].
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if file_name == ".env" || file_name.starts_with(".env.") {
            return Format::Dotenv;
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" | "jsn" => Format::Json,
            "toml" | "tml" | "ini" | "config" | "cfg" => Format::Toml,
            "yaml" | "yml" => Format::Yaml,
            "env" => Format::Dotenv,
            _ => Format::Unknown,
        }
    }

    /// Determines the format by parsing `content` with each known parser in
    /// [`PROBE_ORDER`](Self::PROBE_ORDER) until one yields a mapping.
    pub fn sniff(content: &str) -> Self {
        parse_any(content)
            .map(|(format, _)| format)
            .unwrap_or(Format::Unknown)
    }

    pub fn is_known(self) -> bool {
        self != Format::Unknown
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Yaml => "YAML",
            Format::Dotenv => "dotenv",
            Format::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Determines the format of a config file from its path.
pub fn determine_config_file_type(path: impl AsRef<Path>) -> Format {
    Format::from_path(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        let cases = [
            ("settings.json", Format::Json),
            ("settings.JSN", Format::Json),
            ("settings.toml", Format::Toml),
            ("my_config.ini", Format::Toml),
            ("app.cfg", Format::Toml),
            ("app.config", Format::Toml),
            ("conf/app.YML", Format::Yaml),
            ("app.yaml", Format::Yaml),
            ("prod.env", Format::Dotenv),
            (".env", Format::Dotenv),
            ("/srv/app/.env.local", Format::Dotenv),
            ("README", Format::Unknown),
            ("notes.txt", Format::Unknown),
        ];
        for (path, expected) in cases {
            assert_eq!(determine_config_file_type(path), expected, "{path}");
        }
    }

    #[test]
    fn test_sniff_content() {
        assert_eq!(Format::sniff(r#"{"a": 1}"#), Format::Json);
        assert_eq!(Format::sniff("[server]\nport = 8080\n"), Format::Toml);
        assert_eq!(Format::sniff("server:\n  port: 8080\n"), Format::Yaml);
        assert_eq!(Format::sniff("PORT=8080\nHOST=localhost\n"), Format::Dotenv);
        assert_eq!(Format::sniff("just some prose"), Format::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(Format::Toml.to_string(), "TOML");
        assert_eq!(Format::Dotenv.to_string(), "dotenv");
    }
}
