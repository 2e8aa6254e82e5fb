use std::fs;
use std::path::PathBuf;

use confme::config::{load_files, LoadOptions};
use confme::{
    Config, ConfigError, Error, Field, FieldError, FieldType, Format, Overrides, Schema, Settings,
};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn db_schema() -> Schema {
    Schema::builder()
        .field(Field::new("db.host", FieldType::String))
        .field(Field::new("db.port", FieldType::Integer).default_value(5432))
        .build()
        .unwrap()
}

fn build(dir: &TempDir, overrides: Overrides) -> Result<Settings, Error> {
    Config::builder()
        .with_file(dir.path().join("missing.yaml"))
        .with_file(dir.path().join("base.toml"))
        .require_file(true)
        .with_overrides(overrides)
        .build(&db_schema())
}

#[test]
fn missing_candidate_is_skipped_and_default_applied() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.toml", "[db]\nhost = \"a\"\n");

    let settings = build(&dir, Overrides::new()).unwrap();
    assert_eq!(
        serde_json::Value::Object(settings.as_mapping().clone()),
        json!({"db": {"host": "a", "port": 5432}})
    );
}

#[test]
fn command_line_override_wins() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.toml", "[db]\nhost = \"a\"\n");

    let settings = build(&dir, Overrides::new().set("db.port", 9999)).unwrap();
    assert_eq!(settings.get_i64("db.port"), Some(9999));
    assert_eq!(settings.get_str("db.host"), Some("a"));
}

#[test]
fn textual_override_is_converted() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.toml", "[db]\nhost = \"a\"\n");

    let overrides = Overrides::new().parse_assignment("db.port=9999").unwrap();
    let settings = build(&dir, overrides).unwrap();
    assert_eq!(settings.get_i64("db.port"), Some(9999));
}

#[test]
fn missing_required_field_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.toml", "[db]\nport = 1\n");

    match build(&dir, Overrides::new()) {
        Err(Error::Settings(err)) => {
            assert_eq!(err.errors(), [FieldError::missing("db.host")]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn no_candidate_exists() {
    let dir = TempDir::new().unwrap();
    match build(&dir, Overrides::new()) {
        Err(Error::Config(ConfigError::NoConfigFileFound { searched })) => {
            assert_eq!(searched.len(), 2);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn malformed_yaml_names_the_file() {
    let dir = TempDir::new().unwrap();
    let broken = write(&dir, "broken.yaml", "db:\n  host: [a\n  port: 1\n");
    let good = write(&dir, "good.toml", "[db]\nhost = \"a\"\n");

    match load_files(&[good, broken.clone()], &LoadOptions::default()) {
        Err(ConfigError::ParseError { path, format, .. }) => {
            assert_eq!(path, broken);
            assert_eq!(format, Format::Yaml);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn later_files_override_earlier_ones() {
    let dir = TempDir::new().unwrap();
    let base = write(
        &dir,
        "base.yaml",
        "db:\n  host: a\n  port: 1\nhosts: [x, y]\n",
    );
    let env = write(&dir, ".env", "LOG_LEVEL=debug\n");
    let local = write(&dir, "local.json", r#"{"db": {"port": 2}, "hosts": ["z"]}"#);

    let schema = Schema::builder()
        .field(Field::new("db.host", FieldType::String))
        .field(Field::new("db.port", FieldType::Integer))
        .field(Field::new("hosts", FieldType::list_of(FieldType::String)))
        .field(Field::new("LOG_LEVEL", FieldType::String).default_value("info"))
        .build()
        .unwrap();

    let settings = Config::builder()
        .with_files([base, env, local])
        .build(&schema)
        .unwrap();
    assert_eq!(settings.get_str("db.host"), Some("a"));
    assert_eq!(settings.get_i64("db.port"), Some(2));
    assert_eq!(settings.get_list("hosts"), Some(&[json!("z")][..]));
    assert_eq!(settings.get_str("LOG_LEVEL"), Some("debug"));
}

#[test]
fn validating_settings_twice_is_stable() {
    let dir = TempDir::new().unwrap();
    write(&dir, "base.toml", "[db]\nhost = \"a\"\nport = \"6000\"\n");

    let first = build(&dir, Overrides::new()).unwrap();
    let second = db_schema().validate(first.as_mapping()).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.get_i64("db.port"), Some(6000));
}
