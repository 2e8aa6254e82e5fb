use clap::Parser;
use confme::{Config, ConfigArgs, Field, FieldType, Schema};
use serde::Deserialize;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    app: AppSection,
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
struct AppSection {
    name: String,
    debug: bool,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    host: String,
    port: u16,
    name: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::builder()
        .field(Field::new("app.name", FieldType::String))
        .field(Field::new("app.debug", FieldType::Boolean).default_value(false))
        .field(Field::new("database.host", FieldType::String))
        .field(Field::new("database.port", FieldType::Integer).default_value(5432))
        .field(Field::new("database.name", FieldType::String).default_value("demo"))
        .build()?;

    // e.g. cargo run --example example -- --set database.port=6543
    let cli = Cli::parse();
    let config: AppConfig = cli
        .config
        .apply(
            Config::builder()
                .with_required_file("demos/default.toml")
                .with_file("demos/dev.yaml")
                .with_env("CONFME_DEMO", "__"),
        )?
        .build_into(&schema)?;

    println!("App: {} (debug={})", config.app.name, config.app.debug);
    println!(
        "Database: {}:{}/{}",
        config.database.host, config.database.port, config.database.name
    );

    Ok(())
}
