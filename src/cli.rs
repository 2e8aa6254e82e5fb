//! Command-line options for applications built on [`clap`].
//!
//! Flatten [`ConfigArgs`] into an application's parser to get `--config`
//! and `--set` options:
//!
//! ```
//! use clap::Parser;
//! use confme::{Config, ConfigArgs};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     config: ConfigArgs,
//! }
//!
//! let cli = Cli::parse_from(["app", "--config", "local.toml", "--set", "db.port=9999"]);
//! let builder = cli.config.apply(Config::builder().with_file("/etc/app/config.toml"))?;
//! # let _ = builder;
//! # Ok::<(), confme::config::OverrideError>(())
//! ```

use std::path::PathBuf;

use clap::Args;

use crate::config::{Config, OverrideError, Overrides};

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file to load; may be repeated, later files take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Override a setting, e.g. `--set db.port=5433`; may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl ConfigArgs {
    /// Parses the `--set` assignments, later ones winning.
    pub fn overrides(&self) -> Result<Overrides, OverrideError> {
        self.set
            .iter()
            .try_fold(Overrides::new(), |overrides, assignment| {
                overrides.parse_assignment(assignment)
            })
    }

    /// Appends the `--config` files after the builder's own candidates and
    /// registers the `--set` values as overrides.
    ///
    /// Every `--config` file must exist; loading fails with
    /// [`ConfigError::FileNotFound`](crate::ConfigError::FileNotFound)
    /// for the first one that does not.
    pub fn apply(&self, config: Config) -> Result<Config, OverrideError> {
        let overrides = self.overrides()?;
        let config = self
            .config
            .iter()
            .fold(config, |config, path| config.with_required_file(path));
        Ok(config.with_overrides(overrides))
    }
}
