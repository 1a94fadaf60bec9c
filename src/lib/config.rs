//! Server settings, layered from defaults, an optional TOML file and the
//! environment.
use std::{
    net::{AddrParseError, SocketAddr},
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Names the settings file to read instead of [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_FILE_VAR: &str = "SKRIBE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "skribe.toml";
pub const DEFAULT_PORT: u16 = 8080;

const ENV_PREFIX: &str = "SKRIBE";

/// Settings for the server binary.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// The SQLite database file.
    pub database_path: PathBuf,
    /// The directory holding `index.html` and the rest of the frontend.
    pub static_dir: PathBuf,
    /// When set, logs go to a daily rolling file in this directory instead of stdout.
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Loads the settings from the file named by `SKRIBE_CONFIG` (if it
    /// exists), `SKRIBE_*` variables and finally `PORT`.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());

        Self::from_sources(Path::new(&file), std::env::var("PORT").ok())
    }

    /// Builds the settings from an optional file and an optional port override.
    pub fn from_sources(file: &Path, port: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("database_path", "./notes.db")?
            .set_default("static_dir", "./frontend")?
            .add_source(
                File::from(file)
                    .required(false)
                    .format(FileFormat::Toml),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX));

        // PORT is what hosting platforms set, so it wins over everything else.
        if let Some(port) = port.filter(|port| !port.is_empty()) {
            builder = builder.set_override("port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    /// The address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
