//! # configs
//!
//! Layered application settings: built-in defaults, then an optional
//! `meritboard.toml`, then environment variables (`MERITBOARD__` prefix,
//! `__` as the section separator). Secrets are wrapped in `SecretString`
//! so they never land in debug output or logs.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub documents: DocumentSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct DocumentSettings {
    pub root_path: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub token_secret: SecretString,
}

impl Settings {
    /// Loads settings from defaults, the optional config file, and the
    /// environment. Call `dotenvy::dotenv()` before this if a `.env`
    /// file should feed the environment layer.
    pub fn load() -> Result<Settings, SettingsError> {
        Self::load_from("meritboard.toml")
    }

    pub fn load_from(path: &str) -> Result<Settings, SettingsError> {
        debug!(config_file = path, "loading settings");
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("documents.root_path", "./data/documents")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MERITBOARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
