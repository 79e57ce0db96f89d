use crate::credentials::Credentials;
use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Deserialize)]
pub struct MyGeotabConfig {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    /// Overall request timeout; unset means the transport default (none).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl MyGeotabConfig {
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(
            self.username.clone(),
            self.password.clone(),
            self.database.clone(),
            self.session_id.clone(),
            self.server.clone(),
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for MyGeotabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MyGeotabConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("session_id", &self.session_id.as_ref().map(|_| "[REDACTED]"))
            .field("server", &self.server)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mygeotab: MyGeotabConfig,
}

impl Config {
    /// Load `config.toml` from the working directory.
    pub fn new() -> Result<Self> {
        Self::from_file(CONFIG_FILE)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)?;
        let config = Self::from_toml(&config_str)?;
        info!("Config loaded from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }
}
