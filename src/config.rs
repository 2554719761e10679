//! Process configuration
//!
//! Backend selection is environment-driven, the way the deployment sets it:
//! `APP_ENV=production` targets the remote database, anything else the
//! embedded development file. An optional `fleetdb.toml` can supply defaults
//! that the environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Relative path of the development database file
pub const DEFAULT_DATABASE_FILE: &str = "vehicles.db";

/// Operating mode, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// "production" selects the remote backend; any other flag value,
    /// including an unset one, selects the embedded backend.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "production" {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_development(self) -> bool {
        self == Mode::Development
    }
}

/// Optional on-disk defaults (`fleetdb.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub database_file: Option<String>,
    pub database_url: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("fleetdb.toml")
}

pub fn load_file_config(path: Option<&Path>) -> Result<Option<FileConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))?;
    Ok(Some(config))
}

/// Resolved configuration for one process
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub database_file: PathBuf,
    pub database_url: Option<String>,
    pub auth_token: Option<String>,
}

impl Config {
    /// Read configuration from `.env`, the environment, and the default
    /// config file location.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = load_file_config(config_path)?.unwrap_or_default();
        let mode = Mode::from_flag(&env::var("APP_ENV").unwrap_or_default());

        let database_file = env::var("DATABASE_FILE")
            .ok()
            .or(file.database_file)
            .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());
        let database_url = env::var("DATABASE_URL").ok().or(file.database_url);
        let auth_token = env::var("DATABASE_AUTH_TOKEN").ok();

        let config = Config {
            mode,
            database_file: PathBuf::from(database_file),
            database_url,
            auth_token,
        };
        config.validate()?;
        Ok(config)
    }

    /// Development configuration pointing at a specific database file
    pub fn development(database_file: impl Into<PathBuf>) -> Self {
        Config {
            mode: Mode::Development,
            database_file: database_file.into(),
            database_url: None,
            auth_token: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.mode == Mode::Production {
            if self.database_url.is_none() {
                return Err(Error::Config("DATABASE_URL is required in production".into()));
            }
            if self.auth_token.is_none() {
                return Err(Error::Config(
                    "DATABASE_AUTH_TOKEN is required in production".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(Mode::from_flag("production"), Mode::Production);
        assert_eq!(Mode::from_flag("development"), Mode::Development);
        assert_eq!(Mode::from_flag(""), Mode::Development);
        assert_eq!(Mode::from_flag("staging"), Mode::Development);
    }

    #[test]
    fn test_file_config_parses() {
        let parsed: FileConfig =
            toml::from_str("database_file = \"fleet/dev.db\"\n").unwrap();
        assert_eq!(parsed.database_file.as_deref(), Some("fleet/dev.db"));
        assert!(parsed.database_url.is_none());
    }

    #[test]
    fn test_production_requires_credentials() {
        let config = Config {
            mode: Mode::Production,
            database_file: PathBuf::from(DEFAULT_DATABASE_FILE),
            database_url: None,
            auth_token: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_development_needs_no_credentials() {
        let config = Config::development("vehicles.db");
        assert!(config.validate().is_ok());
        assert!(config.mode.is_development());
    }
}
