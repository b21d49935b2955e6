//! Client configuration.
//!
//! Read from a TOML file at `$DENVR_CONFIG`, falling back to
//! `~/.config/denvr.toml`:
//!
//! ```toml
//! [defaults]
//! server = "https://api.cloud.denvrdata.com"
//!
//! [credentials]
//! username = "me@example.com"
//! password = "..."
//! ```
//!
//! `DENVR_USERNAME` and `DENVR_PASSWORD` override the credentials section.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default control-plane endpoint.
pub const DEFAULT_SERVER: &str = "https://api.cloud.denvrdata.com";

/// Errors while locating or parsing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no credentials configured (set [credentials] or DENVR_USERNAME/DENVR_PASSWORD)")]
    MissingCredentials,
}

/// Top-level config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DenvrConfig {
    #[serde(default)]
    pub defaults: Defaults,
    pub credentials: Option<Credentials>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_server")]
    pub server: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            server: default_server(),
        }
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

/// `[credentials]` section.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DenvrConfig {
    /// Load the config from the default location, then apply env overrides.
    ///
    /// A missing file is not an error; the defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_path();
        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            _ => {
                debug!(path = ?path, "No config file, using defaults");
                Self::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a specific config file (no env overrides).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config pointing at `server` with the given credentials.
    pub fn with_server(server: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            defaults: Defaults {
                server: server.into(),
            },
            credentials: Some(credentials),
        }
    }

    /// Override credentials from `DENVR_USERNAME` / `DENVR_PASSWORD`.
    pub fn apply_env(&mut self) {
        if let (Ok(username), Ok(password)) = (
            std::env::var("DENVR_USERNAME"),
            std::env::var("DENVR_PASSWORD"),
        ) {
            self.credentials = Some(Credentials { username, password });
        }
    }

    /// Server URL without a trailing slash.
    pub fn server(&self) -> &str {
        self.defaults.server.trim_end_matches('/')
    }
}

fn default_path() -> Option<PathBuf> {
    match std::env::var_os("DENVR_CONFIG") {
        Some(path) => Some(PathBuf::from(path)),
        None => dirs::home_dir().map(|home| home.join(".config").join("denvr.toml")),
    }
}
