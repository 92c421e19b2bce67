//! Runtime configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! then `NOTEKEEPER__*` environment variables (`NOTEKEEPER__SERVER__PORT=9000`).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "notekeeper.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("notekeeper.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Send the session cookie only over HTTPS.
    pub secure: bool,
    pub inactivity_days: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secure: false,
            inactivity_days: 14,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let file = match path {
            Some(p) => File::from(p).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "database.path",
                defaults.database.path.to_string_lossy().into_owned(),
            )?
            .set_default("session.secure", defaults.session.secure)?
            .set_default("session.inactivity_days", defaults.session.inactivity_days)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("NOTEKEEPER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        use std::net::ToSocketAddrs;

        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("cannot resolve {}", self.server.host),
                )
            })
    }
}
