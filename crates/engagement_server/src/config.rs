//! Server configuration.
//!
//! Values come from defaults, then an optional JSON file, then CLI flags.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Engagement counter HTTP service
#[derive(Parser, Debug, Default)]
#[command(name = "engagement_server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file (default: "./engagement.sqlite3")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Log level (default: build-mode dependent)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log directory; relative paths resolve against the working directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./engagement.sqlite3")
}

fn default_log_level() -> String {
    engagement_core::LogLevel::build_default().as_str().to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Loads a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the effective config from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match cli.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = &cli.host {
            config.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(database) = &cli.database {
            config.database_path = database.clone();
        }
        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }
        if let Some(log_dir) = &cli.log_dir {
            config.log_dir = log_dir.clone();
        }
        Ok(config)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Absolute log directory, as required by the logging bootstrap.
    pub fn resolved_log_dir(&self) -> std::io::Result<PathBuf> {
        if self.log_dir.is_absolute() {
            return Ok(self.log_dir.clone());
        }
        Ok(std::env::current_dir()?.join(&self.log_dir))
    }
}
