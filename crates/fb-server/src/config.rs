//! Server configuration
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - An optional TOML file (`--config`)
//! - Command line flags

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fb_core::BuilderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port
pub const DEFAULT_PORT: u16 = 3000;

/// Default record store file
pub const DEFAULT_DATA_FILE: &str = "data/form-builder.json";

/// Default static lists file served at `/api/lists`
pub const DEFAULT_LISTS_FILE: &str = "data/lists.json";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`ServerConfig`]
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Record store file
    pub data_file: PathBuf,
    /// Lists file served read-only
    pub lists_file: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Builder service settings
    pub builder: BuilderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            lists_file: PathBuf::from(DEFAULT_LISTS_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
            builder: BuilderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Unreadable or invalid file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With bind port
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// With bind host
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// With record store file
    #[inline]
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// With lists file
    #[inline]
    #[must_use]
    pub fn with_lists_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lists_file = path.into();
        self
    }

    /// `host:port`
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("fb-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Form builder editor server")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Bind host"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_parser(value_parser!(u16))
                .help("Bind port"),
        )
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .value_parser(value_parser!(PathBuf))
                .help("Record store file"),
        )
        .arg(
            Arg::new("lists-file")
                .long("lists-file")
                .value_parser(value_parser!(PathBuf))
                .help("Lists file served at /api/lists"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .action(ArgAction::SetTrue)
                .help("Emit JSON log lines"),
        )
        .arg(
            Arg::new("autosave-ms")
                .long("autosave-ms")
                .value_parser(value_parser!(u64))
                .help("Debounce for autosaved text edits"),
        )
}

/// Resolve configuration from parsed arguments
///
/// # Errors
/// Unreadable or invalid `--config` file.
pub fn from_matches(matches: &ArgMatches) -> Result<ServerConfig, ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = matches.get_one::<String>("host") {
        config.host.clone_from(host);
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(path) = matches.get_one::<PathBuf>("data-file") {
        config.data_file.clone_from(path);
    }
    if let Some(path) = matches.get_one::<PathBuf>("lists-file") {
        config.lists_file.clone_from(path);
    }
    if let Some(filter) = matches.get_one::<String>("log") {
        config.log_filter.clone_from(filter);
    }
    if matches.get_flag("json-logs") {
        config.json_logs = true;
    }
    if let Some(millis) = matches.get_one::<u64>("autosave-ms") {
        config.builder = config.builder.with_autosave_debounce_ms(*millis);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.data_file, PathBuf::from("data/form-builder.json"));
        assert_eq!(config.builder.autosave_debounce_ms, 500);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            "port = 8080\n[builder]\nautosave_debounce_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.builder.autosave_debounce_ms, 250);
        assert!(config.builder.seed_default_lists);
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "port = 8080\nhost = \"0.0.0.0\"\n").unwrap();

        let matches = command()
            .try_get_matches_from([
                "fb-server",
                "--config",
                path.to_str().unwrap(),
                "--port",
                "9000",
                "--json-logs",
            ])
            .unwrap();
        let config = from_matches(&matches).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert!(config.json_logs);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ServerConfig::load(Path::new("/nonexistent/server.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
