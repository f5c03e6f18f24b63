//! Configuration management for the FTP server
//!
//! Values are layered from serde defaults, an optional configuration file and
//! `SOLO_FTPD_*` environment variables. The control port given on the command
//! line always wins.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::ServerError;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "solo-ftpd";
/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "SOLO_FTPD";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address the control connection listens on
    pub bind_address: String,

    /// Port for the control connection
    pub control_port: u16,

    /// IPv4 address advertised and bound for PASV; discovered when unset
    pub pasv_address: Option<String>,

    /// Directory sessions start in and may not leave
    pub server_root: String,

    /// The single account allowed to log in
    pub username: String,

    /// Chunk size for file transfers
    pub buffer_size: usize,

    /// How long RETR/NLST wait for the client to open the data connection
    pub data_accept_timeout_secs: u64,

    /// Random ports tried before PASV gives up
    pub pasv_bind_attempts: usize,

    /// Maximum control line length, terminator included
    pub max_command_length: usize,

    /// Serve one control connection at a time instead of one task each
    pub serialize_sessions: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            control_port: 2121,
            pasv_address: None,
            server_root: ".".to_string(),
            username: "cs317".to_string(),
            buffer_size: 1024,
            data_accept_timeout_secs: 30,
            pasv_bind_attempts: 8,
            max_command_length: 1024,
            serialize_sessions: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `path`, or from `solo-ftpd.*` in the working
    /// directory when no path is given, with environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "bind_address {:?} is not an IP address",
                self.bind_address
            )));
        }

        if let Some(address) = &self.pasv_address {
            if address.parse::<Ipv4Addr>().is_err() {
                return Err(ConfigError::Message(format!(
                    "pasv_address {address:?} is not an IPv4 address"
                )));
            }
        }

        if self.server_root.is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::Message("username cannot be empty".into()));
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.data_accept_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "data_accept_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.pasv_bind_attempts == 0 {
            return Err(ConfigError::Message(
                "pasv_bind_attempts must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    /// Get the data connection accept timeout as Duration
    pub fn data_accept_timeout(&self) -> Duration {
        Duration::from_secs(self.data_accept_timeout_secs)
    }

    /// The configured passive address, if one is set and valid.
    pub fn pasv_ip(&self) -> Option<Ipv4Addr> {
        self.pasv_address
            .as_deref()
            .and_then(|address| address.parse().ok())
    }
}
