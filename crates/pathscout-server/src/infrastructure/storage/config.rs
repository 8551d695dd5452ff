//! TOML-based configuration for the server binary.
//!
//! Every field carries a serde default so the server runs correctly on
//! first start (before a config file exists) and with partial files that
//! only override a value or two. Example:
//!
//! ```toml
//! [network]
//! bind_address = "127.0.0.1"
//! port = 9090
//!
//! [protocol]
//! mask_key = 123
//!
//! [storage]
//! inventory_file = "environment_info.json"
//! audit_log = "env_history.log"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The bind address and port do not form a valid socket address.
    #[error("invalid listen address '{addr}': {source}")]
    InvalidListenAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: GeneralConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// General server behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level used when `RUST_LOG` is unset: `"error"`,
    /// `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Listener address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// IP address to bind the TCP listener to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port clients connect to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Wire protocol settings shared out-of-band with clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolConfig {
    /// Single-byte XOR mask key. Obfuscation only; clients must be
    /// configured with the same value.
    #[serde(default = "default_mask_key")]
    pub mask_key: u8,
}

/// On-disk file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Path of the persisted inventory document.
    #[serde(default = "default_inventory_file")]
    pub inventory_file: PathBuf,
    /// Path of the append-only settings audit log.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    9090
}
fn default_mask_key() -> u8 {
    pathscout_core::DEFAULT_MASK_KEY
}
fn default_inventory_file() -> PathBuf {
    PathBuf::from("environment_info.json")
}
fn default_audit_log() -> PathBuf {
    PathBuf::from("env_history.log")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            mask_key: default_mask_key(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            inventory_file: default_inventory_file(),
            audit_log: default_audit_log(),
        }
    }
}

impl ServerConfig {
    /// Combines the bind address and port into a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidListenAddr`] when `bind_address` is not
    /// a valid IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.network.bind_address, self.network.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidListenAddr { addr, source })
    }
}

// ── Config file access ────────────────────────────────────────────────────────

/// Loads a [`ServerConfig`] from `path`, returning `ServerConfig::default()`
/// if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ServerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
