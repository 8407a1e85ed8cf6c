//! Configuration system for Inlet.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $INLET_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/inlet/config.toml
//!   3. ~/.config/inlet/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InletConfig {
    pub api: ApiConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// TCP port the HTTP API binds on 127.0.0.1.
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max payload bytes in a single chunk.
    pub max_chunk_bytes: u64,
    /// Max accumulated bytes per session.
    pub max_session_bytes: u64,
    /// Idle seconds before an open session is expired by the janitor.
    pub idle_timeout_secs: u64,
    /// Terminal upload records retained per user.
    pub records_per_user: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for InletConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 9401 }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 64 * 1024,
            max_session_bytes: 256 * 1024 * 1024,
            idle_timeout_secs: 300,
            records_per_user: 256,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("inlet")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl InletConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            InletConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("INLET_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&InletConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply INLET_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("INLET_API__PORT") {
            if let Ok(p) = v.parse() {
                self.api.port = p;
            }
        }
        if let Ok(v) = std::env::var("INLET_LIMITS__MAX_CHUNK_BYTES") {
            if let Ok(n) = v.parse() {
                self.limits.max_chunk_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("INLET_LIMITS__MAX_SESSION_BYTES") {
            if let Ok(n) = v.parse() {
                self.limits.max_session_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("INLET_LIMITS__IDLE_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.limits.idle_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("INLET_LIMITS__RECORDS_PER_USER") {
            if let Ok(n) = v.parse() {
                self.limits.records_per_user = n;
            }
        }
    }
}
