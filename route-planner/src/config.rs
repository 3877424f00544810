//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::planner::PlannerConfig;

/// Error reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read planner config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse planner config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_TOPOLOGY: &str = "data/sevilla.json";
const DEFAULT_REFRESH_SECS: u64 = 24 * 60 * 60;

/// Process-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on (`PLANNER_BIND`).
    pub bind: SocketAddr,

    /// Topology JSON file (`PLANNER_TOPOLOGY`).
    pub topology_path: PathBuf,

    /// Interval between topology reloads (`PLANNER_REFRESH_SECS`).
    pub refresh_interval: Duration,

    /// Optional planner config JSON file (`PLANNER_CONFIG`).
    pub planner_config_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Read settings from environment variables, with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its
    /// value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("PLANNER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidVar {
                var: "PLANNER_BIND",
                value: bind_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let refresh_secs = match lookup("PLANNER_REFRESH_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::InvalidVar {
                        var: "PLANNER_REFRESH_SECS",
                        value: raw,
                        reason: "must be positive".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::InvalidVar {
                        var: "PLANNER_REFRESH_SECS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
            None => DEFAULT_REFRESH_SECS,
        };

        Ok(Self {
            bind,
            topology_path: lookup("PLANNER_TOPOLOGY")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOPOLOGY)),
            refresh_interval: Duration::from_secs(refresh_secs),
            planner_config_path: lookup("PLANNER_CONFIG").map(PathBuf::from),
        })
    }

    /// The planner config: read from `planner_config_path` if set, else
    /// defaults.
    pub fn planner_config(&self) -> Result<PlannerConfig, ConfigError> {
        match &self.planner_config_path {
            Some(path) => load_planner_config(path),
            None => Ok(PlannerConfig::default()),
        }
    }
}

/// Read a planner config JSON file.
pub fn load_planner_config(path: &Path) -> Result<PlannerConfig, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    PlannerConfig::from_json(&json).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
