//! Node configuration: role, listen address, peer set, and the tunable
//! timing knobs for the failure detector, replicator, and secondary delay.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::replication::BackoffConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Master,
    Slave,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::Slave => write!(f, "slave"),
        }
    }
}

/// The artificial pseudo-random response delay a slave may inject before
/// answering single-record produces. Disabled by
/// default; exists only to exercise the replicator's concurrency under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtificialDelayConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_delay_max_ms")]
    pub max_ms: u64,
}

impl Default for ArtificialDelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_ms: default_delay_max_ms(),
        }
    }
}

impl ArtificialDelayConfig {
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub role: Role,

    #[serde(default = "default_listen")]
    pub listen: String,

    /// Hostnames (or host:port pairs) of the secondaries. Ignored for a
    /// slave; populated from configuration for a master.
    #[serde(default)]
    pub peers: Vec<String>,

    #[serde(default = "default_probe_period_ms")]
    pub probe_period_ms: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_admission_window_ms")]
    pub admission_window_ms: u64,

    /// Bound on a single outbound peer request — replication delivery and
    /// anti-entropy sync alike. A peer that accepts the connection and
    /// never responds is treated as a transport failure once this elapses.
    #[serde(default = "default_replication_timeout_ms")]
    pub replication_timeout_ms: u64,

    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    #[serde(default)]
    pub artificial_delay: ArtificialDelayConfig,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_probe_period_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    2_500
}

fn default_admission_window_ms() -> u64 {
    5_000
}

fn default_replication_timeout_ms() -> u64 {
    5_000
}

fn default_backoff_initial_ms() -> u64 {
    100
}

fn default_backoff_max_ms() -> u64 {
    5_000
}

fn default_delay_max_ms() -> u64 {
    20_000
}

fn default_cors_origins() -> Vec<String> {
    Vec::new()
}

impl NodeConfig {
    pub fn master(listen: impl Into<String>, peers: Vec<String>) -> Self {
        Self {
            role: Role::Master,
            listen: listen.into(),
            peers,
            probe_period_ms: default_probe_period_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            admission_window_ms: default_admission_window_ms(),
            replication_timeout_ms: default_replication_timeout_ms(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            artificial_delay: ArtificialDelayConfig::default(),
            cors_origins: default_cors_origins(),
        }
    }

    pub fn slave(listen: impl Into<String>) -> Self {
        Self {
            role: Role::Slave,
            listen: listen.into(),
            peers: Vec::new(),
            ..Self::master(String::new(), Vec::new())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError::malformed(path.display().to_string(), e.to_string()))
    }

    pub fn probe_period(&self) -> Duration {
        Duration::from_millis(self.probe_period_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn admission_window(&self) -> Duration {
        Duration::from_millis(self.admission_window_ms)
    }

    pub fn replication_timeout(&self) -> Duration {
        Duration::from_millis(self.replication_timeout_ms)
    }

    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial: Duration::from_millis(self.backoff_initial_ms),
            max: Duration::from_millis(self.backoff_max_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Io,
    Malformed,
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub path: String,
    pub message: String,
}

impl ConfigError {
    fn io(path: String, message: String) -> Self {
        Self {
            kind: ConfigErrorKind::Io,
            path,
            message,
        }
    }

    fn malformed(path: String, message: String) -> Self {
        Self {
            kind: ConfigErrorKind::Malformed,
            path,
            message,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error at {}: {}", self.path, self.message)
    }
}

impl std::error::Error for ConfigError {}
