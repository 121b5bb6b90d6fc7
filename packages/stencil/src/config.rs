//! Runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether file and command effects reach the real environment.
///
/// Network requests are always performed in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Record file writes and commands without applying them.
    #[default]
    Simulate,
    /// Apply file writes and run commands.
    Real,
}

/// Configuration for a [`Runner`](crate::Runner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub mode: Mode,

    /// Directory that relative file names resolve against on the real
    /// filesystem, for both writes and read-through lookups.
    pub root: PathBuf,

    /// Timeout for each HTTP request.
    #[serde(rename = "http_timeout_secs", with = "duration_secs")]
    pub http_timeout: Duration,

    /// Restore first-observed file content when a phase of the run fails.
    /// On by default.
    pub rollback_on_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Simulate,
            root: PathBuf::from("."),
            http_timeout: Duration::from_secs(30),
            rollback_on_error: true,
        }
    }
}

impl RunnerConfig {
    pub fn simulate() -> Self {
        Self::default()
    }

    pub fn real() -> Self {
        Self {
            mode: Mode::Real,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_rollback_on_error(mut self, enabled: bool) -> Self {
        self.rollback_on_error = enabled;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
