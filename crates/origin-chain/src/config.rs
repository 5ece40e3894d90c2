//! Navigator configuration.

use std::time::Duration;

use origin_store::Priority;
use serde::{Deserialize, Serialize};

/// Storage policy used by the navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Priority for block and forward-link writes.
    pub write_priority: Priority,
    /// Whether writes may replace an existing value.
    pub overwrite: bool,
    pub write_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl NavigatorConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            write_priority: Priority::Medium,
            overwrite: true,
            write_timeout_ms: 60_000,
            read_timeout_ms: 60_000,
        }
    }
}
