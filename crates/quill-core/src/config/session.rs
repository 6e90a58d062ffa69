//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between automatic session extensions while authenticated.
    #[serde(default = "default_extend_interval")]
    pub extend_interval_minutes: u64,
    /// Capacity of the transport and session event channels.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// How often a long-running process re-reads the shared local store.
    #[serde(default = "default_resync_interval")]
    pub resync_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            extend_interval_minutes: default_extend_interval(),
            event_buffer: default_event_buffer(),
            resync_interval_seconds: default_resync_interval(),
        }
    }
}

impl SessionConfig {
    /// The extension interval as a [`std::time::Duration`].
    pub fn extend_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.extend_interval_minutes.max(1) * 60)
    }

    /// The local store re-sync interval.
    pub fn resync_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.resync_interval_seconds.max(1))
    }
}

fn default_extend_interval() -> u64 {
    25
}

fn default_event_buffer() -> usize {
    64
}

fn default_resync_interval() -> u64 {
    30
}
