use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Autosave and notification settings for a [`DocumentEditor`](crate::DocumentEditor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period after the last mutation before an autosave
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Fixed autosave interval; 0 disables the heartbeat
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,

    /// Show the "Auto-saved" indicator after background saves
    #[serde(default = "default_true")]
    pub notify_on_autosave: bool,
}

fn default_debounce_ms() -> u64 {
    3_000
}

fn default_heartbeat_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn heartbeat(&self) -> Option<Duration> {
        match self.heartbeat_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_heartbeat(mut self, interval: Option<Duration>) -> Self {
        self.heartbeat_ms = interval.map(|i| i.as_millis() as u64).unwrap_or(0);
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            heartbeat_ms: default_heartbeat_ms(),
            notify_on_autosave: true,
        }
    }
}
