use serde::{Deserialize, Serialize};

/// Timings of the playback driver and presence monitor.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// How long to wait for a voice binding to become ready.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Pause between a track ending and the next advance cycle, so the
    /// transport can settle before the next stream starts.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Interval of the periodic "now playing" status refresh.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
    /// How long a bound voice channel may sit empty before auto-stop.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NarrationConfig {
    /// Default spoken-intro setting for new sessions.
    #[serde(default = "default_narration_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            status_interval_secs: default_status_interval_secs(),
            grace_period_secs: default_grace_period_secs(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: default_narration_enabled(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_status_interval_secs() -> u64 {
    10
}

fn default_grace_period_secs() -> u64 {
    30
}

fn default_narration_enabled() -> bool {
    true
}
