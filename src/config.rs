//! System configuration parameters
//!
//! All tunable parameters for the remote-start controller.
//! Values are loaded from NVS at boot and written back when a command
//! changes them (`btncd`, `warmlen`, `warmat`).

use serde::{Deserialize, Serialize};

use crate::app::commands::{MAX_COUNTDOWN_WINDOW_MS, MIN_COUNTDOWN_WINDOW_MS};
use crate::app::ports::ConfigError;
use crate::engine::DEFAULT_COUNTDOWN_WINDOW_MS;
use crate::warmup::{
    DEFAULT_DURATION_MINUTES, DEFAULT_TRIGGER_HOUR, DEFAULT_TRIGGER_MINUTE, MAX_DURATION_MINUTES,
    MIN_DURATION_MINUTES,
};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Start sequence ---
    /// Post-trigger window after which the engine is assumed running (ms)
    pub countdown_window_ms: u32,

    // --- Warm-up ---
    /// Length of a warm-up run (minutes)
    pub warm_duration_minutes: u8,
    /// Daily trigger, wall-clock hour (0-23)
    pub warm_trigger_hour: u8,
    /// Daily trigger, wall-clock minute (0-59)
    pub warm_trigger_minute: u8,

    // --- Timing ---
    /// Main loop tick interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Clock / warm-remaining broadcast interval (milliseconds)
    pub broadcast_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            countdown_window_ms: DEFAULT_COUNTDOWN_WINDOW_MS,

            warm_duration_minutes: DEFAULT_DURATION_MINUTES,
            warm_trigger_hour: DEFAULT_TRIGGER_HOUR,
            warm_trigger_minute: DEFAULT_TRIGGER_MINUTE,

            tick_interval_ms: 10,          // 100 Hz
            broadcast_interval_ms: 10_000, // every 10 s
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Called before anything is persisted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_COUNTDOWN_WINDOW_MS..=MAX_COUNTDOWN_WINDOW_MS).contains(&self.countdown_window_ms) {
            return Err(ConfigError::ValidationFailed(
                "countdown_window_ms must be 5000–60000",
            ));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.warm_duration_minutes) {
            return Err(ConfigError::ValidationFailed(
                "warm_duration_minutes must be 1–60",
            ));
        }
        if self.warm_trigger_hour > 23 {
            return Err(ConfigError::ValidationFailed(
                "warm_trigger_hour must be 0–23",
            ));
        }
        if self.warm_trigger_minute > 59 {
            return Err(ConfigError::ValidationFailed(
                "warm_trigger_minute must be 0–59",
            ));
        }
        if !(1..=10).contains(&self.tick_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be 1–10",
            ));
        }
        if !(1_000..=600_000).contains(&self.broadcast_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "broadcast_interval_ms must be 1000–600000",
            ));
        }
        Ok(())
    }
}
