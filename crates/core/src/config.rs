//! Tunable constants for gesture recognition, input deduplication and
//! animation.
//!
//! All values are empirically tuned; none is derived from anything else.
//! Every field has a default, so a settings file only needs to name the
//! values it overrides.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Time windows for the gesture recognizer, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Longest Down-to-Up interval that still counts as a tap, and the
    /// longest gap between the two taps of a double tap.
    pub max_tap_delay_ms: f64,
    /// Longest span from the first Down to the second Up of a double tap.
    pub double_tap_span_ms: f64,
    /// Settle delay before a tap is reported as a mere tap. Never shorter
    /// than `max_tap_delay_ms`, so a second tap can still cancel it.
    pub mere_tap_delay_ms: f64,
    pub long_press_ms: f64,
    /// How long the active device stays locked after an Up.
    pub pointer_reset_delay_ms: f64,
    /// How long the event history survives after an Up.
    pub history_reset_delay_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_tap_delay_ms: 500.0,
            double_tap_span_ms: 1000.0,
            mere_tap_delay_ms: 500.0,
            long_press_ms: 1000.0,
            pointer_reset_delay_ms: 250.0,
            history_reset_delay_ms: 1000.0,
        }
    }
}

/// Filtering of duplicate and spurious raw events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub history_len: usize,
    /// Same-type events closer than this to a history entry are duplicates.
    pub duplicate_tolerance_px: f64,
    /// Events farther than this from every history entry are spurious.
    pub spurious_distance_px: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            history_len: 5,
            duplicate_tolerance_px: 2.0,
            spurious_distance_px: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Whether the host emits touch events. Deduplication only runs here.
    pub touch_capable: bool,
    /// Device reported for every event on platforms without touch input.
    pub emulated_device: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            touch_capable: false,
            emulated_device: "mouse".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub tick_interval_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gestures: GestureConfig,
    pub dedup: DedupConfig,
    pub platform: PlatformConfig,
    pub animation: AnimationConfig,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to load settings from {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gestures;
        let durations = [
            ("max_tap_delay_ms", g.max_tap_delay_ms),
            ("double_tap_span_ms", g.double_tap_span_ms),
            ("mere_tap_delay_ms", g.mere_tap_delay_ms),
            ("long_press_ms", g.long_press_ms),
            ("pointer_reset_delay_ms", g.pointer_reset_delay_ms),
            ("history_reset_delay_ms", g.history_reset_delay_ms),
            ("tick_interval_ms", self.animation.tick_interval_ms),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a non-negative duration, got {}", value),
                });
            }
        }
        if g.mere_tap_delay_ms < g.max_tap_delay_ms {
            return Err(ConfigError::Invalid {
                field: "mere_tap_delay_ms",
                reason: "must not be shorter than max_tap_delay_ms".to_string(),
            });
        }
        if self.dedup.history_len == 0 {
            return Err(ConfigError::Invalid {
                field: "history_len",
                reason: "history must hold at least one event".to_string(),
            });
        }
        if self.dedup.duplicate_tolerance_px >= self.dedup.spurious_distance_px {
            return Err(ConfigError::Invalid {
                field: "duplicate_tolerance_px",
                reason: "must be smaller than spurious_distance_px".to_string(),
            });
        }
        Ok(())
    }
}
