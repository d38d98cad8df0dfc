//! Tap and double tap detection over a node's recent event history.
//!
//! Only the tail of the history matters: a tap is a Down immediately
//! followed by an Up, so any Move in between breaks it.

use crate::{ScreenEvent, ScreenEventType};
use paper_core::GestureConfig;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Where a node is in the Down/Move/Up cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is down and the long press timer is running.
    ArmedDown,
    LongPressed,
    Moved,
}

#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether `down` then `up` happened within `window_ms`.
    pub fn is_tap(&self, down: &ScreenEvent, up: &ScreenEvent, window_ms: f64) -> bool {
        down.kind == ScreenEventType::Down
            && up.kind == ScreenEventType::Up
            && (up.timestamp_ms - down.timestamp_ms).abs() < window_ms
    }

    pub fn tap_detected(&self, history: &[ScreenEvent]) -> bool {
        match history {
            [.., down, up] => self.is_tap(down, up, self.config.max_tap_delay_ms),
            _ => false,
        }
    }

    /// Two taps with a short gap, the whole sequence shorter than the double
    /// tap span.
    pub fn double_tap_detected(&self, history: &[ScreenEvent]) -> bool {
        let [.., down1, up1, down2, up2] = history else {
            return false;
        };
        let window = self.config.max_tap_delay_ms;
        self.is_tap(down1, up1, window)
            && self.is_tap(down2, up2, window)
            && down2.timestamp_ms - up1.timestamp_ms < window
            && up2.timestamp_ms - down1.timestamp_ms < self.config.double_tap_span_ms
    }
}
