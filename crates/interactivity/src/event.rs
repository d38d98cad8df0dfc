//! Normalized pointer input.
//!
//! Platforms report pointer activity as mouse, touch or pointer events with
//! their own type names. [`EventClassifier`] folds all of them into a
//! [`ScreenEvent`]: one device, one event type, a position in the root frame
//! and a timestamp.

use paper_core::{PlatformConfig, Vertex};
use scene_graph::{NodeId, SceneGraph};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScreenEventDevice {
    #[default]
    Mouse,
    Finger,
    Pen,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum ScreenEventType {
    #[strum(
        to_string = "down",
        serialize = "pointerdown",
        serialize = "mousedown",
        serialize = "touchstart"
    )]
    Down,
    #[strum(
        to_string = "move",
        serialize = "pointermove",
        serialize = "mousemove",
        serialize = "touchmove"
    )]
    Move,
    #[strum(
        to_string = "up",
        serialize = "pointerup",
        serialize = "mouseup",
        serialize = "touchend"
    )]
    Up,
    #[strum(to_string = "cancel", serialize = "pointercancel", serialize = "touchcancel")]
    Cancel,
    #[strum(to_string = "unknown")]
    Unknown,
}

impl ScreenEventType {
    /// Maps a platform event type name, `Unknown` if it is not a pointer event.
    pub fn from_platform(name: &str) -> Self {
        name.parse().unwrap_or(ScreenEventType::Unknown)
    }
}

/// Where a raw event came from, as far as the platform tells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawSource {
    /// A touch point. Styluses report a non-zero force, fingers report zero.
    Touch { force: f64 },
    Mouse,
    Other,
}

/// A pointer event as delivered by the host, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: String,
    pub source: RawSource,
    /// Position in the root frame.
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, source: RawSource, x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            kind: kind.into(),
            source,
            x,
            y,
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenEvent {
    pub device: ScreenEventDevice,
    pub kind: ScreenEventType,
    /// Position in the root frame.
    pub position: Vertex,
    pub timestamp_ms: f64,
}

impl ScreenEvent {
    pub fn new(
        device: ScreenEventDevice,
        kind: ScreenEventType,
        position: Vertex,
        timestamp_ms: f64,
    ) -> Self {
        Self {
            device,
            kind,
            position,
            timestamp_ms,
        }
    }

    pub fn down(device: ScreenEventDevice, position: Vertex, timestamp_ms: f64) -> Self {
        Self::new(device, ScreenEventType::Down, position, timestamp_ms)
    }

    pub fn moved(device: ScreenEventDevice, position: Vertex, timestamp_ms: f64) -> Self {
        Self::new(device, ScreenEventType::Move, position, timestamp_ms)
    }

    pub fn up(device: ScreenEventDevice, position: Vertex, timestamp_ms: f64) -> Self {
        Self::new(device, ScreenEventType::Up, position, timestamp_ms)
    }

    /// The event position in `node`'s local coordinates.
    pub fn local_position(&self, graph: &SceneGraph, node: NodeId) -> scene_graph::Result<Vertex> {
        graph.local_point(node, self.position, Some(graph.root()))
    }
}

/// Turns [`RawEvent`]s into [`ScreenEvent`]s for one platform.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    touch_capable: bool,
    emulated_device: ScreenEventDevice,
}

impl EventClassifier {
    pub fn new(platform: &PlatformConfig) -> Self {
        let emulated_device = platform.emulated_device.parse().unwrap_or_else(|_| {
            log::warn!(
                "unknown emulated device `{}`, falling back to mouse",
                platform.emulated_device
            );
            ScreenEventDevice::Mouse
        });
        Self {
            touch_capable: platform.touch_capable,
            emulated_device,
        }
    }

    pub fn touch_capable(&self) -> bool {
        self.touch_capable
    }

    /// Without touch input every event is reported as the emulated device.
    pub fn device(&self, raw: &RawEvent) -> ScreenEventDevice {
        if !self.touch_capable {
            return self.emulated_device;
        }
        match raw.source {
            RawSource::Touch { force } if force == 0.0 => ScreenEventDevice::Finger,
            RawSource::Touch { .. } => ScreenEventDevice::Pen,
            RawSource::Mouse => ScreenEventDevice::Mouse,
            RawSource::Other => ScreenEventDevice::Unknown,
        }
    }

    /// Returns `None` for events that are not recognizably pointer input.
    pub fn classify(&self, raw: &RawEvent) -> Option<ScreenEvent> {
        let kind = ScreenEventType::from_platform(&raw.kind);
        let device = self.device(raw);
        if kind == ScreenEventType::Unknown || device == ScreenEventDevice::Unknown {
            log::warn!(
                "dropping unclassifiable event `{}` from {:?}",
                raw.kind,
                raw.source
            );
            return None;
        }
        Some(ScreenEvent::new(
            device,
            kind,
            Vertex::new(raw.x, raw.y),
            raw.timestamp_ms,
        ))
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(&PlatformConfig::default())
    }
}
