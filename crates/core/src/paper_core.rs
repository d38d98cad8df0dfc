//! # Core value types for the paper scene engine
//!
//! Points, anchored transforms and colors shared by the scene graph and the
//! interaction layer, plus the tunable settings and a `log` backend.

pub mod color;
pub mod config;
pub mod logger;
pub mod transform;
pub mod vertex;

pub use color::Color;
pub use config::{AnimationConfig, ConfigError, DedupConfig, GestureConfig, PlatformConfig, Settings};
pub use logger::PaperLogger;
pub use transform::{Transform, TransformError};
pub use vertex::{Vertex, TOLERANCE};
