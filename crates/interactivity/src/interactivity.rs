//! # Interactivity
//!
//! Pointer input for a [`scene_graph::SceneGraph`]: normalizing platform
//! events, routing each gesture to one node, recognizing taps, double taps
//! and long presses, and dragging nodes around.
//!
//! The router is headless. The host feeds it events through
//! [`EventRouter::handle_raw`] (or already normalized ones through
//! [`EventRouter::handle_event`]) and calls [`EventRouter::advance`] with the
//! current time whenever [`EventRouter::next_deadline`] has passed.

pub mod error;
pub mod event;
pub mod gesture;
pub mod handler;
pub mod router;
pub mod sensor;
pub mod timer;

pub use error::{InputError, Result};
pub use event::{EventClassifier, RawEvent, RawSource, ScreenEvent, ScreenEventDevice, ScreenEventType};
pub use gesture::{GestureRecognizer, GestureState};
pub use handler::PointerHandler;
pub use router::{Dispatch, EventRouter};
pub use sensor::{InteractionMode, Rejection, Sensor};
pub use timer::{Timer, TimerHandle, TimerKind, TimerQueue};
