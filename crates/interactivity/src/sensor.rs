//! Per-node input state: recent events, gesture progress, pending timers,
//! the interaction mode and the installed handler.

use crate::{GestureState, PointerHandler, ScreenEvent, TimerHandle};
use paper_core::{DedupConfig, Vertex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum_macros::Display;

/// How a node reacts to Down/Move/Up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum InteractionMode {
    /// Events go to the installed handler.
    #[default]
    Idle,
    /// Down/Move/Up move the node's anchor with the pointer.
    Dragging,
}

/// Why an event was not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Duplicate,
    Spurious,
}

/// Tap detection looks at up to four events.
const MIN_HISTORY: usize = 4;

#[derive(Default)]
pub struct Sensor {
    history: SmallVec<[ScreenEvent; 8]>,
    state: GestureState,
    mode: InteractionMode,
    saved_mode: Option<InteractionMode>,
    drag_offset: Option<Vertex>,
    pub(crate) long_press: Option<TimerHandle>,
    pub(crate) mere_tap: Option<TimerHandle>,
    pub(crate) history_reset: Option<TimerHandle>,
    pub(crate) handler: Option<Box<dyn PointerHandler>>,
}

impl Sensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ScreenEvent] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: GestureState) {
        if self.state != state {
            log::trace!("gesture {} -> {}", self.state, state);
        }
        self.state = state;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Switches to `mode`, remembering the current one for
    /// [`Sensor::restore_mode`]. Entering the mode already active is a no-op.
    pub fn enter_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        self.saved_mode = Some(self.mode);
        self.mode = mode;
    }

    pub fn restore_mode(&mut self) {
        if let Some(mode) = self.saved_mode.take() {
            self.mode = mode;
            self.drag_offset = None;
        }
    }

    pub fn drag_offset(&self) -> Option<Vertex> {
        self.drag_offset
    }

    pub(crate) fn set_drag_offset(&mut self, offset: Option<Vertex>) {
        self.drag_offset = offset;
    }

    /// Checks `event` against the recent history and records it.
    ///
    /// Deduplication only runs when `dedup` is given: an event of the same
    /// type as a recent one at (almost) the same spot is a duplicate, and an
    /// event far away from every recent one is spurious.
    pub fn register(
        &mut self,
        event: ScreenEvent,
        dedup: Option<&DedupConfig>,
    ) -> Result<(), Rejection> {
        let capacity = dedup.map_or(MIN_HISTORY, |dedup| dedup.history_len.max(MIN_HISTORY));
        if let Some(dedup) = dedup {
            let window = dedup.history_len.min(self.history.len());
            let recent = &self.history[self.history.len() - window..];
            if recent.iter().any(|seen| {
                seen.kind == event.kind
                    && seen
                        .position
                        .close_to(event.position, dedup.duplicate_tolerance_px)
            }) {
                return Err(Rejection::Duplicate);
            }
            if !recent.is_empty()
                && recent.iter().all(|seen| {
                    (seen.position - event.position).norm() > dedup.spurious_distance_px
                })
            {
                return Err(Rejection::Spurious);
            }
        }

        self.history.push(event);
        if self.history.len() > capacity {
            let excess = self.history.len() - capacity;
            self.history.drain(..excess);
        }
        Ok(())
    }
}
