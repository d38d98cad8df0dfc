//! Deferred gesture work.
//!
//! The router never sleeps. Long presses, mere taps and the various resets
//! are scheduled here with an absolute due time and fire when the host calls
//! [`crate::EventRouter::advance`] with a clock that has reached them.

use crate::ScreenEvent;
use scene_graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    LongPress(NodeId),
    MereTap(NodeId),
    ResetHistory(NodeId),
    ReleaseDevice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    pub handle: TimerHandle,
    pub kind: TimerKind,
    pub due_ms: f64,
    /// The event that armed the timer, handed to the handler when it fires.
    pub event: Option<ScreenEvent>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_handle: u64,
    pending: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, due_ms: f64, event: Option<ScreenEvent>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Timer {
            handle,
            kind,
            due_ms,
            event,
        });
        handle
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    /// Drops every timer that belongs to `node`.
    pub fn cancel_node(&mut self, node: NodeId) {
        self.pending.retain(|timer| match timer.kind {
            TimerKind::LongPress(id) | TimerKind::MereTap(id) | TimerKind::ResetHistory(id) => {
                id != node
            }
            TimerKind::ReleaseDevice => true,
        });
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|timer| timer.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Removes and returns the earliest timer due at `now_ms`. Timers due at
    /// the same time fire in the order they were scheduled.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Timer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .total_cmp(&b.due_ms)
                    .then_with(|| a.handle.cmp(&b.handle))
            })
            .map(|(index, _)| index)?;
        Some(self.pending.remove(index))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
