//! Routing pointer input to the node responsible for it.
//!
//! On Down the router hit-tests the root-frame position, then walks the
//! chain from the root down to the hit node to pick the target (the capture
//! phase). The target keeps receiving the gesture until Up or Cancel.
//!
//! Per node, a [`Sensor`] filters duplicate input, tracks the gesture and
//! owns the node's [`PointerHandler`]. Long presses, mere taps and resets are
//! queued as timers and fire from [`EventRouter::advance`].

use crate::{
    EventClassifier, GestureRecognizer, GestureState, InputError, InteractionMode, PointerHandler,
    RawEvent, Result, ScreenEvent, ScreenEventDevice, ScreenEventType, Sensor, TimerHandle,
    TimerKind, TimerQueue,
};
use paper_core::{Settings, Vertex};
use scene_graph::{property, ChangeSet, EventPolicy, NodeId, SceneGraph};
use std::collections::HashMap;

/// What became of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Delivered to this node; native propagation should stop.
    Handled(NodeId),
    /// The target is `Auto`: the router stays out of the way.
    Continue,
    /// Unclassifiable, duplicate, spurious, locked out or without a target.
    Dropped,
}

pub struct EventRouter {
    settings: Settings,
    classifier: EventClassifier,
    recognizer: GestureRecognizer,
    sensors: HashMap<NodeId, Sensor>,
    timers: TimerQueue,
    target: Option<NodeId>,
    active_device: Option<ScreenEventDevice>,
    device_release: Option<TimerHandle>,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn cancel_timer(timers: &mut TimerQueue, slot: &mut Option<TimerHandle>) {
    if let Some(handle) = slot.take() {
        timers.cancel(handle);
    }
}

impl EventRouter {
    pub fn new(settings: Settings) -> Self {
        Self {
            classifier: EventClassifier::new(&settings.platform),
            recognizer: GestureRecognizer::new(settings.gestures.clone()),
            settings,
            sensors: HashMap::new(),
            timers: TimerQueue::new(),
            target: None,
            active_device: None,
            device_release: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sensor(&self, id: NodeId) -> Option<&Sensor> {
        self.sensors.get(&id)
    }

    /// The node receiving the gesture in progress.
    pub fn active_target(&self) -> Option<NodeId> {
        self.target
    }

    /// The device that owns the pointer until shortly after its last Up.
    pub fn active_device(&self) -> Option<ScreenEventDevice> {
        self.active_device
    }

    /// When the host should call [`EventRouter::advance`] next.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_due()
    }

    /// Installs the handler for `id` and returns the previous one.
    pub fn set_handler(
        &mut self,
        id: NodeId,
        handler: impl PointerHandler + 'static,
    ) -> Option<Box<dyn PointerHandler>> {
        self.sensors
            .entry(id)
            .or_default()
            .handler
            .replace(Box::new(handler))
    }

    pub fn take_handler(&mut self, id: NodeId) -> Option<Box<dyn PointerHandler>> {
        self.sensors.get_mut(&id)?.handler.take()
    }

    /// Drops all input state of a node, e.g. after removing it from the graph.
    pub fn forget(&mut self, id: NodeId) {
        self.sensors.remove(&id);
        self.timers.cancel_node(id);
        if self.target == Some(id) {
            self.target = None;
        }
    }

    /// Makes Down/Move/Up drag the node around instead of reaching its
    /// handler. The handler is kept and takes over again once dragging is
    /// disabled.
    pub fn enable_dragging(&mut self, graph: &SceneGraph, id: NodeId) -> Result<()> {
        graph.node(id)?;
        if id == graph.root() {
            return Err(InputError::RootNotDraggable);
        }
        self.sensors
            .entry(id)
            .or_default()
            .enter_mode(InteractionMode::Dragging);
        log::debug!("dragging enabled on {}", id);
        Ok(())
    }

    pub fn disable_dragging(&mut self, id: NodeId) {
        if let Some(sensor) = self.sensors.get_mut(&id) {
            if sensor.mode() == InteractionMode::Dragging {
                sensor.restore_mode();
                log::debug!("dragging disabled on {}", id);
            }
        }
    }

    pub fn is_dragging(&self, id: NodeId) -> bool {
        self.sensors
            .get(&id)
            .is_some_and(|sensor| sensor.mode() == InteractionMode::Dragging)
    }

    /// Picks the node that handles an event hitting `hit`.
    ///
    /// A dragging node on the chain from the root to `hit` takes the event
    /// for its whole subtree, the outermost one first. Otherwise, walking
    /// down from the root, a `Parent` node ends the walk, `Itself` and `Auto`
    /// nodes become the candidate and `Below` nodes are skipped. With no
    /// candidate the root handles the event.
    pub fn resolve_target(&self, graph: &SceneGraph, hit: NodeId) -> NodeId {
        let mut chain = graph.ancestors(hit);
        chain.reverse();
        chain.push(hit);

        if let Some(&dragged) = chain.iter().find(|id| self.is_dragging(**id)) {
            return dragged;
        }

        let mut target = None;
        for id in chain {
            let Some(node) = graph.get(id) else {
                continue;
            };
            match node.event_policy() {
                EventPolicy::Parent => break,
                EventPolicy::Itself | EventPolicy::Auto => target = Some(id),
                EventPolicy::Below => {}
            }
        }
        target.unwrap_or_else(|| graph.root())
    }

    /// Classifies a platform event and routes it.
    pub fn handle_raw(&mut self, graph: &mut SceneGraph, raw: &RawEvent) -> Result<Dispatch> {
        match self.classifier.classify(raw) {
            Some(event) => self.handle_event(graph, event),
            None => Ok(Dispatch::Dropped),
        }
    }

    pub fn handle_event(&mut self, graph: &mut SceneGraph, event: ScreenEvent) -> Result<Dispatch> {
        if let Some(active) = self.active_device {
            if active != event.device {
                log::debug!("ignoring {} {} while {} is active", event.device, event.kind, active);
                return Ok(Dispatch::Dropped);
            }
        }
        match event.kind {
            ScreenEventType::Down => self.pointer_down(graph, event),
            ScreenEventType::Move => self.pointer_move(graph, event),
            ScreenEventType::Up => self.pointer_up(graph, event),
            ScreenEventType::Cancel => self.pointer_cancel(graph, event),
            ScreenEventType::Unknown => Ok(Dispatch::Dropped),
        }
    }

    /// The pointer left `id`'s box: its history is stale from now on.
    pub fn pointer_out(&mut self, graph: &mut SceneGraph, id: NodeId) -> Result<()> {
        let Some(sensor) = self.sensors.get_mut(&id) else {
            return Ok(());
        };
        sensor.clear_history();
        cancel_timer(&mut self.timers, &mut sensor.long_press);
        cancel_timer(&mut self.timers, &mut sensor.history_reset);
        if let Some(handler) = sensor.handler.as_mut() {
            handler.on_pointer_out(graph, id)?;
        }
        Ok(())
    }

    /// Fires every timer due at `now_ms` and returns how many fired.
    pub fn advance(&mut self, graph: &mut SceneGraph, now_ms: f64) -> Result<usize> {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now_ms) {
            fired += 1;
            match timer.kind {
                TimerKind::ReleaseDevice => {
                    self.device_release = None;
                    self.active_device = None;
                }
                TimerKind::ResetHistory(id) => {
                    if let Some(sensor) = self.sensors.get_mut(&id) {
                        sensor.history_reset = None;
                        sensor.clear_history();
                    }
                }
                TimerKind::LongPress(id) => {
                    if let Some(sensor) = self.sensors.get_mut(&id) {
                        sensor.long_press = None;
                        sensor.set_state(GestureState::LongPressed);
                    }
                    if let Some(event) = timer.event {
                        log::debug!("long press on {}", id);
                        self.notify(graph, id, |handler, graph| {
                            handler.on_long_press(graph, id, &event)
                        })?;
                    }
                }
                TimerKind::MereTap(id) => {
                    if let Some(sensor) = self.sensors.get_mut(&id) {
                        sensor.mere_tap = None;
                    }
                    if let Some(event) = timer.event {
                        self.notify(graph, id, |handler, graph| {
                            handler.on_mere_tap(graph, id, &event)
                        })?;
                    }
                }
            }
        }
        Ok(fired)
    }

    fn notify<F>(&mut self, graph: &mut SceneGraph, id: NodeId, call: F) -> Result<()>
    where
        F: FnOnce(&mut Box<dyn PointerHandler>, &mut SceneGraph) -> scene_graph::Result<()>,
    {
        if !graph.contains(id) {
            log::warn!("dropping input state of removed node {}", id);
            self.forget(id);
            return Ok(());
        }
        if let Some(handler) = self.sensors.get_mut(&id).and_then(|s| s.handler.as_mut()) {
            call(handler, graph)?;
        }
        Ok(())
    }

    /// The target of the gesture in progress, if it still exists.
    fn current_target(&mut self, graph: &SceneGraph) -> Option<NodeId> {
        let target = self.target?;
        if graph.contains(target) {
            Some(target)
        } else {
            self.forget(target);
            None
        }
    }

    /// `Auto` targets are left to native propagation unless they are being
    /// dragged.
    fn intercepts(&self, graph: &SceneGraph, id: NodeId) -> Result<bool> {
        Ok(graph.node(id)?.event_policy() != EventPolicy::Auto || self.is_dragging(id))
    }

    fn register(&mut self, id: NodeId, event: ScreenEvent) -> bool {
        let dedup = self
            .classifier
            .touch_capable()
            .then_some(&self.settings.dedup);
        match self.sensors.entry(id).or_default().register(event, dedup) {
            Ok(()) => true,
            Err(rejection) => {
                log::debug!("dropping {:?} {} on {}", rejection, event.kind, id);
                false
            }
        }
    }

    /// The pointer in the frame the node's anchor lives in.
    fn pointer_in_parent(graph: &SceneGraph, id: NodeId, event: &ScreenEvent) -> Result<Vertex> {
        match graph.parent(id) {
            Some(parent) => Ok(event.local_position(graph, parent)?),
            None => Ok(event.position),
        }
    }

    fn pointer_down(&mut self, graph: &mut SceneGraph, event: ScreenEvent) -> Result<Dispatch> {
        let Some(hit) = graph.hit_test_point(event.position) else {
            return Ok(Dispatch::Dropped);
        };
        let target = self.resolve_target(graph, hit);
        self.target = Some(target);
        log::debug!("{} down on {} routed to {}", event.device, hit, target);
        if !self.intercepts(graph, target)? {
            return Ok(Dispatch::Continue);
        }
        if !self.register(target, event) {
            return Ok(Dispatch::Dropped);
        }

        self.active_device = Some(event.device);
        cancel_timer(&mut self.timers, &mut self.device_release);

        let sensor = self.sensors.entry(target).or_default();
        cancel_timer(&mut self.timers, &mut sensor.mere_tap);
        cancel_timer(&mut self.timers, &mut sensor.history_reset);
        cancel_timer(&mut self.timers, &mut sensor.long_press);
        sensor.set_state(GestureState::ArmedDown);
        sensor.long_press = Some(self.timers.schedule(
            TimerKind::LongPress(target),
            event.timestamp_ms + self.settings.gestures.long_press_ms,
            Some(event),
        ));

        if sensor.mode() == InteractionMode::Dragging {
            let anchor = graph.node(target)?.anchor();
            let pointer = Self::pointer_in_parent(graph, target, &event)?;
            sensor.set_drag_offset(Some(anchor - pointer));
        } else {
            self.notify(graph, target, |handler, graph| {
                handler.on_pointer_down(graph, target, &event)
            })?;
        }
        Ok(Dispatch::Handled(target))
    }

    fn pointer_move(&mut self, graph: &mut SceneGraph, event: ScreenEvent) -> Result<Dispatch> {
        let Some(target) = self.current_target(graph) else {
            return Ok(Dispatch::Dropped);
        };
        if !self.intercepts(graph, target)? {
            return Ok(Dispatch::Continue);
        }
        if !self.register(target, event) {
            return Ok(Dispatch::Dropped);
        }

        let sensor = self.sensors.entry(target).or_default();
        cancel_timer(&mut self.timers, &mut sensor.long_press);
        sensor.set_state(GestureState::Moved);

        match (sensor.mode(), sensor.drag_offset()) {
            (InteractionMode::Dragging, Some(offset)) => {
                let pointer = Self::pointer_in_parent(graph, target, &event)?;
                graph.update(
                    target,
                    ChangeSet::new().with(property::ANCHOR, pointer + offset),
                )?;
            }
            (InteractionMode::Dragging, None) => {}
            (InteractionMode::Idle, _) => {
                self.notify(graph, target, |handler, graph| {
                    handler.on_pointer_move(graph, target, &event)
                })?;
            }
        }
        Ok(Dispatch::Handled(target))
    }

    fn pointer_up(&mut self, graph: &mut SceneGraph, event: ScreenEvent) -> Result<Dispatch> {
        let Some(target) = self.current_target(graph) else {
            return Ok(Dispatch::Dropped);
        };
        if !self.intercepts(graph, target)? {
            self.target = None;
            return Ok(Dispatch::Continue);
        }
        if !self.register(target, event) {
            return Ok(Dispatch::Dropped);
        }
        self.target = None;

        let gestures = &self.settings.gestures;
        let sensor = self.sensors.entry(target).or_default();
        cancel_timer(&mut self.timers, &mut sensor.long_press);
        sensor.set_state(GestureState::Idle);
        let tap = self.recognizer.tap_detected(sensor.history());
        let double_tap = self.recognizer.double_tap_detected(sensor.history());

        if tap && !double_tap {
            sensor.mere_tap = Some(self.timers.schedule(
                TimerKind::MereTap(target),
                event.timestamp_ms + gestures.mere_tap_delay_ms.max(gestures.max_tap_delay_ms),
                Some(event),
            ));
        }
        sensor.history_reset = Some(self.timers.schedule(
            TimerKind::ResetHistory(target),
            event.timestamp_ms + gestures.history_reset_delay_ms,
            None,
        ));
        self.device_release = Some(self.timers.schedule(
            TimerKind::ReleaseDevice,
            event.timestamp_ms + gestures.pointer_reset_delay_ms,
            None,
        ));

        if sensor.mode() == InteractionMode::Dragging {
            sensor.set_drag_offset(None);
        } else {
            self.notify(graph, target, |handler, graph| {
                handler.on_pointer_up(graph, target, &event)
            })?;
        }
        if tap {
            self.notify(graph, target, |handler, graph| {
                handler.on_tap(graph, target, &event)
            })?;
        }
        if double_tap {
            log::debug!("double tap on {}", target);
            self.notify(graph, target, |handler, graph| {
                handler.on_double_tap(graph, target, &event)
            })?;
        }
        Ok(Dispatch::Handled(target))
    }

    fn pointer_cancel(&mut self, graph: &mut SceneGraph, event: ScreenEvent) -> Result<Dispatch> {
        let Some(target) = self.current_target(graph) else {
            return Ok(Dispatch::Dropped);
        };
        self.target = None;
        if !self.intercepts(graph, target)? {
            return Ok(Dispatch::Continue);
        }

        let sensor = self.sensors.entry(target).or_default();
        cancel_timer(&mut self.timers, &mut sensor.long_press);
        sensor.set_state(GestureState::Idle);
        sensor.set_drag_offset(None);
        sensor.clear_history();
        self.device_release = Some(self.timers.schedule(
            TimerKind::ReleaseDevice,
            event.timestamp_ms + self.settings.gestures.pointer_reset_delay_ms,
            None,
        ));

        self.notify(graph, target, |handler, graph| {
            handler.on_pointer_cancel(graph, target, &event)
        })?;
        Ok(Dispatch::Handled(target))
    }
}
