use interactivity::{
    Dispatch, EventRouter, GestureState, PointerHandler, RawEvent, RawSource, ScreenEvent,
    ScreenEventDevice,
};
use paper_core::{PlatformConfig, Settings, Vertex};
use scene_graph::{ChangeSet, EventPolicy, NodeId, SceneGraph};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Calls(Rc<RefCell<Vec<&'static str>>>);

impl Calls {
    fn all(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.0.borrow().iter().filter(|call| **call == name).count()
    }

    fn push(&self, name: &'static str) {
        self.0.borrow_mut().push(name);
    }
}

struct Recorder(Calls);

impl PointerHandler for Recorder {
    fn on_pointer_down(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("down");
        Ok(())
    }

    fn on_pointer_move(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("move");
        Ok(())
    }

    fn on_pointer_up(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("up");
        Ok(())
    }

    fn on_pointer_cancel(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("cancel");
        Ok(())
    }

    fn on_pointer_out(&mut self, _graph: &mut SceneGraph, _node: NodeId) -> scene_graph::Result<()> {
        self.0.push("out");
        Ok(())
    }

    fn on_tap(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("tap");
        graph.update(node, ChangeSet::new().with("opacity", 0.5))
    }

    fn on_mere_tap(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("mere_tap");
        Ok(())
    }

    fn on_double_tap(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("double_tap");
        Ok(())
    }

    fn on_long_press(
        &mut self,
        _graph: &mut SceneGraph,
        _node: NodeId,
        _event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        self.0.push("long_press");
        Ok(())
    }
}

struct Scene {
    graph: SceneGraph,
    router: EventRouter,
    button: NodeId,
    calls: Calls,
}

impl Scene {
    fn new(settings: Settings) -> Self {
        let mut graph = SceneGraph::with_size(200.0, 200.0);
        let button = graph
            .create_node(
                None,
                ChangeSet::new()
                    .with("anchor", Vertex::new(10.0, 10.0))
                    .with("width", 40.0)
                    .with("height", 40.0)
                    .with("event_policy", EventPolicy::Itself),
            )
            .unwrap();
        let calls = Calls::default();
        let mut router = EventRouter::new(settings);
        router.set_handler(button, Recorder(calls.clone()));
        Self {
            graph,
            router,
            button,
            calls,
        }
    }

    fn touch() -> Self {
        Self::new(Settings {
            platform: PlatformConfig {
                touch_capable: true,
                ..PlatformConfig::default()
            },
            ..Settings::default()
        })
    }

    fn send(&mut self, event: ScreenEvent) -> Dispatch {
        self.router.handle_event(&mut self.graph, event).unwrap()
    }

    fn down(&mut self, t: f64) -> Dispatch {
        self.send(ScreenEvent::down(ScreenEventDevice::Mouse, Vertex::new(20.0, 20.0), t))
    }

    fn up(&mut self, t: f64) -> Dispatch {
        self.send(ScreenEvent::up(ScreenEventDevice::Mouse, Vertex::new(20.0, 20.0), t))
    }

    fn advance(&mut self, now: f64) -> usize {
        self.router.advance(&mut self.graph, now).unwrap()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[test]
fn test_quick_release_is_a_tap() {
    let mut scene = Scene::default();
    assert_eq!(scene.down(0.0), Dispatch::Handled(scene.button));
    assert_eq!(scene.up(100.0), Dispatch::Handled(scene.button));
    assert_eq!(scene.calls.all(), vec!["down", "up", "tap"]);
    assert_eq!(scene.graph.node(scene.button).unwrap().opacity(), 0.5);

    scene.advance(599.0);
    assert_eq!(scene.calls.count("mere_tap"), 0);
    scene.advance(600.0);
    assert_eq!(scene.calls.count("mere_tap"), 1);
}

#[test]
fn test_slow_release_is_not_a_tap() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.up(600.0);
    assert_eq!(scene.calls.count("tap"), 0);
    scene.advance(5000.0);
    assert_eq!(scene.calls.count("mere_tap"), 0);
}

#[test]
fn test_double_tap_supersedes_mere_tap() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.up(100.0);
    assert_eq!(scene.advance(300.0), 0);
    scene.down(500.0);
    scene.up(900.0);
    scene.advance(5000.0);

    assert_eq!(scene.calls.count("tap"), 2);
    assert_eq!(scene.calls.count("double_tap"), 1);
    assert_eq!(scene.calls.count("mere_tap"), 0);
}

#[test]
fn test_mere_tap_waits_out_second_tap_window() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.up(100.0);
    while let Some(deadline) = scene.router.next_deadline() {
        if deadline >= 450.0 {
            break;
        }
        scene.advance(deadline);
    }
    assert_eq!(scene.calls.count("mere_tap"), 0);

    scene.down(450.0);
    scene.up(550.0);
    scene.advance(5000.0);
    assert_eq!(
        scene.calls.all(),
        vec!["down", "up", "tap", "down", "up", "tap", "double_tap"]
    );
}

#[test]
fn test_plain_child_reaches_parent_handler() {
    let mut scene = Scene::default();
    let label = scene
        .graph
        .create_node(
            Some(scene.button),
            ChangeSet::new().with("width", 40.0).with("height", 40.0),
        )
        .unwrap();
    assert_eq!(
        scene.graph.hit_test_point(Vertex::new(20.0, 20.0)),
        Some(label)
    );

    assert_eq!(scene.down(0.0), Dispatch::Handled(scene.button));
    assert_eq!(scene.calls.all(), vec!["down"]);
}

#[test]
fn test_double_tap_span_too_long() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.up(400.0);
    scene.down(800.0);
    scene.up(1100.0);

    assert_eq!(scene.calls.count("tap"), 2);
    assert_eq!(scene.calls.count("double_tap"), 0);
}

#[test]
fn test_long_press_fires_after_hold() {
    let mut scene = Scene::default();
    scene.down(0.0);
    assert_eq!(scene.router.next_deadline(), Some(1000.0));
    scene.advance(999.0);
    assert_eq!(scene.calls.count("long_press"), 0);
    scene.advance(1000.0);
    assert_eq!(scene.calls.count("long_press"), 1);
    assert_eq!(
        scene.router.sensor(scene.button).unwrap().state(),
        GestureState::LongPressed
    );

    scene.up(1200.0);
    assert_eq!(scene.calls.count("tap"), 0);
}

#[test]
fn test_move_cancels_long_press() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.send(ScreenEvent::moved(
        ScreenEventDevice::Mouse,
        Vertex::new(22.0, 20.0),
        200.0,
    ));
    scene.advance(2000.0);
    assert_eq!(scene.calls.all(), vec!["down", "move"]);
    assert_eq!(
        scene.router.sensor(scene.button).unwrap().state(),
        GestureState::Moved
    );
}

#[test]
fn test_dragging_moves_anchor() {
    let mut scene = Scene::default();
    scene
        .router
        .enable_dragging(&scene.graph, scene.button)
        .unwrap();

    scene.down(0.0);
    scene.send(ScreenEvent::moved(
        ScreenEventDevice::Mouse,
        Vertex::new(45.0, 35.0),
        50.0,
    ));
    assert_eq!(
        scene.graph.node(scene.button).unwrap().anchor(),
        Vertex::new(35.0, 25.0)
    );
    scene.send(ScreenEvent::up(
        ScreenEventDevice::Mouse,
        Vertex::new(45.0, 35.0),
        2000.0,
    ));
    assert_eq!(scene.calls.count("down"), 0);
    assert_eq!(scene.calls.count("move"), 0);

    scene.router.disable_dragging(scene.button);
    scene.advance(4000.0);
    scene.send(ScreenEvent::down(
        ScreenEventDevice::Mouse,
        Vertex::new(40.0, 30.0),
        5000.0,
    ));
    assert_eq!(scene.calls.count("down"), 1);
}

#[test]
fn test_drag_inside_transformed_parent() {
    let mut graph = SceneGraph::with_size(400.0, 400.0);
    let board = graph
        .create_node(
            None,
            ChangeSet::new()
                .with("anchor", Vertex::new(100.0, 100.0))
                .with("width", 200.0)
                .with("height", 200.0)
                .with(
                    "transform",
                    paper_core::Transform::scaling(2.0, Vertex::new(100.0, 100.0)),
                ),
        )
        .unwrap();
    let piece = graph
        .create_node(
            Some(board),
            ChangeSet::new()
                .with("anchor", Vertex::new(10.0, 10.0))
                .with("width", 10.0)
                .with("height", 10.0),
        )
        .unwrap();
    let mut router = EventRouter::default();
    router.enable_dragging(&graph, piece).unwrap();

    // the piece's origin sits at 100 + 2 * 10 in the root frame
    let start = Vertex::new(125.0, 125.0);
    assert_eq!(
        router.handle_event(&mut graph, ScreenEvent::down(ScreenEventDevice::Mouse, start, 0.0)),
        Ok(Dispatch::Handled(piece))
    );
    router
        .handle_event(
            &mut graph,
            ScreenEvent::moved(ScreenEventDevice::Mouse, Vertex::new(145.0, 125.0), 10.0),
        )
        .unwrap();
    // 20 screen pixels are 10 units inside the doubled board
    assert!(graph
        .node(piece)
        .unwrap()
        .anchor()
        .equals(Vertex::new(20.0, 10.0)));
}

#[test]
fn test_other_device_is_locked_out() {
    let mut scene = Scene::touch();
    let finger = |x: f64, t: f64| ScreenEvent::down(ScreenEventDevice::Finger, Vertex::new(x, 20.0), t);
    let mouse = |x: f64, t: f64| ScreenEvent::down(ScreenEventDevice::Mouse, Vertex::new(x, 20.0), t);

    assert_eq!(scene.send(finger(20.0, 0.0)), Dispatch::Handled(scene.button));
    assert_eq!(scene.send(mouse(30.0, 10.0)), Dispatch::Dropped);
    scene.send(ScreenEvent::up(
        ScreenEventDevice::Finger,
        Vertex::new(20.0, 20.0),
        50.0,
    ));
    assert_eq!(scene.router.active_device(), Some(ScreenEventDevice::Finger));
    assert_eq!(scene.send(mouse(30.0, 100.0)), Dispatch::Dropped);

    scene.advance(300.0);
    assert_eq!(scene.router.active_device(), None);
    assert_eq!(scene.send(mouse(30.0, 400.0)), Dispatch::Handled(scene.button));
}

#[test]
fn test_touch_duplicates_are_filtered() {
    let mut scene = Scene::touch();
    let at = |x: f64| Vertex::new(x, 20.0);

    scene.send(ScreenEvent::down(ScreenEventDevice::Finger, at(20.0), 0.0));
    assert_eq!(
        scene.send(ScreenEvent::down(ScreenEventDevice::Finger, at(21.0), 5.0)),
        Dispatch::Dropped
    );
    scene.send(ScreenEvent::up(ScreenEventDevice::Finger, at(20.0), 50.0));

    assert_eq!(scene.calls.all(), vec!["down", "up", "tap"]);
    assert_eq!(scene.router.sensor(scene.button).unwrap().history().len(), 2);
}

#[test]
fn test_history_resets_after_up() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.up(100.0);
    scene.advance(1100.0);
    assert!(scene
        .router
        .sensor(scene.button)
        .unwrap()
        .history()
        .is_empty());
}

#[test]
fn test_pointer_out_clears_history() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene
        .router
        .pointer_out(&mut scene.graph, scene.button)
        .unwrap();
    assert!(scene
        .router
        .sensor(scene.button)
        .unwrap()
        .history()
        .is_empty());

    scene.up(100.0);
    scene.advance(2000.0);
    assert_eq!(scene.calls.all(), vec!["down", "out", "up"]);
}

#[test]
fn test_cancel_ends_gesture() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.send(ScreenEvent::new(
        ScreenEventDevice::Mouse,
        interactivity::ScreenEventType::Cancel,
        Vertex::new(20.0, 20.0),
        50.0,
    ));
    scene.advance(2000.0);
    assert_eq!(scene.calls.all(), vec!["down", "cancel"]);
    assert_eq!(scene.router.active_target(), None);
}

#[test]
fn test_raw_platform_events() {
    let mut scene = Scene::default();
    let raw = [
        RawEvent::new("mousedown", RawSource::Mouse, 20.0, 20.0, 0.0),
        RawEvent::new("mouseup", RawSource::Mouse, 20.0, 20.0, 80.0),
        RawEvent::new("wheel", RawSource::Mouse, 20.0, 20.0, 90.0),
    ];
    let results: Vec<Dispatch> = raw
        .iter()
        .map(|event| scene.router.handle_raw(&mut scene.graph, event).unwrap())
        .collect();

    assert_eq!(
        results,
        vec![
            Dispatch::Handled(scene.button),
            Dispatch::Handled(scene.button),
            Dispatch::Dropped
        ]
    );
    assert_eq!(scene.calls.count("tap"), 1);
}

#[test]
fn test_removed_node_is_forgotten() {
    let mut scene = Scene::default();
    scene.down(0.0);
    scene.graph.remove_node(scene.button).unwrap();
    assert_eq!(scene.advance(2000.0), 1);
    assert_eq!(scene.calls.all(), vec!["down"]);
    assert!(scene.router.sensor(scene.button).is_none());
}

#[test]
fn test_settings_from_json_drive_windows() {
    let settings =
        Settings::from_json(r#"{ "gestures": { "long_press_ms": 300.0 } }"#).unwrap();
    let mut scene = Scene::new(settings);
    scene.down(0.0);
    scene.advance(300.0);
    assert_eq!(scene.calls.count("long_press"), 1);
}
