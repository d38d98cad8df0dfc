//! The boundary to whatever draws the scene.
//!
//! A node may own one [`View`]. Views are nested like their nodes: each is
//! attached to the view of the node's parent and positioned in that parent's
//! frame.

use crate::{NodeId, Result, SceneGraph};
use paper_core::Color;

/// Placement of a node's box inside its parent's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Where the local origin lands in the parent frame.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, about the local origin.
    pub rotation: f64,
    pub scale: f64,
}

pub trait View {
    /// Attaches to the view of `parent`, or to the surface itself for the root.
    fn attach(&mut self, parent: Option<NodeId>);
    fn detach(&mut self);
    fn set_box(&mut self, frame: ViewBox);
    fn set_opacity(&mut self, opacity: f64);
    /// Receives the effective visibility, ancestors included.
    fn set_visible(&mut self, visible: bool);
    fn set_background(&mut self, color: Color);
}

impl SceneGraph {
    /// Installs `view` on the node, attaches it and draws the current state.
    /// A previously installed view is detached and returned.
    pub fn set_view(&mut self, id: NodeId, view: Box<dyn View>) -> Result<Option<Box<dyn View>>> {
        let node = self.node_mut(id)?;
        let parent = node.parent;
        let mut previous = node.view.replace(view);
        if let Some(old) = previous.as_mut() {
            old.detach();
        }
        if let Some(view) = node.view.as_mut() {
            view.attach(parent);
        }
        self.redraw(id)?;
        Ok(previous)
    }

    pub fn take_view(&mut self, id: NodeId) -> Result<Option<Box<dyn View>>> {
        let mut view = self.node_mut(id)?.view.take();
        if let Some(view) = view.as_mut() {
            view.detach();
        }
        Ok(view)
    }

    pub fn view_box(&self, id: NodeId) -> Result<ViewBox> {
        let node = self.node(id)?;
        let transform = node.transform;
        let origin = transform.anchor + transform.shift;
        Ok(ViewBox {
            x: origin.x(),
            y: origin.y(),
            width: node.width,
            height: node.height,
            rotation: transform.angle,
            scale: transform.scale,
        })
    }

    /// Pushes the node's current state to its view, if it has one.
    pub fn redraw(&mut self, id: NodeId) -> Result<()> {
        let frame = self.view_box(id)?;
        let visible = self.is_effectively_visible(id);
        let node = self.node_mut(id)?;
        let (opacity, background) = (node.opacity, node.background_color);
        if let Some(view) = node.view.as_mut() {
            view.set_box(frame);
            view.set_opacity(opacity);
            view.set_visible(visible);
            view.set_background(background);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChangeSet;
    use paper_core::{Transform, Vertex};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        boxes: Vec<ViewBox>,
        attached: Vec<Option<NodeId>>,
        detached: usize,
        visible: Vec<bool>,
    }

    struct RecordingView(Rc<RefCell<Recorder>>);

    impl View for RecordingView {
        fn attach(&mut self, parent: Option<NodeId>) {
            self.0.borrow_mut().attached.push(parent);
        }
        fn detach(&mut self) {
            self.0.borrow_mut().detached += 1;
        }
        fn set_box(&mut self, frame: ViewBox) {
            self.0.borrow_mut().boxes.push(frame);
        }
        fn set_opacity(&mut self, _opacity: f64) {}
        fn set_visible(&mut self, visible: bool) {
            self.0.borrow_mut().visible.push(visible);
        }
        fn set_background(&mut self, _color: Color) {}
    }

    #[test]
    fn test_view_box_follows_anchor_and_shift() {
        let mut graph = SceneGraph::new();
        let transform = Transform {
            anchor: Vertex::new(10.0, 20.0),
            angle: 0.25,
            scale: 2.0,
            shift: Vertex::new(1.0, 1.0),
        };
        let a = graph
            .create_node(
                None,
                ChangeSet::new()
                    .with("transform", transform)
                    .with("width", 5.0)
                    .with("height", 6.0),
            )
            .unwrap();

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        graph
            .set_view(a, Box::new(RecordingView(recorder.clone())))
            .unwrap();

        let expected = ViewBox {
            x: 11.0,
            y: 21.0,
            width: 5.0,
            height: 6.0,
            rotation: 0.25,
            scale: 2.0,
        };
        assert_eq!(recorder.borrow().boxes, vec![expected]);
        assert_eq!(recorder.borrow().attached, vec![Some(graph.root())]);

        graph.take_view(a).unwrap();
        assert_eq!(recorder.borrow().detached, 1);
        assert!(!graph.node(a).unwrap().has_view());
    }

    #[test]
    fn test_hiding_parent_reaches_child_views() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node(None, ChangeSet::new()).unwrap();
        let child = graph.create_node(Some(parent), ChangeSet::new()).unwrap();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        graph
            .set_view(child, Box::new(RecordingView(recorder.clone())))
            .unwrap();

        graph
            .update(parent, ChangeSet::new().with("visible", false))
            .unwrap();
        assert_eq!(recorder.borrow().visible.last(), Some(&false));
        assert!(graph.node(child).unwrap().is_visible());

        graph
            .update(parent, ChangeSet::new().with("visible", true))
            .unwrap();
        assert_eq!(recorder.borrow().visible.last(), Some(&true));
    }
}
