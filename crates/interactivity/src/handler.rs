use crate::ScreenEvent;
use scene_graph::{NodeId, SceneGraph};

/// Per-node reactions to pointer input. Every method defaults to doing
/// nothing, so implementors only override what they care about.
///
/// Handlers receive the graph mutably and may update any node, including
/// `node` itself.
#[allow(unused_variables)]
pub trait PointerHandler {
    fn on_pointer_down(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    fn on_pointer_move(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    fn on_pointer_up(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    fn on_pointer_cancel(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    /// The pointer left the node's box.
    fn on_pointer_out(&mut self, graph: &mut SceneGraph, node: NodeId) -> scene_graph::Result<()> {
        Ok(())
    }

    /// Fires on every tap, including the first tap of a double tap.
    fn on_tap(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    /// Fires once a tap has settled without turning into a double tap.
    fn on_mere_tap(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    fn on_double_tap(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }

    fn on_long_press(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        event: &ScreenEvent,
    ) -> scene_graph::Result<()> {
        Ok(())
    }
}
