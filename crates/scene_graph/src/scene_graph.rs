//! # Scene Graph
//!
//! A headless, reactive tree of nodes ("mobjects"). Each node places its
//! local `width × height` box inside its parent's frame with an anchored
//! [`Transform`](paper_core::Transform), and can be bound to other nodes
//! through dependencies so that updating one node propagates derived values
//! to the nodes bound to it.
//!
//! ## Key Concepts
//!
//! - **Hierarchy**: nodes live in a slot map arena under a single explicit
//!   root; parent/child links always form a tree.
//! - **Frames**: [`SceneGraph::relative_transform`] composes transforms up
//!   the ancestor chain into any ancestor's coordinates.
//! - **Dependencies**: `source[output] -> target[input]` bindings, acyclic by
//!   construction, propagated in batches by [`SceneGraph::update`].
//! - **Views**: an optional [`View`] per node receives box, opacity,
//!   visibility and background changes on redraw.

pub mod animation;
pub mod dependency;
pub mod error;
pub mod frame;
pub mod hit_test;
pub mod node;
pub mod property;
pub mod update;
pub mod view;

pub use animation::Animation;
pub use dependency::Dependency;
pub use error::{Result, SceneError};
pub use frame::{Extent, FramePoint};
pub use node::{ComputedOutput, EventPolicy, Node};
pub use property::{ChangeSet, FieldSpec, Mutability, Passing, PropertyValue, Schema};
pub use view::{View, ViewBox};

use paper_core::AnimationConfig;
use slotmap::{KeyData, SecondaryMap, SlotMap};
use std::fmt::{self, Display};
use std::rc::Rc;

slotmap::new_key_type! {
    /// Identifies a node within its scene graph.
    pub struct NodeId;
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(KeyData::from_ffi(value))
    }
}

impl NodeId {
    pub fn as_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

/// Owns every node of one scene together with their dependencies and
/// running animations.
pub struct SceneGraph {
    root: NodeId,
    nodes: SlotMap<NodeId, Node>,
    animations: SecondaryMap<NodeId, Animation>,
    animation_config: AnimationConfig,
    builtin_schema: Rc<Schema>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a scene with an empty, zero-sized root.
    pub fn new() -> Self {
        let builtin_schema = Rc::new(Schema::builtin());
        let mut nodes = SlotMap::with_key();
        let mut root = Node::new(None, builtin_schema.clone());
        root.event_policy = EventPolicy::Itself;
        let root = nodes.insert(root);
        Self {
            root,
            nodes,
            animations: SecondaryMap::new(),
            animation_config: AnimationConfig::default(),
            builtin_schema,
        }
    }

    /// Creates a scene whose root covers `width × height`.
    pub fn with_size(width: f64, height: f64) -> Self {
        let mut graph = Self::new();
        if let Some(root) = graph.nodes.get_mut(graph.root) {
            root.width = width;
            root.height = height;
        }
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_animation_config(&mut self, config: AnimationConfig) {
        self.animation_config = config;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Creates a node with the builtin fields only, as the last child of
    /// `parent` (the root when `None`). `init` may set fixed fields.
    pub fn create_node(&mut self, parent: Option<NodeId>, init: ChangeSet) -> Result<NodeId> {
        let schema = self.builtin_schema.clone();
        self.create_node_with_schema(parent, schema, init)
    }

    pub fn create_node_with_schema(
        &mut self,
        parent: Option<NodeId>,
        schema: Rc<Schema>,
        init: ChangeSet,
    ) -> Result<NodeId> {
        let parent = parent.unwrap_or(self.root);
        self.node(parent)?;
        let id = self.nodes.insert(Node::new(Some(parent), schema));
        if let Err(err) = self.initialize(id, init) {
            self.nodes.remove(id);
            return Err(err);
        }
        self.node_mut(parent)?.children.push(id);
        log::debug!("created node {} under {}", id, parent);
        Ok(id)
    }

    fn initialize(&mut self, id: NodeId, init: ChangeSet) -> Result<()> {
        let changes = self.prepare(id, init, true)?;
        self.apply_changes(id, changes)
    }

    /// Re-parents `child` under `parent`, appending it to the end of the
    /// parent's children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }

        if let Some(old_parent) = self.node(child)?.parent {
            self.node_mut(old_parent)?.children.retain(|&id| id != child);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);

        if let Some(view) = self.node_mut(child)?.view.as_mut() {
            view.attach(Some(parent));
        }
        Ok(())
    }

    /// Removes a node and its whole subtree. Dependencies pointing into the
    /// removed subtree are dropped along with it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(SceneError::CannotRemoveRoot);
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|&c| c != id);
        }

        let mut removed = self.descendants(id);
        removed.push(id);
        for node_id in &removed {
            if let Some(mut node) = self.nodes.remove(*node_id) {
                if let Some(view) = node.view.as_mut() {
                    view.detach();
                }
            }
            self.animations.remove(*node_id);
        }

        for node in self.nodes.values_mut() {
            node.dependencies
                .retain(|dep| !removed.contains(&dep.target));
        }
        log::debug!("removed node {} ({} nodes)", id, removed.len());
        Ok(())
    }

    /// Moves `id` to the end of its parent's children, above its siblings.
    pub fn move_to_top(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            let siblings = &mut self.node_mut(parent)?.children;
            siblings.retain(|&c| c != id);
            siblings.push(id);
        }
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            ancestors.push(node);
            current = self.parent(node);
        }
        ancestors
    }

    /// All nodes below `id`, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Reads a property by name: computed outputs first, then builtin
    /// fields, then custom properties.
    pub fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
        let node = self.nodes.get(id)?;
        if let Some(output) = node.outputs.get(name) {
            return output(self, id);
        }
        match name {
            property::ANCHOR => Some(node.anchor().into()),
            property::TRANSFORM => Some(node.transform.into()),
            property::WIDTH => Some(node.width.into()),
            property::HEIGHT => Some(node.height.into()),
            property::VISIBLE => Some(node.visible.into()),
            property::OPACITY => Some(node.opacity.into()),
            property::BACKGROUND_COLOR => Some(node.background_color.into()),
            property::EVENT_POLICY => Some(node.event_policy.into()),
            _ => node.properties.get(name).cloned(),
        }
    }

    /// Registers a computed output that dependencies can read by name.
    pub fn set_output<F>(&mut self, id: NodeId, name: &str, output: F) -> Result<()>
    where
        F: Fn(&SceneGraph, NodeId) -> Option<PropertyValue> + 'static,
    {
        self.node_mut(id)?
            .outputs
            .insert(name.to_string(), Rc::new(output));
        Ok(())
    }

    /// Visible flag of the node and every ancestor.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn show(&mut self, id: NodeId) -> Result<()> {
        self.set_visible_with_descendants(id, true)
    }

    pub fn hide(&mut self, id: NodeId) -> Result<()> {
        self.set_visible_with_descendants(id, false)
    }

    /// Shows the node, its descendants and every node depending on it.
    pub fn recursive_show(&mut self, id: NodeId) -> Result<()> {
        self.show(id)?;
        for dependent in self.all_dependents(id) {
            self.show(dependent)?;
        }
        Ok(())
    }

    pub fn recursive_hide(&mut self, id: NodeId) -> Result<()> {
        self.hide(id)?;
        for dependent in self.all_dependents(id) {
            self.hide(dependent)?;
        }
        Ok(())
    }

    fn set_visible_with_descendants(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let mut targets = vec![id];
        targets.extend(self.descendants(id));
        for node in targets {
            self.update(node, ChangeSet::new().with(property::VISIBLE, visible))?;
        }
        Ok(())
    }

    /// Stops the node from handling pointer events itself; events go to its
    /// parent until [`SceneGraph::enable`] restores the previous policy.
    pub fn disable(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.saved_event_policy.is_none() {
            node.saved_event_policy = Some(node.event_policy);
            node.event_policy = EventPolicy::Parent;
        }
        Ok(())
    }

    pub fn enable(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if let Some(policy) = node.saved_event_policy.take() {
            node.event_policy = policy;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_core::Vertex;

    #[test]
    fn test_scene_graph_creation() {
        let graph = SceneGraph::new();
        let root = graph.node(graph.root()).unwrap();
        assert!(root.parent().is_none());
        assert!(root.children().is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_create_node() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let node1 = graph.create_node(None, ChangeSet::new()).unwrap();
        let node2 = graph
            .create_node(Some(node1), ChangeSet::new().with("width", 20.0))
            .unwrap();

        assert_eq!(graph.parent(node1), Some(root));
        assert_eq!(graph.parent(node2), Some(node1));
        assert_eq!(graph.children(root), vec![node1]);
        assert_eq!(graph.node(node2).unwrap().width(), 20.0);
        assert_eq!(graph.node(node2).unwrap().revision(), 0);
    }

    #[test]
    fn test_add_child() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node1 = graph.create_node(None, ChangeSet::new()).unwrap();
        let node2 = graph.create_node(None, ChangeSet::new()).unwrap();

        graph.add_child(node1, node2).unwrap();

        assert!(!graph.children(root).contains(&node2));
        assert_eq!(graph.children(node1), vec![node2]);
        assert_eq!(graph.parent(node2), Some(node1));
    }

    #[test]
    fn test_cannot_create_cycle() {
        let mut graph = SceneGraph::new();
        let node1 = graph.create_node(None, ChangeSet::new()).unwrap();
        let node2 = graph.create_node(Some(node1), ChangeSet::new()).unwrap();
        let node3 = graph.create_node(Some(node2), ChangeSet::new()).unwrap();

        assert_eq!(
            graph.add_child(node3, node1),
            Err(SceneError::HierarchyCycle {
                parent: node3,
                child: node1
            })
        );
        assert_eq!(graph.parent(node1), Some(graph.root()));
        assert_eq!(graph.parent(node3), Some(node2));
    }

    #[test]
    fn test_remove_node() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node1 = graph.create_node(None, ChangeSet::new()).unwrap();
        let node2 = graph.create_node(Some(node1), ChangeSet::new()).unwrap();
        let other = graph.create_node(None, ChangeSet::new()).unwrap();
        graph.add_dependent(other, node2).unwrap();

        graph.remove_node(node1).unwrap();

        assert!(!graph.children(root).contains(&node1));
        assert!(graph.get(node1).is_none());
        assert!(graph.get(node2).is_none());
        assert!(graph.node(other).unwrap().dependencies().is_empty());
        assert_eq!(graph.remove_node(root), Err(SceneError::CannotRemoveRoot));
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(None, ChangeSet::new()).unwrap();
        let b = graph.create_node(Some(a), ChangeSet::new()).unwrap();
        let c = graph.create_node(Some(b), ChangeSet::new()).unwrap();
        let d = graph.create_node(Some(a), ChangeSet::new()).unwrap();

        assert_eq!(graph.ancestors(c), vec![b, a, graph.root()]);
        assert_eq!(graph.descendants(a), vec![b, c, d]);
        assert!(graph.is_ancestor(a, c));
        assert!(!graph.is_ancestor(d, c));
    }

    #[test]
    fn test_move_to_top() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(None, ChangeSet::new()).unwrap();
        let b = graph.create_node(None, ChangeSet::new()).unwrap();
        graph.move_to_top(a).unwrap();
        assert_eq!(graph.children(graph.root()), vec![b, a]);
    }

    #[test]
    fn test_visibility_is_inherited() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(None, ChangeSet::new()).unwrap();
        let b = graph.create_node(Some(a), ChangeSet::new()).unwrap();

        graph.update(a, ChangeSet::new().with("visible", false)).unwrap();
        assert!(graph.node(b).unwrap().is_visible());
        assert!(!graph.is_effectively_visible(b));

        graph.show(a).unwrap();
        assert!(graph.is_effectively_visible(b));
        graph.hide(a).unwrap();
        assert!(!graph.node(b).unwrap().is_visible());
    }

    #[test]
    fn test_recursive_hide_reaches_dependents() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(None, ChangeSet::new()).unwrap();
        let b = graph.create_node(None, ChangeSet::new()).unwrap();
        graph.add_dependent(a, b).unwrap();

        graph.recursive_hide(a).unwrap();
        assert!(!graph.node(b).unwrap().is_visible());
        graph.recursive_show(a).unwrap();
        assert!(graph.node(b).unwrap().is_visible());
    }

    #[test]
    fn test_default_event_policies() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(None, ChangeSet::new()).unwrap();
        assert_eq!(graph.node(graph.root()).unwrap().event_policy(), EventPolicy::Itself);
        assert_eq!(graph.node(a).unwrap().event_policy(), EventPolicy::Parent);
    }

    #[test]
    fn test_disable_and_enable() {
        let mut graph = SceneGraph::new();
        let a = graph
            .create_node(None, ChangeSet::new().with("event_policy", EventPolicy::Itself))
            .unwrap();

        graph.disable(a).unwrap();
        graph.disable(a).unwrap();
        assert_eq!(graph.node(a).unwrap().event_policy(), EventPolicy::Parent);
        assert!(!graph.node(a).unwrap().is_enabled());

        graph.enable(a).unwrap();
        assert_eq!(graph.node(a).unwrap().event_policy(), EventPolicy::Itself);
    }

    #[test]
    fn test_property_lookup_order() {
        let mut graph = SceneGraph::new();
        let a = graph
            .create_node(
                None,
                ChangeSet::new()
                    .with("anchor", Vertex::new(1.0, 2.0))
                    .with("label", "hello"),
            )
            .unwrap();
        graph
            .set_output(a, "double_width", |graph, id| {
                let width = graph.node(id).ok()?.width();
                Some(PropertyValue::Number(2.0 * width))
            })
            .unwrap();
        graph.update(a, ChangeSet::new().with("width", 4.0)).unwrap();

        assert_eq!(
            graph.property(a, "anchor"),
            Some(PropertyValue::Vertex(Vertex::new(1.0, 2.0)))
        );
        assert_eq!(graph.property(a, "label"), Some("hello".into()));
        assert_eq!(graph.property(a, "double_width"), Some(PropertyValue::Number(8.0)));
        assert_eq!(graph.property(a, "missing"), None);
    }
}
