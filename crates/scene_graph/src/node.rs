use crate::dependency::Dependency;
use crate::property::{PropertyValue, Schema};
use crate::view::View;
use crate::NodeId;
use paper_core::{Color, Transform, Vertex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use strum_macros::{Display, EnumString};

/// Which node in a hit chain handles a pointer event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventPolicy {
    /// Handles its own events and lets native propagation continue.
    Auto,
    /// Not hittable itself; events go to whatever lies underneath.
    Below,
    /// Handles its own events.
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    Itself,
    /// Defers to the parent. Every node but the root starts out this way.
    #[default]
    Parent,
}

/// A value derived from the node on demand, read by dependencies in place of
/// a stored property.
pub type ComputedOutput = Rc<dyn Fn(&crate::SceneGraph, NodeId) -> Option<PropertyValue>>;

/// A node ("mobject") in the scene graph.
///
/// Fields are written through [`crate::SceneGraph::update`] so that dependency
/// propagation and redraws stay consistent; this type only exposes reads.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) transform: Transform,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) visible: bool,
    pub(crate) opacity: f64,
    pub(crate) background_color: Color,
    pub(crate) event_policy: EventPolicy,
    pub(crate) saved_event_policy: Option<EventPolicy>,
    pub(crate) dependencies: SmallVec<[Dependency; 2]>,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
    pub(crate) outputs: HashMap<String, ComputedOutput>,
    pub(crate) schema: Rc<Schema>,
    pub(crate) view: Option<Box<dyn View>>,
    pub(crate) revision: u64,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, schema: Rc<Schema>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            transform: Transform::identity(),
            width: 0.0,
            height: 0.0,
            visible: true,
            opacity: 1.0,
            background_color: Color::clear(),
            event_policy: EventPolicy::default(),
            saved_event_policy: None,
            dependencies: SmallVec::new(),
            properties: BTreeMap::new(),
            outputs: HashMap::new(),
            schema,
            view: None,
            revision: 0,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Position of the local origin in the parent frame, before shifting.
    pub fn anchor(&self) -> Vertex {
        self.transform.anchor
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn event_policy(&self) -> EventPolicy {
        self.event_policy
    }

    pub fn is_enabled(&self) -> bool {
        self.saved_event_policy.is_none()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    /// Number of update passes this node has gone through.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn custom_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub(crate) fn contains_local(&self, point: Vertex) -> bool {
        point.x() >= 0.0 && point.x() <= self.width && point.y() >= 0.0 && point.y() <= self.height
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("visible", &self.visible)
            .field("event_policy", &self.event_policy)
            .field("dependencies", &self.dependencies)
            .field("properties", &self.properties)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_policy_strings() {
        assert_eq!(EventPolicy::from_str("self").unwrap(), EventPolicy::Itself);
        assert_eq!(EventPolicy::Parent.to_string(), "parent");
        assert_eq!(
            serde_json::to_string(&EventPolicy::Itself).unwrap(),
            "\"self\""
        );
        let below: EventPolicy = serde_json::from_str("\"below\"").unwrap();
        assert_eq!(below, EventPolicy::Below);
        assert_eq!(EventPolicy::default(), EventPolicy::Parent);
    }
}
