//! Property values, change sets and per-node field schemas.
//!
//! Every write to a node goes through a [`ChangeSet`]. The node's [`Schema`]
//! decides what happens to each key: builtin fields are written to the node
//! itself, `Fixed` fields are refused after construction, `ByValue` fields
//! refuse shared handles, and keys the schema does not know are stored as
//! custom properties unchanged.

use crate::node::EventPolicy;
use paper_core::{Color, Transform, Vertex};
use std::any::Any;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub const ANCHOR: &str = "anchor";
pub const TRANSFORM: &str = "transform";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const VISIBLE: &str = "visible";
pub const OPACITY: &str = "opacity";
pub const BACKGROUND_COLOR: &str = "background_color";
pub const EVENT_POLICY: &str = "event_policy";

/// Fields stored on every node rather than in its custom property map.
pub const BUILTIN_FIELDS: [&str; 8] = [
    ANCHOR,
    TRANSFORM,
    WIDTH,
    HEIGHT,
    VISIBLE,
    OPACITY,
    BACKGROUND_COLOR,
    EVENT_POLICY,
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FIELDS.contains(&name)
}

#[derive(Clone)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Vertex(Vertex),
    Vertices(Vec<Vertex>),
    Transform(Transform),
    Color(Color),
    Policy(EventPolicy),
    /// A handle shared with the writer rather than copied.
    Shared(Rc<dyn Any>),
}

impl PropertyValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Number(_) => "number",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Text(_) => "text",
            PropertyValue::Vertex(_) => "vertex",
            PropertyValue::Vertices(_) => "vertices",
            PropertyValue::Transform(_) => "transform",
            PropertyValue::Color(_) => "color",
            PropertyValue::Policy(_) => "policy",
            PropertyValue::Shared(_) => "shared",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vertex(&self) -> Option<Vertex> {
        match self {
            PropertyValue::Vertex(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vertices(&self) -> Option<&[Vertex]> {
        match self {
            PropertyValue::Vertices(vs) => Some(vs),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<Transform> {
        match self {
            PropertyValue::Transform(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_policy(&self) -> Option<EventPolicy> {
        match self {
            PropertyValue::Policy(p) => Some(*p),
            _ => None,
        }
    }

    pub fn downcast_shared<T: 'static>(&self) -> Option<Rc<T>> {
        match self {
            PropertyValue::Shared(rc) => rc.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Whether the animator knows how to blend two values of this kind.
    pub fn is_animatable(&self) -> bool {
        matches!(
            self,
            PropertyValue::Number(_)
                | PropertyValue::Vertex(_)
                | PropertyValue::Vertices(_)
                | PropertyValue::Transform(_)
                | PropertyValue::Color(_)
        )
    }

    /// Convex combination of two values of the same kind.
    pub fn interpolate(&self, other: &PropertyValue, weight: f64) -> Option<PropertyValue> {
        use PropertyValue::*;
        match (self, other) {
            (Number(a), Number(b)) => Some(Number((1.0 - weight) * a + weight * b)),
            (Vertex(a), Vertex(b)) => Some(Vertex(a.interpolate(*b, weight))),
            (Vertices(a), Vertices(b)) if a.len() == b.len() => Some(Vertices(
                a.iter()
                    .zip(b)
                    .map(|(v, w)| v.interpolate(*w, weight))
                    .collect(),
            )),
            (Transform(a), Transform(b)) => Some(Transform(a.interpolate(b, weight))),
            (Color(a), Color(b)) => Some(Color(a.interpolate(b, weight as f32))),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            PropertyValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            PropertyValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PropertyValue::Vertex(v) => f.debug_tuple("Vertex").field(v).finish(),
            PropertyValue::Vertices(vs) => f.debug_tuple("Vertices").field(vs).finish(),
            PropertyValue::Transform(t) => f.debug_tuple("Transform").field(t).finish(),
            PropertyValue::Color(c) => f.debug_tuple("Color").field(c).finish(),
            PropertyValue::Policy(p) => f.debug_tuple("Policy").field(p).finish(),
            PropertyValue::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        use PropertyValue::*;
        match (self, other) {
            (Number(a), Number(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Vertex(a), Vertex(b)) => a == b,
            (Vertices(a), Vertices(b)) => a == b,
            (Transform(a), Transform(b)) => a == b,
            (Color(a), Color(b)) => a == b,
            (Policy(a), Policy(b)) => a == b,
            (Shared(a), Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Vertex> for PropertyValue {
    fn from(v: Vertex) -> Self {
        PropertyValue::Vertex(v)
    }
}

impl From<Vec<Vertex>> for PropertyValue {
    fn from(vs: Vec<Vertex>) -> Self {
        PropertyValue::Vertices(vs)
    }
}

impl From<Transform> for PropertyValue {
    fn from(t: Transform) -> Self {
        PropertyValue::Transform(t)
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        PropertyValue::Color(c)
    }
}

impl From<EventPolicy> for PropertyValue {
    fn from(p: EventPolicy) -> Self {
        PropertyValue::Policy(p)
    }
}

/// A batch of property writes, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(BTreeMap<String, PropertyValue>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyValue> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Folds `other` into `self`; on conflicting keys `other` wins.
    pub fn merge(&mut self, other: ChangeSet) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for ChangeSet {
    type Item = (String, PropertyValue);
    type IntoIter = btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a String, &'a PropertyValue);
    type IntoIter = btree_map::Iter<'a, String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut changes = ChangeSet::new();
        for (key, value) in iter {
            changes.insert(key, value);
        }
        changes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    /// Settable at construction only.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    /// The node keeps its own copy; shared handles are refused.
    ByValue,
    ByReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub mutability: Mutability,
    pub passing: Passing,
}

/// The field table for one kind of node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: BTreeMap<String, FieldSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Schema {
    /// The fields every node has.
    pub fn builtin() -> Self {
        let schema = Schema {
            fields: BTreeMap::new(),
        };
        BUILTIN_FIELDS.into_iter().fold(schema, |schema, name| {
            schema.field(name, Mutability::Mutable, Passing::ByValue)
        })
    }

    pub fn field(mut self, name: &str, mutability: Mutability, passing: Passing) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSpec {
                name: name.to_string(),
                mutability,
                passing,
            },
        );
        self
    }

    pub fn fixed(self, name: &str) -> Self {
        let passing = self.passing(name);
        self.field(name, Mutability::Fixed, passing)
    }

    pub fn by_reference(self, name: &str) -> Self {
        let mutability = self.mutability(name);
        self.field(name, mutability, Passing::ByReference)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn mutability(&self, name: &str) -> Mutability {
        self.get(name)
            .map(|spec| spec.mutability)
            .unwrap_or(Mutability::Mutable)
    }

    pub fn passing(&self, name: &str) -> Passing {
        self.get(name)
            .map(|spec| spec.passing)
            .unwrap_or(Passing::ByReference)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }
}
