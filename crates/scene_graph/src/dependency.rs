//! Dependency edges between nodes.
//!
//! A [`Dependency`] says "whenever `source` updates, write `source[output]`
//! into `target[input]` and update `target`". Edges are owned by their source
//! node. The dependents relation is kept acyclic: an edge is refused when its
//! source is already reachable from its target.

use crate::property::ChangeSet;
use crate::{NodeId, Result, SceneError, SceneGraph};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub source: NodeId,
    /// Property or computed output read from `source`. `None` only triggers
    /// an update of `target`.
    pub output: Option<String>,
    pub target: NodeId,
    pub input: Option<String>,
}

impl Dependency {
    pub fn new(source: NodeId, output: &str, target: NodeId, input: &str) -> Self {
        Self {
            source,
            output: Some(output.to_string()),
            target,
            input: Some(input.to_string()),
        }
    }

    /// An edge carrying no value.
    pub fn trigger(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            output: None,
            target,
            input: None,
        }
    }
}

impl SceneGraph {
    /// Binds `source[output]` to `target[input]`.
    pub fn add_dependency(
        &mut self,
        source: NodeId,
        output: &str,
        target: NodeId,
        input: &str,
    ) -> Result<()> {
        self.insert_dependency(Dependency::new(source, output, target, input))
    }

    /// Makes every update of `source` also update `target`.
    pub fn add_dependent(&mut self, source: NodeId, target: NodeId) -> Result<()> {
        self.insert_dependency(Dependency::trigger(source, target))
    }

    /// Like [`SceneGraph::add_dependency`], then pushes the current value
    /// across the new edge right away.
    pub fn add_dependency_and_refresh(
        &mut self,
        source: NodeId,
        output: &str,
        target: NodeId,
        input: &str,
    ) -> Result<()> {
        self.add_dependency(source, output, target, input)?;
        let mut changes = ChangeSet::new();
        match self.property(source, output) {
            Some(value) => changes.insert(input, value),
            None => log::debug!("{} has no value for `{}` yet", source, output),
        }
        self.update_with(target, changes, true)
    }

    pub fn insert_dependency(&mut self, dependency: Dependency) -> Result<()> {
        let (source, target) = (dependency.source, dependency.target);
        self.node(target)?;
        if source == target || self.all_dependents(target).contains(&source) {
            log::warn!("refused dependency {} -> {}: cycle", source, target);
            return Err(SceneError::CircularDependency {
                from: source,
                to: target,
            });
        }
        self.node_mut(source)?.dependencies.push(dependency);
        Ok(())
    }

    /// Removes one edge. Returns whether it existed.
    pub fn remove_dependency(&mut self, dependency: &Dependency) -> Result<bool> {
        let deps = &mut self.node_mut(dependency.source)?.dependencies;
        let before = deps.len();
        deps.retain(|dep| dep != dependency);
        Ok(deps.len() != before)
    }

    /// Removes every edge from `source` to `target`.
    pub fn remove_dependencies_between(&mut self, source: NodeId, target: NodeId) -> Result<usize> {
        let deps = &mut self.node_mut(source)?.dependencies;
        let before = deps.len();
        deps.retain(|dep| dep.target != target);
        Ok(before - deps.len())
    }

    /// Direct targets of `id`'s edges, without repeats, in edge order.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.get(id)
            .map(|node| {
                node.dependencies
                    .iter()
                    .map(|dep| dep.target)
                    .filter(|target| seen.insert(*target))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every node reachable from `id` along dependency edges.
    pub fn all_dependents(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = self.dependents(id);
        stack.reverse();
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            order.push(node);
            let mut next = self.dependents(node);
            next.reverse();
            stack.extend(next);
        }
        order
    }

    /// Whether `id` is (transitively) a dependent of `other`.
    pub fn depends_on(&self, id: NodeId, other: NodeId) -> bool {
        self.all_dependents(other).contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: usize) -> (SceneGraph, Vec<NodeId>) {
        let mut graph = SceneGraph::new();
        let ids = (0..n)
            .map(|_| graph.create_node(None, ChangeSet::new()).unwrap())
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_cycle_is_rejected() {
        let (mut graph, ids) = graph_with(2);
        let (a, b) = (ids[0], ids[1]);
        graph.add_dependency(a, "width", b, "width").unwrap();
        assert_eq!(
            graph.add_dependency(b, "height", a, "height"),
            Err(SceneError::CircularDependency { from: b, to: a })
        );
        assert!(graph.node(b).unwrap().dependencies().is_empty());
    }

    #[test]
    fn test_fan_out_is_allowed() {
        let (mut graph, ids) = graph_with(3);
        graph.add_dependency(ids[0], "width", ids[1], "width").unwrap();
        graph.add_dependency(ids[0], "width", ids[2], "width").unwrap();
        assert_eq!(graph.dependents(ids[0]), vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_transitive_cycle_is_rejected() {
        let (mut graph, ids) = graph_with(3);
        graph.add_dependent(ids[0], ids[1]).unwrap();
        graph.add_dependent(ids[1], ids[2]).unwrap();
        assert!(graph.add_dependent(ids[2], ids[0]).is_err());
        assert!(graph.add_dependent(ids[0], ids[0]).is_err());
        assert_eq!(graph.all_dependents(ids[0]), vec![ids[1], ids[2]]);
        assert!(graph.depends_on(ids[2], ids[0]));
        assert!(!graph.depends_on(ids[0], ids[2]));
    }

    #[test]
    fn test_remove_dependency() {
        let (mut graph, ids) = graph_with(2);
        let dep = Dependency::new(ids[0], "width", ids[1], "height");
        graph.insert_dependency(dep.clone()).unwrap();
        graph.add_dependent(ids[0], ids[1]).unwrap();

        assert!(graph.remove_dependency(&dep).unwrap());
        assert!(!graph.remove_dependency(&dep).unwrap());
        assert_eq!(graph.remove_dependencies_between(ids[0], ids[1]).unwrap(), 1);
        assert!(graph.dependents(ids[0]).is_empty());
        // the reverse edge is legal again once the forward ones are gone
        graph.add_dependent(ids[1], ids[0]).unwrap();
    }

    #[test]
    fn test_refresh_on_insert() {
        let (mut graph, ids) = graph_with(2);
        graph
            .update(ids[0], ChangeSet::new().with("width", 12.0))
            .unwrap();
        graph
            .add_dependency_and_refresh(ids[0], "width", ids[1], "height")
            .unwrap();
        assert_eq!(graph.node(ids[1]).unwrap().height(), 12.0);
    }
}
