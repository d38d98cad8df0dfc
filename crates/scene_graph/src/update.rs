//! The update engine.
//!
//! One call to [`SceneGraph::update`] runs a single pass:
//!
//! 1. `anchor` and `transform` writes are folded into one transform;
//! 2. the writes are applied, skipping fixed fields with a warning;
//! 3. children that are not already dependents get an empty update;
//! 4. every outgoing dependency contributes its value to a batch keyed by
//!    target, so a target bound several times is updated once;
//! 5. the batch is drained in dependency order: a target waits while another
//!    pending target can still reach it through children or dependencies;
//! 6. the node is redrawn, and its whole subtree if `visible` changed.
//!
//! Updates reached while draining feed the same batch, so a node sitting on
//! two paths from the trigger is still updated once.

use crate::property::{self, ChangeSet, Mutability, Passing, PropertyValue};
use crate::{NodeId, Result, SceneGraph};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Pending dependency writes, merged per target in arrival order.
#[derive(Debug, Default)]
pub(crate) struct UpdateBatch {
    calls: Vec<(NodeId, ChangeSet)>,
}

impl UpdateBatch {
    fn include(&mut self, target: NodeId, changes: ChangeSet) {
        match self.calls.iter_mut().find(|(id, _)| *id == target) {
            Some((_, pending)) => pending.merge(changes),
            None => self.calls.push((target, changes)),
        }
    }

    fn take(&mut self, target: NodeId) -> Option<ChangeSet> {
        let index = self.calls.iter().position(|(id, _)| *id == target)?;
        Some(self.calls.remove(index).1)
    }

    fn targets(&self) -> Vec<NodeId> {
        self.calls.iter().map(|(id, _)| *id).collect()
    }

    fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl SceneGraph {
    /// Writes `changes` into the node, propagates them and redraws.
    pub fn update(&mut self, id: NodeId, changes: ChangeSet) -> Result<()> {
        self.update_with(id, changes, true)
    }

    /// A non-empty update cancels any animation running on the node.
    pub fn update_with(&mut self, id: NodeId, changes: ChangeSet, redraw: bool) -> Result<()> {
        self.node(id)?;
        if !changes.is_empty() && self.animations.remove(id).is_some() {
            log::debug!("update of {} cancels its animation", id);
        }
        self.propagate(id, changes, redraw)
    }

    pub(crate) fn propagate(&mut self, id: NodeId, changes: ChangeSet, redraw: bool) -> Result<()> {
        let mut batch = UpdateBatch::default();
        self.update_in_batch(id, changes, redraw, &mut batch)?;
        self.drain(&mut batch)
    }

    fn update_in_batch(
        &mut self,
        id: NodeId,
        changes: ChangeSet,
        redraw: bool,
        batch: &mut UpdateBatch,
    ) -> Result<()> {
        let changes = self.prepare(id, changes, false)?;
        let visibility_changed = changes.contains(property::VISIBLE);
        self.apply_changes(id, changes)?;
        self.node_mut(id)?.revision += 1;

        let dependents: HashSet<NodeId> = self.all_dependents(id).into_iter().collect();
        for child in self.children(id) {
            if !dependents.contains(&child) {
                self.update_in_batch(child, ChangeSet::new(), false, batch)?;
            }
        }

        self.collect_dependency_writes(id, batch)?;

        if redraw {
            self.redraw(id)?;
        }
        if visibility_changed {
            for descendant in self.descendants(id) {
                self.redraw(descendant)?;
            }
        }
        Ok(())
    }

    fn collect_dependency_writes(&self, id: NodeId, batch: &mut UpdateBatch) -> Result<()> {
        let dependencies: SmallVec<[_; 2]> = self.node(id)?.dependencies.clone();
        for dep in dependencies {
            let mut changes = ChangeSet::new();
            if let Some(output) = &dep.output {
                let Some(value) = self.property(id, output) else {
                    log::debug!("{}.{} has no value, skipping edge to {}", id, output, dep.target);
                    continue;
                };
                if let Some(input) = &dep.input {
                    changes.insert(input.clone(), value);
                }
            }
            batch.include(dep.target, changes);
        }
        Ok(())
    }

    /// Every node an update of `id` can reach: its subtree, its dependents,
    /// and theirs in turn.
    fn downstream(&self, id: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            for next in self.children(node).into_iter().chain(self.dependents(node)) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    fn drain(&mut self, batch: &mut UpdateBatch) -> Result<()> {
        while !batch.is_empty() {
            let pending = batch.targets();
            let reach: Vec<HashSet<NodeId>> =
                pending.iter().map(|&id| self.downstream(id)).collect();
            // Targets reaching each other (a child feeding its parent) do not
            // hold each other back.
            let blocks = |p: usize, t: usize| {
                p != t && reach[p].contains(&pending[t]) && !reach[t].contains(&pending[p])
            };
            let mut ready: Vec<NodeId> = (0..pending.len())
                .filter(|&t| !(0..pending.len()).any(|p| blocks(p, t)))
                .map(|t| pending[t])
                .collect();
            if ready.is_empty() {
                log::error!("no independent target among {} pending updates", pending.len());
                ready = pending;
            }
            for target in ready {
                let Some(changes) = batch.take(target) else {
                    continue;
                };
                if !self.contains(target) {
                    continue;
                }
                self.update_in_batch(target, changes, true, batch)?;
            }
        }
        Ok(())
    }

    /// Drops writes the node's schema forbids, then folds `anchor` into
    /// `transform`.
    pub(crate) fn prepare(
        &self,
        id: NodeId,
        changes: ChangeSet,
        allow_fixed: bool,
    ) -> Result<ChangeSet> {
        let node = self.node(id)?;
        let mut accepted = ChangeSet::new();
        for (key, value) in changes {
            if !allow_fixed && node.schema.mutability(&key) == Mutability::Fixed {
                log::warn!("ignoring write to fixed field `{}` on node {}", key, id);
                continue;
            }
            if node.schema.passing(&key) == Passing::ByValue
                && matches!(value, PropertyValue::Shared(_))
            {
                log::warn!("field `{}` on node {} only accepts values", key, id);
                continue;
            }
            accepted.insert(key, value);
        }
        self.consolidate(id, accepted)
    }

    /// Resolves `anchor` and `transform` writes into a single transform.
    ///
    /// A new anchor wins over the anchor carried by a new transform; with no
    /// new transform the current one is kept and only re-anchored.
    pub(crate) fn consolidate(&self, id: NodeId, mut changes: ChangeSet) -> Result<ChangeSet> {
        let anchor = changes.remove(property::ANCHOR);
        let transform = changes.remove(property::TRANSFORM);
        if anchor.is_none() && transform.is_none() {
            return Ok(changes);
        }

        let current = self.node(id)?.transform;
        let mut resolved = match transform {
            Some(value) => value.as_transform().unwrap_or_else(|| {
                log::warn!("ignoring {} written to `transform` on node {}", value.kind(), id);
                current
            }),
            None => current,
        };
        if let Some(value) = anchor {
            match value.as_vertex() {
                Some(anchor) => resolved.anchor = anchor,
                None => log::warn!("ignoring {} written to `anchor` on node {}", value.kind(), id),
            }
        }
        resolved.validate()?;
        changes.insert(property::TRANSFORM, resolved);
        Ok(changes)
    }

    pub(crate) fn apply_changes(&mut self, id: NodeId, changes: ChangeSet) -> Result<()> {
        let node = self.node_mut(id)?;
        for (key, value) in changes {
            if !property::is_builtin(&key) {
                node.properties.insert(key, value);
                continue;
            }
            let applied = match key.as_str() {
                property::TRANSFORM => value.as_transform().map(|t| node.transform = t),
                property::WIDTH => value.as_number().map(|w| node.width = w),
                property::HEIGHT => value.as_number().map(|h| node.height = h),
                property::OPACITY => value.as_number().map(|o| node.opacity = o),
                property::VISIBLE => value.as_bool().map(|v| node.visible = v),
                property::BACKGROUND_COLOR => value.as_color().map(|c| node.background_color = c),
                property::EVENT_POLICY => value.as_policy().map(|p| node.event_policy = p),
                _ => None,
            };
            if applied.is_none() {
                log::warn!("ignoring {} written to `{}` on node {}", value.kind(), key, id);
            }
        }
        Ok(())
    }
}
