//! Time-driven property animation.
//!
//! An animation blends each animated property from the value it had when the
//! animation started to its target, with weight `(now - start) / duration`
//! clamped to `[0, 1]`. Progress depends only on the clock passed to
//! [`SceneGraph::tick_animations`], never on how many ticks ran.
//!
//! A node runs at most one animation. Starting another one, or any explicit
//! non-empty [`SceneGraph::update`], replaces it.

use crate::{ChangeSet, NodeId, Result, SceneGraph};

#[derive(Debug, Clone)]
pub struct Animation {
    start_ms: f64,
    duration_ms: f64,
    from: ChangeSet,
    to: ChangeSet,
}

impl Animation {
    pub fn weight(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.weight(now_ms) >= 1.0
    }

    pub fn target(&self) -> &ChangeSet {
        &self.to
    }

    /// The blended values at `weight`. At weight 1 the exact targets are
    /// returned.
    pub fn values_at(&self, weight: f64) -> ChangeSet {
        if weight >= 1.0 {
            return self.to.clone();
        }
        self.from
            .iter()
            .filter_map(|(key, start)| {
                let stop = self.to.get(key)?;
                Some((key.clone(), start.interpolate(stop, weight)?))
            })
            .collect()
    }
}

impl SceneGraph {
    /// Starts animating the node's properties towards `target`.
    ///
    /// Every value must be animatable and match the kind of the current
    /// value; otherwise nothing starts and `false` is returned.
    pub fn animate(
        &mut self,
        id: NodeId,
        target: ChangeSet,
        duration_ms: f64,
        now_ms: f64,
    ) -> Result<bool> {
        self.node(id)?;
        let mut from = ChangeSet::new();
        for (key, stop) in &target {
            let start = self.property(id, key);
            let blendable = stop.is_animatable()
                && start
                    .as_ref()
                    .and_then(|start| start.interpolate(stop, 0.0))
                    .is_some();
            match start {
                Some(start) if blendable => from.insert(key.clone(), start),
                _ => {
                    log::warn!("property `{}` on node {} is not animatable", key, id);
                    return Ok(false);
                }
            }
        }

        if duration_ms <= 0.0 {
            self.update(id, target)?;
            return Ok(true);
        }

        log::debug!("animating {} keys on {} for {}ms", target.len(), id, duration_ms);
        self.animations.insert(
            id,
            Animation {
                start_ms: now_ms,
                duration_ms,
                from,
                to: target,
            },
        );
        Ok(true)
    }

    /// Advances every running animation to `now_ms` and returns how many are
    /// still running.
    pub fn tick_animations(&mut self, now_ms: f64) -> Result<usize> {
        let running: Vec<NodeId> = self.animations.keys().collect();
        for id in running {
            let Some(animation) = self.animations.get(id) else {
                continue;
            };
            let weight = animation.weight(now_ms);
            let values = animation.values_at(weight);
            if weight >= 1.0 {
                self.animations.remove(id);
            }
            self.propagate(id, values, true)?;
        }
        Ok(self.animations.len())
    }

    pub fn is_animating(&self, id: NodeId) -> bool {
        self.animations.contains_key(id)
    }

    pub fn animation(&self, id: NodeId) -> Option<&Animation> {
        self.animations.get(id)
    }

    pub fn cancel_animation(&mut self, id: NodeId) -> bool {
        self.animations.remove(id).is_some()
    }

    /// When the host should tick next, if anything is animating.
    pub fn next_animation_tick(&self, now_ms: f64) -> Option<f64> {
        if self.animations.is_empty() {
            None
        } else {
            Some(now_ms + self.animation_config.tick_interval_ms)
        }
    }
}
