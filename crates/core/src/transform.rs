//! Anchored similarity transforms.
//!
//! A [`Transform`] is the map `p -> R(angle) * scale * (p - anchor) + anchor + shift`:
//! rotate and scale about `anchor`, then translate by `shift`. Every node in
//! the scene graph carries one to place its local frame inside its parent's.
//!
//! Transforms are plain values. Composition is non-commutative and reads left
//! to right: `t1.right_composed_with(&t2)` first applies `t1`, then `t2`.

use crate::vertex::{Vertex, TOLERANCE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("transform scale must be finite and non-zero")]
    ZeroScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Center of rotation and scaling.
    pub anchor: Vertex,
    /// Rotation in radians. Not wrapped.
    pub angle: f64,
    pub scale: f64,
    /// Translation applied after rotating and scaling.
    pub shift: Vertex,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            anchor: Vertex::ORIGIN,
            angle: 0.0,
            scale: 1.0,
            shift: Vertex::ORIGIN,
        }
    }

    /// Builds a transform, rejecting a scale that could not be inverted.
    pub fn try_new(
        anchor: Vertex,
        angle: f64,
        scale: f64,
        shift: Vertex,
    ) -> Result<Self, TransformError> {
        let transform = Self {
            anchor,
            angle,
            scale,
            shift,
        };
        transform.validate()?;
        Ok(transform)
    }

    pub fn translation(shift: Vertex) -> Self {
        Self {
            shift,
            ..Self::identity()
        }
    }

    pub fn rotation(angle: f64, anchor: Vertex) -> Self {
        Self {
            anchor,
            angle,
            ..Self::identity()
        }
    }

    pub fn scaling(scale: f64, anchor: Vertex) -> Self {
        Self {
            anchor,
            scale,
            ..Self::identity()
        }
    }

    pub fn with_anchor(mut self, anchor: Vertex) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shift(mut self, shift: Vertex) -> Self {
        self.shift = shift;
        self
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(TransformError::ZeroScale);
        }
        Ok(())
    }

    // Matrix coefficients: x' = a*x + b*y + e, y' = c*x + d*y + f

    pub fn a(&self) -> f64 {
        self.scale * self.angle.cos()
    }

    pub fn b(&self) -> f64 {
        self.scale * self.angle.sin()
    }

    pub fn c(&self) -> f64 {
        -self.scale * self.angle.sin()
    }

    pub fn d(&self) -> f64 {
        self.scale * self.angle.cos()
    }

    pub fn e(&self) -> f64 {
        (1.0 - self.a()) * self.anchor.x() - self.b() * self.anchor.y() + self.shift.x()
    }

    pub fn f(&self) -> f64 {
        -self.c() * self.anchor.x() + (1.0 - self.d()) * self.anchor.y() + self.shift.y()
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [self.a(), self.b(), self.c(), self.d(), self.e(), self.f()]
    }

    pub fn det(&self) -> f64 {
        self.a() * self.d() - self.b() * self.c()
    }

    pub fn applied_to(&self, v: Vertex) -> Vertex {
        (v - self.anchor).centrally_rotated_by(self.angle) * self.scale + self.anchor + self.shift
    }

    pub fn applied_to_vertices(&self, vertices: &[Vertex]) -> Vec<Vertex> {
        vertices.iter().map(|v| self.applied_to(*v)).collect()
    }

    /// The same rotation and scale about the origin, with the shift kept.
    pub fn without_anchor(&self) -> Transform {
        Transform {
            anchor: Vertex::ORIGIN,
            ..*self
        }
    }

    /// The transform undoing `self`, anchored at the same point.
    ///
    /// The shift of the inverse is the original shift pushed through the
    /// inverted rotation and scale, negated.
    pub fn inverse(&self) -> Result<Transform, TransformError> {
        self.validate()?;
        let angle = -self.angle;
        let scale = 1.0 / self.scale;
        let shift = -(self.shift.centrally_rotated_by(angle) * scale);
        Ok(Transform {
            anchor: self.anchor,
            angle,
            scale,
            shift,
        })
    }

    /// First `self`, then `other`. The result is anchored at `other.anchor`.
    pub fn right_composed_with(&self, other: &Transform) -> Transform {
        let offset = self.applied_to(other.anchor) - other.anchor;
        let shift = offset.centrally_rotated_by(other.angle) * other.scale + other.shift;
        Transform {
            anchor: other.anchor,
            angle: self.angle + other.angle,
            scale: self.scale * other.scale,
            shift,
        }
    }

    /// First `other`, then `self`.
    pub fn left_composed_with(&self, other: &Transform) -> Transform {
        other.right_composed_with(self)
    }

    pub fn right_compose_with(&mut self, other: &Transform) {
        *self = self.right_composed_with(other);
    }

    pub fn left_compose_with(&mut self, other: &Transform) {
        *self = self.left_composed_with(other);
    }

    /// Per-component linear interpolation.
    ///
    /// Angles are interpolated as plain numbers, so there is no shortest-path
    /// wraparound: going from 0.1 to 2π - 0.1 sweeps almost a full turn.
    pub fn interpolate(&self, other: &Transform, weight: f64) -> Transform {
        Transform {
            anchor: self.anchor.interpolate(other.anchor, weight),
            angle: (1.0 - weight) * self.angle + weight * other.angle,
            scale: (1.0 - weight) * self.scale + weight * other.scale,
            shift: self.shift.interpolate(other.shift, weight),
        }
    }

    /// Equality as maps of the plane: two transforms with different anchors
    /// can still be equal.
    pub fn approx_eq(&self, other: &Transform) -> bool {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .all(|(x, y)| (x - y).abs() < TOLERANCE)
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Transform::identity())
    }

    /// CSS `transform` value for a y-down view surface.
    pub fn to_css_string(&self) -> String {
        let mut parts = Vec::new();
        if !self.shift.is_zero() {
            parts.push(format!("translate({}px,{}px)", self.shift.x(), self.shift.y()));
        }
        let pivots = !self.anchor.is_zero() && (self.scale != 1.0 || self.angle != 0.0);
        if pivots {
            parts.push(format!("translate({}px,{}px)", self.anchor.x(), self.anchor.y()));
        }
        if self.angle != 0.0 {
            parts.push(format!("rotate({}deg)", -self.angle.to_degrees()));
        }
        if self.scale != 1.0 {
            parts.push(format!("scale({})", self.scale));
        }
        if pivots {
            parts.push(format!("translate({}px,{}px)", -self.anchor.x(), -self.anchor.y()));
        }
        parts.join(" ")
    }
}
