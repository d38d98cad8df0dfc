//! Frame resolution: mapping points between a node's local box and the frame
//! of any of its ancestors.

use crate::{NodeId, Result, SceneError, SceneGraph};
use paper_core::{Transform, Vertex};

/// Named points of a node's local `width × height` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePoint {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Center,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
}

impl FramePoint {
    pub fn local_position(self, width: f64, height: f64) -> Vertex {
        let (x, y) = match self {
            FramePoint::UpperLeft => (0.0, 0.0),
            FramePoint::UpperRight => (width, 0.0),
            FramePoint::LowerLeft => (0.0, height),
            FramePoint::LowerRight => (width, height),
            FramePoint::Center => (width / 2.0, height / 2.0),
            FramePoint::TopCenter => (width / 2.0, 0.0),
            FramePoint::BottomCenter => (width / 2.0, height),
            FramePoint::LeftCenter => (0.0, height / 2.0),
            FramePoint::RightCenter => (width, height / 2.0),
        };
        Vertex::new(x, y)
    }
}

/// Axis-aligned bounds of a node's box as seen from some frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn mid_x(&self) -> f64 {
        (self.x_min + self.x_max) / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        (self.y_min + self.y_max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl SceneGraph {
    /// The transform taking `id`'s local coordinates into `frame`'s.
    ///
    /// `frame` defaults to the parent, or to the node itself for the root.
    /// A frame that is neither the node nor one of its ancestors is an error.
    pub fn relative_transform(&self, id: NodeId, frame: Option<NodeId>) -> Result<Transform> {
        let node = self.node(id)?;
        let frame = frame.or(node.parent).unwrap_or(id);

        let mut transform = Transform::identity();
        let mut current = id;
        while current != frame {
            let node = self.node(current)?;
            transform = transform
                .right_composed_with(&Transform::translation(node.anchor()))
                .right_composed_with(&node.transform);
            current = node
                .parent
                .ok_or(SceneError::NotAnAncestor { node: id, frame })?;
        }
        Ok(transform)
    }

    pub fn transform_local_point(
        &self,
        id: NodeId,
        point: Vertex,
        frame: Option<NodeId>,
    ) -> Result<Vertex> {
        Ok(self.relative_transform(id, frame)?.applied_to(point))
    }

    /// The inverse of [`SceneGraph::transform_local_point`]: expresses a
    /// point given in `frame` in the node's local coordinates.
    pub fn local_point(&self, id: NodeId, point: Vertex, frame: Option<NodeId>) -> Result<Vertex> {
        let inverse = self.relative_transform(id, frame)?.inverse()?;
        Ok(inverse.applied_to(point))
    }

    pub fn frame_point(&self, id: NodeId, which: FramePoint, frame: Option<NodeId>) -> Result<Vertex> {
        let node = self.node(id)?;
        let local = which.local_position(node.width, node.height);
        self.transform_local_point(id, local, frame)
    }

    /// Same as [`SceneGraph::frame_point`] in the node's own frame.
    pub fn local_frame_point(&self, id: NodeId, which: FramePoint) -> Result<Vertex> {
        self.frame_point(id, which, Some(id))
    }

    pub fn center(&self, id: NodeId, frame: Option<NodeId>) -> Result<Vertex> {
        self.frame_point(id, FramePoint::Center, frame)
    }

    /// Bounds of the four transformed corners.
    pub fn extent(&self, id: NodeId, frame: Option<NodeId>) -> Result<Extent> {
        let corners = [
            FramePoint::UpperLeft,
            FramePoint::UpperRight,
            FramePoint::LowerLeft,
            FramePoint::LowerRight,
        ]
        .into_iter()
        .map(|corner| self.frame_point(id, corner, frame))
        .collect::<Result<Vec<_>>>()?;

        let mut extent = Extent {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for corner in corners {
            extent.x_min = extent.x_min.min(corner.x());
            extent.x_max = extent.x_max.max(corner.x());
            extent.y_min = extent.y_min.min(corner.y());
            extent.y_max = extent.y_max.max(corner.y());
        }
        Ok(extent)
    }

    pub fn local_extent(&self, id: NodeId) -> Result<Extent> {
        self.extent(id, Some(id))
    }
}
