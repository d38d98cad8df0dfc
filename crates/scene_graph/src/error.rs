use crate::NodeId;
use paper_core::TransformError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
    #[error("circular dependency: {from} already depends on {to}")]
    CircularDependency { from: NodeId, to: NodeId },
    #[error("node {frame} is not an ancestor of node {node}")]
    NotAnAncestor { node: NodeId, frame: NodeId },
    #[error("cannot make {child} a child of its descendant {parent}")]
    HierarchyCycle { parent: NodeId, child: NodeId },
    #[error("the root node cannot be removed")]
    CannotRemoveRoot,
    #[error("transform scale must be finite and non-zero")]
    ZeroScale,
}

impl From<TransformError> for SceneError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::ZeroScale => SceneError::ZeroScale,
        }
    }
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;
