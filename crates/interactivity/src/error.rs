use scene_graph::SceneError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("the root node cannot be dragged")]
    RootNotDraggable,
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;
