use crate::scene::NodeId;
use thiserror::Error;

/// Errors raised while building a [`GameLoop`](crate::engine::GameLoop)
#[derive(Debug, Error, PartialEq)]
pub enum LoopError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by [`Scene`](crate::scene::Scene) mutations
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("node {0:?} not found in scene")]
    NodeNotFound(NodeId),

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}
