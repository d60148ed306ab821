use thiserror::Error;
use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(String),
    #[error("Category validation error: {0}")]
    ValidationError(String),
    #[error("Category still has {count} linked products")]
    InUse { count: usize },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CategoryError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => CategoryError::NotFound(id),
            other => CategoryError::ActorCommunicationError(other.to_string()),
        }
    }
}
