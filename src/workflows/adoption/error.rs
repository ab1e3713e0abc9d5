use std::fmt;

use super::domain::EntityKind;
use super::repository::StoreError;

/// Outcome taxonomy shared by all workflow operations. `NotFound` and
/// `InvalidOperation` are expected, caller-recoverable results; `Store`
/// surfaces an unrecoverable persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{entity} not found with id {id}")]
    NotFound { entity: EntityKind, id: String },
    #[error("{0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        WorkflowError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        WorkflowError::InvalidOperation(message.into())
    }
}
