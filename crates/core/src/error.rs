use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported read of write-only property: {0}")]
    UnsupportedRead(&'static str),

    #[error("Condition evaluation failed: {0}")]
    Evaluation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
