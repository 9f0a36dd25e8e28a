use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A duration was requested without both of its instants.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// The backing store failed. The message is for logs, not for clients.
    #[error("Storage error: {0}")]
    Storage(String),
}
