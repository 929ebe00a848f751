use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Validation errors are raised before any I/O is attempted. Persistence
/// and AI-collaborator failures are wrapped at the API boundary, not here.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
