use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more ids in a request point at rows that do not exist.
    #[error("Invalid {entity} reference(s): {ids:?}")]
    InvalidReference {
        entity: &'static str,
        ids: Vec<DbId>,
    },
}
