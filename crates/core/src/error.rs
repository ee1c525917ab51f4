use crate::types::DbId;

/// Failures raised by domain logic, independent of transport.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No row with this id, e.g. an unknown exhibit.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    /// Caller-supplied reading or thresholds are unusable.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
