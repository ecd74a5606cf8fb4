#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("Insufficient credits: have {available}, need {required}")]
    InsufficientCredits { required: i32, available: i32 },

    #[error("Internal error: {0}")]
    Internal(String),
}
