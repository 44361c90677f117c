use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoiError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RoiError {
    fn from(e: serde_json::Error) -> Self {
        RoiError::SerializationError(e.to_string())
    }
}
