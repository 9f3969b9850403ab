use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record is missing something it cannot be stored without (the
    /// title). Fatal for that record only; the batch driver logs and
    /// continues with the rest.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {message}")]
    Store { message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
