use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// `Validation` is recovered locally inside the bulk pipeline (a bad record
/// only shows up as an incremented `failed` counter); the other variants
/// propagate to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(context: impl Into<String>) -> Self {
        Error::Validation(context.into())
    }

    pub fn invalid_request(context: impl Into<String>) -> Self {
        Error::InvalidRequest(context.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
