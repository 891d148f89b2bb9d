use thiserror::Error;

/// Unified result type for the ruler engine.
pub type Result<T> = std::result::Result<T, RulerError>;

/// Errors surfaced by the ruler engine.
#[derive(Debug, Error)]
pub enum RulerError {
    #[error("measurement surface unavailable: {0}")]
    MeasurementUnavailable(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("surface backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
