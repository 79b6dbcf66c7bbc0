use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Ein geglätteter Wert wurde aus einem leeren Puffer verlangt.
    #[error("history buffer is empty")]
    EmptyInput,
    #[error("history capacity must be at least 1")]
    ZeroCapacity,
    #[error("invalid percept: {0}")]
    InvalidPercept(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
