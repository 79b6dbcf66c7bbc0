use reflexa_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Config deserialization failed: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
