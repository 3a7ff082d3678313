use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatError {
    /// Missing, non-numeric or semantically invalid user input.
    #[error("{0}")]
    Validation(String),

    #[error("unknown formula: {0}")]
    UnknownFormula(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl StatError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type StatResult<T> = Result<T, StatError>;
