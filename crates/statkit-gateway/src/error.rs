use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No usable credential in either configuration slot.
    #[error("API key not configured")]
    Configuration,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    AssetLookup(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
