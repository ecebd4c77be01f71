use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Upstream returned status {0}")]
    UpstreamStatus(StatusCode),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
