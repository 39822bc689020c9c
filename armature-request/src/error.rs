// Error types for request parameter handling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cleaning error: {0}")]
    Xss(#[from] armature_xss::XssError),

    #[error("Failed to parse query string: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, RequestError>;
