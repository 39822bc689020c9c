use thiserror::Error;

#[derive(Error, Debug)]
pub enum XssError {
    #[error("Fragment parsing failed: {0}")]
    Parse(String),

    #[error("Fragment serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("Serialized fragment is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, XssError>;
