//! Error types for the configuration loader and the HTTP service.

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised while reading or answering one HTTP request.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request head could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload of {0} bytes exceeds the {1} byte limit")]
    PayloadTooLarge(usize, usize),
}
