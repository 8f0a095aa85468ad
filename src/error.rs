use thiserror::Error;

/// Errors raised by persistence and configuration.  The simulation itself
/// never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse {what}: {value:?}")]
    Parse { what: &'static str, value: String },

    #[error("invalid rules: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
