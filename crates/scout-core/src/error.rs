use thiserror::Error;

/// Top-level error type for the scout system.
///
/// Subsystem crates construct the matching variant so the `?` operator
/// works across crate boundaries without bespoke conversion code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ScoutError {
    fn from(err: toml::de::Error) -> Self {
        ScoutError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ScoutError {
    fn from(err: toml::ser::Error) -> Self {
        ScoutError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for scout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
