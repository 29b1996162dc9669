/// Error types for the stackfall library
use thiserror::Error;

/// Result type alias for stackfall operations
pub type Result<T> = std::result::Result<T, StackfallError>;

/// Errors that can occur while building an engine or its parts
///
/// Rejected moves and rotations are not errors: the engine simply does not
/// commit them.
#[derive(Debug, Error)]
pub enum StackfallError {
    /// Configuration values that cannot drive a simulation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Shape matrix that is empty, not square or larger than 4x4
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Grid whose rows do not match its declared size
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
