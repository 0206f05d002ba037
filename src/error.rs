//! Error types for forum operations.

use thiserror::Error;

/// Result type alias for forum operations.
pub type Result<T> = std::result::Result<T, ForumError>;

/// Main error type for forum operations.
///
/// Structural errors (`NotFound`, `Conflict`) are reported synchronously by the
/// tree and registry and never leave partial mutations behind. `Api` carries
/// failures of the backend collaborator, opaque to the core.
#[derive(Error, Debug)]
pub enum ForumError {
    /// A topic, comment or actor identifier does not exist locally
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate identifier on insertion
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A gated action was attempted with no current actor
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// The current actor's role does not grant the capability
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Backend collaborator failures (network, remote validation)
    #[error("API error: {0}")]
    Api(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForumError {
    /// Creates a new not found error.
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    /// Creates a new conflict error.
    pub fn conflict<T: ToString>(msg: T) -> Self {
        Self::Conflict(msg.to_string())
    }

    /// Creates a new not authenticated error.
    pub fn not_authenticated<T: ToString>(msg: T) -> Self {
        Self::NotAuthenticated(msg.to_string())
    }

    /// Creates a new permission denied error.
    pub fn permission_denied<T: ToString>(msg: T) -> Self {
        Self::PermissionDenied(msg.to_string())
    }

    /// Creates a new API error.
    pub fn api<T: ToString>(msg: T) -> Self {
        Self::Api(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new configuration error.
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    /// Returns true for local structural lookups that failed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for ForumError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
