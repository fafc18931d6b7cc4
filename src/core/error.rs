//! Error types for rhop.

use thiserror::Error;

/// Result type alias for registry and configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the plugin catalog.
///
/// Every variant is reported before the registry maps are touched, so a
/// failed call leaves the catalog exactly as it was.
#[derive(Error, Debug)]
pub enum Error {
    // Registration errors
    #[error("{type_name} does not satisfy an accepted plugin capability: {reason}")]
    InvalidType { type_name: String, reason: String },

    #[error("plugin with identifier '{0}' is already registered")]
    DuplicateIdentifier(String),

    #[error("failed to construct {type_name}: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: crate::plugin::PluginError,
    },

    // Discovery errors
    #[error("plugin source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Build an [`Error::SourceUnavailable`].
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from an identifier collision.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateIdentifier(_))
    }

    /// Whether this error came from a failed capability check.
    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Error::InvalidType { .. })
    }
}
