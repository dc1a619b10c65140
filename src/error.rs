//! Error types for the Infinispan exporter

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Infinispan exporter
#[derive(Error, Debug)]
pub enum Error {
    /// Management interface connection error
    #[error("Management interface connection error: {0}")]
    ManagementConnection(#[source] reqwest::Error),

    /// Resource discovery failed
    #[error("Resource discovery failed: {0}")]
    Discovery(String),

    /// Attribute read failed for a specific resource
    #[error("Failed to read attribute '{attribute}' on {resource}: {reason}")]
    AttributeRead {
        resource: String,
        attribute: String,
        reason: String,
    },

    /// Management response could not be parsed
    #[error("Failed to parse management response: {0}")]
    ResponseParse(String),

    /// Malformed object name
    #[error("Malformed object name: {0}")]
    ObjectName(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
