//! Error types for synchronization runs.

use thiserror::Error;

use crate::correlation::CorrelationId;

/// Errors that can occur during a forward or reverse synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A domain node references a correlation id absent from the index.
    ///
    /// Reported per occurrence; processing continues so that every stale id
    /// surfaces in one run, but the run as a whole fails and writes nothing.
    #[error("missing correlation: id {0} is not present in the correlation index")]
    MissingCorrelation(CorrelationId),

    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Correlation metadata could not be decoded.
    ///
    /// Recoverable at index-build time: an unreadable entry file is treated as
    /// "no prior correlations" for that XML file, with a warning.
    #[error("correlation metadata error: {0}")]
    Metadata(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create a metadata error.
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata(message.into())
    }
}
