//! Output traits and error types
//!
//! This module defines where downloaded documents go and the errors raised
//! while writing them or any other export.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for downloaded PDFs
///
/// Documents are keyed by `{processID}_{documentTitle}.pdf`. Storing a key
/// twice replaces the earlier content.
pub trait DocumentSink {
    /// Stores one document and returns the key it was stored under
    fn store(&mut self, process_id: &str, title: &str, bytes: &[u8]) -> OutputResult<String>;
}
