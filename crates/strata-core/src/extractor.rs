//! Document text extraction boundary.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No extractor exists for this file type.
    #[error("Unsupported file type: {extension}")]
    Unsupported { extension: String },

    /// The extractor ran and failed.
    #[error("Extraction failed: {reason}")]
    Failed { reason: String },
}

/// Turns an uploaded file into plain text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts text from `bytes`, dispatching on the extension of `file_name`.
    async fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ExtractionError>;
}
