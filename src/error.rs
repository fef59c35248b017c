//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can escape an export operation.
///
/// Every failure carries the message of the underlying cause; nothing is
/// retried and nothing is swallowed. Document-assembly problems inside
/// `generate` surface as [`Error::Render`]; [`Error::Save`] is raised only
/// by the save step of `download`.
#[derive(Error, Debug)]
pub enum Error {
    /// Scrollable discovery or expansion failed partway
    #[error("Scroll state processing failed: {0}")]
    ScrollProcessing(String),

    /// The rasterizer rejected the capture, or the captured bitmap could
    /// not be encoded or embedded
    #[error("Raster capture failed: {0}")]
    Render(String),

    /// The document builder's save mechanism rejected
    #[error("Document save failed: {0}")]
    Save(String),
}
