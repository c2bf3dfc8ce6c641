//! # Meshview Assets
//!
//! Everything between a model URL and a normalized, render-ready mesh.
//!
//! ## Features
//! - Wavefront OBJ parsing into a typed [`meshview_core::MeshScene`]
//! - HTTP, file and in-memory blob transports with byte-level progress
//! - Content-type pre-flight validation
//! - URL-keyed cache of parsed originals
//! - Load state machine with stale-result discarding and cancellation

pub mod cache;
pub mod loader;
pub mod obj;
pub mod source;
pub mod transport;
pub mod validate;

use std::time::Duration;

use thiserror::Error;

pub use cache::AssetCache;
pub use loader::{
    LoadObserver, LoadRequest, LoadTicket, LoadedModel, LoaderConfig, ModelLoadState, ModelLoader,
};
pub use source::{BlobStore, ModelSource};
pub use transport::{
    BlobTransport, FileTransport, HttpTransport, Progress, ResourceInfo, RoutingTransport,
    Transport,
};

/// Asset errors
///
/// The display strings are shown to the user verbatim in the error state.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("Invalid file type")]
    InvalidContentType { content_type: Option<String> },

    #[error("{0}")]
    Fetch(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Load cancelled")]
    Cancelled,

    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_visible_messages() {
        assert_eq!(AssetError::HttpStatus(404).to_string(), "HTTP error! status: 404");
        assert_eq!(
            AssetError::InvalidContentType {
                content_type: Some("image/png".into())
            }
            .to_string(),
            "Invalid file type"
        );
        assert_eq!(
            AssetError::Timeout(Duration::from_secs(300)).to_string(),
            "Request timed out after 300s"
        );
    }
}
