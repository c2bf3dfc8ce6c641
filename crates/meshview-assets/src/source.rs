//! Model sources
//!
//! A model URL is one of three things: a remote HTTP resource, a `blob:`
//! reference to bytes held in memory (e.g. a freshly generated mesh), or a
//! local file path.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;

/// Where a model's bytes come from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelSource {
    Http(String),
    Blob(String),
    File(PathBuf),
}

impl ModelSource {
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let lowered = url.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Self::Http(url.to_string())
        } else if lowered.starts_with("blob:") {
            Self::Blob(url.to_string())
        } else if lowered.starts_with("file://") {
            Self::File(PathBuf::from(&url["file://".len()..]))
        } else {
            Self::File(PathBuf::from(url))
        }
    }

    /// Lowercased file extension of the referenced resource, if any
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            Self::Http(url) => {
                let path = url.split(['?', '#']).next().unwrap_or_default();
                PathBuf::from(path)
            }
            Self::File(path) => path.clone(),
            Self::Blob(_) => return None,
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Blob(_) => "blob",
            Self::File(_) => "file",
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) | Self::Blob(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// In-memory payload behind a `blob:` URL
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub bytes: Arc<[u8]>,
    pub content_type: Option<String>,
}

/// Registry of `blob:` payloads
#[derive(Debug, Default)]
pub struct BlobStore {
    entries: RwLock<AHashMap<String, BlobEntry>>,
    next_id: AtomicU64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes under a fresh `blob:` URL and return it
    pub fn register(&self, bytes: impl Into<Arc<[u8]>>, content_type: Option<&str>) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:meshview/{id}");
        self.insert(url.clone(), bytes, content_type);
        url
    }

    /// Store bytes under a caller-chosen `blob:` URL, replacing any previous entry
    pub fn insert(
        &self,
        url: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        content_type: Option<&str>,
    ) {
        let entry = BlobEntry {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        };
        self.entries.write().insert(url.into(), entry);
    }

    pub fn get(&self, url: &str) -> Option<BlobEntry> {
        self.entries.read().get(url).cloned()
    }

    /// Free a blob once nothing will load it again
    pub fn revoke(&self, url: &str) -> bool {
        self.entries.write().remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
