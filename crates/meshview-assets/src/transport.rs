//! Transports
//!
//! Byte-level access to model sources. The loader only talks to the
//! [`Transport`] trait; [`RoutingTransport`] picks HTTP, file or blob access
//! per source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::source::{BlobStore, ModelSource};
use crate::{AssetError, AssetResult};

const FILE_CHUNK_SIZE: usize = 64 * 1024;
/// Declared lengths are untrusted, never reserve more than this up front
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Download progress in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub loaded: u64,
    /// Known only when the transport reports a content length
    pub total: Option<u64>,
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// Whole percent, `0` while the total is unknown
    pub fn percent(&self) -> u8 {
        match self.total {
            Some(total) if total > 0 => {
                let ratio = self.loaded as f64 / total as f64;
                (ratio * 100.0).round().clamp(0.0, 100.0) as u8
            }
            _ => 0,
        }
    }
}

/// Progress sink handed to [`Transport::fetch`]
pub type ProgressFn<'a> = &'a (dyn Fn(Progress) + Send + Sync);

/// Metadata answered by a pre-flight request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Byte source for models
#[async_trait]
pub trait Transport: Send + Sync {
    /// Metadata without downloading the body
    async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo>;

    /// Full body, reporting progress as chunks arrive
    async fn fetch(&self, source: &ModelSource, progress: ProgressFn<'_>) -> AssetResult<Vec<u8>>;
}

/// Content type a server would declare for a file with this extension
pub fn content_type_for_extension(extension: Option<&str>) -> &'static str {
    match extension {
        Some("obj") => "model/obj",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Remote models over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout, reported as [`AssetError::Timeout`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    fn map_error(&self, err: reqwest::Error) -> AssetError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => AssetError::Timeout(timeout),
            _ => AssetError::Fetch(err.to_string()),
        }
    }

    fn url<'a>(&self, source: &'a ModelSource) -> AssetResult<&'a str> {
        match source {
            ModelSource::Http(url) => Ok(url),
            other => Err(AssetError::UnsupportedSource(other.to_string())),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo> {
        let response = self
            .request(self.client.head(self.url(source)?))
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(ResourceInfo {
            content_type,
            content_length: response.content_length(),
        })
    }

    async fn fetch(&self, source: &ModelSource, progress: ProgressFn<'_>) -> AssetResult<Vec<u8>> {
        let mut response = self
            .request(self.client.get(self.url(source)?))
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::HttpStatus(status.as_u16()));
        }

        let total = response.content_length();
        let mut body = Vec::with_capacity(total.unwrap_or(0).min(MAX_PREALLOCATION) as usize);
        progress(Progress::new(0, total));

        while let Some(chunk) = response.chunk().await.map_err(|err| self.map_error(err))? {
            body.extend_from_slice(&chunk);
            progress(Progress::new(body.len() as u64, total));
        }

        log::debug!("Downloaded {} bytes from {source}", body.len());
        Ok(body)
    }
}

/// Models on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

#[async_trait]
impl Transport for FileTransport {
    async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo> {
        let ModelSource::File(path) = source else {
            return Err(AssetError::UnsupportedSource(source.to_string()));
        };
        let metadata = tokio::fs::metadata(path).await?;
        let extension = source.extension();

        Ok(ResourceInfo {
            content_type: Some(content_type_for_extension(extension.as_deref()).to_string()),
            content_length: Some(metadata.len()),
        })
    }

    async fn fetch(&self, source: &ModelSource, progress: ProgressFn<'_>) -> AssetResult<Vec<u8>> {
        let ModelSource::File(path) = source else {
            return Err(AssetError::UnsupportedSource(source.to_string()));
        };
        let mut file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();

        let mut body = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; FILE_CHUNK_SIZE];
        progress(Progress::new(0, Some(total)));

        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
            progress(Progress::new(body.len() as u64, Some(total)));
        }

        Ok(body)
    }
}

/// Models registered in a [`BlobStore`]
#[derive(Debug, Clone, Default)]
pub struct BlobTransport {
    store: Arc<BlobStore>,
}

impl BlobTransport {
    pub fn new(store: Arc<BlobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<BlobStore> {
        &self.store
    }
}

#[async_trait]
impl Transport for BlobTransport {
    async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo> {
        let ModelSource::Blob(url) = source else {
            return Err(AssetError::UnsupportedSource(source.to_string()));
        };
        let entry = self
            .store
            .get(url)
            .ok_or_else(|| AssetError::NotFound(url.clone()))?;

        Ok(ResourceInfo {
            content_type: entry.content_type,
            content_length: Some(entry.bytes.len() as u64),
        })
    }

    async fn fetch(&self, source: &ModelSource, progress: ProgressFn<'_>) -> AssetResult<Vec<u8>> {
        let ModelSource::Blob(url) = source else {
            return Err(AssetError::UnsupportedSource(source.to_string()));
        };
        let entry = self
            .store
            .get(url)
            .ok_or_else(|| AssetError::NotFound(url.clone()))?;

        let total = entry.bytes.len() as u64;
        progress(Progress::new(total, Some(total)));
        Ok(entry.bytes.to_vec())
    }
}

/// Dispatches each source to the matching transport
#[derive(Debug, Clone, Default)]
pub struct RoutingTransport {
    http: HttpTransport,
    file: FileTransport,
    blob: BlobTransport,
}

impl RoutingTransport {
    pub fn new(http: HttpTransport, blobs: Arc<BlobStore>) -> Self {
        Self {
            http,
            file: FileTransport,
            blob: BlobTransport::new(blobs),
        }
    }

    /// Blob registry backing `blob:` sources
    pub fn blobs(&self) -> &Arc<BlobStore> {
        self.blob.store()
    }

    fn route(&self, source: &ModelSource) -> &dyn Transport {
        match source {
            ModelSource::Http(_) => &self.http,
            ModelSource::Blob(_) => &self.blob,
            ModelSource::File(_) => &self.file,
        }
    }
}

#[async_trait]
impl Transport for RoutingTransport {
    async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo> {
        self.route(source).head(source).await
    }

    async fn fetch(&self, source: &ModelSource, progress: ProgressFn<'_>) -> AssetResult<Vec<u8>> {
        self.route(source).fetch(source, progress).await
    }
}
