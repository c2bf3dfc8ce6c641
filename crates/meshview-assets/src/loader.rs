//! Model Loader
//!
//! Drives one model at a time through `Loading -> Loaded | Error`.
//!
//! A load is split into three steps so hosts can interleave frames with I/O:
//! [`ModelLoader::begin`] hands out a [`LoadTicket`] and supersedes whatever
//! was loading before, [`ModelLoader::fetch`] downloads and parses, and
//! [`ModelLoader::complete`] applies the result only if the ticket is still
//! current. [`ModelLoader::load`] runs all three.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use glam::Mat4;
use meshview_core::{
    GeometrySummary, Material, MaterialKind, MeshScene, ModelDetails, NormalizationTransform,
    NormalizeOptions, ScaleAnimation,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::AssetCache;
use crate::obj::parse_obj_bytes;
use crate::source::ModelSource;
use crate::transport::{Progress, RoutingTransport, Transport};
use crate::validate::validate_content_type;
use crate::{AssetError, AssetResult};

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    /// Defaults for requests that carry no options of their own
    pub normalize: NormalizeOptions,
    /// Run a HEAD request against the content-type allow-list first
    pub validate_content_type: bool,
    /// Upper bound on validation, download and parse together
    pub timeout_ms: u64,
    pub use_cache: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            validate_content_type: true,
            timeout_ms: 300_000,
            use_cache: true,
        }
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Load status shown by the viewer chrome
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelLoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading { progress: u8 },
    Loaded,
    Error(String),
}

impl ModelLoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Only a new load leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded | Self::Error(_))
    }

    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Loading { progress } => Some(*progress),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for ModelLoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading { progress } => write!(f, "loading ({progress}%)"),
            Self::Loaded => f.write_str("loaded"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Callbacks for the progress, details and error collaborators
pub trait LoadObserver: Send + Sync {
    fn on_progress(&self, _percent: u8) {}
    fn on_loaded(&self, _details: &ModelDetails) {}
    fn on_error(&self, _message: &str) {}
}

/// What to load and how to present it
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub url: String,
    pub material: Arc<Material>,
    /// Overrides [`LoaderConfig::normalize`]
    pub options: Option<NormalizeOptions>,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            material: Arc::new(Material::default()),
            options: None,
        }
    }

    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = material;
        self
    }

    pub fn with_material_kind(self, kind: MaterialKind) -> Self {
        self.with_material(Arc::new(kind.material()))
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Handle for one load cycle
///
/// Results are applied only while the ticket's generation is current.
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
    url: String,
    source: ModelSource,
    material: Arc<Material>,
    options: NormalizeOptions,
    cancel: CancellationToken,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Result of a successful load
#[derive(Debug)]
pub struct LoadedModel {
    pub url: String,
    /// Parsed original, shared with the cache and never mutated
    pub original: Arc<MeshScene>,
    /// Render clone: material applied, shadows on, normals rebuilt, wrapped
    /// in a root carrying the full normalization transform
    pub scene: MeshScene,
    pub summary: GeometrySummary,
    pub transform: NormalizationTransform,
    pub details: ModelDetails,
    pub material: Arc<Material>,
}

impl LoadedModel {
    /// Analyze, normalize and dress a parsed original
    pub fn prepare(
        url: impl Into<String>,
        original: Arc<MeshScene>,
        material: Arc<Material>,
        options: &NormalizeOptions,
    ) -> Self {
        let url = url.into();
        let summary = GeometrySummary::analyze(&original);
        if summary.is_degenerate() {
            log::warn!("{url} has no vertices, normalizing unit bounds instead");
        }
        let transform = NormalizationTransform::from_summary(&summary, options);

        let mut scene = transform.apply(&original);
        scene.apply_material(&material);
        scene.set_shadows(true, true);
        scene.compute_vertex_normals();

        Self {
            url,
            original,
            scene,
            summary,
            details: summary.details(),
            transform,
            material,
        }
    }

    /// Same model with the render clone re-dressed in `material`
    pub fn restyled(&self, material: Arc<Material>) -> Self {
        let mut scene = self.scene.clone();
        scene.apply_material(&material);

        Self {
            url: self.url.clone(),
            original: Arc::clone(&self.original),
            scene,
            summary: self.summary,
            transform: self.transform,
            details: self.details.clone(),
            material,
        }
    }
}

/// Free the render clone's buffers once nothing else holds the model
fn release_model(model: Option<Arc<LoadedModel>>) {
    if let Some(mut model) = model {
        if let Some(model) = Arc::get_mut(&mut model) {
            log::debug!("Releasing render clone of {}", model.url);
            model.scene.release();
        }
    }
}

struct LoaderState {
    generation: u64,
    status: ModelLoadState,
    url: Option<String>,
    cancel: Option<CancellationToken>,
    model: Option<Arc<LoadedModel>>,
    animation: ScaleAnimation,
}

impl Default for LoaderState {
    fn default() -> Self {
        Self {
            generation: 0,
            status: ModelLoadState::Idle,
            url: None,
            cancel: None,
            model: None,
            animation: ScaleAnimation::settled(0.0),
        }
    }
}

/// Loads models and owns the load state and scale-in animation.
///
/// Cloning is cheap; clones share state, so a clone can be moved into a
/// spawned task while the original keeps serving frames.
#[derive(Clone)]
pub struct ModelLoader {
    transport: Arc<dyn Transport>,
    cache: Arc<AssetCache>,
    config: LoaderConfig,
    state: Arc<Mutex<LoaderState>>,
    observer: Option<Arc<dyn LoadObserver>>,
}

impl ModelLoader {
    pub fn new(transport: Arc<dyn Transport>, config: LoaderConfig) -> Self {
        Self {
            transport,
            cache: Arc::new(AssetCache::new()),
            config,
            state: Arc::new(Mutex::new(LoaderState::default())),
            observer: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<AssetCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    /// Supersede any previous load and enter `Loading { progress: 0 }`
    pub fn begin(&self, request: LoadRequest) -> LoadTicket {
        let cancel = CancellationToken::new();
        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            if let Some(previous) = state.cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            release_model(state.model.take());
            state.url = Some(request.url.clone());
            state.status = ModelLoadState::Loading { progress: 0 };
            state.animation = ScaleAnimation::settled(0.0);
            state.generation
        };

        log::info!("Loading model {} (generation {generation})", request.url);
        if let Some(observer) = &self.observer {
            observer.on_progress(0);
        }

        LoadTicket {
            generation,
            source: ModelSource::parse(&request.url),
            url: request.url,
            material: request.material,
            options: request.options.unwrap_or(self.config.normalize),
            cancel,
        }
    }

    /// Download and parse the ticket's model, or take it from the cache
    pub async fn fetch(&self, ticket: &LoadTicket) -> AssetResult<Arc<MeshScene>> {
        if self.config.use_cache {
            if let Some(scene) = self.cache.get(&ticket.url) {
                log::debug!("Cache hit for {}", ticket.url);
                return Ok(scene);
            }
        }

        let timeout = self.config.timeout();
        let scene = tokio::select! {
            _ = ticket.cancel.cancelled() => return Err(AssetError::Cancelled),
            result = tokio::time::timeout(timeout, self.download(ticket)) => {
                result.map_err(|_| AssetError::Timeout(timeout))??
            }
        };

        let scene = Arc::new(scene);
        if self.config.use_cache {
            self.cache.insert(ticket.url.clone(), Arc::clone(&scene));
        }
        Ok(scene)
    }

    async fn download(&self, ticket: &LoadTicket) -> AssetResult<MeshScene> {
        if self.config.validate_content_type {
            let info = self.transport.head(&ticket.source).await?;
            validate_content_type(&info)?;
        }

        let state = Arc::clone(&self.state);
        let observer = self.observer.clone();
        let generation = ticket.generation;
        let on_progress = move |progress: Progress| {
            record_progress(&state, observer.as_deref(), generation, progress.percent());
        };

        let bytes = self.transport.fetch(&ticket.source, &on_progress).await?;
        parse_obj_bytes(&bytes)
    }

    /// Apply a fetch result. Returns `false` when the ticket was superseded
    /// and the result discarded.
    pub fn complete(&self, ticket: LoadTicket, result: AssetResult<Arc<MeshScene>>) -> bool {
        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding stale result for {} (generation {})",
                ticket.url,
                ticket.generation
            );
            return false;
        }

        let outcome = result.map(|original| {
            let material = Arc::clone(&ticket.material);
            LoadedModel::prepare(&ticket.url, original, material, &ticket.options)
        });

        let mut state = self.state.lock();
        if state.generation != ticket.generation {
            log::debug!("Discarding result for {} superseded during preparation", ticket.url);
            return false;
        }
        state.cancel = None;

        match outcome {
            Ok(model) => {
                let details = model.details.clone();
                state.animation.start(model.transform.scale);
                state.model = Some(Arc::new(model));
                state.status = ModelLoadState::Loaded;
                drop(state);

                log::info!(
                    "Loaded {}: {} vertices, {} triangles",
                    ticket.url,
                    details.vertices,
                    details.triangles
                );
                if let Some(observer) = &self.observer {
                    observer.on_loaded(&details);
                }
            }
            Err(err) => {
                let message = err.to_string();
                release_model(state.model.take());
                state.status = ModelLoadState::Error(message.clone());
                drop(state);

                log::warn!("Failed to load {}: {message}", ticket.url);
                if let Some(observer) = &self.observer {
                    observer.on_error(&message);
                }
            }
        }
        true
    }

    /// Begin, fetch and complete in one call
    pub async fn load(&self, request: LoadRequest) -> ModelLoadState {
        let ticket = self.begin(request);
        let result = self.fetch(&ticket).await;
        self.complete(ticket, result);
        self.state()
    }

    /// Fetch and complete on the runtime, returning whether the result was applied
    pub fn spawn_load(&self, ticket: LoadTicket) -> JoinHandle<bool> {
        let loader = self.clone();
        tokio::spawn(async move {
            let result = loader.fetch(&ticket).await;
            loader.complete(ticket, result)
        })
    }

    /// Abort the in-flight load; it settles in `Error("Load cancelled")`
    pub fn cancel(&self) {
        if let Some(cancel) = self.state.lock().cancel.as_ref() {
            cancel.cancel();
        }
    }

    /// Drop the current model and any in-flight load, back to `Idle`
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        if let Some(previous) = state.cancel.take() {
            previous.cancel();
        }
        release_model(state.model.take());
        state.url = None;
        state.status = ModelLoadState::Idle;
        state.animation = ScaleAnimation::settled(0.0);
    }

    /// Re-dress the shown model in `material`. Generation, status and the
    /// scale-in are left alone. Returns `false` when no model is shown.
    pub fn restyle(&self, material: Arc<Material>) -> bool {
        let mut state = self.state.lock();
        let Some(current) = state.model.take() else {
            return false;
        };
        log::debug!("Applying {:?} material to {}", material.kind, current.url);
        state.model = Some(Arc::new(current.restyled(material)));
        release_model(Some(current));
        true
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.state.lock().generation == ticket.generation
    }

    /// Advance the scale-in animation, returns the visible scale
    pub fn tick(&self, dt: f64) -> f64 {
        let mut state = self.state.lock();
        if state.status.is_loaded() {
            state.animation.tick(dt)
        } else {
            0.0
        }
    }

    pub fn state(&self) -> ModelLoadState {
        self.state.lock().status.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    pub fn model(&self) -> Option<Arc<LoadedModel>> {
        self.state.lock().model.clone()
    }

    /// Current model together with the generation that produced it
    pub fn loaded(&self) -> Option<(u64, Arc<LoadedModel>)> {
        let state = self.state.lock();
        state.model.clone().map(|model| (state.generation, model))
    }

    pub fn visible_scale(&self) -> f64 {
        self.state.lock().animation.current()
    }

    pub fn is_animating(&self) -> bool {
        let state = self.state.lock();
        state.model.is_some() && !state.animation.is_finished()
    }

    /// Root matrix of the render clone at the current animated scale
    pub fn visible_matrix(&self) -> Option<Mat4> {
        let state = self.state.lock();
        let model = state.model.as_ref()?;
        Some(model.transform.matrix_at(state.animation.current()))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(Arc::new(RoutingTransport::default()), LoaderConfig::default())
    }
}

/// Progress only moves forward and only for the current generation
fn record_progress(
    state: &Mutex<LoaderState>,
    observer: Option<&dyn LoadObserver>,
    generation: u64,
    percent: u8,
) {
    {
        let mut state = state.lock();
        if state.generation != generation {
            return;
        }
        let ModelLoadState::Loading { progress } = &mut state.status else {
            return;
        };
        if percent <= *progress {
            return;
        }
        *progress = percent;
    }
    if let Some(observer) = observer {
        observer.on_progress(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::tests::CUBE;
    use crate::transport::tests::serve;
    use crate::transport::{ProgressFn, ResourceInfo};
    use ahash::AHashMap;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum MockBody {
        Ok {
            bytes: Vec<u8>,
            content_type: Option<&'static str>,
            known_length: bool,
        },
        Status(u16),
        Hang,
    }

    #[derive(Default)]
    struct MockTransport {
        bodies: AHashMap<String, MockBody>,
        heads: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl MockTransport {
        fn with(mut self, url: &str, body: MockBody) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }

        fn obj(self, url: &str, text: &str) -> Self {
            self.with(
                url,
                MockBody::Ok {
                    bytes: text.as_bytes().to_vec(),
                    content_type: Some("model/obj"),
                    known_length: true,
                },
            )
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn head(&self, source: &ModelSource) -> AssetResult<ResourceInfo> {
            self.heads.fetch_add(1, Ordering::SeqCst);
            match self.bodies.get(&source.to_string()) {
                Some(MockBody::Ok { bytes, content_type, .. }) => Ok(ResourceInfo {
                    content_type: content_type.map(str::to_string),
                    content_length: Some(bytes.len() as u64),
                }),
                Some(MockBody::Status(code)) => Err(AssetError::HttpStatus(*code)),
                Some(MockBody::Hang) => std::future::pending().await,
                None => Err(AssetError::HttpStatus(404)),
            }
        }

        async fn fetch(
            &self,
            source: &ModelSource,
            progress: ProgressFn<'_>,
        ) -> AssetResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.bodies.get(&source.to_string()) {
                Some(MockBody::Ok { bytes, known_length, .. }) => {
                    let total = known_length.then_some(bytes.len() as u64);
                    let half = bytes.len() as u64 / 2;
                    progress(Progress::new(0, total));
                    progress(Progress::new(half, total));
                    progress(Progress::new(bytes.len() as u64, total));
                    Ok(bytes.clone())
                }
                Some(MockBody::Status(code)) => Err(AssetError::HttpStatus(*code)),
                Some(MockBody::Hang) => std::future::pending().await,
                None => Err(AssetError::HttpStatus(404)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        progress: Mutex<Vec<u8>>,
        details: Mutex<Vec<ModelDetails>>,
        errors: Mutex<Vec<String>>,
    }

    impl LoadObserver for RecordingObserver {
        fn on_progress(&self, percent: u8) {
            self.progress.lock().push(percent);
        }

        fn on_loaded(&self, details: &ModelDetails) {
            self.details.lock().push(details.clone());
        }

        fn on_error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    fn loader_with(
        transport: MockTransport,
        config: LoaderConfig,
    ) -> (ModelLoader, Arc<MockTransport>, Arc<RecordingObserver>) {
        let transport = Arc::new(transport);
        let observer = Arc::new(RecordingObserver::default());
        let loader = ModelLoader::new(transport.clone(), config).with_observer(observer.clone());
        (loader, transport, observer)
    }

    #[tokio::test]
    async fn test_unit_cube_load() {
        let (loader, _, observer) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());

        let state = loader.load(LoadRequest::new("cube.obj")).await;
        assert_eq!(state, ModelLoadState::Loaded);

        let model = loader.model().unwrap();
        assert!((model.transform.scale - 0.75).abs() < 1e-9);
        assert_eq!(model.details.vertices, 8);
        assert_eq!(model.details.triangles, 12);
        assert!((model.details.size_x - 1.0).abs() < 1e-9);
        assert!((model.details.size_y - 1.0).abs() < 1e-9);
        assert!((model.details.size_z - 1.0).abs() < 1e-9);

        let rendered = GeometrySummary::analyze(&model.scene);
        assert!(rendered.bounding_min.y.abs() < 1e-5);
        assert!(rendered.center.x.abs() < 1e-5);
        assert!(rendered.center.z.abs() < 1e-5);

        assert_eq!(observer.details.lock().len(), 1);
        assert!(observer.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_render_clone_is_dressed() {
        let (loader, _, _) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());
        let request = LoadRequest::new("cube.obj").with_material_kind(MaterialKind::Metal);
        loader.load(request).await;

        let model = loader.model().unwrap();
        for renderable in model.scene.renderables() {
            assert!(renderable.mesh.cast_shadow && renderable.mesh.receive_shadow);
            assert_eq!(renderable.mesh.material.as_ref().unwrap().kind, MaterialKind::Metal);
            assert_eq!(renderable.geometry().normals.len(), renderable.geometry().positions.len());
        }
        for renderable in model.original.renderables() {
            assert!(renderable.mesh.material.is_none());
        }
    }

    #[tokio::test]
    async fn test_http_404_scenario() {
        let (loader, _, observer) = loader_with(
            MockTransport::default().with("https://host/missing.obj", MockBody::Status(404)),
            LoaderConfig {
                validate_content_type: false,
                ..Default::default()
            },
        );

        let state = loader.load(LoadRequest::new("https://host/missing.obj")).await;
        assert_eq!(state, ModelLoadState::Error("HTTP error! status: 404".into()));
        assert!(loader.model().is_none());
        assert!(observer.details.lock().is_empty());
        assert_eq!(observer.errors.lock().as_slice(), ["HTTP error! status: 404"]);
    }

    #[tokio::test]
    async fn test_http_404_over_the_network() {
        let base = serve(404, "text/plain", b"gone".to_vec(), 64).await;
        let url = format!("{base}/missing.obj");
        let loader = ModelLoader::default();

        let state = loader.load(LoadRequest::new(url)).await;
        assert_eq!(state, ModelLoadState::Error("HTTP error! status: 404".into()));
        assert!(loader.model().is_none());
    }

    #[tokio::test]
    async fn test_http_load_over_the_network() {
        let base = serve(200, "model/obj; charset=utf-8", CUBE.as_bytes().to_vec(), 40).await;
        let url = format!("{base}/cube.obj");
        let observer = Arc::new(RecordingObserver::default());
        let loader = ModelLoader::default().with_observer(observer.clone());

        assert_eq!(loader.load(LoadRequest::new(url)).await, ModelLoadState::Loaded);
        assert_eq!(loader.model().unwrap().details.vertices, 8);

        let progress = observer.progress.lock();
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_invalid_content_type_stops_before_download() {
        let body = MockBody::Ok {
            bytes: b"<html>".to_vec(),
            content_type: Some("text/html"),
            known_length: true,
        };
        let (loader, transport, _) =
            loader_with(MockTransport::default().with("page.obj", body), LoaderConfig::default());

        let state = loader.load(LoadRequest::new("page.obj")).await;
        assert_eq!(state.error(), Some("Invalid file type"));
        assert_eq!(transport.heads.load(Ordering::SeqCst), 1);
        assert_eq!(transport.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parse_failure() {
        let (loader, _, _) = loader_with(
            MockTransport::default().obj("bad.obj", "v 0 0 0\nf 1 2 3\n"),
            LoaderConfig::default(),
        );
        let state = loader.load(LoadRequest::new("bad.obj")).await;
        assert!(state.error().unwrap().starts_with("Parse error at line 2"));
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let (loader, _, _) = loader_with(
            MockTransport::default()
                .obj("a.obj", "v 0 0 0\nv 9 0 0\nv 0 9 0\nf 1 2 3\n")
                .obj("b.obj", CUBE),
            LoaderConfig::default(),
        );

        let ticket_a = loader.begin(LoadRequest::new("a.obj"));
        let ticket_b = loader.begin(LoadRequest::new("b.obj"));
        assert!(ticket_a.is_cancelled());

        let result_b = loader.fetch(&ticket_b).await;
        assert!(loader.complete(ticket_b, result_b));

        let result_a = loader.fetch(&ticket_a).await;
        assert!(!loader.complete(ticket_a, result_a));

        assert_eq!(loader.state(), ModelLoadState::Loaded);
        assert_eq!(loader.model().unwrap().url, "b.obj");
        assert_eq!(loader.current_url().as_deref(), Some("b.obj"));
    }

    #[tokio::test]
    async fn test_new_load_cancels_in_flight_fetch() {
        let (loader, _, _) = loader_with(
            MockTransport::default().with("slow.obj", MockBody::Hang).obj("b.obj", CUBE),
            LoaderConfig::default(),
        );

        let handle = loader.spawn_load(loader.begin(LoadRequest::new("slow.obj")));
        tokio::task::yield_now().await;

        let state = loader.load(LoadRequest::new("b.obj")).await;
        assert_eq!(state, ModelLoadState::Loaded);
        assert!(!handle.await.unwrap());
        assert_eq!(loader.model().unwrap().url, "b.obj");
    }

    #[tokio::test]
    async fn test_explicit_cancel() {
        let (loader, _, observer) = loader_with(
            MockTransport::default().with("slow.obj", MockBody::Hang),
            LoaderConfig::default(),
        );

        let handle = loader.spawn_load(loader.begin(LoadRequest::new("slow.obj")));
        tokio::task::yield_now().await;
        loader.cancel();

        assert!(handle.await.unwrap());
        assert_eq!(loader.state(), ModelLoadState::Error("Load cancelled".into()));
        assert_eq!(observer.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_an_error_state() {
        let (loader, _, _) = loader_with(
            MockTransport::default().with("slow.obj", MockBody::Hang),
            LoaderConfig {
                timeout_ms: 20,
                ..Default::default()
            },
        );
        let state = loader.load(LoadRequest::new("slow.obj")).await;
        assert_eq!(state, ModelLoadState::Error("Request timed out after 20ms".into()));
    }

    #[tokio::test]
    async fn test_progress_is_reported_monotonically() {
        let (loader, _, observer) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());
        loader.load(LoadRequest::new("cube.obj")).await;

        let progress = observer.progress.lock().clone();
        assert_eq!(progress, [0, 50, 100]);
    }

    #[tokio::test]
    async fn test_unknown_length_keeps_progress_at_zero() {
        let body = MockBody::Ok {
            bytes: CUBE.as_bytes().to_vec(),
            content_type: Some("text/plain"),
            known_length: false,
        };
        let (loader, _, observer) =
            loader_with(MockTransport::default().with("cube.obj", body), LoaderConfig::default());

        let ticket = loader.begin(LoadRequest::new("cube.obj"));
        let result = loader.fetch(&ticket).await;
        assert_eq!(loader.state(), ModelLoadState::Loading { progress: 0 });
        loader.complete(ticket, result);

        assert_eq!(observer.progress.lock().as_slice(), [0]);
        assert!(loader.state().is_loaded());
    }

    #[tokio::test]
    async fn test_reload_is_idempotent_and_cached() {
        let (loader, transport, _) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());

        loader.load(LoadRequest::new("cube.obj")).await;
        let first = loader.model().unwrap();
        loader.load(LoadRequest::new("cube.obj")).await;
        let second = loader.model().unwrap();

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.transform, second.transform);
        assert_eq!(first.scene, second.scene);
        assert!(Arc::ptr_eq(&first.original, &second.original));
        assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(loader.generation(), 2);
    }

    #[tokio::test]
    async fn test_state_machine_transitions() {
        let (loader, _, _) = loader_with(
            MockTransport::default()
                .obj("cube.obj", CUBE)
                .with("gone.obj", MockBody::Status(500)),
            LoaderConfig {
                validate_content_type: false,
                ..Default::default()
            },
        );
        assert_eq!(loader.state(), ModelLoadState::Idle);

        loader.load(LoadRequest::new("cube.obj")).await;
        assert!(loader.state().is_terminal());
        loader.tick(1.0);
        assert_eq!(loader.state(), ModelLoadState::Loaded);

        let ticket = loader.begin(LoadRequest::new("gone.obj"));
        assert_eq!(loader.state(), ModelLoadState::Loading { progress: 0 });
        assert!(loader.model().is_none());
        let result = loader.fetch(&ticket).await;
        loader.complete(ticket, result);
        assert_eq!(loader.state().error(), Some("HTTP error! status: 500"));

        loader.begin(LoadRequest::new("cube.obj"));
        assert_eq!(loader.state().progress(), Some(0));
    }

    #[tokio::test]
    async fn test_scale_in_animation() {
        let (loader, _, _) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());
        loader.load(LoadRequest::new("cube.obj")).await;

        assert_eq!(loader.visible_scale(), 0.0);
        assert!(loader.is_animating());

        let mut frames = 0;
        while loader.is_animating() {
            loader.tick(1.0 / 60.0);
            frames += 1;
            assert!(frames < 100);
        }

        let model = loader.model().unwrap();
        assert_eq!(loader.visible_scale(), model.transform.scale);
        assert_eq!(loader.visible_matrix().unwrap(), model.transform.matrix());
    }

    #[tokio::test]
    async fn test_request_options_override_config() {
        let (loader, _, _) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());
        let options = NormalizeOptions {
            max_scale: 0.5,
            ..Default::default()
        };
        loader.load(LoadRequest::new("cube.obj").with_options(options)).await;
        assert!((loader.model().unwrap().transform.scale - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_clear_returns_to_idle() {
        let (loader, _, _) = loader_with(
            MockTransport::default().with("slow.obj", MockBody::Hang).obj("cube.obj", CUBE),
            LoaderConfig::default(),
        );

        loader.load(LoadRequest::new("cube.obj")).await;
        let (generation, model) = loader.loaded().unwrap();
        assert_eq!(generation, loader.generation());
        assert_eq!(model.url, "cube.obj");

        let ticket = loader.begin(LoadRequest::new("slow.obj"));
        loader.clear();
        assert!(ticket.is_cancelled());
        assert!(!loader.is_current(&ticket));
        assert_eq!(loader.state(), ModelLoadState::Idle);
        assert!(loader.loaded().is_none());
        assert!(loader.current_url().is_none());
    }

    #[tokio::test]
    async fn test_restyle_keeps_generation_and_scale_in() {
        let (loader, transport, _) =
            loader_with(MockTransport::default().obj("cube.obj", CUBE), LoaderConfig::default());
        loader.load(LoadRequest::new("cube.obj")).await;
        for _ in 0..10 {
            loader.tick(1.0 / 60.0);
        }
        let generation = loader.generation();
        let scale = loader.visible_scale();

        assert!(loader.restyle(Arc::new(MaterialKind::Metal.material())));
        assert_eq!(loader.generation(), generation);
        assert_eq!(loader.state(), ModelLoadState::Loaded);
        assert_eq!(loader.visible_scale(), scale);
        assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);

        let model = loader.model().unwrap();
        assert_eq!(model.material.kind, MaterialKind::Metal);
        for renderable in model.scene.renderables() {
            assert_eq!(renderable.mesh.material.as_ref().unwrap().kind, MaterialKind::Metal);
            assert!(renderable.mesh.cast_shadow);
        }
    }

    #[tokio::test]
    async fn test_restyle_without_model() {
        let loader = ModelLoader::default();
        assert!(!loader.restyle(Arc::new(MaterialKind::Phong.material())));
        assert_eq!(loader.state(), ModelLoadState::Idle);
    }

    #[tokio::test]
    async fn test_held_model_survives_supersede() {
        let (loader, _, _) = loader_with(
            MockTransport::default().obj("cube.obj", CUBE).obj("other.obj", CUBE),
            LoaderConfig::default(),
        );
        loader.load(LoadRequest::new("cube.obj")).await;
        let shown = loader.model().unwrap();

        loader.begin(LoadRequest::new("other.obj"));
        assert!(loader.model().is_none());
        assert_eq!(shown.scene.mesh_count(), 1);
        assert_eq!(shown.scene.renderables()[0].geometry().positions.len(), 8);
    }
}
