//! Viewer Composition
//!
//! Assembles background, camera, lights, floor and the loader's render
//! subtree into one frame. The host drives it once per frame with
//! [`Viewer::frame`] (or [`Viewer::render`] with a [`RenderBackend`]) and
//! changes the model with [`Viewer::set_source`].

use std::sync::Arc;

use bitflags::bitflags;
use glam::{DVec3, Mat4};
use meshview_assets::{
    BlobStore, HttpTransport, LoadRequest, LoadTicket, LoadedModel, LoaderConfig, ModelLoadState,
    ModelLoader, RoutingTransport,
};
use meshview_core::adaptive::LightParameters;
use meshview_core::{
    AdaptiveBasis, Color, ColorMode, MaterialKind, ModelDetails, NormalizeOptions, SceneParameters,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::camera::{
    CameraConfig, CameraControl, CameraController, CameraState, merge_camera_config,
};
use crate::floor::GridFloor;
use crate::lighting::LightRig;
use crate::placeholder::Placeholder;
use crate::{RendererError, RendererResult};

bitflags! {
    /// Optional scene features
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ViewerFlags: u8 {
        const GRID = 0b0001;
        const AXES = 0b0010;
        const SHADOWS = 0b0100;
        /// Reposition the camera from each loaded model's size
        const ADAPTIVE_CAMERA = 0b1000;
    }
}

impl Default for ViewerFlags {
    fn default() -> Self {
        Self::GRID | Self::SHADOWS | Self::ADAPTIVE_CAMERA
    }
}

/// Viewer configuration, readable from camelCase JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    pub mode: ColorMode,
    pub material: MaterialKind,
    pub flags: ViewerFlags,
    pub camera: CameraConfig,
    pub loader: LoaderConfig,
    /// Size the adaptive camera, lights and floor are derived from
    pub adaptive_basis: AdaptiveBasis,
    /// Ceiling on the normalization scale for every load
    pub max_model_scale: Option<f64>,
    /// Replaces the mode's background color
    pub background: Option<Color>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::default(),
            material: MaterialKind::default(),
            flags: ViewerFlags::default(),
            camera: CameraConfig::default(),
            loader: LoaderConfig::default(),
            adaptive_basis: AdaptiveBasis::default(),
            max_model_scale: None,
            background: None,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> RendererResult<()> {
        if let Some(scale) = self.max_model_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(RendererError::InvalidConfig(format!(
                    "maxModelScale must be positive, got {scale}"
                )));
            }
        }
        if let Some(fov) = self.camera.fov {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(RendererError::InvalidConfig(format!(
                    "fov must be between 0 and 180 degrees, got {fov}"
                )));
            }
        }
        if self.loader.timeout_ms == 0 {
            return Err(RendererError::InvalidConfig("timeoutMs must be non-zero".into()));
        }
        let target = self.loader.normalize.target_size;
        if !(target.is_finite() && target > 0.0) {
            return Err(RendererError::InvalidConfig(format!(
                "targetSize must be positive, got {target}"
            )));
        }
        Ok(())
    }

    /// Normalization options for the next load
    pub fn normalize_options(&self) -> NormalizeOptions {
        let mut options = self.loader.normalize;
        if let Some(max_scale) = self.max_model_scale {
            options.max_scale = max_scale;
        }
        options
    }

    pub fn background_color(&self) -> Color {
        self.background.unwrap_or_else(|| self.mode.background())
    }
}

/// What occupies the model slot this frame
#[derive(Debug, Clone)]
pub enum FrameContent {
    /// No source set
    Empty,
    Placeholder(Placeholder),
    Model {
        model: Arc<LoadedModel>,
        /// Replaces the transform of `model.scene`'s root while scaling in
        root: Mat4,
        scale: f64,
    },
}

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub background: Color,
    /// `None` until the viewer is mounted
    pub camera: Option<CameraState>,
    /// Vertical field of view in degrees
    pub fov: f64,
    pub lights: LightRig,
    pub floor: Option<GridFloor>,
    /// Axes helper length
    pub axes: Option<f32>,
    pub state: ModelLoadState,
    pub content: FrameContent,
}

/// Drawing seam for hosts
pub trait RenderBackend {
    fn draw(&mut self, frame: &RenderFrame) -> RendererResult<()>;
}

/// Loader, camera, lights and floor composed into one scene
pub struct Viewer {
    config: ViewerConfig,
    loader: ModelLoader,
    camera: CameraController,
    params: SceneParameters,
    lights: LightRig,
    floor: GridFloor,
    source: Option<String>,
    applied_generation: Option<u64>,
}

impl Viewer {
    /// Viewer loading over HTTP and from local files
    pub fn new(config: ViewerConfig) -> RendererResult<Self> {
        Self::with_blobs(config, Arc::new(BlobStore::new()))
    }

    /// Viewer that additionally serves `blob:` sources from `blobs`
    pub fn with_blobs(config: ViewerConfig, blobs: Arc<BlobStore>) -> RendererResult<Self> {
        let http = HttpTransport::default().with_timeout(config.loader.timeout());
        let transport = RoutingTransport::new(http, blobs);
        let loader = ModelLoader::new(Arc::new(transport), config.loader.clone());
        Self::with_loader(config, loader)
    }

    pub fn with_loader(config: ViewerConfig, loader: ModelLoader) -> RendererResult<Self> {
        config.validate()?;
        let params = SceneParameters::derive(DVec3::ONE, config.mode);

        Ok(Self {
            camera: CameraController::new(merge_camera_config(None, &config.camera)),
            lights: LightRig::from_parameters(&params.lights),
            floor: GridFloor::from_parameters(&params.floor),
            params,
            loader,
            config,
            source: None,
            applied_generation: None,
        })
    }

    /// Create the camera controls
    pub fn mount(&mut self) {
        self.camera.mount();
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn scene_parameters(&self) -> &SceneParameters {
        &self.params
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn floor(&self) -> &GridFloor {
        &self.floor
    }

    pub fn state(&self) -> ModelLoadState {
        self.loader.state()
    }

    /// Progress while loading
    pub fn progress(&self) -> Option<u8> {
        self.loader.state().progress()
    }

    /// Details record of the shown model
    pub fn details(&self) -> Option<ModelDetails> {
        self.loader.model().map(|model| model.details.clone())
    }

    fn request(&self, url: &str) -> LoadRequest {
        LoadRequest::new(url)
            .with_material_kind(self.config.material)
            .with_options(self.config.normalize_options())
    }

    /// Point the viewer at a new source.
    ///
    /// Changing the URL drops the previous model and starts a fresh load
    /// cycle whose ticket the caller must fetch and complete (or spawn).
    /// Setting the same URL again is a no-op and returns `None`, as does
    /// clearing the source.
    pub fn set_source(&mut self, url: Option<&str>) -> Option<LoadTicket> {
        if self.source.as_deref() == url {
            return None;
        }
        self.source = url.map(str::to_string);

        match url {
            Some(url) => Some(self.loader.begin(self.request(url))),
            None => {
                log::debug!("Source cleared");
                self.loader.clear();
                None
            }
        }
    }

    /// Set the source and load it on the calling task
    pub async fn load_source(&mut self, url: &str) -> ModelLoadState {
        if let Some(ticket) = self.set_source(Some(url)) {
            let loader = self.loader.clone();
            let result = loader.fetch(&ticket).await;
            loader.complete(ticket, result);
        }
        self.sync();
        self.state()
    }

    /// Set the source and load it on the runtime while frames keep running
    pub fn spawn_source(&mut self, url: &str) -> Option<JoinHandle<bool>> {
        self.set_source(Some(url))
            .map(|ticket| self.loader.spawn_load(ticket))
    }

    /// Switch material. A shown model is re-dressed in place; camera,
    /// scene parameters and the scale-in carry on. Returns whether a model
    /// was re-dressed.
    pub fn set_material(&mut self, kind: MaterialKind) -> bool {
        if self.config.material == kind {
            return false;
        }
        self.config.material = kind;
        self.loader.restyle(Arc::new(kind.material()))
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.config.mode == mode {
            return;
        }
        self.config.mode = mode;
        self.params.lights = LightParameters::derive(self.params.max_dimension, mode);
        self.lights = LightRig::from_parameters(&self.params.lights);
    }

    pub fn set_flags(&mut self, flags: ViewerFlags) {
        self.config.flags = flags;
    }

    /// Apply adaptive parameters for a newly loaded model. Returns whether
    /// anything changed.
    pub fn sync(&mut self) -> bool {
        let Some((generation, model)) = self.loader.loaded() else {
            return false;
        };
        // a load begun before the last material switch completes in the old one
        if model.material.kind != self.config.material {
            self.loader.restyle(Arc::new(self.config.material.material()));
        }
        if self.applied_generation == Some(generation) {
            return false;
        }
        self.applied_generation = Some(generation);

        let params = SceneParameters::for_model(
            &model.summary,
            &model.transform,
            self.config.adaptive_basis,
            self.config.mode,
        );
        self.lights = LightRig::from_parameters(&params.lights);
        self.floor = GridFloor::from_parameters(&params.floor);
        if self.config.flags.contains(ViewerFlags::ADAPTIVE_CAMERA) {
            self.camera
                .apply_config(merge_camera_config(Some(&params.camera), &self.config.camera));
        }
        self.params = params;

        log::info!(
            "Scene adapted to {} (max dimension {:.3}, camera distance {:.3})",
            model.url,
            params.max_dimension,
            params.camera.distance
        );
        true
    }

    /// Advance animation and camera damping and describe the frame
    pub fn frame(&mut self, dt: f64) -> RenderFrame {
        self.sync();
        let scale = self.loader.tick(dt);
        self.camera.tick();

        let state = self.loader.state();
        let content = match (&state, self.loader.model()) {
            (ModelLoadState::Loaded, Some(model)) => FrameContent::Model {
                root: model.transform.matrix_at(scale),
                model,
                scale,
            },
            (ModelLoadState::Idle, _) => FrameContent::Empty,
            _ => Placeholder::for_state(&state, self.config.mode)
                .map(FrameContent::Placeholder)
                .unwrap_or(FrameContent::Empty),
        };

        let flags = self.config.flags;
        let lights = if flags.contains(ViewerFlags::SHADOWS) {
            self.lights.clone()
        } else {
            self.lights.clone().without_shadows()
        };

        RenderFrame {
            background: self.config.background_color(),
            camera: self.camera.camera_state(),
            fov: self.camera.config().fov,
            lights,
            floor: flags.contains(ViewerFlags::GRID).then(|| self.floor.clone()),
            axes: flags
                .contains(ViewerFlags::AXES)
                .then_some(self.floor.size / 2.0),
            state,
            content,
        }
    }

    pub fn render(&mut self, dt: f64, backend: &mut dyn RenderBackend) -> RendererResult<()> {
        let frame = self.frame(dt);
        backend.draw(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_assets::AssetCache;

    const CUBE: &str = "\
o cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 4 8 7 3
f 1 5 8 4
f 2 3 7 6
";

    /// Cube scaled by `size`, registered as a blob
    fn cube_blob(store: &BlobStore, size: f64) -> String {
        let mut text = String::new();
        for line in CUBE.lines() {
            match line.strip_prefix("v ") {
                Some(coords) => {
                    let scaled: Vec<String> = coords
                        .split_whitespace()
                        .map(|c| (c.parse::<f64>().unwrap() * size).to_string())
                        .collect();
                    text.push_str(&format!("v {}\n", scaled.join(" ")));
                }
                None => {
                    text.push_str(line);
                    text.push('\n');
                }
            }
        }
        store.register(text.into_bytes(), Some("model/obj"))
    }

    fn viewer(config: ViewerConfig) -> (Viewer, Arc<BlobStore>) {
        let store = Arc::new(BlobStore::new());
        let mut viewer = Viewer::with_blobs(config, Arc::clone(&store)).unwrap();
        viewer.mount();
        (viewer, store)
    }

    fn approx(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-6
    }

    #[derive(Default)]
    struct RecordingBackend {
        frames: Vec<RenderFrame>,
    }

    impl RenderBackend for RecordingBackend {
        fn draw(&mut self, frame: &RenderFrame) -> RendererResult<()> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn test_idle_viewer() {
        let (mut viewer, _) = viewer(ViewerConfig::default());
        let frame = viewer.frame(1.0 / 60.0);

        assert_eq!(frame.state, ModelLoadState::Idle);
        assert!(matches!(frame.content, FrameContent::Empty));
        assert_eq!(frame.background.to_hex(), 0xf0f0f0);
        assert!(approx(frame.camera.unwrap().position, DVec3::splat(3.0)));
        assert_eq!(frame.floor.unwrap().size, 10.0);
        assert!(frame.axes.is_none());
        assert_eq!(frame.fov, 45.0);
    }

    #[tokio::test]
    async fn test_load_adapts_scene() {
        let (mut viewer, store) = viewer(ViewerConfig::default());
        let url = cube_blob(&store, 10.0);

        let state = viewer.load_source(&url).await;
        assert_eq!(state, ModelLoadState::Loaded);

        let params = viewer.scene_parameters();
        assert!((params.max_dimension - 10.0).abs() < 1e-9);
        assert_eq!(viewer.floor().size, 25.0);
        assert_eq!(viewer.floor().divisions, 25);

        let camera = viewer.camera().camera_state().unwrap();
        assert!(approx(camera.position, DVec3::splat(15.0)));
        assert!(approx(camera.target, DVec3::ZERO));

        let details = viewer.details().unwrap();
        assert_eq!(details.vertices, 8);
        assert!((details.size_x - 10.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_normalized_basis() {
        let config = ViewerConfig {
            adaptive_basis: AdaptiveBasis::Normalized,
            ..ViewerConfig::default()
        };
        let (mut viewer, store) = viewer(config);
        let url = cube_blob(&store, 10.0);
        viewer.load_source(&url).await;

        assert!((viewer.scene_parameters().max_dimension - 0.75).abs() < 1e-6);
        let camera = viewer.camera().camera_state().unwrap();
        assert!(approx(camera.position, DVec3::splat(3.0)));
    }

    #[tokio::test]
    async fn test_caller_camera_config_wins() {
        let config = ViewerConfig {
            camera: CameraConfig {
                initial_position: Some([0.0, 4.0, 8.0]),
                ..CameraConfig::default()
            },
            ..ViewerConfig::default()
        };
        let (mut viewer, store) = viewer(config);
        let url = cube_blob(&store, 10.0);
        viewer.load_source(&url).await;

        let camera = viewer.camera().camera_state().unwrap();
        assert!(approx(camera.position, DVec3::new(0.0, 4.0, 8.0)));
        assert_eq!(viewer.camera().config().max_distance, 200.0);
    }

    #[tokio::test]
    async fn test_adaptive_camera_disabled() {
        let config = ViewerConfig {
            flags: ViewerFlags::GRID,
            ..ViewerConfig::default()
        };
        let (mut viewer, store) = viewer(config);
        let url = cube_blob(&store, 10.0);
        viewer.load_source(&url).await;

        let camera = viewer.camera().camera_state().unwrap();
        assert!(approx(camera.position, DVec3::splat(3.0)));
        assert_eq!(viewer.floor().size, 25.0);
    }

    #[tokio::test]
    async fn test_frames_scale_model_in() {
        let (mut viewer, store) = viewer(ViewerConfig::default());
        let url = cube_blob(&store, 1.0);
        viewer.load_source(&url).await;

        let FrameContent::Model { scale, .. } = viewer.frame(1.0 / 60.0).content else {
            panic!("expected model content");
        };
        assert!(scale > 0.0 && scale < 0.75);

        let mut last = scale;
        for _ in 0..120 {
            let FrameContent::Model { scale, root, model } = viewer.frame(1.0 / 60.0).content
            else {
                panic!("expected model content");
            };
            assert!(scale >= last);
            last = scale;
            assert_eq!(root, model.transform.matrix_at(scale));
        }
        assert!((last - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_keyed_remount() {
        let (mut viewer, store) = viewer(ViewerConfig::default());
        let first = cube_blob(&store, 1.0);
        let second = cube_blob(&store, 2.0);

        let ticket = viewer.set_source(Some(&first)).unwrap();
        assert!(viewer.set_source(Some(&first)).is_none());
        assert!(matches!(
            viewer.frame(0.0).content,
            FrameContent::Placeholder(ref p) if p.label == "Loading: 0%"
        ));

        let stale = ticket;
        let ticket = viewer.set_source(Some(&second)).unwrap();
        assert!(stale.is_cancelled());
        assert!(!viewer.loader().is_current(&stale));

        let loader = viewer.loader().clone();
        let result = loader.fetch(&ticket).await;
        assert!(loader.complete(ticket, result));
        viewer.frame(0.0);
        assert!((viewer.scene_parameters().max_dimension - 2.0).abs() < 1e-9);

        assert!(viewer.set_source(None).is_none());
        let frame = viewer.frame(0.0);
        assert_eq!(frame.state, ModelLoadState::Idle);
        assert!(matches!(frame.content, FrameContent::Empty));
        assert!(viewer.details().is_none());
    }

    #[tokio::test]
    async fn test_error_placeholder() {
        let (mut viewer, _) = viewer(ViewerConfig::default());
        let state = viewer.load_source("blob:meshview/missing").await;
        assert_eq!(state.error(), Some("Model not found: blob:meshview/missing"));

        let FrameContent::Placeholder(placeholder) = viewer.frame(0.0).content else {
            panic!("expected placeholder");
        };
        assert_eq!(placeholder.label, "Error: Model not found: blob:meshview/missing");
        assert_eq!(placeholder.color, Color::RED);
    }

    #[tokio::test]
    async fn test_material_change_redresses_in_place() {
        let (mut viewer, store) = viewer(ViewerConfig::default());
        let url = cube_blob(&store, 1.0);
        viewer.load_source(&url).await;
        for _ in 0..10 {
            viewer.frame(1.0 / 60.0);
        }
        viewer.camera_mut().set_position(DVec3::new(0.0, 2.0, 20.0));
        viewer.frame(1.0 / 60.0);

        let generation = viewer.loader().generation();
        let position = viewer.camera().camera_state().unwrap().position;
        let scale = viewer.loader().visible_scale();

        assert!(viewer.set_material(MaterialKind::Metal));
        let frame = viewer.frame(0.0);

        assert_eq!(frame.state, ModelLoadState::Loaded);
        let FrameContent::Model { model, scale: shown, .. } = frame.content else {
            panic!("expected model content");
        };
        assert_eq!(model.material.kind, MaterialKind::Metal);
        assert_eq!(shown, scale);
        assert_eq!(viewer.loader().generation(), generation);
        assert!(approx(frame.camera.unwrap().position, position));
        assert_eq!(viewer.loader().cache().stats(), (0, 1));
        assert!(!viewer.set_material(MaterialKind::Metal));
    }

    #[tokio::test]
    async fn test_material_switch_during_load() {
        let (mut viewer, store) = viewer(ViewerConfig::default());
        let url = cube_blob(&store, 1.0);

        let ticket = viewer.set_source(Some(&url)).unwrap();
        assert!(!viewer.set_material(MaterialKind::Phong));

        let loader = viewer.loader().clone();
        let result = loader.fetch(&ticket).await;
        assert!(loader.complete(ticket, result));
        viewer.frame(0.0);

        let model = viewer.loader().model().unwrap();
        assert_eq!(model.material.kind, MaterialKind::Phong);
    }

    #[tokio::test]
    async fn test_viewers_share_cache() {
        let store = Arc::new(BlobStore::new());
        let url = cube_blob(&store, 1.0);
        let cache = Arc::new(AssetCache::new());

        for _ in 0..2 {
            let transport = RoutingTransport::new(HttpTransport::default(), Arc::clone(&store));
            let loader = ModelLoader::new(Arc::new(transport), LoaderConfig::default())
                .with_cache(Arc::clone(&cache));
            let mut viewer = Viewer::with_loader(ViewerConfig::default(), loader).unwrap();
            assert_eq!(viewer.load_source(&url).await, ModelLoadState::Loaded);
        }
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_material_change_without_source() {
        let (mut viewer, _) = viewer(ViewerConfig::default());
        assert!(!viewer.set_material(MaterialKind::Phong));
        assert_eq!(viewer.config().material, MaterialKind::Phong);
    }

    #[test]
    fn test_color_mode_switch() {
        let (mut viewer, _) = viewer(ViewerConfig::default());
        viewer.set_color_mode(ColorMode::Dark);

        let frame = viewer.frame(0.0);
        assert_eq!(frame.background.to_hex(), 0x1a1a1a);
        assert_eq!(frame.lights.ambient.color.to_hex(), 0x808080);
    }

    #[test]
    fn test_flags_shape_frame() {
        let config = ViewerConfig {
            flags: ViewerFlags::AXES,
            background: Some(Color::from_hex(0x102030)),
            ..ViewerConfig::default()
        };
        let (mut viewer, _) = viewer(config);
        let frame = viewer.frame(0.0);

        assert!(frame.floor.is_none());
        assert_eq!(frame.axes, Some(5.0));
        assert_eq!(frame.lights.shadow_casters().count(), 0);
        assert_eq!(frame.background.to_hex(), 0x102030);

        viewer.set_flags(ViewerFlags::default());
        let frame = viewer.frame(0.0);
        assert!(frame.floor.is_some());
        assert!(frame.axes.is_none());
        assert_eq!(frame.lights.shadow_casters().count(), 1);
    }

    #[test]
    fn test_render_hands_frame_to_backend() {
        let (mut viewer, _) = viewer(ViewerConfig::default());
        let mut backend = RecordingBackend::default();
        viewer.render(1.0 / 60.0, &mut backend).unwrap();
        viewer.render(1.0 / 60.0, &mut backend).unwrap();
        assert_eq!(backend.frames.len(), 2);
    }

    #[test]
    fn test_config_validation() {
        let bad_scale = ViewerConfig {
            max_model_scale: Some(0.0),
            ..ViewerConfig::default()
        };
        assert!(matches!(bad_scale.validate(), Err(RendererError::InvalidConfig(_))));

        let bad_fov = ViewerConfig {
            camera: CameraConfig {
                fov: Some(180.0),
                ..CameraConfig::default()
            },
            ..ViewerConfig::default()
        };
        assert!(Viewer::new(bad_fov).is_err());
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config: ViewerConfig = serde_json::from_str(
            r##"{
                "mode": "dark",
                "material": "phong",
                "flags": "GRID | AXES",
                "maxModelScale": 0.5,
                "background": "#202020",
                "camera": { "minDistance": 4 },
                "loader": { "validateContentType": false }
            }"##,
        )
        .unwrap();

        assert_eq!(config.mode, ColorMode::Dark);
        assert_eq!(config.material, MaterialKind::Phong);
        assert_eq!(config.flags, ViewerFlags::GRID | ViewerFlags::AXES);
        assert_eq!(config.normalize_options().max_scale, 0.5);
        assert_eq!(config.background_color().to_hex(), 0x202020);
        assert_eq!(config.camera.min_distance, Some(4.0));
        assert!(!config.loader.validate_content_type);
        assert_eq!(config.loader.timeout_ms, 300_000);
    }
}
