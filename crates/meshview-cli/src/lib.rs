//! # Meshview CLI
//!
//! Command-line front end for the Meshview model viewer.
//!
//! ## Commands
//! - `inspect` - Load a mesh and print its details, normalization and adaptive parameters
//! - `view` - Run the viewer headlessly and report the final camera

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use meshview_assets::{
    BlobStore, HttpTransport, LoadRequest, LoaderConfig, ModelLoadState, ModelLoader,
    RoutingTransport,
};
use meshview_core::{
    AdaptiveBasis, ColorMode, MaterialKind, ModelDetails, NormalizationTransform, NormalizeOptions,
    SceneParameters,
};
use meshview_renderer::{
    CameraControl, CameraState, FrameContent, RenderBackend, RenderFrame, RendererError,
    RendererResult, Viewer, ViewerConfig,
};
use serde::Serialize;

/// Meshview model viewer CLI
#[derive(Parser)]
#[command(name = "meshview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load a mesh and print its details, normalization and adaptive parameters
    Inspect {
        /// URL or path of the OBJ file
        source: String,

        /// Ceiling on the normalization scale
        #[arg(long, default_value_t = 1.0)]
        max_scale: f64,

        /// Keep the original X/Z placement
        #[arg(long)]
        no_center: bool,

        /// Skip the content-type check
        #[arg(long)]
        no_validate: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the viewer headlessly
    View {
        /// URL or path of the OBJ file
        source: String,

        /// Frames to render after the load settles
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Dark color mode
        #[arg(long)]
        dark: bool,

        /// Material preset
        #[arg(short, long)]
        material: Option<String>,

        /// Viewer configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Frame rate of the headless loop
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
    },
}

/// Output of `inspect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub source: String,
    pub details: ModelDetails,
    pub transform: NormalizationTransform,
    pub parameters: SceneParameters,
}

impl InspectReport {
    fn print(&self) {
        let d = &self.details;
        let t = &self.transform;
        let p = &self.parameters;
        println!("{}", self.source);
        println!("  vertices:   {}", d.vertices);
        println!("  triangles:  {}", d.triangles);
        println!("  size:       {:.4} x {:.4} x {:.4}", d.size_x, d.size_y, d.size_z);
        println!("  scale:      {:.6}", t.scale);
        println!("  lift:       {:.6}", t.vertical_offset);
        println!(
            "  offset:     x {:.6}, z {:.6}{}",
            t.horizontal_offset.x,
            t.horizontal_offset.z,
            if t.center_model { "" } else { " (not centered)" }
        );
        println!("  camera:     distance {:.3}", p.camera.distance);
        println!("  floor:      {:.3} ({} divisions)", p.floor.size, p.floor.divisions);
        println!(
            "  lights:     scale {:.3}, ambient {:.3}, key {:.3}, fill {:.3}, hemisphere {:.3}",
            p.lights.scale_factor,
            p.lights.ambient_intensity,
            p.lights.primary_intensity,
            p.lights.secondary_intensity,
            p.lights.hemisphere_intensity
        );
    }
}

/// Output of `view`
#[derive(Debug)]
pub struct ViewReport {
    pub state: ModelLoadState,
    pub details: Option<ModelDetails>,
    pub camera: CameraState,
    pub frames: u64,
}

impl ViewReport {
    fn print(&self) {
        println!("state:    {}", self.state);
        if let Some(details) = &self.details {
            println!("model:    {} vertices, {} triangles", details.vertices, details.triangles);
        }
        println!("frames:   {}", self.frames);
        let (p, t) = (self.camera.position, self.camera.target);
        println!("position: ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z);
        println!("target:   ({:.4}, {:.4}, {:.4})", t.x, t.y, t.z);
        println!("distance: {:.4}", self.camera.distance);
    }
}

/// Backend that logs frame content changes instead of drawing
#[derive(Debug, Default)]
pub struct LogBackend {
    pub frames: u64,
    last: Option<String>,
}

impl LogBackend {
    fn describe(content: &FrameContent) -> String {
        match content {
            FrameContent::Empty => "empty scene".to_string(),
            FrameContent::Placeholder(placeholder) => placeholder.label.clone(),
            FrameContent::Model { model, .. } => {
                format!("{} ({} triangles)", model.url, model.details.triangles)
            }
        }
    }
}

impl RenderBackend for LogBackend {
    fn draw(&mut self, frame: &RenderFrame) -> RendererResult<()> {
        let camera = frame
            .camera
            .as_ref()
            .ok_or_else(|| RendererError::Backend("frame has no camera".to_string()))?;
        self.frames += 1;
        let summary = Self::describe(&frame.content);

        if let FrameContent::Model { scale, .. } = &frame.content {
            log::debug!(
                "Frame {}: scale {scale:.4}, camera distance {:.3}",
                self.frames,
                camera.distance
            );
        }
        if self.last.as_deref() != Some(summary.as_str()) {
            log::info!("Frame {}: {summary}", self.frames);
            self.last = Some(summary);
        }
        Ok(())
    }
}

fn transport(config: &LoaderConfig) -> RoutingTransport {
    let http = HttpTransport::default().with_timeout(config.timeout());
    RoutingTransport::new(http, Arc::new(BlobStore::new()))
}

/// Load `source` and derive everything the viewer would show for it
pub async fn inspect(source: &str, config: LoaderConfig) -> Result<InspectReport> {
    let loader = ModelLoader::new(Arc::new(transport(&config)), config);
    let state = loader.load(LoadRequest::new(source)).await;
    if let ModelLoadState::Error(message) = state {
        bail!("Failed to load {source}: {message}");
    }

    let model = loader.model().context("Load finished without a model")?;
    let parameters = SceneParameters::for_model(
        &model.summary,
        &model.transform,
        AdaptiveBasis::Raw,
        ColorMode::Light,
    );

    Ok(InspectReport {
        source: source.to_string(),
        details: model.details.clone(),
        transform: model.transform,
        parameters,
    })
}

/// Viewer configuration from an optional JSON file plus flag overrides
pub fn load_viewer_config(
    path: Option<&Path>,
    dark: bool,
    material: Option<&str>,
) -> Result<ViewerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid viewer config {}", path.display()))?
        }
        None => ViewerConfig::default(),
    };

    if dark {
        config.mode = ColorMode::Dark;
    }
    if let Some(name) = material {
        config.material = name
            .parse::<MaterialKind>()
            .with_context(|| format!("Choose one of: {}", material_names()))?;
    }
    Ok(config)
}

fn material_names() -> String {
    MaterialKind::ALL
        .iter()
        .map(MaterialKind::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the viewer: frames keep rendering while the model loads, then
/// `frames` more are drawn
pub async fn view(source: &str, frames: u32, fps: f64, config: ViewerConfig) -> Result<ViewReport> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("Frame rate must be positive, got {fps}");
    }
    let dt = 1.0 / fps;

    let mut viewer = Viewer::new(config)?;
    viewer.mount();
    let mut backend = LogBackend::default();

    let load = viewer.spawn_source(source);
    while viewer.state().is_loading() {
        viewer.render(dt, &mut backend)?;
        tokio::time::sleep(Duration::from_secs_f64(dt)).await;
    }
    if let Some(load) = load {
        load.await.context("Load task failed")?;
    }

    for _ in 0..frames {
        viewer.render(dt, &mut backend)?;
    }

    if let ModelLoadState::Error(message) = viewer.state() {
        log::warn!("Viewer settled in error state: {message}");
    }
    let camera = viewer.camera().camera_state().context("Camera is not mounted")?;

    Ok(ViewReport {
        state: viewer.state(),
        details: viewer.details(),
        camera,
        frames: backend.frames,
    })
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match cli.command {
        Commands::Inspect {
            source,
            max_scale,
            no_center,
            no_validate,
            json,
        } => {
            if !(max_scale.is_finite() && max_scale > 0.0) {
                bail!("--max-scale must be positive, got {max_scale}");
            }
            let config = LoaderConfig {
                normalize: NormalizeOptions {
                    max_scale,
                    center_model: !no_center,
                    ..NormalizeOptions::default()
                },
                validate_content_type: !no_validate,
                ..LoaderConfig::default()
            };

            let report = runtime.block_on(inspect(&source, config))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
        }

        Commands::View {
            source,
            frames,
            dark,
            material,
            config,
            fps,
        } => {
            let config = load_viewer_config(config.as_deref(), dark, material.as_deref())?;
            log::info!("Viewing {source} ({:?} mode, {} material)", config.mode, config.material);

            let report = runtime.block_on(view(&source, frames, fps, config))?;
            report.print();
        }
    }

    Ok(())
}
