//! # Meshview Renderer
//!
//! Backend-agnostic scene composition for the Meshview model viewer.
//!
//! ## Features
//! - Size-adaptive light rig with a single shadow-casting key light
//! - Grid floor with a translucent shadow plane
//! - Loading/error placeholder
//! - Damped orbit camera behind an imperative [`CameraControl`] trait
//! - [`Viewer`] composing all of it with the model loader into per-frame
//!   [`RenderFrame`]s for a [`RenderBackend`]

pub mod camera;
pub mod floor;
pub mod lighting;
pub mod placeholder;
pub mod viewer;

pub use camera::{
    CameraConfig, CameraControl, CameraController, CameraState, OrbitControls,
    ResolvedCameraConfig, merge_camera_config,
};
pub use floor::{GridFloor, GridLine};
pub use lighting::{Light, LightRig, LightType, ShadowSettings};
pub use placeholder::Placeholder;
pub use viewer::{FrameContent, RenderBackend, RenderFrame, Viewer, ViewerConfig, ViewerFlags};

use thiserror::Error;

/// Renderer errors
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Invalid viewer configuration: {0}")]
    InvalidConfig(String),

    #[error("Render backend failed: {0}")]
    Backend(String),
}

/// Result type for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;
