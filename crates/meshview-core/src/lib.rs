//! # Meshview Core
//!
//! Geometry side of the Meshview model viewer.
//!
//! This crate provides the synchronous, renderer-agnostic pieces of the pipeline:
//! - **Scene**: Typed mesh tree with a worklist traversal yielding world matrices
//! - **Geometry**: Bounds, center, size and vertex/triangle statistics
//! - **Normalize**: Uniform scale-fit, floor grounding and X/Z centering
//! - **Adaptive**: Camera, floor and light parameters derived from mesh size
//! - **Animation**: Fixed-step scale-in easing
//! - **Material**: Closed set of material presets

pub mod adaptive;
pub mod animation;
pub mod color;
pub mod geometry;
pub mod material;
pub mod math;
pub mod normalize;
pub mod scene;

use serde::{Deserialize, Serialize};

pub use adaptive::{
    AdaptiveBasis, CameraParameters, FloorParameters, LightParameters, SceneParameters,
};
pub use animation::{FixedTimeStep, FrameClock, ScaleAnimation};
pub use color::Color;
pub use geometry::{GeometryError, GeometrySummary, ModelDetails};
pub use material::{Material, MaterialKind};
pub use math::Aabb;
pub use normalize::{NormalizationTransform, NormalizeOptions};
pub use scene::{Geometry, MeshData, MeshScene, SceneNode, Topology, Transform};

/// Light or dark presentation of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    /// Scene clear color
    pub fn background(&self) -> Color {
        match self {
            Self::Light => Color::from_hex(0xf0f0f0),
            Self::Dark => Color::from_hex(0x1a1a1a),
        }
    }

    /// Color of text drawn over the scene
    pub fn foreground(&self) -> Color {
        match self {
            Self::Light => Color::BLACK,
            Self::Dark => Color::WHITE,
        }
    }
}
