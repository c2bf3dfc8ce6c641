//! Adaptive Scene Parameters
//!
//! Camera placement, floor sizing and light intensities derived from the
//! measured mesh size instead of fixed constants, so a 2-unit mesh and a
//! 2000-unit mesh both end up framed and lit.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::ColorMode;
use crate::color::Color;
use crate::geometry::GeometrySummary;
use crate::normalize::NormalizationTransform;

/// Closest the adaptive camera is ever placed
pub const MIN_CAMERA_DISTANCE: f64 = 3.0;
pub const CAMERA_DISTANCE_FACTOR: f64 = 1.5;
pub const MIN_FLOOR_SIZE: f64 = 10.0;
pub const FLOOR_SIZE_FACTOR: f64 = 2.5;
/// Cap on the light scale factor so huge meshes do not blow out the scene
pub const MAX_LIGHT_SCALE: f64 = 5.0;

const LIGHT_MODE_BASE_COLOR: u32 = 0xd1d1d1;
const DARK_MODE_BASE_COLOR: u32 = 0x808080;
const DARK_MODE_GROUND_COLOR: u32 = 0x404040;

/// Which size drives the derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveBasis {
    /// Size as loaded, before scale-fit
    #[default]
    Raw,
    /// Size after normalization
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraParameters {
    pub distance: f64,
    /// Isometric placement `(d, d, d)`
    pub position: DVec3,
}

impl CameraParameters {
    pub fn derive(max_dimension: f64) -> Self {
        let distance = MIN_CAMERA_DISTANCE.max(max_dimension * CAMERA_DISTANCE_FACTOR);
        Self {
            distance,
            position: DVec3::splat(distance),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloorParameters {
    pub size: f64,
    /// One grid cell per unit
    pub divisions: u32,
}

impl FloorParameters {
    pub fn derive(max_dimension: f64) -> Self {
        let size = MIN_FLOOR_SIZE.max(max_dimension * FLOOR_SIZE_FACTOR);
        Self {
            size,
            divisions: size.floor() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightParameters {
    /// Color of the directional lights
    pub base_color: Color,
    pub ambient_color: Color,
    pub hemisphere_sky_color: Color,
    pub hemisphere_ground_color: Color,
    pub scale_factor: f64,
    pub ambient_intensity: f64,
    pub primary_intensity: f64,
    pub secondary_intensity: f64,
    pub hemisphere_intensity: f64,
}

impl LightParameters {
    pub fn derive(max_dimension: f64, mode: ColorMode) -> Self {
        let base_intensity = match mode {
            ColorMode::Dark => 1.0,
            ColorMode::Light => 1.5,
        };
        let scale_factor = (max_dimension / 2.0).min(MAX_LIGHT_SCALE);
        let scaled = base_intensity * scale_factor;

        let base_color = Color::from_hex(LIGHT_MODE_BASE_COLOR);
        let (mode_color, ground_color) = match mode {
            ColorMode::Dark => (
                Color::from_hex(DARK_MODE_BASE_COLOR),
                Color::from_hex(DARK_MODE_GROUND_COLOR),
            ),
            ColorMode::Light => (base_color, base_color),
        };

        let primary_intensity = scaled * 1.2;
        Self {
            base_color,
            ambient_color: mode_color,
            hemisphere_sky_color: mode_color,
            hemisphere_ground_color: ground_color,
            scale_factor,
            ambient_intensity: scaled * 0.8,
            primary_intensity,
            secondary_intensity: primary_intensity * 0.8,
            hemisphere_intensity: scaled * 0.5,
        }
    }
}

/// Everything derived from one mesh size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneParameters {
    pub max_dimension: f64,
    pub camera: CameraParameters,
    pub floor: FloorParameters,
    pub lights: LightParameters,
}

impl SceneParameters {
    pub fn derive(size: DVec3, mode: ColorMode) -> Self {
        let max_dimension = size.max_element();
        Self {
            max_dimension,
            camera: CameraParameters::derive(max_dimension),
            floor: FloorParameters::derive(max_dimension),
            lights: LightParameters::derive(max_dimension, mode),
        }
    }

    /// Derive from a load result using the chosen size basis
    pub fn for_model(
        summary: &GeometrySummary,
        transform: &NormalizationTransform,
        basis: AdaptiveBasis,
        mode: ColorMode,
    ) -> Self {
        let size = match basis {
            AdaptiveBasis::Raw => summary.size,
            AdaptiveBasis::Normalized => transform.normalized_bounds(summary).size(),
        };
        Self::derive(size, mode)
    }
}

impl Default for SceneParameters {
    /// Parameters for a unit-sized model in light mode
    fn default() -> Self {
        Self::derive(DVec3::ONE, ColorMode::Light)
    }
}
