//! Mesh Normalizer
//!
//! Derives the uniform scale and offsets that fit any mesh into the canonical
//! viewing volume, resting on the floor plane and centered on X/Z.

use glam::{DVec3, Mat4};
use serde::{Deserialize, Serialize};

use crate::geometry::GeometrySummary;
use crate::math::Aabb;
use crate::scene::{MeshScene, Transform};

/// Canonical extent the largest mesh dimension is fitted to
pub const DEFAULT_TARGET_SIZE: f64 = 0.75;

/// Caller-controlled normalization knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeOptions {
    /// Ceiling on the computed scale
    pub max_scale: f64,
    /// Move the X/Z center onto the origin
    pub center_model: bool,
    /// Canonical extent of the largest dimension
    pub target_size: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_scale: 1.0,
            center_model: true,
            target_size: DEFAULT_TARGET_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HorizontalOffset {
    pub x: f64,
    pub z: f64,
}

/// Scale and offsets derived once per load
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationTransform {
    pub scale: f64,
    /// Lifts the scaled mesh so its lowest point sits at `y = 0`
    pub vertical_offset: f64,
    /// Scaled X/Z center, subtracted when `center_model` is set
    pub horizontal_offset: HorizontalOffset,
    pub center_model: bool,
}

impl NormalizationTransform {
    pub fn from_summary(summary: &GeometrySummary, options: &NormalizeOptions) -> Self {
        let max_dimension = summary.max_dimension();
        let base_scale = if max_dimension > 0.0 {
            options.target_size / max_dimension
        } else {
            1.0
        };
        let scale = base_scale.min(options.max_scale);

        Self {
            scale,
            vertical_offset: -(summary.bounding_min.y * scale),
            horizontal_offset: HorizontalOffset {
                x: summary.center.x * scale,
                z: summary.center.z * scale,
            },
            center_model: options.center_model,
        }
    }

    /// Translation for the mesh shown at `visible_scale`.
    ///
    /// Offsets shrink with the visible scale, so a mesh growing in during the
    /// scale-in animation stays grounded and centered on every frame.
    pub fn translation_at(&self, visible_scale: f64) -> DVec3 {
        let ratio = if self.scale > 0.0 {
            visible_scale / self.scale
        } else {
            0.0
        };
        let (x, z) = if self.center_model {
            (-self.horizontal_offset.x * ratio, -self.horizontal_offset.z * ratio)
        } else {
            (0.0, 0.0)
        };
        DVec3::new(x, self.vertical_offset * ratio, z)
    }

    pub fn transform_at(&self, visible_scale: f64) -> Transform {
        Transform::from_scale_translation(
            visible_scale as f32,
            self.translation_at(visible_scale).as_vec3(),
        )
    }

    pub fn matrix_at(&self, visible_scale: f64) -> Mat4 {
        self.transform_at(visible_scale).local_matrix()
    }

    /// Fully scaled-in matrix
    pub fn matrix(&self) -> Mat4 {
        self.matrix_at(self.scale)
    }

    /// Bounds of the summarized mesh after normalization
    pub fn normalized_bounds(&self, summary: &GeometrySummary) -> Aabb {
        let offset = self.translation_at(self.scale);
        Aabb::new(
            summary.bounding_min * self.scale + offset,
            summary.bounding_max * self.scale + offset,
        )
    }

    /// Clone `original` under a root carrying this transform.
    ///
    /// The original is never touched, so normalizing the same cached scene
    /// twice yields identical results.
    pub fn apply(&self, original: &MeshScene) -> MeshScene {
        original
            .clone()
            .wrapped("normalized", self.transform_at(self.scale))
    }
}

impl Default for NormalizationTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            vertical_offset: 0.0,
            horizontal_offset: HorizontalOffset::default(),
            center_model: true,
        }
    }
}
