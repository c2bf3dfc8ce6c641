//! Geometry Analyzer
//!
//! Measures a loaded [`MeshScene`]: world-space bounds, center, size and
//! vertex/triangle counts. The summary is computed once per load and is the
//! single input of both the normalizer and the adaptive scene parameters.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Aabb;
use crate::scene::MeshScene;

/// Malformed attribute buffers found while measuring a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Index {index} out of range for {vertex_count} vertices in '{node}'")]
    IndexOutOfRange {
        node: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("Non-finite vertex position in '{node}'")]
    NonFinitePosition { node: String },
}

/// Immutable measurements of one loaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometrySummary {
    pub bounding_min: DVec3,
    pub bounding_max: DVec3,
    pub center: DVec3,
    pub size: DVec3,
    pub vertex_count: u64,
    pub triangle_count: u64,
}

impl GeometrySummary {
    /// Stand-in for scenes without vertices: a unit box at the origin
    pub const DEGENERATE: Self = Self {
        bounding_min: DVec3::splat(-0.5),
        bounding_max: DVec3::splat(0.5),
        center: DVec3::ZERO,
        size: DVec3::ONE,
        vertex_count: 0,
        triangle_count: 0,
    };

    /// Measure a scene, falling back to [`GeometrySummary::DEGENERATE`] on
    /// malformed buffers so downstream stages always get a usable value.
    pub fn analyze(scene: &MeshScene) -> Self {
        match Self::try_analyze(scene) {
            Ok(summary) => summary,
            Err(err) => {
                log::warn!("Geometry analysis failed, using unit bounds: {err}");
                Self::DEGENERATE
            }
        }
    }

    /// Measure a scene, reporting malformed buffers
    pub fn try_analyze(scene: &MeshScene) -> Result<Self, GeometryError> {
        let mut bounds = Aabb::EMPTY;
        let mut vertex_count = 0u64;
        let mut triangle_count = 0u64;

        for renderable in scene.renderables() {
            let geometry = renderable.geometry();
            let world = renderable.world.as_dmat4();

            if let Some(indices) = &geometry.indices {
                if let Some(&index) = indices
                    .iter()
                    .find(|&&i| i as usize >= geometry.positions.len())
                {
                    return Err(GeometryError::IndexOutOfRange {
                        node: renderable.name.to_string(),
                        index,
                        vertex_count: geometry.positions.len(),
                    });
                }
            }

            for position in &geometry.positions {
                if !position.is_finite() {
                    return Err(GeometryError::NonFinitePosition {
                        node: renderable.name.to_string(),
                    });
                }
                bounds.expand_to_include(world.transform_point3(position.as_dvec3()));
            }

            vertex_count += geometry.vertex_count() as u64;
            triangle_count += geometry.triangle_count() as u64;
        }

        if vertex_count == 0 || bounds.is_empty() {
            return Ok(Self::DEGENERATE);
        }

        Ok(Self::from_bounds(bounds, vertex_count, triangle_count))
    }

    /// Build a summary from precomputed bounds
    pub fn from_bounds(bounds: Aabb, vertex_count: u64, triangle_count: u64) -> Self {
        Self {
            bounding_min: bounds.min,
            bounding_max: bounds.max,
            center: bounds.center(),
            size: bounds.size(),
            vertex_count,
            triangle_count,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.bounding_min, self.bounding_max)
    }

    /// Largest of the three extents
    pub fn max_dimension(&self) -> f64 {
        self.size.max_element()
    }

    pub fn is_degenerate(&self) -> bool {
        self.vertex_count == 0
    }

    /// Record handed to the details panel
    pub fn details(&self) -> ModelDetails {
        ModelDetails {
            vertices: self.vertex_count,
            triangles: self.triangle_count,
            size_x: self.size.x,
            size_y: self.size.y,
            size_z: self.size.z,
            bounding_box: Some(BoundingBoxRecord {
                min: self.bounding_min.to_array(),
                max: self.bounding_max.to_array(),
            }),
        }
    }
}

impl Default for GeometrySummary {
    fn default() -> Self {
        Self::DEGENERATE
    }
}

/// Details record emitted once per successful load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetails {
    pub vertices: u64,
    pub triangles: u64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBoxRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxRecord {
    pub min: [f64; 3],
    pub max: [f64; 3],
}
