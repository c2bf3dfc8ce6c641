//! Loading placeholder
//!
//! Wireframe unit cube with a status label, shown whenever no model is
//! loaded.

use glam::Vec3;
use meshview_assets::ModelLoadState;
use meshview_core::{Color, ColorMode};
use serde::Serialize;

pub const LABEL_POSITION: Vec3 = Vec3::new(0.0, 1.5, 0.0);
pub const LABEL_FONT_SIZE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub label: String,
    pub label_position: Vec3,
    pub font_size: f32,
    /// Wireframe and label color
    pub color: Color,
    /// Edge length of the wireframe cube
    pub size: f32,
    pub is_error: bool,
}

impl Placeholder {
    pub fn loading(progress: u8, mode: ColorMode) -> Self {
        Self::labelled(format!("Loading: {}%", progress.min(100)), mode.foreground(), false)
    }

    pub fn error(message: &str) -> Self {
        Self::labelled(format!("Error: {message}"), Color::RED, true)
    }

    /// Placeholder for a load state, `None` once there is a model to show
    /// or nothing has been requested
    pub fn for_state(state: &ModelLoadState, mode: ColorMode) -> Option<Self> {
        match state {
            ModelLoadState::Loading { progress } => Some(Self::loading(*progress, mode)),
            ModelLoadState::Error(message) => Some(Self::error(message)),
            ModelLoadState::Loaded | ModelLoadState::Idle => None,
        }
    }

    fn labelled(label: String, color: Color, is_error: bool) -> Self {
        Self {
            label,
            label_position: LABEL_POSITION,
            font_size: LABEL_FONT_SIZE,
            color,
            size: 1.0,
            is_error,
        }
    }

    /// The 12 cube edges as line segments centered on the origin
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let h = self.size / 2.0;
        let c = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
        [
            (c(-1.0, -1.0, -1.0), c(1.0, -1.0, -1.0)),
            (c(1.0, -1.0, -1.0), c(1.0, -1.0, 1.0)),
            (c(1.0, -1.0, 1.0), c(-1.0, -1.0, 1.0)),
            (c(-1.0, -1.0, 1.0), c(-1.0, -1.0, -1.0)),
            (c(-1.0, 1.0, -1.0), c(1.0, 1.0, -1.0)),
            (c(1.0, 1.0, -1.0), c(1.0, 1.0, 1.0)),
            (c(1.0, 1.0, 1.0), c(-1.0, 1.0, 1.0)),
            (c(-1.0, 1.0, 1.0), c(-1.0, 1.0, -1.0)),
            (c(-1.0, -1.0, -1.0), c(-1.0, 1.0, -1.0)),
            (c(1.0, -1.0, -1.0), c(1.0, 1.0, -1.0)),
            (c(1.0, -1.0, 1.0), c(1.0, 1.0, 1.0)),
            (c(-1.0, -1.0, 1.0), c(-1.0, 1.0, 1.0)),
        ]
    }
}
