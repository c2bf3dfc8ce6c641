//! Grid floor
//!
//! Line grid plus a translucent shadow-receiving plane just under `y = 0`,
//! sized from the adaptive floor parameters.

use glam::Vec3;
use meshview_core::Color;
use meshview_core::adaptive::FloorParameters;
use serde::Serialize;

/// Sits just under normalized meshes so their base does not z-fight the grid
pub const FLOOR_ELEVATION: f32 = -0.01;

/// Cap on drawn grid divisions; the floor keeps its derived size
pub const MAX_GRID_DIVISIONS: u32 = 1000;

const CENTER_LINE_COLOR: u32 = 0x444444;
const GRID_COLOR: u32 = 0x1f1f1f;
const PLANE_COLOR: u32 = 0xcccccc;

/// One grid line in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFloor {
    /// Edge length of the square grid
    pub size: f32,
    pub divisions: u32,
    pub elevation: f32,
    pub center_line_color: Color,
    pub grid_color: Color,
    pub plane_color: Color,
    pub plane_opacity: f32,
    pub receive_shadow: bool,
}

impl GridFloor {
    pub fn new(size: f32, divisions: u32) -> Self {
        Self {
            size,
            divisions: divisions.clamp(1, MAX_GRID_DIVISIONS),
            elevation: FLOOR_ELEVATION,
            center_line_color: Color::from_hex(CENTER_LINE_COLOR),
            grid_color: Color::from_hex(GRID_COLOR),
            plane_color: Color::from_hex(PLANE_COLOR),
            plane_opacity: 0.5,
            receive_shadow: true,
        }
    }

    pub fn from_parameters(params: &FloorParameters) -> Self {
        Self::new(params.size as f32, params.divisions)
    }

    pub fn cell_size(&self) -> f32 {
        self.size / self.divisions as f32
    }

    /// Grid segments: `divisions + 1` lines along each axis.
    ///
    /// With an even division count the middle pair runs through the origin
    /// and takes the center line color.
    pub fn lines(&self) -> Vec<GridLine> {
        let half = self.size / 2.0;
        let step = self.cell_size();
        let center = (self.divisions % 2 == 0).then_some(self.divisions / 2);
        let y = self.elevation;

        let mut lines = Vec::with_capacity(2 * (self.divisions as usize + 1));
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            let color = if Some(i) == center {
                self.center_line_color
            } else {
                self.grid_color
            };
            lines.push(GridLine {
                start: Vec3::new(-half, y, k),
                end: Vec3::new(half, y, k),
                color,
            });
            lines.push(GridLine {
                start: Vec3::new(k, y, -half),
                end: Vec3::new(k, y, half),
                color,
            });
        }
        lines
    }
}

impl Default for GridFloor {
    fn default() -> Self {
        Self::new(10.0, 10)
    }
}
