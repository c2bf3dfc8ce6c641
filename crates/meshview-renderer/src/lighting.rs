//! Lighting
//!
//! Four-light rig scaled from the model size: ambient base, a shadow-casting
//! key light, an opposing fill light and a sky/ground hemisphere.

use glam::Vec3;
use meshview_core::adaptive::LightParameters;
use meshview_core::{Color, ColorMode, SceneParameters};
use serde::Serialize;
use smallvec::SmallVec;

pub const PRIMARY_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const SECONDARY_LIGHT_POSITION: Vec3 = Vec3::new(-5.0, 5.0, -5.0);

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LightType {
    /// Uniform light from everywhere
    Ambient,
    /// Parallel rays from a direction (sun)
    Directional,
    /// Sky color from above, ground color from below
    Hemisphere,
}

/// Light shadow settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShadowSettings {
    /// Enable shadows
    pub enabled: bool,
    /// Shadow map resolution (square)
    pub resolution: u32,
    /// Depth bias, negative to push acne behind surfaces
    pub bias: f32,
    /// Near plane
    pub near: f32,
    /// Far plane
    pub far: f32,
    /// Half extent of the orthographic shadow camera
    pub bounds: f32,
}

impl ShadowSettings {
    pub const DISABLED: Self = Self {
        enabled: false,
        resolution: 0,
        bias: 0.0,
        near: 0.5,
        far: 500.0,
        bounds: 5.0,
    };
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: 2048,
            bias: -0.001,
            near: 0.5,
            far: 50.0,
            bounds: 10.0,
        }
    }
}

/// One light of the rig
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Light {
    pub light_type: LightType,
    pub color: Color,
    /// Lower hemisphere color, hemisphere lights only
    pub ground_color: Option<Color>,
    pub intensity: f32,
    /// Where directional light comes from, aimed at the origin
    pub position: Vec3,
    pub shadows: ShadowSettings,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            light_type: LightType::Ambient,
            color,
            ground_color: None,
            intensity,
            position: Vec3::ZERO,
            shadows: ShadowSettings::DISABLED,
        }
    }

    pub fn directional(color: Color, intensity: f32, position: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            color,
            ground_color: None,
            intensity,
            position,
            shadows: ShadowSettings::DISABLED,
        }
    }

    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self {
            light_type: LightType::Hemisphere,
            color: sky,
            ground_color: Some(ground),
            intensity,
            position: Vec3::Y,
            shadows: ShadowSettings::DISABLED,
        }
    }

    pub fn with_shadows(mut self, shadows: ShadowSettings) -> Self {
        self.shadows = shadows;
        self
    }

    /// Direction the light travels, `None` for non-directional lights
    pub fn direction(&self) -> Option<Vec3> {
        match self.light_type {
            LightType::Directional => Some((-self.position).normalize_or_zero()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightRig {
    pub ambient: Light,
    /// Key light, the only shadow caster
    pub primary: Light,
    pub secondary: Light,
    pub hemisphere: Light,
}

impl LightRig {
    pub fn from_parameters(params: &LightParameters) -> Self {
        Self {
            ambient: Light::ambient(params.ambient_color, params.ambient_intensity as f32),
            primary: Light::directional(
                params.base_color,
                params.primary_intensity as f32,
                PRIMARY_LIGHT_POSITION,
            )
            .with_shadows(ShadowSettings::default()),
            secondary: Light::directional(
                params.base_color,
                params.secondary_intensity as f32,
                SECONDARY_LIGHT_POSITION,
            ),
            hemisphere: Light::hemisphere(
                params.hemisphere_sky_color,
                params.hemisphere_ground_color,
                params.hemisphere_intensity as f32,
            ),
        }
    }

    /// Rig for a unit-sized model
    pub fn for_mode(mode: ColorMode) -> Self {
        let max_dimension = SceneParameters::default().max_dimension;
        Self::from_parameters(&LightParameters::derive(max_dimension, mode))
    }

    pub fn lights(&self) -> SmallVec<[&Light; 4]> {
        SmallVec::from_buf([&self.ambient, &self.primary, &self.secondary, &self.hemisphere])
    }

    /// Drop shadow casting from every light
    pub fn without_shadows(mut self) -> Self {
        self.primary.shadows.enabled = false;
        self
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &Light> {
        self.lights().into_iter().filter(|light| light.shadows.enabled)
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::for_mode(ColorMode::default())
    }
}
