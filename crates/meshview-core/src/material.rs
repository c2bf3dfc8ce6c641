//! Material System
//!
//! Closed set of viewer materials. Each [`MaterialKind`] maps to exactly one
//! parameter block; the loader applies the resulting [`Material`] to every
//! sub-mesh without looking inside it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// Neutral gray used by every lit preset
pub const DEFAULT_MATERIAL_COLOR: u32 = 0x808080;

/// Unknown material name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown material: {0}")]
pub struct UnknownMaterial(pub String);

/// Material presets selectable from the viewer chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    #[default]
    #[serde(alias = "default")]
    Standard,
    Metal,
    Phong,
    Normal,
    Basic,
    Wireframe,
    Transparent,
    Custom,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 8] = [
        Self::Standard,
        Self::Metal,
        Self::Phong,
        Self::Normal,
        Self::Basic,
        Self::Wireframe,
        Self::Transparent,
        Self::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metal => "metal",
            Self::Phong => "phong",
            Self::Normal => "normal",
            Self::Basic => "basic",
            Self::Wireframe => "wireframe",
            Self::Transparent => "transparent",
            Self::Custom => "custom",
        }
    }

    /// Build the parameter block for this preset
    pub fn material(&self) -> Material {
        let base = Material {
            name: self.name().to_string(),
            kind: *self,
            shader: ShaderType::Standard,
            base_color: Color::from_hex(DEFAULT_MATERIAL_COLOR),
            metallic: 0.0,
            roughness: 0.5,
            shininess: 0.0,
            opacity: 1.0,
            transparent: false,
            wireframe: false,
            double_sided: false,
        };

        match self {
            Self::Standard => base,
            Self::Metal => Material {
                base_color: Color::from_hex(0xaaaaaa),
                metallic: 1.0,
                roughness: 0.2,
                ..base
            },
            Self::Phong => Material {
                shader: ShaderType::Phong,
                shininess: 30.0,
                ..base
            },
            Self::Normal => Material {
                shader: ShaderType::Normal,
                ..base
            },
            Self::Basic => Material {
                shader: ShaderType::Unlit,
                ..base
            },
            Self::Wireframe => Material {
                shader: ShaderType::Unlit,
                wireframe: true,
                ..base
            },
            Self::Transparent => Material {
                opacity: 0.5,
                transparent: true,
                double_sided: true,
                ..base
            },
            Self::Custom => Material {
                shader: ShaderType::Custom,
                ..base
            },
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaterialKind {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "default" {
            return Ok(Self::Standard);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| UnknownMaterial(s.to_string()))
    }
}

/// Shading model the host backend should select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShaderType {
    /// Lit metallic/roughness
    Standard,
    /// Lit Blinn-Phong
    Phong,
    /// Unlit flat color
    Unlit,
    /// Normal visualisation
    Normal,
    /// Host-provided shader
    Custom,
}

/// Material parameters handed to the host renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Preset this material was built from
    pub kind: MaterialKind,
    /// Shader type
    pub shader: ShaderType,
    /// Base color (albedo)
    pub base_color: Color,
    /// Metallic factor
    pub metallic: f32,
    /// Roughness factor
    pub roughness: f32,
    /// Specular exponent (phong only)
    pub shininess: f32,
    /// Opacity, `1.0` is fully opaque
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        MaterialKind::Standard.material()
    }
}
