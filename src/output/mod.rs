//! WGS-84 mesh generation and the scenery tile writer.
mod genobj;
mod wgs84;
mod write;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use genobj::{calc_tex_coords, GenOutput, TEXTURE_DIMENSION_M};
pub use wgs84::{geod_to_cart, E2, EQUATORIAL_RADIUS_M};
pub use write::SCENERY_VERSION;

/// How triangles are laid out in a written tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// One `f` line per triangle, each with its own bounding sphere and the
    /// placeholder material.
    #[default]
    Triangles,
    /// `tf` fan lines grouped by area type, one material and bounding sphere
    /// per group.
    Fans,
}

impl OutputStyle {
    pub fn to_str(&self) -> &'static str {
        match self {
            OutputStyle::Triangles => "triangles",
            OutputStyle::Fans => "fans",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangles" => Ok(OutputStyle::Triangles),
            "fans" => Ok(OutputStyle::Fans),
            other => Err(format!("unknown output style '{other}' (expected triangles or fans)")),
        }
    }
}
