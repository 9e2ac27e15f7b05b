use std::path::PathBuf;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConstructError, Result},
    output::OutputStyle,
    triangulate::{TriangulateOptions, DEFAULT_MIN_ANGLE},
};

/// Settings for a construction run. Every field has a default, so a JSON
/// file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstructConfig {
    /// Source tree root; inputs live under `<work_base>.dem`, `<work_base>.apt`, ...
    pub work_base: PathBuf,
    /// Output tree root; tiles go under `<output_base>/Scenery`.
    pub output_base: PathBuf,

    /// Terrain fit tolerance in meters.
    pub fit_tolerance: f64,
    /// Cap on interior fit points per bucket.
    pub max_fit_nodes: Option<usize>,

    /// Minimum triangle angle in degrees; `null` disables refinement.
    pub min_angle: Option<f64>,
    pub max_steiner_points: usize,
    /// Polygon vertex merge distance, degrees.
    pub proximity_epsilon: f64,
    /// Fit point drop distance, degrees.
    pub coarse_epsilon: f64,
    /// Clip artefacts smaller than this (square degrees) are merged away.
    pub sliver_area: f64,

    /// Polygon source directory extensions, read in this order.
    pub poly_dirs: Vec<String>,

    pub style: OutputStyle,
    pub gzip: bool,

    /// `[min_lon, min_lat, max_lon, max_lat]` for area runs.
    pub bounds: Option<[f64; 4]>,
    /// Explicit bucket indices; used instead of `bounds` when non-empty.
    pub buckets: Vec<i64>,
}

impl Default for ConstructConfig {
    fn default() -> Self {
        Self {
            work_base: PathBuf::from("work"),
            output_base: PathBuf::from("."),
            fit_tolerance: 5.0,
            max_fit_nodes: None,
            min_angle: Some(DEFAULT_MIN_ANGLE),
            max_steiner_points: 400,
            proximity_epsilon: 1e-7,
            coarse_epsilon: 1e-4,
            sliver_area: 1e-10,
            poly_dirs: ["apt", "hydro", "landuse"].map(String::from).to_vec(),
            style: OutputStyle::Triangles,
            gzip: false,
            bounds: None,
            buckets: Vec::new(),
        }
    }
}

impl ConstructConfig {
    /// Parse a JSON configuration. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ConstructError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(ConstructError::Config(message));

        if !(self.fit_tolerance > 0.0) {
            return fail(format!("fit_tolerance must be positive, got {}", self.fit_tolerance));
        }
        if !(self.proximity_epsilon >= 0.0 && self.coarse_epsilon >= 0.0 && self.sliver_area >= 0.0) {
            return fail("epsilons and sliver_area must be non-negative".into());
        }
        if let Some(angle) = self.min_angle {
            if !(angle > 0.0 && angle < 60.0) {
                return fail(format!("min_angle must lie in (0, 60) degrees, got {angle}"));
            }
        }
        if let Some([min_lon, min_lat, max_lon, max_lat]) = self.bounds {
            if !(min_lon < max_lon && min_lat < max_lat) {
                return fail(format!("bounds {min_lon},{min_lat},{max_lon},{max_lat} enclose no area"));
            }
            if min_lon < -180.0 || max_lon > 180.0 || min_lat < -90.0 || max_lat > 90.0 {
                return fail("bounds must lie within -180..180, -90..90".into());
            }
        }
        Ok(())
    }

    /// Configured bounds as a rectangle.
    pub fn bounds_rect(&self) -> Option<Rect<f64>> {
        self.bounds.map(|[x0, y0, x1, y1]| Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }))
    }

    pub fn triangulate_options(&self) -> TriangulateOptions {
        TriangulateOptions {
            proximity_epsilon: self.proximity_epsilon,
            coarse_epsilon: self.coarse_epsilon,
            min_angle: self.min_angle,
            max_steiner_points: self.max_steiner_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ConstructConfig::from_json("{}").unwrap(), ConstructConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = ConstructConfig::from_json(r#"{ "style": "fans", "gzip": true, "min_angle": 20.0 }"#).unwrap();
        assert_eq!(config.style, OutputStyle::Fans);
        assert!(config.gzip);
        assert_eq!(config.triangulate_options().min_angle, Some(20.0));
        assert_eq!(config.poly_dirs, ["apt", "hydro", "landuse"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(ConstructConfig::from_json(r#"{ "fit_tolerence": 2 }"#).unwrap_err().kind(), "config");
    }

    #[test]
    fn empty_bounds_are_rejected() {
        let err = ConstructConfig::from_json(r#"{ "bounds": [1, 1, 1, 2] }"#).unwrap_err();
        assert!(err.to_string().contains("enclose no area"));
    }

    #[test]
    fn refinement_is_on_unless_nulled() {
        assert_eq!(ConstructConfig::default().min_angle, Some(DEFAULT_MIN_ANGLE));
        let config = ConstructConfig::from_json(r#"{ "min_angle": null }"#).unwrap();
        assert_eq!(config.triangulate_options().min_angle, None);
    }

    #[test]
    fn bad_angle_is_rejected() {
        assert!(ConstructConfig::from_json(r#"{ "min_angle": 75 }"#).is_err());
    }
}
