//! Regular-grid elevation arrays (DEM) and the surface fitter that reduces a
//! grid to the corner and fit point sets fed to the triangulator.
mod fit;
mod read;

use std::path::{Path, PathBuf};

use glam::DVec3;

use crate::error::{ConstructError, Result};

const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// An elevation grid covering one bucket.
///
/// Origin and steps are in arc-seconds; samples are stored column-major
/// (`data[col * rows + row]`), elevations in meters.
#[derive(Debug, Clone, Default)]
pub struct Array {
    path: Option<PathBuf>,
    body: Option<String>,

    origin_x: f64,
    origin_y: f64,
    cols: usize,
    col_step: f64,
    rows: usize,
    row_step: f64,

    data: Vec<f64>,

    corner_nodes: Vec<DVec3>,
    fit_nodes: Vec<DVec3>,
}

impl Array {
    /// Open a DEM array file and parse its header. The data body is kept in
    /// memory until [`Array::parse`] consumes it.
    pub fn open(path: &Path) -> Result<Self> {
        let text = crate::common::read_maybe_gz(path)?;
        log::info!("opening array data file: {}", path.display());

        let mut array = Self { path: Some(path.to_path_buf()), ..Self::default() };
        array.read_header(text)?;
        Ok(array)
    }

    /// Build an array directly from samples. `data` is column-major and must
    /// hold `cols * rows` values of an at least 2x2 grid with positive steps.
    pub fn from_grid(origin: (f64, f64), cols: usize, col_step: f64, rows: usize, row_step: f64, data: Vec<f64>) -> Result<Self> {
        let array = Self {
            origin_x: origin.0,
            origin_y: origin.1,
            cols,
            col_step,
            rows,
            row_step,
            data,
            ..Self::default()
        };
        array.check_grid()?;
        Ok(array)
    }

    /// A constant-elevation grid covering the lon/lat rectangle `min..max`
    /// (degrees) with `cols x rows` samples.
    pub fn flat(min: (f64, f64), max: (f64, f64), cols: usize, rows: usize, elevation: f64) -> Result<Self> {
        let samples = match cols.checked_mul(rows) {
            Some(n) if cols >= 2 && rows >= 2 => n,
            _ => return Err(ConstructError::format(None, format!("cannot build a {cols}x{rows} grid"))),
        };
        let col_step = (max.0 - min.0) * ARCSEC_PER_DEGREE / (cols - 1) as f64;
        let row_step = (max.1 - min.1) * ARCSEC_PER_DEGREE / (rows - 1) as f64;
        Self::from_grid(
            (min.0 * ARCSEC_PER_DEGREE, min.1 * ARCSEC_PER_DEGREE),
            cols, col_step, rows, row_step,
            vec![elevation; samples],
        )
    }

    /// The samples must be present and match the declared grid shape.
    fn check_grid(&self) -> Result<()> {
        let fail = |message: String| ConstructError::format(self.path.as_deref(), message);
        if self.cols < 2 || self.rows < 2 {
            return Err(fail(format!("grid must be at least 2x2, got {}x{}", self.cols, self.rows)));
        }
        if !(self.col_step > 0.0 && self.row_step > 0.0) {
            return Err(fail(format!("grid steps must be positive, got {} / {}", self.col_step, self.row_step)));
        }
        if self.body.is_some() {
            return Err(fail("grid data has not been parsed".into()));
        }
        if self.cols.checked_mul(self.rows) != Some(self.data.len()) {
            return Err(fail(format!("grid holds {} samples, expected {}x{}", self.data.len(), self.cols, self.rows)));
        }
        Ok(())
    }

    #[inline] pub fn cols(&self) -> usize { self.cols }
    #[inline] pub fn rows(&self) -> usize { self.rows }
    #[inline] pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Raw sample at grid column `col`, row `row`.
    #[inline]
    pub fn sample(&self, col: usize, row: usize) -> f64 {
        self.data[col * self.rows + row]
    }

    /// Geodetic position (degrees, degrees, meters) of a grid node.
    #[inline]
    fn node(&self, col: usize, row: usize, elevation: f64) -> DVec3 {
        DVec3::new(
            (self.origin_x + col as f64 * self.col_step) / ARCSEC_PER_DEGREE,
            (self.origin_y + row as f64 * self.row_step) / ARCSEC_PER_DEGREE,
            elevation,
        )
    }

    /// Grid corners produced by the last [`Array::fit`]. Restartable: each call
    /// yields a fresh iterator.
    pub fn corner_nodes(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.corner_nodes.iter().copied()
    }

    /// Interior fit points produced by the last [`Array::fit`].
    pub fn fit_nodes(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.fit_nodes.iter().copied()
    }

    /// Elevation at `(lon, lat)` in degrees, interpolated across the lower or
    /// upper triangle of the enclosing grid cell. Positions outside the grid
    /// are clamped to its edge.
    pub fn altitude_at(&self, lon: f64, lat: f64) -> f64 {
        if self.cols < 2 || self.rows < 2 {
            return self.data.first().copied().unwrap_or(0.0);
        }

        let max_x = (self.cols - 1) as f64;
        let max_y = (self.rows - 1) as f64;
        let xlocal = ((lon * ARCSEC_PER_DEGREE - self.origin_x) / self.col_step).clamp(0.0, max_x);
        let ylocal = ((lat * ARCSEC_PER_DEGREE - self.origin_y) / self.row_step).clamp(0.0, max_y);

        let xi = (xlocal as usize).min(self.cols - 2);
        let yi = (ylocal as usize).min(self.rows - 2);
        let dx = xlocal - xi as f64;
        let dy = ylocal - yi as f64;

        let z1 = self.sample(xi, yi);
        let z3 = self.sample(xi + 1, yi + 1);

        if dx > dy {
            // lower triangle: (0,0) (1,0) (1,1)
            let z2 = self.sample(xi + 1, yi);
            z1 + dx * (z2 - z1) + dy * (z3 - z2)
        } else {
            // upper triangle: (0,0) (0,1) (1,1)
            let z2 = self.sample(xi, yi + 1);
            z1 + dy * (z2 - z1) + dx * (z3 - z2)
        }
    }
}
