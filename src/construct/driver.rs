use std::{
    fmt,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    array::Array,
    bucket::Bucket,
    clip::Clipper,
    common::files_with_stem,
    error::{ConstructError, Result},
    output::GenOutput,
    triangulate::Triangle,
};

use super::{cancel::CancelToken, config::ConstructConfig};

/// What one successfully built bucket produced.
#[derive(Debug, Clone)]
pub struct TileReport {
    pub bucket: Bucket,
    pub path: PathBuf,
    pub nodes: usize,
    pub triangles: usize,
}

/// Outcome of a batch: each bucket lands in exactly one list.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<TileReport>,
    pub skipped: Vec<Bucket>,
    pub failed: Vec<(Bucket, ConstructError)>,
}

impl BatchSummary {
    #[inline] pub fn total(&self) -> usize { self.succeeded.len() + self.skipped.len() + self.failed.len() }

    /// True when no bucket failed.
    #[inline] pub fn is_success(&self) -> bool { self.failed.is_empty() }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bucket(s): {} succeeded, {} skipped, {} failed",
            self.total(), self.succeeded.len(), self.skipped.len(), self.failed.len())?;
        for (bucket, err) in &self.failed {
            write!(f, "\n  {} [{}] {err}", bucket.gen_index(), err.kind())?;
        }
        Ok(())
    }
}

/// `<work_base>.<ext>`, the root of one source category.
fn source_root(work_base: &Path, ext: &str) -> PathBuf {
    let mut name = work_base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// The bucket's DEM file, compressed or not.
fn find_dem(config: &ConstructConfig, bucket: &Bucket) -> Result<PathBuf> {
    let dir = source_root(&config.work_base, "dem").join(bucket.gen_base_path());
    let index = bucket.gen_index_str();
    let candidates = [dir.join(format!("{index}.arr.gz")), dir.join(format!("{index}.arr"))];

    candidates.iter().find(|p| p.is_file()).cloned().ok_or_else(|| {
        ConstructError::io(&candidates[1], std::io::Error::new(std::io::ErrorKind::NotFound, "no DEM for bucket"))
    })
}

/// Build the tile for one bucket: fit the DEM, clip the area polygons,
/// triangulate, assign elevations, and write the output file. Nothing is
/// written unless every stage succeeds.
pub fn construct_tile(config: &ConstructConfig, bucket: &Bucket, cancel: &CancelToken) -> Result<TileReport> {
    log::info!("[construct] bucket {bucket}");
    cancel.check()?;

    // Terrain
    let mut array = Array::open(&find_dem(config, bucket)?)?;
    array.parse()?;
    array.fit(config.fit_tolerance, config.max_fit_nodes)?;
    cancel.check()?;

    // Area polygons
    let mut clipper = Clipper::new(config.sliver_area);
    clipper.init();
    let index = bucket.gen_index_str();
    for ext in &config.poly_dirs {
        let dir = source_root(&config.work_base, ext).join(bucket.gen_base_path());
        for path in files_with_stem(&dir, &index) {
            clipper.load_polys(&path)?;
        }
    }
    clipper.clip_all(bucket.min_corner(), bucket.max_corner())?;
    let polys = clipper.into_polys_clipped();
    cancel.check()?;

    // Mesh
    let mut tri = Triangle::new(config.triangulate_options());
    tri.build(array.corner_nodes(), array.fit_nodes(), &polys)?;
    tri.run_triangulate()?;
    tri.set_elevations(|lon, lat| array.altitude_at(lon, lat));
    cancel.check()?;

    // Output
    let mut out = GenOutput::new(config.style, config.gzip);
    out.build(tri.out_nodes(), tri.elements())?;
    cancel.check()?;
    let path = out.write(bucket, &config.output_base)?;

    Ok(TileReport { bucket: *bucket, path, nodes: tri.out_nodes().len(), triangles: tri.elements().len() })
}

/// Buckets a batch run covers: the explicit list if given, else every bucket
/// over the configured bounds (south to north, west to east).
pub fn batch_buckets(config: &ConstructConfig) -> Result<Vec<Bucket>> {
    if !config.buckets.is_empty() {
        return Ok(config.buckets.iter().map(|&i| Bucket::from_index(i)).collect());
    }
    config.bounds_rect()
        .map(Bucket::covering)
        .ok_or_else(|| ConstructError::Config("no buckets or bounds configured".into()))
}

/// Run one bucket's work with any panic inside it turned into a geometry
/// error, so the rest of the batch still completes.
fn isolated<T>(bucket: &Bucket, work: impl FnOnce() -> Result<T>) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        let message = payload.downcast_ref::<&str>().map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());
        log::error!("[construct] bucket {} panicked: {message}", bucket.gen_index());
        Err(ConstructError::Geometry(format!("bucket {} aborted: {message}", bucket.gen_index())))
    })
}

/// Build every bucket of the batch in parallel. One bucket's failure never
/// stops the others; cancelled buckets are reported as skipped.
pub fn construct_area(config: &ConstructConfig, cancel: &CancelToken) -> Result<BatchSummary> {
    config.validate()?;
    let buckets = batch_buckets(config)?;
    log::info!("[construct] {} bucket(s) on {} thread(s)", buckets.len(), rayon::current_num_threads());

    let results: Vec<(Bucket, Result<TileReport>)> = buckets.par_iter()
        .map(|bucket| (*bucket, isolated(bucket, || construct_tile(config, bucket, cancel))))
        .collect();

    let mut summary = BatchSummary::default();
    for (bucket, result) in results {
        match result {
            Ok(report) => summary.succeeded.push(report),
            Err(ConstructError::Cancelled) => summary.skipped.push(bucket),
            Err(e) => {
                log::error!("[construct] bucket {} failed: {e}", bucket.gen_index());
                summary.failed.push((bucket, e));
            }
        }
    }

    log::info!("[construct] {} succeeded, {} skipped, {} failed",
        summary.succeeded.len(), summary.skipped.len(), summary.failed.len());
    Ok(summary)
}
