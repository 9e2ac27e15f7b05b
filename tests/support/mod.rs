#![allow(dead_code)]

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use terragear::Bucket;

/// `<work_base>.<ext>/<base_path>` for a bucket, created on demand.
pub fn source_dir(work_base: &Path, ext: &str, bucket: &Bucket) -> PathBuf {
    let dir = PathBuf::from(format!("{}.{ext}", work_base.display())).join(bucket.gen_base_path());
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a `cols x rows` DEM over the bucket with elevations from `elev(col, row)`.
pub fn write_dem(work_base: &Path, bucket: &Bucket, cols: usize, rows: usize, elev: impl Fn(usize, usize) -> f64) -> PathBuf {
    let (min, max) = (bucket.min_corner(), bucket.max_corner());
    let col_step = (max.x - min.x) * 3600.0 / (cols - 1) as f64;
    let row_step = (max.y - min.y) * 3600.0 / (rows - 1) as f64;

    let mut text = format!("{} {}\n{cols} {col_step}\n{rows} {row_step}\n", min.x * 3600.0, min.y * 3600.0);
    for col in 0..cols {
        let line: Vec<String> = (0..rows).map(|row| format!("{}", elev(col, row))).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }

    let path = source_dir(work_base, "dem", bucket).join(format!("{}.arr", bucket.gen_index()));
    fs::write(&path, text).unwrap();
    path
}

/// One polygon record with a single outer contour.
pub fn poly_record(name: &str, ring: &[(f64, f64)]) -> String {
    let mut text = format!("{name}\n1\n{} 0\n", ring.len());
    for (x, y) in ring { text.push_str(&format!("{x} {y}\n")); }
    text
}

/// Axis-aligned rectangle ring, counter-clockwise.
pub fn rect_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
    vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
}

/// Write polygon records into `<work_base>.<ext>/<base_path>/<index>.<suffix>`.
pub fn write_polys(work_base: &Path, ext: &str, bucket: &Bucket, suffix: &str, records: &[String]) -> PathBuf {
    let path = source_dir(work_base, ext, bucket).join(format!("{}.{suffix}", bucket.gen_index()));
    fs::write(&path, records.concat()).unwrap();
    path
}

/// Signed area of a lon/lat triangle.
pub fn signed_area(a: glam::DVec3, b: glam::DVec3, c: glam::DVec3) -> f64 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) / 2.0
}

/// Lines of a tile starting with `prefix`.
pub fn lines_with<'a>(text: &'a str, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    text.lines().filter(move |l| l.starts_with(prefix))
}

/// Contents of a written tile, inflating gzip output.
pub fn read_text(path: &Path) -> String {
    let bytes = fs::read(path).unwrap();
    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut text = String::new();
        flate2::read::GzDecoder::new(bytes.as_slice()).read_to_string(&mut text).unwrap();
        text
    } else {
        String::from_utf8(bytes).unwrap()
    }
}
