use std::fmt;

use geo::{Coord, Rect};

/// Height of every bucket, in degrees of latitude.
pub const BUCKET_SPAN: f64 = 0.125;

const HALF_BUCKET_SPAN: f64 = 0.5 * BUCKET_SPAN;
const EPSILON: f64 = 1e-7;

/// Width of a bucket in degrees of longitude, which grows toward the poles
/// so buckets keep a roughly constant ground footprint.
pub fn bucket_span(lat: f64) -> f64 {
    match lat {
        l if l >= 89.0 => 360.0,
        l if l >= 88.0 => 8.0,
        l if l >= 86.0 => 4.0,
        l if l >= 83.0 => 2.0,
        l if l >= 76.0 => 1.0,
        l if l >= 62.0 => 0.5,
        l if l >= 22.0 => 0.25,
        l if l >= -22.0 => 0.125,
        l if l >= -62.0 => 0.25,
        l if l >= -76.0 => 0.5,
        l if l >= -83.0 => 1.0,
        l if l >= -86.0 => 2.0,
        l if l >= -88.0 => 4.0,
        l if l >= -89.0 => 8.0,
        _ => 360.0,
    }
}

/// Floor toward negative infinity, treating values within `EPSILON` of an
/// integer as that integer.
#[inline]
fn floor_degree(d: f64) -> i32 {
    let truncated = d as i32;
    let diff = d - truncated as f64;
    if d >= 0.0 || diff.abs() < EPSILON { truncated } else { truncated - 1 }
}

/// A scenery bucket: the unit of terrain construction and storage.
///
/// `lon`/`lat` are the integer degree cell, `x`/`y` the 0..8 subdivision
/// within it. The packed index is stable and used for every per-tile path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket {
    lon: i32,
    lat: i32,
    x: i32,
    y: i32,
}

impl Bucket {
    /// The bucket containing `(lon, lat)` in degrees.
    pub fn new(dlon: f64, dlat: f64) -> Self {
        let span = bucket_span(dlat);
        let mut lon = floor_degree(dlon);

        let x = if span < EPSILON {
            lon = 0;
            0
        } else if span <= 1.0 {
            (((dlon - lon as f64) / span) as i32).clamp(0, 7)
        } else {
            // super-buckets snap their origin to a multiple of the span
            let whole = dlon >= 0.0 || (dlon - (dlon as i32) as f64).abs() < EPSILON;
            lon = if whole {
                ((lon as f64 / span) as i32 as f64 * span) as i32
            } else {
                (((lon + 1) as f64 / span) as i32 as f64 * span - span) as i32
            };
            0
        };

        let lat = floor_degree(dlat);
        let y = (((dlat - lat as f64) * 8.0) as i32).clamp(0, 7);

        Self { lon, lat, x, y }
    }

    /// Rebuild a bucket from its packed index.
    pub fn from_index(index: i64) -> Self {
        Self {
            lon: ((index >> 14) - 180) as i32,
            lat: (((index >> 6) & 0xff) - 90) as i32,
            y: ((index >> 3) & 0x7) as i32,
            x: (index & 0x7) as i32,
        }
    }

    /// Packed index: `((lon + 180) << 14) + ((lat + 90) << 6) + (y << 3) + x`.
    #[inline]
    pub fn gen_index(&self) -> i64 {
        (((self.lon + 180) as i64) << 14)
            + (((self.lat + 90) as i64) << 6)
            + ((self.y as i64) << 3)
            + self.x as i64
    }

    /// File stem shared by every per-tile input and output file.
    #[inline] pub fn gen_index_str(&self) -> String { self.gen_index().to_string() }

    /// Two-level directory path, e.g. `w130n30/w123n37`.
    pub fn gen_base_path(&self) -> String {
        fn top(v: i32) -> i32 {
            let mut t = v / 10;
            if v < 0 && t * 10 != v { t -= 1; }
            t * 10
        }

        let top_lon = top(self.lon);
        let top_lat = top(self.lat);
        let hem = if top_lon >= 0 { 'e' } else { 'w' };
        let pole = if top_lat >= 0 { 'n' } else { 's' };

        format!(
            "{hem}{:03}{pole}{:02}/{hem}{:03}{pole}{:02}",
            top_lon.abs(), top_lat.abs(), self.lon.abs(), self.lat.abs(),
        )
    }

    #[inline]
    pub fn center_lat(&self) -> f64 {
        self.lat as f64 + self.y as f64 / 8.0 + HALF_BUCKET_SPAN
    }

    pub fn center_lon(&self) -> f64 {
        let span = bucket_span(self.center_lat());
        if span >= 1.0 {
            self.lon as f64 + span / 2.0
        } else {
            self.lon as f64 + self.x as f64 * span + span / 2.0
        }
    }

    /// Width in degrees of longitude.
    #[inline] pub fn width(&self) -> f64 { bucket_span(self.center_lat()) }

    /// Height in degrees of latitude.
    #[inline] pub fn height(&self) -> f64 { BUCKET_SPAN }

    #[inline]
    pub fn min_corner(&self) -> Coord<f64> {
        Coord { x: self.center_lon() - self.width() / 2.0, y: self.center_lat() - self.height() / 2.0 }
    }

    #[inline]
    pub fn max_corner(&self) -> Coord<f64> {
        Coord { x: self.center_lon() + self.width() / 2.0, y: self.center_lat() + self.height() / 2.0 }
    }

    /// Lon/lat rectangle covered by this bucket.
    #[inline] pub fn bounds(&self) -> Rect<f64> { Rect::new(self.min_corner(), self.max_corner()) }

    /// The bucket `dx` columns east and `dy` rows north of this one.
    pub fn sibling(&self, dx: i32, dy: i32) -> Self {
        let clat = (self.center_lat() + dy as f64 * BUCKET_SPAN).clamp(-89.999999, 89.999999);
        let span = bucket_span(clat);

        let mut clon = self.center_lon() + dx as f64 * span;
        while clon < -180.0 { clon += 360.0; }
        while clon >= 180.0 { clon -= 360.0; }

        Self::new(clon, clat)
    }

    /// All buckets overlapping the lon/lat rectangle, row by row (south to
    /// north), column by column (west to east).
    pub fn covering(bounds: Rect<f64>) -> Vec<Self> {
        let mut buckets = Vec::new();
        let (min, max) = (bounds.min(), bounds.max());

        let mut lat = min.y;
        loop {
            let row_start = Self::new(min.x, lat);
            let mut b = row_start;
            loop {
                buckets.push(b);
                let next = b.sibling(1, 0);
                if next.min_corner().x >= max.x - EPSILON || next.min_corner().x <= b.min_corner().x { break }
                b = next;
            }

            let next_lat = row_start.center_lat() + BUCKET_SPAN;
            if next_lat - HALF_BUCKET_SPAN >= max.y - EPSILON || next_lat >= 90.0 { break }
            lat = next_lat;
        }

        buckets
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.gen_base_path(), self.gen_index())
    }
}
