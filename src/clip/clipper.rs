use std::path::Path;

use geo::{Coord, MultiPolygon};

use crate::error::{ConstructError, Result};

use super::{
    area::AreaType,
    read::parse_polys,
    set::{area_tolerance, from_contours, merge_slivers, rect_polygon, PolygonSet},
};

/// Polygons grouped by `AreaType`, plus the bucket rectangle they live in.
#[derive(Debug, Clone)]
pub struct PolyList {
    polys: [Vec<MultiPolygon<f64>>; AreaType::COUNT],
    safety_base: MultiPolygon<f64>,
}

impl Default for PolyList {
    fn default() -> Self {
        Self {
            polys: std::array::from_fn(|_| Vec::new()),
            safety_base: MultiPolygon::empty_set(),
        }
    }
}

impl PolyList {
    /// Polygons stored under `area`, in insertion order.
    #[inline] pub fn get(&self, area: AreaType) -> &[MultiPolygon<f64>] { &self.polys[area.index()] }

    #[inline] pub fn push(&mut self, area: AreaType, shape: MultiPolygon<f64>) { self.polys[area.index()].push(shape) }

    /// The full bucket rectangle.
    #[inline] pub fn safety_base(&self) -> &MultiPolygon<f64> { &self.safety_base }

    /// Total number of polygons across all area types.
    pub fn len(&self) -> usize { self.polys.iter().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Iterate `(area, polygon)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (AreaType, &MultiPolygon<f64>)> + '_ {
        AreaType::order().into_iter()
            .flat_map(move |t| self.polys[t.index()].iter().map(move |p| (t, p)))
    }

    /// Sum of the areas of every polygon, in square degrees.
    pub fn total_area(&self) -> f64 {
        self.iter().map(|(_, p)| p.set_area()).sum()
    }

    fn clear(&mut self) {
        for slot in &mut self.polys { slot.clear(); }
        self.safety_base = MultiPolygon::empty_set();
    }
}

/// Resolves overlapping feature polygons by priority so that every point of
/// a bucket belongs to exactly one area type.
#[derive(Debug, Clone, Default)]
pub struct Clipper {
    sliver_area: f64,
    polys_in: PolyList,
    polys_clipped: PolyList,
}

impl Clipper {
    /// `sliver_area` (square degrees) is the size below which clip artefacts
    /// are folded into neighbors; `0.0` disables sliver merging.
    pub fn new(sliver_area: f64) -> Self {
        Self { sliver_area, ..Self::default() }
    }

    /// Reset both the input and clipped polygon storage.
    pub fn init(&mut self) {
        self.polys_in.clear();
        self.polys_clipped.clear();
    }

    /// Queue a polygon for clipping.
    pub fn add_polygon(&mut self, area: AreaType, shape: MultiPolygon<f64>) {
        self.polys_in.push(area, shape);
    }

    /// Load every polygon in a source file. The file is all-or-nothing with
    /// respect to format errors; polygons with unknown feature types are
    /// logged and skipped. Returns the number of polygons accepted.
    pub fn load_polys(&mut self, path: &Path) -> Result<usize> {
        let text = crate::common::read_maybe_gz(path)?;
        let records = parse_polys(&text, Some(path))?;

        let mut accepted = 0;
        for record in records {
            match record.area_type() {
                Ok(area) => {
                    let shape = from_contours(&record.contours);
                    if shape.is_void() {
                        log::warn!("  {}: '{}' polygon encloses no area, skipped", path.display(), record.name);
                        continue;
                    }
                    log::debug!("  loaded {area} polygon with {} contour(s)", record.contours.len());
                    self.polys_in.push(area, shape);
                    accepted += 1;
                }
                Err(e) => log::warn!("  {}: {e}, polygon skipped", path.display()),
            }
        }

        log::info!("  loaded {accepted} polygon(s) from {}", path.display());
        Ok(accepted)
    }

    /// Clip every loaded polygon against the bucket rectangle `min..max` and
    /// against all higher-priority area types.
    ///
    /// Area types are folded in priority order: each type's polygons keep only
    /// what earlier types have not claimed, then the claimed region grows by
    /// their union. Polygons of the same type are not clipped against each
    /// other; overlaps between them are reported. Whatever the bucket has left
    /// at the end becomes `AreaType::BACKGROUND`.
    pub fn clip_all(&mut self, min: Coord<f64>, max: Coord<f64>) -> Result<()> {
        if !(min.x < max.x && min.y < max.y) {
            return Err(ConstructError::Geometry(format!(
                "degenerate clip rectangle ({}, {}) - ({}, {})", min.x, min.y, max.x, max.y,
            )));
        }

        let base = rect_polygon(min, max);
        let mut clipped = PolyList { safety_base: base.clone(), ..PolyList::default() };

        let accum = AreaType::order().into_iter()
            .filter(|t| !self.polys_in.get(*t).is_empty())
            .fold(MultiPolygon::empty_set(), |accum, area| {
                let (claimed, results) = clip_type(&accum, &base, self.polys_in.get(area), self.sliver_area, area);
                for shape in results { clipped.push(area, shape); }
                accum.set_union(&claimed)
            });

        let remains = base.set_difference(&accum);
        if !remains.is_void() {
            log::debug!("  background {} gets the remaining {:.6} sq deg", AreaType::BACKGROUND, remains.set_area());
            clipped.push(AreaType::BACKGROUND, remains);
        }

        for area in AreaType::order() {
            let n = clipped.get(area).len();
            if n > 0 { log::debug!("  {area} = {n}"); }
        }

        self.polys_clipped = clipped;
        Ok(())
    }

    /// The partition produced by the last [`Clipper::clip_all`].
    #[inline] pub fn polys_clipped(&self) -> &PolyList { &self.polys_clipped }

    #[inline] pub fn into_polys_clipped(self) -> PolyList { self.polys_clipped }
}

/// Clip all polygons of one area type against the region `accum` already
/// claimed by higher priorities. Returns the region this type claims and the
/// non-empty per-polygon results.
fn clip_type(
    accum: &MultiPolygon<f64>,
    base: &MultiPolygon<f64>,
    polys: &[MultiPolygon<f64>],
    sliver_area: f64,
    area: AreaType,
) -> (MultiPolygon<f64>, Vec<MultiPolygon<f64>>) {
    let mut claimed = MultiPolygon::empty_set();
    let mut results = Vec::with_capacity(polys.len());
    // siblings overlapping by less than this merely touch
    let touch_area = area_tolerance(base.set_area());

    for poly in polys {
        let inside = poly.set_intersection(base);
        let result = inside.set_difference(accum);
        if result.is_void() { continue }

        let overlap = result.set_intersection(&claimed).set_area();
        if overlap > touch_area {
            log::warn!("  overlapping {area} polygons share {overlap:.3e} sq deg; left unresolved");
        }

        claimed = claimed.set_union(&result);
        results.push(merge_slivers(result, sliver_area));
    }

    (claimed, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::set::Contour;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        from_contours(&[Contour { points: vec![c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1)], hole: false }])
    }

    #[test]
    fn empty_bucket_is_all_background() {
        let mut clipper = Clipper::new(0.0);
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        let out = clipper.polys_clipped();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(AreaType::Ocean).len(), 1);
        assert!((out.total_area() - 1.0).abs() < area_tolerance(1.0));
    }

    #[test]
    fn higher_priority_wins_overlap() {
        let mut clipper = Clipper::new(0.0);
        clipper.add_polygon(AreaType::Urban, rect(0.0, 0.0, 0.6, 1.0));
        clipper.add_polygon(AreaType::Lake, rect(0.4, 0.0, 1.0, 1.0));
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        let out = clipper.polys_clipped();

        assert!((out.get(AreaType::Lake)[0].set_area() - 0.6).abs() < area_tolerance(1.0));
        assert!((out.get(AreaType::Urban)[0].set_area() - 0.4).abs() < area_tolerance(1.0));
        assert!(out.get(AreaType::Ocean).is_empty());
    }

    #[test]
    fn polygons_are_trimmed_to_bucket() {
        let mut clipper = Clipper::new(0.0);
        clipper.add_polygon(AreaType::Lake, rect(-1.0, -1.0, 0.5, 0.5));
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        let out = clipper.polys_clipped();
        assert!((out.get(AreaType::Lake)[0].set_area() - 0.25).abs() < area_tolerance(1.0));
        assert!((out.total_area() - 1.0).abs() < area_tolerance(1.0));
    }

    #[test]
    fn outside_polygon_contributes_nothing() {
        let mut clipper = Clipper::new(0.0);
        clipper.add_polygon(AreaType::Lake, rect(2.0, 2.0, 3.0, 3.0));
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        assert!(clipper.polys_clipped().get(AreaType::Lake).is_empty());
    }

    #[test]
    fn degenerate_rectangle_is_rejected() {
        let mut clipper = Clipper::new(0.0);
        assert_eq!(clipper.clip_all(c(1.0, 0.0), c(1.0, 1.0)).unwrap_err().kind(), "geometry");
    }

    #[test]
    fn init_clears_everything() {
        let mut clipper = Clipper::new(0.0);
        clipper.add_polygon(AreaType::Lake, rect(0.0, 0.0, 0.5, 0.5));
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        clipper.init();
        assert!(clipper.polys_clipped().is_empty());
        clipper.clip_all(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
        assert_eq!(clipper.polys_clipped().get(AreaType::Lake).len(), 0);
    }
}
