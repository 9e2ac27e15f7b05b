use geo::{Area, BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};

/// Planar point-set operations over polygons with holes.
///
/// The clipper only talks to this trait; `geo::MultiPolygon` is the backend.
pub trait PolygonSet: Sized {
    fn empty_set() -> Self;
    fn set_union(&self, other: &Self) -> Self;
    fn set_difference(&self, other: &Self) -> Self;
    fn set_intersection(&self, other: &Self) -> Self;
    fn set_area(&self) -> f64;

    /// True when the set encloses no area.
    fn is_void(&self) -> bool;
}

impl PolygonSet for MultiPolygon<f64> {
    #[inline] fn empty_set() -> Self { MultiPolygon::new(vec![]) }
    #[inline] fn set_union(&self, other: &Self) -> Self { self.union(other) }
    #[inline] fn set_difference(&self, other: &Self) -> Self { self.difference(other) }
    #[inline] fn set_intersection(&self, other: &Self) -> Self { self.intersection(other) }
    #[inline] fn set_area(&self) -> f64 { self.unsigned_area() }

    #[inline]
    fn is_void(&self) -> bool {
        self.0.is_empty() || self.unsigned_area() <= 0.0
    }
}

/// Relative precision of the boolean operations. The overlay backend snaps
/// results to a fixed-point grid sized from the inputs' extent, so areas it
/// returns agree with exact arithmetic to about this fraction.
pub const AREA_PRECISION: f64 = 1e-8;

/// Absolute slack for comparing areas of sets whose extent is about `area`.
#[inline]
pub fn area_tolerance(area: f64) -> f64 {
    area.abs() * AREA_PRECISION
}

/// One ring of a polygon as loaded from (or handed to) the outside world.
/// Open: the first vertex is not repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Coord<f64>>,
    pub hole: bool,
}

/// Axis-aligned rectangle as a polygon set.
pub fn rect_polygon(min: Coord<f64>, max: Coord<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Rect::new(min, max).to_polygon()])
}

/// Assemble contours into a polygon set: the union of all outer contours
/// minus the union of all hole contours.
pub fn from_contours(contours: &[Contour]) -> MultiPolygon<f64> {
    let ring = |c: &Contour| MultiPolygon::new(vec![Polygon::new(LineString::from(c.points.clone()), vec![])]);

    let outer = contours.iter().filter(|c| !c.hole)
        .map(ring)
        .fold(MultiPolygon::empty_set(), |acc, p| acc.set_union(&p));
    let holes = contours.iter().filter(|c| c.hole)
        .map(ring)
        .fold(MultiPolygon::empty_set(), |acc, p| acc.set_union(&p));

    if holes.0.is_empty() { outer } else { outer.set_difference(&holes) }
}

/// Flatten a polygon set back into open contours with hole flags.
pub fn to_contours(shape: &MultiPolygon<f64>) -> Vec<Contour> {
    /// Strip the closing coordinate geo keeps on every ring.
    fn open_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
        let mut coords = ring.0.clone();
        if coords.len() > 1 && coords.first() == coords.last() { coords.pop(); }
        coords
    }

    shape.0.iter()
        .flat_map(|poly| {
            std::iter::once(Contour { points: open_ring(poly.exterior()), hole: false })
                .chain(poly.interiors().iter().map(|r| Contour { points: open_ring(r), hole: true }))
        })
        .filter(|c| c.points.len() >= 3)
        .collect()
}

/// Fold sub-polygons smaller than `min_area` into a touching sibling of the
/// same set, when the union with that sibling is a single polygon. Slivers
/// with no such neighbor are kept as they are, so total area never changes.
pub fn merge_slivers(shape: MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    if min_area <= 0.0 || shape.0.len() < 2 { return shape }

    let (mut slivers, mut keep): (Vec<_>, Vec<_>) = shape.0.into_iter()
        .partition(|p| p.unsigned_area() < min_area);
    if keep.is_empty() { return MultiPolygon::new(slivers) }

    let touches = |a: &Polygon<f64>, b: &Polygon<f64>| match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => ra.min().x <= rb.max().x && rb.min().x <= ra.max().x
            && ra.min().y <= rb.max().y && rb.min().y <= ra.max().y,
        _ => false,
    };

    let mut unmerged = Vec::new();
    for sliver in slivers.drain(..) {
        let target = keep.iter().enumerate()
            .filter(|(_, k)| touches(&sliver, k))
            .find_map(|(i, k)| {
                let merged = k.union(&sliver);
                (merged.0.len() == 1).then(|| (i, merged.0.into_iter().next()))
            });

        match target {
            Some((i, Some(merged))) => keep[i] = merged,
            _ => unmerged.push(sliver),
        }
    }

    if !unmerged.is_empty() {
        log::debug!("  {} sliver(s) had no neighbor to merge into", unmerged.len());
    }
    keep.extend(unmerged);
    MultiPolygon::new(keep)
}
