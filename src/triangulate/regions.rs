use geo::{BoundingRect, Intersects, MultiPolygon, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::clip::{AreaType, PolyList};

/// A bounding box in an R-tree, associated with a region by index.
#[derive(Debug, Clone)]
struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Clipped area polygons indexed for point lookup. Regions keep the
/// priority order of the `PolyList` they came from.
#[derive(Debug, Clone)]
pub(crate) struct Regions {
    shapes: Vec<(AreaType, MultiPolygon<f64>)>,
    rtree: RTree<BoundingBox>,
}

impl Regions {
    pub(crate) fn new(polys: &PolyList) -> Self {
        let shapes: Vec<_> = polys.iter().map(|(t, p)| (t, p.clone())).collect();
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(idx, (_, shape))| shape.bounding_rect().map(|bbox| BoundingBox { idx, bbox }))
                    .collect()
            ),
            shapes,
        }
    }

    /// The area type of the first region (in priority order) containing
    /// `(x, y)`, or the background type if none does.
    pub(crate) fn classify(&self, x: f64, y: f64) -> AreaType {
        let point = Point::new(x, y);
        self.rtree.locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|b| b.idx)
            .filter(|&idx| self.shapes[idx].1.intersects(&point))
            .min()
            .map_or(AreaType::BACKGROUND, |idx| self.shapes[idx].0)
    }
}
