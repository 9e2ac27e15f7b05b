use glam::DVec3;
use rstar::{primitives::GeomWithData, RTree, AABB};

/// A planar point in the R-tree, tagged with its node index.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Node table with proximity deduplication. Positions are `(lon, lat, elev)`
/// and indices are stable once handed out.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<DVec3>,
    rtree: RTree<IndexedPoint>,
}

impl NodeTable {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.nodes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[inline] pub fn nodes(&self) -> &[DVec3] { &self.nodes }

    #[inline] pub fn get(&self, idx: usize) -> DVec3 { self.nodes[idx] }

    /// Index of the closest node within `epsilon` of `(x, y)`, if any.
    pub fn find(&self, x: f64, y: f64, epsilon: f64) -> Option<usize> {
        let dist2 = |p: &IndexedPoint| {
            let [px, py] = *p.geom();
            (px - x).powi(2) + (py - y).powi(2)
        };
        self.rtree.locate_within_distance([x, y], epsilon * epsilon)
            .min_by(|a, b| dist2(a).total_cmp(&dist2(b)).then(a.data.cmp(&b.data)))
            .map(|p| p.data)
    }

    /// Append `p` without looking for duplicates.
    pub fn simple_add(&mut self, p: DVec3) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(p);
        self.rtree.insert(IndexedPoint::new([p.x, p.y], idx));
        idx
    }

    /// Index of an existing node within `epsilon` of `p`, or of `p` newly
    /// appended.
    pub fn unique_add(&mut self, p: DVec3, epsilon: f64) -> usize {
        self.find(p.x, p.y, epsilon).unwrap_or_else(|| self.simple_add(p))
    }

    /// Append `p` only if no node lies within `epsilon`. Used for terrain
    /// fit points, which are dropped near existing structure.
    pub fn coarse_add(&mut self, p: DVec3, epsilon: f64) -> Option<usize> {
        match self.find(p.x, p.y, epsilon) {
            Some(_) => None,
            None => Some(self.simple_add(p)),
        }
    }

    /// Nodes whose position falls in the box `min..max`.
    pub fn within(&self, min: [f64; 2], max: [f64; 2]) -> impl Iterator<Item = usize> + '_ {
        self.rtree.locate_in_envelope(&AABB::from_corners(min, max)).map(|p| p.data)
    }
}
