use geo::{BoundingRect, MultiPolygon, Rect};
use glam::DVec3;
use spade::{
    handles::FixedVertexHandle, AngleLimit, ConstrainedDelaunayTriangulation, Point2,
    RefinementParameters, Triangulation,
};
use trimesh::TriEle;

use crate::{
    clip::{to_contours, AreaType, PolyList, PolygonSet},
    error::{ConstructError, Result},
};

use super::{nodes::NodeTable, regions::Regions, segs::SegmentList};

type Cdt = ConstrainedDelaunayTriangulation<Point2<f64>>;

/// Minimum triangle angle, in degrees, used unless refinement is turned off.
pub const DEFAULT_MIN_ANGLE: f64 = 10.0;

/// Tunables for node deduplication and mesh quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulateOptions {
    /// Polygon vertices closer than this (degrees) share one node.
    pub proximity_epsilon: f64,
    /// Fit points closer than this (degrees) to an existing node are dropped.
    pub coarse_epsilon: f64,
    /// Minimum triangle angle in degrees; `None` disables refinement.
    pub min_angle: Option<f64>,
    /// Upper bound on Steiner points added by refinement.
    pub max_steiner_points: usize,
}

impl Default for TriangulateOptions {
    fn default() -> Self {
        Self {
            proximity_epsilon: 1e-7,
            coarse_epsilon: 1e-4,
            min_angle: Some(DEFAULT_MIN_ANGLE),
            max_steiner_points: 10_000,
        }
    }
}

/// Constrained triangulation of one bucket: terrain nodes plus clipped area
/// boundaries in, attributed triangles out.
#[derive(Debug, Clone, Default)]
pub struct Triangle {
    options: TriangulateOptions,

    in_nodes: NodeTable,
    in_segs: SegmentList,
    regions: Option<Regions>,

    out_nodes: Vec<DVec3>,
    out_segs: Vec<(usize, usize)>,
    elelist: Vec<TriEle>,
}

impl Triangle {
    pub fn new(options: TriangulateOptions) -> Self {
        Self { options, ..Self::default() }
    }

    /// Assemble the input node table and constraint segments.
    ///
    /// Nodes are added in a fixed order: the bucket corners, then `corners`,
    /// then every clipped polygon vertex, then `fits` (coarsely). Anything
    /// outside the bucket is dropped; points within epsilon of an edge are
    /// snapped onto it. Returns the number of input nodes.
    pub fn build(
        &mut self,
        corners: impl IntoIterator<Item = DVec3>,
        fits: impl IntoIterator<Item = DVec3>,
        polys: &PolyList,
    ) -> Result<usize> {
        let bounds = polys.safety_base().bounding_rect()
            .ok_or_else(|| ConstructError::Geometry("no bucket rectangle to triangulate".into()))?;

        let eps = self.options.proximity_epsilon;
        let mut nodes = NodeTable::new();
        let mut segs = SegmentList::new();

        let (min, max) = (bounds.min(), bounds.max());
        for (x, y) in [(min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y)] {
            nodes.unique_add(DVec3::new(x, y, 0.0), eps);
        }

        for p in corners {
            if let Some(p) = snap_inside(&bounds, p, eps) { nodes.unique_add(p, eps); }
        }

        // constraint rings follow the dissolved outline of each area type
        let mut rings: Vec<Vec<usize>> = Vec::new();
        for area in AreaType::order() {
            let outline = polys.get(area).iter()
                .fold(MultiPolygon::empty_set(), |acc, p| acc.set_union(p));
            for contour in to_contours(&outline) {
                let mut ring: Vec<usize> = Vec::with_capacity(contour.points.len());
                for c in &contour.points {
                    let Some(p) = snap_inside(&bounds, DVec3::new(c.x, c.y, 0.0), eps) else { continue };
                    let idx = nodes.unique_add(p, eps);
                    if ring.last() != Some(&idx) { ring.push(idx); }
                }
                if ring.len() > 1 && ring.first() == ring.last() { ring.pop(); }
                if ring.len() >= 3 { rings.push(ring); }
            }
        }

        let mut skipped = 0usize;
        for p in fits {
            match snap_inside(&bounds, p, eps) {
                Some(p) if nodes.coarse_add(p, self.options.coarse_epsilon).is_some() => {}
                _ => skipped += 1,
            }
        }
        if skipped > 0 { log::debug!("  {skipped} fit point(s) skipped near existing nodes or outside"); }

        for ring in &rings {
            for (k, &a) in ring.iter().enumerate() {
                let b = ring[(k + 1) % ring.len()];
                segs.unique_divide_and_add(&nodes, a, b, eps);
            }
        }

        log::info!("  triangulation input: {} nodes, {} segments", nodes.len(), segs.len());

        self.in_nodes = nodes;
        self.in_segs = segs;
        self.regions = Some(Regions::new(polys));
        self.out_nodes.clear();
        self.out_segs.clear();
        self.elelist.clear();
        Ok(self.in_nodes.len())
    }

    /// Run the constrained Delaunay triangulation over the built input and
    /// tag each triangle with the area type under its centroid. Triangles in
    /// hole areas are dropped. Returns the number of triangles kept.
    pub fn run_triangulate(&mut self) -> Result<usize> {
        let regions = self.regions.as_ref()
            .ok_or_else(|| ConstructError::Geometry("triangulate called before build".into()))?;
        if self.in_nodes.len() < 3 {
            return Err(ConstructError::Geometry(format!("only {} input node(s)", self.in_nodes.len())));
        }

        let mut cdt = Cdt::new();
        let handles = self.in_nodes.nodes().iter()
            .map(|p| cdt.insert(Point2::new(p.x, p.y))
                .map_err(|e| ConstructError::Geometry(format!("cannot insert node ({}, {}): {e:?}", p.x, p.y))))
            .collect::<Result<Vec<FixedVertexHandle>>>()?;

        for &(a, b) in self.in_segs.segments() {
            let (ha, hb) = (handles[a], handles[b]);
            if ha == hb {
                return Err(ConstructError::Geometry(format!("degenerate constraint segment {a}-{b}")));
            }
            if !cdt.can_add_constraint(ha, hb) {
                let (pa, pb) = (self.in_nodes.get(a), self.in_nodes.get(b));
                return Err(ConstructError::Geometry(format!(
                    "constraint ({:.9}, {:.9})-({:.9}, {:.9}) crosses another boundary", pa.x, pa.y, pb.x, pb.y,
                )));
            }
            cdt.add_constraint(ha, hb);
        }

        if let Some(angle) = self.options.min_angle {
            let before = cdt.num_vertices();
            let result = cdt.refine(
                RefinementParameters::<f64>::new()
                    .with_angle_limit(AngleLimit::from_deg(angle))
                    .with_max_additional_vertices(self.options.max_steiner_points),
            );
            let added = cdt.num_vertices() - before;
            if result.refinement_complete {
                log::debug!("  refinement added {added} Steiner point(s)");
            } else {
                log::warn!("  refinement stopped at the Steiner budget after {added} point(s)");
            }
        }

        self.out_nodes = cdt.vertices()
            .map(|v| {
                let p = v.position();
                DVec3::new(p.x, p.y, 0.0)
            })
            .collect();

        self.out_segs = cdt.undirected_edges()
            .filter(|e| cdt.is_constraint_edge(e.fix()))
            .map(|e| {
                let [a, b] = e.vertices();
                (a.fix().index(), b.fix().index())
            })
            .collect();

        let mut dropped = 0usize;
        self.elelist = cdt.inner_faces()
            .filter_map(|face| {
                let [a, b, c] = face.vertices();
                let (pa, pb, pc) = (a.position(), b.position(), c.position());
                let cx = (pa.x + pb.x + pc.x) / 3.0;
                let cy = (pa.y + pb.y + pc.y) / 3.0;
                let area = regions.classify(cx, cy);
                if area.is_hole() {
                    dropped += 1;
                    return None;
                }
                Some(TriEle::new(a.fix().index(), b.fix().index(), c.fix().index(), area.index() as u32))
            })
            .collect();

        log::info!(
            "  triangulation output: {} nodes, {} triangles ({} dropped in holes)",
            self.out_nodes.len(), self.elelist.len(), dropped,
        );
        Ok(self.elelist.len())
    }

    /// Give every output node its elevation from `altitude(lon, lat)`.
    pub fn set_elevations(&mut self, altitude: impl Fn(f64, f64) -> f64) {
        for node in &mut self.out_nodes {
            node.z = altitude(node.x, node.y);
        }
    }

    #[inline] pub fn in_nodes(&self) -> &NodeTable { &self.in_nodes }

    #[inline] pub fn in_segs(&self) -> &SegmentList { &self.in_segs }

    /// Output node positions `(lon, lat, elev)`, indexed by triangle nodes.
    #[inline] pub fn out_nodes(&self) -> &[DVec3] { &self.out_nodes }

    /// Constraint edges of the finished mesh, as output node pairs.
    #[inline] pub fn out_segs(&self) -> &[(usize, usize)] { &self.out_segs }

    #[inline] pub fn elements(&self) -> &[TriEle] { &self.elelist }
}

/// `p` snapped into `bounds` if it lies within `eps` of it, else `None`.
fn snap_inside(bounds: &Rect<f64>, p: DVec3, eps: f64) -> Option<DVec3> {
    let (min, max) = (bounds.min(), bounds.max());
    let inside = p.x >= min.x - eps && p.x <= max.x + eps && p.y >= min.y - eps && p.y <= max.y + eps;
    inside.then(|| DVec3::new(p.x.clamp(min.x, max.x), p.y.clamp(min.y, max.y), p.z))
}
