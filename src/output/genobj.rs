use ahash::AHashSet;
use glam::{DVec2, DVec3};
use trimesh::{average_fan_size, greedy_build, Fan, Incidence, TriEle};

use crate::{
    clip::AreaType,
    error::{ConstructError, Result},
    triangulate::NodeTable,
};

use super::{wgs84::{geod_to_cart, EQUATORIAL_RADIUS_M}, OutputStyle};

/// Ground distance, in meters, covered by one repeat of a terrain texture.
pub const TEXTURE_DIMENSION_M: f64 = 1000.0;

/// Texture coordinates closer than this are shared, and shifted values
/// below it snap to zero.
const TEX_EPSILON: f64 = 1e-7;

/// Meters per degree of longitude and of latitude at `center_lat` degrees.
#[inline]
fn degree_size(center_lat: f64) -> DVec2 {
    let perimeter = 2.0 * std::f64::consts::PI * EQUATORIAL_RADIUS_M;
    DVec2::new(perimeter * center_lat.to_radians().cos() / 360.0, perimeter / 360.0)
}

/// Unstretched texture coordinates for a fan's vertices, in texture repeats.
///
/// Positions are scaled from degrees to repeats at the tile's center
/// latitude, then shifted by the fan's minimum, truncated and one repeat
/// lower, so every value is non-negative and small.
pub fn calc_tex_coords(geod_nodes: &[DVec3], fan: &[usize], center_lat: f64) -> Vec<DVec2> {
    let scale = degree_size(center_lat) / TEXTURE_DIMENSION_M;
    let raw: Vec<DVec2> = fan.iter().map(|&n| geod_nodes[n].truncate() * scale).collect();

    let Some(min) = raw.iter().copied().reduce(DVec2::min) else { return raw };
    let origin = min.trunc() - DVec2::ONE;

    raw.into_iter()
        .map(|t| {
            let shifted = t - origin;
            DVec2::new(
                if shifted.x < TEX_EPSILON { 0.0 } else { shifted.x },
                if shifted.y < TEX_EPSILON { 0.0 } else { shifted.y },
            )
        })
        .collect()
}

/// Cartesian mesh data derived from a triangulated bucket: WGS-84 points,
/// normals, bounding spheres, and per-area triangle fans.
#[derive(Debug, Clone)]
pub struct GenOutput {
    pub(super) style: OutputStyle,
    pub(super) gzip: bool,

    geod_nodes: Vec<DVec3>,
    tri_elements: Vec<TriEle>,

    wgs84_nodes: Vec<DVec3>,
    gbs_center: DVec3,
    gbs_radius: f64,

    reverse_ele_lookup: Incidence,
    face_normals: Vec<DVec3>,
    point_normals: Vec<DVec3>,

    fans: [Vec<Fan>; AreaType::COUNT],

    /// Shared texture coordinate table (`z` unused).
    tex_coords: NodeTable,
    /// Per area and fan: a texture index for each fan vertex.
    textures: [Vec<Vec<usize>>; AreaType::COUNT],
}

impl Default for GenOutput {
    fn default() -> Self { Self::new(OutputStyle::default(), false) }
}

impl GenOutput {
    pub fn new(style: OutputStyle, gzip: bool) -> Self {
        Self {
            style,
            gzip,
            geod_nodes: Vec::new(),
            tri_elements: Vec::new(),
            wgs84_nodes: Vec::new(),
            gbs_center: DVec3::ZERO,
            gbs_radius: 0.0,
            reverse_ele_lookup: Incidence::default(),
            face_normals: Vec::new(),
            point_normals: Vec::new(),
            fans: std::array::from_fn(|_| Vec::new()),
            tex_coords: NodeTable::new(),
            textures: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Derive everything the writer needs from geodetic `nodes` and the
    /// triangles over them. Steps run in a fixed order since each depends on
    /// the one before: WGS-84 points, global bounding sphere, node lookup
    /// table, face normals, vertex normals. Fans are grouped per area type
    /// and carry texture coordinates.
    pub fn build(&mut self, nodes: &[DVec3], elements: &[TriEle]) -> Result<()> {
        if let Some(t) = elements.iter().find(|t| t.max_node() >= nodes.len()) {
            return Err(ConstructError::Geometry(format!("{t} references a node beyond {}", nodes.len())));
        }

        self.geod_nodes = nodes.to_vec();
        self.tri_elements = elements.to_vec();

        self.gen_wgs84_points();
        self.calc_gbs();
        log::debug!("  gbs center = {:?} radius = {:.2}", self.gbs_center, self.gbs_radius);
        self.gen_node_ele_lookup_table();
        self.gen_face_normals();
        self.gen_normals();
        self.gen_fans();
        self.gen_tex_coords();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Points and spheres
    // ------------------------------------------------------------------------

    /// Convert the geodetic node list to WGS-84 Cartesian coordinates.
    pub fn gen_wgs84_points(&mut self) {
        self.wgs84_nodes = self.geod_nodes.iter().copied().map(geod_to_cart).collect();
    }

    /// Global bounding sphere: centroid of all points, radius to the farthest.
    pub fn calc_gbs(&mut self) {
        let (center, radius) = sphere_of(self.wgs84_nodes.iter().copied());
        self.gbs_center = center;
        self.gbs_radius = radius;
    }

    /// Bounding sphere of one triangle: vertex mean, radius to the farthest.
    pub fn calc_bounding_sphere(&self, t: &TriEle) -> (DVec3, f64) {
        sphere_of(t.nodes().into_iter().map(|n| self.wgs84_nodes[n]))
    }

    /// Bounding sphere of every distinct node used by a group of fans.
    pub fn calc_group_bounding_sphere(&self, fans: &[Fan]) -> (DVec3, f64) {
        let mut seen = AHashSet::new();
        let unique: Vec<usize> = fans.iter().flatten().copied().filter(|n| seen.insert(*n)).collect();
        sphere_of(unique.into_iter().map(|n| self.wgs84_nodes[n]))
    }

    // ------------------------------------------------------------------------
    // Normals
    // ------------------------------------------------------------------------

    /// Node → incident triangle table.
    pub fn gen_node_ele_lookup_table(&mut self) {
        self.reverse_ele_lookup = Incidence::build(self.wgs84_nodes.len(), &self.tri_elements);
    }

    /// Unit normal of triangle `i`, facing out of the counter-clockwise side.
    pub fn calc_normal(&self, i: usize) -> DVec3 {
        let [a, b, c] = self.tri_elements[i].nodes().map(|n| self.wgs84_nodes[n]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    pub fn gen_face_normals(&mut self) {
        self.face_normals = (0..self.tri_elements.len()).map(|i| self.calc_normal(i)).collect();
    }

    /// Vertex normals: mean of incident face normals, renormalized. Nodes no
    /// triangle touches get the local ellipsoid "up".
    pub fn gen_normals(&mut self) {
        self.point_normals = (0..self.wgs84_nodes.len())
            .map(|n| {
                let sum: DVec3 = self.reverse_ele_lookup.triangles(n).map(|t| self.face_normals[t]).sum();
                match sum.try_normalize() {
                    Some(normal) => normal,
                    None => self.wgs84_nodes[n].normalize_or_zero(),
                }
            })
            .collect();
    }

    // ------------------------------------------------------------------------
    // Fans
    // ------------------------------------------------------------------------

    fn gen_fans(&mut self) {
        for slot in &mut self.fans { slot.clear(); }

        for area in AreaType::order() {
            let area_tris: Vec<TriEle> = self.tri_elements.iter()
                .filter(|t| t.attribute as usize == area.index())
                .copied()
                .collect();
            if area_tris.is_empty() { continue }

            let fans = greedy_build(&area_tris);
            log::debug!(
                "  {area}: {} triangles in {} fans (average {:.2} nodes)",
                area_tris.len(), fans.len(), average_fan_size(&fans),
            );
            self.fans[area.index()] = fans;
        }
    }

    // ------------------------------------------------------------------------
    // Texture coordinates
    // ------------------------------------------------------------------------

    /// Latitude the texture scale is taken at: the middle of the mesh's
    /// latitude span, which is the bucket center for a full tile.
    fn center_lat(&self) -> f64 {
        let (lo, hi) = self.geod_nodes.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        if lo <= hi { 0.5 * (lo + hi) } else { 0.0 }
    }

    /// Texture coordinates for every fan, deduplicated into one table.
    pub fn gen_tex_coords(&mut self) {
        let center_lat = self.center_lat();
        self.tex_coords = NodeTable::new();

        for area in AreaType::order() {
            let lists: Vec<Vec<usize>> = self.fans[area.index()].iter()
                .map(|fan| {
                    calc_tex_coords(&self.geod_nodes, fan, center_lat).into_iter()
                        .map(|t| self.tex_coords.unique_add(t.extend(0.0), TEX_EPSILON))
                        .collect()
                })
                .collect();
            self.textures[area.index()] = lists;
        }
        log::debug!("  {} texture coordinates at latitude {center_lat:.3}", self.tex_coords.len());
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline] pub fn geod_nodes(&self) -> &[DVec3] { &self.geod_nodes }
    #[inline] pub fn wgs84_nodes(&self) -> &[DVec3] { &self.wgs84_nodes }
    #[inline] pub fn elements(&self) -> &[TriEle] { &self.tri_elements }
    #[inline] pub fn gbs_center(&self) -> DVec3 { self.gbs_center }
    #[inline] pub fn gbs_radius(&self) -> f64 { self.gbs_radius }
    #[inline] pub fn face_normals(&self) -> &[DVec3] { &self.face_normals }
    #[inline] pub fn point_normals(&self) -> &[DVec3] { &self.point_normals }
    #[inline] pub fn node_triangles(&self, node: usize) -> impl Iterator<Item = usize> + '_ { self.reverse_ele_lookup.triangles(node) }
    #[inline] pub fn fans(&self, area: AreaType) -> &[Fan] { &self.fans[area.index()] }
    #[inline] pub fn tex_coords(&self) -> &[DVec3] { self.tex_coords.nodes() }

    /// Texture indices parallel to [`GenOutput::fans`].
    #[inline] pub fn textures(&self, area: AreaType) -> &[Vec<usize>] { &self.textures[area.index()] }
}

/// Mean of `points` and the distance from it to the farthest point.
fn sphere_of(points: impl Iterator<Item = DVec3> + Clone) -> (DVec3, f64) {
    let (sum, count) = points.clone().fold((DVec3::ZERO, 0usize), |(s, n), p| (s + p, n + 1));
    if count == 0 { return (DVec3::ZERO, 0.0) }
    let center = sum / count as f64;
    let radius = points.map(|p| p.distance_squared(center)).fold(0.0, f64::max).sqrt();
    (center, radius)
}
