//! Area polygons and the priority clipper that turns overlapping feature
//! polygons into an exact partition of a bucket.
mod area;
mod clipper;
mod read;
mod set;

pub use area::AreaType;
pub use clipper::{Clipper, PolyList};
pub use set::{area_tolerance, from_contours, merge_slivers, rect_polygon, to_contours, Contour, PolygonSet, AREA_PRECISION};
