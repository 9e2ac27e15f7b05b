#![doc = "TerraGear public API: scenery tile construction from elevation grids and area polygons"]
mod array;
mod bucket;
mod clip;
mod common;
mod construct;
mod error;
mod output;
mod triangulate;

#[doc(inline)]
pub use array::Array;

#[doc(inline)]
pub use bucket::{bucket_span, Bucket, BUCKET_SPAN};

#[doc(inline)]
pub use clip::{
    area_tolerance, from_contours, merge_slivers, rect_polygon, to_contours, AreaType, Clipper, Contour, PolyList, PolygonSet,
    AREA_PRECISION,
};

#[doc(inline)]
pub use construct::{batch_buckets, construct_area, construct_tile, BatchSummary, CancelToken, ConstructConfig, TileReport};

#[doc(inline)]
pub use error::{ConstructError, Result};

#[doc(inline)]
pub use output::{calc_tex_coords, geod_to_cart, GenOutput, OutputStyle, SCENERY_VERSION, TEXTURE_DIMENSION_M};

#[doc(inline)]
pub use triangulate::{NodeTable, SegmentList, Triangle, TriangulateOptions, DEFAULT_MIN_ANGLE};

pub use trimesh;
