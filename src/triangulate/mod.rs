//! Constrained triangulation of a bucket's terrain nodes and clipped area
//! boundaries.
mod nodes;
mod regions;
mod segs;
mod triangle;

pub use nodes::NodeTable;
pub use segs::SegmentList;
pub use triangle::{Triangle, TriangulateOptions, DEFAULT_MIN_ANGLE};
