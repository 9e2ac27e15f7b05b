//! Per-bucket construction pipeline and the parallel batch driver.
mod cancel;
mod config;
mod driver;

pub use cancel::CancelToken;
pub use config::ConstructConfig;
pub use driver::{batch_buckets, construct_area, construct_tile, BatchSummary, TileReport};
