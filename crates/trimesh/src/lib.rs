pub mod adj;
pub mod ele;
pub mod fans;

pub use adj::Incidence;
pub use ele::TriEle;
pub use fans::{average_fan_size, fan_triangles, greedy_build, Fan};
