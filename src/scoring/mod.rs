pub mod config;
pub mod curve;
pub mod validation;

pub use config::*;
pub use curve::{breakdown, points_table, position_to_points, PointsBreakdown, Segment};
pub use validation::validate_scoring;
