pub mod geometry;
pub mod units;

pub use geometry::Rect;
pub use units::ProfilingUnit;
