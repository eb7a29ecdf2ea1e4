pub mod angle;
pub mod arc_2d;
mod coordinate;
pub mod dd;
mod envelope;
mod precision;

pub use coordinate::{ordinates_of, Coordinate, Ordinates};
pub use envelope::Envelope;
pub use precision::PrecisionModel;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Maximum gap allowed between the end of one compound-curve segment and the
/// start of the next.
pub const ADJACENCY_TOLERANCE: f64 = 5e-7;
