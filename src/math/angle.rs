//! Angle and orientation helpers in the XY plane.

use geo::algorithm::kernels::{Kernel, Orientation, RobustKernel};

use super::Coordinate;

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// Robust orientation of `p`, `q`, `r` (Shewchuk predicates via `geo`).
#[must_use]
pub fn orientation(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> Turn {
    match <RobustKernel as Kernel<f64>>::orient2d(
        geo::Coord::from(*p),
        geo::Coord::from(*q),
        geo::Coord::from(*r),
    ) {
        Orientation::CounterClockwise => Turn::CounterClockwise,
        Orientation::Clockwise => Turn::Clockwise,
        Orientation::Collinear => Turn::Collinear,
    }
}

/// Angle of the vector `from -> to`, in `(-π, π]`.
#[must_use]
pub fn angle(from: &Coordinate, to: &Coordinate) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}
