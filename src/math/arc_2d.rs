//! Three-point circular arc math in the XY plane.
//!
//! An arc is given by a start point `p0`, a point `p1` somewhere on the arc and
//! an end point `p2`. Three conventions cover the degenerate inputs:
//! - `p0 == p2`: full circle, `p1` is diametrically opposite the start
//! - collinear triple: a straight segment, radius is [`COLLINEAR_RADIUS`]
//! - otherwise: the circumcircle of the triple
use std::f64::consts::{FRAC_PI_2, TAU};

use super::angle::{self, Turn};
use super::dd::DoubleDouble;
use super::Coordinate;

/// Radius reported for an arc whose points are collinear.
pub const COLLINEAR_RADIUS: f64 = f64::INFINITY;

/// Sweep angle reported for an arc whose points are collinear.
pub const COLLINEAR_ANGLE: f64 = f64::NAN;

/// Center and radius of the circle through an arc's three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    pub center: Coordinate,
    pub radius: f64,
}

impl CircleFit {
    /// Whether the fit describes a straight segment rather than a circle.
    #[must_use]
    pub fn is_collinear(&self) -> bool {
        self.radius.is_infinite()
    }
}

/// Computes the circle through `p0`, `p1`, `p2`.
///
/// The perpendicular-bisector system is solved in double-double precision:
/// near-collinear triples make the determinant tiny, and plain doubles lose
/// most of its significant bits to cancellation.
#[must_use]
pub fn circle_center(p0: &Coordinate, p1: &Coordinate, p2: &Coordinate) -> CircleFit {
    if p0.equals_2d(p2) {
        let center = Coordinate::new(p0.x + (p1.x - p0.x) * 0.5, p0.y + (p1.y - p0.y) * 0.5);
        return CircleFit {
            radius: center.distance(p0),
            center,
        };
    }

    if angle::orientation(p0, p1, p2) == Turn::Collinear {
        let center = Coordinate::new(p0.x + (p2.x - p0.x) * 0.5, p0.y + (p2.y - p0.y) * 0.5);
        return CircleFit {
            center,
            radius: COLLINEAR_RADIUS,
        };
    }

    let (x0, y0) = (DoubleDouble::new(p0.x), DoubleDouble::new(p0.y));
    let (x1, y1) = (DoubleDouble::new(p1.x), DoubleDouble::new(p1.y));
    let (x2, y2) = (DoubleDouble::new(p2.x), DoubleDouble::new(p2.y));

    let sq1 = x1.sqr() + y1.sqr();
    let det = (x0 - x1) * (y1 - y2) - (x1 - x2) * (y0 - y1);
    let bc = (x0.sqr() + y0.sqr() - sq1).mul_f64(0.5);
    let cd = (sq1 - x2.sqr() - y2.sqr()).mul_f64(0.5);

    let cx = (bc * (y1 - y2) - cd * (y0 - y1)) / det;
    let cy = ((x0 - x1) * cd - (x1 - x2) * bc) / det;

    let center = Coordinate::new(cx.to_f64(), cy.to_f64());
    CircleFit {
        radius: p0.distance(&center),
        center,
    }
}

/// Signed sweep from `p0` through `p1` to `p2` around `center`, in `(-2π, 2π]`.
///
/// Positive sweeps are counter-clockwise. The direction comes from the
/// orientation of the triple, so a mid point opposite the start is handled
/// like any other.
#[must_use]
pub fn sweep_angle(p0: &Coordinate, p1: &Coordinate, p2: &Coordinate, center: &Coordinate) -> f64 {
    let ccw = ccw_arc(p0, p1, p2, center);
    let sweep = ccw.end_angle - ccw.start_angle;
    if ccw.reversed {
        -sweep
    } else {
        sweep
    }
}

/// Arc parametrization normalized to a counter-clockwise sweep.
///
/// `start`, `mid` and `end` are the control points in CCW order (start and end
/// swapped for clockwise input) and the angles are unwrapped so that
/// `start_angle <= mid_angle <= end_angle`.
#[derive(Debug, Clone, Copy)]
pub struct CcwArc {
    pub start: Coordinate,
    pub mid: Coordinate,
    pub end: Coordinate,
    pub start_angle: f64,
    pub mid_angle: f64,
    pub end_angle: f64,
    /// Whether the input triple was clockwise (and thus swapped).
    pub reversed: bool,
}

/// Reorients a proper (non-collinear) arc to a counter-clockwise sweep.
#[must_use]
pub fn ccw_arc(p0: &Coordinate, p1: &Coordinate, p2: &Coordinate, center: &Coordinate) -> CcwArc {
    let reversed = angle::orientation(p0, p1, p2) == Turn::Clockwise;
    let (start, end) = if reversed { (*p2, *p0) } else { (*p0, *p2) };

    let start_angle = angle::angle(center, &start);
    let mut mid_angle = angle::angle(center, p1);
    let mut end_angle = angle::angle(center, &end);

    if mid_angle < start_angle {
        mid_angle += TAU;
        end_angle += TAU;
    } else if end_angle <= start_angle {
        end_angle += TAU;
    }
    // A full circle (start == end) still needs the extra turn.
    if end_angle < mid_angle {
        end_angle += TAU;
    }

    CcwArc {
        start,
        mid: *p1,
        end,
        start_angle,
        mid_angle,
        end_angle,
        reversed,
    }
}

/// Angles `k * π/2` strictly between `from` and `to`.
pub fn quadrant_angles(from: f64, to: f64) -> impl Iterator<Item = f64> {
    let first = (from / FRAC_PI_2).floor() + 1.0;
    (0_u8..)
        .map(move |k| (first + f64::from(k)) * FRAC_PI_2)
        .take_while(move |a| *a < to)
}

/// Evaluates the point at `angle` on the circle of `radius` around `center`.
#[must_use]
pub fn point_on_circle(center: &Coordinate, radius: f64, angle: f64) -> (f64, f64) {
    (center.x + radius * angle.cos(), center.y + radius * angle.sin())
}
