use std::num::NonZeroU32;
use std::sync::OnceLock;

use crate::config::{ArcSegmentLength, DEFAULT_QUADRANT_SEGMENTS};
use crate::math::arc_2d::{self, CcwArc, CircleFit, COLLINEAR_ANGLE};
use crate::math::{Coordinate, Envelope, PrecisionModel, TOLERANCE};

/// A circular arc through three control points.
///
/// The arc is a borrowed view of three consecutive control points of a
/// circular string: `p0` is the start, `p1` lies somewhere on the arc and `p2`
/// is the end. Center, radius and envelope are computed on first access.
///
/// Collinear control points describe a straight segment. Such an arc reports
/// an infinite radius and a NaN sweep angle, and flattens to its control points.
///
/// Views are short-lived, so flattenings are not memoized here; the owning
/// string caches its stitched result.
#[derive(Debug)]
pub struct CircularArc<'a> {
    points: &'a [Coordinate; 3],
    quadrant_segments: NonZeroU32,
    fit: OnceLock<CircleFit>,
    envelope: OnceLock<Envelope>,
}

impl<'a> CircularArc<'a> {
    /// Creates an arc view using the default quadrant segment count.
    #[must_use]
    pub fn new(points: &'a [Coordinate; 3]) -> Self {
        Self::with_quadrant_segments(points, DEFAULT_QUADRANT_SEGMENTS)
    }

    /// Creates an arc view whose default flattening step uses `quadrant_segments`
    /// chords per quarter circle.
    #[must_use]
    pub fn with_quadrant_segments(points: &'a [Coordinate; 3], quadrant_segments: NonZeroU32) -> Self {
        Self {
            points,
            quadrant_segments,
            fit: OnceLock::new(),
            envelope: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn p0(&self) -> &Coordinate {
        &self.points[0]
    }

    #[must_use]
    pub fn p1(&self) -> &Coordinate {
        &self.points[1]
    }

    #[must_use]
    pub fn p2(&self) -> &Coordinate {
        &self.points[2]
    }

    #[must_use]
    pub fn points(&self) -> &'a [Coordinate; 3] {
        self.points
    }

    fn fit(&self) -> &CircleFit {
        self.fit.get_or_init(|| {
            let [p0, p1, p2] = self.points;
            arc_2d::circle_center(p0, p1, p2)
        })
    }

    /// Center of the circle through the control points.
    ///
    /// For a straight arc this is the midpoint of `p0` and `p2`.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        self.fit().center
    }

    /// Radius of the circle, [`arc_2d::COLLINEAR_RADIUS`] for a straight arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.fit().radius
    }

    /// Whether the control points are collinear.
    #[must_use]
    pub fn is_straight(&self) -> bool {
        self.fit().is_collinear()
    }

    /// Whether the arc starts and ends at the same point.
    #[must_use]
    pub fn is_full_circle(&self) -> bool {
        self.p0().equals_2d(self.p2())
    }

    /// Signed sweep angle in `(-2π, 2π]`, positive counter-clockwise.
    ///
    /// NaN for a straight arc.
    #[must_use]
    pub fn angle(&self) -> f64 {
        let fit = self.fit();
        if fit.is_collinear() {
            return COLLINEAR_ANGLE;
        }
        let [p0, p1, p2] = self.points;
        arc_2d::sweep_angle(p0, p1, p2, &fit.center)
    }

    /// Arc length; the chord length for a straight arc.
    #[must_use]
    pub fn length(&self) -> f64 {
        let fit = self.fit();
        if fit.is_collinear() {
            return self.p0().distance(self.p2());
        }
        self.angle().abs() * fit.radius
    }

    /// Tight bounding box of the arc.
    ///
    /// Extends the box of the end points by every axis-extreme point of the
    /// circle the arc passes through.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        *self.envelope.get_or_init(|| {
            let [p0, p1, p2] = self.points;
            let mut env = Envelope::from_coords([p0, p2]);
            let fit = self.fit();
            if fit.is_collinear() {
                return env;
            }
            let ccw = arc_2d::ccw_arc(p0, p1, p2, &fit.center);
            for a in arc_2d::quadrant_angles(ccw.start_angle, ccw.end_angle) {
                let (x, y) = arc_2d::point_on_circle(&fit.center, fit.radius, a);
                env.expand_to_include(x, y);
            }
            env
        })
    }

    /// Approximates the arc by chords no longer than `step`.
    ///
    /// The result starts at `p0`, passes through `p1` and ends at `p2`. Computed
    /// vertices are snapped with `precision`; control points are kept exactly.
    #[must_use]
    pub fn flatten(&self, step: ArcSegmentLength, precision: PrecisionModel) -> Vec<Coordinate> {
        let [p0, p1, p2] = self.points;
        let fit = *self.fit();
        if fit.is_collinear() || fit.radius <= TOLERANCE {
            return vec![*p0, *p1, *p2];
        }

        let ccw = arc_2d::ccw_arc(p0, p1, p2, &fit.center);
        let angle_step = step.step_for_radius(fit.radius, self.quadrant_segments) / fit.radius;

        let mut out = Vec::new();
        out.push(ccw.start);
        let mut k = (ccw.start_angle / angle_step).ceil();
        k = sample_span(&mut out, &fit, &ccw, Span::First, k, angle_step, precision);
        push_control(&mut out, ccw.mid);
        sample_span(&mut out, &fit, &ccw, Span::Second, k, angle_step, precision);
        push_control(&mut out, ccw.end);

        if ccw.reversed {
            out.reverse();
        }
        out
    }
}

impl Clone for CircularArc<'_> {
    fn clone(&self) -> Self {
        Self::with_quadrant_segments(self.points, self.quadrant_segments)
    }
}

#[derive(Clone, Copy)]
enum Span {
    First,
    Second,
}

/// Emits the grid samples `k * angle_step` lying strictly inside one half of
/// the arc and returns the next grid index.
fn sample_span(
    out: &mut Vec<Coordinate>,
    fit: &CircleFit,
    ccw: &CcwArc,
    span: Span,
    mut k: f64,
    angle_step: f64,
    precision: PrecisionModel,
) -> f64 {
    let (from, to, a0, a1) = match span {
        Span::First => (&ccw.start, &ccw.mid, ccw.start_angle, ccw.mid_angle),
        Span::Second => (&ccw.mid, &ccw.end, ccw.mid_angle, ccw.end_angle),
    };
    loop {
        let theta = k * angle_step;
        if theta >= a1 {
            return k;
        }
        k += 1.0;
        if theta <= a0 {
            continue;
        }
        let (x, y) = arc_2d::point_on_circle(&fit.center, fit.radius, theta);
        let t = if a1 > a0 { (theta - a0) / (a1 - a0) } else { 0.0 };
        let sample = Coordinate {
            x: precision.make_precise(x),
            y: precision.make_precise(y),
            z: lerp(from.z, to.z, t),
            m: lerp(from.m, to.m, t),
        };
        if out.last().is_none_or(|last| !last.equals_2d(&sample)) {
            out.push(sample);
        }
    }
}

/// Appends an exact control point, replacing a snapped sample that landed on it.
fn push_control(out: &mut Vec<Coordinate>, control: Coordinate) {
    let len = out.len();
    match out.last_mut() {
        Some(last) if len > 1 && last.equals_2d(&control) => *last = control,
        _ => out.push(control),
    }
}

fn lerp(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    a.zip(b).map(|(a, b)| a + (b - a) * t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use approx::assert_relative_eq;

    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn contains(points: &[Coordinate], p: &Coordinate) -> bool {
        points.iter().any(|q| q.equals_2d_within(p, 1e-9))
    }

    fn polyline_length(points: &[Coordinate]) -> f64 {
        points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    #[test]
    fn quarter_circle_measures() {
        let pts = [c(0.0, 10.0), c(7.071_067_8, 7.071_067_8), c(10.0, 0.0)];
        let arc = CircularArc::new(&pts);
        assert_relative_eq!(arc.center().x, 0.0, epsilon = 1e-7);
        assert_relative_eq!(arc.center().y, 0.0, epsilon = 1e-7);
        assert_relative_eq!(arc.radius(), 10.0, epsilon = 1e-7);
        assert_relative_eq!(arc.angle(), -FRAC_PI_2, epsilon = 1e-7);
        assert_relative_eq!(arc.length(), 5.0 * PI, epsilon = 1e-6);
    }

    #[test]
    fn straight_arc_is_degenerate() {
        let pts = [c(0.0, 0.0), c(1.0, 1.0), c(3.0, 3.0)];
        let arc = CircularArc::new(&pts);
        assert!(arc.is_straight());
        assert!(arc.radius().is_infinite());
        assert!(arc.angle().is_nan());
        assert_relative_eq!(arc.length(), 18.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(arc.flatten(ArcSegmentLength::DEFAULT, PrecisionModel::Floating), pts.to_vec());
    }

    #[test]
    fn repeated_control_points_are_straight() {
        let pts = [c(0.0, 0.0), c(0.0, 0.0), c(4.0, 0.0)];
        let arc = CircularArc::new(&pts);
        assert!(arc.is_straight());
        assert_relative_eq!(arc.length(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn full_circle_length() {
        let pts = [c(0.0, 0.0), c(4.0, 0.0), c(0.0, 0.0)];
        let arc = CircularArc::new(&pts);
        assert!(arc.is_full_circle());
        assert_relative_eq!(arc.angle().abs(), TAU, epsilon = 1e-9);
        assert_relative_eq!(arc.length(), TAU * 2.0, epsilon = 1e-9);
        let env = arc.envelope();
        assert!(env.approx_eq(&Envelope::from_coords(&[c(0.0, -2.0), c(4.0, 2.0)]), 1e-9));
    }

    #[test]
    fn large_sweeps_agree_with_flattening() {
        for pts in [
            [c(0.0, 1.0), c(0.0, -1.0), c(-1.0, 0.0)],
            [c(0.0, 1.0), c(0.0, -1.0), c(1.0, 0.0)],
            [c(3.0, 0.0), c(0.0, -3.0), c(0.0, 3.0)],
            [c(-2.0, 5.0), c(4.0, -1.0), c(-2.5, -0.5)],
        ] {
            let arc = CircularArc::new(&pts);
            let angle = arc.angle();
            assert!(angle.abs() > PI && angle.abs() < TAU, "angle={angle}");
            assert_relative_eq!(arc.length(), angle.abs() * arc.radius(), epsilon = 1e-9);

            let flat = arc.flatten(ArcSegmentLength::new(0.05).unwrap(), PrecisionModel::Floating);
            assert!(flat.first().unwrap().equals_2d(&pts[0]));
            assert!(flat.last().unwrap().equals_2d(&pts[2]));
            let ratio = polyline_length(&flat) / arc.length();
            assert!((ratio - 1.0).abs() < 0.02, "{pts:?}: ratio={ratio}");
        }
    }

    #[test]
    fn flatten_passes_through_control_points() {
        let pts = [c(-3.2, 1.7), c(0.4, 5.9), c(6.1, -0.3)];
        let arc = CircularArc::new(&pts);
        let flat = arc.flatten(ArcSegmentLength::new(0.5).unwrap(), PrecisionModel::Floating);
        assert!(flat.first().unwrap().equals_2d(&pts[0]));
        assert!(flat.last().unwrap().equals_2d(&pts[2]));
        assert!(contains(&flat, &pts[1]));
    }

    #[test]
    fn flatten_respects_step_and_length() {
        let pts = [c(0.0, 10.0), c(7.071_067_8, 7.071_067_8), c(10.0, 0.0)];
        let arc = CircularArc::new(&pts);
        let step = 0.5;
        let flat = arc.flatten(ArcSegmentLength::new(step).unwrap(), PrecisionModel::Floating);
        for w in flat.windows(2) {
            assert!(w[0].distance(&w[1]) <= step + 1e-9, "spacing {}", w[0].distance(&w[1]));
        }
        let ratio = polyline_length(&flat) / arc.length();
        assert!((ratio - 1.0).abs() < 0.02, "ratio={ratio}");
    }

    #[test]
    fn clockwise_flatten_runs_from_p0() {
        let pts = [c(0.0, 10.0), c(7.071_067_8, 7.071_067_8), c(10.0, 0.0)];
        let flat = CircularArc::new(&pts).flatten(ArcSegmentLength::DEFAULT, PrecisionModel::Floating);
        // Default step: 12 chords per quarter circle, plus the mid point.
        assert!((13..=15).contains(&flat.len()), "len={}", flat.len());
        assert!(flat[0].equals_2d(&pts[0]));
        assert!(flat[1].x > 0.0 && flat[1].y < 10.0);
    }

    #[test]
    fn envelope_matches_fine_flatten() {
        for pts in [
            [c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0)],
            [c(2.0, 0.0), c(0.0, 2.0), c(-2.0, 0.0)],
            [c(-3.2, 1.7), c(0.4, 5.9), c(6.1, -0.3)],
            [c(10.0, 0.0), c(0.0, -10.0), c(-10.0, 0.0)],
        ] {
            let arc = CircularArc::new(&pts);
            let flat = arc.flatten(ArcSegmentLength::new(1e-3).unwrap(), PrecisionModel::Floating);
            let fine = Envelope::from_coords(flat.iter());
            assert!(arc.envelope().approx_eq(&fine, 1e-6), "{:?} vs {:?}", arc.envelope(), fine);
        }
    }

    #[test]
    fn flatten_interpolates_z() {
        let pts = [
            Coordinate::xyz(1.0, 0.0, 0.0),
            Coordinate::xyz(0.0, 1.0, 10.0),
            Coordinate::xyz(-1.0, 0.0, 20.0),
        ];
        let flat = CircularArc::new(&pts).flatten(ArcSegmentLength::new(0.1).unwrap(), PrecisionModel::Floating);
        let zs: Vec<f64> = flat.iter().map(|p| p.z.unwrap()).collect();
        assert!(zs.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(*zs.last().unwrap(), 20.0);
    }

    #[test]
    fn flatten_snaps_to_precision_model() {
        let pts = [c(0.0, 10.0), c(7.071_067_8, 7.071_067_8), c(10.0, 0.0)];
        let precision = PrecisionModel::fixed(1.0).unwrap();
        let flat = CircularArc::new(&pts).flatten(ArcSegmentLength::DEFAULT, precision);
        for p in &flat[1..flat.len() - 1] {
            if !p.equals_2d(&pts[1]) {
                assert_relative_eq!(p.x, p.x.round());
                assert_relative_eq!(p.y, p.y.round());
            }
        }
        for w in flat.windows(2) {
            assert!(!w[0].equals_2d(&w[1]));
        }
    }

    #[test]
    fn finer_step_gives_more_vertices() {
        let pts = [c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0)];
        let arc = CircularArc::new(&pts);
        let coarse = arc.flatten(ArcSegmentLength::DEFAULT, PrecisionModel::Floating);
        assert_eq!(coarse, arc.flatten(ArcSegmentLength::DEFAULT, PrecisionModel::Floating));
        let fine = arc.flatten(ArcSegmentLength::new(0.01).unwrap(), PrecisionModel::Floating);
        assert!(fine.len() > coarse.len());
    }
}
