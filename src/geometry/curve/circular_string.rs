use std::sync::Arc;

use crate::config::{ArcSegmentLength, CurveParams};
use crate::error::GeometryError;
use crate::geometry::cache::FlattenCache;
use crate::math::{ordinates_of, Coordinate, Envelope, Ordinates};

use super::{CircularArc, LineString, Linearize};

/// A chain of circular arcs sharing end points.
///
/// Control points `0, 1, 2` form the first arc, `2, 3, 4` the second, and so
/// on. A circular string is either empty or has an odd number of at least
/// three control points.
#[derive(Debug, Clone)]
pub struct CircularString {
    points: Vec<Coordinate>,
    params: CurveParams,
    flattened: FlattenCache<ArcSegmentLength, LineString>,
}

impl CircularString {
    /// Creates a circular string from its control points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPointCount`] unless `points` is empty or
    /// holds an odd number of at least three coordinates.
    pub fn new(points: Vec<Coordinate>, params: CurveParams) -> Result<Self, GeometryError> {
        validate_count(points.len())?;
        Ok(Self {
            points,
            params,
            flattened: FlattenCache::new(),
        })
    }

    #[must_use]
    pub fn empty(params: CurveParams) -> Self {
        Self {
            points: Vec::new(),
            params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.points
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        ordinates_of(&self.points)
    }

    #[must_use]
    pub fn num_arcs(&self) -> usize {
        self.points.len().saturating_sub(1) / 2
    }

    /// Returns the arc starting at control point `2 * index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index >= num_arcs()`.
    pub fn arc(&self, index: usize) -> Result<CircularArc<'_>, GeometryError> {
        let len = self.num_arcs();
        if index >= len {
            return Err(GeometryError::IndexOutOfRange { index, len });
        }
        let start = 2 * index;
        self.points
            .get(start..start + 3)
            .and_then(|window| <&[Coordinate; 3]>::try_from(window).ok())
            .map(|points| CircularArc::with_quadrant_segments(points, self.params.quadrant_segments))
            .ok_or(GeometryError::IndexOutOfRange { index, len })
    }

    /// Iterates over the arcs in order.
    pub fn arcs(&self) -> impl Iterator<Item = CircularArc<'_>> {
        let quadrant_segments = self.params.quadrant_segments;
        self.points
            .windows(3)
            .step_by(2)
            .filter_map(|window| <&[Coordinate; 3]>::try_from(window).ok())
            .map(move |points| CircularArc::with_quadrant_segments(points, quadrant_segments))
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// A control point lying on the curve, away from the end points.
    #[must_use]
    pub fn interior_point(&self) -> Option<Coordinate> {
        self.points.get(self.points.len() / 2).copied()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// Closed and simple once flattened.
    #[must_use]
    pub fn is_ring(&self) -> bool {
        self.is_empty() || (self.is_closed() && self.flatten().is_simple())
    }

    /// Sum of the arc lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arcs().map(|arc| arc.length()).sum()
    }

    /// Union of the arc envelopes.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for arc in self.arcs() {
            env.expand_to_include_envelope(&arc.envelope());
        }
        env
    }

    /// The same arcs traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
            params: self.params,
            flattened: FlattenCache::new(),
        }
    }

    /// Control point equality in X and Y within `tolerance`.
    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.equals_2d_within(b, tolerance))
    }

    /// Applies `rewrite` to every control point and drops cached results.
    pub fn rewrite_coordinates(&mut self, rewrite: impl FnMut(&mut Coordinate)) {
        self.points.iter_mut().for_each(rewrite);
        self.flattened.invalidate();
    }
}

impl Linearize for CircularString {
    type Output = LineString;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        self.params.arc_segment_length
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<LineString> {
        self.flattened.get_or_compute(step, self.params.arc_segment_length, || {
            let precision = self.params.precision;
            let mut out: Vec<Coordinate> = Vec::new();
            for arc in self.arcs() {
                let points = arc.flatten(step, precision);
                let skip = usize::from(!out.is_empty());
                out.extend(points.iter().skip(skip).copied());
            }
            LineString(out)
        })
    }
}

impl PartialEq for CircularString {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

fn validate_count(count: usize) -> Result<(), GeometryError> {
    if count == 0 || (count >= 3 && count % 2 == 1) {
        Ok(())
    } else {
        Err(GeometryError::InvalidPointCount {
            count,
            expected: "0 or an odd count >= 3",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    fn string(points: &[(f64, f64)]) -> CircularString {
        CircularString::new(points.iter().map(|&p| Coordinate::from(p)).collect(), CurveParams::default()).unwrap()
    }

    #[test]
    fn point_count_parity() {
        for count in [1, 2, 4, 6] {
            let points = vec![Coordinate::new(0.0, 0.0); count];
            assert_eq!(
                CircularString::new(points, CurveParams::default()).unwrap_err(),
                GeometryError::InvalidPointCount {
                    count,
                    expected: "0 or an odd count >= 3"
                }
            );
        }
        assert!(CircularString::new(vec![Coordinate::default(); 5], CurveParams::default()).is_ok());
    }

    #[test]
    fn empty_string() {
        let empty = CircularString::empty(CurveParams::default());
        assert!(empty.is_empty());
        assert_eq!(empty.num_arcs(), 0);
        assert!(empty.flatten().is_empty());
        assert!(empty.envelope().is_null());
        assert!(empty.arc(0).is_err());
    }

    #[test]
    fn arcs_share_end_points() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, -1.0), (4.0, 0.0)]);
        assert_eq!(s.num_arcs(), 2);
        let second = s.arc(1).unwrap();
        assert!(second.p0().equals_2d(&Coordinate::new(2.0, 0.0)));
        assert_eq!(
            s.arc(2).unwrap_err(),
            GeometryError::IndexOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn length_and_envelope_of_s_curve() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, -1.0), (4.0, 0.0)]);
        assert_relative_eq!(s.length(), 2.0 * PI, epsilon = 1e-9);
        let env = s.envelope();
        assert_relative_eq!(env.min_y(), -1.0, epsilon = 1e-9);
        assert_relative_eq!(env.max_y(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn flatten_elides_shared_vertices() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, -1.0), (4.0, 0.0)]);
        let flat = s.flatten();
        for w in flat.coords().windows(2) {
            assert!(!w[0].equals_2d(&w[1]));
        }
        let shared = flat.coords().iter().filter(|p| p.equals_2d(&Coordinate::new(2.0, 0.0))).count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn flatten_is_cached_until_rewrite() {
        let mut s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let a = s.flatten();
        assert!(Arc::ptr_eq(&a, &s.flatten()));
        s.rewrite_coordinates(|c| c.x *= 2.0);
        let b = s.flatten();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_relative_eq!(b.end_point().unwrap().x, 4.0);
    }

    #[test]
    fn one_off_tolerance_keeps_default_cached() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let fine = s.linearize(0.01).unwrap();
        let a = s.flatten();
        assert!(Arc::ptr_eq(&a, &s.flatten()));
        assert!(fine.num_points() > a.num_points());
        assert!(!Arc::ptr_eq(&fine, &s.linearize(0.01).unwrap()));
    }

    #[test]
    fn linearize_rejects_negative_tolerance() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        assert!(s.linearize(-1.0).is_err());
        assert!(s.linearize(0.01).unwrap().num_points() > s.flatten().num_points());
    }

    #[test]
    fn full_circle_is_ring() {
        let circle = string(&[(0.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        assert!(circle.is_closed());
        assert!(circle.is_ring());
        assert_relative_eq!(circle.length(), 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn reversed_keeps_geometry() {
        let s = string(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let r = s.reversed();
        assert_eq!(r.start_point(), s.end_point());
        assert_relative_eq!(r.length(), s.length(), epsilon = 1e-12);
        assert!(r.reversed().equals_exact(&s, 0.0));
        assert_eq!(s.interior_point(), Some(Coordinate::new(1.0, 1.0)));
    }
}
