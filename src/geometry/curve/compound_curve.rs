use std::sync::Arc;

use tracing::trace;

use crate::config::{ArcSegmentLength, CurveParams};
use crate::error::GeometryError;
use crate::geometry::cache::FlattenCache;
use crate::math::{ordinates_of, Coordinate, Envelope, Ordinates, ADJACENCY_TOLERANCE};

use super::{CircularString, LineString, Linearize};

/// One member of a compound curve.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Straight segments through at least two points.
    Line(LineString),
    /// Circular arcs.
    Arc(CircularString),
}

impl Segment {
    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        match self {
            Self::Line(line) => line.coords(),
            Self::Arc(arc) => arc.coords(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords().is_empty()
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Coordinate> {
        self.coords().first().copied()
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Coordinate> {
        self.coords().last().copied()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line(line) => line.length(),
            Self::Arc(arc) => arc.length(),
        }
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        match self {
            Self::Line(line) => line.envelope(),
            Self::Arc(arc) => arc.envelope(),
        }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(line) => Self::Line(line.reversed()),
            Self::Arc(arc) => Self::Arc(arc.reversed()),
        }
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::Line(a), Self::Line(b)) => a.equals_exact(b, tolerance),
            (Self::Arc(a), Self::Arc(b)) => a.equals_exact(b, tolerance),
            _ => false,
        }
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<LineString> {
        match self {
            Self::Line(line) => line.flatten_with(step),
            Self::Arc(arc) => arc.flatten_with(step),
        }
    }

    fn rewrite_coordinates(&mut self, rewrite: &mut impl FnMut(&mut Coordinate)) {
        match self {
            Self::Line(line) => line.0.iter_mut().for_each(rewrite),
            Self::Arc(arc) => arc.rewrite_coordinates(rewrite),
        }
    }
}

/// A connected chain of straight and circular segments.
///
/// Each segment starts where the previous one ends, within
/// [`ADJACENCY_TOLERANCE`].
#[derive(Debug, Clone)]
pub struct CompoundCurve {
    segments: Vec<Segment>,
    params: CurveParams,
    flattened: FlattenCache<ArcSegmentLength, LineString>,
}

impl CompoundCurve {
    /// Creates a compound curve from its segments.
    ///
    /// An empty list gives the empty compound curve.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NullOrEmptySegment`] for an empty segment,
    /// [`GeometryError::InvalidPointCount`] for a line with a single point and
    /// [`GeometryError::NotInSequence`] when consecutive segments do not meet.
    pub fn new(segments: Vec<Segment>, params: CurveParams) -> Result<Self, GeometryError> {
        validate_segments(&segments)?;
        Ok(Self {
            segments,
            params,
            flattened: FlattenCache::new(),
        })
    }

    #[must_use]
    pub fn empty(params: CurveParams) -> Self {
        Self {
            segments: Vec::new(),
            params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        ordinates_of(self.segments.iter().flat_map(Segment::coords))
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Coordinate> {
        self.segments.first().and_then(Segment::start_point)
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Coordinate> {
        self.segments.last().and_then(Segment::end_point)
    }

    /// Number of vertices of the flattened curve.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.flatten().num_points()
    }

    /// Whether the flattened curve ends where it starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.flatten().is_closed()
    }

    /// Closed and simple once flattened.
    #[must_use]
    pub fn is_ring(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let flat = self.flatten();
        flat.is_closed() && flat.is_simple()
    }

    /// Sum of the segment lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for segment in &self.segments {
            env.expand_to_include_envelope(&segment.envelope());
        }
        env
    }

    /// The same chain traversed from its end point.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            segments: self.segments.iter().rev().map(Segment::reversed).collect(),
            params: self.params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.equals_exact(b, tolerance))
    }

    /// Applies `rewrite` to the control points of every segment.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotInSequence`] if the rewritten segments no
    /// longer meet. The curve is left unchanged in that case.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        let mut segments = self.segments.clone();
        for segment in &mut segments {
            segment.rewrite_coordinates(&mut rewrite);
        }
        validate_segments(&segments)?;
        self.segments = segments;
        self.flattened.invalidate();
        Ok(())
    }
}

impl Linearize for CompoundCurve {
    type Output = LineString;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        self.params.arc_segment_length
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<LineString> {
        self.flattened.get_or_compute(step, self.params.arc_segment_length, || {
            trace!(segments = self.segments.len(), "flattening compound curve");
            let mut out: Vec<Coordinate> = Vec::new();
            for segment in &self.segments {
                let part = segment.flatten_with(step);
                let mut points = part.coords().iter();
                if let (Some(last), Some(first)) = (out.last(), part.coords().first()) {
                    if last.equals_2d_within(first, ADJACENCY_TOLERANCE) {
                        points.next();
                    }
                }
                out.extend(points.copied());
            }
            LineString(out)
        })
    }
}

impl PartialEq for CompoundCurve {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

fn validate_segments(segments: &[Segment]) -> Result<(), GeometryError> {
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(GeometryError::NullOrEmptySegment(index));
        }
        if let Segment::Line(line) = segment {
            if line.num_points() < 2 {
                return Err(GeometryError::InvalidPointCount {
                    count: line.num_points(),
                    expected: "at least 2",
                });
            }
        }
    }
    for (index, pair) in segments.windows(2).enumerate() {
        if let (Some(end), Some(start)) = (pair[0].end_point(), pair[1].start_point()) {
            let distance = end.distance(&start);
            if distance > ADJACENCY_TOLERANCE {
                return Err(GeometryError::NotInSequence {
                    index: index + 1,
                    distance,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&p| Coordinate::from(p)).collect()
    }

    fn line(points: &[(f64, f64)]) -> Segment {
        Segment::Line(LineString(coords(points)))
    }

    fn arc(points: &[(f64, f64)]) -> Segment {
        Segment::Arc(CircularString::new(coords(points), CurveParams::default()).unwrap())
    }

    fn d_shape() -> CompoundCurve {
        CompoundCurve::new(
            vec![
                arc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
                line(&[(2.0, 0.0), (0.0, 0.0)]),
            ],
            CurveParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn adjacent_segments_sum_lengths() {
        let curve = d_shape();
        assert_relative_eq!(curve.length(), PI + 2.0, epsilon = 1e-9);
        assert!(curve.is_closed());
        assert!(curve.is_ring());
    }

    #[test]
    fn gap_is_rejected() {
        let err = CompoundCurve::new(
            vec![
                arc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
                line(&[(2.0, 1e-6), (0.0, 0.0)]),
            ],
            CurveParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::NotInSequence { index: 1, .. }));
    }

    #[test]
    fn tiny_gap_is_tolerated_and_elided() {
        let curve = CompoundCurve::new(
            vec![
                line(&[(0.0, 0.0), (1.0, 0.0)]),
                line(&[(1.0, 1e-7), (2.0, 0.0)]),
            ],
            CurveParams::default(),
        )
        .unwrap();
        assert_eq!(curve.num_points(), 3);
    }

    #[test]
    fn empty_segment_is_rejected() {
        let empty = Segment::Arc(CircularString::empty(CurveParams::default()));
        assert_eq!(
            CompoundCurve::new(vec![empty], CurveParams::default()).unwrap_err(),
            GeometryError::NullOrEmptySegment(0)
        );
        assert!(CompoundCurve::new(vec![line(&[(0.0, 0.0)])], CurveParams::default()).is_err());
    }

    #[test]
    fn flatten_stitches_segments() {
        let curve = d_shape();
        let flat = curve.flatten();
        let arc_points = match &curve.segments()[0] {
            Segment::Arc(a) => a.flatten().num_points(),
            Segment::Line(_) => unreachable!(),
        };
        assert_eq!(flat.num_points(), arc_points + 1);
        assert!(flat.start_point().unwrap().equals_2d(&Coordinate::new(0.0, 0.0)));
        assert!(flat.end_point().unwrap().equals_2d(&Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn open_curve_is_not_ring() {
        let curve = CompoundCurve::new(
            vec![arc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]), line(&[(2.0, 0.0), (3.0, 0.0)])],
            CurveParams::default(),
        )
        .unwrap();
        assert!(!curve.is_closed());
        assert!(!curve.is_ring());
    }

    #[test]
    fn rejected_rewrite_leaves_curve_untouched() {
        let mut curve = d_shape();
        let before = curve.clone();
        // Moves only the arc's end point away from the line's start.
        let mut visited = 0;
        let result = curve.rewrite_coordinates(|c| {
            if visited == 2 {
                c.x += 1.0;
            }
            visited += 1;
        });
        assert!(result.is_err());
        assert_eq!(curve, before);

        curve.rewrite_coordinates(|c| c.y += 5.0).unwrap();
        assert_relative_eq!(curve.envelope().min_y(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(curve.flatten().start_point().unwrap().y, 5.0);
    }

    #[test]
    fn reversed_chain() {
        let curve = d_shape();
        let r = curve.reversed();
        assert!(matches!(r.segments()[0], Segment::Line(_)));
        assert_relative_eq!(r.length(), curve.length(), epsilon = 1e-12);
        assert!(r.is_ring());
    }
}
