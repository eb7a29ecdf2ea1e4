use std::sync::Arc;

use crate::config::{ArcSegmentLength, CurveParams};
use crate::error::GeometryError;
use crate::math::{Coordinate, Envelope, Ordinates};

use super::cache::FlattenCache;
use super::collection::{merge_ordinates, MultiLineString, MultiPolygon};
use super::curve::{Curve, Linearize};
use super::surface::Surface;

/// A collection of curves, any of which may contain arcs.
#[derive(Debug, Clone)]
pub struct MultiCurve {
    members: Vec<Curve>,
    params: CurveParams,
    flattened: FlattenCache<ArcSegmentLength, MultiLineString>,
}

impl MultiCurve {
    #[must_use]
    pub fn new(members: Vec<Curve>, params: CurveParams) -> Self {
        Self {
            members,
            params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Curve] {
        &self.members
    }

    #[must_use]
    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Curve::is_empty)
    }

    /// Whether every member is closed. An empty collection is not closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.members.iter().all(Curve::is_closed)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.members.iter().map(Curve::length).sum()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for member in &self.members {
            env.expand_to_include_envelope(&member.envelope());
        }
        env
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        merge_ordinates(self.members.iter().map(Curve::ordinates))
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.equals_exact(b, tolerance))
    }

    /// Applies `rewrite` to every member.
    ///
    /// # Errors
    ///
    /// Returns the first member validation error; the collection is then left
    /// unchanged.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        let mut members = self.members.clone();
        for member in &mut members {
            member.rewrite_coordinates(&mut rewrite)?;
        }
        self.members = members;
        self.flattened.invalidate();
        Ok(())
    }
}

impl Linearize for MultiCurve {
    type Output = MultiLineString;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        self.params.arc_segment_length
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<MultiLineString> {
        self.flattened.get_or_compute(step, self.params.arc_segment_length, || {
            MultiLineString(
                self.members
                    .iter()
                    .map(|member| member.flatten_with(step).as_ref().clone())
                    .collect(),
            )
        })
    }
}

impl PartialEq for MultiCurve {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

/// A collection of surfaces, any of which may have curved rings.
#[derive(Debug, Clone)]
pub struct MultiSurface {
    members: Vec<Surface>,
    params: CurveParams,
    flattened: FlattenCache<ArcSegmentLength, MultiPolygon>,
}

impl MultiSurface {
    #[must_use]
    pub fn new(members: Vec<Surface>, params: CurveParams) -> Self {
        Self {
            members,
            params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Surface] {
        &self.members
    }

    #[must_use]
    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Surface::is_empty)
    }

    /// Area of the flattened members.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.members.iter().map(Surface::area).sum()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.members.iter().map(Surface::perimeter).sum()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for member in &self.members {
            env.expand_to_include_envelope(&member.envelope());
        }
        env
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        merge_ordinates(self.members.iter().map(Surface::ordinates))
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.equals_exact(b, tolerance))
    }

    /// Applies `rewrite` to every member.
    ///
    /// # Errors
    ///
    /// Returns the first member validation error; the collection is then left
    /// unchanged.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        let mut members = self.members.clone();
        for member in &mut members {
            member.rewrite_coordinates(&mut rewrite)?;
        }
        self.members = members;
        self.flattened.invalidate();
        Ok(())
    }
}

impl Linearize for MultiSurface {
    type Output = MultiPolygon;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        self.params.arc_segment_length
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<MultiPolygon> {
        self.flattened.get_or_compute(step, self.params.arc_segment_length, || {
            MultiPolygon(
                self.members
                    .iter()
                    .map(|member| member.flatten_with(step).as_ref().clone())
                    .collect(),
            )
        })
    }
}

impl PartialEq for MultiSurface {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::curve::{CircularString, LineString};
    use crate::geometry::surface::{CurvePolygon, Polygon};

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&p| Coordinate::from(p)).collect()
    }

    fn arc(points: &[(f64, f64)]) -> Curve {
        Curve::CircularString(CircularString::new(coords(points), CurveParams::default()).unwrap())
    }

    #[test]
    fn multi_curve_is_closed_only_when_all_members_are() {
        let circle = arc(&[(0.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        let open = Curve::LineString(LineString(coords(&[(5.0, 5.0), (6.0, 6.0)])));
        assert!(MultiCurve::new(vec![circle.clone()], CurveParams::default()).is_closed());
        assert!(!MultiCurve::new(vec![circle, open], CurveParams::default()).is_closed());
        assert!(!MultiCurve::new(vec![], CurveParams::default()).is_closed());
    }

    #[test]
    fn multi_curve_flattens_each_member() {
        let mc = MultiCurve::new(
            vec![
                arc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
                Curve::LineString(LineString(coords(&[(3.0, 0.0), (4.0, 0.0)]))),
                Curve::LineString(LineString::empty()),
            ],
            CurveParams::default(),
        );
        let flat = mc.flatten();
        assert_eq!(flat.0.len(), 3);
        assert_eq!(flat.0[1].num_points(), 2);
        assert!(flat.0[2].is_empty());
        assert_relative_eq!(mc.length(), PI + 1.0, epsilon = 1e-9);
    }

    #[test]
    fn multi_surface_mixes_linear_and_curved() {
        let square = Polygon::new(
            LineString(coords(&[(10.0, 0.0), (11.0, 0.0), (11.0, 1.0), (10.0, 1.0), (10.0, 0.0)])),
            vec![],
        )
        .unwrap();
        let disc = CurvePolygon::new(arc(&[(-1.0, 0.0), (1.0, 0.0), (-1.0, 0.0)]), vec![], CurveParams::default())
            .unwrap();
        let ms = MultiSurface::new(vec![Surface::Polygon(square), Surface::CurvePolygon(disc)], CurveParams::default());
        assert!((ms.area() - (1.0 + PI)).abs() < 0.05);
        let env = ms.envelope();
        assert_relative_eq!(env.min_x(), -1.0, epsilon = 1e-9);
        assert_relative_eq!(env.max_x(), 11.0, epsilon = 1e-9);
        assert_eq!(ms.flatten().0.len(), 2);
    }

    #[test]
    fn rewrite_invalidates_flattening() {
        let mut mc = MultiCurve::new(vec![arc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])], CurveParams::default());
        let before = mc.flatten();
        mc.rewrite_coordinates(|c| c.y -= 1.0).unwrap();
        let after = mc.flatten();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_relative_eq!(after.0[0].start_point().unwrap().y, -1.0);
    }
}
