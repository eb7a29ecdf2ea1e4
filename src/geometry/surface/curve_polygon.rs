use std::sync::Arc;

use geo::Area;

use crate::config::{ArcSegmentLength, CurveParams};
use crate::error::GeometryError;
use crate::geometry::cache::FlattenCache;
use crate::geometry::collection::merge_ordinates;
use crate::geometry::curve::{CompoundCurve, Curve, Linearize};
use crate::math::{Coordinate, Envelope, Ordinates};

use super::Polygon;

/// A polygon whose rings may contain circular arcs.
///
/// Rings are any [`Curve`]: linear strings, circular strings or compound
/// curves. Every ring is empty or a closed, simple curve, and every hole's
/// envelope lies inside the exterior's.
#[derive(Debug, Clone)]
pub struct CurvePolygon {
    exterior: Curve,
    interiors: Vec<Curve>,
    params: CurveParams,
    flattened: FlattenCache<ArcSegmentLength, Polygon>,
}

impl CurvePolygon {
    /// Creates a curve polygon from its rings.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NotARing`] if a ring is not closed and simple
    /// - [`GeometryError::HoleOutsideShell`] if a hole's envelope leaves the exterior's
    /// - [`GeometryError::HolesWithoutShell`] if the exterior is empty but a hole is not
    pub fn new(exterior: Curve, interiors: Vec<Curve>, params: CurveParams) -> Result<Self, GeometryError> {
        validate_rings(&exterior, &interiors)?;
        Ok(Self {
            exterior,
            interiors,
            params,
            flattened: FlattenCache::new(),
        })
    }

    /// The empty curve polygon.
    #[must_use]
    pub fn empty(params: CurveParams) -> Self {
        Self {
            exterior: Curve::CompoundCurve(CompoundCurve::empty(params)),
            interiors: Vec::new(),
            params,
            flattened: FlattenCache::new(),
        }
    }

    #[must_use]
    pub fn exterior_ring(&self) -> &Curve {
        &self.exterior
    }

    #[must_use]
    pub fn num_interior_rings(&self) -> usize {
        self.interiors.len()
    }

    /// Returns the hole at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if there is no such hole.
    pub fn interior_ring(&self, index: usize) -> Result<&Curve, GeometryError> {
        self.interiors.get(index).ok_or(GeometryError::IndexOutOfRange {
            index,
            len: self.interiors.len(),
        })
    }

    #[must_use]
    pub fn interior_rings(&self) -> &[Curve] {
        &self.interiors
    }

    /// Exterior ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Curve> {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        merge_ordinates(self.rings().map(Curve::ordinates))
    }

    /// Total length of all rings, measured on the arcs.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.rings().map(Curve::length).sum()
    }

    /// Area of the flattened polygon.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.flatten().to_geo().unsigned_area()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        self.exterior.envelope()
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.interiors.len() == other.interiors.len()
            && self
                .rings()
                .zip(other.rings())
                .all(|(a, b)| a.equals_exact(b, tolerance))
    }

    /// Applies `rewrite` to the control points of every ring.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the rewritten rings; the polygon is
    /// left unchanged in that case.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        let mut exterior = self.exterior.clone();
        exterior.rewrite_coordinates(&mut rewrite)?;
        let mut interiors = self.interiors.clone();
        for hole in &mut interiors {
            hole.rewrite_coordinates(&mut rewrite)?;
        }
        validate_rings(&exterior, &interiors)?;
        self.exterior = exterior;
        self.interiors = interiors;
        self.flattened.invalidate();
        Ok(())
    }
}

impl Linearize for CurvePolygon {
    type Output = Polygon;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        self.params.arc_segment_length
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<Polygon> {
        self.flattened.get_or_compute(step, self.params.arc_segment_length, || {
            let exterior = self.exterior.flatten_with(step).as_ref().clone();
            let interiors = self
                .interiors
                .iter()
                .map(|hole| hole.flatten_with(step).as_ref().clone())
                .collect();
            Polygon::from_rings(exterior, interiors)
        })
    }
}

impl PartialEq for CurvePolygon {
    fn eq(&self, other: &Self) -> bool {
        self.exterior == other.exterior && self.interiors == other.interiors
    }
}

fn validate_rings(exterior: &Curve, interiors: &[Curve]) -> Result<(), GeometryError> {
    if exterior.is_empty() {
        if interiors.iter().any(|hole| !hole.is_empty()) {
            return Err(GeometryError::HolesWithoutShell);
        }
        return Ok(());
    }
    if !exterior.is_ring() {
        return Err(GeometryError::NotARing("exterior ring"));
    }
    let shell = exterior.envelope();
    for (index, hole) in interiors.iter().enumerate() {
        if hole.is_empty() {
            continue;
        }
        if !hole.is_ring() {
            return Err(GeometryError::NotARing("interior ring"));
        }
        if !shell.contains(&hole.envelope()) {
            return Err(GeometryError::HoleOutsideShell(index));
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
    use crate::geometry::curve::{CircularString, LineString, Segment};

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&p| Coordinate::from(p)).collect()
    }

    fn circle(cx: f64, cy: f64, r: f64) -> Curve {
        Curve::CircularString(
            CircularString::new(
                coords(&[(cx - r, cy), (cx + r, cy), (cx - r, cy)]),
                CurveParams::default(),
            )
            .unwrap(),
        )
    }

    fn linear(points: &[(f64, f64)]) -> Curve {
        Curve::LineString(LineString(coords(points)))
    }

    #[test]
    fn disc_with_square_hole() {
        let hole = linear(&[(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)]);
        let poly = CurvePolygon::new(circle(0.0, 0.0, 5.0), vec![hole], CurveParams::default()).unwrap();
        assert_eq!(poly.num_interior_rings(), 1);
        assert!(poly.interior_ring(1).is_err());
        let expected = PI * 25.0 - 4.0;
        assert!((poly.area() - expected).abs() / expected < 0.02);
        assert_relative_eq!(poly.perimeter(), 10.0 * PI + 8.0, epsilon = 1e-9);
        assert_relative_eq!(poly.envelope().max_y(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn open_ring_is_rejected() {
        let open = linear(&[(0.0, 5.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]);
        assert_eq!(
            CurvePolygon::new(open, vec![], CurveParams::default()).unwrap_err(),
            GeometryError::NotARing("exterior ring")
        );
    }

    #[test]
    fn hole_outside_shell_is_rejected() {
        let err = CurvePolygon::new(
            circle(0.0, 0.0, 1.0),
            vec![circle(10.0, 0.0, 1.0)],
            CurveParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::HoleOutsideShell(0));
    }

    #[test]
    fn holes_need_a_shell() {
        let empty = Curve::CompoundCurve(CompoundCurve::empty(CurveParams::default()));
        let err = CurvePolygon::new(empty, vec![circle(0.0, 0.0, 1.0)], CurveParams::default()).unwrap_err();
        assert_eq!(err, GeometryError::HolesWithoutShell);
        assert!(CurvePolygon::empty(CurveParams::default()).is_empty());
        assert!(CurvePolygon::empty(CurveParams::default()).flatten().is_empty());
    }

    #[test]
    fn compound_ring_flattens_closed() {
        let ring = CompoundCurve::new(
            vec![
                Segment::Arc(
                    CircularString::new(coords(&[(0.0, 0.0), (2.0, 2.0), (4.0, 0.0)]), CurveParams::default())
                        .unwrap(),
                ),
                Segment::Line(LineString(coords(&[(4.0, 0.0), (0.0, 0.0)]))),
            ],
            CurveParams::default(),
        )
        .unwrap();
        let poly = CurvePolygon::new(Curve::CompoundCurve(ring), vec![], CurveParams::default()).unwrap();
        let flat = poly.flatten();
        assert!(flat.exterior().is_closed());
        assert!((flat.area() - 2.0 * PI).abs() / (2.0 * PI) < 0.02);
    }

    #[test]
    fn rewrite_keeps_polygon_valid() {
        let mut poly = CurvePolygon::new(circle(0.0, 0.0, 2.0), vec![circle(0.0, 0.0, 1.0)], CurveParams::default())
            .unwrap();
        let before = poly.flatten();
        poly.rewrite_coordinates(|c| c.x += 3.0).unwrap();
        assert!(!Arc::ptr_eq(&before, &poly.flatten()));
        assert_relative_eq!(poly.envelope().min_x(), 1.0, epsilon = 1e-9);

        // Moving only the hole outside the shell is rejected.
        let mut visited = 0;
        let result = poly.rewrite_coordinates(|c| {
            if visited >= 3 {
                c.x += 100.0;
            }
            visited += 1;
        });
        assert_eq!(result.unwrap_err(), GeometryError::HoleOutsideShell(0));
        assert_relative_eq!(poly.envelope().min_x(), 1.0, epsilon = 1e-9);
    }
}
