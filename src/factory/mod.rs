//! Validated construction of linear and curved geometries.
//!
//! Every geometry built here receives a copy of the factory's
//! [`CurveParams`], so flattening defaults travel with the object instead of
//! living in process-wide state.

mod build;

use tracing::debug;

use crate::config::CurveParams;
use crate::error::GeometryError;
use crate::geometry::surface::check_linear_ring;
use crate::geometry::{
    CircularString, CompoundCurve, Curve, CurvePolygon, Geometry, GeometryCollection, LineString, MultiCurve,
    MultiLineString, MultiPoint, MultiPolygon, MultiSurface, Polygon, Segment,
};
use crate::math::Coordinate;

/// Builds geometries that satisfy their structural invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurveFactory {
    params: CurveParams,
}

impl CurveFactory {
    #[must_use]
    pub fn new(params: CurveParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Snaps a coordinate to the factory's precision model.
    #[must_use]
    pub fn make_precise(&self, c: Coordinate) -> Coordinate {
        let precision = self.params.precision;
        Coordinate {
            x: precision.make_precise(c.x),
            y: precision.make_precise(c.y),
            ..c
        }
    }

    #[must_use]
    pub fn create_point(&self, c: Option<Coordinate>) -> Geometry {
        Geometry::Point(c)
    }

    /// Creates a linear string of zero or at least two points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPointCount`] for a single point.
    pub fn create_line_string(&self, coords: Vec<Coordinate>) -> Result<LineString, GeometryError> {
        if coords.len() == 1 {
            debug!("rejected line string with a single point");
            return Err(GeometryError::InvalidPointCount {
                count: 1,
                expected: "0 or at least 2",
            });
        }
        Ok(LineString(coords))
    }

    /// Creates a closed linear ring.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRing`] if the ring is not closed or has
    /// fewer than four points.
    pub fn create_linear_ring(&self, coords: Vec<Coordinate>) -> Result<LineString, GeometryError> {
        let ring = LineString(coords);
        check_linear_ring(&ring).inspect_err(|e| debug!(error = %e, "rejected linear ring"))?;
        Ok(ring)
    }

    /// Creates a linear polygon.
    ///
    /// # Errors
    ///
    /// See [`Polygon::new`].
    pub fn create_polygon(&self, shell: LineString, holes: Vec<LineString>) -> Result<Polygon, GeometryError> {
        Polygon::new(shell, holes).inspect_err(|e| debug!(error = %e, "rejected polygon"))
    }

    /// Creates a circular string.
    ///
    /// # Errors
    ///
    /// See [`CircularString::new`].
    pub fn create_circular_string(&self, coords: Vec<Coordinate>) -> Result<CircularString, GeometryError> {
        CircularString::new(coords, self.params).inspect_err(|e| debug!(error = %e, "rejected circular string"))
    }

    /// Creates a compound curve from typed segments.
    ///
    /// # Errors
    ///
    /// See [`CompoundCurve::new`].
    pub fn create_compound_curve(&self, segments: Vec<Segment>) -> Result<CompoundCurve, GeometryError> {
        CompoundCurve::new(segments, self.params).inspect_err(|e| debug!(error = %e, "rejected compound curve"))
    }

    /// Creates a compound curve from arbitrary geometries.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidMember`] for a member that is neither a
    /// linear string nor a circular string, otherwise see [`CompoundCurve::new`].
    pub fn compound_curve_from_geometries(&self, members: Vec<Geometry>) -> Result<CompoundCurve, GeometryError> {
        let segments = members
            .into_iter()
            .map(|member| match member {
                Geometry::LineString(line) => Ok(Segment::Line(line)),
                Geometry::CircularString(arc) => Ok(Segment::Arc(arc)),
                other => Err(invalid_member("CompoundCurve", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.create_compound_curve(segments)
    }

    /// Creates a curve polygon.
    ///
    /// # Errors
    ///
    /// See [`CurvePolygon::new`].
    pub fn create_curve_polygon(&self, exterior: Curve, holes: Vec<Curve>) -> Result<CurvePolygon, GeometryError> {
        CurvePolygon::new(exterior, holes, self.params).inspect_err(|e| debug!(error = %e, "rejected curve polygon"))
    }

    #[must_use]
    pub fn create_multi_point(&self, points: Vec<Coordinate>) -> MultiPoint {
        MultiPoint(points)
    }

    #[must_use]
    pub fn create_multi_line_string(&self, lines: Vec<LineString>) -> MultiLineString {
        MultiLineString(lines)
    }

    #[must_use]
    pub fn create_multi_polygon(&self, polygons: Vec<Polygon>) -> MultiPolygon {
        MultiPolygon(polygons)
    }

    /// Creates a multi-curve.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidMember`] for a member that is not a curve.
    pub fn create_multi_curve(&self, members: Vec<Geometry>) -> Result<MultiCurve, GeometryError> {
        let curves = members
            .into_iter()
            .map(|member| member.into_curve().map_err(|other| invalid_member("MultiCurve", &other)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiCurve::new(curves, self.params))
    }

    /// Creates a multi-surface.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidMember`] for a member that is not a surface.
    pub fn create_multi_surface(&self, members: Vec<Geometry>) -> Result<MultiSurface, GeometryError> {
        let surfaces = members
            .into_iter()
            .map(|member| member.into_surface().map_err(|other| invalid_member("MultiSurface", &other)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiSurface::new(surfaces, self.params))
    }

    #[must_use]
    pub fn create_geometry_collection(&self, members: Vec<Geometry>) -> GeometryCollection {
        GeometryCollection(members)
    }
}

fn invalid_member(collection: &'static str, member: &Geometry) -> GeometryError {
    let error = GeometryError::InvalidMember {
        collection,
        member: member.type_name(),
    };
    debug!(error = %error, "rejected collection member");
    error
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::PrecisionModel;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&p| Coordinate::from(p)).collect()
    }

    #[test]
    fn geometries_carry_factory_params() {
        let params = CurveParams::default().with_arc_segment_length(0.5).unwrap();
        let factory = CurveFactory::new(params);
        let cs = factory
            .create_circular_string(coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))
            .unwrap();
        assert_eq!(cs.params(), &params);
    }

    #[test]
    fn linear_validation() {
        let factory = CurveFactory::default();
        assert!(factory.create_line_string(coords(&[(0.0, 0.0)])).is_err());
        assert!(factory.create_line_string(Vec::new()).unwrap().is_empty());
        assert!(factory
            .create_linear_ring(coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]))
            .is_err());
        assert!(factory
            .create_linear_ring(coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]))
            .is_ok());
    }

    #[test]
    fn compound_members_must_be_strings() {
        let factory = CurveFactory::default();
        let err = factory
            .compound_curve_from_geometries(vec![Geometry::Point(Some(Coordinate::new(0.0, 0.0)))])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidMember {
                collection: "CompoundCurve",
                member: "Point"
            }
        );
    }

    #[test]
    fn multi_curve_rejects_surfaces() {
        let factory = CurveFactory::default();
        let polygon = factory
            .create_polygon(
                LineString(coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)])),
                vec![],
            )
            .unwrap();
        let err = factory.create_multi_curve(vec![Geometry::Polygon(polygon.clone())]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidMember { member: "Polygon", .. }));
        assert!(factory.create_multi_surface(vec![Geometry::Polygon(polygon)]).is_ok());
    }

    #[test]
    fn make_precise_keeps_extra_ordinates() {
        let params = CurveParams::default().with_precision(PrecisionModel::fixed(10.0).unwrap());
        let factory = CurveFactory::new(params);
        let c = factory.make_precise(Coordinate::xyz(1.234, 5.678, 9.999));
        assert!((c.x - 1.2).abs() < 1e-12);
        assert!((c.y - 5.7).abs() < 1e-12);
        assert_eq!(c.z, Some(9.999));
    }
}
