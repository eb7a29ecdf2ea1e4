pub mod cache;
mod collection;
pub mod curve;
mod multi;
pub mod surface;

pub use cache::FlattenCache;
pub use collection::{GeometryCollection, MultiLineString, MultiPoint, MultiPolygon};
pub use curve::{CircularArc, CircularString, CompoundCurve, Curve, LineString, Linearize, Segment};
pub use multi::{MultiCurve, MultiSurface};
pub use surface::{CurvePolygon, Polygon, Surface};

use std::sync::Arc;

use geo::{Area, Centroid, ConvexHull, Intersects};

use crate::config::ArcSegmentLength;
use crate::error::GeometryError;
use crate::math::{Coordinate, Envelope, Ordinates};

use collection::merge_ordinates;

/// Any geometry of the model, linear or curved.
///
/// Metric and topological queries that need a polygonal representation
/// (area, centroid, convex hull, intersection) run on the flattened geometry
/// through `geo`. Length and envelope are computed on the arcs themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A point; `None` is the empty point.
    Point(Option<Coordinate>),
    LineString(LineString),
    CircularString(CircularString),
    CompoundCurve(CompoundCurve),
    Polygon(Polygon),
    CurvePolygon(CurvePolygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiCurve(MultiCurve),
    MultiPolygon(MultiPolygon),
    MultiSurface(MultiSurface),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    /// The OGC type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::CircularString(_) => "CircularString",
            Self::CompoundCurve(_) => "CompoundCurve",
            Self::Polygon(_) => "Polygon",
            Self::CurvePolygon(_) => "CurvePolygon",
            Self::MultiPoint(_) => "MultiPoint",
            Self::MultiLineString(_) => "MultiLineString",
            Self::MultiCurve(_) => "MultiCurve",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::MultiSurface(_) => "MultiSurface",
            Self::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Whether this is a multi-geometry or a geometry collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::MultiPoint(_)
                | Self::MultiLineString(_)
                | Self::MultiCurve(_)
                | Self::MultiPolygon(_)
                | Self::MultiSurface(_)
                | Self::GeometryCollection(_)
        )
    }

    /// Whether the geometry contains circular arcs.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        match self {
            Self::CircularString(_) | Self::CompoundCurve(_) | Self::CurvePolygon(_) => true,
            Self::MultiCurve(m) => m.members().iter().any(Curve::is_curved),
            Self::MultiSurface(m) => m.members().iter().any(Surface::is_curved),
            Self::GeometryCollection(gc) => gc.0.iter().any(Self::is_curved),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(p) => p.is_none(),
            Self::LineString(g) => g.is_empty(),
            Self::CircularString(g) => g.is_empty(),
            Self::CompoundCurve(g) => g.is_empty(),
            Self::Polygon(g) => g.is_empty(),
            Self::CurvePolygon(g) => g.is_empty(),
            Self::MultiPoint(g) => g.is_empty(),
            Self::MultiLineString(g) => g.0.iter().all(LineString::is_empty),
            Self::MultiCurve(g) => g.is_empty(),
            Self::MultiPolygon(g) => g.0.iter().all(Polygon::is_empty),
            Self::MultiSurface(g) => g.is_empty(),
            Self::GeometryCollection(g) => g.is_empty(),
        }
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces.
    ///
    /// A collection has the highest dimension of its members, `None` when it
    /// has none.
    #[must_use]
    pub fn dimension(&self) -> Option<u8> {
        match self {
            Self::Point(_) | Self::MultiPoint(_) => Some(0),
            Self::LineString(_)
            | Self::CircularString(_)
            | Self::CompoundCurve(_)
            | Self::MultiLineString(_)
            | Self::MultiCurve(_) => Some(1),
            Self::Polygon(_) | Self::CurvePolygon(_) | Self::MultiPolygon(_) | Self::MultiSurface(_) => Some(2),
            Self::GeometryCollection(gc) => gc.0.iter().filter_map(Self::dimension).max(),
        }
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        match self {
            Self::Point(p) => p.map_or(Ordinates::XY, |c| c.ordinates()),
            Self::LineString(g) => g.ordinates(),
            Self::CircularString(g) => g.ordinates(),
            Self::CompoundCurve(g) => g.ordinates(),
            Self::Polygon(g) => g.ordinates(),
            Self::CurvePolygon(g) => g.ordinates(),
            Self::MultiPoint(g) => merge_ordinates(g.0.iter().map(Coordinate::ordinates)),
            Self::MultiLineString(g) => merge_ordinates(g.0.iter().map(LineString::ordinates)),
            Self::MultiCurve(g) => g.ordinates(),
            Self::MultiPolygon(g) => merge_ordinates(g.0.iter().map(Polygon::ordinates)),
            Self::MultiSurface(g) => g.ordinates(),
            Self::GeometryCollection(g) => g.ordinates(),
        }
    }

    /// Bounding box; arcs contribute their exact extent.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        match self {
            Self::Point(p) => p.as_ref().map_or_else(Envelope::null, Envelope::from_coord),
            Self::LineString(g) => g.envelope(),
            Self::CircularString(g) => g.envelope(),
            Self::CompoundCurve(g) => g.envelope(),
            Self::Polygon(g) => g.envelope(),
            Self::CurvePolygon(g) => g.envelope(),
            Self::MultiPoint(g) => g.envelope(),
            Self::MultiLineString(g) => g.envelope(),
            Self::MultiCurve(g) => g.envelope(),
            Self::MultiPolygon(g) => g.envelope(),
            Self::MultiSurface(g) => g.envelope(),
            Self::GeometryCollection(g) => g.envelope(),
        }
    }

    /// Length of curves and perimeter of surfaces, measured on the arcs.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Point(_) | Self::MultiPoint(_) => 0.0,
            Self::LineString(g) => g.length(),
            Self::CircularString(g) => g.length(),
            Self::CompoundCurve(g) => g.length(),
            Self::Polygon(g) => g.perimeter(),
            Self::CurvePolygon(g) => g.perimeter(),
            Self::MultiLineString(g) => g.length(),
            Self::MultiCurve(g) => g.length(),
            Self::MultiPolygon(g) => g.0.iter().map(Polygon::perimeter).sum(),
            Self::MultiSurface(g) => g.perimeter(),
            Self::GeometryCollection(g) => g.0.iter().map(Self::length).sum(),
        }
    }

    /// Area of the flattened geometry.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// Centroid of the flattened geometry, `None` when empty.
    #[must_use]
    pub fn centroid(&self) -> Option<Coordinate> {
        self.to_geo().centroid().map(|p| Coordinate::from(p.0))
    }

    /// Convex hull of the flattened geometry.
    #[must_use]
    pub fn convex_hull(&self) -> Polygon {
        let hull = self.to_geo().convex_hull();
        Polygon::from_rings(
            LineString::from(hull.exterior()),
            hull.interiors().iter().map(LineString::from).collect(),
        )
    }

    /// Whether the flattened geometries share at least one point.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.to_geo().intersects(&other.to_geo())
    }

    /// Control data equality in X and Y within `tolerance`; types must match.
    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::Point(a), Self::Point(b)) => match (a, b) {
                (Some(a), Some(b)) => a.equals_2d_within(b, tolerance),
                (None, None) => true,
                _ => false,
            },
            (Self::LineString(a), Self::LineString(b)) => a.equals_exact(b, tolerance),
            (Self::CircularString(a), Self::CircularString(b)) => a.equals_exact(b, tolerance),
            (Self::CompoundCurve(a), Self::CompoundCurve(b)) => a.equals_exact(b, tolerance),
            (Self::Polygon(a), Self::Polygon(b)) => a.equals_exact(b, tolerance),
            (Self::CurvePolygon(a), Self::CurvePolygon(b)) => a.equals_exact(b, tolerance),
            (Self::MultiPoint(a), Self::MultiPoint(b)) => {
                a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(p, q)| p.equals_2d_within(q, tolerance))
            }
            (Self::MultiLineString(a), Self::MultiLineString(b)) => {
                a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(p, q)| p.equals_exact(q, tolerance))
            }
            (Self::MultiCurve(a), Self::MultiCurve(b)) => a.equals_exact(b, tolerance),
            (Self::MultiPolygon(a), Self::MultiPolygon(b)) => {
                a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(p, q)| p.equals_exact(q, tolerance))
            }
            (Self::MultiSurface(a), Self::MultiSurface(b)) => a.equals_exact(b, tolerance),
            (Self::GeometryCollection(a), Self::GeometryCollection(b)) => {
                a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(p, q)| p.equals_exact(q, tolerance))
            }
            _ => false,
        }
    }

    /// Applies `rewrite` to every control point and drops cached flattenings.
    ///
    /// # Errors
    ///
    /// Returns the validation error when the rewritten control points break a
    /// structural invariant; the geometry is then left unchanged.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        match self {
            Self::Point(p) => {
                if let Some(c) = p {
                    rewrite(c);
                }
                Ok(())
            }
            Self::LineString(g) => {
                g.0.iter_mut().for_each(rewrite);
                Ok(())
            }
            Self::CircularString(g) => {
                g.rewrite_coordinates(rewrite);
                Ok(())
            }
            Self::CompoundCurve(g) => g.rewrite_coordinates(rewrite),
            Self::Polygon(g) => g.rewrite_coordinates(rewrite),
            Self::CurvePolygon(g) => g.rewrite_coordinates(rewrite),
            Self::MultiPoint(g) => {
                g.0.iter_mut().for_each(rewrite);
                Ok(())
            }
            Self::MultiLineString(g) => {
                for line in &mut g.0 {
                    line.0.iter_mut().for_each(&mut rewrite);
                }
                Ok(())
            }
            Self::MultiCurve(g) => g.rewrite_coordinates(rewrite),
            Self::MultiPolygon(g) => {
                let mut polygons = g.0.clone();
                for polygon in &mut polygons {
                    polygon.rewrite_coordinates(&mut rewrite)?;
                }
                g.0 = polygons;
                Ok(())
            }
            Self::MultiSurface(g) => g.rewrite_coordinates(rewrite),
            Self::GeometryCollection(g) => g.rewrite_coordinates(rewrite),
        }
    }

    /// Converts the flattened geometry to `geo`.
    ///
    /// The empty point becomes an empty multi-point.
    #[must_use]
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Self::Point(Some(c)) => geo::Geometry::Point(geo::Point::from(geo::Coord::from(*c))),
            Self::Point(None) => geo::Geometry::MultiPoint(geo::MultiPoint::new(Vec::new())),
            Self::LineString(g) => geo::Geometry::LineString(g.to_geo()),
            Self::CircularString(g) => geo::Geometry::LineString(g.flatten().to_geo()),
            Self::CompoundCurve(g) => geo::Geometry::LineString(g.flatten().to_geo()),
            Self::Polygon(g) => geo::Geometry::Polygon(g.to_geo()),
            Self::CurvePolygon(g) => geo::Geometry::Polygon(g.flatten().to_geo()),
            Self::MultiPoint(g) => geo::Geometry::MultiPoint(g.to_geo()),
            Self::MultiLineString(g) => geo::Geometry::MultiLineString(g.to_geo()),
            Self::MultiCurve(g) => geo::Geometry::MultiLineString(g.flatten().to_geo()),
            Self::MultiPolygon(g) => geo::Geometry::MultiPolygon(g.to_geo()),
            Self::MultiSurface(g) => geo::Geometry::MultiPolygon(g.flatten().to_geo()),
            Self::GeometryCollection(g) => {
                geo::Geometry::GeometryCollection(geo::GeometryCollection(g.0.iter().map(Self::to_geo).collect()))
            }
        }
    }

    /// Unwraps a one-dimensional geometry.
    ///
    /// # Errors
    ///
    /// Returns the geometry itself when it is not a curve.
    pub fn into_curve(self) -> Result<Curve, Self> {
        match self {
            Self::LineString(g) => Ok(Curve::LineString(g)),
            Self::CircularString(g) => Ok(Curve::CircularString(g)),
            Self::CompoundCurve(g) => Ok(Curve::CompoundCurve(g)),
            other => Err(other),
        }
    }

    /// Unwraps a two-dimensional geometry.
    ///
    /// # Errors
    ///
    /// Returns the geometry itself when it is not a surface.
    pub fn into_surface(self) -> Result<Surface, Self> {
        match self {
            Self::Polygon(g) => Ok(Surface::Polygon(g)),
            Self::CurvePolygon(g) => Ok(Surface::CurvePolygon(g)),
            other => Err(other),
        }
    }
}

impl Linearize for Geometry {
    type Output = Geometry;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        match self {
            Self::CircularString(g) => g.arc_segment_length(),
            Self::CompoundCurve(g) => g.arc_segment_length(),
            Self::CurvePolygon(g) => g.arc_segment_length(),
            Self::MultiCurve(g) => g.arc_segment_length(),
            Self::MultiSurface(g) => g.arc_segment_length(),
            _ => ArcSegmentLength::DEFAULT,
        }
    }

    /// Replaces every curved part with its flattening; linear parts are copied.
    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<Geometry> {
        let linear = match self {
            Self::CircularString(g) => Self::LineString(g.flatten_with(step).as_ref().clone()),
            Self::CompoundCurve(g) => Self::LineString(g.flatten_with(step).as_ref().clone()),
            Self::CurvePolygon(g) => Self::Polygon(g.flatten_with(step).as_ref().clone()),
            Self::MultiCurve(g) => Self::MultiLineString(g.flatten_with(step).as_ref().clone()),
            Self::MultiSurface(g) => Self::MultiPolygon(g.flatten_with(step).as_ref().clone()),
            Self::GeometryCollection(g) => Self::GeometryCollection(GeometryCollection(
                g.0.iter().map(|m| m.flatten_with(step).as_ref().clone()).collect(),
            )),
            linear => linear.clone(),
        };
        Arc::new(linear)
    }
}

impl From<Curve> for Geometry {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::LineString(g) => Self::LineString(g),
            Curve::CircularString(g) => Self::CircularString(g),
            Curve::CompoundCurve(g) => Self::CompoundCurve(g),
        }
    }
}

impl From<Surface> for Geometry {
    fn from(surface: Surface) -> Self {
        match surface {
            Surface::Polygon(g) => Self::Polygon(g),
            Surface::CurvePolygon(g) => Self::CurvePolygon(g),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Geometry {
                fn from(g: $variant) -> Self {
                    Self::$variant(g)
                }
            }
        )*
    };
}

impl_from_variant!(
    LineString,
    CircularString,
    CompoundCurve,
    Polygon,
    CurvePolygon,
    MultiPoint,
    MultiLineString,
    MultiCurve,
    MultiPolygon,
    MultiSurface,
    GeometryCollection,
);

impl From<Coordinate> for Geometry {
    fn from(c: Coordinate) -> Self {
        Self::Point(Some(c))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::config::CurveParams;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().map(|&p| Coordinate::from(p)).collect()
    }

    fn disc(cx: f64, r: f64) -> Geometry {
        let ring = CircularString::new(coords(&[(cx - r, 0.0), (cx + r, 0.0), (cx - r, 0.0)]), CurveParams::default())
            .unwrap();
        Geometry::CurvePolygon(CurvePolygon::new(Curve::CircularString(ring), vec![], CurveParams::default()).unwrap())
    }

    #[test]
    fn curve_polygon_delegates_to_geo() {
        let g = disc(0.0, 2.0);
        assert!((g.area() - 4.0 * PI).abs() / (4.0 * PI) < 0.02);
        let centroid = g.centroid().unwrap();
        assert!(centroid.x.abs() < 1e-9 && centroid.y.abs() < 1e-9);
        assert!(g.intersects(&disc(3.0, 2.0)));
        assert!(!g.intersects(&disc(10.0, 1.0)));
        let hull = g.convex_hull();
        assert!(hull.area() <= g.area() + 1e-9);
        assert_eq!(g.dimension(), Some(2));
    }

    #[test]
    fn length_is_measured_on_arcs() {
        let g = Geometry::CircularString(
            CircularString::new(coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]), CurveParams::default()).unwrap(),
        );
        assert_relative_eq!(g.length(), PI, epsilon = 1e-12);
        assert!(g.flatten().length() < PI);
        assert!(g.is_curved());
    }

    #[test]
    fn flatten_of_linear_geometry_is_idempotent() {
        let g = disc(0.0, 1.0);
        let once = g.flatten();
        let twice = once.flatten();
        assert_eq!(*once, *twice);
        assert!(!once.is_curved());
    }

    #[test]
    fn empty_point() {
        let p = Geometry::Point(None);
        assert!(p.is_empty());
        assert!(p.envelope().is_null());
        assert!(p.centroid().is_none());
    }

    #[test]
    fn collection_dimension_and_rewrite() {
        let mut gc = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(Some(Coordinate::new(1.0, 1.0))),
            disc(0.0, 1.0),
        ]));
        assert_eq!(gc.dimension(), Some(2));
        assert!(gc.is_collection());
        gc.rewrite_coordinates(|c| c.x += 1.0).unwrap();
        assert_relative_eq!(gc.envelope().max_x(), 2.0, epsilon = 1e-9);
        assert_eq!(Geometry::GeometryCollection(GeometryCollection::default()).dimension(), None);
    }

    #[test]
    fn nested_collections_are_rewritten() {
        let inner = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(Some(Coordinate::new(0.0, 3.0))),
            disc(0.0, 1.0),
        ]));
        let mut outer = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::GeometryCollection(GeometryCollection(vec![inner])),
            Geometry::Point(Some(Coordinate::new(5.0, 0.0))),
        ]));
        let mut visited = 0;
        outer
            .rewrite_coordinates(|c| {
                visited += 1;
                c.y -= 1.0;
            })
            .unwrap();
        // Two points plus the three ring control points.
        assert_eq!(visited, 5);
        assert_relative_eq!(outer.envelope().max_y(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn into_curve_rejects_surfaces() {
        let g = disc(0.0, 1.0);
        assert!(g.clone().into_curve().is_err());
        assert!(g.into_surface().is_ok());
    }
}
