use tracing::debug;

use crate::error::GeometryError;
use crate::geometry::{Geometry, GeometryCollection, MultiLineString, MultiPoint, MultiPolygon};

use super::CurveFactory;

/// Coarse shape classes used to pick the collection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Point,
    LineString,
    Curve,
    Polygon,
    Surface,
    Collection,
}

impl Shape {
    fn of(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(_) => Self::Point,
            Geometry::LineString(_) => Self::LineString,
            Geometry::CircularString(_) | Geometry::CompoundCurve(_) => Self::Curve,
            Geometry::Polygon(_) => Self::Polygon,
            Geometry::CurvePolygon(_) => Self::Surface,
            _ => Self::Collection,
        }
    }

    fn is_curve_like(self) -> bool {
        matches!(self, Self::LineString | Self::Curve)
    }

    fn is_surface_like(self) -> bool {
        matches!(self, Self::Polygon | Self::Surface)
    }
}

impl CurveFactory {
    /// Builds the most specific geometry holding all of `geometries`.
    ///
    /// - no geometries: an empty geometry collection
    /// - any member is itself a collection, or members mix dimensions: a
    ///   geometry collection
    /// - a single geometry: that geometry
    /// - curves (linear or curved) mixed: a multi-curve; surfaces mixed: a
    ///   multi-surface
    /// - one shape only: the matching multi-geometry
    ///
    /// # Errors
    ///
    /// Never fails for well-formed members; the error type is shared with the
    /// typed constructors it dispatches to.
    pub fn build_geometry(&self, geometries: Vec<Geometry>) -> Result<Geometry, GeometryError> {
        let Some(first) = geometries.first().map(Shape::of) else {
            debug!("build_geometry: empty input");
            return Ok(Geometry::GeometryCollection(GeometryCollection::default()));
        };

        let shapes: Vec<Shape> = geometries.iter().map(Shape::of).collect();
        let has_collection = shapes.contains(&Shape::Collection);
        let mut heterogeneous = shapes.iter().any(|s| *s != first);
        let mut target = first;
        if heterogeneous && !has_collection {
            if shapes.iter().all(|s| s.is_curve_like()) {
                heterogeneous = false;
                target = Shape::Curve;
            } else if shapes.iter().all(|s| s.is_surface_like()) {
                heterogeneous = false;
                target = Shape::Surface;
            }
        }

        if heterogeneous || has_collection {
            debug!(members = geometries.len(), heterogeneous, has_collection, "build_geometry: collection");
            return Ok(Geometry::GeometryCollection(GeometryCollection(geometries)));
        }

        let mut geometries = geometries;
        if geometries.len() == 1 {
            if let Some(single) = geometries.pop() {
                return Ok(single);
            }
        }

        debug!(members = geometries.len(), shape = ?target, "build_geometry: multi-geometry");
        let built = match target {
            // Empty points are dropped.
            Shape::Point => Geometry::MultiPoint(MultiPoint(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Point(c) => c,
                        _ => None,
                    })
                    .collect(),
            )),
            Shape::LineString => Geometry::MultiLineString(MultiLineString(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::LineString(line) => Some(line),
                        _ => None,
                    })
                    .collect(),
            )),
            Shape::Polygon => Geometry::MultiPolygon(MultiPolygon(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Polygon(polygon) => Some(polygon),
                        _ => None,
                    })
                    .collect(),
            )),
            Shape::Curve => Geometry::MultiCurve(self.create_multi_curve(geometries)?),
            Shape::Surface => Geometry::MultiSurface(self.create_multi_surface(geometries)?),
            Shape::Collection => Geometry::GeometryCollection(GeometryCollection(geometries)),
        };
        Ok(built)
    }
}
