use geo::Area;

use crate::error::GeometryError;
use crate::math::{Coordinate, Envelope, Ordinates};

use super::curve::LineString;
use super::surface::Polygon;
use super::Geometry;

/// A set of points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPoint(pub Vec<Coordinate>);

impl MultiPoint {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::from_coords(&self.0)
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::MultiPoint<f64> {
        self.0.iter().map(|c| geo::Point::from(geo::Coord::from(*c))).collect()
    }
}

/// A set of linear strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiLineString(pub Vec<LineString>);

impl MultiLineString {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.iter().map(LineString::length).sum()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for line in &self.0 {
            env.expand_to_include_envelope(&line.envelope());
        }
        env
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::MultiLineString<f64> {
        geo::MultiLineString::new(self.0.iter().map(LineString::to_geo).collect())
    }
}

/// A set of linear polygons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon(pub Vec<Polygon>);

impl MultiPolygon {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for polygon in &self.0 {
            env.expand_to_include_envelope(&polygon.envelope());
        }
        env
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon::new(self.0.iter().map(Polygon::to_geo).collect())
    }
}

/// A heterogeneous list of geometries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryCollection(pub Vec<Geometry>);

impl GeometryCollection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Geometry::is_empty)
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        for member in &self.0 {
            env.expand_to_include_envelope(&member.envelope());
        }
        env
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        merge_ordinates(self.0.iter().map(Geometry::ordinates))
    }

    /// Applies `rewrite` to every member.
    ///
    /// # Errors
    ///
    /// Returns the first member validation error; the collection is then left
    /// unchanged.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        // Members recurse back into this method; a trait object keeps the
        // instantiation finite.
        let rewrite: &mut dyn FnMut(&mut Coordinate) = &mut rewrite;
        let mut members = self.0.clone();
        for member in &mut members {
            member.rewrite_coordinates(&mut *rewrite)?;
        }
        self.0 = members;
        Ok(())
    }
}

/// Union of ordinate flags.
pub(crate) fn merge_ordinates(iter: impl IntoIterator<Item = Ordinates>) -> Ordinates {
    iter.into_iter().fold(Ordinates::XY, |acc, o| Ordinates {
        z: acc.z || o.z,
        m: acc.m || o.m,
    })
}
