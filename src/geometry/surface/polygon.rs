use std::sync::Arc;

use geo::Area;

use crate::config::ArcSegmentLength;
use crate::error::GeometryError;
use crate::geometry::curve::{LineString, Linearize};
use crate::math::{ordinates_of, Coordinate, Envelope, Ordinates};

/// A linear polygon: one exterior ring and any number of holes.
///
/// Every ring is either empty or closed with at least four points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    exterior: LineString,
    interiors: Vec<LineString>,
}

impl Polygon {
    /// Creates a polygon from linear rings.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRing`] for a ring that is not closed or
    /// has fewer than four points, and [`GeometryError::HolesWithoutShell`] for
    /// non-empty holes in an empty exterior.
    pub fn new(exterior: LineString, interiors: Vec<LineString>) -> Result<Self, GeometryError> {
        check_linear_ring(&exterior)?;
        for hole in &interiors {
            check_linear_ring(hole)?;
        }
        if exterior.is_empty() && interiors.iter().any(|hole| !hole.is_empty()) {
            return Err(GeometryError::HolesWithoutShell);
        }
        Ok(Self { exterior, interiors })
    }

    /// Assembles flattened rings without validation.
    pub(crate) fn from_rings(exterior: LineString, interiors: Vec<LineString>) -> Self {
        Self { exterior, interiors }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exterior(&self) -> &LineString {
        &self.exterior
    }

    #[must_use]
    pub fn interiors(&self) -> &[LineString] {
        &self.interiors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        ordinates_of(self.rings().flat_map(LineString::coords))
    }

    /// Exterior ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &LineString> {
        std::iter::once(&self.exterior).chain(&self.interiors)
    }

    /// Total length of all rings.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.rings().map(LineString::length).sum()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
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

    /// Applies `rewrite` to every ring vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRing`] if a rewritten ring is no longer
    /// closed. The polygon is left unchanged in that case.
    pub fn rewrite_coordinates(&mut self, mut rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        let mut exterior = self.exterior.clone();
        exterior.0.iter_mut().for_each(&mut rewrite);
        let mut interiors = self.interiors.clone();
        for hole in &mut interiors {
            hole.0.iter_mut().for_each(&mut rewrite);
        }
        *self = Self::new(exterior, interiors)?;
        Ok(())
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            self.exterior.to_geo(),
            self.interiors.iter().map(LineString::to_geo).collect(),
        )
    }
}

impl Linearize for Polygon {
    type Output = Polygon;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        ArcSegmentLength::DEFAULT
    }

    fn flatten_with(&self, _step: ArcSegmentLength) -> Arc<Polygon> {
        Arc::new(self.clone())
    }
}

pub(crate) fn check_linear_ring(ring: &LineString) -> Result<(), GeometryError> {
    if ring.is_empty() {
        return Ok(());
    }
    if !ring.is_closed() {
        return Err(GeometryError::InvalidRing(format!(
            "points of a linear ring do not form a closed line ({} points)",
            ring.num_points()
        )));
    }
    if ring.num_points() < 4 {
        return Err(GeometryError::InvalidRing(format!(
            "a linear ring needs at least 4 points, found {}",
            ring.num_points()
        )));
    }
    Ok(())
}
