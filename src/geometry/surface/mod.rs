mod curve_polygon;
mod polygon;

pub use curve_polygon::CurvePolygon;
pub use polygon::Polygon;
pub(crate) use polygon::check_linear_ring;

use std::sync::Arc;

use crate::config::ArcSegmentLength;
use crate::error::GeometryError;
use crate::math::{Coordinate, Envelope, Ordinates};

use super::curve::Linearize;

/// Any two-dimensional geometry: a multi-surface member.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Polygon(Polygon),
    CurvePolygon(CurvePolygon),
}

impl Surface {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::CurvePolygon(_) => "CurvePolygon",
        }
    }

    #[must_use]
    pub fn is_curved(&self) -> bool {
        matches!(self, Self::CurvePolygon(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Polygon(s) => s.is_empty(),
            Self::CurvePolygon(s) => s.is_empty(),
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Polygon(s) => s.area(),
            Self::CurvePolygon(s) => s.area(),
        }
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        match self {
            Self::Polygon(s) => s.perimeter(),
            Self::CurvePolygon(s) => s.perimeter(),
        }
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        match self {
            Self::Polygon(s) => s.envelope(),
            Self::CurvePolygon(s) => s.envelope(),
        }
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        match self {
            Self::Polygon(s) => s.ordinates(),
            Self::CurvePolygon(s) => s.ordinates(),
        }
    }

    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::Polygon(a), Self::Polygon(b)) => a.equals_exact(b, tolerance),
            (Self::CurvePolygon(a), Self::CurvePolygon(b)) => a.equals_exact(b, tolerance),
            _ => false,
        }
    }

    /// Applies `rewrite` to every ring vertex.
    ///
    /// # Errors
    ///
    /// Returns the ring validation error; the surface is then left unchanged.
    pub fn rewrite_coordinates(&mut self, rewrite: impl FnMut(&mut Coordinate)) -> Result<(), GeometryError> {
        match self {
            Self::Polygon(s) => s.rewrite_coordinates(rewrite),
            Self::CurvePolygon(s) => s.rewrite_coordinates(rewrite),
        }
    }
}

impl Linearize for Surface {
    type Output = Polygon;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        match self {
            Self::Polygon(s) => s.arc_segment_length(),
            Self::CurvePolygon(s) => s.arc_segment_length(),
        }
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<Polygon> {
        match self {
            Self::Polygon(s) => s.flatten_with(step),
            Self::CurvePolygon(s) => s.flatten_with(step),
        }
    }
}

impl From<Polygon> for Surface {
    fn from(s: Polygon) -> Self {
        Self::Polygon(s)
    }
}

impl From<CurvePolygon> for Surface {
    fn from(s: CurvePolygon) -> Self {
        Self::CurvePolygon(s)
    }
}
