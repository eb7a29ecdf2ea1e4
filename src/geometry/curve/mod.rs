mod arc;
mod circular_string;
mod compound_curve;
mod line;

pub use arc::CircularArc;
pub use circular_string::CircularString;
pub use compound_curve::{CompoundCurve, Segment};
pub use line::LineString;

use std::sync::Arc;

use crate::config::ArcSegmentLength;
use crate::error::{GeometryError, Result};
use crate::math::{Coordinate, Envelope, Ordinates};

/// Conversion of a curved geometry into straight segments.
///
/// `flatten_with` is infallible: the step is already validated. Owners cache
/// the first result they compute and drop it whenever their control points
/// are rewritten.
pub trait Linearize {
    /// The linear geometry produced by flattening.
    type Output;

    /// Default maximum chord length, carried from the constructing factory.
    fn arc_segment_length(&self) -> ArcSegmentLength;

    /// Flattens with chords of at most `step`.
    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<Self::Output>;

    /// Flattens with the default chord length.
    fn flatten(&self) -> Arc<Self::Output> {
        self.flatten_with(self.arc_segment_length())
    }

    /// Flattens with a raw tolerance value; zero selects the default step.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for a negative or non-finite tolerance.
    fn linearize(&self, tolerance: f64) -> Result<Arc<Self::Output>> {
        Ok(self.flatten_with(ArcSegmentLength::new(tolerance)?))
    }
}

impl Linearize for LineString {
    type Output = LineString;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        ArcSegmentLength::DEFAULT
    }

    fn flatten_with(&self, _step: ArcSegmentLength) -> Arc<LineString> {
        Arc::new(self.clone())
    }
}

/// Any one-dimensional geometry: a ring or a multi-curve member.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    LineString(LineString),
    CircularString(CircularString),
    CompoundCurve(CompoundCurve),
}

impl Curve {
    /// The OGC type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LineString(_) => "LineString",
            Self::CircularString(_) => "CircularString",
            Self::CompoundCurve(_) => "CompoundCurve",
        }
    }

    /// Whether the curve contains arcs.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        !matches!(self, Self::LineString(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::LineString(c) => c.is_empty(),
            Self::CircularString(c) => c.is_empty(),
            Self::CompoundCurve(c) => c.is_empty(),
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Coordinate> {
        match self {
            Self::LineString(c) => c.start_point(),
            Self::CircularString(c) => c.start_point(),
            Self::CompoundCurve(c) => c.start_point(),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Coordinate> {
        match self {
            Self::LineString(c) => c.end_point(),
            Self::CircularString(c) => c.end_point(),
            Self::CompoundCurve(c) => c.end_point(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::LineString(c) => c.is_closed(),
            Self::CircularString(c) => c.is_closed(),
            Self::CompoundCurve(c) => c.is_closed(),
        }
    }

    #[must_use]
    pub fn is_ring(&self) -> bool {
        match self {
            Self::LineString(c) => c.is_ring(),
            Self::CircularString(c) => c.is_ring(),
            Self::CompoundCurve(c) => c.is_ring(),
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::LineString(c) => c.length(),
            Self::CircularString(c) => c.length(),
            Self::CompoundCurve(c) => c.length(),
        }
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        match self {
            Self::LineString(c) => c.envelope(),
            Self::CircularString(c) => c.envelope(),
            Self::CompoundCurve(c) => c.envelope(),
        }
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        match self {
            Self::LineString(c) => c.ordinates(),
            Self::CircularString(c) => c.ordinates(),
            Self::CompoundCurve(c) => c.ordinates(),
        }
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::LineString(c) => Self::LineString(c.reversed()),
            Self::CircularString(c) => Self::CircularString(c.reversed()),
            Self::CompoundCurve(c) => Self::CompoundCurve(c.reversed()),
        }
    }

    /// Control data equality in X and Y within `tolerance`; variants must match.
    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::LineString(a), Self::LineString(b)) => a.equals_exact(b, tolerance),
            (Self::CircularString(a), Self::CircularString(b)) => a.equals_exact(b, tolerance),
            (Self::CompoundCurve(a), Self::CompoundCurve(b)) => a.equals_exact(b, tolerance),
            _ => false,
        }
    }

    /// Applies `rewrite` to every control point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotInSequence`] if a compound curve's segments
    /// no longer meet; the curve is then left unchanged.
    pub fn rewrite_coordinates(&mut self, rewrite: impl FnMut(&mut Coordinate)) -> std::result::Result<(), GeometryError> {
        match self {
            Self::LineString(c) => {
                c.0.iter_mut().for_each(rewrite);
                Ok(())
            }
            Self::CircularString(c) => {
                c.rewrite_coordinates(rewrite);
                Ok(())
            }
            Self::CompoundCurve(c) => c.rewrite_coordinates(rewrite),
        }
    }
}

impl Linearize for Curve {
    type Output = LineString;

    fn arc_segment_length(&self) -> ArcSegmentLength {
        match self {
            Self::LineString(c) => c.arc_segment_length(),
            Self::CircularString(c) => c.arc_segment_length(),
            Self::CompoundCurve(c) => c.arc_segment_length(),
        }
    }

    fn flatten_with(&self, step: ArcSegmentLength) -> Arc<LineString> {
        match self {
            Self::LineString(c) => c.flatten_with(step),
            Self::CircularString(c) => c.flatten_with(step),
            Self::CompoundCurve(c) => c.flatten_with(step),
        }
    }
}

impl From<LineString> for Curve {
    fn from(c: LineString) -> Self {
        Self::LineString(c)
    }
}

impl From<CircularString> for Curve {
    fn from(c: CircularString) -> Self {
        Self::CircularString(c)
    }
}

impl From<CompoundCurve> for Curve {
    fn from(c: CompoundCurve) -> Self {
        Self::CompoundCurve(c)
    }
}
