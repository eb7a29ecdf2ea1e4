use std::f64::consts::FRAC_PI_2;
use std::num::NonZeroU32;

use crate::error::GeometryError;
use crate::math::PrecisionModel;

/// Default number of flattening steps per quarter circle.
pub const DEFAULT_QUADRANT_SEGMENTS: NonZeroU32 = match NonZeroU32::new(12) {
    Some(n) => n,
    None => unreachable!(),
};

/// Maximum chord length used when flattening arcs.
///
/// Zero means "derive from the quadrant segment count and the arc radius".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ArcSegmentLength(f64);

impl ArcSegmentLength {
    /// Derive the step from [`CurveParams::quadrant_segments`].
    pub const DEFAULT: Self = Self(0.0);

    /// Creates a validated arc segment length.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for negative or non-finite values.
    pub fn new(value: f64) -> Result<Self, GeometryError> {
        if !value.is_finite() || value < 0.0 {
            return Err(GeometryError::InvalidTolerance {
                value,
                reason: "arc segment length must be finite and not negative",
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_default(self) -> bool {
        self.0 == 0.0
    }

    /// Resolves the chord length to use for an arc of the given radius.
    #[must_use]
    pub fn step_for_radius(self, radius: f64, quadrant_segments: NonZeroU32) -> f64 {
        if self.is_default() {
            FRAC_PI_2 * radius / f64::from(quadrant_segments.get())
        } else {
            self.0
        }
    }
}

/// Parameters controlling how curved geometries are linearized.
///
/// A [`crate::factory::CurveFactory`] owns one set and hands a copy to every
/// geometry it builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    /// Default maximum chord length for flattening.
    pub arc_segment_length: ArcSegmentLength,
    /// Steps per quarter circle when `arc_segment_length` is the default.
    pub quadrant_segments: NonZeroU32,
    /// Snapping applied to computed flattening vertices.
    pub precision: PrecisionModel,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            arc_segment_length: ArcSegmentLength::DEFAULT,
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
            precision: PrecisionModel::Floating,
        }
    }
}

impl CurveParams {
    /// Returns a copy with a different default arc segment length.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for negative or non-finite values.
    pub fn with_arc_segment_length(self, value: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            arc_segment_length: ArcSegmentLength::new(value)?,
            ..self
        })
    }

    /// Returns a copy with a different quadrant segment count.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] if `count` is zero.
    pub fn with_quadrant_segments(self, count: u32) -> Result<Self, GeometryError> {
        let quadrant_segments = NonZeroU32::new(count).ok_or(GeometryError::InvalidTolerance {
            value: f64::from(count),
            reason: "quadrant segment count must be positive",
        })?;
        Ok(Self {
            quadrant_segments,
            ..self
        })
    }

    #[must_use]
    pub fn with_precision(self, precision: PrecisionModel) -> Self {
        Self { precision, ..self }
    }
}
