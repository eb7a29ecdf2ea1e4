use crate::error::GeometryError;

/// Controls how computed ordinates are snapped before they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PrecisionModel {
    /// Full double precision, values are left untouched.
    #[default]
    Floating,
    /// Single precision, values are rounded through `f32`.
    FloatingSingle,
    /// A fixed grid of `1 / scale` units.
    Fixed { scale: f64 },
}

impl PrecisionModel {
    /// Creates a fixed precision model.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] if `scale` is not strictly positive and finite.
    pub fn fixed(scale: f64) -> Result<Self, GeometryError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(GeometryError::InvalidTolerance {
                value: scale,
                reason: "precision scale must be strictly positive",
            });
        }
        Ok(Self::Fixed { scale })
    }

    /// Snaps a single ordinate value to this model.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn make_precise(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        match *self {
            Self::Floating => value,
            Self::FloatingSingle => f64::from(value as f32),
            Self::Fixed { scale } => (value * scale).round() / scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_is_identity() {
        assert!((PrecisionModel::Floating.make_precise(1.234_567_890_123) - 1.234_567_890_123).abs() < f64::EPSILON);
    }

    #[test]
    fn fixed_snaps_to_grid() {
        let pm = PrecisionModel::fixed(100.0).unwrap_or_default();
        assert!((pm.make_precise(1.23456) - 1.23).abs() < 1e-12);
        assert!((pm.make_precise(-1.235_01) + 1.24).abs() < 1e-12);
    }

    #[test]
    fn fixed_rejects_non_positive_scale() {
        assert!(PrecisionModel::fixed(0.0).is_err());
        assert!(PrecisionModel::fixed(f64::NAN).is_err());
    }

    #[test]
    fn single_rounds_through_f32() {
        let v = 0.1_f64;
        let snapped = PrecisionModel::FloatingSingle.make_precise(v);
        assert!((snapped - v).abs() > 0.0);
        assert!((snapped - v).abs() < 1e-8);
    }
}
