use super::Coordinate;

/// An axis-aligned bounding rectangle in the XY plane, possibly empty ("null").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::null()
    }
}

impl Envelope {
    /// The empty envelope; expanding it by a point yields that point's box.
    #[must_use]
    pub fn null() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    #[must_use]
    pub fn from_coord(c: &Coordinate) -> Self {
        Self {
            min_x: c.x,
            min_y: c.y,
            max_x: c.x,
            max_y: c.y,
        }
    }

    #[must_use]
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut env = Self::null();
        for c in coords {
            env.expand_to_include(c.x, c.y);
        }
        env
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.min_x > self.max_x
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn expand_to_include_envelope(&mut self, other: &Self) {
        if other.is_null() {
            return;
        }
        self.expand_to_include(other.min_x, other.min_y);
        self.expand_to_include(other.max_x, other.max_y);
    }

    /// Whether `other` lies within this envelope, boundary inclusive.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Whether two envelopes agree on every bound within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        (self.min_x - other.min_x).abs() <= tolerance
            && (self.min_y - other.min_y).abs() <= tolerance
            && (self.max_x - other.max_x).abs() <= tolerance
            && (self.max_y - other.max_y).abs() <= tolerance
    }

    /// Converts to a `geo` rectangle; `None` when null.
    #[must_use]
    pub fn to_rect(&self) -> Option<geo::Rect<f64>> {
        if self.is_null() {
            return None;
        }
        Some(geo::Rect::new(
            geo::coord! { x: self.min_x, y: self.min_y },
            geo::coord! { x: self.max_x, y: self.max_y },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_envelope_expands_to_point() {
        let mut env = Envelope::null();
        assert!(env.is_null());
        env.expand_to_include(1.0, 2.0);
        assert!(!env.is_null());
        assert!(env.width().abs() < f64::EPSILON);
        assert!((env.min_y() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let outer = Envelope::from_coords(&[Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)]);
        let inner = Envelope::from_coords(&[Coordinate::new(0.0, 1.0), Coordinate::new(10.0, 9.0)]);
        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&Envelope::null()));
    }

    #[test]
    fn null_has_no_rect() {
        assert!(Envelope::null().to_rect().is_none());
        let env = Envelope::from_coord(&Coordinate::new(1.0, 1.0));
        assert!(env.to_rect().is_some());
    }
}
