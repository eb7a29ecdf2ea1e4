use super::Point2;

/// A 2 to 4 ordinate position: X, Y, optional Z elevation and optional M measure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

/// Which optional ordinates a coordinate (or a whole geometry) carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ordinates {
    pub z: bool,
    pub m: bool,
}

impl Ordinates {
    pub const XY: Self = Self { z: false, m: false };
    pub const XYZ: Self = Self { z: true, m: false };
    pub const XYM: Self = Self { z: false, m: true };
    pub const XYZM: Self = Self { z: true, m: true };

    /// Number of ordinates per coordinate (2 to 4).
    #[must_use]
    pub fn dimension(self) -> usize {
        2 + usize::from(self.z) + usize::from(self.m)
    }
}

impl Coordinate {
    /// Creates a 2D coordinate.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// Creates a coordinate with an elevation.
    #[must_use]
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// Creates a coordinate with a measure.
    #[must_use]
    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    /// Creates a coordinate with both elevation and measure.
    #[must_use]
    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        Ordinates {
            z: self.z.is_some(),
            m: self.m.is_some(),
        }
    }

    /// Projects onto the XY plane.
    #[must_use]
    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Planar distance, ignoring Z and M.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.xy(), &other.xy())
    }

    /// Exact equality of X and Y.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn equals_2d(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Equality of X and Y within `tolerance` per axis.
    #[must_use]
    pub fn equals_2d_within(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Returns a copy restricted to (or padded with NaN up to) the given ordinates.
    #[must_use]
    pub fn with_ordinates(&self, ordinates: Ordinates) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: ordinates.z.then(|| self.z.unwrap_or(f64::NAN)),
            m: ordinates.m.then(|| self.m.unwrap_or(f64::NAN)),
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::coord! { x: c.x, y: c.y }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(c: geo::Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Union of the ordinates carried by a run of coordinates.
pub fn ordinates_of<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Ordinates {
    coords
        .into_iter()
        .fold(Ordinates::XY, |acc, c| Ordinates {
            z: acc.z || c.z.is_some(),
            m: acc.m || c.m.is_some(),
        })
}
