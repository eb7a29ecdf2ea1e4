use thiserror::Error;

/// Top-level error type for curved geometry construction and I/O.
#[derive(Debug, Error)]
pub enum CurvedError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Structural validation failures raised while constructing geometries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid number of points: {count} (expected {expected})")]
    InvalidPointCount { count: usize, expected: &'static str },

    #[error("index {index} is out of range (must be less than {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("compound curve contains a null or empty segment at position {0}")]
    NullOrEmptySegment(usize),

    #[error("segments are not in a sequence: gap of {distance} before segment {index}")]
    NotInSequence { index: usize, distance: f64 },

    #[error("{0} is not a closed, simple ring")]
    NotARing(&'static str),

    #[error("interior ring {0} is not contained in the exterior ring")]
    HoleOutsideShell(usize),

    #[error("an empty exterior ring cannot have non-empty interior rings")]
    HolesWithoutShell,

    #[error("{collection} cannot contain a {member}")]
    InvalidMember {
        collection: &'static str,
        member: &'static str,
    },

    #[error("invalid tolerance {value}: {reason}")]
    InvalidTolerance { value: f64, reason: &'static str },

    #[error("invalid linear ring: {0}")]
    InvalidRing(String),
}

/// Errors raised by the WKT and WKB codecs.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("position {position}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("position {position}: invalid number {src:?}")]
    Number { src: String, position: usize },

    #[error("unknown geometry type {0:?}")]
    UnknownType(String),

    #[error("{0} is not allowed at this position")]
    NotAllowed(&'static str),

    #[error("unsupported WKB geometry type code {0}")]
    UnknownTypeCode(u32),

    #[error("invalid WKB byte order marker {0}")]
    ByteOrder(u8),

    #[error("WKB input truncated at byte {0}")]
    Truncated(usize),

    #[error("position {position}: collections nested deeper than {limit} levels")]
    NestingTooDeep { position: usize, limit: usize },

    #[error("invalid geometry: {0}")]
    Invalid(#[from] GeometryError),
}

/// Convenience type alias for results using [`CurvedError`].
pub type Result<T> = std::result::Result<T, CurvedError>;
