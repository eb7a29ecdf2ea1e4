pub mod config;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod io;
pub mod math;

pub use config::{ArcSegmentLength, CurveParams};
pub use error::{CurvedError, GeometryError, ParseError, Result};
pub use factory::CurveFactory;
pub use geometry::{
    CircularArc, CircularString, CompoundCurve, Curve, CurvePolygon, Geometry, Linearize, MultiCurve, MultiSurface,
    Segment, Surface,
};
