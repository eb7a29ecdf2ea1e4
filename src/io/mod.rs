//! Text and binary codecs.
//!
//! Readers construct through a [`CurveFactory`](crate::factory::CurveFactory)
//! so parsed geometries pass the same validation as direct construction.

pub mod wkb;
pub mod wkt;

/// Deepest geometry nesting either reader accepts, counting the outermost level.
pub const MAX_NESTING_DEPTH: usize = 64;

pub use wkb::{read_wkb, to_wkb, wkb_size, ByteOrder, WkbDialect, WkbReader, WkbWriter};
pub use wkt::{read_wkt, to_wkt, WktReader, WktWriter};
