//! Well-known binary with the SQL-MM curve type codes.
//!
//! | code | type           | body                                   |
//! |------|----------------|----------------------------------------|
//! | 8    | CircularString | `u32` point count, points              |
//! | 9    | CompoundCurve  | `u32` segment count, nested geometries |
//! | 10   | CurvePolygon   | `u32` ring count (0: empty), nested    |
//! | 11   | MultiCurve     | `u32` member count, nested geometries  |
//! | 12   | MultiSurface   | `u32` member count, nested geometries  |
//!
//! The reader accepts ISO (`+1000` Z, `+2000` M, `+3000` ZM) and EWKB
//! (high-bit Z, M and SRID flags) headers in either byte order. The writer
//! produces either dialect.

use tracing::trace;

use crate::error::{GeometryError, ParseError};
use crate::factory::CurveFactory;
use crate::geometry::{CompoundCurve, Curve, CurvePolygon, Geometry, LineString, Polygon, Segment, Surface};
use crate::math::{Coordinate, Ordinates};

use super::MAX_NESTING_DEPTH;

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;
const EWKB_FLAGS: u32 = EWKB_Z | EWKB_M | EWKB_SRID;

const POINT: u32 = 1;
const LINE_STRING: u32 = 2;
const POLYGON: u32 = 3;
const MULTI_POINT: u32 = 4;
const MULTI_LINE_STRING: u32 = 5;
const MULTI_POLYGON: u32 = 6;
const GEOMETRY_COLLECTION: u32 = 7;
const CIRCULAR_STRING: u32 = 8;
const COMPOUND_CURVE: u32 = 9;
const CURVE_POLYGON: u32 = 10;
const MULTI_CURVE: u32 = 11;
const MULTI_SURFACE: u32 = 12;

/// Byte order marker of a WKB header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// XDR, marker `0`.
    BigEndian,
    /// NDR, marker `1`.
    #[default]
    LittleEndian,
}

impl ByteOrder {
    fn marker(self) -> u8 {
        match self {
            Self::BigEndian => 0,
            Self::LittleEndian => 1,
        }
    }
}

impl TryFrom<u8> for ByteOrder {
    type Error = ParseError;

    fn try_from(marker: u8) -> Result<Self, ParseError> {
        match marker {
            0 => Ok(Self::BigEndian),
            1 => Ok(Self::LittleEndian),
            other => Err(ParseError::ByteOrder(other)),
        }
    }
}

/// How Z, M and SRID are encoded in the type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WkbDialect {
    /// PostGIS extended WKB: high-bit flags, optional SRID.
    #[default]
    Extended,
    /// ISO SQL/MM: `+1000`, `+2000`, `+3000` offsets, no SRID.
    Iso,
}

// Cursor over the input keeping track of the read position.
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
    depth: usize,
}

impl Cursor<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let end = self.position + N;
        let chunk = self
            .bytes
            .get(self.position..end)
            .and_then(|slice| <[u8; N]>::try_from(slice).ok())
            .ok_or(ParseError::Truncated(self.position))?;
        self.position = end;
        Ok(chunk)
    }

    fn read_u8(&mut self) -> Result<u8, ParseError> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, ParseError> {
        let bytes = self.take::<4>()?;
        Ok(match order {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        })
    }

    fn read_f64(&mut self, order: ByteOrder) -> Result<f64, ParseError> {
        let bytes = self.take::<8>()?;
        Ok(match order {
            ByteOrder::BigEndian => f64::from_be_bytes(bytes),
            ByteOrder::LittleEndian => f64::from_le_bytes(bytes),
        })
    }

    /// Reads an element count, rejecting counts the remaining input cannot hold.
    fn read_count(&mut self, order: ByteOrder, min_item_size: usize) -> Result<usize, ParseError> {
        let start = self.position;
        let count = usize::try_from(self.read_u32(order)?).map_err(|_| ParseError::Truncated(start))?;
        let remaining = self.bytes.len().saturating_sub(self.position);
        if count.saturating_mul(min_item_size) > remaining {
            return Err(ParseError::Truncated(self.bytes.len()));
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy)]
struct Header {
    order: ByteOrder,
    code: u32,
    ordinates: Ordinates,
    srid: Option<i32>,
}

// Smallest possible nested geometry: byte order, type word and a count.
const MIN_NESTED_SIZE: usize = 1 + 4 + 4;

/// Reads well-known binary through a [`CurveFactory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WkbReader {
    factory: CurveFactory,
}

impl WkbReader {
    #[must_use]
    pub fn new(factory: CurveFactory) -> Self {
        Self { factory }
    }

    /// Parses a single geometry, ignoring any SRID.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for truncated or malformed input, unknown type
    /// codes, or geometries that fail validation.
    pub fn read(&self, bytes: &[u8]) -> Result<Geometry, ParseError> {
        self.read_with_srid(bytes).map(|(geometry, _)| geometry)
    }

    /// Parses a single geometry along with the SRID of an EWKB header.
    ///
    /// # Errors
    ///
    /// See [`WkbReader::read`].
    pub fn read_with_srid(&self, bytes: &[u8]) -> Result<(Geometry, Option<i32>), ParseError> {
        trace!(len = bytes.len(), "reading WKB");
        let mut cursor = Cursor {
            bytes,
            position: 0,
            depth: 1,
        };
        let header = read_header(&mut cursor)?;
        let geometry = self.read_body(&mut cursor, header)?;
        Ok((geometry, header.srid))
    }

    fn read_geometry(&self, cursor: &mut Cursor<'_>) -> Result<Geometry, ParseError> {
        if cursor.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                position: cursor.position,
                limit: MAX_NESTING_DEPTH,
            });
        }
        cursor.depth += 1;
        let geometry = read_header(cursor).and_then(|header| self.read_body(cursor, header));
        cursor.depth -= 1;
        geometry
    }

    fn read_body(&self, cursor: &mut Cursor<'_>, header: Header) -> Result<Geometry, ParseError> {
        let order = header.order;
        let geometry = match header.code {
            POINT => {
                let c = self.read_coordinate(cursor, header)?;
                // An empty point is encoded with NaN ordinates.
                let empty = c.x.is_nan() && c.y.is_nan();
                self.factory.create_point((!empty).then_some(c))
            }
            LINE_STRING => Geometry::LineString(self.factory.create_line_string(self.read_coordinates(cursor, header)?)?),
            CIRCULAR_STRING => {
                Geometry::CircularString(self.factory.create_circular_string(self.read_coordinates(cursor, header)?)?)
            }
            POLYGON => Geometry::Polygon(self.read_polygon(cursor, header)?),
            COMPOUND_CURVE => {
                let members = self.read_members(cursor, order)?;
                Geometry::CompoundCurve(self.factory.compound_curve_from_geometries(members)?)
            }
            CURVE_POLYGON => Geometry::CurvePolygon(self.read_curve_polygon(cursor, order)?),
            MULTI_POINT => {
                let mut points = Vec::new();
                for member in self.read_members(cursor, order)? {
                    match member {
                        Geometry::Point(Some(c)) => points.push(c),
                        Geometry::Point(None) => {}
                        other => return Err(invalid_member("MultiPoint", &other)),
                    }
                }
                Geometry::MultiPoint(self.factory.create_multi_point(points))
            }
            MULTI_LINE_STRING => {
                let lines = self
                    .read_members(cursor, order)?
                    .into_iter()
                    .map(|member| match member {
                        Geometry::LineString(line) => Ok(line),
                        other => Err(invalid_member("MultiLineString", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiLineString(self.factory.create_multi_line_string(lines))
            }
            MULTI_POLYGON => {
                let polygons = self
                    .read_members(cursor, order)?
                    .into_iter()
                    .map(|member| match member {
                        Geometry::Polygon(polygon) => Ok(polygon),
                        other => Err(invalid_member("MultiPolygon", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Geometry::MultiPolygon(self.factory.create_multi_polygon(polygons))
            }
            MULTI_CURVE => Geometry::MultiCurve(self.factory.create_multi_curve(self.read_members(cursor, order)?)?),
            MULTI_SURFACE => {
                Geometry::MultiSurface(self.factory.create_multi_surface(self.read_members(cursor, order)?)?)
            }
            GEOMETRY_COLLECTION => {
                Geometry::GeometryCollection(self.factory.create_geometry_collection(self.read_members(cursor, order)?))
            }
            other => return Err(ParseError::UnknownTypeCode(other)),
        };
        Ok(geometry)
    }

    fn read_coordinate(&self, cursor: &mut Cursor<'_>, header: Header) -> Result<Coordinate, ParseError> {
        let order = header.order;
        let x = cursor.read_f64(order)?;
        let y = cursor.read_f64(order)?;
        let z = if header.ordinates.z { Some(cursor.read_f64(order)?) } else { None };
        let m = if header.ordinates.m { Some(cursor.read_f64(order)?) } else { None };
        Ok(self.factory.make_precise(Coordinate { x, y, z, m }))
    }

    fn read_coordinates(&self, cursor: &mut Cursor<'_>, header: Header) -> Result<Vec<Coordinate>, ParseError> {
        let count = cursor.read_count(header.order, 8 * header.ordinates.dimension())?;
        (0..count).map(|_| self.read_coordinate(cursor, header)).collect()
    }

    fn read_polygon(&self, cursor: &mut Cursor<'_>, header: Header) -> Result<Polygon, ParseError> {
        let count = cursor.read_count(header.order, 4)?;
        let mut rings = (0..count)
            .map(|_| self.read_coordinates(cursor, header).map(LineString))
            .collect::<Result<Vec<_>, _>>()?;
        if rings.is_empty() {
            return Ok(Polygon::empty());
        }
        let holes = rings.split_off(1);
        let shell = rings.pop().unwrap_or_default();
        Ok(self.factory.create_polygon(shell, holes)?)
    }

    fn read_curve_polygon(&self, cursor: &mut Cursor<'_>, order: ByteOrder) -> Result<CurvePolygon, ParseError> {
        let mut rings = self
            .read_members(cursor, order)?
            .into_iter()
            .map(|member| member.into_curve().map_err(|other| invalid_member("CurvePolygon", &other)))
            .collect::<Result<Vec<_>, _>>()?;
        let holes = rings.split_off(rings.len().min(1));
        let Some(shell) = rings.pop() else {
            return Ok(CurvePolygon::empty(*self.factory.params()));
        };
        Ok(self.factory.create_curve_polygon(shell, holes)?)
    }

    fn read_members(&self, cursor: &mut Cursor<'_>, order: ByteOrder) -> Result<Vec<Geometry>, ParseError> {
        let count = cursor.read_count(order, MIN_NESTED_SIZE)?;
        (0..count).map(|_| self.read_geometry(cursor)).collect()
    }
}

fn read_header(cursor: &mut Cursor<'_>) -> Result<Header, ParseError> {
    let order = ByteOrder::try_from(cursor.read_u8()?)?;
    let raw = cursor.read_u32(order)?;

    let mut ordinates = Ordinates {
        z: raw & EWKB_Z != 0,
        m: raw & EWKB_M != 0,
    };
    let plain = raw & !EWKB_FLAGS;
    match plain / 1000 {
        0 => {}
        1 => ordinates.z = true,
        2 => ordinates.m = true,
        3 => ordinates = Ordinates::XYZM,
        _ => return Err(ParseError::UnknownTypeCode(raw)),
    }

    let srid = if raw & EWKB_SRID == 0 {
        None
    } else {
        Some(i32::from_ne_bytes(cursor.read_u32(order)?.to_ne_bytes()))
    };

    Ok(Header {
        order,
        code: plain % 1000,
        ordinates,
        srid,
    })
}

fn invalid_member(collection: &'static str, member: &Geometry) -> ParseError {
    ParseError::Invalid(GeometryError::InvalidMember {
        collection,
        member: member.type_name(),
    })
}

/// Parses well-known binary with a default [`CurveFactory`].
///
/// # Errors
///
/// See [`WkbReader::read`].
pub fn read_wkb(bytes: &[u8]) -> Result<Geometry, ParseError> {
    WkbReader::default().read(bytes)
}

/// Writes geometries as well-known binary.
///
/// All coordinates are written with the ordinates of the outermost geometry,
/// missing values padded with NaN. The SRID is only written in the
/// [`WkbDialect::Extended`] dialect, on the outermost header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WkbWriter {
    byte_order: ByteOrder,
    dialect: WkbDialect,
    srid: Option<i32>,
}

impl WkbWriter {
    #[must_use]
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dialect(self, dialect: WkbDialect) -> Self {
        Self { dialect, ..self }
    }

    #[must_use]
    pub fn with_srid(self, srid: i32) -> Self {
        Self {
            srid: Some(srid),
            ..self
        }
    }

    fn include_srid(&self) -> bool {
        self.srid.is_some() && self.dialect == WkbDialect::Extended
    }

    #[must_use]
    pub fn write(&self, geometry: &Geometry) -> Vec<u8> {
        trace!(kind = geometry.type_name(), order = ?self.byte_order, "writing WKB");
        let mut out = Vec::with_capacity(wkb_size(geometry, self.include_srid()));
        self.write_geometry(&mut out, geometry, geometry.ordinates(), true);
        out
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        match self.byte_order {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn put_f64(&self, out: &mut Vec<u8>, value: f64) {
        match self.byte_order {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn put_count(&self, out: &mut Vec<u8>, count: usize) {
        // Counts beyond u32 cannot be represented in WKB.
        self.put_u32(out, u32::try_from(count).unwrap_or(u32::MAX));
    }

    fn put_header(&self, out: &mut Vec<u8>, code: u32, ordinates: Ordinates, outermost: bool) {
        out.push(self.byte_order.marker());
        let srid = self.srid.filter(|_| outermost && self.include_srid());
        let word = match self.dialect {
            WkbDialect::Extended => {
                let mut word = code;
                if ordinates.z {
                    word |= EWKB_Z;
                }
                if ordinates.m {
                    word |= EWKB_M;
                }
                if srid.is_some() {
                    word |= EWKB_SRID;
                }
                word
            }
            WkbDialect::Iso => code + 1000 * u32::from(ordinates.z) + 2000 * u32::from(ordinates.m),
        };
        self.put_u32(out, word);
        if let Some(srid) = srid {
            self.put_u32(out, u32::from_ne_bytes(srid.to_ne_bytes()));
        }
    }

    fn put_coordinate(&self, out: &mut Vec<u8>, c: &Coordinate, ordinates: Ordinates) {
        let c = c.with_ordinates(ordinates);
        self.put_f64(out, c.x);
        self.put_f64(out, c.y);
        for value in [c.z, c.m].into_iter().flatten() {
            self.put_f64(out, value);
        }
    }

    fn put_coordinates(&self, out: &mut Vec<u8>, coords: &[Coordinate], ordinates: Ordinates) {
        self.put_count(out, coords.len());
        for c in coords {
            self.put_coordinate(out, c, ordinates);
        }
    }

    fn write_curve(&self, out: &mut Vec<u8>, curve: &Curve, ordinates: Ordinates) {
        match curve {
            Curve::LineString(line) => {
                self.put_header(out, LINE_STRING, ordinates, false);
                self.put_coordinates(out, line.coords(), ordinates);
            }
            Curve::CircularString(cs) => {
                self.put_header(out, CIRCULAR_STRING, ordinates, false);
                self.put_coordinates(out, cs.coords(), ordinates);
            }
            Curve::CompoundCurve(cc) => self.write_compound_curve(out, cc, ordinates, false),
        }
    }

    fn write_compound_curve(&self, out: &mut Vec<u8>, cc: &CompoundCurve, ordinates: Ordinates, outermost: bool) {
        self.put_header(out, COMPOUND_CURVE, ordinates, outermost);
        self.put_count(out, cc.num_segments());
        for segment in cc.segments() {
            let code = match segment {
                Segment::Line(_) => LINE_STRING,
                Segment::Arc(_) => CIRCULAR_STRING,
            };
            self.put_header(out, code, ordinates, false);
            self.put_coordinates(out, segment.coords(), ordinates);
        }
    }

    fn write_polygon(&self, out: &mut Vec<u8>, polygon: &Polygon, ordinates: Ordinates, outermost: bool) {
        self.put_header(out, POLYGON, ordinates, outermost);
        if polygon.is_empty() {
            self.put_u32(out, 0);
            return;
        }
        self.put_count(out, polygon.rings().count());
        for ring in polygon.rings() {
            self.put_coordinates(out, ring.coords(), ordinates);
        }
    }

    fn write_curve_polygon(&self, out: &mut Vec<u8>, cp: &CurvePolygon, ordinates: Ordinates, outermost: bool) {
        self.put_header(out, CURVE_POLYGON, ordinates, outermost);
        if cp.is_empty() {
            self.put_u32(out, 0);
            return;
        }
        self.put_count(out, cp.num_interior_rings() + 1);
        for ring in cp.rings() {
            self.write_curve(out, ring, ordinates);
        }
    }

    fn write_geometry(&self, out: &mut Vec<u8>, geometry: &Geometry, ordinates: Ordinates, outermost: bool) {
        match geometry {
            Geometry::Point(point) => {
                self.put_header(out, POINT, ordinates, outermost);
                let c = point.unwrap_or(Coordinate {
                    x: f64::NAN,
                    y: f64::NAN,
                    z: None,
                    m: None,
                });
                self.put_coordinate(out, &c, ordinates);
            }
            Geometry::LineString(line) => {
                self.put_header(out, LINE_STRING, ordinates, outermost);
                self.put_coordinates(out, line.coords(), ordinates);
            }
            Geometry::CircularString(cs) => {
                self.put_header(out, CIRCULAR_STRING, ordinates, outermost);
                self.put_coordinates(out, cs.coords(), ordinates);
            }
            Geometry::CompoundCurve(cc) => self.write_compound_curve(out, cc, ordinates, outermost),
            Geometry::Polygon(polygon) => self.write_polygon(out, polygon, ordinates, outermost),
            Geometry::CurvePolygon(cp) => self.write_curve_polygon(out, cp, ordinates, outermost),
            Geometry::MultiPoint(mp) => {
                self.put_header(out, MULTI_POINT, ordinates, outermost);
                self.put_count(out, mp.0.len());
                for c in &mp.0 {
                    self.put_header(out, POINT, ordinates, false);
                    self.put_coordinate(out, c, ordinates);
                }
            }
            Geometry::MultiLineString(ml) => {
                self.put_header(out, MULTI_LINE_STRING, ordinates, outermost);
                self.put_count(out, ml.0.len());
                for line in &ml.0 {
                    self.put_header(out, LINE_STRING, ordinates, false);
                    self.put_coordinates(out, line.coords(), ordinates);
                }
            }
            Geometry::MultiCurve(mc) => {
                self.put_header(out, MULTI_CURVE, ordinates, outermost);
                self.put_count(out, mc.num_members());
                for curve in mc.members() {
                    self.write_curve(out, curve, ordinates);
                }
            }
            Geometry::MultiPolygon(mp) => {
                self.put_header(out, MULTI_POLYGON, ordinates, outermost);
                self.put_count(out, mp.0.len());
                for polygon in &mp.0 {
                    self.write_polygon(out, polygon, ordinates, false);
                }
            }
            Geometry::MultiSurface(ms) => {
                self.put_header(out, MULTI_SURFACE, ordinates, outermost);
                self.put_count(out, ms.num_members());
                for surface in ms.members() {
                    match surface {
                        Surface::Polygon(polygon) => self.write_polygon(out, polygon, ordinates, false),
                        Surface::CurvePolygon(cp) => self.write_curve_polygon(out, cp, ordinates, false),
                    }
                }
            }
            Geometry::GeometryCollection(gc) => {
                self.put_header(out, GEOMETRY_COLLECTION, ordinates, outermost);
                self.put_count(out, gc.0.len());
                for member in &gc.0 {
                    self.write_geometry(out, member, ordinates, false);
                }
            }
        }
    }
}

/// Encodes a geometry as little-endian extended WKB without SRID.
#[must_use]
pub fn to_wkb(geometry: &Geometry) -> Vec<u8> {
    WkbWriter::default().write(geometry)
}

/// Number of bytes [`WkbWriter::write`] produces for `geometry`.
#[must_use]
pub fn wkb_size(geometry: &Geometry, include_srid: bool) -> usize {
    let point = 8 * geometry.ordinates().dimension();
    header_size(include_srid) + body_size(geometry, point)
}

fn header_size(include_srid: bool) -> usize {
    1 + 4 + if include_srid { 4 } else { 0 }
}

fn coordinates_size(count: usize, point: usize) -> usize {
    4 + count * point
}

fn curve_size(curve: &Curve, point: usize) -> usize {
    header_size(false)
        + match curve {
            Curve::LineString(line) => coordinates_size(line.num_points(), point),
            Curve::CircularString(cs) => coordinates_size(cs.num_points(), point),
            Curve::CompoundCurve(cc) => compound_body_size(cc, point),
        }
}

fn compound_body_size(cc: &CompoundCurve, point: usize) -> usize {
    4 + cc
        .segments()
        .iter()
        .map(|s| header_size(false) + coordinates_size(s.coords().len(), point))
        .sum::<usize>()
}

fn polygon_body_size(polygon: &Polygon, point: usize) -> usize {
    if polygon.is_empty() {
        return 4;
    }
    4 + polygon.rings().map(|ring| coordinates_size(ring.num_points(), point)).sum::<usize>()
}

fn curve_polygon_body_size(cp: &CurvePolygon, point: usize) -> usize {
    if cp.is_empty() {
        return 4;
    }
    4 + cp.rings().map(|ring| curve_size(ring, point)).sum::<usize>()
}

fn body_size(geometry: &Geometry, point: usize) -> usize {
    match geometry {
        Geometry::Point(_) => point,
        Geometry::LineString(line) => coordinates_size(line.num_points(), point),
        Geometry::CircularString(cs) => coordinates_size(cs.num_points(), point),
        Geometry::CompoundCurve(cc) => compound_body_size(cc, point),
        Geometry::Polygon(polygon) => polygon_body_size(polygon, point),
        Geometry::CurvePolygon(cp) => curve_polygon_body_size(cp, point),
        Geometry::MultiPoint(mp) => 4 + mp.0.len() * (header_size(false) + point),
        Geometry::MultiLineString(ml) => {
            4 + ml
                .0
                .iter()
                .map(|line| header_size(false) + coordinates_size(line.num_points(), point))
                .sum::<usize>()
        }
        Geometry::MultiCurve(mc) => 4 + mc.members().iter().map(|curve| curve_size(curve, point)).sum::<usize>(),
        Geometry::MultiPolygon(mp) => {
            4 + mp
                .0
                .iter()
                .map(|polygon| header_size(false) + polygon_body_size(polygon, point))
                .sum::<usize>()
        }
        Geometry::MultiSurface(ms) => {
            4 + ms
                .members()
                .iter()
                .map(|surface| {
                    header_size(false)
                        + match surface {
                            Surface::Polygon(polygon) => polygon_body_size(polygon, point),
                            Surface::CurvePolygon(cp) => curve_polygon_body_size(cp, point),
                        }
                })
                .sum::<usize>()
        }
        Geometry::GeometryCollection(gc) => {
            4 + gc
                .0
                .iter()
                .map(|member| header_size(false) + body_size(member, point))
                .sum::<usize>()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::CurveParams;
    use crate::geometry::Linearize;
    use crate::io::wkt::{to_wkt, WktReader};
    use crate::math::PrecisionModel;

    const SAMPLES: &[&str] = &[
        "CIRCULARSTRING EMPTY",
        "CIRCULARSTRING (0 0, 1 2, 2 4)",
        "CIRCULARSTRING (2 1, 1 2, 0 1, 1 0, 2 1)",
        "COMPOUNDCURVE EMPTY",
        "COMPOUNDCURVE ((1 1, 1 3), (1 3, 3 3), (3 3, 3 1), (3 1, 1 1))",
        "COMPOUNDCURVE ((2 2, 0 0), CIRCULARSTRING (0 0, 1 2.1082, 3 6.3246, 0 7, -3 6.3246, -1 2.1082, 0 0))",
        "COMPOUNDCURVE ZM (CIRCULARSTRING (7 5 4 2, 5 7 4 2, 3 5 4 2), (3 5 4 2, 8 7 4 2))",
        "CURVEPOLYGON EMPTY",
        "CURVEPOLYGON (CIRCULARSTRING (2 4, 4 2, 6 4, 4 6, 2 4))",
        "CURVEPOLYGON (CIRCULARSTRING (0 4, 4 0, 8 4, 4 8, 0 4), CIRCULARSTRING (2 4, 4 2, 6 4, 4 6, 2 4))",
        "CURVEPOLYGON (CIRCULARSTRING (0 5, 5 0, 0 -5, -5 0, 0 5), (-2 2, 2 2, 2 -2, -2 -2, -2 2))",
        "MULTICURVE EMPTY",
        "MULTICURVE ((2 0, 1 1, 0 0), CIRCULARSTRING (0 0, 1 2.1082, 3 6.3246, 0 7, -3 6.3246, -1 2.1082, 0 0), EMPTY, COMPOUNDCURVE (CIRCULARSTRING (0 2, 2 0, 4 2), CIRCULARSTRING (4 2, 2 4, 0 2)))",
        "MULTISURFACE EMPTY",
        "MULTISURFACE (((0 0, 10 0, 10 10, 0 10, 0 0), (1 1, 1 2, 2 1, 1 1)), CURVEPOLYGON (CIRCULARSTRING (0 5, 5 0, 0 -5, -5 0, 0 5), (-2 2, 2 2, 2 -2, -2 -2, -2 2)))",
        "GEOMETRYCOLLECTION (POINT EMPTY, POINT (1 2), MULTIPOINT ((0 0), (1 1)), POLYGON EMPTY)",
    ];

    fn factory() -> CurveFactory {
        CurveFactory::new(CurveParams::default().with_precision(PrecisionModel::fixed(10000.0).unwrap()))
    }

    #[test]
    fn samples_round_trip_in_both_orders_and_dialects() {
        let wkt = WktReader::new(factory());
        let wkb = WkbReader::new(factory());
        let writers = [
            WkbWriter::new(ByteOrder::LittleEndian),
            WkbWriter::new(ByteOrder::BigEndian),
            WkbWriter::new(ByteOrder::LittleEndian).with_dialect(WkbDialect::Iso),
            WkbWriter::new(ByteOrder::BigEndian).with_srid(4326),
        ];
        for text in SAMPLES {
            let geometry = wkt.read(text).unwrap();
            for writer in &writers {
                let bytes = writer.write(&geometry);
                assert_eq!(bytes.len(), wkb_size(&geometry, writer.include_srid()), "{text}");
                let back = wkb.read(&bytes).unwrap();
                assert_eq!(to_wkt(&back), *text);
                assert!(back.flatten().equals_exact(&geometry.flatten(), 1e-9), "{text}");
            }
        }
    }

    #[test]
    fn empty_circular_string_has_no_arcs() {
        let bytes = to_wkb(&WktReader::default().read("CIRCULARSTRING EMPTY").unwrap());
        assert_eq!(bytes, [1, 8, 0, 0, 0, 0, 0, 0, 0]);
        let Geometry::CircularString(cs) = read_wkb(&bytes).unwrap() else {
            panic!("expected a circular string");
        };
        assert!(cs.is_empty());
        assert_eq!(cs.num_arcs(), 0);
    }

    #[test]
    fn srid_and_flags() {
        let geometry = WktReader::default().read("CIRCULARSTRING Z (0 0 1, 1 1 1, 2 0 1)").unwrap();
        let bytes = WkbWriter::default().with_srid(4326).write(&geometry);
        let word = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        assert_eq!(word, CIRCULAR_STRING | EWKB_Z | EWKB_SRID);
        let (back, srid) = WkbReader::default().read_with_srid(&bytes).unwrap();
        assert_eq!(srid, Some(4326));
        assert_eq!(back, geometry);

        let iso = WkbWriter::default().with_dialect(WkbDialect::Iso).with_srid(4326).write(&geometry);
        let word = u32::from_le_bytes([iso[1], iso[2], iso[3], iso[4]]);
        assert_eq!(word, 1008);
        assert_eq!(WkbReader::default().read_with_srid(&iso).unwrap().1, None);
    }

    #[test]
    fn empty_curve_polygon_is_zero_rings() {
        let bytes = to_wkb(&WktReader::default().read("CURVEPOLYGON EMPTY").unwrap());
        assert_eq!(bytes, [1, 10, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_point_is_nan() {
        let bytes = to_wkb(&Geometry::Point(None));
        assert_eq!(bytes.len(), 21);
        assert!(f64::from_le_bytes(bytes[5..13].try_into().unwrap()).is_nan());
        assert_eq!(read_wkb(&bytes).unwrap(), Geometry::Point(None));
    }

    #[test]
    fn invalid_input() {
        assert_eq!(read_wkb(&[]).unwrap_err(), ParseError::Truncated(0));
        assert_eq!(read_wkb(&[7, 1, 0, 0, 0]).unwrap_err(), ParseError::ByteOrder(7));
        assert_eq!(read_wkb(&[1, 99, 0, 0, 0]).unwrap_err(), ParseError::UnknownTypeCode(99));
        // A circular string claiming far more points than the input holds.
        assert!(matches!(
            read_wkb(&[1, 8, 0, 0, 0, 0xff, 0xff, 0, 0]),
            Err(ParseError::Truncated(_))
        ));

        let two_points = WktReader::default().read("LINESTRING (0 0, 1 1)").unwrap();
        let mut bytes = to_wkb(&two_points);
        bytes[1] = 8;
        assert!(matches!(
            read_wkb(&bytes),
            Err(ParseError::Invalid(GeometryError::InvalidPointCount { count: 2, .. }))
        ));
    }

    #[test]
    fn non_adjacent_compound_is_rejected() {
        let reader = WktReader::default();
        let first = reader.read("LINESTRING (0 0, 1 0)").unwrap();
        let second = reader.read("LINESTRING (2 0, 3 0)").unwrap();
        let mut bytes = vec![1];
        bytes.extend_from_slice(&COMPOUND_CURVE.to_le_bytes());
        bytes.extend_from_slice(&2_u32.to_le_bytes());
        bytes.extend(to_wkb(&first));
        bytes.extend(to_wkb(&second));
        assert!(matches!(
            read_wkb(&bytes),
            Err(ParseError::Invalid(GeometryError::NotInSequence { index: 1, .. }))
        ));
    }

    fn nested_collections(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * MIN_NESTED_SIZE);
        for level in 0..levels {
            bytes.push(1);
            bytes.extend_from_slice(&GEOMETRY_COLLECTION.to_le_bytes());
            bytes.extend_from_slice(&u32::from(level + 1 < levels).to_le_bytes());
        }
        bytes
    }

    #[test]
    fn collection_nesting_is_bounded() {
        assert!(read_wkb(&nested_collections(MAX_NESTING_DEPTH)).is_ok());
        assert!(matches!(
            read_wkb(&nested_collections(MAX_NESTING_DEPTH + 1)),
            Err(ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. })
        ));
        // Deep enough to exhaust the stack without the limit.
        assert!(matches!(
            read_wkb(&nested_collections(200_000)),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn reads_big_endian_points() {
        let mut bytes = vec![0];
        bytes.extend_from_slice(&POINT.to_be_bytes());
        bytes.extend_from_slice(&1.5_f64.to_be_bytes());
        bytes.extend_from_slice(&(-2.0_f64).to_be_bytes());
        let Geometry::Point(Some(c)) = read_wkb(&bytes).unwrap() else {
            panic!("expected a point");
        };
        assert_relative_eq!(c.x, 1.5);
        assert_relative_eq!(c.y, -2.0);
    }
}
