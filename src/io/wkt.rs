//! Well-known text for the OGC linear types and the curve extensions.
//!
//! # Grammar
//!
//! Besides the usual `POINT`, `LINESTRING`, `POLYGON`, their multi forms and
//! `GEOMETRYCOLLECTION`, the reader accepts:
//!
//! - `CIRCULARSTRING (x y, ...)` with an odd number of at least 3 points
//! - `COMPOUNDCURVE (segment, ...)` where a segment is a bare coordinate
//!   list or a `CIRCULARSTRING`
//! - `CURVEPOLYGON (ring, ...)` where a ring is a bare coordinate list, a
//!   `CIRCULARSTRING` or a `COMPOUNDCURVE`
//! - `MULTICURVE (curve, ...)` and `MULTISURFACE (polygon, ...)`, the latter
//!   taking bare polygon text or `CURVEPOLYGON` members
//!
//! Every type may be followed by a `Z`, `M` or `ZM` tag and may be `EMPTY`.
//! Without a tag the ordinates are inferred from the number of values per
//! coordinate.

use std::fmt;

use tracing::trace;

use crate::error::ParseError;
use crate::factory::CurveFactory;
use crate::geometry::{
    CircularString, CompoundCurve, Curve, CurvePolygon, Geometry, GeometryCollection, LineString, MultiCurve,
    MultiLineString, MultiPoint, MultiPolygon, MultiSurface, Polygon, Segment, Surface,
};
use crate::math::{Coordinate, Ordinates};

use super::MAX_NESTING_DEPTH;

const EMPTY: &str = "EMPTY";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(f64),
    Open,
    Close,
    Comma,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Word(word) => word.clone(),
            Self::Number(value) => value.to_string(),
            Self::Open => "(".to_owned(),
            Self::Close => ")".to_owned(),
            Self::Comma => ",".to_owned(),
            Self::End => "end of input".to_owned(),
        }
    }
}

// A buffered iterator of characters keeping track of the position.
struct Source<Iter> {
    src: Iter,
    current: char,
    position: usize,
    finished: bool,
}

impl<Iter: Iterator<Item = char>> Source<Iter> {
    fn new(mut src: Iter) -> Self {
        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };
        Self {
            src,
            current,
            position: 0,
            finished,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && self.current.is_whitespace() {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        self.position += 1;
        match self.src.next() {
            Some(c) => self.current = c,
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }
}

struct Tokens<Iter> {
    src: Source<Iter>,
    peeked: Option<(Token, usize)>,
    buffer: String,
    depth: usize,
}

impl<Iter: Iterator<Item = char>> Tokens<Iter> {
    fn new(src: Iter) -> Self {
        Self {
            src: Source::new(src),
            peeked: None,
            buffer: String::new(),
            depth: 0,
        }
    }

    fn next(&mut self) -> Result<(Token, usize), ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn peek(&mut self) -> Result<Token, ParseError> {
        if self.peeked.is_none() {
            let token = self.lex()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref().map_or(Token::End, |(token, _)| token.clone()))
    }

    fn position(&mut self) -> Result<usize, ParseError> {
        self.peek()?;
        Ok(self.peeked.as_ref().map_or(self.src.position, |(_, position)| *position))
    }

    fn lex(&mut self) -> Result<(Token, usize), ParseError> {
        self.src.skip_whitespace();
        let position = self.src.position;
        if self.src.finished {
            return Ok((Token::End, position));
        }

        let token = match self.src.current {
            '(' => {
                self.src.advance_one();
                Token::Open
            }
            ')' => {
                self.src.advance_one();
                Token::Close
            }
            ',' => {
                self.src.advance_one();
                Token::Comma
            }
            c if c.is_ascii_alphabetic() => {
                self.buffer.clear();
                while !self.src.finished && (self.src.current.is_ascii_alphanumeric() || self.src.current == '_') {
                    self.buffer.push(self.src.current.to_ascii_uppercase());
                    self.src.advance_one();
                }
                Token::Word(std::mem::take(&mut self.buffer))
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => Token::Number(self.lex_number(position)?),
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a word, a number or a delimiter",
                    found: other.to_string(),
                    position,
                })
            }
        };
        Ok((token, position))
    }

    fn lex_number(&mut self, position: usize) -> Result<f64, ParseError> {
        self.buffer.clear();

        if matches!(self.src.current, '-' | '+') {
            self.buffer.push(self.src.current);
            self.src.advance_one();
        }

        self.push_digits();

        if self.src.current == '.' {
            self.buffer.push('.');
            self.src.advance_one();
            self.push_digits();
        }

        if matches!(self.src.current, 'e' | 'E') {
            self.buffer.push('e');
            self.src.advance_one();
            if matches!(self.src.current, '-' | '+') {
                self.buffer.push(self.src.current);
                self.src.advance_one();
            }
            self.push_digits();
        }

        self.buffer.parse::<f64>().map_err(|_| ParseError::Number {
            src: std::mem::take(&mut self.buffer),
            position,
        })
    }

    fn push_digits(&mut self) {
        while !self.src.finished && self.src.current.is_ascii_digit() {
            self.buffer.push(self.src.current);
            self.src.advance_one();
        }
    }

    fn unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.next() {
            Ok((Token::End, _)) => ParseError::UnexpectedEnd(expected),
            Ok((token, position)) => ParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                position,
            },
            Err(e) => e,
        }
    }

    fn expect_word(&mut self) -> Result<(String, usize), ParseError> {
        match self.next()? {
            (Token::Word(word), position) => Ok((word, position)),
            (Token::End, _) => Err(ParseError::UnexpectedEnd("a geometry type")),
            (token, position) => Err(ParseError::UnexpectedToken {
                expected: "a geometry type",
                found: token.describe(),
                position,
            }),
        }
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        if self.peek()? == Token::Close {
            self.next()?;
            return Ok(());
        }
        Err(self.unexpected("')'"))
    }

    /// Consumes `EMPTY` (returning `true`) or an opening parenthesis.
    fn empty_or_open(&mut self) -> Result<bool, ParseError> {
        match self.peek()? {
            Token::Word(word) if word == EMPTY => {
                self.next()?;
                Ok(true)
            }
            Token::Open => {
                self.next()?;
                Ok(false)
            }
            _ => Err(self.unexpected("EMPTY or '('")),
        }
    }

    /// Consumes a comma (returning `true`) or a closing parenthesis.
    fn comma_or_close(&mut self) -> Result<bool, ParseError> {
        match self.peek()? {
            Token::Comma => {
                self.next()?;
                Ok(true)
            }
            Token::Close => {
                self.next()?;
                Ok(false)
            }
            _ => Err(self.unexpected("',' or ')'")),
        }
    }

    fn ordinate_tag(&mut self) -> Result<Option<Ordinates>, ParseError> {
        let tag = match self.peek()? {
            Token::Word(word) => match word.as_str() {
                "Z" => Ordinates::XYZ,
                "M" => Ordinates::XYM,
                "ZM" => Ordinates::XYZM,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        self.next()?;
        Ok(Some(tag))
    }
}

/// Reads well-known text through a [`CurveFactory`].
///
/// Coordinates are snapped to the factory's precision model and every
/// geometry is validated exactly as direct construction would; a rejected
/// geometry surfaces as [`ParseError::Invalid`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WktReader {
    factory: CurveFactory,
}

impl WktReader {
    #[must_use]
    pub fn new(factory: CurveFactory) -> Self {
        Self { factory }
    }

    #[must_use]
    pub fn factory(&self) -> &CurveFactory {
        &self.factory
    }

    /// Parses a single geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for malformed text, unknown types, trailing
    /// input, or geometries that fail validation.
    pub fn read(&self, text: &str) -> Result<Geometry, ParseError> {
        trace!(len = text.len(), "reading WKT");
        let mut tokens = Tokens::new(text.chars());
        let geometry = self.read_tagged(&mut tokens, None)?;
        match tokens.next()? {
            (Token::End, _) => Ok(geometry),
            (token, position) => Err(ParseError::UnexpectedToken {
                expected: "end of input",
                found: token.describe(),
                position,
            }),
        }
    }

    fn read_tagged<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        inherited: Option<Ordinates>,
    ) -> Result<Geometry, ParseError> {
        let (word, _) = tokens.expect_word()?;
        let ordinates = tokens.ordinate_tag()?.or(inherited);
        let geometry = match word.as_str() {
            "POINT" => self.read_point_text(tokens, ordinates)?,
            "LINESTRING" => Geometry::LineString(self.read_line_string_text(tokens, ordinates)?),
            "CIRCULARSTRING" => Geometry::CircularString(self.read_circular_string_text(tokens, ordinates)?),
            "COMPOUNDCURVE" => Geometry::CompoundCurve(self.read_compound_curve_text(tokens, ordinates)?),
            "POLYGON" => Geometry::Polygon(self.read_polygon_text(tokens, ordinates)?),
            "CURVEPOLYGON" => Geometry::CurvePolygon(self.read_curve_polygon_text(tokens, ordinates)?),
            "MULTIPOINT" => Geometry::MultiPoint(self.read_multi_point_text(tokens, ordinates)?),
            "MULTILINESTRING" => Geometry::MultiLineString(self.read_multi_line_string_text(tokens, ordinates)?),
            "MULTICURVE" => Geometry::MultiCurve(self.read_multi_curve_text(tokens, ordinates)?),
            "MULTIPOLYGON" => Geometry::MultiPolygon(self.read_multi_polygon_text(tokens, ordinates)?),
            "MULTISURFACE" => Geometry::MultiSurface(self.read_multi_surface_text(tokens, ordinates)?),
            "GEOMETRYCOLLECTION" => Geometry::GeometryCollection(self.read_collection_text(tokens, ordinates)?),
            _ => return Err(ParseError::UnknownType(word)),
        };
        Ok(geometry)
    }

    fn read_coordinate<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<Coordinate, ParseError> {
        let mut values = [0.0; 4];
        let mut count = 0;
        let position = tokens.position()?;
        while count < values.len() {
            match tokens.peek()? {
                Token::Number(value) => values[count] = value,
                Token::Word(word) if word == "NAN" => values[count] = f64::NAN,
                _ => break,
            }
            tokens.next()?;
            count += 1;
        }

        let [x, y, third, fourth] = values;
        let c = match (count, ordinates) {
            (2, None | Some(Ordinates::XY)) => Coordinate::new(x, y),
            (3, None | Some(Ordinates::XYZ)) => Coordinate::xyz(x, y, third),
            (3, Some(Ordinates::XYM)) => Coordinate::xym(x, y, third),
            (4, None | Some(Ordinates::XYZM)) => Coordinate::xyzm(x, y, third, fourth),
            (0 | 1, _) => return Err(tokens.unexpected("a number")),
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a coordinate matching the ordinate tag",
                    found: format!("{count} ordinates"),
                    position,
                })
            }
        };
        Ok(self.factory.make_precise(c))
    }

    fn read_coordinates_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<Vec<Coordinate>, ParseError> {
        let mut coords = Vec::new();
        if tokens.empty_or_open()? {
            return Ok(coords);
        }
        loop {
            coords.push(self.read_coordinate(tokens, ordinates)?);
            if !tokens.comma_or_close()? {
                return Ok(coords);
            }
        }
    }

    fn read_point_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<Geometry, ParseError> {
        if tokens.empty_or_open()? {
            return Ok(self.factory.create_point(None));
        }
        let c = self.read_coordinate(tokens, ordinates)?;
        tokens.expect_close()?;
        Ok(self.factory.create_point(Some(c)))
    }

    fn read_line_string_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<LineString, ParseError> {
        let coords = self.read_coordinates_text(tokens, ordinates)?;
        Ok(self.factory.create_line_string(coords)?)
    }

    fn read_circular_string_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<CircularString, ParseError> {
        let coords = self.read_coordinates_text(tokens, ordinates)?;
        Ok(self.factory.create_circular_string(coords)?)
    }

    fn read_polygon_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<Polygon, ParseError> {
        if tokens.empty_or_open()? {
            return Ok(Polygon::empty());
        }
        let mut rings = Vec::new();
        loop {
            rings.push(LineString(self.read_coordinates_text(tokens, ordinates)?));
            if !tokens.comma_or_close()? {
                break;
            }
        }
        let holes = rings.split_off(1);
        let shell = rings.pop().unwrap_or_default();
        Ok(self.factory.create_polygon(shell, holes)?)
    }

    /// Reads a bare coordinate list as a linear string, or a tagged
    /// `CIRCULARSTRING` / `COMPOUNDCURVE`.
    fn read_curve_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
        allow_compound: bool,
    ) -> Result<Curve, ParseError> {
        match tokens.peek()? {
            Token::Open => Ok(Curve::LineString(self.read_line_string_text(tokens, ordinates)?)),
            Token::Word(word) if word == EMPTY => Ok(Curve::LineString(self.read_line_string_text(tokens, ordinates)?)),
            Token::Word(word) if word == "CIRCULARSTRING" => {
                tokens.next()?;
                let ordinates = tokens.ordinate_tag()?.or(ordinates);
                Ok(Curve::CircularString(self.read_circular_string_text(tokens, ordinates)?))
            }
            Token::Word(word) if word == "COMPOUNDCURVE" => {
                if !allow_compound {
                    return Err(ParseError::NotAllowed("COMPOUNDCURVE"));
                }
                tokens.next()?;
                let ordinates = tokens.ordinate_tag()?.or(ordinates);
                Ok(Curve::CompoundCurve(self.read_compound_curve_text(tokens, ordinates)?))
            }
            _ => Err(tokens.unexpected("a curve")),
        }
    }

    fn read_compound_curve_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<CompoundCurve, ParseError> {
        let mut segments = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                let segment = match self.read_curve_text(tokens, ordinates, false)? {
                    Curve::LineString(line) => Segment::Line(line),
                    Curve::CircularString(arc) => Segment::Arc(arc),
                    Curve::CompoundCurve(_) => return Err(ParseError::NotAllowed("COMPOUNDCURVE")),
                };
                segments.push(segment);
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        Ok(self.factory.create_compound_curve(segments)?)
    }

    fn read_curve_polygon_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<CurvePolygon, ParseError> {
        if tokens.empty_or_open()? {
            return Ok(CurvePolygon::empty(*self.factory.params()));
        }
        let shell = self.read_curve_text(tokens, ordinates, true)?;
        let mut holes = Vec::new();
        while tokens.comma_or_close()? {
            holes.push(self.read_curve_text(tokens, ordinates, true)?);
        }
        Ok(self.factory.create_curve_polygon(shell, holes)?)
    }

    fn read_multi_point_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<MultiPoint, ParseError> {
        let mut points = Vec::new();
        if tokens.empty_or_open()? {
            return Ok(self.factory.create_multi_point(points));
        }
        loop {
            // Members may be parenthesised, bare, or EMPTY (dropped).
            match tokens.peek()? {
                Token::Open => {
                    tokens.next()?;
                    points.push(self.read_coordinate(tokens, ordinates)?);
                    tokens.expect_close()?;
                }
                Token::Word(word) if word == EMPTY => {
                    tokens.next()?;
                }
                _ => points.push(self.read_coordinate(tokens, ordinates)?),
            }
            if !tokens.comma_or_close()? {
                return Ok(self.factory.create_multi_point(points));
            }
        }
    }

    fn read_multi_line_string_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<MultiLineString, ParseError> {
        let mut lines = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                lines.push(self.read_line_string_text(tokens, ordinates)?);
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        Ok(self.factory.create_multi_line_string(lines))
    }

    fn read_multi_curve_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<MultiCurve, ParseError> {
        let mut curves = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                curves.push(Geometry::from(self.read_curve_text(tokens, ordinates, true)?));
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        Ok(self.factory.create_multi_curve(curves)?)
    }

    fn read_multi_polygon_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<MultiPolygon, ParseError> {
        let mut polygons = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                polygons.push(self.read_polygon_text(tokens, ordinates)?);
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        Ok(self.factory.create_multi_polygon(polygons))
    }

    fn read_multi_surface_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<MultiSurface, ParseError> {
        let mut surfaces = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                let surface = match tokens.peek()? {
                    Token::Open => Geometry::Polygon(self.read_polygon_text(tokens, ordinates)?),
                    Token::Word(word) if word == EMPTY => Geometry::Polygon(self.read_polygon_text(tokens, ordinates)?),
                    Token::Word(word) if word == "CURVEPOLYGON" => {
                        tokens.next()?;
                        let ordinates = tokens.ordinate_tag()?.or(ordinates);
                        Geometry::CurvePolygon(self.read_curve_polygon_text(tokens, ordinates)?)
                    }
                    _ => return Err(tokens.unexpected("a polygon or CURVEPOLYGON")),
                };
                surfaces.push(surface);
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        Ok(self.factory.create_multi_surface(surfaces)?)
    }

    fn read_collection_text<I: Iterator<Item = char>>(
        &self,
        tokens: &mut Tokens<I>,
        ordinates: Option<Ordinates>,
    ) -> Result<GeometryCollection, ParseError> {
        if tokens.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                position: tokens.position()?,
                limit: MAX_NESTING_DEPTH,
            });
        }
        tokens.depth += 1;
        let mut members = Vec::new();
        if !tokens.empty_or_open()? {
            loop {
                members.push(self.read_tagged(tokens, ordinates)?);
                if !tokens.comma_or_close()? {
                    break;
                }
            }
        }
        tokens.depth -= 1;
        Ok(self.factory.create_geometry_collection(members))
    }
}

/// Parses well-known text with a default [`CurveFactory`].
///
/// # Errors
///
/// See [`WktReader::read`].
pub fn read_wkt(text: &str) -> Result<Geometry, ParseError> {
    WktReader::default().read(text)
}

/// Writes geometries as well-known text.
///
/// Numbers use the shortest representation that reads back to the same
/// value unless a fixed number of decimals is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WktWriter {
    decimals: Option<usize>,
}

impl WktWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds every ordinate to `decimals` places, dropping trailing zeros.
    #[must_use]
    pub fn with_decimals(self, decimals: usize) -> Self {
        Self {
            decimals: Some(decimals),
        }
    }

    #[must_use]
    pub fn write(&self, geometry: &Geometry) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out, geometry);
        out
    }

    /// Writes `geometry` into any formatter sink.
    ///
    /// # Errors
    ///
    /// Propagates errors from the sink.
    pub fn write_to(&self, out: &mut impl fmt::Write, geometry: &Geometry) -> fmt::Result {
        trace!(kind = geometry.type_name(), "writing WKT");
        self.write_tagged(out, geometry, geometry.ordinates(), true)
    }

    fn write_tagged(
        &self,
        out: &mut dyn fmt::Write,
        geometry: &Geometry,
        ordinates: Ordinates,
        with_tag: bool,
    ) -> fmt::Result {
        out.write_str(&geometry.type_name().to_ascii_uppercase())?;
        if with_tag {
            match (ordinates.z, ordinates.m) {
                (true, true) => out.write_str(" ZM")?,
                (true, false) => out.write_str(" Z")?,
                (false, true) => out.write_str(" M")?,
                (false, false) => {}
            }
        }
        out.write_char(' ')?;

        match geometry {
            Geometry::Point(None) => out.write_str(EMPTY),
            Geometry::Point(Some(c)) => {
                out.write_char('(')?;
                self.write_coordinate(out, c, ordinates)?;
                out.write_char(')')
            }
            Geometry::LineString(line) => self.write_coordinates(out, line.coords(), ordinates),
            Geometry::CircularString(cs) => self.write_coordinates(out, cs.coords(), ordinates),
            Geometry::CompoundCurve(cc) => self.write_compound_curve_text(out, cc, ordinates),
            Geometry::Polygon(polygon) => self.write_polygon_text(out, polygon, ordinates),
            Geometry::CurvePolygon(cp) => self.write_curve_polygon_text(out, cp, ordinates),
            Geometry::MultiPoint(mp) => self.write_list(out, &mp.0, |w, out, c| {
                out.write_char('(')?;
                w.write_coordinate(out, c, ordinates)?;
                out.write_char(')')
            }),
            Geometry::MultiLineString(ml) => {
                self.write_list(out, &ml.0, |w, out, line| w.write_coordinates(out, line.coords(), ordinates))
            }
            Geometry::MultiCurve(mc) => {
                self.write_list(out, mc.members(), |w, out, curve| w.write_curve_text(out, curve, ordinates))
            }
            Geometry::MultiPolygon(mp) => {
                self.write_list(out, &mp.0, |w, out, polygon| w.write_polygon_text(out, polygon, ordinates))
            }
            Geometry::MultiSurface(ms) => self.write_list(out, ms.members(), |w, out, surface| match surface {
                Surface::Polygon(polygon) => w.write_polygon_text(out, polygon, ordinates),
                Surface::CurvePolygon(cp) => {
                    out.write_str("CURVEPOLYGON ")?;
                    w.write_curve_polygon_text(out, cp, ordinates)
                }
            }),
            Geometry::GeometryCollection(gc) => {
                self.write_list(out, &gc.0, |w, out, member| w.write_tagged(out, member, ordinates, false))
            }
        }
    }

    fn write_list<T>(
        &self,
        out: &mut dyn fmt::Write,
        items: &[T],
        mut write_item: impl FnMut(&Self, &mut dyn fmt::Write, &T) -> fmt::Result,
    ) -> fmt::Result {
        if items.is_empty() {
            return out.write_str(EMPTY);
        }
        out.write_char('(')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            write_item(self, out, item)?;
        }
        out.write_char(')')
    }

    fn write_number(&self, out: &mut dyn fmt::Write, value: f64) -> fmt::Result {
        let Some(decimals) = self.decimals else {
            return write!(out, "{value}");
        };
        let text = format!("{value:.decimals$}");
        let text = if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.')
        } else {
            text.as_str()
        };
        if text == "-0" {
            out.write_char('0')
        } else {
            out.write_str(text)
        }
    }

    fn write_coordinate(&self, out: &mut dyn fmt::Write, c: &Coordinate, ordinates: Ordinates) -> fmt::Result {
        let c = c.with_ordinates(ordinates);
        self.write_number(out, c.x)?;
        out.write_char(' ')?;
        self.write_number(out, c.y)?;
        for value in [c.z, c.m].into_iter().flatten() {
            out.write_char(' ')?;
            self.write_number(out, value)?;
        }
        Ok(())
    }

    fn write_coordinates(&self, out: &mut dyn fmt::Write, coords: &[Coordinate], ordinates: Ordinates) -> fmt::Result {
        self.write_list(out, coords, |w, out, c| w.write_coordinate(out, c, ordinates))
    }

    fn write_curve_text(&self, out: &mut dyn fmt::Write, curve: &Curve, ordinates: Ordinates) -> fmt::Result {
        match curve {
            Curve::LineString(line) => self.write_coordinates(out, line.coords(), ordinates),
            Curve::CircularString(cs) => {
                out.write_str("CIRCULARSTRING ")?;
                self.write_coordinates(out, cs.coords(), ordinates)
            }
            Curve::CompoundCurve(cc) => {
                out.write_str("COMPOUNDCURVE ")?;
                self.write_compound_curve_text(out, cc, ordinates)
            }
        }
    }

    fn write_compound_curve_text(
        &self,
        out: &mut dyn fmt::Write,
        cc: &CompoundCurve,
        ordinates: Ordinates,
    ) -> fmt::Result {
        self.write_list(out, cc.segments(), |w, out, segment| match segment {
            Segment::Line(line) => w.write_coordinates(out, line.coords(), ordinates),
            Segment::Arc(arc) => {
                out.write_str("CIRCULARSTRING ")?;
                w.write_coordinates(out, arc.coords(), ordinates)
            }
        })
    }

    fn write_polygon_text(&self, out: &mut dyn fmt::Write, polygon: &Polygon, ordinates: Ordinates) -> fmt::Result {
        if polygon.is_empty() {
            return out.write_str(EMPTY);
        }
        let rings: Vec<&LineString> = polygon.rings().collect();
        self.write_list(out, &rings, |w, out, ring| w.write_coordinates(out, ring.coords(), ordinates))
    }

    fn write_curve_polygon_text(
        &self,
        out: &mut dyn fmt::Write,
        cp: &CurvePolygon,
        ordinates: Ordinates,
    ) -> fmt::Result {
        if cp.is_empty() {
            return out.write_str(EMPTY);
        }
        let rings: Vec<&Curve> = cp.rings().collect();
        self.write_list(out, &rings, |w, out, ring| w.write_curve_text(out, ring, ordinates))
    }
}

/// Formats a geometry as well-known text.
#[must_use]
pub fn to_wkt(geometry: &Geometry) -> String {
    WktWriter::new().write(geometry)
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        WktWriter::new().write_to(f, self)
    }
}
