use geo::algorithm::line_intersection::{line_intersection, LineIntersection};

use crate::math::{ordinates_of, Coordinate, Envelope, Ordinates};

/// A polyline of straight segments between consecutive coordinates.
///
/// Used both as a straight curve member and as the result of flattening a
/// curve. Unlike `geo::LineString` it keeps Z and M ordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString(pub Vec<Coordinate>);

impl LineString {
    #[must_use]
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self(coords)
    }

    /// The empty line.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn coords(&self) -> &[Coordinate] {
        &self.0
    }

    #[must_use]
    pub fn into_coords(self) -> Vec<Coordinate> {
        self.0
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Coordinate> {
        self.0.first().copied()
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Coordinate> {
        self.0.last().copied()
    }

    #[must_use]
    pub fn ordinates(&self) -> Ordinates {
        ordinates_of(&self.0)
    }

    /// Whether the first and last coordinates coincide in X and Y.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// Sum of the segment lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::from_coords(&self.0)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    /// Whether the line has no self-intersections other than shared vertices
    /// of consecutive segments (and the closing vertex of a closed line).
    #[must_use]
    pub fn is_simple(&self) -> bool {
        let mut points: Vec<Coordinate> = Vec::with_capacity(self.0.len());
        for c in &self.0 {
            if points.last().is_none_or(|last: &Coordinate| !last.equals_2d(c)) {
                points.push(*c);
            }
        }
        let segments: Vec<geo::Line<f64>> = points
            .windows(2)
            .map(|w| geo::Line::new(w[0], w[1]))
            .collect();
        let envelopes: Vec<Envelope> = points
            .windows(2)
            .map(|w| Envelope::from_coords(w))
            .collect();

        let closed = self.is_closed();
        let n = segments.len();
        // Sweep over segments ordered by their left edge; only segments whose
        // x ranges overlap are tested against each other.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| envelopes[a].min_x().total_cmp(&envelopes[b].min_x()));
        for (pos, &a) in order.iter().enumerate() {
            for &b in &order[pos + 1..] {
                if envelopes[b].min_x() > envelopes[a].max_x() {
                    break;
                }
                if !overlaps(&envelopes[a], &envelopes[b]) {
                    continue;
                }
                if !meet_only_at_joint(&segments, a.min(b), a.max(b), closed) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether the line is a valid linear ring: empty, or closed, simple and
    /// made of at least four points.
    #[must_use]
    pub fn is_ring(&self) -> bool {
        self.is_empty() || (self.0.len() >= 4 && self.is_closed() && self.is_simple())
    }

    /// Coordinate-wise equality of X and Y within `tolerance`.
    #[must_use]
    pub fn equals_exact(&self, other: &Self, tolerance: f64) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| a.equals_2d_within(b, tolerance))
    }

    /// Converts to a 2D `geo` line string.
    #[must_use]
    pub fn to_geo(&self) -> geo::LineString<f64> {
        self.0.iter().map(|c| geo::Coord::from(*c)).collect()
    }
}

/// Whether segments `i < j` are disjoint or touch only at the vertex they
/// share as neighbours (including the closing vertex of a closed line).
fn meet_only_at_joint(segments: &[geo::Line<f64>], i: usize, j: usize, closed: bool) -> bool {
    let n = segments.len();
    let next = j == i + 1;
    let wraps = closed && i == 0 && j == n - 1 && n > 2;
    match line_intersection(segments[i], segments[j]) {
        None => true,
        Some(LineIntersection::SinglePoint { intersection, .. }) if next || wraps => {
            let shared = if next { segments[i].end } else { segments[i].start };
            intersection == shared
        }
        Some(_) => false,
    }
}

fn overlaps(a: &Envelope, b: &Envelope) -> bool {
    a.min_x() <= b.max_x() && b.min_x() <= a.max_x() && a.min_y() <= b.max_y() && b.min_y() <= a.max_y()
}

impl From<Vec<Coordinate>> for LineString {
    fn from(coords: Vec<Coordinate>) -> Self {
        Self(coords)
    }
}

impl From<&geo::LineString<f64>> for LineString {
    fn from(line: &geo::LineString<f64>) -> Self {
        Self(line.0.iter().map(|c| Coordinate::from(*c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> LineString {
        LineString(points.iter().map(|&p| Coordinate::from(p)).collect())
    }

    #[test]
    fn length_3_4_5() {
        let l = line(&[(0.0, 0.0), (3.0, 4.0)]);
        assert!((l.length() - 5.0).abs() < 1e-12);
        assert!(!l.is_closed());
    }

    #[test]
    fn square_ring_is_simple() {
        let ring = line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(ring.is_closed());
        assert!(ring.is_simple());
        assert!(ring.is_ring());
    }

    #[test]
    fn bow_tie_is_not_simple() {
        let bow = line(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(!bow.is_simple());
        assert!(!bow.is_ring());
    }

    #[test]
    fn backtracking_is_not_simple() {
        let back = line(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)]);
        assert!(!back.is_simple());
    }

    #[test]
    fn straight_continuation_is_simple() {
        let straight = line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(straight.is_simple());
    }

    #[test]
    fn unclosed_or_short_rings_are_rejected() {
        assert!(!line(&[(0.0, 5.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]).is_ring());
        assert!(!line(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]).is_ring());
        assert!(LineString::empty().is_ring());
    }

    #[test]
    fn fine_rings_are_checked_end_to_end() {
        let n: u32 = 2000;
        let mut points: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let a = std::f64::consts::TAU * f64::from(k) / f64::from(n);
                (a.cos(), a.sin())
            })
            .collect();
        points.push(points[0]);
        assert!(line(&points).is_ring());

        // Drag the top vertex below the circle so its segments cross the far side.
        points[500] = (0.0, -1.5);
        assert!(!line(&points).is_simple());
    }

    #[test]
    fn converts_to_geo() {
        let l = line(&[(0.0, 0.0), (1.0, 2.0)]);
        let g = l.to_geo();
        assert_eq!(g.0.len(), 2);
        assert!((g.0[1].y - 2.0).abs() < f64::EPSILON);
        assert_eq!(LineString::from(&g), l);
    }
}
