//! Axis-aligned wire segments.

use std::fmt;

use circa_core::{EditError, Location};

/// Orientation of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Constant `y`.
    Horizontal,
    /// Constant `x`.
    Vertical,
}

/// An axis-aligned wire segment between two distinct grid points.
///
/// Endpoints are stored in [`Location`] order, so `e0 < e1` always holds
/// and two wires covering the same span compare equal regardless of the
/// order they were drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wire {
    e0: Location,
    e1: Location,
}

impl Wire {
    /// Create a wire between `a` and `b`.
    ///
    /// Fails if the endpoints coincide or share neither a row nor a column.
    pub fn new(a: Location, b: Location) -> Result<Self, EditError> {
        if a == b {
            return Err(EditError::DegenerateWire { at: a });
        }
        if a.x != b.x && a.y != b.y {
            return Err(EditError::DiagonalWire { from: a, to: b });
        }
        Ok(Self::between(a, b))
    }

    /// Wire from raw coordinates. Panics on invalid input; intended for
    /// fixtures and tests.
    pub fn from_coords(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        match Self::new(Location::new(x0, y0), Location::new(x1, y1)) {
            Ok(w) => w,
            Err(e) => panic!("{e}"),
        }
    }

    /// Caller guarantees `a != b` and axis alignment.
    pub(crate) fn between(a: Location, b: Location) -> Self {
        debug_assert!(a != b && (a.x == b.x || a.y == b.y));
        if a < b {
            Self { e0: a, e1: b }
        } else {
            Self { e0: b, e1: a }
        }
    }

    /// Wire on line `line` of `axis` spanning `[lo, hi]` along the axis.
    pub(crate) fn from_span(axis: Axis, line: i32, lo: i32, hi: i32) -> Self {
        match axis {
            Axis::Horizontal => Self::between(Location::new(lo, line), Location::new(hi, line)),
            Axis::Vertical => Self::between(Location::new(line, lo), Location::new(line, hi)),
        }
    }

    /// Lower endpoint.
    pub fn e0(&self) -> Location {
        self.e0
    }

    /// Upper endpoint.
    pub fn e1(&self) -> Location {
        self.e1
    }

    /// Both endpoints, lower first.
    pub fn ends(&self) -> [Location; 2] {
        [self.e0, self.e1]
    }

    /// Orientation.
    pub fn axis(&self) -> Axis {
        if self.e0.y == self.e1.y {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Whether the wire runs horizontally.
    pub fn is_horizontal(&self) -> bool {
        self.axis() == Axis::Horizontal
    }

    /// Whether the wire runs vertically.
    pub fn is_vertical(&self) -> bool {
        self.axis() == Axis::Vertical
    }

    /// The fixed coordinate: `y` for horizontal wires, `x` for vertical.
    pub(crate) fn line(&self) -> i32 {
        match self.axis() {
            Axis::Horizontal => self.e0.y,
            Axis::Vertical => self.e0.x,
        }
    }

    /// `(axis, line)`, identical for all collinear wires.
    pub(crate) fn line_key(&self) -> (Axis, i32) {
        (self.axis(), self.line())
    }

    /// Covered interval along the axis.
    pub(crate) fn span(&self) -> (i32, i32) {
        match self.axis() {
            Axis::Horizontal => (self.e0.x, self.e1.x),
            Axis::Vertical => (self.e0.y, self.e1.y),
        }
    }

    /// Position of `loc` along this wire's axis.
    pub(crate) fn coord_of(&self, loc: Location) -> i32 {
        match self.axis() {
            Axis::Horizontal => loc.x,
            Axis::Vertical => loc.y,
        }
    }

    /// Length in grid units.
    pub fn length(&self) -> u32 {
        self.e0.manhattan_distance_to(self.e1)
    }

    /// Whether `loc` is one of the endpoints.
    pub fn ends_at(&self, loc: Location) -> bool {
        self.e0 == loc || self.e1 == loc
    }

    /// The endpoint opposite `loc`. `loc` must be an endpoint.
    pub fn other_end(&self, loc: Location) -> Location {
        if self.e0 == loc {
            self.e1
        } else {
            self.e0
        }
    }

    /// Whether `loc` lies on the segment, endpoints included.
    pub fn contains(&self, loc: Location) -> bool {
        match self.axis() {
            Axis::Horizontal => loc.y == self.e0.y && self.e0.x <= loc.x && loc.x <= self.e1.x,
            Axis::Vertical => loc.x == self.e0.x && self.e0.y <= loc.y && loc.y <= self.e1.y,
        }
    }

    /// Whether `loc` lies strictly between the endpoints.
    pub fn contains_interior(&self, loc: Location) -> bool {
        self.contains(loc) && !self.ends_at(loc)
    }

    /// Same axis and same line.
    pub fn is_collinear(&self, other: &Wire) -> bool {
        self.line_key() == other.line_key()
    }

    /// Collinear and sharing more than a single point.
    pub fn overlaps(&self, other: &Wire) -> bool {
        if !self.is_collinear(other) {
            return false;
        }
        let (a0, a1) = self.span();
        let (b0, b1) = other.span();
        a0.max(b0) < a1.min(b1)
    }

    /// The single endpoint shared with `other`, if they meet end to end
    /// and do not otherwise overlap.
    pub fn shared_end(&self, other: &Wire) -> Option<Location> {
        if self == other || self.overlaps(other) {
            return None;
        }
        self.ends().into_iter().find(|&e| other.ends_at(e))
    }

    /// Pieces on either side of an interior point, or `None` when `loc`
    /// is not strictly inside the wire.
    pub fn split_at(&self, loc: Location) -> Option<(Wire, Wire)> {
        self.contains_interior(loc)
            .then(|| (Self::between(self.e0, loc), Self::between(loc, self.e1)))
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.e0, self.e1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_normalised() {
        let a = Wire::from_coords(30, 10, 10, 10);
        let b = Wire::from_coords(10, 10, 30, 10);
        assert_eq!(a, b);
        assert_eq!(a.e0(), Location::new(10, 10));
        assert_eq!(a.length(), 20);
    }

    #[test]
    fn rejects_diagonal_and_degenerate() {
        let p = Location::new(0, 0);
        assert_eq!(
            Wire::new(p, Location::new(10, 10)),
            Err(EditError::DiagonalWire {
                from: p,
                to: Location::new(10, 10)
            })
        );
        assert_eq!(Wire::new(p, p), Err(EditError::DegenerateWire { at: p }));
    }

    #[test]
    fn overlap_and_shared_end() {
        let a = Wire::from_coords(0, 0, 20, 0);
        let b = Wire::from_coords(10, 0, 30, 0);
        let c = Wire::from_coords(20, 0, 40, 0);
        let d = Wire::from_coords(20, 0, 20, 30);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.shared_end(&c), Some(Location::new(20, 0)));
        assert_eq!(a.shared_end(&b), None);
        assert!(!a.is_collinear(&d));
        assert_eq!(a.shared_end(&d), Some(Location::new(20, 0)));
    }

    #[test]
    fn split_only_inside() {
        let w = Wire::from_coords(0, 0, 0, 30);
        let (lo, hi) = w.split_at(Location::new(0, 10)).unwrap();
        assert_eq!(lo, Wire::from_coords(0, 0, 0, 10));
        assert_eq!(hi, Wire::from_coords(0, 10, 0, 30));
        assert!(w.split_at(Location::new(0, 0)).is_none());
        assert!(w.split_at(Location::new(5, 10)).is_none());
    }
}
