//! Integer grid locations.

use std::cmp::Ordering;
use std::fmt;

/// A point on the schematic grid.
///
/// Ordered by `y` first, then `x`, which gives the canonical row-major
/// iteration order used wherever determinism matters (bundle membership,
/// port ordering, split-location scans).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Location {
    /// Create a location.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This location shifted by `(dx, dy)`.
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan_distance_to(self, other: Location) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Location {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        let mut locs = vec![
            Location::new(30, 10),
            Location::new(10, 20),
            Location::new(20, 10),
        ];
        locs.sort();
        assert_eq!(
            locs,
            vec![
                Location::new(20, 10),
                Location::new(30, 10),
                Location::new(10, 20),
            ]
        );
    }

    #[test]
    fn translate_and_distance() {
        let a = Location::new(10, 10);
        let b = a.translate(-30, 20);
        assert_eq!(b, Location::new(-20, 30));
        assert_eq!(a.manhattan_distance_to(b), 50);
    }
}
