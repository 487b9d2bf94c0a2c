//! Geometry primitive: [`Position`].
//!
//! Positions address grid cells as `(row, col)`. Rows grow downwards and
//! columns grow to the right.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A grid cell address `(row, col)`.
///
/// Ordering is lexicographic: first by row, then by column. Search frontiers
/// rely on this ordering to break ties deterministically.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { row: 0, col: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Return a position shifted by (drow, dcol).
    #[inline]
    pub const fn shift(self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// The four orthogonal neighbours, in east, west, south, north order.
    #[inline]
    pub const fn neighbors_4(self) -> [Position; 4] {
        [
            self.shift(0, 1),
            self.shift(0, -1),
            self.shift(1, 0),
            self.shift(-1, 0),
        ]
    }

    /// Whether `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent(self, other: Position) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (i32, i32) {
    fn from(p: Position) -> Self {
        (p.row, p.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Add for Position {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Position {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.row - rhs.row, self.col - rhs.col)
    }
}
