//! [`Route`]: an ordered sequence of positions from source to destination.

use std::fmt;
use std::ops::Index;

use rand::{Rng, RngExt};

use crate::geom::Position;

/// Ordered positions, source first.
///
/// A route produced by a search is either empty (no path exists) or starts
/// at the source and ends at the destination with every consecutive pair one
/// orthogonal step apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route(Vec<Position>);

impl Route {
    /// Wrap positions without any checks.
    pub fn new(positions: Vec<Position>) -> Self {
        Self(positions)
    }

    /// The empty route, used to signal that no path exists.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap positions, requiring at least two of them and orthogonal
    /// single-step contiguity.
    pub fn validated(positions: Vec<Position>) -> Result<Self, RouteError> {
        if positions.len() < 2 {
            return Err(RouteError::TooShort {
                len: positions.len(),
            });
        }
        if let Some(index) = first_gap(&positions) {
            return Err(RouteError::NotContiguous { index });
        }
        Ok(Self(positions))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    #[inline]
    pub fn first(&self) -> Option<Position> {
        self.0.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<Position> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Position> {
        self.0
    }

    /// Whether every consecutive pair differs by one unit along one axis.
    ///
    /// Empty and single-position routes are trivially contiguous.
    pub fn is_contiguous(&self) -> bool {
        first_gap(&self.0).is_none()
    }

    /// Pick a random contiguous slice of this route.
    ///
    /// The slice length is drawn uniformly from `min_len..=max_len` and its
    /// start uniformly among the offsets where it fits. Requires
    /// `0 < min_len < max_len < self.len()`.
    pub fn sample_subroute(
        &self,
        min_len: usize,
        max_len: usize,
        rng: &mut impl Rng,
    ) -> Result<Route, RouteError> {
        if !(0 < min_len && min_len < max_len && max_len < self.len()) {
            return Err(RouteError::InvalidSampleRange {
                min_len,
                max_len,
                len: self.len(),
            });
        }
        let sub_len = rng.random_range(min_len..=max_len);
        let start = rng.random_range(0..=self.len() - sub_len);
        Ok(Route(self.0[start..start + sub_len].to_vec()))
    }
}

/// Index of the first position that is not one step from its predecessor.
fn first_gap(positions: &[Position]) -> Option<usize> {
    positions
        .windows(2)
        .position(|w| !w[0].is_adjacent(w[1]))
        .map(|i| i + 1)
}

impl From<Vec<Position>> for Route {
    fn from(v: Vec<Position>) -> Self {
        Self(v)
    }
}

impl Index<usize> for Route {
    type Output = Position;

    fn index(&self, i: usize) -> &Position {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Route {
    type Item = Position;
    type IntoIter = std::vec::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

/// Errors raised by route validation and sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Fewer than two positions.
    TooShort { len: usize },
    /// Position `index` is not one orthogonal step from position `index - 1`.
    NotContiguous { index: usize },
    /// Sampling bounds violate `0 < min_len < max_len < len`.
    InvalidSampleRange {
        min_len: usize,
        max_len: usize,
        len: usize,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "route: needs at least 2 positions, got {len}"),
            Self::NotContiguous { index } => {
                write!(f, "route: gap between positions {} and {index}", index - 1)
            }
            Self::InvalidSampleRange {
                min_len,
                max_len,
                len,
            } => write!(
                f,
                "route: sample range {min_len}..={max_len} invalid for route of length {len}"
            ),
        }
    }
}

impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn line(n: i32) -> Route {
        Route::new((0..n).map(|c| Position::new(0, c)).collect())
    }

    #[test]
    fn validated_accepts_contiguous() {
        let r = Route::validated(vec![
            Position::new(0, 0),
            Position::new(0, 1),
            Position::new(1, 1),
        ])
        .unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(r.first(), Some(Position::new(0, 0)));
        assert_eq!(r.last(), Some(Position::new(1, 1)));
        assert_eq!(r.into_vec()[1], Position::new(0, 1));
    }

    #[test]
    fn validated_rejects_gaps_and_short() {
        assert_eq!(
            Route::validated(vec![Position::new(0, 0)]),
            Err(RouteError::TooShort { len: 1 })
        );
        assert_eq!(
            Route::validated(vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 2),
            ]),
            Err(RouteError::NotContiguous { index: 2 })
        );
        // Repeated positions are not a step.
        assert!(Route::validated(vec![Position::new(0, 0), Position::new(0, 0)]).is_err());
    }

    #[test]
    fn contiguity_of_trivial_routes() {
        assert!(Route::empty().is_contiguous());
        assert!(Route::new(vec![Position::new(4, 4)]).is_contiguous());
        assert!(line(5).is_contiguous());
    }

    #[test]
    fn sample_subroute_within_bounds() {
        let r = line(20);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let sub = r.sample_subroute(3, 8, &mut rng).unwrap();
            assert!((3..=8).contains(&sub.len()));
            assert!(sub.is_contiguous());
            let start = r.positions().iter().position(|&p| p == sub[0]).unwrap();
            assert_eq!(&r.positions()[start..start + sub.len()], sub.positions());
        }
    }

    #[test]
    fn sample_subroute_rejects_bad_range() {
        let r = line(5);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(r.sample_subroute(0, 3, &mut rng).is_err());
        assert!(r.sample_subroute(3, 3, &mut rng).is_err());
        assert_eq!(
            r.sample_subroute(2, 5, &mut rng),
            Err(RouteError::InvalidSampleRange {
                min_len: 2,
                max_len: 5,
                len: 5
            })
        );
    }

    #[test]
    fn sample_subroute_trimming_both_ends() {
        let mut rng = StdRng::seed_from_u64(3);
        // Trimming two cells from each end needs at least five cells.
        assert!(line(4).sample_subroute(2, 4 - 2, &mut rng).is_err());
        let sub = line(5).sample_subroute(2, 5 - 2, &mut rng).unwrap();
        assert!((2..=3).contains(&sub.len()));
    }

    #[test]
    fn display() {
        assert_eq!(line(2).to_string(), "[(0, 0) -> (0, 1)]");
        assert_eq!(Route::empty().to_string(), "[]");
    }
}
