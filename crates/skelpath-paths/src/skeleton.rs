//! Iterative skeleton refinement: alternate A* search with a thinning pass
//! that erodes redundant free cells, until the corridor around the route is
//! one cell wide.
//!
//! Each round searches the grid *before* that round's erosion. The route
//! returned is the one found in the last round, and no erosion follows it.
//!
//! # Erosion rule
//!
//! A free cell that is neither endpoint is examined through its 3×3
//! neighbourhood. With all four orthogonal neighbours free it is kept; with
//! all four blocked it is eroded. Otherwise `X` is the first blocked side in
//! the order north, south, west, east, `X'` its opposite, and `P`, `Q` the two
//! sides perpendicular to it. The first matching case decides:
//!
//! | # | blocked                                   | result |
//! |---|-------------------------------------------|--------|
//! | 1 | `P` and `Q`                               | erode  |
//! | 2 | `X'` and `P`                              | erode  |
//! | 3 | `X'` and `Q`                              | erode  |
//! | 4 | `P` and the `X'`-side corner next to `Q`  | keep   |
//! | 5 | `Q` and the `X'`-side corner next to `P`  | keep   |
//! | 6 | `P`                                       | erode  |
//! | 7 | `Q`                                       | erode  |
//! | 8 | `X'` or either `X'`-side corner           | keep   |
//! | 9 | otherwise                                 | erode  |
//!
//! The same table serves all four orientations of `X`.

use std::borrow::Cow;

use skelpath_core::{CellState, GridError, OccupancyGrid, Position, Route};

use crate::PathError;
use crate::astar::search;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the four orthogonal neighbours of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
    West,
    East,
}

impl Side {
    /// Order in which sides are tested when choosing the blocked side.
    pub const PRIORITY: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    /// `(drow, dcol)` offset of this side.
    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Side::North => (-1, 0),
            Side::South => (1, 0),
            Side::West => (0, -1),
            Side::East => (0, 1),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::South => Side::North,
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }

    /// The two sides perpendicular to this one, as `(P, Q)`.
    #[inline]
    pub const fn perpendicular(self) -> (Side, Side) {
        match self {
            Side::North | Side::South => (Side::West, Side::East),
            Side::West | Side::East => (Side::North, Side::South),
        }
    }
}

// ---------------------------------------------------------------------------
// Neighborhood / decision
// ---------------------------------------------------------------------------

/// Outcome of the erosion rule for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Erosion {
    Keep,
    Erode,
}

/// Blocked flags of the 3×3 window centred on a candidate cell.
///
/// `blocked[r][c]` refers to offset `(r - 1, c - 1)` from the centre. The
/// centre flag is ignored by the rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    blocked: [[bool; 3]; 3],
}

impl Neighborhood {
    pub const fn new(blocked: [[bool; 3]; 3]) -> Self {
        Self { blocked }
    }

    /// Snapshot the window around `center`.
    ///
    /// Reads use the grid's wrap-around indexing, so a centre on row 0 sees
    /// the last row as its northern neighbour (and likewise for column 0).
    pub fn from_grid(grid: &OccupancyGrid, center: Position) -> Result<Self, GridError> {
        let mut blocked = [[false; 3]; 3];
        for (r, row) in blocked.iter_mut().enumerate() {
            for (c, b) in row.iter_mut().enumerate() {
                let p = center.shift(r as i32 - 1, c as i32 - 1);
                *b = grid.is_blocked(p)?;
            }
        }
        Ok(Self { blocked })
    }

    #[inline]
    fn at(&self, drow: i32, dcol: i32) -> bool {
        self.blocked[(drow + 1) as usize][(dcol + 1) as usize]
    }

    /// Whether the neighbour on side `s` is blocked.
    #[inline]
    pub fn side(&self, s: Side) -> bool {
        let (dr, dc) = s.offset();
        self.at(dr, dc)
    }

    /// Whether the diagonal corner between sides `a` and `b` is blocked.
    /// `a` and `b` must be perpendicular.
    #[inline]
    pub fn corner(&self, a: Side, b: Side) -> bool {
        let (ar, ac) = a.offset();
        let (br, bc) = b.offset();
        self.at(ar + br, ac + bc)
    }

    /// Rotate the window a quarter turn clockwise.
    pub fn rotate_cw(&self) -> Self {
        let mut blocked = [[false; 3]; 3];
        for (r, row) in self.blocked.iter().enumerate() {
            for (c, &b) in row.iter().enumerate() {
                blocked[c][2 - r] = b;
            }
        }
        Self { blocked }
    }
}

/// Apply the erosion rule to one neighbourhood.
pub fn erosion_decision(n: &Neighborhood) -> Erosion {
    let Some(x) = Side::PRIORITY.into_iter().find(|&s| n.side(s)) else {
        // Interior of open space.
        return Erosion::Keep;
    };
    if Side::PRIORITY.iter().all(|&s| n.side(s)) {
        return Erosion::Erode;
    }

    let opp = x.opposite();
    let (p, q) = x.perpendicular();
    let (bp, bq, bo) = (n.side(p), n.side(q), n.side(opp));
    let corner_p = n.corner(opp, p);
    let corner_q = n.corner(opp, q);

    if (bp && bq) || (bo && bp) || (bo && bq) {
        Erosion::Erode
    } else if (bp && corner_q) || (bq && corner_p) {
        Erosion::Keep
    } else if bp || bq {
        Erosion::Erode
    } else if bo || corner_p || corner_q {
        Erosion::Keep
    } else {
        Erosion::Erode
    }
}

// ---------------------------------------------------------------------------
// Erosion pass
// ---------------------------------------------------------------------------

/// Run one erosion pass over `grid` and return the thinned successor.
///
/// Only cells with `row < n_rows - 1` and `col < n_cols - 1` are candidates;
/// the last row and column are never changed, and neither are `src` and
/// `dest`. Every decision reads `grid`, never the partially eroded result.
pub fn erode(
    grid: &OccupancyGrid,
    src: Position,
    dest: Position,
) -> Result<OccupancyGrid, GridError> {
    erode_counted(grid, src, dest).map(|(next, _)| next)
}

fn erode_counted(
    grid: &OccupancyGrid,
    src: Position,
    dest: Position,
) -> Result<(OccupancyGrid, usize), GridError> {
    let mut next = grid.clone();
    let mut eroded = 0;
    for i in 0..grid.n_rows().saturating_sub(1) {
        for j in 0..grid.n_cols().saturating_sub(1) {
            let p = Position::new(i as i32, j as i32);
            if p == src || p == dest || grid.at(p) != Some(CellState::Unblocked) {
                continue;
            }
            let n = Neighborhood::from_grid(grid, p)?;
            if erosion_decision(&n) == Erosion::Erode {
                next.set(p, CellState::Blocked)?;
                eroded += 1;
            }
        }
    }
    Ok((next, eroded))
}

// ---------------------------------------------------------------------------
// SkeletonRefiner
// ---------------------------------------------------------------------------

/// Configuration for iterative skeleton refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonRefiner {
    iterations: usize,
}

impl Default for SkeletonRefiner {
    fn default() -> Self {
        Self { iterations: 1 }
    }
}

/// Result of [`SkeletonRefiner::run`].
#[derive(Clone, Debug)]
pub struct Refinement<'g> {
    /// Route found in the last round (empty if none exists).
    pub route: Route,
    /// Grid state the route was searched on.
    pub grid: Cow<'g, OccupancyGrid>,
    /// Number of search rounds executed.
    pub rounds: usize,
}

enum Phase<'g> {
    Searching {
        round: usize,
        grid: Cow<'g, OccupancyGrid>,
    },
    Eroding {
        round: usize,
        grid: Cow<'g, OccupancyGrid>,
    },
    Done(Refinement<'g>),
}

impl SkeletonRefiner {
    /// Create a refiner running `iterations` search rounds (at least one).
    pub fn new(iterations: usize) -> Result<Self, PathError> {
        if iterations == 0 {
            return Err(PathError::InvalidIterations);
        }
        Ok(Self { iterations })
    }

    /// Builder-style setter for the number of rounds. Rejects 0 like
    /// [`SkeletonRefiner::new`].
    pub fn with_iterations(self, iterations: usize) -> Result<Self, PathError> {
        Self::new(iterations)
    }

    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Refine and return only the final route.
    pub fn refine(
        &self,
        grid: &OccupancyGrid,
        src: Position,
        dest: Position,
    ) -> Result<Route, PathError> {
        Ok(self.run(grid, src, dest)?.route)
    }

    /// Refine and return the final route together with the grid it was
    /// searched on.
    ///
    /// `grid` is never modified. An empty route in the last round is
    /// returned as is; an empty route in any earlier round aborts with
    /// [`PathError::NoPathMidRefinement`]. A refiner deserialized with zero
    /// iterations fails here with [`PathError::InvalidIterations`].
    pub fn run<'g>(
        &self,
        grid: &'g OccupancyGrid,
        src: Position,
        dest: Position,
    ) -> Result<Refinement<'g>, PathError> {
        if self.iterations == 0 {
            return Err(PathError::InvalidIterations);
        }

        let mut phase = Phase::Searching {
            round: 1,
            grid: Cow::Borrowed(grid),
        };
        loop {
            phase = match phase {
                Phase::Searching { round, grid } => {
                    let route = search(&grid, src, dest)?;
                    log::debug!(
                        "refine round {round}/{}: route of {} cells",
                        self.iterations,
                        route.len()
                    );
                    if round == self.iterations {
                        Phase::Done(Refinement {
                            route,
                            grid,
                            rounds: round,
                        })
                    } else if route.is_empty() {
                        return Err(PathError::NoPathMidRefinement { round });
                    } else {
                        Phase::Eroding { round, grid }
                    }
                }
                Phase::Eroding { round, grid } => {
                    let (next, eroded) = erode_counted(&grid, src, dest)?;
                    log::debug!("refine round {round}: eroded {eroded} cells");
                    Phase::Searching {
                        round: round + 1,
                        grid: Cow::Owned(next),
                    }
                }
                Phase::Done(refinement) => return Ok(refinement),
            };
        }
    }
}

/// Search `iterations` times from `src` to `dest`, eroding the grid between
/// rounds, and return the last round's route.
pub fn refine(
    grid: &OccupancyGrid,
    src: Position,
    dest: Position,
    iterations: usize,
) -> Result<Route, PathError> {
    SkeletonRefiner::new(iterations)?.refine(grid, src, dest)
}
