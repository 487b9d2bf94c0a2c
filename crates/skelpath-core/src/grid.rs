//! The [`OccupancyGrid`] type: a fixed-size 2D mask of [`CellState`]s.
//!
//! Cells are stored row-major in an owned buffer. Unlike a shared-buffer
//! view, cloning an `OccupancyGrid` yields an independent deep copy, which is
//! what successive refinement rounds need.
//!
//! # Index wrap-around
//!
//! [`get`](OccupancyGrid::get), [`set`](OccupancyGrid::set) and the
//! `all_*`/`is_*` queries accept negative indices with array-wrap semantics:
//! on an axis of length `n`, any index in `[-n, n)` is valid and `-1`
//! addresses the last row (or column). Boundary-marking code and the erosion
//! pass rely on this. [`at`](OccupancyGrid::at) and
//! [`is_valid`](OccupancyGrid::is_valid) are strict and never wrap.

use std::fmt;

use crate::geom::Position;

// ---------------------------------------------------------------------------
// CellState
// ---------------------------------------------------------------------------

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Free space.
    #[default]
    Unblocked,
    /// Obstacle.
    Blocked,
}

impl CellState {
    /// Raw value of an unblocked cell.
    pub const UNBLOCKED_VALUE: i32 = 1;
    /// Raw value of a blocked cell.
    pub const BLOCKED_VALUE: i32 = 0;

    #[inline]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }

    #[inline]
    pub const fn is_unblocked(self) -> bool {
        matches!(self, Self::Unblocked)
    }

    /// ASCII glyph used by [`OccupancyGrid::parse`] and `Display`.
    #[inline]
    pub const fn glyph(self) -> char {
        match self {
            Self::Unblocked => '.',
            Self::Blocked => '#',
        }
    }
}

impl TryFrom<i32> for CellState {
    type Error = GridError;

    fn try_from(v: i32) -> Result<Self, GridError> {
        match v {
            Self::UNBLOCKED_VALUE => Ok(Self::Unblocked),
            Self::BLOCKED_VALUE => Ok(Self::Blocked),
            other => Err(GridError::InvalidGridValue(other)),
        }
    }
}

impl From<CellState> for i32 {
    fn from(c: CellState) -> Self {
        match c {
            CellState::Unblocked => CellState::UNBLOCKED_VALUE,
            CellState::Blocked => CellState::BLOCKED_VALUE,
        }
    }
}

// ---------------------------------------------------------------------------
// OccupancyGrid
// ---------------------------------------------------------------------------

/// A fixed `n_rows × n_cols` grid of blocked/unblocked cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGrid", into = "RawGrid")
)]
pub struct OccupancyGrid {
    cells: Vec<CellState>,
    n_rows: usize,
    n_cols: usize,
}

impl OccupancyGrid {
    /// Create a grid with every cell unblocked.
    pub fn new(n_rows: usize, n_cols: usize) -> Result<Self, GridError> {
        check_dimensions(n_rows, n_cols)?;
        Ok(Self {
            cells: vec![CellState::Unblocked; n_rows * n_cols],
            n_rows,
            n_cols,
        })
    }

    /// Create a grid whose cell states are given by `f(pos)`.
    pub fn from_fn(
        n_rows: usize,
        n_cols: usize,
        mut f: impl FnMut(Position) -> CellState,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(n_rows, n_cols)?;
        for (i, c) in grid.cells.iter_mut().enumerate() {
            *c = f(Position::new((i / n_cols) as i32, (i % n_cols) as i32));
        }
        Ok(grid)
    }

    /// Create an open grid and block every position in `obstacles`.
    ///
    /// Obstacles follow the wrap-around rules of [`set`](Self::set).
    pub fn with_obstacles(
        n_rows: usize,
        n_cols: usize,
        obstacles: &[Position],
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(n_rows, n_cols)?;
        for &p in obstacles {
            grid.set(p, CellState::Blocked)?;
        }
        Ok(grid)
    }

    /// Build a grid from row-major tiles of any type, blocking the tiles for
    /// which `is_blocked` returns `true`.
    ///
    /// `tiles.len()` must be a non-zero multiple of `n_cols`.
    pub fn from_tiles<T>(
        tiles: &[T],
        n_cols: usize,
        is_blocked: impl Fn(&T) -> bool,
    ) -> Result<Self, GridError> {
        if n_cols == 0 || tiles.len() % n_cols != 0 {
            return Err(GridError::InvalidDimensions {
                n_rows: if n_cols == 0 { 0 } else { tiles.len() / n_cols },
                n_cols,
            });
        }
        let n_rows = tiles.len() / n_cols;
        check_dimensions(n_rows, n_cols)?;
        Ok(Self {
            cells: tiles
                .iter()
                .map(|t| {
                    if is_blocked(t) {
                        CellState::Blocked
                    } else {
                        CellState::Unblocked
                    }
                })
                .collect(),
            n_rows,
            n_cols,
        })
    }

    /// Parse an ASCII picture: `#` is blocked, `.` is unblocked.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines around the picture.
    pub fn parse(s: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = s.trim().lines().map(str::trim).collect();
        let n_cols = lines.first().map_or(0, |l| l.chars().count());
        let mut cells = Vec::with_capacity(lines.len() * n_cols);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != n_cols {
                return Err(GridError::InconsistentRows { line: row });
            }
            for (col, ch) in line.chars().enumerate() {
                let state = match ch {
                    '.' => CellState::Unblocked,
                    '#' => CellState::Blocked,
                    _ => {
                        return Err(GridError::InvalidRune {
                            ch,
                            pos: Position::new(row as i32, col as i32),
                        });
                    }
                };
                cells.push(state);
            }
        }
        check_dimensions(lines.len(), n_cols)?;
        Ok(Self {
            cells,
            n_rows: lines.len(),
            n_cols,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: grids have positive dimensions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` lies inside the grid (no wrap-around).
    #[inline]
    pub fn is_valid(&self, p: Position) -> bool {
        p.row >= 0 && p.col >= 0 && (p.row as usize) < self.n_rows && (p.col as usize) < self.n_cols
    }

    /// Read the cell at `p`, or `None` if `p` is outside the grid.
    ///
    /// Strict: negative indices are out of range here.
    #[inline]
    pub fn at(&self, p: Position) -> Option<CellState> {
        if !self.is_valid(p) {
            return None;
        }
        Some(self.cells[p.row as usize * self.n_cols + p.col as usize])
    }

    /// Read the cell at `p` with wrap-around indexing.
    pub fn get(&self, p: Position) -> Result<CellState, GridError> {
        let i = self.index(p)?;
        Ok(self.cells[i])
    }

    /// Write the cell at `p` with wrap-around indexing.
    pub fn set(&mut self, p: Position, state: CellState) -> Result<(), GridError> {
        let i = self.index(p)?;
        self.cells[i] = state;
        Ok(())
    }

    /// Write the cell at `p` from its raw encoding (`1` unblocked,
    /// `0` blocked). Any other value is rejected.
    pub fn set_value(&mut self, p: Position, value: i32) -> Result<(), GridError> {
        let state = CellState::try_from(value)?;
        self.set(p, state)
    }

    /// Whether the cell at `p` is blocked (wrap-around indexing).
    pub fn is_blocked(&self, p: Position) -> Result<bool, GridError> {
        Ok(self.get(p)?.is_blocked())
    }

    /// Whether the cell at `p` is unblocked (wrap-around indexing).
    pub fn is_unblocked(&self, p: Position) -> Result<bool, GridError> {
        Ok(self.get(p)?.is_unblocked())
    }

    /// Whether every position in `positions` is blocked.
    pub fn all_blocked(&self, positions: &[Position]) -> Result<bool, GridError> {
        self.all_in_state(positions, CellState::Blocked)
    }

    /// Whether every position in `positions` is unblocked.
    pub fn all_unblocked(&self, positions: &[Position]) -> Result<bool, GridError> {
        self.all_in_state(positions, CellState::Unblocked)
    }

    fn all_in_state(&self, positions: &[Position], state: CellState) -> Result<bool, GridError> {
        for &p in positions {
            if self.get(p)? != state {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fill the whole grid with `state`.
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    /// Count the cells in `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Iterate over `(Position, CellState)` pairs in row-major order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Position, CellState)> + '_ {
        let n_cols = self.n_cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (Position::new((i / n_cols) as i32, (i % n_cols) as i32), c))
    }

    /// Flat index for `p`, resolving negative indices from the far end.
    fn index(&self, p: Position) -> Result<usize, GridError> {
        match (wrap(p.row, self.n_rows), wrap(p.col, self.n_cols)) {
            (Some(r), Some(c)) => Ok(r * self.n_cols + c),
            _ => Err(GridError::OutOfBounds {
                pos: p,
                n_rows: self.n_rows,
                n_cols: self.n_cols,
            }),
        }
    }
}

#[inline]
fn wrap(i: i32, n: usize) -> Option<usize> {
    let (i, n) = (i as i64, n as i64);
    if (0..n).contains(&i) {
        Some(i as usize)
    } else if (-n..0).contains(&i) {
        Some((i + n) as usize)
    } else {
        None
    }
}

fn check_dimensions(n_rows: usize, n_cols: usize) -> Result<(), GridError> {
    let max = i32::MAX as usize;
    if n_rows == 0 || n_cols == 0 || n_rows > max || n_cols > max {
        return Err(GridError::InvalidDimensions { n_rows, n_cols });
    }
    Ok(())
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(self.n_cols).enumerate() {
            if r > 0 {
                f.write_str("\n")?;
            }
            for c in row {
                write!(f, "{}", c.glyph())?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serde representation
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawGrid {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<CellState>,
}

#[cfg(feature = "serde")]
impl From<OccupancyGrid> for RawGrid {
    fn from(g: OccupancyGrid) -> Self {
        Self {
            n_rows: g.n_rows,
            n_cols: g.n_cols,
            cells: g.cells,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for OccupancyGrid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, GridError> {
        check_dimensions(raw.n_rows, raw.n_cols)?;
        if raw.cells.len() != raw.n_rows * raw.n_cols {
            return Err(GridError::InvalidDimensions {
                n_rows: raw.n_rows,
                n_cols: raw.n_cols,
            });
        }
        Ok(Self {
            cells: raw.cells,
            n_rows: raw.n_rows,
            n_cols: raw.n_cols,
        })
    }
}

// ---------------------------------------------------------------------------
// GridError
// ---------------------------------------------------------------------------

/// Errors raised by grid construction and cell access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A dimension is zero, too large, or disagrees with the cell count.
    InvalidDimensions { n_rows: usize, n_cols: usize },
    /// Access outside the grid, even after wrap-around.
    OutOfBounds {
        pos: Position,
        n_rows: usize,
        n_cols: usize,
    },
    /// A raw cell value other than `0` or `1`.
    InvalidGridValue(i32),
    /// An ASCII picture line has a different width than the first line.
    InconsistentRows { line: usize },
    /// An ASCII picture contains a character other than `#` or `.`.
    InvalidRune { ch: char, pos: Position },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { n_rows, n_cols } => {
                write!(f, "grid: invalid dimensions {n_rows}x{n_cols}")
            }
            Self::OutOfBounds { pos, n_rows, n_cols } => {
                write!(f, "grid: position {pos} out of bounds for {n_rows}x{n_cols} grid")
            }
            Self::InvalidGridValue(v) => {
                write!(f, "grid: invalid cell value {v} (expected 0 or 1)")
            }
            Self::InconsistentRows { line } => {
                write!(f, "grid: line {line} has inconsistent width")
            }
            Self::InvalidRune { ch, pos } => {
                write!(f, "grid: invalid rune {ch:?} at {pos}")
            }
        }
    }
}

impl std::error::Error for GridError {}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn grid_round_trip() {
        let g = OccupancyGrid::parse("#.\n.#").unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let back: OccupancyGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }

    #[test]
    fn mismatched_cell_count_rejected() {
        let json = r#"{"n_rows":2,"n_cols":2,"cells":["Blocked"]}"#;
        assert!(serde_json::from_str::<OccupancyGrid>(json).is_err());
    }
}
