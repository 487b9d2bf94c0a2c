use std::fmt;

use skelpath_core::{GridError, Position};

/// Errors raised by [`search`](crate::search) and refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Source or destination lies outside the grid.
    InvalidPosition { pos: Position },
    /// Source or destination cell is blocked.
    BlockedEndpoint { pos: Position },
    /// Source and destination are the same cell.
    DegenerateRequest { pos: Position },
    /// A refinement round before the last one found no route.
    NoPathMidRefinement { round: usize },
    /// Refinement was asked to run zero rounds.
    InvalidIterations,
    /// Underlying grid access failed.
    Grid(GridError),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPosition { pos } => write!(f, "path: position {pos} is outside the grid"),
            Self::BlockedEndpoint { pos } => write!(f, "path: endpoint {pos} is blocked"),
            Self::DegenerateRequest { pos } => {
                write!(f, "path: source and destination are both {pos}")
            }
            Self::NoPathMidRefinement { round } => {
                write!(f, "path: no route found in refinement round {round}")
            }
            Self::InvalidIterations => f.write_str("path: refinement needs at least one iteration"),
            Self::Grid(e) => write!(f, "path: {e}"),
        }
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for PathError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
