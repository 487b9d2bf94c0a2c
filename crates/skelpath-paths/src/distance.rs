use skelpath_core::Position;

/// Manhattan (L1) distance between two positions.
#[inline]
pub fn manhattan(a: Position, b: Position) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

/// Euclidean (L2) distance between two positions.
#[inline]
pub fn euclidean(a: Position, b: Position) -> f64 {
    let dr = f64::from(a.row - b.row);
    let dc = f64::from(a.col - b.col);
    (dr * dr + dc * dc).sqrt()
}
