use serde::{Deserialize, Serialize};

/// One grid position. Rows and columns are 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Cell {
    pub row: usize,
    #[serde(rename = "column")]
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[cfg(test)]
    /// Parse a cell from a string of the form "r1c2".
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix('r').unwrap();
        let (row, col) = s.split_once('c').unwrap();
        Self {
            row: row.parse().unwrap(),
            col: col.parse().unwrap(),
        }
    }

    /// True when both cells share a row or a column.
    pub fn is_collinear(&self, other: &Cell) -> bool {
        self.row == other.row || self.col == other.col
    }

    /// True for any of the 8 surrounding positions.
    pub fn touches(&self, other: &Cell) -> bool {
        self != other && self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}
