use std::fmt::Display;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::model::{Cell, Role};

/// Upper bound on grid size; solving enumerates over the two-valued domain.
pub const MAX_CELLS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "ShapeData")]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Deserialize)]
struct ShapeData {
    rows: usize,
    cols: usize,
}

impl TryFrom<ShapeData> for GridShape {
    type Error = GridError;

    fn try_from(data: ShapeData) -> GridResult<Self> {
        GridShape::new(data.rows, data.cols)
    }
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> GridResult<Self> {
        let too_big = rows.checked_mul(cols).map_or(true, |cells| cells > MAX_CELLS);
        if rows == 0 || cols == 0 || too_big {
            return Err(GridError::InvalidDimensions {
                rows,
                cols,
                max_cells: MAX_CELLS,
            });
        }
        Ok(Self { rows, cols })
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        (1..=self.rows).contains(&cell.row) && (1..=self.cols).contains(&cell.col)
    }

    pub fn cell(&self, row: usize, col: usize) -> GridResult<Cell> {
        let cell = Cell::new(row, col);
        if self.contains(&cell) {
            Ok(cell)
        } else {
            Err(GridError::OutOfBounds { row, col })
        }
    }

    /// Flat index `(row-1)*cols + (col-1)`. Callers must pass an in-grid cell.
    pub fn index(&self, cell: &Cell) -> usize {
        (cell.row - 1) * self.cols + (cell.col - 1)
    }

    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols + 1, index % self.cols + 1)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + Clone {
        let shape = *self;
        (0..shape.len()).map(move |i| shape.cell_at(i))
    }

    pub fn row_cells(&self, row: usize) -> Vec<Cell> {
        (1..=self.cols).map(|col| Cell::new(row, col)).collect()
    }

    pub fn column_cells(&self, col: usize) -> Vec<Cell> {
        (1..=self.rows).map(|row| Cell::new(row, col)).collect()
    }

    /// 8-connected neighbours in flat-index order.
    pub fn neighbors(&self, cell: &Cell) -> Vec<Cell> {
        self.cells().filter(|other| cell.touches(other)).collect()
    }
}

/// A total map Cell -> Role, stored in flat-index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "AssignmentData")]
pub struct Assignment {
    pub shape: GridShape,
    roles: Vec<Role>,
}

#[derive(Deserialize)]
struct AssignmentData {
    shape: GridShape,
    roles: Vec<Role>,
}

impl TryFrom<AssignmentData> for Assignment {
    type Error = GridError;

    fn try_from(data: AssignmentData) -> GridResult<Self> {
        Assignment::new(data.shape, data.roles)
    }
}

impl Assignment {
    pub fn new(shape: GridShape, roles: Vec<Role>) -> GridResult<Self> {
        if roles.len() != shape.len() {
            return Err(GridError::RoleCountMismatch {
                expected: shape.len(),
                actual: roles.len(),
            });
        }
        Ok(Self { shape, roles })
    }

    /// Every cell drawn uniformly from the two roles.
    pub fn random(shape: GridShape, rng: &mut impl Rng) -> Self {
        let roles = (0..shape.len())
            .map(|_| if rng.random_bool(0.5) { Role::Good } else { Role::Bad })
            .collect();
        let assignment = Self { shape, roles };
        trace!(target: "assignment", "Target assignment:\n{}", assignment);
        assignment
    }

    #[cfg(test)]
    /// Parse rows of `G`/`B` separated by whitespace, e.g. "BG GG".
    pub fn parse(input: &str) -> Self {
        let rows: Vec<&str> = input.split_whitespace().collect();
        let shape = GridShape::new(rows.len(), rows[0].len()).unwrap();
        let roles = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                'G' => Role::Good,
                'B' => Role::Bad,
                _ => panic!("Invalid role {:?}", c),
            })
            .collect();
        Self::new(shape, roles).unwrap()
    }

    pub fn get(&self, cell: &Cell) -> Role {
        self.roles[self.shape.index(cell)]
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn count<'a>(&self, cells: impl IntoIterator<Item = &'a Cell>, role: Role) -> usize {
        cells.into_iter().filter(|cell| self.get(cell) == role).count()
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();

        for row in 1..=self.shape.rows {
            output.push_str(&format!("{}|", row));
            for col in 1..=self.shape.cols {
                let role = self.get(&Cell::new(row, col));
                output.push_str(&format!("{}|", role.short()));
            }
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(GridShape::new(0, 3).is_err());
        assert!(GridShape::new(5, 6).is_err());
        assert!(GridShape::new(5, 5).is_ok());
        assert!(GridShape::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let shape: GridShape = serde_json::from_str(r#"{"rows":2,"cols":3}"#).unwrap();
        assert_eq!(shape, GridShape::new(2, 3).unwrap());
        assert!(serde_json::from_str::<GridShape>(r#"{"rows":8,"cols":8}"#).is_err());
        assert!(serde_json::from_str::<GridShape>(r#"{"rows":0,"cols":3}"#).is_err());

        let json = r#"{"shape":{"rows":1,"cols":2},"roles":["good"]}"#;
        assert!(serde_json::from_str::<Assignment>(json).is_err());
    }

    #[test]
    fn test_cell_pairs() {
        let shape = GridShape::new(2, 2).unwrap();
        let pairs = shape.cells().tuple_combinations::<(_, _)>().collect::<Vec<_>>();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], (Cell::new(1, 1), Cell::new(1, 2)));
    }

    #[test]
    fn test_index_roundtrip() {
        let shape = GridShape::new(3, 4).unwrap();
        assert_eq!(shape.index(&Cell::new(1, 1)), 0);
        assert_eq!(shape.index(&Cell::new(2, 3)), 6);
        assert_eq!(shape.cell_at(11), Cell::new(3, 4));
    }

    #[test]
    fn test_neighbor_counts() {
        let shape = GridShape::new(3, 3).unwrap();
        assert_eq!(shape.neighbors(&Cell::new(1, 1)).len(), 3);
        assert_eq!(shape.neighbors(&Cell::new(1, 2)).len(), 5);
        assert_eq!(shape.neighbors(&Cell::new(2, 2)).len(), 8);
    }

    #[test]
    fn test_random_is_seeded() {
        let shape = GridShape::new(4, 4).unwrap();
        let a = Assignment::random(shape, &mut StdRng::seed_from_u64(7));
        let b = Assignment::random(shape, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let assignment = Assignment::parse("BG GG");
        assert_eq!(format!("{}", assignment), "1|B|G|\n2|G|G|\n");
        assert_eq!(assignment.count(&assignment.shape.row_cells(1), Role::Bad), 1);
    }
}
