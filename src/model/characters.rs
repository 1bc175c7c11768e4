use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::model::{Cell, GridShape};

const PLACEHOLDER_NAMES: [&str; 25] = [
    "Alice", "Bobby", "Chloe", "Derek", "Ellie", "Frank", "Gemma", "Harry", "Irene", "Jacob",
    "Kevin", "Laura", "Mason", "Nadia", "Oscar", "Paula", "Quinn", "Rosie", "Simon", "Tessa",
    "Ursula", "Victor", "Wendy", "Xavier", "Yvonne",
];

/// The person standing in each cell, plus the Alphabetical Order Index built
/// from their names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "CharactersData", into = "CharactersData")]
pub struct Characters {
    shape: GridShape,
    names: Vec<String>,
    alphabetical: Vec<Cell>,
}

#[derive(Deserialize, Serialize)]
struct CharactersData {
    shape: GridShape,
    names: Vec<String>,
}

impl TryFrom<CharactersData> for Characters {
    type Error = GridError;

    fn try_from(data: CharactersData) -> GridResult<Self> {
        Characters::new(data.shape, data.names)
    }
}

impl From<Characters> for CharactersData {
    fn from(characters: Characters) -> Self {
        Self {
            shape: characters.shape,
            names: characters.names,
        }
    }
}

impl Characters {
    /// `names` is row-major, one per cell.
    pub fn new(shape: GridShape, names: Vec<String>) -> GridResult<Self> {
        if names.len() != shape.len() {
            return Err(GridError::NameCountMismatch {
                expected: shape.len(),
                actual: names.len(),
            });
        }
        Ok(Self::with_names(shape, names))
    }

    fn with_names(shape: GridShape, names: Vec<String>) -> Self {
        let alphabetical = shape
            .cells()
            .sorted_by(|a, b| {
                names[shape.index(a)]
                    .cmp(&names[shape.index(b)])
                    .then(a.row.cmp(&b.row))
                    .then(a.col.cmp(&b.col))
            })
            .collect();
        Self {
            shape,
            names,
            alphabetical,
        }
    }

    /// Deterministic stand-in names, in alphabetical row-major order.
    pub fn placeholder(shape: GridShape) -> Self {
        let names = (0..shape.len())
            .map(|i| match PLACEHOLDER_NAMES.get(i) {
                Some(name) => name.to_string(),
                None => format!("Person {}", i + 1),
            })
            .collect();
        Self::with_names(shape, names)
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn name(&self, cell: &Cell) -> &str {
        &self.names[self.shape.index(cell)]
    }

    pub fn alphabetical(&self) -> &[Cell] {
        &self.alphabetical
    }

    fn alphabetical_position(&self, cell: &Cell) -> usize {
        self.alphabetical
            .iter()
            .position(|c| c == cell)
            .unwrap_or(self.alphabetical.len())
    }

    /// Everyone whose name sorts strictly before `cell`'s.
    pub fn before(&self, cell: &Cell) -> &[Cell] {
        &self.alphabetical[..self.alphabetical_position(cell).min(self.alphabetical.len())]
    }

    /// Everyone whose name sorts strictly after `cell`'s.
    pub fn after(&self, cell: &Cell) -> &[Cell] {
        let position = self.alphabetical_position(cell);
        if position >= self.alphabetical.len() {
            return &[];
        }
        &self.alphabetical[position + 1..]
    }
}
