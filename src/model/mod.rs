mod cell;
mod characters;
mod clue;
mod deduction;
mod grid;
mod puzzle;
mod role;

pub use cell::Cell;
pub use characters::Characters;
pub use clue::{Axis, ClueKind, ClueParts, Comparison, Direction, Order, Part};
pub use deduction::Deduction;
pub use grid::{Assignment, GridShape, MAX_CELLS};
pub use puzzle::{Puzzle, PuzzleStep};
pub use role::{Role, RoleLabels};
