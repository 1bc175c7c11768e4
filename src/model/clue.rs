use std::fmt::{self, Debug, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::PartsError;
use crate::model::{Cell, Role, RoleLabels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Above,
    Below,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Above,
        Direction::Below,
        Direction::Left,
        Direction::Right,
    ];

    /// Whether `other` lies strictly in this direction of `from`, in the same
    /// column (above/below) or row (left/right).
    pub fn sees(&self, from: &Cell, other: &Cell) -> bool {
        match self {
            Direction::Above => other.col == from.col && other.row < from.row,
            Direction::Below => other.col == from.col && other.row > from.row,
            Direction::Left => other.row == from.row && other.col < from.col,
            Direction::Right => other.row == from.row && other.col > from.col,
        }
    }

    /// Whether a whole row/column `line` lies strictly in this direction of
    /// row/column `of`. Above/below compare rows, left/right compare columns.
    pub fn beyond_line(&self, cell: &Cell, of: usize) -> bool {
        match self {
            Direction::Above => cell.row < of,
            Direction::Below => cell.row > of,
            Direction::Left => cell.col < of,
            Direction::Right => cell.col > of,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Comparison {
    Same,
    More,
    Fewer,
}

impl Comparison {
    pub fn of(a: usize, b: usize) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => Comparison::Same,
            std::cmp::Ordering::Greater => Comparison::More,
            std::cmp::Ordering::Less => Comparison::Fewer,
        }
    }

    pub fn holds(&self, a: usize, b: usize) -> bool {
        Comparison::of(a, b) == *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Order {
    Before,
    After,
}

/// Typed parameters of one clue. Every variant maps to one or more opcodes in
/// the persisted parts tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClueKind {
    /// A bare fact: `cell` has `role`.
    Is { role: Role, cell: Cell },
    RowCount { role: Role, row: usize, count: usize },
    ColumnCount { role: Role, col: usize, count: usize },
    /// Count over every row strictly above/below `line`, or every column
    /// strictly left/right of it.
    BeyondLine {
        role: Role,
        direction: Direction,
        line: usize,
        count: usize,
    },
    /// Count over the cells strictly in `direction` of `cell`.
    Beyond {
        role: Role,
        direction: Direction,
        cell: Cell,
        count: usize,
    },
    Between {
        role: Role,
        first: Cell,
        second: Cell,
        count: usize,
    },
    Connected { role: Role, axis: Axis, line: usize },
    Neighbors { role: Role, cell: Cell, count: usize },
    CompareNeighbors {
        role: Role,
        comparison: Comparison,
        first: Cell,
        second: Cell,
    },
    /// `member` is one of `of`'s `count` neighbours with `role`.
    OneOfNeighbors {
        role: Role,
        member: Cell,
        of: Cell,
        count: usize,
    },
    /// `count` of the `total` people with `role` in `direction` of `cell`
    /// also neighbour `neighbor_of`.
    BeyondAlsoNeighbors {
        role: Role,
        direction: Direction,
        cell: Cell,
        neighbor_of: Cell,
        count: usize,
        total: usize,
    },
    /// `count` of `cell`'s `total` neighbours with `role` also neighbour
    /// `neighbor_of`.
    CommonNeighbors {
        role: Role,
        cell: Cell,
        neighbor_of: Cell,
        count: usize,
        total: usize,
    },
    /// `count` of the `total` people named before/after `cell` have `role`.
    Alphabetical {
        role: Role,
        order: Order,
        cell: Cell,
        count: usize,
        total: usize,
    },
}

impl ClueKind {
    pub fn role(&self) -> Role {
        match self {
            ClueKind::Is { role, .. }
            | ClueKind::RowCount { role, .. }
            | ClueKind::ColumnCount { role, .. }
            | ClueKind::BeyondLine { role, .. }
            | ClueKind::Beyond { role, .. }
            | ClueKind::Between { role, .. }
            | ClueKind::Connected { role, .. }
            | ClueKind::Neighbors { role, .. }
            | ClueKind::CompareNeighbors { role, .. }
            | ClueKind::OneOfNeighbors { role, .. }
            | ClueKind::BeyondAlsoNeighbors { role, .. }
            | ClueKind::CommonNeighbors { role, .. }
            | ClueKind::Alphabetical { role, .. } => *role,
        }
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            ClueKind::Is { .. } => "is",
            ClueKind::RowCount { .. } => "row_count",
            ClueKind::ColumnCount { .. } => "column_count",
            ClueKind::BeyondLine { direction, .. } => match direction {
                Direction::Above => "above_row",
                Direction::Below => "below_row",
                Direction::Left => "left_of_column",
                Direction::Right => "right_of_column",
            },
            ClueKind::Beyond { direction, .. } => match direction {
                Direction::Above => "above",
                Direction::Below => "below",
                Direction::Left => "left_of",
                Direction::Right => "right_of",
            },
            ClueKind::Between { .. } => "between",
            ClueKind::Connected { axis, .. } => match axis {
                Axis::Row => "row_connected",
                Axis::Column => "column_connected",
            },
            ClueKind::Neighbors { .. } => "neighbors",
            ClueKind::CompareNeighbors { comparison, .. } => match comparison {
                Comparison::Same => "same_neighbors",
                Comparison::More => "more_neighbors",
                Comparison::Fewer => "fewer_neighbors",
            },
            ClueKind::OneOfNeighbors { .. } => "one_of_neighbors",
            ClueKind::BeyondAlsoNeighbors { direction, .. } => match direction {
                Direction::Above => "above_neighbors",
                Direction::Below => "below_neighbors",
                Direction::Left => "left_of_neighbors",
                Direction::Right => "right_of_neighbors",
            },
            ClueKind::CommonNeighbors { .. } => "common_neighbors",
            ClueKind::Alphabetical { order, .. } => match order {
                Order::Before => "before_alphabetically",
                Order::After => "after_alphabetically",
            },
        }
    }

    /// The people this clue names, in the order they are mentioned.
    pub fn referenced_cells(&self) -> Vec<Cell> {
        match self {
            ClueKind::RowCount { .. }
            | ClueKind::ColumnCount { .. }
            | ClueKind::BeyondLine { .. }
            | ClueKind::Connected { .. } => vec![],
            ClueKind::Is { cell, .. }
            | ClueKind::Beyond { cell, .. }
            | ClueKind::Neighbors { cell, .. }
            | ClueKind::Alphabetical { cell, .. } => vec![*cell],
            ClueKind::Between { first, second, .. }
            | ClueKind::CompareNeighbors { first, second, .. } => vec![*first, *second],
            ClueKind::OneOfNeighbors { member, of, .. } => vec![*member, *of],
            ClueKind::BeyondAlsoNeighbors {
                cell, neighbor_of, ..
            }
            | ClueKind::CommonNeighbors {
                cell, neighbor_of, ..
            } => vec![*cell, *neighbor_of],
        }
    }

    /// Numeric parameters after the role, in persisted order.
    fn numbers(&self) -> Vec<usize> {
        match self {
            ClueKind::Is { cell, .. } => vec![cell.row, cell.col],
            ClueKind::RowCount { row, count, .. } => vec![*row, *count],
            ClueKind::ColumnCount { col, count, .. } => vec![*col, *count],
            ClueKind::BeyondLine { line, count, .. } => vec![*line, *count],
            ClueKind::Beyond { cell, count, .. } | ClueKind::Neighbors { cell, count, .. } => {
                vec![cell.row, cell.col, *count]
            }
            ClueKind::Between {
                first,
                second,
                count,
                ..
            } => vec![first.row, first.col, second.row, second.col, *count],
            ClueKind::Connected { line, .. } => vec![*line],
            ClueKind::CompareNeighbors { first, second, .. } => {
                vec![first.row, first.col, second.row, second.col]
            }
            ClueKind::OneOfNeighbors {
                member, of, count, ..
            } => vec![member.row, member.col, of.row, of.col, *count],
            ClueKind::BeyondAlsoNeighbors {
                cell,
                neighbor_of,
                count,
                total,
                ..
            }
            | ClueKind::CommonNeighbors {
                cell,
                neighbor_of,
                count,
                total,
                ..
            } => vec![
                cell.row,
                cell.col,
                neighbor_of.row,
                neighbor_of.col,
                *count,
                *total,
            ],
            ClueKind::Alphabetical {
                cell, count, total, ..
            } => vec![cell.row, cell.col, *count, *total],
        }
    }

    /// Dedupe identity, independent of display labels.
    pub fn key(&self) -> String {
        std::iter::once(self.opcode().to_string())
            .chain(std::iter::once(self.role().token().to_string()))
            .chain(self.numbers().into_iter().map(|n| n.to_string()))
            .join(" ")
    }

    pub fn to_parts(&self, labels: &RoleLabels) -> ClueParts {
        let mut parts = vec![
            Part::Text(self.opcode().to_string()),
            Part::Text(labels.label(self.role()).to_string()),
        ];
        parts.extend(self.numbers().into_iter().map(|n| Part::Number(n as u64)));
        ClueParts(parts)
    }

    pub fn from_parts(parts: &ClueParts, labels: &RoleLabels) -> Result<Self, PartsError> {
        let (opcode, rest) = match parts.0.split_first() {
            Some((Part::Text(opcode), rest)) => (opcode.as_str(), rest),
            Some((other, _)) => return Err(PartsError::UnknownOpcode(other.to_string())),
            None => return Err(PartsError::Empty),
        };
        let expected = arity(opcode).ok_or_else(|| PartsError::UnknownOpcode(opcode.to_string()))?;
        if rest.len() != expected + 1 {
            return Err(PartsError::WrongArity {
                opcode: opcode.to_string(),
                expected: expected + 1,
                actual: rest.len(),
            });
        }
        let role = match &rest[0] {
            Part::Text(label) => labels
                .parse(label)
                .ok_or_else(|| PartsError::BadRole(label.clone()))?,
            other => return Err(PartsError::BadRole(other.to_string())),
        };
        let n = rest[1..]
            .iter()
            .enumerate()
            .map(|(i, part)| match part {
                Part::Number(n) => usize::try_from(*n).map_err(|_| PartsError::BadNumber(i + 2)),
                _ => Err(PartsError::BadNumber(i + 2)),
            })
            .collect::<Result<Vec<usize>, PartsError>>()?;

        let cell = |i: usize| Cell::new(n[i], n[i + 1]);
        let kind = match opcode {
            "is" => ClueKind::Is {
                role,
                cell: cell(0),
            },
            "row_count" => ClueKind::RowCount {
                role,
                row: n[0],
                count: n[1],
            },
            "column_count" => ClueKind::ColumnCount {
                role,
                col: n[0],
                count: n[1],
            },
            "above_row" | "below_row" | "left_of_column" | "right_of_column" => {
                ClueKind::BeyondLine {
                    role,
                    direction: direction_of(opcode),
                    line: n[0],
                    count: n[1],
                }
            }
            "above" | "below" | "left_of" | "right_of" => ClueKind::Beyond {
                role,
                direction: direction_of(opcode),
                cell: cell(0),
                count: n[2],
            },
            "between" => ClueKind::Between {
                role,
                first: cell(0),
                second: cell(2),
                count: n[4],
            },
            "row_connected" | "column_connected" => ClueKind::Connected {
                role,
                axis: if opcode == "row_connected" {
                    Axis::Row
                } else {
                    Axis::Column
                },
                line: n[0],
            },
            "neighbors" => ClueKind::Neighbors {
                role,
                cell: cell(0),
                count: n[2],
            },
            "same_neighbors" | "more_neighbors" | "fewer_neighbors" => ClueKind::CompareNeighbors {
                role,
                comparison: match opcode {
                    "same_neighbors" => Comparison::Same,
                    "more_neighbors" => Comparison::More,
                    _ => Comparison::Fewer,
                },
                first: cell(0),
                second: cell(2),
            },
            "one_of_neighbors" => ClueKind::OneOfNeighbors {
                role,
                member: cell(0),
                of: cell(2),
                count: n[4],
            },
            "above_neighbors" | "below_neighbors" | "left_of_neighbors" | "right_of_neighbors" => {
                ClueKind::BeyondAlsoNeighbors {
                    role,
                    direction: direction_of(opcode),
                    cell: cell(0),
                    neighbor_of: cell(2),
                    count: n[4],
                    total: n[5],
                }
            }
            "common_neighbors" => ClueKind::CommonNeighbors {
                role,
                cell: cell(0),
                neighbor_of: cell(2),
                count: n[4],
                total: n[5],
            },
            _ => ClueKind::Alphabetical {
                role,
                order: if opcode == "before_alphabetically" {
                    Order::Before
                } else {
                    Order::After
                },
                cell: cell(0),
                count: n[2],
                total: n[3],
            },
        };
        Ok(kind)
    }
}

/// Number of numeric parameters following the role, per opcode.
fn arity(opcode: &str) -> Option<usize> {
    let n = match opcode {
        "row_connected" | "column_connected" => 1,
        "is" | "row_count" | "column_count" | "above_row" | "below_row" | "left_of_column"
        | "right_of_column" => 2,
        "above" | "below" | "left_of" | "right_of" | "neighbors" => 3,
        "same_neighbors" | "more_neighbors" | "fewer_neighbors" | "before_alphabetically"
        | "after_alphabetically" => 4,
        "between" | "one_of_neighbors" => 5,
        "above_neighbors" | "below_neighbors" | "left_of_neighbors" | "right_of_neighbors"
        | "common_neighbors" => 6,
        _ => return None,
    };
    Some(n)
}

fn direction_of(opcode: &str) -> Direction {
    if opcode.starts_with("above") {
        Direction::Above
    } else if opcode.starts_with("below") {
        Direction::Below
    } else if opcode.starts_with("left") {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// One element of a persisted parts tuple.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Number(u64),
    Text(String),
    /// Anything else found in persisted data; kept so it can still be dumped.
    Other(serde_json::Value),
}

impl Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Number(n) => write!(f, "{}", n),
            Part::Text(s) => write!(f, "{}", s),
            Part::Other(value) => write!(f, "{}", value),
        }
    }
}

impl Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// The canonical serializable encoding of a clue: `[opcode, role, params...]`.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClueParts(pub Vec<Part>);

impl ClueParts {
    /// Whitespace-joined dump, used when the parts cannot be decoded.
    pub fn raw_text(&self) -> String {
        self.0.iter().join(" ")
    }
}

impl Debug for ClueParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}
