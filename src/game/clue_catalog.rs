use itertools::Itertools;
use log::{debug, trace};

use crate::model::{
    Assignment, Axis, Cell, Characters, ClueKind, Comparison, Direction, GridShape, Order, Role,
};
use crate::solver::Goal;

/// A clue that holds for one particular target assignment, ready to be
/// offered to the generator.
#[derive(Debug, Clone)]
pub struct ClueTemplate {
    pub key: String,
    pub kind: ClueKind,
    pub goal: Goal,
    pub referenced_cells: Vec<Cell>,
}

impl ClueTemplate {
    pub fn new(kind: ClueKind, characters: &Characters) -> Self {
        Self {
            key: kind.key(),
            goal: kind.goal(characters),
            referenced_cells: kind.referenced_cells(),
            kind,
        }
    }
}

fn cells_where(shape: &GridShape, predicate: impl Fn(&Cell) -> bool) -> Vec<Cell> {
    shape.cells().filter(|cell| predicate(cell)).collect()
}

fn line_in_grid(shape: &GridShape, direction: Direction, line: usize) -> bool {
    match direction {
        Direction::Above | Direction::Below => (1..=shape.rows).contains(&line),
        Direction::Left | Direction::Right => (1..=shape.cols).contains(&line),
    }
}

fn beyond_line_cells(shape: &GridShape, direction: Direction, line: usize) -> Vec<Cell> {
    cells_where(shape, |cell| direction.beyond_line(cell, line))
}

fn beyond_cells(shape: &GridShape, direction: Direction, of: &Cell) -> Vec<Cell> {
    cells_where(shape, |cell| direction.sees(of, cell))
}

/// Cells strictly between two collinear, non-adjacent cells; `None` when
/// the pair does not qualify.
fn between_cells(first: &Cell, second: &Cell) -> Option<Vec<Cell>> {
    if first == second || !first.is_collinear(second) || first.touches(second) {
        return None;
    }
    let cells = if first.row == second.row {
        let (lo, hi) = (first.col.min(second.col), first.col.max(second.col));
        (lo + 1..hi).map(|col| Cell::new(first.row, col)).collect()
    } else {
        let (lo, hi) = (first.row.min(second.row), first.row.max(second.row));
        (lo + 1..hi).map(|row| Cell::new(row, first.col)).collect()
    };
    Some(cells)
}

fn line_cells(shape: &GridShape, axis: Axis, line: usize) -> Option<Vec<Cell>> {
    match axis {
        Axis::Row if (1..=shape.rows).contains(&line) => Some(shape.row_cells(line)),
        Axis::Column if (1..=shape.cols).contains(&line) => Some(shape.column_cells(line)),
        _ => None,
    }
}

fn intersect(cells: &[Cell], others: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .filter(|cell| others.contains(cell))
        .copied()
        .collect()
}

/// Every occurrence of `role` in `cells` forms one contiguous run (or there
/// are none).
fn connected_goal(cells: &[Cell], role: Role) -> Goal {
    let mut options = vec![Goal::exactly_k(cells, 0, role)];
    for start in 0..cells.len() {
        for end in start..cells.len() {
            options.push(Goal::And(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        if (start..=end).contains(&i) {
                            Goal::equals(*cell, role)
                        } else {
                            Goal::equals(*cell, role.complement())
                        }
                    })
                    .collect(),
            ));
        }
    }
    Goal::or(options)
}

fn is_contiguous_run(target: &Assignment, cells: &[Cell], role: Role) -> bool {
    let positions = cells
        .iter()
        .positions(|cell| target.get(cell) == role)
        .collect::<Vec<_>>();
    match (positions.first(), positions.last()) {
        (Some(first), Some(last)) => last - first + 1 == positions.len(),
        _ => true,
    }
}

impl ClueKind {
    /// The constraint this clue asserts. Requests that make no sense for the
    /// grid (cells outside it, unaligned or adjacent `between` pairs and the
    /// like) produce [`Goal::unsatisfiable`].
    pub fn goal(&self, characters: &Characters) -> Goal {
        let shape = characters.shape();
        let inside = |cells: &[&Cell]| -> bool { cells.iter().all(|cell| shape.contains(cell)) };
        match self {
            ClueKind::Is { role, cell } if inside(&[cell]) => Goal::equals(*cell, *role),
            ClueKind::RowCount { role, row, count } => match line_cells(&shape, Axis::Row, *row) {
                Some(cells) => Goal::exactly_k(&cells, *count, *role),
                None => Goal::unsatisfiable(),
            },
            ClueKind::ColumnCount { role, col, count } => {
                match line_cells(&shape, Axis::Column, *col) {
                    Some(cells) => Goal::exactly_k(&cells, *count, *role),
                    None => Goal::unsatisfiable(),
                }
            }
            ClueKind::BeyondLine {
                role,
                direction,
                line,
                count,
            } if line_in_grid(&shape, *direction, *line) => {
                Goal::exactly_k(&beyond_line_cells(&shape, *direction, *line), *count, *role)
            }
            ClueKind::Beyond {
                role,
                direction,
                cell,
                count,
            } if inside(&[cell]) => {
                Goal::exactly_k(&beyond_cells(&shape, *direction, cell), *count, *role)
            }
            ClueKind::Between {
                role,
                first,
                second,
                count,
            } if inside(&[first, second]) => match between_cells(first, second) {
                Some(cells) => Goal::exactly_k(&cells, *count, *role),
                None => Goal::unsatisfiable(),
            },
            ClueKind::Connected { role, axis, line } => match line_cells(&shape, *axis, *line) {
                Some(cells) => connected_goal(&cells, *role),
                None => Goal::unsatisfiable(),
            },
            ClueKind::Neighbors { role, cell, count } if inside(&[cell]) => {
                Goal::exactly_k(&shape.neighbors(cell), *count, *role)
            }
            ClueKind::CompareNeighbors {
                role,
                comparison,
                first,
                second,
            } if inside(&[first, second]) && first != second => Goal::compare_counts(
                &shape.neighbors(first),
                &shape.neighbors(second),
                *role,
                *comparison,
            ),
            ClueKind::OneOfNeighbors {
                role,
                member,
                of,
                count,
            } if inside(&[member, of]) && member.touches(of) => Goal::and([
                Goal::equals(*member, *role),
                Goal::exactly_k(&shape.neighbors(of), *count, *role),
            ]),
            ClueKind::BeyondAlsoNeighbors {
                role,
                direction,
                cell,
                neighbor_of,
                count,
                total,
            } if inside(&[cell, neighbor_of]) && cell != neighbor_of => {
                let seen = beyond_cells(&shape, *direction, cell);
                let shared = intersect(&seen, &shape.neighbors(neighbor_of));
                Goal::and([
                    Goal::exactly_k(&seen, *total, *role),
                    Goal::exactly_k(&shared, *count, *role),
                ])
            }
            ClueKind::CommonNeighbors {
                role,
                cell,
                neighbor_of,
                count,
                total,
            } if inside(&[cell, neighbor_of]) && cell != neighbor_of => {
                let around = shape.neighbors(cell);
                let shared = intersect(&around, &shape.neighbors(neighbor_of));
                Goal::and([
                    Goal::exactly_k(&around, *total, *role),
                    Goal::exactly_k(&shared, *count, *role),
                ])
            }
            ClueKind::Alphabetical {
                role,
                order,
                cell,
                count,
                total,
            } if inside(&[cell]) => {
                let people = match order {
                    Order::Before => characters.before(cell),
                    Order::After => characters.after(cell),
                };
                if people.len() != *total {
                    Goal::unsatisfiable()
                } else {
                    Goal::exactly_k(people, *count, *role)
                }
            }
            _ => Goal::unsatisfiable(),
        }
    }
}

/// Every true clue about `target`: one per family, site and role, skipping
/// sites that would name an empty set of people.
pub fn build_catalog(target: &Assignment, characters: &Characters) -> Vec<ClueTemplate> {
    let shape = target.shape;
    let mut kinds = Vec::new();

    for role in Role::ALL {
        for row in 1..=shape.rows {
            let count = target.count(&shape.row_cells(row), role);
            kinds.push(ClueKind::RowCount { role, row, count });
        }
        for col in 1..=shape.cols {
            let count = target.count(&shape.column_cells(col), role);
            kinds.push(ClueKind::ColumnCount { role, col, count });
        }

        for direction in Direction::ALL {
            let lines = match direction {
                Direction::Above | Direction::Below => shape.rows,
                Direction::Left | Direction::Right => shape.cols,
            };
            for line in 1..=lines {
                let cells = beyond_line_cells(&shape, direction, line);
                if !cells.is_empty() {
                    kinds.push(ClueKind::BeyondLine {
                        role,
                        direction,
                        line,
                        count: target.count(&cells, role),
                    });
                }
            }
        }

        for (axis, lines) in [(Axis::Row, shape.rows), (Axis::Column, shape.cols)] {
            for line in 1..=lines {
                let Some(cells) = line_cells(&shape, axis, line) else {
                    continue;
                };
                if target.count(&cells, role) >= 2 && is_contiguous_run(target, &cells, role) {
                    kinds.push(ClueKind::Connected { role, axis, line });
                }
            }
        }

        for cell in shape.cells() {
            for direction in Direction::ALL {
                let seen = beyond_cells(&shape, direction, &cell);
                if seen.is_empty() {
                    continue;
                }
                kinds.push(ClueKind::Beyond {
                    role,
                    direction,
                    cell,
                    count: target.count(&seen, role),
                });
                for neighbor_of in shape.cells().filter(|other| *other != cell) {
                    let shared = intersect(&seen, &shape.neighbors(&neighbor_of));
                    if shared.is_empty() {
                        continue;
                    }
                    kinds.push(ClueKind::BeyondAlsoNeighbors {
                        role,
                        direction,
                        cell,
                        neighbor_of,
                        count: target.count(&shared, role),
                        total: target.count(&seen, role),
                    });
                }
            }

            let around = shape.neighbors(&cell);
            if !around.is_empty() {
                kinds.push(ClueKind::Neighbors {
                    role,
                    cell,
                    count: target.count(&around, role),
                });
            }
            for member in around.iter().filter(|member| target.get(member) == role) {
                kinds.push(ClueKind::OneOfNeighbors {
                    role,
                    member: *member,
                    of: cell,
                    count: target.count(&around, role),
                });
            }
            for neighbor_of in shape.cells().filter(|other| *other != cell) {
                let shared = intersect(&around, &shape.neighbors(&neighbor_of));
                if shared.is_empty() {
                    continue;
                }
                kinds.push(ClueKind::CommonNeighbors {
                    role,
                    cell,
                    neighbor_of,
                    count: target.count(&shared, role),
                    total: target.count(&around, role),
                });
            }

            for (order, people) in [
                (Order::Before, characters.before(&cell)),
                (Order::After, characters.after(&cell)),
            ] {
                if !people.is_empty() {
                    kinds.push(ClueKind::Alphabetical {
                        role,
                        order,
                        cell,
                        count: target.count(people, role),
                        total: people.len(),
                    });
                }
            }
        }

        for (first, second) in shape.cells().tuple_combinations() {
            if let Some(cells) = between_cells(&first, &second) {
                kinds.push(ClueKind::Between {
                    role,
                    first,
                    second,
                    count: target.count(&cells, role),
                });
            }
            let comparison = Comparison::of(
                target.count(&shape.neighbors(&first), role),
                target.count(&shape.neighbors(&second), role),
            );
            kinds.push(ClueKind::CompareNeighbors {
                role,
                comparison,
                first,
                second,
            });
        }
    }

    let templates = kinds
        .into_iter()
        .map(|kind| ClueTemplate::new(kind, characters))
        .collect::<Vec<_>>();
    debug!(
        target: "clue_catalog",
        "Built {} clue templates for a {}x{} grid",
        templates.len(),
        shape.rows,
        shape.cols
    );
    trace!(
        target: "clue_catalog",
        "Catalog keys: {:?}",
        templates.iter().map(|t| &t.key).collect::<Vec<_>>()
    );
    templates
}
