use serde::{Deserialize, Serialize};

use crate::model::{Cell, Comparison, GridShape, Role};

/// A constraint over the per-cell role variables.
///
/// `And([])` always holds and `Or([])` never does; the latter is what goal
/// builders return for geometrically impossible requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    Equals {
        cell: Cell,
        role: Role,
    },
    And(Vec<Goal>),
    Or(Vec<Goal>),
    /// Exactly `count` of `cells` have `role`.
    ExactlyK {
        cells: Vec<Cell>,
        count: usize,
        role: Role,
    },
}

impl Goal {
    pub fn equals(cell: Cell, role: Role) -> Goal {
        Goal::Equals { cell, role }
    }

    /// Conjunction; nested conjunctions are flattened.
    pub fn and(goals: impl IntoIterator<Item = Goal>) -> Goal {
        let mut flat = Vec::new();
        for goal in goals {
            match goal {
                Goal::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Goal::And(flat)
    }

    /// Disjunction; nested disjunctions are flattened.
    pub fn or(goals: impl IntoIterator<Item = Goal>) -> Goal {
        let mut flat = Vec::new();
        for goal in goals {
            match goal {
                Goal::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Goal::Or(flat)
    }

    pub fn unsatisfiable() -> Goal {
        Goal::Or(vec![])
    }

    pub fn trivial() -> Goal {
        Goal::And(vec![])
    }

    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Goal::Or(goals) if goals.is_empty())
    }

    /// Exactly `count` of `cells` have `role`.
    ///
    /// This is a direct count predicate rather than a disjunction over every
    /// size-`count` subset; both accept the same assignments. `count == 0`
    /// and `count == cells.len()` lower to plain conjunctions, and an
    /// impossible count lowers to [`Goal::unsatisfiable`].
    pub fn exactly_k(cells: &[Cell], count: usize, role: Role) -> Goal {
        if count > cells.len() {
            Goal::unsatisfiable()
        } else if count == 0 {
            Goal::And(
                cells
                    .iter()
                    .map(|cell| Goal::equals(*cell, role.complement()))
                    .collect(),
            )
        } else if count == cells.len() {
            Goal::And(cells.iter().map(|cell| Goal::equals(*cell, role)).collect())
        } else {
            Goal::ExactlyK {
                cells: cells.to_vec(),
                count,
                role,
            }
        }
    }

    /// Compare how many of `first` and of `second` have `role`.
    pub fn compare_counts(
        first: &[Cell],
        second: &[Cell],
        role: Role,
        comparison: Comparison,
    ) -> Goal {
        let mut options = Vec::new();
        for a in 0..=first.len() {
            for b in 0..=second.len() {
                if comparison.holds(a, b) {
                    options.push(Goal::and([
                        Goal::exactly_k(first, a, role),
                        Goal::exactly_k(second, b, role),
                    ]));
                }
            }
        }
        Goal::or(options)
    }

    /// Every cell of the grid holds one of the two roles.
    pub fn everyone_has_a_role(shape: &GridShape) -> Goal {
        Goal::And(
            shape
                .cells()
                .map(|cell| {
                    Goal::Or(Role::ALL.iter().map(|role| Goal::equals(cell, *role)).collect())
                })
                .collect(),
        )
    }

    /// Direct evaluation against a total assignment.
    pub fn holds(&self, role_of: &impl Fn(&Cell) -> Role) -> bool {
        match self {
            Goal::Equals { cell, role } => role_of(cell) == *role,
            Goal::And(goals) => goals.iter().all(|goal| goal.holds(role_of)),
            Goal::Or(goals) => goals.iter().any(|goal| goal.holds(role_of)),
            Goal::ExactlyK { cells, count, role } => {
                cells.iter().filter(|cell| role_of(cell) == *role).count() == *count
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::model::Assignment;

    /// The exhaustive form: one branch per size-k subset holding `role`,
    /// everything else holding the complement.
    fn subset_expansion(cells: &[Cell], k: usize, role: Role) -> Goal {
        Goal::or(cells.iter().combinations(k).map(|subset| {
            Goal::and(cells.iter().map(|cell| {
                if subset.contains(&cell) {
                    Goal::equals(*cell, role)
                } else {
                    Goal::equals(*cell, role.complement())
                }
            }))
        }))
    }

    fn all_assignments(shape: GridShape) -> Vec<Assignment> {
        (0..1u32 << shape.len())
            .map(|bits| {
                let roles = (0..shape.len())
                    .map(|i| if bits & (1 << i) != 0 { Role::Bad } else { Role::Good })
                    .collect();
                Assignment::new(shape, roles).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_exactly_k_matches_subset_expansion() {
        let shape = GridShape::new(2, 2).unwrap();
        let cells: Vec<Cell> = shape.cells().collect();
        for k in 1..=cells.len() {
            let direct = Goal::exactly_k(&cells, k, Role::Bad);
            let expanded = subset_expansion(&cells, k, Role::Bad);
            for assignment in all_assignments(shape) {
                let role_of = |cell: &Cell| assignment.get(cell);
                assert_eq!(direct.holds(&role_of), expanded.holds(&role_of), "k={}", k);
            }
        }
    }

    #[test]
    fn test_exactly_k_boundaries() {
        assert!(Goal::exactly_k(&[], 1, Role::Good).is_unsatisfiable());
        assert_eq!(Goal::exactly_k(&[], 0, Role::Good), Goal::trivial());

        let cells = [Cell::new(1, 1), Cell::new(1, 2)];
        assert_eq!(
            Goal::exactly_k(&cells, 0, Role::Good),
            Goal::And(vec![
                Goal::equals(Cell::new(1, 1), Role::Bad),
                Goal::equals(Cell::new(1, 2), Role::Bad),
            ])
        );
    }

    #[test]
    fn test_and_or_flatten() {
        let a = Goal::equals(Cell::new(1, 1), Role::Good);
        let b = Goal::equals(Cell::new(1, 2), Role::Bad);
        let goal = Goal::and([Goal::and([a.clone()]), b.clone()]);
        assert_eq!(goal, Goal::And(vec![a.clone(), b.clone()]));
        let goal = Goal::or([Goal::unsatisfiable(), a.clone()]);
        assert_eq!(goal, Goal::Or(vec![a]));
    }

    #[test]
    fn test_compare_counts() {
        let assignment = Assignment::parse("BGB GGG");
        let role_of = |cell: &Cell| assignment.get(cell);
        let top = assignment.shape.row_cells(1);
        let bottom = assignment.shape.row_cells(2);
        assert!(Goal::compare_counts(&top, &bottom, Role::Bad, Comparison::More).holds(&role_of));
        assert!(!Goal::compare_counts(&top, &bottom, Role::Bad, Comparison::Same).holds(&role_of));
        assert!(Goal::compare_counts(&top, &bottom, Role::Good, Comparison::Fewer).holds(&role_of));
    }
}
