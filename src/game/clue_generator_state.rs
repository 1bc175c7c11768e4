use std::collections::BTreeSet;

use log::trace;

use crate::{
    game::clue_formatter::format_clue,
    model::{Assignment, Cell, Characters, ClueKind, Deduction, PuzzleStep, RoleLabels},
    solver::{Certainty, Goal, Solver},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClueGeneratorStats {
    pub n_evaluated: usize,
    pub n_rejected_unsatisfiable: usize,
    pub n_rejected_no_deductions: usize,
    pub n_rejected_too_many_deductions: usize,
    pub n_rejected_reveals_speaker: usize,
    pub n_bare_facts: usize,
}

/// A candidate clue that passed every rejection rule.
#[derive(Debug)]
pub struct ClueEvaluation {
    pub newly_deduced: Vec<Deduction>,
    pub certainty: Certainty,
}

/// Bookkeeping for one generation attempt against one target assignment.
pub struct ClueGeneratorState<'a> {
    pub characters: &'a Characters,
    pub labels: &'a RoleLabels,
    pub target: Assignment,
    pub speaker: Cell,
    pub goals: Vec<Goal>,
    pub deduced: Certainty,
    pub used_keys: BTreeSet<String>,
    pub steps: Vec<PuzzleStep>,
    pub max_new_cells: usize,
    pub stats: ClueGeneratorStats,
}

impl<'a> ClueGeneratorState<'a> {
    pub(crate) fn new(
        characters: &'a Characters,
        labels: &'a RoleLabels,
        target: Assignment,
        start: Cell,
        max_new_cells: usize,
    ) -> Self {
        let shape = target.shape;
        let goals = vec![
            Goal::everyone_has_a_role(&shape),
            Goal::equals(start, target.get(&start)),
        ];
        let deduced = Solver::new(shape, &Goal::and(goals.iter().cloned()))
            .certainty()
            .unwrap_or_default();
        trace!(
            target: "clue_generator",
            "Starting at {:?}; initially deduced {:?}",
            start,
            deduced
        );
        Self {
            characters,
            labels,
            target,
            speaker: start,
            goals,
            deduced,
            used_keys: BTreeSet::new(),
            steps: Vec::new(),
            max_new_cells,
            stats: ClueGeneratorStats::default(),
        }
    }

    pub fn total_cells(&self) -> usize {
        self.target.shape.len()
    }

    pub fn is_complete(&self) -> bool {
        self.deduced.len() == self.total_cells()
    }

    pub fn unknown_cells(&self) -> Vec<Cell> {
        self.target
            .shape
            .cells()
            .filter(|cell| !self.deduced.contains_key(cell))
            .collect()
    }

    /// Accumulated goals, the cells they already force, and `goal`.
    /// Conjoining the forced cells leaves the solution set unchanged and pins
    /// them for the solver.
    fn conjoined(&self, goal: &Goal) -> Goal {
        Goal::and(
            self.goals
                .iter()
                .cloned()
                .chain(
                    self.deduced
                        .iter()
                        .map(|(cell, role)| Goal::equals(*cell, *role)),
                )
                .chain(std::iter::once(goal.clone())),
        )
    }

    fn certainty_with(&self, goal: &Goal) -> Option<(Certainty, Vec<Deduction>)> {
        let certainty = Solver::new(self.target.shape, &self.conjoined(goal)).certainty()?;
        let newly_deduced = certainty
            .iter()
            .filter(|(cell, _)| !self.deduced.contains_key(cell))
            .map(|(cell, role)| Deduction::new(*cell, *role))
            .collect();
        Some((certainty, newly_deduced))
    }

    /// Applies the rejection rules to one candidate goal.
    pub(crate) fn evaluate(&mut self, goal: &Goal) -> Option<ClueEvaluation> {
        self.stats.n_evaluated += 1;
        let Some((certainty, newly_deduced)) = self.certainty_with(goal) else {
            self.stats.n_rejected_unsatisfiable += 1;
            return None;
        };
        if newly_deduced.is_empty() {
            self.stats.n_rejected_no_deductions += 1;
            return None;
        }
        if newly_deduced.len() > self.max_new_cells {
            self.stats.n_rejected_too_many_deductions += 1;
            return None;
        }
        if newly_deduced.iter().any(|d| d.cell == self.speaker) {
            self.stats.n_rejected_reveals_speaker += 1;
            return None;
        }
        Some(ClueEvaluation {
            newly_deduced,
            certainty,
        })
    }

    fn step(&self, speaker: Cell, kind: &ClueKind, deductable_cells: Vec<Deduction>) -> PuzzleStep {
        PuzzleStep {
            row: speaker.row,
            column: speaker.col,
            role: self.target.get(&speaker),
            statement: format_clue(kind, self.characters, self.labels, Some(&speaker)),
            mechanic_statement: None,
            parts: kind.to_parts(self.labels),
            referenced_cells: kind
                .referenced_cells()
                .into_iter()
                .filter(|cell| *cell != speaker)
                .collect(),
            deductable_cells,
        }
    }

    /// Records an accepted clue, quoted by the current speaker, and hands the
    /// floor to the first newly deduced cell.
    pub(crate) fn add_clue(
        &mut self,
        key: Option<String>,
        kind: &ClueKind,
        goal: Goal,
        evaluation: ClueEvaluation,
    ) {
        trace!(
            target: "clue_generator",
            "{:?} says {:?}, deducing {:?}",
            self.speaker,
            kind,
            evaluation.newly_deduced
        );
        let step = self.step(self.speaker, kind, evaluation.newly_deduced.clone());
        self.steps.push(step);
        self.goals.push(goal);
        if let Some(key) = key {
            self.used_keys.insert(key);
        }
        self.deduced = evaluation.certainty;
        if let Some(next) = evaluation.newly_deduced.iter().map(|d| d.cell).min() {
            self.speaker = next;
        }
    }

    /// Reveals `cell` as a bare fact. Used when no catalog clue is
    /// acceptable; the fact may still force further cells.
    pub(crate) fn add_bare_fact(&mut self, cell: Cell) {
        self.stats.n_bare_facts += 1;
        let kind = ClueKind::Is {
            role: self.target.get(&cell),
            cell,
        };
        let goal = Goal::equals(cell, self.target.get(&cell));
        let (certainty, newly_deduced) = match self.certainty_with(&goal) {
            Some(result) => result,
            // unreachable while every goal holds for the target
            None => return,
        };
        self.add_clue(
            None,
            &kind,
            goal,
            ClueEvaluation {
                newly_deduced,
                certainty,
            },
        );
    }

    /// A closing statement that deduces nothing new.
    pub(crate) fn add_final_statement(&mut self, kind: &ClueKind, key: Option<String>) {
        let step = self.step(self.speaker, kind, vec![]);
        self.steps.push(step);
        if let Some(key) = key {
            self.used_keys.insert(key);
        }
    }

    /// Gives every cell that never spoke a statement about itself.
    pub(crate) fn backfill_silent_cells(&mut self) {
        let spoken: BTreeSet<Cell> = self.steps.iter().map(|step| step.speaker()).collect();
        let silent: Vec<Cell> = self
            .target
            .shape
            .cells()
            .filter(|cell| !spoken.contains(cell))
            .collect();
        for cell in silent {
            let kind = ClueKind::Is {
                role: self.target.get(&cell),
                cell,
            };
            let step = self.step(cell, &kind, vec![]);
            self.steps.push(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GridShape, Role};

    fn state<'a>(
        characters: &'a Characters,
        labels: &'a RoleLabels,
        target: &str,
    ) -> ClueGeneratorState<'a> {
        ClueGeneratorState::new(characters, labels, Assignment::parse(target), Cell::new(1, 1), 2)
    }

    #[test]
    fn test_start_is_deduced() {
        let characters = Characters::placeholder(GridShape::new(2, 2).unwrap());
        let labels = RoleLabels::default();
        let state = state(&characters, &labels, "BG GG");
        assert_eq!(state.deduced.len(), 1);
        assert_eq!(state.deduced.get(&Cell::new(1, 1)), Some(&Role::Bad));
        assert_eq!(state.unknown_cells().len(), 3);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_evaluate_rejections() {
        let characters = Characters::placeholder(GridShape::new(2, 2).unwrap());
        let labels = RoleLabels::default();
        let mut state = state(&characters, &labels, "BG GG");
        let shape = state.target.shape;

        // nothing new
        let either = Goal::or([
            Goal::equals(Cell::new(1, 2), Role::Good),
            Goal::equals(Cell::new(2, 1), Role::Good),
        ]);
        assert!(state.evaluate(&either).is_none());
        assert_eq!(state.stats.n_rejected_no_deductions, 1);

        // three new cells at once
        let all_good = Goal::exactly_k(&shape.cells().collect::<Vec<_>>(), 3, Role::Good);
        assert!(state.evaluate(&all_good).is_none());
        assert_eq!(state.stats.n_rejected_too_many_deductions, 1);

        assert!(state.evaluate(&Goal::unsatisfiable()).is_none());
        assert_eq!(state.stats.n_rejected_unsatisfiable, 1);

        let row = Goal::exactly_k(&shape.row_cells(1), 1, Role::Bad);
        let evaluation = state.evaluate(&row).unwrap();
        assert_eq!(
            evaluation.newly_deduced,
            vec![Deduction::new(Cell::new(1, 2), Role::Good)]
        );
        assert_eq!(state.stats.n_evaluated, 4);
    }

    #[test]
    fn test_add_clue_moves_speaker() {
        let characters = Characters::placeholder(GridShape::new(2, 2).unwrap());
        let labels = RoleLabels::default();
        let mut state = state(&characters, &labels, "BG GG");
        let kind = ClueKind::RowCount {
            role: Role::Bad,
            row: 1,
            count: 1,
        };
        let goal = kind.goal(&characters);
        let evaluation = state.evaluate(&goal).unwrap();
        state.add_clue(Some(kind.key()), &kind, goal, evaluation);

        assert_eq!(state.speaker, Cell::new(1, 2));
        assert_eq!(state.steps.len(), 1);
        let step = &state.steps[0];
        assert_eq!(step.speaker(), Cell::new(1, 1));
        assert_eq!(step.role, Role::Bad);
        assert_eq!(step.statement, "There is one criminal in row 1.");
        assert!(state.used_keys.contains("row_count bad 1 1"));
    }

    #[test]
    fn test_bare_fact_and_backfill() {
        let characters = Characters::placeholder(GridShape::new(1, 2).unwrap());
        let labels = RoleLabels::default();
        let mut state = state(&characters, &labels, "BG");
        state.add_bare_fact(Cell::new(1, 2));
        assert!(state.is_complete());
        assert_eq!(state.steps[0].statement, "Bobby is an innocent.");
        assert_eq!(state.speaker, Cell::new(1, 2));

        state.backfill_silent_cells();
        assert_eq!(state.steps.len(), 2);
        assert_eq!(state.steps[1].speaker(), Cell::new(1, 2));
        assert_eq!(state.steps[1].statement, "I am an innocent.");
        assert!(state.steps[1].referenced_cells.is_empty());
        assert_eq!(state.steps[0].referenced_cells, vec![Cell::new(1, 2)]);
        assert!(state.steps[1].deductable_cells.is_empty());
    }
}
