use log::{trace, warn};

use crate::error::{GridError, GridResult, PartsError, ReplayError};
use crate::model::{Characters, ClueKind, ClueParts, Deduction, GridShape, Puzzle, RoleLabels};
use crate::solver::{Certainty, Goal, Solver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionResult {
    pub deduced: Certainty,
    /// 1 means the revealed clues and known cells pin the whole grid.
    pub solution_count: u64,
    /// Indices of parts that could not be decoded and were ignored.
    pub skipped: Vec<usize>,
}

/// Re-derives, from persisted clue parts, what a player can know. Builds
/// goals through the same clue builders the generator uses.
pub struct DeductionEngine {
    shape: GridShape,
    characters: Characters,
    labels: RoleLabels,
}

impl DeductionEngine {
    pub fn new(shape: GridShape, characters: Characters, labels: RoleLabels) -> GridResult<Self> {
        if characters.shape() != shape {
            return Err(GridError::ShapeMismatch {
                rows: shape.rows,
                cols: shape.cols,
            });
        }
        Ok(Self {
            shape,
            characters,
            labels,
        })
    }

    pub fn for_puzzle(puzzle: &Puzzle) -> Self {
        Self {
            shape: puzzle.shape(),
            characters: puzzle.characters.clone(),
            labels: puzzle.role_labels.clone(),
        }
    }

    fn decode(&self, parts: &ClueParts) -> Result<Goal, PartsError> {
        ClueKind::from_parts(parts, &self.labels).map(|kind| kind.goal(&self.characters))
    }

    fn known_goals<'a>(&self, known: impl IntoIterator<Item = &'a Deduction>) -> Vec<Goal> {
        known
            .into_iter()
            .map(|deduction| Goal::equals(deduction.cell, deduction.role))
            .collect()
    }

    pub fn deduce(&self, parts_list: &[ClueParts], known: &[Deduction]) -> DeductionResult {
        let mut goals = vec![Goal::everyone_has_a_role(&self.shape)];
        goals.extend(self.known_goals(known));
        let mut skipped = Vec::new();
        for (i, parts) in parts_list.iter().enumerate() {
            match self.decode(parts) {
                Ok(goal) => goals.push(goal),
                Err(err) => {
                    warn!(target: "deduction", "Skipping clue {} {:?}: {}", i, parts, err);
                    skipped.push(i);
                }
            }
        }

        let solver = Solver::new(self.shape, &Goal::and(goals));
        let deduced = solver.certainty().unwrap_or_default();
        let solution_count = solver.count();
        trace!(
            target: "deduction",
            "{} clues, {} known: {} cells deduced, {} solutions",
            parts_list.len(),
            known.len(),
            deduced.len(),
            solution_count
        );
        DeductionResult {
            deduced,
            solution_count,
            skipped,
        }
    }

    /// Whether `guess` is forced by the revealed clues and known cells.
    pub fn is_provable(
        &self,
        parts_list: &[ClueParts],
        known: &[Deduction],
        guess: &Deduction,
    ) -> bool {
        self.deduce(parts_list, known).deduced.get(&guess.cell) == Some(&guess.role)
    }

    /// Walks the puzzle's steps in order and checks that each one is spoken
    /// by someone already known and deduces exactly the cells it records.
    pub fn replay(&self, puzzle: &Puzzle) -> Result<(), ReplayError> {
        let recorded = (puzzle.rows, puzzle.columns);
        if puzzle.shape() != self.shape || recorded != (self.shape.rows, self.shape.cols) {
            return Err(GridError::ShapeMismatch {
                rows: puzzle.rows,
                cols: puzzle.columns,
            }
            .into());
        }
        let mut goals = vec![
            Goal::everyone_has_a_role(&self.shape),
            Goal::equals(puzzle.start.cell, puzzle.start.role),
        ];
        let mut known = Solver::new(self.shape, &Goal::and(goals.iter().cloned()))
            .certainty()
            .ok_or(ReplayError::Unsatisfiable { step: 0 })?;

        for (step_index, step) in puzzle.steps.iter().enumerate() {
            if !known.contains_key(&step.speaker()) {
                return Err(ReplayError::SpeakerUnknown { step: step_index });
            }
            let goal = self
                .decode(&step.parts)
                .map_err(|source| ReplayError::Undecodable {
                    step: step_index,
                    source,
                })?;
            goals.push(goal);

            // cells known so far are implied by the goals; pinning them only
            // narrows the search
            let pinned = Goal::and(
                goals
                    .iter()
                    .cloned()
                    .chain(known.iter().map(|(cell, role)| Goal::equals(*cell, *role))),
            );
            let certainty = Solver::new(self.shape, &pinned)
                .certainty()
                .ok_or(ReplayError::Unsatisfiable { step: step_index })?;

            let actual: Vec<Deduction> = certainty
                .iter()
                .filter(|(cell, _)| !known.contains_key(cell))
                .map(|(cell, role)| Deduction::new(*cell, *role))
                .collect();
            let mut expected = step.deductable_cells.clone();
            expected.sort();
            if actual != expected {
                return Err(ReplayError::Mismatch {
                    step: step_index,
                    expected,
                    actual,
                });
            }
            known = certainty;
        }
        Ok(())
    }
}
