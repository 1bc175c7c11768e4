use itertools::Itertools;
use log::{info, trace, warn};
use rand::{
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
    Rng, SeedableRng,
};

use crate::{
    error::{GenerationError, GridError},
    game::{
        clue_catalog::{build_catalog, ClueTemplate},
        clue_generator_state::{ClueEvaluation, ClueGeneratorState, ClueGeneratorStats},
        settings::GeneratorSettings,
    },
    model::{Assignment, Cell, Characters, ClueKind, Deduction, GridShape, Puzzle, PuzzleStep},
    solver::{Certainty, Goal},
};

/// Outcome of one generation attempt, complete or not.
#[derive(Debug)]
pub struct Attempt {
    pub target: Assignment,
    pub start: Deduction,
    pub goals: Vec<Goal>,
    pub deduced: Certainty,
    pub steps: Vec<PuzzleStep>,
    pub stats: ClueGeneratorStats,
}

impl Attempt {
    pub fn is_complete(&self) -> bool {
        self.deduced.len() == self.target.shape.len()
    }
}

/// Builds puzzles whose statements, read in order from one revealed cell,
/// pin down a random target assignment without guessing.
pub struct PuzzleGenerator {
    settings: GeneratorSettings,
    characters: Characters,
    shape: GridShape,
    rng: StdRng,
}

impl PuzzleGenerator {
    pub fn new(
        settings: GeneratorSettings,
        characters: Characters,
    ) -> Result<Self, GenerationError> {
        let shape = settings.shape()?;
        if characters.shape() != shape {
            return Err(GridError::ShapeMismatch {
                rows: shape.rows,
                cols: shape.cols,
            }
            .into());
        }
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        info!(target: "clue_generator", "Generating {}x{} puzzles with seed {}", shape.rows, shape.cols, seed);
        Ok(Self {
            settings,
            characters,
            shape,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn characters(&self) -> &Characters {
        &self.characters
    }

    /// Retries with a fresh target until an attempt deduces every cell.
    pub fn generate(&mut self) -> Result<Puzzle, GenerationError> {
        for attempt_number in 1..=self.settings.max_attempts {
            let attempt = self.generate_attempt();
            info!(
                target: "clue_generator",
                "Attempt {}: {} steps, {}/{} cells deduced, stats: {:?}",
                attempt_number,
                attempt.steps.len(),
                attempt.deduced.len(),
                self.shape.len(),
                attempt.stats
            );
            if attempt.is_complete() {
                return Ok(Puzzle::new(
                    self.characters.clone(),
                    self.settings.role_labels.clone(),
                    attempt.start,
                    attempt.steps,
                ));
            }
            warn!(
                target: "clue_generator",
                "Attempt {} ran out of steps; retrying with a new target",
                attempt_number
            );
        }
        Err(GenerationError::Exhausted {
            attempts: self.settings.max_attempts,
        })
    }

    /// One attempt against a freshly drawn target and starting cell.
    pub fn generate_attempt(&mut self) -> Attempt {
        let target = Assignment::random(self.shape, &mut self.rng);
        let start = self.shape.cell_at(self.rng.random_range(0..self.shape.len()));
        self.generate_for(target, start)
    }

    /// One attempt against a given target, starting from `start`.
    pub fn generate_for(&mut self, target: Assignment, start: Cell) -> Attempt {
        let mut catalog = build_catalog(&target, &self.characters);
        if GeneratorSettings::is_debug_mode() {
            info!(
                target: "clue_generator",
                "Catalog of {} templates: {:?}",
                catalog.len(),
                catalog.iter().map(|t| t.kind.opcode()).counts()
            );
        }
        catalog.shuffle(&mut self.rng);

        let mut state = ClueGeneratorState::new(
            &self.characters,
            &self.settings.role_labels,
            target,
            start,
            self.settings.max_new_cells_per_clue,
        );
        let budget = self.settings.step_budget(self.shape.len());
        let mut n_steps = 0;

        while !state.is_complete() && n_steps < budget {
            n_steps += 1;
            match choose_clue(&mut state, &catalog) {
                Some((template, evaluation)) => state.add_clue(
                    Some(template.key.clone()),
                    &template.kind,
                    template.goal.clone(),
                    evaluation,
                ),
                None => {
                    let unknown = state
                        .unknown_cells()
                        .into_iter()
                        .filter(|cell| *cell != state.speaker)
                        .collect::<Vec<_>>();
                    let Some(cell) = unknown.choose(&mut self.rng).copied() else {
                        break;
                    };
                    trace!(target: "clue_generator", "No clue fits; revealing {:?}", cell);
                    state.add_bare_fact(cell);
                }
            }
        }

        if state.is_complete() {
            let closing = catalog
                .iter()
                .find(|template| !state.used_keys.contains(&template.key));
            match closing {
                Some(template) => state.add_final_statement(&template.kind, Some(template.key.clone())),
                None => {
                    let others = self
                        .shape
                        .cells()
                        .filter(|cell| *cell != state.speaker)
                        .collect::<Vec<_>>();
                    if let Some(cell) = others.choose(&mut self.rng).copied() {
                        let kind = ClueKind::Is {
                            role: state.target.get(&cell),
                            cell,
                        };
                        state.add_final_statement(&kind, None);
                    }
                }
            }
            state.backfill_silent_cells();
        }

        let ClueGeneratorState {
            target,
            goals,
            deduced,
            steps,
            stats,
            ..
        } = state;
        Attempt {
            start: Deduction::new(start, target.get(&start)),
            target,
            goals,
            deduced,
            steps,
            stats,
        }
    }
}

/// The first unused template that settles exactly one cell, otherwise the
/// acceptable one that settles the fewest.
fn choose_clue<'c>(
    state: &mut ClueGeneratorState,
    catalog: &'c [ClueTemplate],
) -> Option<(&'c ClueTemplate, ClueEvaluation)> {
    let mut fallback: Option<(&ClueTemplate, ClueEvaluation)> = None;
    for template in catalog {
        if state.used_keys.contains(&template.key) {
            continue;
        }
        let Some(evaluation) = state.evaluate(&template.goal) else {
            continue;
        };
        if evaluation.newly_deduced.len() == 1 {
            return Some((template, evaluation));
        }
        let better = fallback
            .as_ref()
            .map_or(true, |(_, best)| evaluation.newly_deduced.len() < best.newly_deduced.len());
        if better {
            fallback = Some((template, evaluation));
        }
    }
    trace!(
        target: "clue_generator",
        "No single-cell clue; fallback {:?}, stats: {:?}",
        fallback.as_ref().map(|(template, _)| &template.key),
        state.stats
    );
    fallback
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use test_context::test_context;

    use super::*;
    use crate::game::DeductionEngine;
    use crate::model::Role;
    use crate::solver::Solver;
    use crate::tests::UsingLogger;

    fn generator(rows: usize, cols: usize, seed: u64) -> PuzzleGenerator {
        let mut settings = GeneratorSettings::sized(rows, cols);
        settings.seed = Some(seed);
        let characters = Characters::placeholder(GridShape::new(rows, cols).unwrap());
        PuzzleGenerator::new(settings, characters).unwrap()
    }

    fn step_goal(step: &PuzzleStep, generator: &PuzzleGenerator) -> Goal {
        ClueKind::from_parts(&step.parts, &generator.settings().role_labels)
            .unwrap()
            .goal(generator.characters())
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_attempt_is_complete_and_true(_: &mut UsingLogger) {
        for seed in 0..4 {
            let mut generator = generator(2, 3, seed);
            let attempt = generator.generate_attempt();
            assert!(attempt.is_complete(), "seed {}", seed);
            assert_eq!(attempt.deduced.len(), 6);
            for step in &attempt.steps {
                let goal = step_goal(step, &generator);
                assert!(
                    goal.holds(&|cell: &Cell| attempt.target.get(cell)),
                    "seed {}: {} is false",
                    seed,
                    step.statement
                );
                assert_eq!(step.role, attempt.target.get(&step.speaker()));
            }
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_unique_solution_and_one_statement_each(_: &mut UsingLogger) {
        let mut generator = generator(3, 3, 17);
        let attempt = generator.generate_attempt();
        let shape = attempt.target.shape;

        let goal = Goal::and(
            [
                Goal::everyone_has_a_role(&shape),
                Goal::equals(attempt.start.cell, attempt.start.role),
            ]
            .into_iter()
            .chain(attempt.steps.iter().map(|step| step_goal(step, &generator))),
        );
        let solutions = Solver::new(shape, &goal).solve();
        assert_eq!(solutions.len(), 1);
        assert!(solutions.contains(&attempt.target));

        let mut speakers = attempt.steps.iter().map(|step| step.speaker()).collect::<Vec<_>>();
        speakers.sort();
        assert_eq!(speakers, shape.cells().collect::<Vec<_>>());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_speaker_known_before_speaking(_: &mut UsingLogger) {
        let mut generator = generator(3, 3, 5);
        let attempt = generator.generate_attempt();
        let mut known: BTreeMap<Cell, Role> = BTreeMap::new();
        known.insert(attempt.start.cell, attempt.start.role);
        for step in &attempt.steps {
            assert!(
                known.contains_key(&step.speaker()),
                "{:?} speaks before being deduced",
                step.speaker()
            );
            assert!(step.deductable_cells.len() <= 2);
            for deduction in &step.deductable_cells {
                assert!(known.insert(deduction.cell, deduction.role).is_none());
            }
        }
        assert_eq!(known.len(), 9);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_generated_puzzle_replays(_: &mut UsingLogger) {
        let mut generator = generator(2, 3, 99);
        let puzzle = generator.generate().unwrap();
        assert_eq!(puzzle.steps.len(), 6);
        let engine = DeductionEngine::for_puzzle(&puzzle);
        assert_eq!(engine.replay(&puzzle), Ok(()));
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let a = generator(2, 2, 3).generate().unwrap();
        let b = generator(2, 2, 3).generate().unwrap();
        assert_eq!(a.start, b.start);
        assert_eq!(a.steps, b.steps);
    }

    #[test]
    fn test_fixed_target() {
        let mut generator = generator(2, 2, 1);
        let target = Assignment::parse("BG GG");
        let attempt = generator.generate_for(target.clone(), Cell::new(1, 1));
        assert!(attempt.is_complete());
        assert_eq!(attempt.start, Deduction::new(Cell::new(1, 1), Role::Bad));
        assert_eq!(attempt.steps[0].speaker(), Cell::new(1, 1));
        assert_eq!(attempt.steps.len(), 4);
    }

    #[test]
    fn test_no_attempts_is_an_error() {
        let mut settings = GeneratorSettings::sized(2, 2);
        settings.max_attempts = 0;
        settings.seed = Some(1);
        let characters = Characters::placeholder(GridShape::new(2, 2).unwrap());
        let mut generator = PuzzleGenerator::new(settings, characters).unwrap();
        assert!(matches!(
            generator.generate(),
            Err(GenerationError::Exhausted { attempts: 0 })
        ));
    }

    #[test]
    fn test_rejects_mismatched_inputs() {
        let settings = GeneratorSettings::sized(2, 3);
        let characters = Characters::placeholder(GridShape::new(3, 2).unwrap());
        assert!(matches!(
            PuzzleGenerator::new(settings, characters),
            Err(GenerationError::Grid(GridError::ShapeMismatch { rows: 2, cols: 3 }))
        ));

        let settings = GeneratorSettings::sized(6, 6);
        let characters = Characters::placeholder(GridShape::new(2, 2).unwrap());
        assert!(matches!(
            PuzzleGenerator::new(settings, characters),
            Err(GenerationError::Grid(GridError::InvalidDimensions { .. }))
        ));
    }
}
