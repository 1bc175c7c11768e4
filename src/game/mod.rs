pub mod clue_catalog;
pub mod clue_formatter;
pub mod clue_generator;
mod clue_generator_state;
pub mod deduction_engine;
pub mod settings;

pub use clue_catalog::{build_catalog, ClueTemplate};
pub use clue_formatter::{format_clue, format_parts};
pub use clue_generator::{Attempt, PuzzleGenerator};
pub use clue_generator_state::ClueGeneratorStats;
pub use deduction_engine::{DeductionEngine, DeductionResult};
pub use settings::GeneratorSettings;
