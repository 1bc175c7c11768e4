use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use cluegrid::error::{GenerationError, GridError, ReplayError, SettingsError};
use cluegrid::game::{DeductionEngine, GeneratorSettings, PuzzleGenerator};
use cluegrid::model::Characters;
use log::{error, info};
use thiserror::Error;

/// Generate a logic-grid deduction puzzle and print it as JSON.
#[derive(Debug, FromArgs)]
struct Config {
    /// number of rows (overrides the settings file)
    #[argh(option)]
    rows: Option<usize>,

    /// number of columns (overrides the settings file)
    #[argh(option)]
    cols: Option<usize>,

    /// random seed; SEED in the environment also works
    #[argh(option)]
    seed: Option<u64>,

    /// generator settings as JSON
    #[argh(option)]
    settings: Option<PathBuf>,

    /// JSON array with one name per cell, row by row
    #[argh(option)]
    names: Option<PathBuf>,

    /// replay the generated puzzle and fail if any step does not check out
    #[argh(switch)]
    verify: bool,

    /// pretty-print the JSON output
    #[argh(switch)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Puzzle failed verification: {0}")]
    Replay(#[from] ReplayError),

    #[error("Unable to read names from {path:?}: {message}")]
    Names { path: PathBuf, message: String },

    #[error("Unable to write puzzle: {0}")]
    Output(#[from] serde_json::Error),
}

fn init_logging() {
    env_logger::init();
}

fn load_names(path: PathBuf) -> Result<Vec<String>, CliError> {
    let contents = fs::read_to_string(&path).map_err(|err| CliError::Names {
        path: path.clone(),
        message: err.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|err| CliError::Names {
        path,
        message: err.to_string(),
    })
}

fn run(config: Config) -> Result<(), CliError> {
    let mut settings = match &config.settings {
        Some(path) => GeneratorSettings::load(path)?,
        None => GeneratorSettings::default(),
    }
    .with_env_overrides();
    if let Some(rows) = config.rows {
        settings.rows = rows;
    }
    if let Some(cols) = config.cols {
        settings.cols = cols;
    }
    if config.seed.is_some() {
        settings.seed = config.seed;
    }

    let shape = settings.shape()?;
    let characters = match config.names {
        Some(path) => Characters::new(shape, load_names(path)?)?,
        None => Characters::placeholder(shape),
    };

    let mut generator = PuzzleGenerator::new(settings, characters)?;
    let puzzle = generator.generate()?;
    info!(target: "cluegrid", "Generated puzzle {} with {} steps", puzzle.id, puzzle.steps.len());

    if config.verify {
        DeductionEngine::for_puzzle(&puzzle).replay(&puzzle)?;
        info!(target: "cluegrid", "Puzzle {} verified", puzzle.id);
    }

    let json = if config.pretty {
        serde_json::to_string_pretty(&puzzle)?
    } else {
        serde_json::to_string(&puzzle)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let config = argh::from_env::<Config>();
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "cluegrid", "{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
