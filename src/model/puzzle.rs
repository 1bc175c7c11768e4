use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampSeconds;
use uuid::Uuid;

use crate::model::{Cell, Characters, ClueParts, Deduction, GridShape, Role, RoleLabels};

/// One statement in a generated puzzle, attributed to the person at
/// `(row, column)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStep {
    pub row: usize,
    pub column: usize,
    pub role: Role,
    pub statement: String,
    /// The generated text, kept once `statement` has been restyled so the
    /// logical content stays recoverable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanic_statement: Option<String>,
    pub parts: ClueParts,
    /// Cells named by the statement, other than the speaker.
    pub referenced_cells: Vec<Cell>,
    pub deductable_cells: Vec<Deduction>,
}

impl PuzzleStep {
    pub fn speaker(&self) -> Cell {
        Cell::new(self.row, self.column)
    }

    /// The statement as generated, regardless of any restyling.
    pub fn mechanic_statement(&self) -> &str {
        self.mechanic_statement.as_deref().unwrap_or(&self.statement)
    }

    /// Replace the display text, keeping the generated text alongside it.
    pub fn restyled(mut self, statement: impl Into<String>) -> Self {
        if self.mechanic_statement.is_none() {
            self.mechanic_statement = Some(self.statement.clone());
        }
        self.statement = statement.into();
        self
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: Uuid,
    #[serde_as(as = "TimestampSeconds")]
    pub generated_at: SystemTime,
    pub rows: usize,
    pub columns: usize,
    pub role_labels: RoleLabels,
    pub characters: Characters,
    /// The one cell revealed before any statement is read.
    pub start: Deduction,
    pub steps: Vec<PuzzleStep>,
}

/// Persisted timestamps carry whole seconds only.
fn now_in_whole_seconds() -> SystemTime {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs())
}

impl Puzzle {
    pub fn new(
        characters: Characters,
        role_labels: RoleLabels,
        start: Deduction,
        steps: Vec<PuzzleStep>,
    ) -> Self {
        let shape = characters.shape();
        Self {
            id: Uuid::new_v4(),
            generated_at: now_in_whole_seconds(),
            rows: shape.rows,
            columns: shape.cols,
            role_labels,
            characters,
            start,
            steps,
        }
    }

    pub fn shape(&self) -> GridShape {
        self.characters.shape()
    }

    pub fn step_for(&self, cell: &Cell) -> Option<&PuzzleStep> {
        self.steps.iter().find(|step| step.speaker() == *cell)
    }
}
