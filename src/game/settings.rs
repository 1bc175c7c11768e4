use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{GridResult, SettingsError};
use crate::model::{GridShape, RoleLabels};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratorSettings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default = "default_rows")]
    pub rows: usize,

    #[serde(default = "default_cols")]
    pub cols: usize,

    /// A clue that settles more cells than this at once is rejected.
    #[serde(default = "default_max_new_cells")]
    pub max_new_cells_per_clue: usize,

    /// The generation loop runs for at most this many steps per cell.
    #[serde(default = "default_step_budget_factor")]
    pub step_budget_factor: usize,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub role_labels: RoleLabels,
}

// Helper functions for default values
fn default_version() -> u32 {
    2
}
fn default_rows() -> usize {
    4
}
fn default_cols() -> usize {
    5
}
fn default_max_new_cells() -> usize {
    2
}
fn default_step_budget_factor() -> usize {
    6
}
fn default_max_attempts() -> usize {
    20
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            version: default_version(),
            rows: default_rows(),
            cols: default_cols(),
            max_new_cells_per_clue: default_max_new_cells(),
            step_budget_factor: default_step_budget_factor(),
            max_attempts: default_max_attempts(),
            seed: None,
            role_labels: RoleLabels::default(),
        }
    }
}

impl GeneratorSettings {
    /// Defaults for every field except the grid size.
    pub fn sized(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut settings = serde_json::from_str::<GeneratorSettings>(&contents)?;
        settings.migrate();
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn migrate(&mut self) {
        match self.version {
            // version 1 allowed a cap of zero, which can never make progress
            0 | 1 => {
                self.max_new_cells_per_clue = self.max_new_cells_per_clue.max(1);
                self.version = 2;
            }
            _ => (),
        }
    }

    /// Apply `SEED` from the environment when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(seed) = Self::seed_from_env() {
            self.seed = Some(seed);
        }
        self
    }

    pub fn shape(&self) -> GridResult<GridShape> {
        GridShape::new(self.rows, self.cols)
    }

    pub fn step_budget(&self, cells: usize) -> usize {
        self.step_budget_factor * cells
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        let value = std::env::var("SEED").ok()?;
        match value.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(err) => {
                warn!(target: "settings", "Ignoring SEED={:?}: {}", value, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: GeneratorSettings = serde_json::from_str(r#"{"rows": 3}"#).unwrap();
        assert_eq!(settings.rows, 3);
        assert_eq!(settings.cols, 5);
        assert_eq!(settings.max_new_cells_per_clue, 2);
        assert_eq!(settings.step_budget(settings.rows * settings.cols), 90);
        assert_eq!(settings.role_labels, RoleLabels::default());
    }

    #[test]
    fn test_sized_keeps_other_defaults() {
        let settings = GeneratorSettings::sized(2, 3);
        assert_eq!((settings.rows, settings.cols), (2, 3));
        assert_eq!(settings.version, default_version());
        assert_eq!(settings.max_attempts, 20);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_migrate_old_version() {
        let mut settings: GeneratorSettings =
            serde_json::from_str(r#"{"version": 1, "max_new_cells_per_clue": 0}"#).unwrap();
        settings.migrate();
        assert_eq!(settings.max_new_cells_per_clue, 1);
        assert_eq!(settings.version, 2);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("cluegrid-{}", uuid::Uuid::new_v4()))
            .join("settings.json");
        let settings = GeneratorSettings {
            seed: Some(11),
            role_labels: RoleLabels::new("villager", "werewolf"),
            ..GeneratorSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(GeneratorSettings::load(&path).unwrap(), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_reports_errors() {
        assert!(matches!(
            GeneratorSettings::load("/nonexistent/cluegrid/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(GeneratorSettings::seed_from_env(), Some(42));
        assert_eq!(GeneratorSettings::default().with_env_overrides().seed, Some(42));

        std::env::set_var("SEED", "not a number");
        assert_eq!(GeneratorSettings::seed_from_env(), None);

        std::env::remove_var("SEED");
        assert_eq!(GeneratorSettings::seed_from_env(), None);
    }

    #[test]
    #[serial]
    fn test_debug_mode() {
        std::env::set_var("DEBUG", "1");
        assert!(GeneratorSettings::is_debug_mode());
        std::env::remove_var("DEBUG");
        assert!(!GeneratorSettings::is_debug_mode());
    }
}
