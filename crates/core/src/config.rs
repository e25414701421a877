//! Session configuration
//!
//! Chosen once at session start and never changed afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    GameMode, GridPreset, DEFAULT_NEXT_COUNT, MAX_NEXT_COUNT, MAX_START_LEVEL, MIN_START_LEVEL,
    SPRINT_GOAL_LINES, ULTRA_TIME_LIMIT_SECS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("start level {0} is outside 1..=20")]
    StartLevel(u32),
    #[error("next queue length {0} is outside 1..=6")]
    NextCount(usize),
    #[error("sprint goal must be at least one line")]
    SprintGoal,
    #[error("ultra time limit must be at least one second")]
    UltraLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub grid: GridPreset,
    pub mode: GameMode,
    pub start_level: u32,
    pub next_count: usize,
    /// Lines to clear in sprint mode
    pub sprint_goal: u32,
    /// Session length in ultra mode
    pub ultra_time_limit_secs: u32,
    /// Bag seed; `None` draws from OS entropy and cannot be replayed
    pub seed: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridPreset::Standard,
            mode: GameMode::Marathon,
            start_level: MIN_START_LEVEL,
            next_count: DEFAULT_NEXT_COUNT,
            sprint_goal: SPRINT_GOAL_LINES,
            ultra_time_limit_secs: ULTRA_TIME_LIMIT_SECS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `BLOCKFALL_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// `self` overlaid with `BLOCKFALL_*` environment variables
    pub fn with_env(self) -> Self {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up by variable name. Unparseable values are
    /// ignored.
    pub fn overlay(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(grid) = var("BLOCKFALL_GRID").and_then(|s| GridPreset::from_str(s.trim())) {
            self.grid = grid;
        }
        if let Some(mode) = var("BLOCKFALL_MODE").and_then(|s| GameMode::from_str(s.trim())) {
            self.mode = mode;
        }
        if let Some(level) = var("BLOCKFALL_START_LEVEL").and_then(|s| s.trim().parse().ok()) {
            self.start_level = level;
        }
        if let Some(next) = var("BLOCKFALL_NEXT").and_then(|s| s.trim().parse().ok()) {
            self.next_count = next;
        }
        if let Some(seed) = var("BLOCKFALL_SEED").and_then(|s| s.trim().parse().ok()) {
            self.seed = Some(seed);
        }

        self.sanitized()
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_START_LEVEL..=MAX_START_LEVEL).contains(&self.start_level) {
            return Err(ConfigError::StartLevel(self.start_level));
        }
        if !(1..=MAX_NEXT_COUNT).contains(&self.next_count) {
            return Err(ConfigError::NextCount(self.next_count));
        }
        if self.sprint_goal == 0 {
            return Err(ConfigError::SprintGoal);
        }
        if self.ultra_time_limit_secs == 0 {
            return Err(ConfigError::UltraLimit);
        }
        Ok(())
    }

    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        self.start_level = self.start_level.clamp(MIN_START_LEVEL, MAX_START_LEVEL);
        self.next_count = self.next_count.clamp(1, MAX_NEXT_COUNT);
        self.sprint_goal = self.sprint_goal.max(1);
        self.ultra_time_limit_secs = self.ultra_time_limit_secs.max(1);
        self
    }

    pub fn ultra_time_limit_ms(&self) -> u64 {
        self.ultra_time_limit_secs as u64 * 1000
    }
}
