//! Reward, level, and sync tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Score, Xp};

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed into the config struct.
    #[error("configuration parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// No level thresholds were given.
    #[error("level threshold table is empty")]
    EmptyLevelTable,

    /// A level would divide by zero.
    #[error("level {level} has a zero interaction threshold")]
    ZeroThreshold {
        /// 1-based level with the zero entry.
        level: u32,
    },

    /// Passing score above 100.
    #[error("passing score {0} exceeds 100")]
    PassingScoreOutOfRange(Score),

    /// `remote_timeout_ms` is zero.
    #[error("remote timeout must be non-zero")]
    ZeroRemoteTimeout,
}

/// Interactions (completed lessons plus quiz attempts) needed to fill each
/// level's progress bar. Entry `i` covers level `i + 1`; levels past the end
/// reuse the last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelThresholds(Vec<u32>);

impl LevelThresholds {
    /// Validates and wraps a threshold table.
    pub fn new(thresholds: Vec<u32>) -> Result<Self, ConfigError> {
        let table = Self(thresholds);
        table.validate()?;
        Ok(table)
    }

    /// Threshold for `level` (1-based). Level 0 is treated as level 1.
    pub fn for_level(&self, level: u32) -> u32 {
        let idx = (level.max(1) - 1) as usize;
        self.0
            .get(idx)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or(DEFAULT_LEVEL_THRESHOLD)
            .max(1)
    }

    /// Number of levels with an explicit threshold.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        if let Some(idx) = self.0.iter().position(|t| *t == 0) {
            return Err(ConfigError::ZeroThreshold {
                level: idx as u32 + 1,
            });
        }
        Ok(())
    }
}

/// Interactions per level in the single-level content set.
pub const DEFAULT_LEVEL_THRESHOLD: u32 = 10;

impl Default for LevelThresholds {
    fn default() -> Self {
        Self(vec![DEFAULT_LEVEL_THRESHOLD])
    }
}

/// Ledger rewards and scoring rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// XP granted the first time a lesson is completed.
    pub lesson_xp: Xp,
    /// XP granted per correct quiz answer.
    pub quiz_xp_per_correct: Xp,
    /// Minimum score for a passed quiz.
    pub passing_score: Score,
    /// Per-level progress thresholds.
    pub levels: LevelThresholds,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            lesson_xp: 25,
            quiz_xp_per_correct: 10,
            passing_score: 60,
            levels: LevelThresholds::default(),
        }
    }
}

impl ProgressConfig {
    /// Parses overrides from JSON; missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passing_score > 100 {
            return Err(ConfigError::PassingScoreOutOfRange(self.passing_score));
        }
        self.levels.validate()
    }
}

/// Remote mirroring knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on a single remote write.
    pub remote_timeout_ms: u64,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: 10_000,
            event_capacity: 256,
        }
    }
}

impl SyncConfig {
    /// Remote timeout as a [`Duration`].
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_timeout_ms == 0 {
            return Err(ConfigError::ZeroRemoteTimeout);
        }
        Ok(())
    }
}
