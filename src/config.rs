use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    get_frame_interval_ms, get_level_pursuer_speed, CELL_SIZE, CHASE_MS, DEFAULT_LAYOUT,
    LEVEL_PURSUER_SPEEDS, LEVEL_TRANSITION_MS, PLAYER_SPEED, POWER_DURATION_MS,
    RESPAWN_DELAY_MS, SCARED_SPEED, SCATTER_MS, STARTING_LIVES, TARGET_FPS,
};
use crate::error::ConfigError;

/// Session tunables. Every field falls back to the value in `constants`
/// when absent from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub target_fps: u32,
    pub starting_lives: u32,
    pub player_speed: f32,
    pub scared_speed: f32,
    pub level_pursuer_speeds: Vec<f32>,
    pub power_duration_ms: u64,
    pub respawn_delay_ms: u64,
    pub level_transition_ms: u64,
    pub scatter_ms: u64,
    pub chase_ms: u64,
    pub seed: u64,
    pub layout: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            starting_lives: STARTING_LIVES,
            player_speed: PLAYER_SPEED,
            scared_speed: SCARED_SPEED,
            level_pursuer_speeds: LEVEL_PURSUER_SPEEDS.to_vec(),
            power_duration_ms: POWER_DURATION_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            level_transition_ms: LEVEL_TRANSITION_MS,
            scatter_ms: SCATTER_MS,
            chase_ms: CHASE_MS,
            seed: 0,
            layout: DEFAULT_LAYOUT.iter().map(|row| row.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Reads a plain-text maze, one row per line. Trailing blank lines are
    /// dropped.
    pub fn load_layout(path: &Path) -> Result<Vec<String>, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut rows: Vec<String> = raw
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        while rows.last().map(|row| row.is_empty()).unwrap_or(false) {
            rows.pop();
        }
        Ok(rows)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(invalid("targetFps must be at least 1"));
        }
        if self.starting_lives == 0 {
            return Err(invalid("startingLives must be at least 1"));
        }
        if !within_cell_step(self.player_speed) {
            return Err(invalid("playerSpeed must be positive and below the cell size"));
        }
        if self.level_pursuer_speeds.is_empty() {
            return Err(invalid("levelPursuerSpeeds must not be empty"));
        }
        if !self.level_pursuer_speeds.iter().copied().all(within_cell_step) {
            return Err(invalid(
                "levelPursuerSpeeds entries must be positive and below the cell size",
            ));
        }
        let slowest = self
            .level_pursuer_speeds
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        if !(self.scared_speed > 0.0) || self.scared_speed >= slowest {
            return Err(invalid(
                "scaredSpeed must be positive and below every level pursuer speed",
            ));
        }
        if self.scatter_ms == 0 || self.chase_ms == 0 {
            return Err(invalid("scatterMs and chaseMs must be positive"));
        }
        if self.power_duration_ms == 0 {
            return Err(invalid("powerDurationMs must be positive"));
        }
        Ok(())
    }

    pub fn frame_interval_ms(&self) -> f64 {
        get_frame_interval_ms(self.target_fps)
    }

    pub fn pursuer_speed_for_level(&self, level: u32) -> Option<f32> {
        get_level_pursuer_speed(&self.level_pursuer_speeds, level)
    }

    pub fn level_speeds(&self) -> Result<LevelSpeeds, ConfigError> {
        LevelSpeeds::new(&self.level_pursuer_speeds)
    }
}

/// Non-empty pursuer speed table. Levels past the end reuse the last entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSpeeds {
    speeds: Vec<f32>,
    last: f32,
}

impl LevelSpeeds {
    pub fn new(speeds: &[f32]) -> Result<Self, ConfigError> {
        let last = *speeds
            .last()
            .ok_or_else(|| invalid("levelPursuerSpeeds must not be empty"))?;
        Ok(Self {
            speeds: speeds.to_vec(),
            last,
        })
    }

    pub fn for_level(&self, level: u32) -> f32 {
        let index = level.saturating_sub(1) as usize;
        self.speeds.get(index).copied().unwrap_or(self.last)
    }
}

/// An agent moving a full cell or more per tick could skip a one-cell wall.
fn within_cell_step(speed: f32) -> bool {
    speed > 0.0 && speed < CELL_SIZE
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_string(),
    }
}
