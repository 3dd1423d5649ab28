//! Session state
//!
//! Counters for one run. Owned by `Game`; everything else reads it.

use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, GameMode};
use crate::tuning::Tuning;

/// Top-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Mode/difficulty selection
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen; timers stopped, counters kept
    Paused,
    /// Run ended
    Over,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndReason {
    #[default]
    None,
    TimeExpired,
    LivesExhausted,
}

/// Complete per-run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub score: u32,
    /// Seconds left on the countdown
    pub time_remaining: u32,
    pub lives: u8,
    pub combo: u32,
    pub max_combo: u32,
    pub phase: GamePhase,
    /// Live (non-removed) targets currently tracked
    pub active_target_count: u32,
    pub end_reason: EndReason,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(GameMode::default(), Difficulty::default(), &Tuning::default())
    }
}

impl SessionState {
    /// Fresh counters for a run; phase starts at `Menu`
    pub fn new(mode: GameMode, difficulty: Difficulty, tuning: &Tuning) -> Self {
        Self {
            mode,
            difficulty,
            score: 0,
            time_remaining: tuning.session_seconds,
            lives: tuning.start_lives,
            combo: 0,
            max_combo: 0,
            phase: GamePhase::Menu,
            active_target_count: 0,
            end_reason: EndReason::None,
        }
    }

    /// Record a clear: score at the pre-clear combo, then extend the combo
    pub fn record_clear(&mut self, tuning: &Tuning) -> u32 {
        let points = tuning.points_for(self.combo);
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.active_target_count = self.active_target_count.saturating_sub(1);
        points
    }

    /// Record a target falling out. Returns true when no lives remain.
    pub fn record_miss(&mut self) -> bool {
        self.combo = 0;
        self.lives = self.lives.saturating_sub(1);
        self.active_target_count = self.active_target_count.saturating_sub(1);
        self.lives == 0
    }

    /// Next clear earns the combo multiplier
    pub fn combo_bonus_active(&self, tuning: &Tuning) -> bool {
        self.combo >= tuning.combo_threshold
    }
}

/// Numbers shown on the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub score: u32,
    pub max_combo: u32,
    pub lives: u8,
    pub end_reason: EndReason,
}

impl From<&SessionState> for Summary {
    fn from(state: &SessionState) -> Self {
        Self {
            score: state.score,
            max_combo: state.max_combo,
            lives: state.lives,
            end_reason: state.end_reason,
        }
    }
}
