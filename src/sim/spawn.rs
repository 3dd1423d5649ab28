//! Spawn scheduling and target creation
//!
//! The scheduler is a one-shot timer that the game re-arms after every
//! firing, so the interval is re-read each cycle. A cycle at the mode's cap
//! creates nothing but still re-arms.

use glam::Vec2;
use rand::Rng;

use super::difficulty::{DifficultySettings, GameMode};
use super::schedule::{Host, TimerKind, TimerSlot, TimerToken, TokenSource};
use super::target::{Target, TargetColor};
use crate::tuning::Tuning;

/// Owns the single pending spawn timer
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    slot: TimerSlot,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            slot: TimerSlot::new(TimerKind::Spawn),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_armed()
    }

    /// Schedule the next cycle. Returns false if one is already pending.
    pub fn arm(&mut self, tokens: &mut TokenSource, host: &mut dyn Host, delay_ms: u32) -> bool {
        match self.slot.arm(tokens) {
            Some(token) => {
                host.set_timeout(token, delay_ms);
                true
            }
            None => false,
        }
    }

    /// Accept a firing; false for stale tokens
    pub fn fire(&mut self, token: TimerToken) -> bool {
        self.slot.fire(token)
    }

    pub fn cancel(&mut self, host: &mut dyn Host) {
        self.slot.cancel(host);
    }
}

/// Whether a cycle may add another target
pub fn below_cap(mode: GameMode, active_targets: u32, tuning: &Tuning) -> bool {
    active_targets < mode.target_cap(tuning)
}

/// Build a target just above the field at a random column
///
/// Hunt mode makes single-click targets; clicker mode makes multi-hit ones.
pub fn spawn_target<R: Rng>(
    id: u32,
    mode: GameMode,
    settings: &DifficultySettings,
    field_width: f32,
    tuning: &Tuning,
    rng: &mut R,
) -> Target {
    let size = settings.size;
    let x = if field_width - size > size {
        rng.random_range(size..field_width - size)
    } else {
        field_width / 2.0
    };
    let pos = Vec2::new(x, -size);
    let color = TargetColor::ALL[rng.random_range(0..TargetColor::ALL.len())];

    match mode {
        GameMode::Hunt => Target::new(id, pos, size, settings.speed, color),
        GameMode::Clicker => {
            let hits = rng.random_range(tuning.multi_hit_min..=tuning.multi_hit_max);
            Target::multi_hit(id, pos, size, settings.speed, color, hits)
        }
    }
}
