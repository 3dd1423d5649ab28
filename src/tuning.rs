//! Data-driven game balance
//!
//! Every number the simulation scales or caps by. Defaults mirror `consts`;
//! a host may override any subset from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance knobs for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session budget ===
    pub start_lives: u8,
    pub session_seconds: u32,

    // === Targets (normal difficulty) ===
    pub base_speed: f32,
    pub base_size: f32,
    pub base_spawn_interval_ms: u32,
    pub multi_hit_min: u8,
    pub multi_hit_max: u8,

    // === Concurrency caps ===
    pub hunt_target_cap: u32,
    pub clicker_target_cap: u32,

    // === Scoring ===
    pub base_points: u32,
    pub combo_threshold: u32,
    pub combo_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_lives: START_LIVES,
            session_seconds: SESSION_SECONDS,

            base_speed: BASE_SPEED,
            base_size: BASE_SIZE,
            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            multi_hit_min: MULTI_HIT_MIN,
            multi_hit_max: MULTI_HIT_MAX,

            hunt_target_cap: HUNT_TARGET_CAP,
            clicker_target_cap: CLICKER_TARGET_CAP,

            base_points: BASE_POINTS,
            combo_threshold: COMBO_THRESHOLD,
            combo_multiplier: COMBO_MULTIPLIER,
        }
    }
}

impl Tuning {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Points for a clear made while holding `combo`
    pub fn points_for(&self, combo: u32) -> u32 {
        if combo >= self.combo_threshold {
            (self.base_points as f32 * self.combo_multiplier).round() as u32
        } else {
            self.base_points
        }
    }

    /// Keep ranges usable after hand-edited overrides
    pub(crate) fn sanitize(&mut self) {
        self.multi_hit_min = self.multi_hit_min.max(1);
        if self.multi_hit_max < self.multi_hit_min {
            log::warn!(
                "multi_hit_max {} below multi_hit_min {}, clamping",
                self.multi_hit_max,
                self.multi_hit_min
            );
            self.multi_hit_max = self.multi_hit_min;
        }
        self.start_lives = self.start_lives.max(1);
        self.base_spawn_interval_ms = self.base_spawn_interval_ms.max(1);
    }
}
