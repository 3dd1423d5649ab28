//! Game modes, difficulty levels and the settings they resolve to

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Which kind of targets fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Up to three single-click targets at once
    #[default]
    Hunt,
    /// Up to two numbered targets needing several clicks each
    Clicker,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Hunt => "hunt",
            GameMode::Clicker => "clicker",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hunt" | "dothunter" => Some(GameMode::Hunt),
            "clicker" | "dotclicker" => Some(GameMode::Clicker),
            _ => None,
        }
    }

    /// Most targets alive at once
    pub fn target_cap(&self, tuning: &Tuning) -> u32 {
        match self {
            GameMode::Hunt => tuning.hunt_target_cap,
            GameMode::Clicker => tuning.clicker_target_cap,
        }
    }
}

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    VeryHard,
}

/// Scale factors applied to the base settings
struct Multipliers {
    speed: f64,
    size: f64,
    hunt_interval: f64,
    clicker_interval: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::VeryHard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::VeryHard => "veryhard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "veryhard" | "very_hard" | "very-hard" => Some(Difficulty::VeryHard),
            _ => None,
        }
    }

    fn multipliers(&self) -> Multipliers {
        match self {
            Difficulty::Easy => Multipliers {
                speed: 0.5,
                size: 1.14, // 40 / 35
                hunt_interval: 1.33,
                clicker_interval: 1.33,
            },
            Difficulty::Normal => Multipliers {
                speed: 1.0,
                size: 1.0,
                hunt_interval: 1.0,
                clicker_interval: 1.0,
            },
            Difficulty::Hard => Multipliers {
                speed: 1.5,
                size: 0.86, // 30 / 35
                hunt_interval: 0.33,
                clicker_interval: 0.5,
            },
            Difficulty::VeryHard => Multipliers {
                speed: 2.0,
                size: 0.71, // 25 / 35
                hunt_interval: 0.27,
                clicker_interval: 0.4,
            },
        }
    }
}

/// Resolved target parameters for a (mode, difficulty) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Units per frame
    pub speed: f32,
    /// Target radius, whole units
    pub size: f32,
    pub spawn_interval_ms: u32,
}

/// Resolve with default balance
pub fn resolve(mode: GameMode, difficulty: Difficulty) -> DifficultySettings {
    resolve_with(&Tuning::default(), mode, difficulty)
}

/// Resolve against a specific tuning
pub fn resolve_with(tuning: &Tuning, mode: GameMode, difficulty: Difficulty) -> DifficultySettings {
    let m = difficulty.multipliers();
    let interval_scale = match mode {
        GameMode::Hunt => m.hunt_interval,
        GameMode::Clicker => m.clicker_interval,
    };

    DifficultySettings {
        speed: (tuning.base_speed as f64 * m.speed) as f32,
        size: (tuning.base_size as f64 * m.size).round() as f32,
        spawn_interval_ms: ((tuning.base_spawn_interval_ms as f64 * interval_scale).round() as u32)
            .max(1),
    }
}
