//! Dot Hunter - A falling-target clicking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (targets, spawning, frame loop, game state)
//! - `platform`: Host implementations (headless virtual clock, browser canvas)
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::StartError;
pub use sim::{Difficulty, EndReason, Game, GameMode, GamePhase, HitOutcome, Host};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Milliseconds per display frame (the unit of target speed)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame step applied at once (tab switches, long stalls)
    pub const MAX_FRAME_STEP: f32 = 3.0;
    /// Countdown period
    pub const COUNTDOWN_PERIOD_MS: u32 = 1000;

    /// Play field used by the canvas layout
    pub const FIELD_WIDTH: f32 = 500.0;
    pub const FIELD_HEIGHT: f32 = 750.0;

    /// Session budget
    pub const START_LIVES: u8 = 5;
    pub const SESSION_SECONDS: u32 = 60;

    /// Target defaults at normal difficulty
    pub const BASE_SPEED: f32 = 2.0; // units per frame
    pub const BASE_SIZE: f32 = 35.0;
    pub const BASE_SPAWN_INTERVAL_MS: u32 = 1500;

    /// Concurrency caps
    pub const HUNT_TARGET_CAP: u32 = 3;
    pub const CLICKER_TARGET_CAP: u32 = 2;

    /// Multi-hit targets need this many clicks (inclusive)
    pub const MULTI_HIT_MIN: u8 = 2;
    pub const MULTI_HIT_MAX: u8 = 4;

    /// Scoring
    pub const BASE_POINTS: u32 = 10;
    pub const COMBO_THRESHOLD: u32 = 3;
    pub const COMBO_MULTIPLIER: f32 = 1.5;
}
