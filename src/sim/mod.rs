//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time arrives only through host callbacks carrying timer tokens
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod game;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod target;
pub mod tick;

pub use collision::pick_target;
pub use difficulty::{Difficulty, DifficultySettings, GameMode, resolve, resolve_with};
pub use game::Game;
pub use schedule::{Host, TimerKind, TimerSlot, TimerToken, TokenSource};
pub use spawn::SpawnScheduler;
pub use state::{EndReason, GamePhase, SessionState, Summary};
pub use target::{HitOutcome, Sprite, Target, TargetColor, TargetKind};
pub use tick::{FrameReport, step_targets};
