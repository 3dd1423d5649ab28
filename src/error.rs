//! Start-up errors
//!
//! Declined commands are not errors; only a session that cannot start is.

use thiserror::Error;

/// Why `Game::start_game` refused to start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartError {
    #[error("play field size has not been set by the host")]
    FieldUnavailable,
    #[error("play field {width}x{height} cannot fit targets of radius {radius}")]
    FieldTooSmall { width: f32, height: f32, radius: f32 },
}
