//! Host scheduling seam
//!
//! The simulation never owns a clock. It asks the host for frames and
//! timers, handing over a `TimerToken` each time, and the host later calls
//! back into `Game` with that token. Each activity keeps the token it
//! considers live in a `TimerSlot`; a callback carrying any other token is
//! stale and gets dropped without touching state.

use super::target::Sprite;

/// The three recurring activities of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One-second countdown (interval)
    Countdown,
    /// Next spawn attempt (one-shot, re-armed by the game)
    Spawn,
    /// Next display frame (one-shot, re-requested by the game)
    Frame,
}

/// Cancellation token for one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub id: u64,
}

/// Hands out unique token ids
#[derive(Debug, Clone, Default)]
pub struct TokenSource {
    next_id: u64,
}

impl TokenSource {
    pub fn issue(&mut self, kind: TimerKind) -> TimerToken {
        self.next_id += 1;
        TimerToken {
            kind,
            id: self.next_id,
        }
    }
}

/// Holds the live token of one activity (at most one)
#[derive(Debug, Clone)]
pub struct TimerSlot {
    kind: TimerKind,
    live: Option<TimerToken>,
}

impl TimerSlot {
    pub fn new(kind: TimerKind) -> Self {
        Self { kind, live: None }
    }

    pub fn is_armed(&self) -> bool {
        self.live.is_some()
    }

    /// Issue a fresh token, or None if one is already live
    pub fn arm(&mut self, tokens: &mut TokenSource) -> Option<TimerToken> {
        if self.live.is_some() {
            return None;
        }
        let token = tokens.issue(self.kind);
        self.live = Some(token);
        Some(token)
    }

    /// True if `token` is the live one
    pub fn accepts(&self, token: TimerToken) -> bool {
        self.live == Some(token)
    }

    /// Consume a one-shot firing. Returns false for stale tokens.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.accepts(token) {
            self.live = None;
            true
        } else {
            false
        }
    }

    /// Cancel through the host. Safe to call when nothing is armed.
    pub fn cancel(&mut self, host: &mut dyn Host) {
        if let Some(token) = self.live.take() {
            host.cancel(token);
        }
    }
}

/// Everything the simulation needs from its environment
///
/// Implementations deliver callbacks by calling `Game::on_frame`,
/// `Game::on_countdown` or `Game::on_spawn` with the token they were given.
pub trait Host {
    /// Call `Game::on_frame` once before the next paint
    fn request_frame(&mut self, token: TimerToken);
    /// Call `Game::on_countdown` every `period_ms` until cancelled
    fn set_interval(&mut self, token: TimerToken, period_ms: u32);
    /// Call `Game::on_spawn` once after `delay_ms`
    fn set_timeout(&mut self, token: TimerToken, delay_ms: u32);
    /// Drop a pending callback; unknown tokens are ignored
    fn cancel(&mut self, token: TimerToken);
    /// Draw one frame of visible targets
    fn draw(&mut self, sprites: &[Sprite]);
}
