//! Headless host with a virtual clock
//!
//! Queues every timer the game asks for and replays them in time order when
//! the clock is advanced. Frames arrive at 60 Hz. Used by the tests and the
//! native autoplay demo.

use crate::consts::FRAME_MS;
use crate::sim::{Game, Host, Sprite, TimerKind, TimerToken};

#[derive(Debug, Clone)]
struct Pending {
    token: TimerToken,
    due_ms: f64,
    /// Some for intervals
    period_ms: Option<f64>,
    /// Tie-breaker: earlier requests fire first
    seq: u64,
}

/// Deterministic host for driving a `Game` without a browser
#[derive(Debug, Clone, Default)]
pub struct VirtualHost {
    now_ms: f64,
    pending: Vec<Pending>,
    next_seq: u64,
    cancels: u32,
    frames_drawn: u64,
    last_frame: Vec<Sprite>,
}

impl VirtualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Callbacks waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_of(&self, kind: TimerKind) -> usize {
        self.pending.iter().filter(|p| p.token.kind == kind).count()
    }

    pub fn pending_tokens(&self) -> Vec<TimerToken> {
        self.pending.iter().map(|p| p.token).collect()
    }

    /// Cancellations that removed a live callback
    pub fn cancel_count(&self) -> u32 {
        self.cancels
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Sprites from the most recent draw
    pub fn last_frame(&self) -> &[Sprite] {
        &self.last_frame
    }

    /// Run the clock forward, firing everything due on the way
    pub fn advance(&mut self, game: &mut Game, duration_ms: f64) {
        self.advance_until(game, duration_ms, |_| false);
    }

    /// Like `advance`, but stops right after the callback that makes
    /// `done` true. Returns whether it stopped early.
    pub fn advance_until<F>(&mut self, game: &mut Game, duration_ms: f64, mut done: F) -> bool
    where
        F: FnMut(&Game) -> bool,
    {
        let end = self.now_ms + duration_ms;

        while let Some(index) = self.next_due(end) {
            let token = self.pending[index].token;
            self.now_ms = self.pending[index].due_ms;

            // Re-queue intervals before dispatch so a cancel inside the
            // callback removes the next occurrence
            match self.pending[index].period_ms {
                Some(period) => {
                    let seq = self.bump_seq();
                    let entry = &mut self.pending[index];
                    entry.due_ms += period;
                    entry.seq = seq;
                }
                None => {
                    self.pending.swap_remove(index);
                }
            }

            self.dispatch(game, token);
            if done(game) {
                return true;
            }
        }

        self.now_ms = end;
        false
    }

    fn next_due(&self, end: f64) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= end)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(i, _)| i)
    }

    fn dispatch(&mut self, game: &mut Game, token: TimerToken) {
        match token.kind {
            TimerKind::Countdown => game.on_countdown(token, self),
            TimerKind::Spawn => game.on_spawn(token, self),
            TimerKind::Frame => game.on_frame(token, 1.0, self),
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn schedule(&mut self, token: TimerToken, delay_ms: f64, period_ms: Option<f64>) {
        let seq = self.bump_seq();
        self.pending.push(Pending {
            token,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            seq,
        });
    }
}

impl Host for VirtualHost {
    fn request_frame(&mut self, token: TimerToken) {
        self.schedule(token, FRAME_MS, None);
    }

    fn set_interval(&mut self, token: TimerToken, period_ms: u32) {
        let period = f64::from(period_ms.max(1));
        self.schedule(token, period, Some(period));
    }

    fn set_timeout(&mut self, token: TimerToken, delay_ms: u32) {
        self.schedule(token, f64::from(delay_ms), None);
    }

    fn cancel(&mut self, token: TimerToken) {
        let before = self.pending.len();
        self.pending.retain(|p| p.token != token);
        if self.pending.len() < before {
            self.cancels += 1;
        }
    }

    fn draw(&mut self, sprites: &[Sprite]) {
        self.frames_drawn += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(sprites);
    }
}
