//! Game state machine
//!
//! `Game` owns the session counters, the target collection, the RNG and the
//! three activity slots (countdown, spawner, frame loop). Hosts drive it with
//! commands and by delivering the timer tokens it hands out.
//!
//! ```text
//! Menu --start--> Playing <--pause/resume--> Paused
//!                    |                          |
//!                  (end)                      menu
//!                    v                          v
//!                  Over ------menu---------> Menu
//! ```

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::pick_target;
use super::difficulty::{Difficulty, DifficultySettings, GameMode, resolve_with};
use super::schedule::{Host, TimerKind, TimerSlot, TimerToken, TokenSource};
use super::spawn::{SpawnScheduler, below_cap, spawn_target};
use super::state::{EndReason, GamePhase, SessionState, Summary};
use super::target::{HitOutcome, Sprite, Target};
use super::tick::{step_targets, visible_sprites};
use crate::consts::{COUNTDOWN_PERIOD_MS, MAX_FRAME_STEP};
use crate::error::StartError;
use crate::tuning::Tuning;

/// One game instance
#[derive(Debug, Clone)]
pub struct Game {
    state: SessionState,
    targets: Vec<Target>,
    tuning: Tuning,
    rng: Pcg32,
    /// Width and height set by the host; None until a canvas exists
    field: Option<Vec2>,
    tokens: TokenSource,
    countdown: TimerSlot,
    spawner: SpawnScheduler,
    frame: TimerSlot,
    next_id: u32,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, mut tuning: Tuning) -> Self {
        tuning.sanitize();
        Self {
            state: SessionState::new(GameMode::default(), Difficulty::default(), &tuning),
            targets: Vec::new(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            field: None,
            tokens: TokenSource::default(),
            countdown: TimerSlot::new(TimerKind::Countdown),
            spawner: SpawnScheduler::new(),
            frame: TimerSlot::new(TimerKind::Frame),
            next_id: 1,
        }
    }

    /// Set the play field (canvas) size
    pub fn set_field_size(&mut self, width: f32, height: f32) {
        self.field = Some(Vec2::new(width, height));
    }

    // === Queries ===

    pub fn session(&self) -> &SessionState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.time_remaining
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.state.max_combo
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn end_reason(&self) -> EndReason {
        self.state.end_reason
    }

    /// The next clear scores with the combo multiplier
    pub fn combo_bonus_active(&self) -> bool {
        self.state.combo_bonus_active(&self.tuning)
    }

    pub fn summary(&self) -> Summary {
        Summary::from(&self.state)
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Settings for the current mode and difficulty
    pub fn settings(&self) -> DifficultySettings {
        resolve_with(&self.tuning, self.state.mode, self.state.difficulty)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn sprites(&self) -> Vec<Sprite> {
        visible_sprites(&self.targets)
    }

    /// True while any of the three activities is armed
    pub fn has_pending_activity(&self) -> bool {
        self.countdown.is_armed() || self.spawner.is_armed() || self.frame.is_armed()
    }

    // === Commands ===

    /// Begin a fresh session. Refuses (leaving everything as it was) when
    /// the host has not provided a usable field.
    pub fn start_game(
        &mut self,
        mode: GameMode,
        difficulty: Difficulty,
        host: &mut dyn Host,
    ) -> Result<(), StartError> {
        let settings = resolve_with(&self.tuning, mode, difficulty);
        let Some(field) = self.field else {
            log::warn!("Refusing to start: no play field");
            return Err(StartError::FieldUnavailable);
        };
        if field.x <= settings.size * 2.0 || field.y <= 0.0 {
            log::warn!("Refusing to start: field {}x{} too small", field.x, field.y);
            return Err(StartError::FieldTooSmall {
                width: field.x,
                height: field.y,
                radius: settings.size,
            });
        }

        self.stop_activities(host);
        self.targets.clear();
        self.state = SessionState::new(mode, difficulty, &self.tuning);
        self.state.phase = GamePhase::Playing;

        log::info!(
            "Session started: mode={} difficulty={} interval={}ms",
            mode.as_str(),
            difficulty.as_str(),
            settings.spawn_interval_ms
        );

        self.start_activities(host);
        Ok(())
    }

    /// Start again with the last mode and difficulty
    pub fn restart(&mut self, host: &mut dyn Host) -> Result<(), StartError> {
        self.start_game(self.state.mode, self.state.difficulty, host)
    }

    /// Freeze a running session. Returns false if not playing.
    pub fn pause(&mut self, host: &mut dyn Host) -> bool {
        if self.state.phase != GamePhase::Playing {
            log::debug!("Ignoring pause in {:?}", self.state.phase);
            return false;
        }
        self.stop_activities(host);
        self.state.phase = GamePhase::Paused;
        log::info!("Paused at {}s", self.state.time_remaining);
        true
    }

    /// Continue a paused session. The spawn interval restarts from zero.
    pub fn resume(&mut self, host: &mut dyn Host) -> bool {
        if self.state.phase != GamePhase::Paused {
            log::debug!("Ignoring resume in {:?}", self.state.phase);
            return false;
        }
        self.state.phase = GamePhase::Playing;
        self.start_activities(host);
        log::info!("Resumed");
        true
    }

    /// Abandon whatever is happening and show the menu. Counters of the last
    /// run are kept for display.
    pub fn return_to_menu(&mut self, host: &mut dyn Host) {
        self.stop_activities(host);
        self.targets.clear();
        self.state.active_target_count = 0;
        self.state.phase = GamePhase::Menu;
    }

    /// Click/tap at field coordinates. Returns what the click hit, or None
    /// for empty space (combo is left alone) or when not playing.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> Option<HitOutcome> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        let index = pick_target(&self.targets, Vec2::new(x, y))?;
        let target = &mut self.targets[index];
        let outcome = target.register_hit();

        if outcome == HitOutcome::Cleared {
            let points = self.state.record_clear(&self.tuning);
            log::debug!(
                "Cleared target {} for {} (combo {})",
                target.id,
                points,
                self.state.combo
            );
        }
        Some(outcome)
    }

    // === Host callbacks ===

    /// Countdown interval fired
    pub fn on_countdown(&mut self, token: TimerToken, host: &mut dyn Host) {
        if !self.countdown.accepts(token) {
            log::debug!("Stale countdown tick {}", token.id);
            return;
        }
        if self.state.phase != GamePhase::Playing {
            return;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining == 0 {
            self.end_game(EndReason::TimeExpired, host);
        }
    }

    /// Spawn timeout fired
    pub fn on_spawn(&mut self, token: TimerToken, host: &mut dyn Host) {
        if !self.spawner.fire(token) {
            log::debug!("Stale spawn timer {}", token.id);
            return;
        }
        if self.state.phase != GamePhase::Playing {
            return;
        }
        self.spawn_cycle(host);
    }

    /// Display frame fired; `dt` is elapsed time in 60 Hz frames
    pub fn on_frame(&mut self, token: TimerToken, dt: f32, host: &mut dyn Host) {
        if !self.frame.fire(token) {
            log::debug!("Stale frame {}", token.id);
            return;
        }

        // Pause cancels the frame slot, so only a playing session gets here
        if self.state.phase != GamePhase::Playing {
            return;
        }

        let Some(field) = self.field else {
            return;
        };
        let dt = dt.clamp(0.0, MAX_FRAME_STEP);
        let report = step_targets(&mut self.state, &mut self.targets, dt, field.y);
        if report.lives_exhausted {
            self.end_game(EndReason::LivesExhausted, host);
            return;
        }

        host.draw(&visible_sprites(&self.targets));
        self.request_frame(host);
    }

    // === Internals ===

    fn start_activities(&mut self, host: &mut dyn Host) {
        if let Some(token) = self.countdown.arm(&mut self.tokens) {
            host.set_interval(token, COUNTDOWN_PERIOD_MS);
        }
        self.request_frame(host);
        if !self.spawner.is_armed() {
            self.spawn_cycle(host);
        }
    }

    /// Cancel all three activities; safe to repeat
    fn stop_activities(&mut self, host: &mut dyn Host) {
        self.countdown.cancel(host);
        self.spawner.cancel(host);
        self.frame.cancel(host);
    }

    fn request_frame(&mut self, host: &mut dyn Host) {
        if let Some(token) = self.frame.arm(&mut self.tokens) {
            host.request_frame(token);
        }
    }

    /// Create a target if below the cap, then re-arm with the current interval
    fn spawn_cycle(&mut self, host: &mut dyn Host) {
        let settings = self.settings();
        let Some(field) = self.field else {
            return;
        };

        if below_cap(self.state.mode, self.state.active_target_count, &self.tuning) {
            let id = self.next_id;
            self.next_id += 1;
            let target = spawn_target(
                id,
                self.state.mode,
                &settings,
                field.x,
                &self.tuning,
                &mut self.rng,
            );
            self.targets.push(target);
            self.state.active_target_count += 1;
        }

        self.spawner.arm(&mut self.tokens, host, settings.spawn_interval_ms);
    }

    fn end_game(&mut self, reason: EndReason, host: &mut dyn Host) {
        self.stop_activities(host);
        self.targets.clear();
        self.state.active_target_count = 0;
        self.state.phase = GamePhase::Over;
        self.state.end_reason = reason;
        log::info!(
            "Game over ({:?}): score {} max combo {} lives {}",
            reason,
            self.state.score,
            self.state.max_combo,
            self.state.lives
        );
    }

    #[cfg(test)]
    fn push_target(&mut self, target: Target) {
        self.targets.push(target);
        self.state.active_target_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
    use crate::platform::headless::VirtualHost;
    use crate::sim::target::TargetColor;

    fn field_game(seed: u64) -> Game {
        let mut game = Game::new(seed);
        game.set_field_size(FIELD_WIDTH, FIELD_HEIGHT);
        game
    }

    fn started(mode: GameMode, difficulty: Difficulty) -> (Game, VirtualHost) {
        let mut game = field_game(42);
        let mut host = VirtualHost::new();
        game.start_game(mode, difficulty, &mut host).expect("field is set");
        (game, host)
    }

    fn live_targets(game: &Game) -> u32 {
        game.targets().iter().filter(|t| !t.is_removed()).count() as u32
    }

    fn target_at(id: u32, x: f32, y: f32) -> Target {
        Target::new(id, Vec2::new(x, y), 35.0, 2.0, TargetColor::Blue)
    }

    #[test]
    fn test_start_requires_field() {
        let mut game = Game::new(1);
        let mut host = VirtualHost::new();
        let err = game.start_game(GameMode::Hunt, Difficulty::Normal, &mut host);
        assert_eq!(err, Err(StartError::FieldUnavailable));
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(!game.has_pending_activity());
        assert_eq!(host.pending_count(), 0);
    }

    #[test]
    fn test_start_rejects_narrow_field() {
        let mut game = Game::new(1);
        game.set_field_size(60.0, 750.0);
        let mut host = VirtualHost::new();
        let err = game.start_game(GameMode::Hunt, Difficulty::Normal, &mut host);
        assert!(matches!(err, Err(StartError::FieldTooSmall { .. })));
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_start_arms_everything() {
        let (game, host) = started(GameMode::Hunt, Difficulty::Normal);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.lives(), 5);
        assert_eq!(game.time_remaining(), 60);
        assert_eq!(game.session().active_target_count, 1);
        assert_eq!(host.pending_of(TimerKind::Countdown), 1);
        assert_eq!(host.pending_of(TimerKind::Spawn), 1);
        assert_eq!(host.pending_of(TimerKind::Frame), 1);
    }

    #[test]
    fn test_hunt_cap_holds_over_spawn_cycles() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        // Start spawns immediately; three more cycles at 1.5s each
        for _ in 0..3 {
            host.advance(&mut game, 1500.0);
            assert!(game.session().active_target_count <= 3);
            assert_eq!(game.session().active_target_count, live_targets(&game));
        }
        assert_eq!(game.session().active_target_count, 3);
        // The cycle at cap still re-armed
        assert_eq!(host.pending_of(TimerKind::Spawn), 1);
    }

    #[test]
    fn test_clicker_lives_exhausted() {
        let (mut game, mut host) = started(GameMode::Clicker, Difficulty::Normal);

        let ended = host.advance_until(&mut game, 60_000.0, |g| g.phase() == GamePhase::Over);
        assert!(ended);
        assert_eq!(game.end_reason(), EndReason::LivesExhausted);
        assert_eq!(game.lives(), 0);
        assert!(game.time_remaining() > 0);
        assert!(!game.has_pending_activity());
        assert_eq!(host.pending_count(), 0);

        // Nothing left to fire, no sixth life lost
        host.advance(&mut game, 10_000.0);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), GamePhase::Over);
    }

    #[test]
    fn test_time_expired_reason() {
        let mut tuning = Tuning::default();
        tuning.session_seconds = 3;
        let mut game = Game::with_tuning(5, tuning);
        game.set_field_size(FIELD_WIDTH, FIELD_HEIGHT);
        let mut host = VirtualHost::new();
        game.start_game(GameMode::Hunt, Difficulty::Normal, &mut host).expect("field is set");

        host.advance(&mut game, 2999.0);
        assert_eq!(game.phase(), GamePhase::Playing);
        host.advance(&mut game, 1.0);
        assert_eq!(game.phase(), GamePhase::Over);
        assert_eq!(game.end_reason(), EndReason::TimeExpired);
        assert_eq!(game.lives(), 5);
        assert!(game.targets().is_empty());
        assert_eq!(game.session().active_target_count, 0);
    }

    #[test]
    fn test_combo_bonus_and_reset() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);

        // Clear the spawned target plus two of our own for combo 3
        let first = game.targets()[0].pos;
        assert_eq!(game.handle_pointer_down(first.x, first.y), Some(HitOutcome::Cleared));
        game.push_target(target_at(100, 100.0, 300.0));
        game.push_target(target_at(101, 300.0, 300.0));
        assert_eq!(game.handle_pointer_down(100.0, 300.0), Some(HitOutcome::Cleared));
        assert_eq!(game.handle_pointer_down(300.0, 300.0), Some(HitOutcome::Cleared));
        assert_eq!(game.combo(), 3);
        assert_eq!(game.score(), 30);
        assert!(game.combo_bonus_active());

        game.push_target(target_at(102, 200.0, 400.0));
        assert_eq!(game.handle_pointer_down(200.0, 400.0), Some(HitOutcome::Cleared));
        assert_eq!(game.score(), 45);
        assert_eq!(game.combo(), 4);
        assert_eq!(game.max_combo(), 4);

        // A target about to fall out resets the combo, not the max
        game.push_target(target_at(103, 250.0, 785.0));
        host.advance(&mut game, 17.0);
        assert_eq!(game.combo(), 0);
        assert_eq!(game.max_combo(), 4);
        assert_eq!(game.lives(), 4);
        assert_eq!(game.session().active_target_count, live_targets(&game));
    }

    #[test]
    fn test_empty_click_keeps_combo() {
        let (mut game, _host) = started(GameMode::Hunt, Difficulty::Normal);
        let first = game.targets()[0].pos;
        game.handle_pointer_down(first.x, first.y);
        assert_eq!(game.combo(), 1);

        assert_eq!(game.handle_pointer_down(-500.0, -500.0), None);
        assert_eq!(game.combo(), 1);
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn test_multi_hit_pending_scores_nothing() {
        let (mut game, _host) = started(GameMode::Clicker, Difficulty::Normal);
        let target = game.targets()[0].clone();
        let hits = target.hits_remaining();
        assert!((2..=4).contains(&hits));

        for left in (1..hits).rev() {
            assert_eq!(
                game.handle_pointer_down(target.pos.x, target.pos.y),
                Some(HitOutcome::Pending { hits_remaining: left })
            );
            assert_eq!(game.score(), 0);
            assert_eq!(game.combo(), 0);
        }
        assert_eq!(
            game.handle_pointer_down(target.pos.x, target.pos.y),
            Some(HitOutcome::Cleared)
        );
        assert_eq!(game.score(), 10);
        assert_eq!(game.session().active_target_count, 0);
        // Cleared target is transparent to further clicks
        assert_eq!(game.handle_pointer_down(target.pos.x, target.pos.y), None);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        host.advance(&mut game, 500.0);

        assert!(game.pause(&mut host));
        let once = game.session().clone();
        let cancels = host.cancel_count();
        assert_eq!(host.pending_count(), 0);

        assert!(!game.pause(&mut host));
        assert_eq!(game.session(), &once);
        assert_eq!(host.cancel_count(), cancels);
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_paused_session_is_frozen() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        host.advance(&mut game, 500.0);
        let y = game.targets()[0].pos.y;
        game.pause(&mut host);

        host.advance(&mut game, 5000.0);
        assert_eq!(game.time_remaining(), 60);
        assert_eq!(game.targets()[0].pos.y, y);
        assert_eq!(game.targets().len(), 1);
        let x = game.targets()[0].pos.x;
        assert_eq!(game.handle_pointer_down(x, y), None);
    }

    #[test]
    fn test_paused_session_stops_drawing() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        host.advance(&mut game, 500.0);
        game.pause(&mut host);
        let drawn = host.frames_drawn();

        host.advance(&mut game, 2000.0);
        assert_eq!(host.frames_drawn(), drawn);
        assert_eq!(host.pending_count(), 0);

        game.resume(&mut host);
        host.advance(&mut game, 100.0);
        assert!(host.frames_drawn() > drawn);
    }

    #[test]
    fn test_inverted_hit_range_is_clamped() {
        let tuning = Tuning {
            multi_hit_min: 4,
            multi_hit_max: 2,
            ..Default::default()
        };
        let mut game = Game::with_tuning(1, tuning);
        game.set_field_size(FIELD_WIDTH, FIELD_HEIGHT);
        let mut host = VirtualHost::new();
        game.start_game(GameMode::Clicker, Difficulty::Normal, &mut host).expect("field is set");

        assert_eq!(game.tuning().multi_hit_max, 4);
        assert_eq!(game.targets().len(), 1);
        assert_eq!(game.targets()[0].hits_remaining(), 4);
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        host.advance(&mut game, 1000.0);
        assert_eq!(game.time_remaining(), 59);

        game.pause(&mut host);
        assert!(game.resume(&mut host));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(!game.resume(&mut host));

        // Resume spawns right away, then countdown and spawner keep going
        let spawned = game.targets().len();
        assert_eq!(spawned, 2);
        host.advance(&mut game, 1500.0);
        assert_eq!(game.time_remaining(), 58);
        assert_eq!(game.targets().len(), 3);
    }

    #[test]
    fn test_stale_tokens_are_ignored() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::Normal);
        let stale = host.pending_tokens();
        game.pause(&mut host);
        game.resume(&mut host);

        let before = game.session().clone();
        let targets = game.targets().len();
        for token in stale {
            match token.kind {
                TimerKind::Countdown => game.on_countdown(token, &mut host),
                TimerKind::Spawn => game.on_spawn(token, &mut host),
                TimerKind::Frame => game.on_frame(token, 1.0, &mut host),
            }
        }
        assert_eq!(game.session(), &before);
        assert_eq!(game.targets().len(), targets);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut game = field_game(3);
        let mut host = VirtualHost::new();
        assert!(!game.pause(&mut host));
        assert!(!game.resume(&mut host));
        assert_eq!(game.handle_pointer_down(10.0, 10.0), None);
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_return_to_menu_tears_down() {
        let (mut game, mut host) = started(GameMode::Clicker, Difficulty::Hard);
        host.advance(&mut game, 2000.0);
        game.pause(&mut host);

        game.return_to_menu(&mut host);
        game.return_to_menu(&mut host);
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.targets().is_empty());
        assert_eq!(game.session().active_target_count, 0);
        assert_eq!(host.pending_count(), 0);
        assert!(!game.has_pending_activity());
    }

    #[test]
    fn test_restart_keeps_selection() {
        let (mut game, mut host) = started(GameMode::Clicker, Difficulty::VeryHard);
        host.advance(&mut game, 3000.0);
        game.return_to_menu(&mut host);

        game.restart(&mut host).expect("field is set");
        assert_eq!(game.session().mode, GameMode::Clicker);
        assert_eq!(game.session().difficulty, Difficulty::VeryHard);
        assert_eq!(game.time_remaining(), 60);
        assert_eq!(game.score(), 0);
        assert_eq!(host.pending_of(TimerKind::Spawn), 1);
        assert_eq!(host.pending_of(TimerKind::Countdown), 1);
    }

    #[test]
    fn test_frames_draw_visible_targets() {
        let (mut game, mut host) = started(GameMode::Clicker, Difficulty::Normal);
        host.advance(&mut game, 100.0);
        assert!(host.frames_drawn() >= 5);
        let drawn = host.last_frame();
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].hits_remaining.is_some());
        assert_eq!(drawn[0].radius, 35.0);
    }

    #[test]
    fn test_active_count_matches_live_targets() {
        let (mut game, mut host) = started(GameMode::Hunt, Difficulty::VeryHard);
        for step in 0..200 {
            host.advance(&mut game, 97.0);
            if step % 3 == 0 {
                if let Some(pos) = game.targets().iter().find(|t| !t.is_removed()).map(|t| t.pos) {
                    game.handle_pointer_down(pos.x, pos.y);
                }
            }
            if game.phase() != GamePhase::Playing {
                break;
            }
            assert_eq!(game.session().active_target_count, live_targets(&game));
        }
    }
}
