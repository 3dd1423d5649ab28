//! Per-frame target update
//!
//! Moves every live target, drops cleared ones and charges a life for each
//! target that falls out. Creation order is preserved for hit-testing.

use super::state::SessionState;
use super::target::{Sprite, Target};

/// What one frame step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Cleared targets swept out of the collection
    pub swept: u32,
    /// Targets that fell out of the field
    pub missed: u32,
    /// A miss took the last life; the rest of the frame was skipped
    pub lives_exhausted: bool,
}

/// Advance all targets by `dt` frames
pub fn step_targets(
    state: &mut SessionState,
    targets: &mut Vec<Target>,
    dt: f32,
    field_height: f32,
) -> FrameReport {
    let mut report = FrameReport::default();

    let mut i = 0;
    while i < targets.len() {
        if targets[i].is_removed() {
            targets.remove(i);
            report.swept += 1;
            continue;
        }

        targets[i].advance(dt);

        if targets[i].is_off_field(field_height) {
            let target = targets.remove(i);
            report.missed += 1;
            log::debug!(
                "Target {} fell out, {} lives left",
                target.id,
                state.lives.saturating_sub(1)
            );
            if state.record_miss() {
                report.lives_exhausted = true;
                return report;
            }
            continue;
        }

        i += 1;
    }

    report
}

/// Draw list for the live targets
pub fn visible_sprites(targets: &[Target]) -> Vec<Sprite> {
    targets.iter().filter_map(Target::sprite).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::TargetColor;
    use glam::Vec2;

    fn falling(id: u32, y: f32) -> Target {
        Target::new(id, Vec2::new(100.0, y), 35.0, 2.0, TargetColor::Green)
    }

    fn session_with(active: u32) -> SessionState {
        SessionState {
            active_target_count: active,
            ..SessionState::default()
        }
    }

    #[test]
    fn test_targets_advance() {
        let mut state = session_with(2);
        let mut targets = vec![falling(1, 0.0), falling(2, 100.0)];
        let report = step_targets(&mut state, &mut targets, 1.0, 750.0);

        assert_eq!(report, FrameReport::default());
        assert_eq!(targets[0].pos.y, 2.0);
        assert_eq!(targets[1].pos.y, 102.0);
        assert_eq!(visible_sprites(&targets).len(), 2);
    }

    #[test]
    fn test_cleared_targets_are_swept_without_penalty() {
        let mut state = session_with(1);
        let mut targets = vec![falling(1, 0.0), falling(2, 784.0)];
        targets[1].register_hit();
        state.active_target_count = 1;

        let report = step_targets(&mut state, &mut targets, 1.0, 750.0);
        assert_eq!(report.swept, 1);
        assert_eq!(report.missed, 0);
        assert_eq!(targets.len(), 1);
        assert_eq!(state.lives, 5);
        assert_eq!(state.active_target_count, 1);
    }

    #[test]
    fn test_fall_out_costs_a_life_and_combo() {
        let mut state = session_with(2);
        state.combo = 4;
        state.max_combo = 4;
        let mut targets = vec![falling(1, 784.0), falling(2, 10.0)];

        let report = step_targets(&mut state, &mut targets, 1.0, 750.0);
        assert_eq!(report.missed, 1);
        assert!(!report.lives_exhausted);
        assert_eq!(state.lives, 4);
        assert_eq!(state.combo, 0);
        assert_eq!(state.max_combo, 4);
        assert_eq!(state.active_target_count, 1);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, 2);
    }

    #[test]
    fn test_last_life_stops_the_frame() {
        let mut state = session_with(2);
        state.lives = 1;
        let mut targets = vec![falling(1, 784.0), falling(2, 784.0)];

        let report = step_targets(&mut state, &mut targets, 1.0, 750.0);
        assert!(report.lives_exhausted);
        assert_eq!(report.missed, 1);
        assert_eq!(state.lives, 0);
        // The second target was never advanced
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].pos.y, 784.0);
    }
}
