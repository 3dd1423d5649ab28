//! Pointer hit-testing
//!
//! Targets overlap freely, so a click picks the most recently spawned live
//! target under the pointer. Only one target is hit per click.

use glam::Vec2;

use super::target::Target;

/// Index of the target under `point`, newest first
pub fn pick_target(targets: &[Target], point: Vec2) -> Option<usize> {
    targets
        .iter()
        .enumerate()
        .rev()
        .find(|(_, t)| !t.is_removed() && t.contains_point(point))
        .map(|(i, _)| i)
}
