//! Falling targets
//!
//! A target drops from above the field at a constant speed until it is
//! cleared by clicks or falls out through the bottom edge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Target palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetColor {
    Blue,
    Green,
    Orange,
    Red,
    Purple,
}

impl TargetColor {
    pub const ALL: [TargetColor; 5] = [
        TargetColor::Blue,
        TargetColor::Green,
        TargetColor::Orange,
        TargetColor::Red,
        TargetColor::Purple,
    ];

    /// CSS fill style
    pub fn css(&self) -> &'static str {
        match self {
            TargetColor::Blue => "#4299e1",
            TargetColor::Green => "#48bb78",
            TargetColor::Orange => "#ed8936",
            TargetColor::Red => "#e53e3e",
            TargetColor::Purple => "#9f7aea",
        }
    }
}

/// How many clicks a target takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Cleared by one click
    Single,
    /// Shows a counter; cleared when it reaches zero
    MultiHit { hits_remaining: u8 },
}

/// Result of clicking a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target is gone; score it
    Cleared,
    /// Target survives with this many hits left
    Pending { hits_remaining: u8 },
    /// Target was already removed
    NoOp,
}

/// A falling target entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Units per frame
    pub speed: f32,
    pub color: TargetColor,
    pub kind: TargetKind,
    removed: bool,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, radius: f32, speed: f32, color: TargetColor) -> Self {
        Self {
            id,
            pos,
            radius,
            speed,
            color,
            kind: TargetKind::Single,
            removed: false,
        }
    }

    /// Multi-hit variant. A zero count is bumped to one.
    pub fn multi_hit(
        id: u32,
        pos: Vec2,
        radius: f32,
        speed: f32,
        color: TargetColor,
        hits: u8,
    ) -> Self {
        Self {
            kind: TargetKind::MultiHit {
                hits_remaining: hits.max(1),
            },
            ..Self::new(id, pos, radius, speed, color)
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Clicks still needed (0 once removed)
    pub fn hits_remaining(&self) -> u8 {
        if self.removed {
            return 0;
        }
        match self.kind {
            TargetKind::Single => 1,
            TargetKind::MultiHit { hits_remaining } => hits_remaining,
        }
    }

    /// Move down by `speed * dt` (dt in frames)
    pub fn advance(&mut self, dt: f32) {
        if self.removed {
            return;
        }
        self.pos.y += self.speed * dt;
    }

    /// Apply one click
    pub fn register_hit(&mut self) -> HitOutcome {
        if self.removed {
            return HitOutcome::NoOp;
        }
        match &mut self.kind {
            TargetKind::Single => {
                self.removed = true;
                HitOutcome::Cleared
            }
            TargetKind::MultiHit { hits_remaining } => {
                *hits_remaining = hits_remaining.saturating_sub(1);
                if *hits_remaining == 0 {
                    self.removed = true;
                    HitOutcome::Cleared
                } else {
                    HitOutcome::Pending {
                        hits_remaining: *hits_remaining,
                    }
                }
            }
        }
    }

    /// True once the whole disc has dropped below `field_height`
    pub fn is_off_field(&self, field_height: f32) -> bool {
        self.pos.y > field_height + self.radius
    }

    /// Strict containment: a point on the rim is a miss
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }

    /// Draw data, or None once removed
    pub fn sprite(&self) -> Option<Sprite> {
        if self.removed {
            return None;
        }
        Some(Sprite {
            pos: self.pos,
            radius: self.radius,
            color: self.color,
            hits_remaining: match self.kind {
                TargetKind::Single => None,
                TargetKind::MultiHit { hits_remaining } => Some(hits_remaining),
            },
        })
    }
}

/// What the renderer needs to draw one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub pos: Vec2,
    pub radius: f32,
    pub color: TargetColor,
    /// Counter label for multi-hit targets
    pub hits_remaining: Option<u8>,
}
