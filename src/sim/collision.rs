//! Collision detection between the actor and obstacles
//!
//! Both are axis-aligned boxes. World y grows upward from the ground, so a
//! regular obstacle blocks `[0, gap_height)` and an inverted one blocks
//! `(WORLD_HEIGHT - gap_height, WORLD_HEIGHT]`.

use super::state::{Actor, Obstacle};
use crate::consts::*;
use crate::spans_overlap;

/// Pure geometric test; mutates nothing
pub fn actor_hits_obstacle(actor: &Actor, obstacle: &Obstacle) -> bool {
    if !spans_overlap(ACTOR_X, ACTOR_WIDTH, obstacle.x, obstacle.width()) {
        return false;
    }

    let half = ACTOR_HALF_HEIGHT as f64;
    let gap = obstacle.gap_height() as f64;

    if obstacle.inverted() {
        actor.y + half > WORLD_HEIGHT as f64 - gap
    } else {
        actor.y - half < gap
    }
}
