//! Simulation entity types
//!
//! Plain data with the per-tick rules. Synchronization lives one level up
//! in the field and scene, which wrap these in locks.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::actor_hits_obstacle;
use crate::consts::*;

/// Current phase of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenePhase {
    /// Ticks advance the world
    Running,
    /// Actor died; banner shown while the control loop sleeps
    GameOverPause,
    /// Quit received, loop exited
    Closed,
}

/// The player-controlled falling/jumping entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Altitude above the ground (world units, up is positive)
    pub y: f64,
    /// Vertical velocity (positive = falling)
    pub velocity: f64,
    /// Ticks since creation, drives the animation frame
    pub time: u64,
    pub alive: bool,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            y: ACTOR_START_Y,
            velocity: 0.0,
            time: 0,
            alive: true,
        }
    }
}

impl Actor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick: fall by the current velocity, then accelerate
    pub fn update(&mut self) {
        self.time += 1;

        self.y -= self.velocity;
        self.velocity += GRAVITY;

        if self.y <= 0.0 {
            self.alive = false;
        }
    }

    /// Force upward motion. Uses |v| so consecutive jumps compound.
    pub fn jump(&mut self) {
        self.velocity = -self.velocity.abs() - JUMP_IMPULSE;
    }

    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn restart(&mut self) {
        self.y = ACTOR_RESTART_Y;
        self.velocity = 0.0;
        self.alive = true;
    }

    pub fn collides_with(&self, obstacle: &Obstacle) -> bool {
        actor_hits_obstacle(self, obstacle)
    }

    /// Animation frame for a sprite sheet of `frame_count` frames
    pub fn frame_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        ((self.time / TICKS_PER_FRAME) % frame_count as u64) as usize
    }
}

/// A scrolling barrier with a passable gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge (decreases every tick)
    pub x: i32,
    /// Height of the blocking column measured from its anchored edge
    gap_height: i32,
    width: i32,
    /// Anchored at the top (and drawn flipped) when set
    inverted: bool,
}

impl Obstacle {
    /// New obstacle just off the right edge with a random shape
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            x: WORLD_WIDTH,
            gap_height: rng.random_range(OBSTACLE_MIN_GAP..OBSTACLE_MAX_GAP),
            width: OBSTACLE_WIDTH,
            inverted: rng.random_bool(0.5),
        }
    }

    /// Obstacle with an explicit shape (scripted scenarios)
    pub fn with_shape(x: i32, gap_height: i32, inverted: bool) -> Self {
        Self {
            x,
            gap_height,
            width: OBSTACLE_WIDTH,
            inverted,
        }
    }

    pub fn gap_height(&self) -> i32 {
        self.gap_height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Scroll left. Culling is the owner's job.
    pub fn advance(&mut self, speed: i32) {
        self.x -= speed;
    }

    /// Fully past the left edge
    pub fn is_off_screen(&self) -> bool {
        self.x <= -self.width
    }

    /// Kill the actor if it touches this obstacle
    pub fn test_collision(&self, actor: &mut Actor) -> bool {
        let hit = actor.collides_with(self);
        if hit {
            actor.kill();
        }
        hit
    }
}

/// RNG seed wrapper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            seed: rand::rng().random(),
        }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_update_falls_and_accelerates() {
        let mut actor = Actor::new();
        actor.update();
        assert_eq!(actor.time, 1);
        assert_eq!(actor.y, ACTOR_START_Y);
        assert!((actor.velocity - GRAVITY).abs() < 1e-12);

        actor.update();
        assert!((actor.y - (ACTOR_START_Y - GRAVITY)).abs() < 1e-12);
    }

    #[test]
    fn test_jump_compounds() {
        let mut actor = Actor::new();
        actor.jump();
        assert_eq!(actor.velocity, -JUMP_IMPULSE);
        actor.jump();
        assert_eq!(actor.velocity, -2.0 * JUMP_IMPULSE);
    }

    #[test]
    fn test_jump_while_falling_goes_up() {
        let mut actor = Actor {
            velocity: 3.0,
            ..Actor::default()
        };
        actor.jump();
        assert_eq!(actor.velocity, -10.0);
    }

    #[test]
    fn test_dies_at_ground() {
        let mut actor = Actor {
            y: 0.5,
            velocity: 1.0,
            ..Actor::default()
        };
        actor.update();
        assert!(actor.is_dead());
    }

    #[test]
    fn test_dies_after_exact_tick_count() {
        // y_n = y_{n-1} - v_{n-1}; v_n = v_{n-1} + 0.1
        let (mut y, mut v) = (300.0_f64, 0.0_f64);
        let mut expected = 0;
        while y > 0.0 {
            y -= v;
            v += 0.1;
            expected += 1;
        }
        // Closed form: first n with n(n-1)/2 * 0.1 >= 300
        assert_eq!(expected, 78);

        let mut actor = Actor::new();
        let mut ticks = 0;
        while !actor.is_dead() {
            actor.update();
            ticks += 1;
        }
        assert_eq!(ticks, expected);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut actor = Actor {
            y: -12.0,
            velocity: 9.3,
            time: 500,
            alive: false,
        };
        actor.restart();
        assert_eq!(actor.y, 279.0);
        assert_eq!(actor.velocity, 0.0);
        assert!(!actor.is_dead());
    }

    #[test]
    fn test_frame_index_cycles() {
        let mut actor = Actor::new();
        assert_eq!(actor.frame_index(4), 0);
        actor.time = 10;
        assert_eq!(actor.frame_index(4), 1);
        actor.time = 39;
        assert_eq!(actor.frame_index(4), 3);
        actor.time = 40;
        assert_eq!(actor.frame_index(4), 0);
        assert_eq!(actor.frame_index(0), 0);
    }

    #[test]
    fn test_obstacle_spawns_at_right_edge() {
        let mut rng = RngState::new(7).to_rng();
        let obstacle = Obstacle::new(&mut rng);
        assert_eq!(obstacle.x, WORLD_WIDTH);
        assert_eq!(obstacle.width(), OBSTACLE_WIDTH);
    }

    #[test]
    fn test_obstacle_shape_distribution() {
        let mut rng = RngState::new(2024).to_rng();
        let mut inverted = 0;
        for _ in 0..10_000 {
            let obstacle = Obstacle::new(&mut rng);
            assert!((OBSTACLE_MIN_GAP..OBSTACLE_MAX_GAP).contains(&obstacle.gap_height()));
            if obstacle.inverted() {
                inverted += 1;
            }
        }
        assert!((4_500..=5_500).contains(&inverted), "inverted = {inverted}");
    }

    #[test]
    fn test_same_seed_same_obstacles() {
        let mut a = RngState::new(99).to_rng();
        let mut b = RngState::new(99).to_rng();
        for _ in 0..20 {
            assert_eq!(Obstacle::new(&mut a), Obstacle::new(&mut b));
        }
    }

    #[test]
    fn test_obstacle_advance_and_cull_boundary() {
        let mut obstacle = Obstacle::with_shape(-46, 300, false);
        obstacle.advance(2);
        assert_eq!(obstacle.x, -48);
        assert!(!obstacle.is_off_screen());
        obstacle.advance(2);
        assert!(obstacle.is_off_screen());
    }

    #[test]
    fn test_obstacle_collision_kills_actor() {
        let mut actor = Actor {
            y: 260.0,
            ..Actor::default()
        };
        let obstacle = Obstacle::with_shape(ACTOR_X, 250, false);
        assert!(obstacle.test_collision(&mut actor));
        assert!(actor.is_dead());
    }

    proptest! {
        #[test]
        fn prop_gravity_accumulates(v0 in -50.0f64..50.0, n in 0u32..500) {
            let mut actor = Actor { velocity: v0, y: 1.0e9, ..Actor::default() };
            let mut last = actor.velocity;
            for _ in 0..n {
                actor.update();
                prop_assert!(actor.velocity >= last);
                last = actor.velocity;
            }
            let expected = v0 + n as f64 * GRAVITY;
            prop_assert!((actor.velocity - expected).abs() < 1e-6);
        }

        #[test]
        fn prop_jump_always_upward(v0 in -100.0f64..100.0) {
            let mut actor = Actor { velocity: v0, ..Actor::default() };
            actor.jump();
            prop_assert!(actor.velocity <= -JUMP_IMPULSE);
        }

        #[test]
        fn prop_restart_is_independent_of_history(
            y in -1000.0f64..1000.0,
            v in -100.0f64..100.0,
            alive in any::<bool>(),
        ) {
            let mut actor = Actor { y, velocity: v, time: 3, alive };
            actor.restart();
            prop_assert_eq!(actor.y, 279.0);
            prop_assert_eq!(actor.velocity, 0.0);
            prop_assert!(actor.alive);
        }
    }
}
