//! Flappy - a side-scrolling arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (actor physics, obstacle field, scene, tick loop)
//! - `renderer`: Drawing surface abstraction and the terminal implementation
//! - `platform`: Input events and asset loading
//! - `settings`: Host configuration
//! - `error`: Error taxonomy

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// World dimensions (origin at ground, y increasing upward)
    pub const WORLD_WIDTH: i32 = 800;
    pub const WORLD_HEIGHT: i32 = 600;

    /// Actor geometry
    pub const ACTOR_X: i32 = 10;
    pub const ACTOR_WIDTH: i32 = 50;
    pub const ACTOR_HEIGHT: i32 = 43;
    pub const ACTOR_HALF_HEIGHT: i32 = ACTOR_HEIGHT / 2;

    /// Starting altitude of a fresh actor
    pub const ACTOR_START_Y: f64 = 300.0;
    /// Altitude after a restart
    pub const ACTOR_RESTART_Y: f64 = (300 - ACTOR_HALF_HEIGHT) as f64;

    /// Velocity gained per tick (positive = falling)
    pub const GRAVITY: f64 = 0.1;
    /// Upward impulse applied by a jump
    pub const JUMP_IMPULSE: f64 = 7.0;

    /// Ticks per animation frame of the actor
    pub const TICKS_PER_FRAME: u64 = 10;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: i32 = 50;
    pub const OBSTACLE_MIN_GAP: i32 = 200;
    pub const OBSTACLE_MAX_GAP: i32 = 400;

    /// Horizontal scroll per tick
    pub const OBSTACLE_SPEED: i32 = 2;

    /// Fixed simulation timestep (100 Hz)
    pub const TICK_INTERVAL: Duration = Duration::from_millis(10);
    pub const SPAWN_INTERVAL: Duration = Duration::from_millis(1000);
    pub const GAME_OVER_PAUSE: Duration = Duration::from_secs(2);
}

/// Whether two half-open horizontal spans `[a, a + aw)` and `[b, b + bw)` overlap
#[inline]
pub fn spans_overlap(a: i32, aw: i32, b: i32, bw: i32) -> bool {
    a + aw > b && a < b + bw
}
