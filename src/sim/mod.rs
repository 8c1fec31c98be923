//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed 10 ms timestep driven by a single control task
//! - Seeded RNG only (injected per field)
//! - Shared state behind `RwLock`s; the obstacle spawner is the only
//!   writer outside the control task
//! - No platform dependencies beyond the `DrawSurface` contract

pub mod collision;
pub mod field;
pub mod scene;
pub mod state;
pub mod tick;

pub use collision::actor_hits_obstacle;
pub use field::{ObstacleField, ObstacleView, obstacle_dest};
pub use scene::{GAME_OVER_TEXT, Simulation, WorldSnapshot, WorldView, actor_dest, draw_banner};
pub use state::{Actor, Obstacle, RngState, ScenePhase};
pub use tick::{Session, SessionEnd, spawn_session};
