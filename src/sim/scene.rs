//! The scene: actor plus obstacle field
//!
//! Owns both exclusively and exposes the update/paint/event contract the
//! control loop drives. The actor sits behind its own `RwLock` so readers
//! on another cadence (see `WorldView`) never observe a torn tick.
//!
//! Lock order is always actor, then field.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::field::{ObstacleField, ObstacleView};
use super::state::{Actor, Obstacle, RngState, ScenePhase};
use crate::consts::*;
use crate::error::Result;
use crate::platform::{AssetLoader, InputEvent, JUMP_KEY};
use crate::renderer::{DrawSurface, Flip, FontHandle, Rect, SceneAssets};

pub const GAME_OVER_TEXT: &str = "Game Over";

pub struct Simulation {
    actor: Arc<RwLock<Actor>>,
    field: ObstacleField,
    assets: SceneAssets,
    phase: ScenePhase,
    /// Completed rounds (deaths) this session
    rounds: u32,
}

impl Simulation {
    /// New scene with a running obstacle spawner. Needs a tokio runtime.
    pub fn new(assets: SceneAssets, rng: RngState) -> Self {
        log::info!("Starting scene (seed {})", rng.seed);
        Self::with_field(assets, ObstacleField::new(rng))
    }

    pub fn with_field(assets: SceneAssets, field: ObstacleField) -> Self {
        Self {
            actor: Arc::new(RwLock::new(Actor::new())),
            field,
            assets,
            phase: ScenePhase::Running,
            rounds: 0,
        }
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    /// One fixed tick: move the actor, scroll the field, test collisions.
    ///
    /// Returns true when the actor died this tick.
    pub async fn update(&mut self) -> bool {
        if self.phase != ScenePhase::Running {
            return false;
        }

        let mut actor = self.actor.write().await;
        actor.update();
        self.field.update().await;
        self.field.test_collisions(&mut actor).await;

        if actor.is_dead() {
            self.phase = ScenePhase::GameOverPause;
            return true;
        }
        false
    }

    /// React to one input event. Returns true when the session should end.
    pub async fn handle_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Quit => {
                log::info!("Quit received");
                self.phase = ScenePhase::Closed;
                true
            }
            InputEvent::KeyDown(key) if key == JUMP_KEY => {
                if self.phase == ScenePhase::Running {
                    self.actor.write().await.jump();
                }
                false
            }
            InputEvent::KeyDown(_) | InputEvent::KeyOther => false,
        }
    }

    pub async fn is_dead(&self) -> bool {
        self.actor.read().await.is_dead()
    }

    pub async fn actor(&self) -> Actor {
        self.actor.read().await.clone()
    }

    /// Replace the actor state (scripted scenarios)
    pub async fn set_actor(&self, actor: Actor) {
        *self.actor.write().await = actor;
    }

    pub async fn obstacles(&self) -> Vec<Obstacle> {
        self.field.snapshot().await
    }

    /// Draw one frame: background, actor, obstacles
    pub async fn paint<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        let actor = self.actor.read().await;

        surface.clear()?;
        surface.draw_texture(self.assets.background, None)?;

        let frames = &self.assets.actor_frames;
        if let Some(frame) = frames.get(actor.frame_index(frames.len())) {
            surface.draw_sprite(*frame, actor_dest(&actor), Flip::None)?;
        }

        self.field.paint(surface, self.assets.obstacle).await?;
        surface.present()?;
        Ok(())
    }

    /// Show the banner, hold the control loop for `GAME_OVER_PAUSE`, then
    /// restart. The spawner is not paused.
    pub async fn game_over<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        self.phase = ScenePhase::GameOverPause;
        self.rounds += 1;
        log::info!("Actor is dead (round {})", self.rounds);

        draw_banner(surface, self.assets.font, GAME_OVER_TEXT)?;
        tokio::time::sleep(GAME_OVER_PAUSE).await;

        self.restart().await;
        Ok(())
    }

    pub async fn restart(&mut self) {
        log::info!("Restarting");
        self.actor.write().await.restart();
        self.field.restart().await;
        self.phase = ScenePhase::Running;
    }

    pub fn view(&self) -> WorldView {
        WorldView {
            actor: Arc::clone(&self.actor),
            obstacles: self.field.view(),
        }
    }

    /// Stop the spawner and hand every asset back to the loader
    pub async fn teardown<L: AssetLoader + ?Sized>(mut self, loader: &mut L) {
        self.phase = ScenePhase::Closed;
        self.field.shutdown().await;
        self.assets.release(loader);
        log::info!("Scene torn down after {} round(s)", self.rounds);
    }
}

/// Consistent snapshot of the world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub actor: Actor,
    pub obstacles: Vec<Obstacle>,
}

/// Read-only handle on the scene for observers on their own cadence
#[derive(Clone)]
pub struct WorldView {
    actor: Arc<RwLock<Actor>>,
    obstacles: ObstacleView,
}

impl WorldView {
    pub async fn snapshot(&self) -> WorldSnapshot {
        let actor = self.actor.read().await;
        WorldSnapshot {
            actor: actor.clone(),
            obstacles: self.obstacles.snapshot().await,
        }
    }
}

/// Screen rectangle for the actor (screen y grows downward)
pub fn actor_dest(actor: &Actor) -> Rect {
    Rect::new(
        ACTOR_X,
        WORLD_HEIGHT - actor.y as i32 - ACTOR_HALF_HEIGHT,
        ACTOR_WIDTH,
        ACTOR_HEIGHT,
    )
}

/// Full-screen text frame (title, game over)
pub fn draw_banner<S: DrawSurface + ?Sized>(surface: &mut S, font: FontHandle, text: &str) -> Result<()> {
    surface.clear()?;
    surface.draw_text(font, text, None)?;
    surface.present()
}
