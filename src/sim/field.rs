//! The live obstacle collection
//!
//! Obstacles are appended by a background spawner on its own timer while
//! the control loop advances, culls, tests and paints them. Every access
//! goes through one `RwLock`; the spawner is cancellable and joined on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use rand_pcg::Pcg32;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::state::{Actor, Obstacle, RngState};
use crate::consts::*;
use crate::error::Result;
use crate::renderer::{DrawSurface, Flip, Rect, SpriteHandle};

struct FieldState {
    /// Spawn order, which is also left-to-right order
    obstacles: Vec<Obstacle>,
    rng: Pcg32,
}

impl FieldState {
    fn spawn(&mut self) {
        let obstacle = Obstacle::new(&mut self.rng);
        log::debug!(
            "Spawned obstacle gap={} inverted={}",
            obstacle.gap_height(),
            obstacle.inverted()
        );
        self.obstacles.push(obstacle);
    }
}

struct Spawner {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct ObstacleField {
    state: Arc<RwLock<FieldState>>,
    speed: i32,
    spawner: Option<Spawner>,
}

impl ObstacleField {
    /// Create the field and start spawning every `SPAWN_INTERVAL`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(rng: RngState) -> Self {
        Self::with_interval(rng, SPAWN_INTERVAL)
    }

    pub fn with_interval(rng: RngState, interval: Duration) -> Self {
        let mut field = Self::idle(rng);
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(spawn_loop(Arc::clone(&field.state), interval, stop_rx));
        field.spawner = Some(Spawner { stop, handle });
        field
    }

    /// Field without a background spawner; obstacles arrive via `spawn_one`/`push`
    pub fn idle(rng: RngState) -> Self {
        Self {
            state: Arc::new(RwLock::new(FieldState {
                obstacles: Vec::new(),
                rng: rng.to_rng(),
            })),
            speed: OBSTACLE_SPEED,
            spawner: None,
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Append one freshly shaped obstacle at the right edge
    pub async fn spawn_one(&self) {
        self.state.write().await.spawn();
    }

    pub async fn push(&self, obstacle: Obstacle) {
        self.state.write().await.obstacles.push(obstacle);
    }

    /// Scroll every obstacle by the field speed and drop the ones off screen
    pub async fn update(&self) {
        let mut state = self.state.write().await;
        for obstacle in &mut state.obstacles {
            obstacle.advance(self.speed);
        }
        let before = state.obstacles.len();
        state.obstacles.retain(|o| !o.is_off_screen());
        let culled = before - state.obstacles.len();
        if culled > 0 {
            log::debug!("Culled {culled} obstacle(s)");
        }
    }

    /// Test every obstacle against the actor; any hit kills it
    pub async fn test_collisions(&self, actor: &mut Actor) -> bool {
        let state = self.state.read().await;
        let mut hit = false;
        for obstacle in &state.obstacles {
            hit |= obstacle.test_collision(actor);
        }
        hit
    }

    pub async fn restart(&self) {
        self.state.write().await.obstacles.clear();
    }

    pub async fn snapshot(&self) -> Vec<Obstacle> {
        self.state.read().await.obstacles.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.obstacles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Draw every obstacle while holding the read lock
    pub async fn paint<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        sprite: SpriteHandle,
    ) -> Result<()> {
        let state = self.state.read().await;
        for obstacle in &state.obstacles {
            let (dest, flip) = obstacle_dest(obstacle);
            surface.draw_sprite(sprite, dest, flip)?;
        }
        Ok(())
    }

    /// Read-only handle for observers on another cadence
    pub fn view(&self) -> ObstacleView {
        ObstacleView {
            state: Arc::clone(&self.state),
        }
    }

    /// Stop the spawner and wait for it to finish
    pub async fn shutdown(&mut self) {
        let Some(spawner) = self.spawner.take() else {
            return;
        };
        let _ = spawner.stop.send(true);
        if let Err(e) = spawner.handle.await {
            log::warn!("Obstacle spawner ended abnormally: {e}");
        }
        log::debug!("Obstacle spawner stopped");
    }
}

/// Shared read access to the obstacle collection
#[derive(Clone)]
pub struct ObstacleView {
    state: Arc<RwLock<FieldState>>,
}

impl ObstacleView {
    pub async fn snapshot(&self) -> Vec<Obstacle> {
        self.state.read().await.obstacles.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.obstacles.len()
    }
}

/// Screen rectangle for an obstacle: bottom-anchored, or top-anchored and
/// flipped when inverted
pub fn obstacle_dest(obstacle: &Obstacle) -> (Rect, Flip) {
    let h = obstacle.gap_height();
    let w = obstacle.width();
    if obstacle.inverted() {
        (Rect::new(obstacle.x, 0, w, h), Flip::Vertical)
    } else {
        (Rect::new(obstacle.x, WORLD_HEIGHT - h, w, h), Flip::None)
    }
}

/// Appends one obstacle per interval (first one immediately) until
/// stopped or the field is dropped
async fn spawn_loop(
    state: Arc<RwLock<FieldState>>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.write().await.spawn();
            }
            _ = stop.changed() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing::{DrawCall, RecordingSurface};

    #[tokio::test(start_paused = true)]
    async fn test_spawner_fires_immediately_then_every_interval() {
        let mut field = ObstacleField::new(RngState::new(1));
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(field.len().await, 3);

        for obstacle in field.snapshot().await {
            assert_eq!(obstacle.x, WORLD_WIDTH);
        }
        field.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_spawning() {
        let mut field = ObstacleField::new(RngState::new(2));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        field.shutdown().await;
        assert!(!field.is_spawning());

        let count = field.len().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(field.len().await, count);

        // Idempotent
        field.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_spawning() {
        let field = ObstacleField::new(RngState::new(3));
        let view = field.view();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(field);

        let count = view.len().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(view.len().await, count);
    }

    #[tokio::test]
    async fn test_update_scrolls_and_culls() {
        let field = ObstacleField::idle(RngState::new(4));
        field.push(Obstacle::with_shape(-46, 300, false)).await;
        field.push(Obstacle::with_shape(100, 300, true)).await;

        field.update().await;
        let xs: Vec<i32> = field.snapshot().await.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![-48, 98]);

        field.update().await;
        let xs: Vec<i32> = field.snapshot().await.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![96]);

        // Culled obstacles never come back
        for _ in 0..10 {
            field.update().await;
        }
        assert!(field.snapshot().await.iter().all(|o| o.x > -OBSTACLE_WIDTH));
        assert_eq!(field.len().await, 1);
    }

    #[tokio::test]
    async fn test_spawned_obstacle_leaves_after_full_scroll() {
        let field = ObstacleField::idle(RngState::new(5));
        field.spawn_one().await;
        // 800 -> -50 takes 425 ticks at speed 2
        for _ in 0..424 {
            field.update().await;
        }
        assert_eq!(field.len().await, 1);
        field.update().await;
        assert!(field.is_empty().await);
    }

    #[tokio::test]
    async fn test_collisions_kill_actor() {
        let field = ObstacleField::idle(RngState::new(6));
        field.push(Obstacle::with_shape(ACTOR_X, 250, false)).await;
        field.push(Obstacle::with_shape(500, 250, false)).await;

        let mut actor = Actor {
            y: 260.0,
            ..Actor::default()
        };
        assert!(field.test_collisions(&mut actor).await);
        assert!(actor.is_dead());

        let mut safe = Actor {
            y: 280.0,
            ..Actor::default()
        };
        assert!(!field.test_collisions(&mut safe).await);
        assert!(!safe.is_dead());
    }

    #[tokio::test]
    async fn test_restart_clears() {
        let field = ObstacleField::idle(RngState::new(7));
        field.spawn_one().await;
        field.spawn_one().await;
        field.restart().await;
        assert!(field.is_empty().await);
    }

    #[tokio::test]
    async fn test_paint_anchors_and_flips() {
        let field = ObstacleField::idle(RngState::new(8));
        field.push(Obstacle::with_shape(300, 250, false)).await;
        field.push(Obstacle::with_shape(400, 220, true)).await;

        let mut surface = RecordingSurface::default();
        let sprite = SpriteHandle(9);
        field.paint(&mut surface, sprite).await.unwrap();

        assert_eq!(
            surface.calls,
            vec![
                DrawCall::Sprite(sprite, Rect::new(300, 350, 50, 250), Flip::None),
                DrawCall::Sprite(sprite, Rect::new(400, 0, 50, 220), Flip::Vertical),
            ]
        );
    }
}
