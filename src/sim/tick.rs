//! Fixed timestep control loop
//!
//! One task merges input events and a 10 ms tick into a single sequential
//! stream, so event handling and update/paint never interleave. The first
//! fatal error is reported on the session's error channel and ends it.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::scene::Simulation;
use crate::consts::*;
use crate::error::{GameError, Result};
use crate::platform::InputEvent;
use crate::renderer::DrawSurface;

/// What the control loop hands back when it exits
pub struct SessionEnd<S> {
    pub sim: Simulation,
    pub surface: S,
    /// Ticks processed (the failing one included)
    pub ticks: u64,
    /// Fatal error that ended the session, `None` on quit
    pub error: Option<GameError>,
}

/// A running control loop
pub struct Session<S> {
    errors: mpsc::Receiver<GameError>,
    task: JoinHandle<(Simulation, S, u64)>,
}

/// Start the control loop on its own task.
///
/// The loop ends on `Quit`, when every input sender is dropped, or on the
/// first render error.
pub fn spawn_session<S>(sim: Simulation, surface: S, events: mpsc::Receiver<InputEvent>) -> Session<S>
where
    S: DrawSurface + Send + 'static,
{
    let (errc, errors) = mpsc::channel(1);
    let task = tokio::spawn(control_loop(sim, surface, events, errc));
    Session { errors, task }
}

impl<S> Session<S> {
    /// Wait for the loop to exit
    pub async fn finish(mut self) -> Result<SessionEnd<S>> {
        // Closes without a value when the loop exits cleanly
        let error = self.errors.recv().await;

        let (sim, surface, ticks) = match self.task.await {
            Ok(parts) => parts,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(GameError::Session(e.to_string())),
        };

        Ok(SessionEnd {
            sim,
            surface,
            ticks,
            error,
        })
    }
}

async fn control_loop<S>(
    mut sim: Simulation,
    mut surface: S,
    mut events: mpsc::Receiver<InputEvent>,
    errc: mpsc::Sender<GameError>,
) -> (Simulation, S, u64)
where
    S: DrawSurface + Send,
{
    let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let event = event.unwrap_or_else(|| {
                    log::info!("Input closed, ending session");
                    InputEvent::Quit
                });
                if sim.handle_event(event).await {
                    break;
                }
            }
            _ = ticker.tick() => {
                ticks += 1;
                if let Err(err) = step(&mut sim, &mut surface).await {
                    log::error!("Session aborted on tick {ticks}: {err}");
                    let _ = errc.send(err).await;
                    break;
                }
            }
        }
    }

    log::info!("Control loop exited after {ticks} ticks");
    (sim, surface, ticks)
}

/// Update, run the game-over pause if the actor died, then paint
async fn step<S: DrawSurface + Send>(sim: &mut Simulation, surface: &mut S) -> Result<()> {
    if sim.update().await {
        sim.game_over(surface).await?;
    }
    sim.paint(surface).await
}
