//! Flappy entry point
//!
//! Terminal host: loads settings and assets, shows the title, then runs
//! the simulation until the player quits or rendering fails.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use flappy_sim::platform::spawn_input_pump;
use flappy_sim::renderer::{SceneAssets, TerminalAssets, TerminalGuard, TerminalSurface};
use flappy_sim::sim::{Simulation, draw_banner, spawn_session};
use flappy_sim::{GameError, Settings};

/// Input events buffered between the pump and the control loop
const INPUT_BUFFER: usize = 64;

#[derive(Debug, Parser)]
#[command(name = "flappy-sim", version, about = "Side-scrolling arcade game in the terminal")]
struct Cli {
    /// Settings file (JSON); defaults are used when it does not exist
    #[arg(long, default_value = "flappy.json")]
    settings: PathBuf,

    /// Obstacle RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<(), GameError> {
    let mut settings = Settings::load(&cli.settings)?;
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_filter.as_str()),
    )
    .init();
    log::info!("Flappy (terminal) starting...");

    let mut loader = TerminalAssets::new();
    let assets = SceneAssets::load(&mut loader)?;

    let _terminal = TerminalGuard::enter()?;
    let mut surface = TerminalSurface::stdout()?;
    let (cols, rows) = surface.size();
    log::info!("Drawing to a {cols}x{rows} grid");

    if settings.show_title {
        draw_banner(&mut surface, assets.font, Settings::TITLE_TEXT)?;
        tokio::time::sleep(Duration::from_millis(settings.title_ms)).await;
    }

    let sim = Simulation::new(assets, settings.rng_state());
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    let pump = spawn_input_pump(tx);

    let end = spawn_session(sim, surface, rx).finish().await?;
    end.sim.teardown(&mut loader).await;

    // Notices the closed channel on its next poll
    if let Err(e) = pump.await {
        log::warn!("Input pump ended abnormally: {e}");
    }

    match end.error {
        Some(e) => Err(e),
        None => {
            log::info!("Session ended after {} ticks", end.ticks);
            Ok(())
        }
    }
}
