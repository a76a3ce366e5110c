use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chessarbiter::arbiter::{Arbiter, AutoPlay, Seats};
use chessarbiter::board::Game;
use chessarbiter::config::{Config, SeatKind};
use chessarbiter::console::Console;
use chessarbiter::heuristic::Profile;

/// Chess console where agents and humans play through a move arbiter
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seat kind for White: human, heuristic or process
    #[arg(long)]
    white: Option<SeatKind>,

    /// Seat kind for Black: human, heuristic or process
    #[arg(long)]
    black: Option<SeatKind>,

    /// Profile for both agent seats, overriding the config file
    #[arg(long)]
    profile: Option<Profile>,

    /// Starting position
    #[arg(long)]
    fen: Option<String>,

    /// Play agent-vs-agent immediately, then exit
    #[arg(long)]
    auto: bool,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "chessarbiter=trace"
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(directive) => EnvFilter::try_new(directive).context("invalid --log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(kind) = args.white {
        config.white.kind = kind;
    }
    if let Some(kind) = args.black {
        config.black.kind = kind;
    }
    if let Some(profile) = args.profile {
        config.white.profile = profile;
        config.black.profile = profile;
    }

    let seats = Seats::new(config.white.participant("white")?, config.black.participant("black")?);
    let game = match &args.fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };
    info!(white = ?seats.white, black = ?seats.black, fen = %game.position(), "starting");

    let mut console = Console::new(
        game,
        seats,
        Arbiter::from_config(&config.arbiter),
        AutoPlay::from_config(&config.auto_play),
    );

    if args.auto {
        for line in console.handle_input("auto").await {
            println!("{}", line);
        }
        println!("{}", console.game().lock().pgn());
        return Ok(());
    }

    console.run().await?;
    Ok(())
}
