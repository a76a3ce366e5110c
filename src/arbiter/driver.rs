//! Async driving of arbitration rounds.
//!
//! The game sits behind a `parking_lot` mutex that is only locked for the
//! synchronous arbiter steps. The decision call and the retry delay are the
//! only await points, and no guard is alive across them.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info};

use crate::board::{Game, Move, Outcome};
use crate::config::AutoPlayConfig;

use super::{Arbiter, Dispatch, Resolution, RoundError, Seats, SourceError};

pub type SharedGame = Arc<Mutex<Game>>;

pub fn shared(game: Game) -> SharedGame {
    Arc::new(Mutex::new(game))
}

/// How a turn driven by [`play_turn`] ended.
#[derive(Debug)]
pub enum TurnOutcome {
    Applied(Move),
    /// The side to move is human.
    Manual,
    GameOver(Outcome),
    /// Another round was already outstanding.
    Busy,
    /// The board changed underneath the round; nothing was applied.
    Stale,
    /// Every attempt failed; the same side is still to move.
    Exhausted(RoundError),
}

/// Run one agent turn to completion, retries included.
pub async fn play_turn(arbiter: &mut Arbiter, game: &SharedGame, seats: &Seats) -> TurnOutcome {
    let mut dispatch = {
        let game = game.lock();
        arbiter.begin(&game, seats.for_side(game.turn()))
    };

    loop {
        let pending = match dispatch {
            Dispatch::Request(pending) => pending,
            Dispatch::Busy => return TurnOutcome::Busy,
            Dispatch::GameOver(outcome) => return TurnOutcome::GameOver(outcome),
            Dispatch::Manual => return TurnOutcome::Manual,
            Dispatch::Stale => return TurnOutcome::Stale,
        };

        let limit = arbiter.decision_timeout();
        let response = match timeout(limit, pending.source.decide(pending.request)).await {
            Ok(response) => response,
            Err(_) => Err(SourceError::Timeout(limit)),
        };

        let resolution = {
            let mut game = game.lock();
            arbiter.resolve(&mut game, response)
        };

        match resolution {
            Resolution::Applied { mv, .. } => return TurnOutcome::Applied(mv),
            Resolution::Discarded => return TurnOutcome::Stale,
            Resolution::Exhausted { error, .. } => return TurnOutcome::Exhausted(error),
            Resolution::Retry { delay, .. } => {
                sleep(delay).await;
                dispatch = {
                    let game = game.lock();
                    arbiter.resume(&game, seats.for_side(game.turn()))
                };
            }
        }
    }
}

/// Why auto-play stopped.
#[derive(Debug)]
pub enum StopReason {
    GameOver(Outcome),
    /// A human seat is to move.
    HumanToMove,
    PlyLimit,
    /// A turn ended without a move.
    Unresolved(RoundError),
}

#[derive(Debug)]
pub struct AutoPlayReport {
    /// Plies applied by this run.
    pub applied: usize,
    pub stopped: StopReason,
}

/// Agent-vs-agent loop on a fixed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlay {
    interval: Duration,
    max_plies: Option<usize>,
}

impl Default for AutoPlay {
    fn default() -> Self {
        Self::from_config(&AutoPlayConfig::default())
    }
}

impl AutoPlay {
    pub fn new(interval: Duration, max_plies: Option<usize>) -> Self {
        Self { interval, max_plies }
    }

    pub fn from_config(config: &AutoPlayConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms), config.max_plies)
    }

    pub fn with_max_plies(mut self, max_plies: Option<usize>) -> Self {
        self.max_plies = max_plies;
        self
    }

    /// Trigger a turn every tick until the game ends, a human is to move,
    /// the ply limit is hit or a turn goes unresolved.
    pub async fn run(
        &self,
        arbiter: &mut Arbiter,
        game: &SharedGame,
        seats: &Seats,
    ) -> AutoPlayReport {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut applied = 0;

        let stopped = loop {
            ticker.tick().await;

            if self.max_plies.is_some_and(|max| applied >= max) {
                break StopReason::PlyLimit;
            }

            {
                let game = game.lock();
                if let Some(outcome) = game.outcome() {
                    break StopReason::GameOver(outcome);
                }
                if !seats.for_side(game.turn()).is_agent() {
                    break StopReason::HumanToMove;
                }
            }
            if !arbiter.is_idle() {
                debug!("round outstanding; tick skipped");
                continue;
            }

            match play_turn(arbiter, game, seats).await {
                TurnOutcome::Applied(_) => applied += 1,
                TurnOutcome::Stale | TurnOutcome::Busy => {}
                TurnOutcome::Manual => break StopReason::HumanToMove,
                TurnOutcome::GameOver(outcome) => break StopReason::GameOver(outcome),
                TurnOutcome::Exhausted(error) => break StopReason::Unresolved(error),
            }
        };

        info!(applied, stopped = ?stopped, "auto-play stopped");
        AutoPlayReport { applied, stopped }
    }
}
