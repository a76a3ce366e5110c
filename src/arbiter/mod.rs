//! Move arbitration.
//!
//! An agent's move arrives after an unbounded delay, so the board may have
//! moved on by the time it shows up. The [`Arbiter`] snapshots the position
//! when it asks for a decision, checks the snapshot against the live game
//! when the answer comes back, and only then validates and applies it.
//!
//! Round lifecycle:
//! - `Idle`: nothing outstanding; [`Arbiter::begin`] may dispatch
//! - `AwaitingDecision`: a request is out with the side's source
//! - `Validating`: the reply is being checked against the live game
//! - `Retrying`: the attempt failed and the next one is scheduled
//!
//! The arbiter itself never awaits. [`play_turn`] drives one full turn
//! asynchronously against a [`SharedGame`].

mod driver;
mod log;
mod payload;
mod retry;
mod source;

pub use driver::{
    play_turn, shared, AutoPlay, AutoPlayReport, SharedGame, StopReason, TurnOutcome,
};
pub use log::{EntryKind, LogEntry, MoveLog, NO_MOVE};
pub use payload::{Candidate, DecisionRequest, DecisionResponse};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use source::{DecisionSource, HeuristicSource, ProcessSource, SourceError};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::{parse_coord, Game, LegalMoveSet, Move, Outcome, Position};
use crate::config::ArbiterConfig;
use crate::error::{ChessError, ChessResult};
use crate::heuristic::Profile;
use crate::types::{color_name, Color};

use payload::truncate;

/// Why one attempt of a round failed. All of these are retried.
///
/// Move text that names no legal move, readable or not, is an
/// `IllegalMove`; `Unparseable` is kept for replies that name no move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("unparseable decision: {0}")]
    Unparseable(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<SourceError> for RoundError {
    fn from(e: SourceError) -> Self {
        RoundError::Transport(e.to_string())
    }
}

/// Who plays a side.
#[derive(Clone)]
pub enum Participant {
    Human,
    Agent {
        profile: Profile,
        source: Arc<dyn DecisionSource>,
    },
}

impl Participant {
    pub fn agent(profile: Profile, source: impl DecisionSource + 'static) -> Self {
        Participant::Agent {
            profile,
            source: Arc::new(source),
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Participant::Agent { .. })
    }

    pub fn profile(&self) -> Option<Profile> {
        match self {
            Participant::Human => None,
            Participant::Agent { profile, .. } => Some(*profile),
        }
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Human => f.write_str("Human"),
            Participant::Agent { profile, .. } => write!(f, "Agent({})", profile),
        }
    }
}

/// The participant for each side.
#[derive(Debug, Clone)]
pub struct Seats {
    pub white: Participant,
    pub black: Participant,
}

impl Seats {
    pub fn new(white: Participant, black: Participant) -> Self {
        Self { white, black }
    }

    pub fn for_side(&self, side: Color) -> &Participant {
        match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    Idle,
    AwaitingDecision,
    Validating,
    Retrying,
}

/// A decision that is ready to be sent to a source.
#[derive(Clone)]
pub struct Pending {
    pub request: DecisionRequest,
    pub source: Arc<dyn DecisionSource>,
    /// 1-based attempt number within the round.
    pub attempt: u32,
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("position", &self.request.position)
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Result of asking the arbiter to start (or continue) a round.
#[derive(Debug)]
pub enum Dispatch {
    /// Send this request to the source.
    Request(Pending),
    /// A round is already outstanding.
    Busy,
    GameOver(Outcome),
    /// The side to move has no decision source.
    Manual,
    /// The position changed while a retry was pending; the round is dropped.
    Stale,
}

/// What a source picked, in resolution order.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Index(i64),
    Coord(String),
    San(String),
}

/// A well-formed reply, not yet checked against the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub selection: Selection,
    pub rationale: String,
    pub confidence: Option<f64>,
}

impl Decision {
    pub fn from_response(
        response: DecisionResponse,
        rationale_limit: usize,
    ) -> Result<Self, RoundError> {
        if !response.success {
            return Err(RoundError::Transport(
                response.error.unwrap_or_else(|| "source reported failure".to_string()),
            ));
        }

        let selection = match (response.index, response.coord, response.san) {
            (Some(i), _, _) => Selection::Index(i),
            (None, Some(c), _) => Selection::Coord(c),
            (None, None, Some(s)) => Selection::San(s),
            (None, None, None) => {
                return Err(RoundError::Unparseable("reply names no move".to_string()))
            }
        };

        let rationale = response.rationale.as_deref().unwrap_or_default().trim();
        Ok(Self {
            selection,
            rationale: truncate(rationale, rationale_limit),
            confidence: response.confidence,
        })
    }
}

/// How a reply was handled.
#[derive(Debug)]
pub enum Resolution {
    Applied { mv: Move, decision: Decision },
    /// The position changed while the source was thinking.
    Discarded,
    /// Attempt `attempt` failed; try again after `delay`.
    Retry { attempt: u32, delay: Duration, error: RoundError },
    /// Every attempt failed; the turn stays with the same side.
    Exhausted { attempts: u32, error: RoundError },
}

/// State kept for the outstanding round.
#[derive(Debug, Clone)]
struct Round {
    side: Color,
    profile: Profile,
    snapshot: Position,
    ply: usize,
    legal: LegalMoveSet,
    attempt: u32,
}

impl Round {
    fn is_stale(&self, game: &Game) -> bool {
        game.ply_count() != self.ply || game.position() != self.snapshot
    }
}

/// One-round-at-a-time move arbitration for a game.
#[derive(Debug)]
pub struct Arbiter {
    policy: RetryPolicy,
    decision_timeout: Duration,
    rationale_limit: usize,
    state: ArbiterState,
    round: Option<Round>,
    log: MoveLog,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::from_config(&ArbiterConfig::default())
    }
}

impl Arbiter {
    pub fn new(policy: RetryPolicy, decision_timeout: Duration, rationale_limit: usize) -> Self {
        Self {
            policy,
            decision_timeout,
            rationale_limit,
            state: ArbiterState::Idle,
            round: None,
            log: MoveLog::new(),
        }
    }

    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::new(config.retry_policy(), config.decision_timeout(), config.rationale_limit)
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    /// No round outstanding. A scheduled retry counts as outstanding.
    pub fn is_idle(&self) -> bool {
        self.state == ArbiterState::Idle
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn decision_timeout(&self) -> Duration {
        self.decision_timeout
    }

    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    /// Drop any outstanding round and clear the log (new game).
    pub fn reset(&mut self) {
        self.state = ArbiterState::Idle;
        self.round = None;
        self.log.clear();
    }

    /// Start a round for the side to move.
    pub fn begin(&mut self, game: &Game, participant: &Participant) -> Dispatch {
        if self.state != ArbiterState::Idle {
            debug!(state = ?self.state, "round already outstanding");
            return Dispatch::Busy;
        }
        if let Some(outcome) = game.outcome() {
            return Dispatch::GameOver(outcome);
        }
        match participant {
            Participant::Human => Dispatch::Manual,
            Participant::Agent { profile, source } => self.dispatch(game, *profile, source, 1),
        }
    }

    /// Continue a round after its retry delay.
    pub fn resume(&mut self, game: &Game, participant: &Participant) -> Dispatch {
        match self.state {
            ArbiterState::Idle => return self.begin(game, participant),
            ArbiterState::Retrying => {}
            _ => return Dispatch::Busy,
        }

        let Some(round) = self.round.take() else {
            self.state = ArbiterState::Idle;
            return self.begin(game, participant);
        };

        if round.is_stale(game) {
            info!(
                side = color_name(round.side),
                attempt = round.attempt,
                "position changed before retry; round dropped"
            );
            self.state = ArbiterState::Idle;
            return Dispatch::Stale;
        }

        match participant {
            Participant::Agent { profile, source } => {
                self.dispatch(game, *profile, source, round.attempt + 1)
            }
            Participant::Human => {
                self.state = ArbiterState::Idle;
                Dispatch::Manual
            }
        }
    }

    fn dispatch(
        &mut self,
        game: &Game,
        profile: Profile,
        source: &Arc<dyn DecisionSource>,
        attempt: u32,
    ) -> Dispatch {
        let snapshot = game.position();
        let legal = snapshot.legal_moves();
        let request = DecisionRequest::new(profile, &snapshot, &legal);

        info!(
            side = color_name(snapshot.turn()),
            %profile,
            attempt,
            candidates = legal.len(),
            "requesting decision"
        );

        self.round = Some(Round {
            side: snapshot.turn(),
            profile,
            snapshot,
            ply: game.ply_count(),
            legal,
            attempt,
        });
        self.state = ArbiterState::AwaitingDecision;

        Dispatch::Request(Pending {
            request,
            source: Arc::clone(source),
            attempt,
        })
    }

    /// Handle the source's reply for the outstanding round.
    pub fn resolve(
        &mut self,
        game: &mut Game,
        response: Result<DecisionResponse, SourceError>,
    ) -> Resolution {
        let round = match (self.state, self.round.take()) {
            (ArbiterState::AwaitingDecision, Some(round)) => round,
            (state, round) => {
                warn!(?state, "reply without an outstanding request; ignored");
                self.round = round;
                return Resolution::Discarded;
            }
        };
        self.state = ArbiterState::Validating;

        if round.is_stale(game) {
            let side = color_name(round.side);
            info!(side, attempt = round.attempt, "stale decision discarded");
            self.state = ArbiterState::Idle;
            return Resolution::Discarded;
        }

        let result = response
            .map_err(RoundError::from)
            .and_then(|r| Decision::from_response(r, self.rationale_limit))
            .and_then(|d| apply_decision(game, &round.legal, &d).map(|mv| (mv, d)));

        match result {
            Ok((mv, decision)) => {
                let side = color_name(round.side);
                info!(side, san = %mv.san, attempt = round.attempt, "decision applied");
                self.log.push(LogEntry {
                    side: round.side,
                    kind: EntryKind::Agent(round.profile),
                    san: mv.san.clone(),
                    rationale: decision.rationale.clone(),
                    confidence: decision.confidence,
                });
                self.state = ArbiterState::Idle;
                Resolution::Applied { mv, decision }
            }
            Err(error) if self.policy.can_retry(round.attempt) => {
                let attempt = round.attempt;
                let delay = self.policy.delay_after(attempt);
                let side = color_name(round.side);
                warn!(side, attempt, ?delay, %error, "decision rejected; retrying");
                self.round = Some(round);
                self.state = ArbiterState::Retrying;
                Resolution::Retry { attempt, delay, error }
            }
            Err(error) => {
                warn!(
                    side = color_name(round.side),
                    attempts = round.attempt,
                    %error,
                    "no valid decision; turn unresolved"
                );
                self.log.push(LogEntry {
                    side: round.side,
                    kind: EntryKind::Failure(round.profile),
                    san: NO_MOVE.to_string(),
                    rationale: format!("Failed after {} attempts: {}", round.attempt, error),
                    confidence: None,
                });
                self.state = ArbiterState::Idle;
                Resolution::Exhausted {
                    attempts: round.attempt,
                    error,
                }
            }
        }
    }

    /// Apply a human move given in coordinate notation or SAN.
    ///
    /// Only the side to move may be played by hand, and only if its seat is
    /// human. Sides with an agent seat move through [`Arbiter::begin`].
    pub fn human_move(&mut self, game: &mut Game, seats: &Seats, text: &str) -> ChessResult<Move> {
        if game.is_game_over() {
            return Err(ChessError::IllegalMove(format!("{}: game is over", text.trim())));
        }
        let side = game.turn();
        if seats.for_side(side).is_agent() {
            return Err(ChessError::IllegalMove(format!(
                "{}: {} is played by an agent",
                text.trim(),
                color_name(side)
            )));
        }
        let mv = match parse_coord(text) {
            Ok((from, to, promotion)) => game.apply_move(from, to, promotion)?,
            Err(_) => game.apply_san(text)?,
        };
        info!(side = color_name(side), san = %mv.san, "human move applied");
        self.log.push(LogEntry {
            side,
            kind: EntryKind::Human,
            san: mv.san.clone(),
            rationale: String::new(),
            confidence: None,
        });
        Ok(mv)
    }
}

/// Index into the snapshot set, else coordinate match in the snapshot set,
/// else SAN against the live position. Always applied on the live game.
fn apply_decision(
    game: &mut Game,
    legal: &LegalMoveSet,
    decision: &Decision,
) -> Result<Move, RoundError> {
    let rejected = |e: ChessError| RoundError::IllegalMove(e.to_string());
    let chosen = match &decision.selection {
        Selection::Index(i) => legal.get_signed(*i).ok_or_else(|| {
            RoundError::IllegalMove(format!("index {} outside 0..{}", i, legal.len()))
        })?,
        Selection::Coord(text) => match legal.find_coord(text.trim()) {
            Some((_, m)) => m,
            None => {
                return Err(RoundError::IllegalMove(format!(
                    "{} matches no legal move",
                    text.trim()
                )))
            }
        },
        Selection::San(text) => return game.apply_san(text).map_err(rejected),
    };
    game.apply_move(chosen.from, chosen.to, chosen.promotion).map_err(rejected)
}
