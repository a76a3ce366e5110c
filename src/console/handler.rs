//! Console command handler and main loop.

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::parser::{parse_command, ConsoleCommand};
use crate::arbiter::{play_turn, shared, Arbiter, AutoPlay, Seats, SharedGame, TurnOutcome};
use crate::board::{Game, Position};
use crate::eval::{analyze, evaluate};
use crate::heuristic::{suggest, Profile};
use crate::types::{fen_char, File, Rank, Square};

/// Line-oriented front end over a shared game
pub struct Console {
    game: SharedGame,
    arbiter: Arbiter,
    seats: Seats,
    auto: AutoPlay,
    quit: bool,
}

impl Console {
    pub fn new(game: Game, seats: Seats, arbiter: Arbiter, auto: AutoPlay) -> Self {
        Self {
            game: shared(game),
            arbiter,
            seats,
            auto,
            quit: false,
        }
    }

    pub fn game(&self) -> &SharedGame {
        &self.game
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(&mut self) -> io::Result<()> {
        let mut lines = BufReader::new(io::stdin()).lines();
        let mut stdout = io::stdout();

        while let Some(input) = lines.next_line().await? {
            debug!(input = %input, "console command");
            for line in self.handle_input(&input).await {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
            if self.quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle a single line and return the reply lines
    pub async fn handle_input(&mut self, input: &str) -> Vec<String> {
        let cmd = parse_command(input);
        self.handle_command(cmd).await
    }

    async fn handle_command(&mut self, cmd: ConsoleCommand) -> Vec<String> {
        match cmd {
            ConsoleCommand::New => self.cmd_new(),
            ConsoleCommand::Position { fen, moves } => self.cmd_position(fen.as_deref(), &moves),
            ConsoleCommand::Move(text) => self.cmd_move(&text),
            ConsoleCommand::Go => self.cmd_go().await,
            ConsoleCommand::Auto(limit) => self.cmd_auto(limit).await,
            ConsoleCommand::Moves => self.cmd_moves(),
            ConsoleCommand::Eval => to_json(&evaluate(&self.position())),
            ConsoleCommand::Analyze => to_json(&analyze(&self.position())),
            ConsoleCommand::Suggest(profile) => self.cmd_suggest(profile),
            ConsoleCommand::History => self.cmd_history(),
            ConsoleCommand::Pgn => vec![self.game.lock().pgn()],
            ConsoleCommand::Save => to_json(&self.game.lock().save()),
            ConsoleCommand::State => to_json(&self.game.lock().state()),
            ConsoleCommand::Display => self.cmd_display(),
            ConsoleCommand::Quit => {
                self.quit = true;
                Vec::new()
            }
            ConsoleCommand::Empty => Vec::new(),
            ConsoleCommand::Unknown(s) => vec![format!("error: unknown command: {}", s)],
        }
    }

    fn position(&self) -> Position {
        self.game.lock().position()
    }

    // === Commands ===

    fn cmd_new(&mut self) -> Vec<String> {
        *self.game.lock() = Game::new();
        self.arbiter.reset();
        vec!["ok".to_string()]
    }

    fn cmd_position(&mut self, fen: Option<&str>, moves: &[String]) -> Vec<String> {
        let mut game = match fen {
            Some(f) => match Game::from_fen(f) {
                Ok(g) => g,
                Err(e) => return vec![format!("error: {}", e)],
            },
            None => Game::new(),
        };

        for move_str in moves {
            if let Err(e) = game.apply_uci(move_str) {
                return vec![format!("error: {}", e)];
            }
        }

        *self.game.lock() = game;
        self.arbiter.reset();
        vec!["ok".to_string()]
    }

    fn cmd_move(&mut self, text: &str) -> Vec<String> {
        let mut game = self.game.lock();
        match self.arbiter.human_move(&mut game, &self.seats, text) {
            Ok(mv) => {
                let mut out = vec![format!("played {} ({})", mv.san, mv.uci())];
                if let Some(outcome) = game.outcome() {
                    out.push(format!("game over: {}", outcome));
                }
                out
            }
            Err(e) => vec![format!("error: {}", e)],
        }
    }

    async fn cmd_go(&mut self) -> Vec<String> {
        match play_turn(&mut self.arbiter, &self.game, &self.seats).await {
            TurnOutcome::Applied(mv) => {
                let mut out = vec![format!("played {} ({})", mv.san, mv.uci())];
                if let Some(entry) = self.arbiter.log().last() {
                    out.push(format!("info {}", entry));
                }
                out
            }
            TurnOutcome::Manual => vec!["error: side to move is played by a human".to_string()],
            TurnOutcome::GameOver(outcome) => vec![format!("game over: {}", outcome)],
            TurnOutcome::Busy => vec!["busy".to_string()],
            TurnOutcome::Stale => vec!["stale: position changed, nothing applied".to_string()],
            TurnOutcome::Exhausted(error) => vec![format!("unresolved: {}", error)],
        }
    }

    async fn cmd_auto(&mut self, limit: Option<usize>) -> Vec<String> {
        let auto = match limit {
            Some(n) => self.auto.with_max_plies(Some(n)),
            None => self.auto,
        };
        let before = self.arbiter.log().len();
        let report = auto.run(&mut self.arbiter, &self.game, &self.seats).await;

        let mut out: Vec<String> = self.arbiter.log().entries()[before..]
            .iter()
            .map(|e| format!("info {}", e))
            .collect();
        out.push(format!("auto: {} plies, stopped: {:?}", report.applied, report.stopped));
        out
    }

    fn cmd_moves(&self) -> Vec<String> {
        self.game
            .lock()
            .legal_moves()
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{} {} {}", i, m.san, m.uci()))
            .collect()
    }

    fn cmd_suggest(&self, profile: Option<Profile>) -> Vec<String> {
        let position = self.position();
        let side = position.turn();
        let profile = profile
            .or_else(|| self.seats.for_side(side).profile())
            .unwrap_or_default();

        match suggest(&position.legal_moves(), profile, &evaluate(&position), side) {
            Some(s) => {
                let mut out = vec![format!(
                    "suggest {} ({}) index {} score {} confidence {:.1}",
                    s.best.mv.san,
                    s.best.mv.uci(),
                    s.best.index,
                    s.best.score,
                    s.confidence
                )];
                for alt in &s.alternatives {
                    out.push(format!("alt {} score {} - {}", alt.mv.san, alt.score, alt.rationale));
                }
                out.push(format!("info {}", s.reasoning));
                out
            }
            None => vec!["error: no legal moves".to_string()],
        }
    }

    fn cmd_history(&self) -> Vec<String> {
        self.arbiter
            .log()
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, e))
            .collect()
    }

    fn cmd_display(&self) -> Vec<String> {
        let position = self.position();
        let mut out = Vec::with_capacity(10);
        for rank in (0..8).rev() {
            let row: String = (0..8)
                .map(|file| {
                    let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
                    match position.piece_at(sq) {
                        Some((piece, color)) => fen_char(piece, color),
                        None => '.',
                    }
                })
                .flat_map(|c| [c, ' '])
                .collect();
            out.push(format!("{} {}", rank + 1, row.trim_end()));
        }
        out.push("  a b c d e f g h".to_string());
        out.push(format!("FEN: {}", position));
        out
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Vec<String> {
    match serde_json::to_string(value) {
        Ok(s) => vec![s],
        Err(e) => vec![format!("error: {}", e)],
    }
}
