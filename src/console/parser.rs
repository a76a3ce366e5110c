//! Console command parser.

use crate::heuristic::Profile;

/// Parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// "new" - Fresh game from the start position
    New,
    /// "position startpos/fen <fen> [moves ...]"
    Position { fen: Option<String>, moves: Vec<String> },
    /// "move <uci|san>" - Human move for the side to move
    Move(String),
    /// "go" - Let the agent on move play one turn
    Go,
    /// "auto [n]" - Agent-vs-agent play, optionally capped at n plies
    Auto(Option<usize>),
    /// "moves" - Indexed legal moves
    Moves,
    /// "eval"
    Eval,
    /// "analyze"
    Analyze,
    /// "suggest [profile]"
    Suggest(Option<Profile>),
    /// "history" - Move log with rationales
    History,
    /// "pgn"
    Pgn,
    /// "save" - Saved game as JSON
    Save,
    /// "state" - Game state summary as JSON
    State,
    /// "d" - Display the board
    Display,
    /// "quit"
    Quit,
    /// Blank line
    Empty,
    /// Unknown command
    Unknown(String),
}

/// Parse a console line into a ConsoleCommand
pub fn parse_command(input: &str) -> ConsoleCommand {
    let input = input.trim();
    let mut parts = input.split_whitespace();

    match parts.next() {
        None => ConsoleCommand::Empty,
        Some("new") => ConsoleCommand::New,
        Some("position") => parse_position(&mut parts),
        Some("move") => {
            let text: Vec<&str> = parts.collect();
            if text.is_empty() {
                ConsoleCommand::Unknown(input.to_string())
            } else {
                ConsoleCommand::Move(text.join(" "))
            }
        }
        Some("go") => ConsoleCommand::Go,
        Some("auto") => ConsoleCommand::Auto(parts.next().and_then(|n| n.parse().ok())),
        Some("moves") => ConsoleCommand::Moves,
        Some("eval") => ConsoleCommand::Eval,
        Some("analyze") => ConsoleCommand::Analyze,
        Some("suggest") => match parts.next() {
            None => ConsoleCommand::Suggest(None),
            Some(p) => match p.parse() {
                Ok(profile) => ConsoleCommand::Suggest(Some(profile)),
                Err(_) => ConsoleCommand::Unknown(input.to_string()),
            },
        },
        Some("history") => ConsoleCommand::History,
        Some("pgn") => ConsoleCommand::Pgn,
        Some("save") => ConsoleCommand::Save,
        Some("state") => ConsoleCommand::State,
        Some("d") => ConsoleCommand::Display,
        Some("quit") | Some("exit") => ConsoleCommand::Quit,
        _ => ConsoleCommand::Unknown(input.to_string()),
    }
}

fn parse_position<'a>(parts: &mut impl Iterator<Item = &'a str>) -> ConsoleCommand {
    let mut fen = None;
    let mut moves = Vec::new();
    let mut parsing_moves = false;

    while let Some(token) = parts.next() {
        match token {
            "startpos" => {
                fen = None;
            }
            "fen" => {
                // up to six fields, stopping early at "moves"
                let mut fen_parts = Vec::new();
                for _ in 0..6 {
                    match parts.next() {
                        Some("moves") => {
                            parsing_moves = true;
                            break;
                        }
                        Some(part) => fen_parts.push(part),
                        None => break,
                    }
                }
                if !fen_parts.is_empty() {
                    fen = Some(fen_parts.join(" "));
                }
            }
            "moves" => {
                parsing_moves = true;
            }
            _ if parsing_moves => {
                moves.push(token.to_string());
            }
            _ => {}
        }
    }

    ConsoleCommand::Position { fen, moves }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_startpos_moves() {
        assert_eq!(
            parse_command("position startpos moves e2e4 e7e5"),
            ConsoleCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            }
        );
    }

    #[test]
    fn test_position_fen() {
        let cmd = parse_command("position fen 8/P6k/8/8/8/8/8/K7 w - - 0 1 moves a7a8q");
        assert_eq!(
            cmd,
            ConsoleCommand::Position {
                fen: Some("8/P6k/8/8/8/8/8/K7 w - - 0 1".to_string()),
                moves: vec!["a7a8q".to_string()],
            }
        );

        // four-field FEN followed directly by moves
        let cmd = parse_command("position fen 8/P6k/8/8/8/8/8/K7 w - - moves a7a8q");
        assert!(matches!(
            cmd,
            ConsoleCommand::Position { fen: Some(f), moves }
                if f == "8/P6k/8/8/8/8/8/K7 w - -" && moves.len() == 1
        ));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("move Nf3"), ConsoleCommand::Move("Nf3".to_string()));
        assert_eq!(parse_command("auto 12"), ConsoleCommand::Auto(Some(12)));
        assert_eq!(parse_command("auto"), ConsoleCommand::Auto(None));
        assert_eq!(
            parse_command("suggest aggressive"),
            ConsoleCommand::Suggest(Some(Profile::Aggressive))
        );
        assert_eq!(parse_command("   "), ConsoleCommand::Empty);
        assert!(matches!(parse_command("move"), ConsoleCommand::Unknown(_)));
        assert!(matches!(parse_command("ponderhit"), ConsoleCommand::Unknown(_)));
    }
}
