//! Interactive console.
//!
//! A small line protocol over stdin/stdout in the spirit of engine protocols:
//! one command per line, replies as plain lines, JSON for structured data.
//! Logging goes to stderr so stdout stays machine-readable.
//!
//! Commands: `new`, `position startpos|fen <fen> [moves ...]`, `move <uci|san>`,
//! `go`, `auto [n]`, `moves`, `eval`, `analyze`, `suggest [profile]`,
//! `history`, `pgn`, `save`, `state`, `d`, `quit`.

mod handler;
mod parser;

pub use handler::Console;
pub use parser::{parse_command, ConsoleCommand};
