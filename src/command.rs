//! Player command parsing.
//!
//! Input is a comma-separated list such as `level 0, right, Up, undo`.
//! Keywords are case-insensitive and blank entries are skipped.

use std::fmt;

use puzzlang_types::Direction;
use winnow::ascii::{Caseless, digit1, space1};
use winnow::combinator::{alt, preceded};
use winnow::prelude::*;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Level(usize),
    Move(Direction),
    Action,
    Undo,
    Restart,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(n) => write!(f, "level {n}"),
            Self::Move(dir) => write!(f, "{dir}"),
            Self::Action => f.write_str("action"),
            Self::Undo => f.write_str("undo"),
            Self::Restart => f.write_str("restart"),
        }
    }
}

fn level(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (Caseless("level"), space1),
        digit1.try_map(|digits: &str| digits.parse::<usize>()),
    )
    .map(Command::Level)
    .parse_next(input)
}

fn command(input: &mut &str) -> ModalResult<Command> {
    alt((
        level,
        Caseless("up").value(Command::Move(Direction::Up)),
        Caseless("down").value(Command::Move(Direction::Down)),
        Caseless("left").value(Command::Move(Direction::Left)),
        Caseless("right").value(Command::Move(Direction::Right)),
        Caseless("action").value(Command::Action),
        Caseless("undo").value(Command::Undo),
        Caseless("restart").value(Command::Restart),
    ))
    .parse_next(input)
}

/// Parse a whole command list. Fails on the first entry that is not a
/// command, before anything runs.
pub fn parse_commands(input: &str) -> Result<Vec<Command>, ModelError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| command.parse(token).map_err(|_| ModelError::UnknownCommand(token.to_string())))
        .collect()
}
