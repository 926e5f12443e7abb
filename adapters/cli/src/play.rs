//! Line-oriented play loop.

use std::{
    io::{BufRead, Write},
    str::FromStr,
    thread,
};

use anyhow::{Context, Result};
use encircle_core::{Cell, Command, Event, PawnId};
use thiserror::Error;

use crate::{render, session::Session};

const HELP: &str = "\
commands:
  move <pawn> <x> <y>   step a player pawn onto a neighbouring cell
  skip                  let the enemies move now
  undo                  rewind to the start of the turn
  reset                 restart the level
  board                 redraw the board
  quit                  leave the game";

/// One parsed line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayerInput {
    Move { pawn: PawnId, to: Cell },
    Skip,
    Undo,
    Reset,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum InputError {
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),
    #[error("usage: move <pawn> <x> <y>")]
    MoveUsage,
}

impl FromStr for PlayerInput {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Board);
        };
        let input = match verb {
            "move" | "m" => {
                let numbers: Vec<i64> = words
                    .map(str::parse)
                    .collect::<Result<_, _>>()
                    .map_err(|_| InputError::MoveUsage)?;
                let [pawn, x, y] = numbers[..] else {
                    return Err(InputError::MoveUsage);
                };
                let pawn = u32::try_from(pawn).map_err(|_| InputError::MoveUsage)?;
                let x = i32::try_from(x).map_err(|_| InputError::MoveUsage)?;
                let y = i32::try_from(y).map_err(|_| InputError::MoveUsage)?;
                Self::Move {
                    pawn: PawnId::new(pawn),
                    to: Cell::new(x, y),
                }
            }
            "skip" | "s" => Self::Skip,
            "undo" | "u" => Self::Undo,
            "reset" => Self::Reset,
            "board" | "b" => Self::Board,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(InputError::UnknownCommand(other.to_owned())),
        };
        Ok(input)
    }
}

/// Controls whether the loop waits out animation and reveal delays.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Pacing {
    pub(crate) enabled: bool,
}

impl Pacing {
    fn wait_for(&self, event: &Event) {
        if !self.enabled {
            return;
        }
        match event {
            Event::EnemyPawnMoved { duration, .. } => thread::sleep(*duration),
            Event::LevelSucceeded { reveal_after } | Event::LevelFailed { reveal_after } => {
                thread::sleep(*reveal_after);
            }
            _ => {}
        }
    }
}

/// Reads commands until the input ends or the player quits.
pub(crate) fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    output: &mut W,
    pacing: Pacing,
) -> Result<()> {
    writeln!(output, "{}", session.banner()).context("failed to write output")?;
    write!(output, "{}", render::board(session.world())).context("failed to write output")?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let events = match line.parse::<PlayerInput>() {
            Ok(PlayerInput::Quit) => break,
            Ok(PlayerInput::Help) => {
                writeln!(output, "{HELP}").context("failed to write output")?;
                continue;
            }
            Ok(PlayerInput::Board) => Vec::new(),
            Ok(PlayerInput::Move { pawn, to }) => {
                session.submit(Command::MovePlayerPawn { pawn, to })
            }
            Ok(PlayerInput::Skip) => session.submit(Command::SkipPlayerMove),
            Ok(PlayerInput::Undo) => session.submit(Command::Undo),
            Ok(PlayerInput::Reset) => session.reset(),
            Err(error) => {
                writeln!(output, "{error}").context("failed to write output")?;
                continue;
            }
        };

        for event in &events {
            if let Some(text) = render::event(event) {
                writeln!(output, "{text}").context("failed to write output")?;
            }
            output.flush().context("failed to flush output")?;
            pacing.wait_for(event);
        }
        write!(output, "{}", render::board(session.world())).context("failed to write output")?;
    }

    Ok(())
}
