#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares an Encircle level.

use encircle_core::{Command, LevelData, LevelError};
use encircle_world::{query, World};
use log::warn;

/// Turns level data into the commands that start or restart a level.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Validates the level and produces the command that loads it.
    pub fn initialize(&self, level: LevelData) -> Result<Command, LevelError> {
        if let Err(reason) = level.validate() {
            warn!("level data rejected during bootstrap: {reason}");
            return Err(reason);
        }
        Ok(Command::LoadLevel { level })
    }

    /// Produces the command that restores the loaded level to its initial layout.
    #[must_use]
    pub fn reset(&self) -> Command {
        Command::ResetLevel
    }
}
