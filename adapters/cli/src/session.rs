//! Drives the world and the enemy resolver until no command is pending.

use encircle_core::{Command, Event, LevelData, LevelError};
use encircle_system_bootstrap::Bootstrap;
use encircle_system_pathfinding::Pathfinder;
use encircle_system_turn_resolver::TurnResolver;
use encircle_world::{self as world, query, World};

/// Owns one board together with the systems that react to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    resolver: TurnResolver,
    bootstrap: Bootstrap,
}

impl Session {
    pub(crate) fn new(pathfinder: Pathfinder) -> Self {
        Self {
            world: World::new(),
            resolver: TurnResolver::new(pathfinder),
            bootstrap: Bootstrap,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn banner(&self) -> &str {
        self.bootstrap.welcome_banner(&self.world)
    }

    /// Validates and loads a level.
    pub(crate) fn start(&mut self, level: LevelData) -> Result<Vec<Event>, LevelError> {
        let command = self.bootstrap.initialize(level)?;
        Ok(self.submit(command))
    }

    pub(crate) fn reset(&mut self) -> Vec<Event> {
        let command = self.bootstrap.reset();
        self.submit(command)
    }

    /// Applies the command and every follow-up command the systems emit.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let enemies = query::enemy_view(&self.world);
            let occupancy = query::occupancy_view(&self.world);
            self.resolver
                .handle(&events, &enemies, &occupancy, &mut pending);
            log.extend(events);
        }

        log
    }
}
