#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Encircle.

mod roster;
mod turn_state;

use encircle_core::{
    Cell, Command, Event, LevelData, MoveError, PawnId, PawnKind, TurnOutcome, TurnReport,
    OUTCOME_REVEAL_DELAY, PAWN_MOVE_DURATION, WELCOME_BANNER,
};
use log::{debug, info, warn};

use roster::Roster;
use turn_state::{Snapshot, SnapshotStack, TurnState};

pub use turn_state::TurnPhase;

/// Represents the authoritative Encircle board.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: Option<LevelData>,
    roster: Roster,
    turn: TurnState,
    snapshots: SnapshotStack,
}

impl World {
    /// Creates an empty board awaiting a level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            level: None,
            roster: Roster::default(),
            turn: TurnState::default(),
            snapshots: SnapshotStack::default(),
        }
    }

    fn load(&mut self, level: LevelData, out_events: &mut Vec<Event>) {
        if let Err(reason) = level.validate() {
            warn!("rejected level: {reason}");
            out_events.push(Event::LevelRejected { reason });
            return;
        }

        self.roster = Roster::from_level(&level);
        self.turn = TurnState::begin(level.player_moves_in_turn);
        self.snapshots = SnapshotStack::with_initial(self.capture());
        info!(
            "level loaded: {} pawns, {} moves per turn",
            self.roster.pawns().count(),
            level.player_moves_in_turn
        );
        out_events.push(Event::LevelLoaded {
            player_moves_in_turn: level.player_moves_in_turn,
        });
        out_events.push(Event::MovesLeftChanged {
            moves_left: self.turn.moves_left,
        });
        self.level = Some(level);
    }

    fn capture(&self) -> Snapshot {
        Snapshot {
            positions: self.roster.positions(),
            moves_left: self.turn.moves_left,
        }
    }

    fn check_player_move(&self, pawn: PawnId, to: Cell) -> Result<(), MoveError> {
        match self.turn.phase {
            TurnPhase::AwaitingPlayer => {}
            TurnPhase::ResolvingEnemies => return Err(MoveError::InputLocked),
            TurnPhase::Finished(_) => return Err(MoveError::LevelOver),
            TurnPhase::AwaitingLevel => return Err(MoveError::UnknownPawn),
        }

        let state = self.roster.pawn(pawn).ok_or(MoveError::UnknownPawn)?;
        if state.kind != PawnKind::Player {
            return Err(MoveError::NotPlayerPawn);
        }
        if !state.cell.is_adjacent(to) {
            return Err(MoveError::NotAdjacent);
        }
        if !self.roster.is_free(to) {
            return Err(MoveError::Occupied);
        }
        Ok(())
    }

    fn request_enemy_phase(&mut self, out_events: &mut Vec<Event>) {
        self.turn.phase = TurnPhase::ResolvingEnemies;
        out_events.push(Event::EnemyPhaseRequested);
    }

    fn apply_enemy_turn(&mut self, report: TurnReport, out_events: &mut Vec<Event>) {
        for step in report.steps {
            let is_enemy = self
                .roster
                .pawn(step.pawn)
                .map_or(false, |pawn| pawn.kind == PawnKind::Enemy && pawn.cell == step.from);
            if !is_enemy {
                warn!(
                    "ignoring enemy step for pawn {} from {}",
                    step.pawn.get(),
                    step.from
                );
                continue;
            }
            let _ = self.roster.relocate(step.pawn, step.to);
            out_events.push(Event::EnemyPawnMoved {
                pawn: step.pawn,
                from: step.from,
                to: step.to,
                duration: PAWN_MOVE_DURATION,
            });
        }

        match report.outcome {
            TurnOutcome::Fail => {
                info!("level failed");
                self.turn.phase = TurnPhase::Finished(TurnOutcome::Fail);
                out_events.push(Event::LevelFailed {
                    reveal_after: OUTCOME_REVEAL_DELAY,
                });
            }
            TurnOutcome::Success => {
                info!("level succeeded");
                self.turn.phase = TurnPhase::Finished(TurnOutcome::Success);
                out_events.push(Event::LevelSucceeded {
                    reveal_after: OUTCOME_REVEAL_DELAY,
                });
            }
            TurnOutcome::Continue => {
                let board_changed = report.any_moved || self.turn.player_moved;
                self.turn.next_turn(report.any_moved);
                if board_changed {
                    let snapshot = self.capture();
                    self.snapshots.push(snapshot);
                }
                debug!(
                    "turn complete: {} moves left, {} snapshots",
                    self.turn.moves_left,
                    self.snapshots.depth()
                );
                out_events.push(Event::MovesLeftChanged {
                    moves_left: self.turn.moves_left,
                });
                out_events.push(Event::EnemyPhaseCompleted {
                    any_moved: report.any_moved,
                });
            }
        }
    }

    fn undo(&mut self, out_events: &mut Vec<Event>) {
        match self.turn.phase {
            TurnPhase::AwaitingLevel => return,
            TurnPhase::ResolvingEnemies => {
                warn!("undo refused while enemies are moving");
                return;
            }
            TurnPhase::AwaitingPlayer | TurnPhase::Finished(_) => {}
        }

        if !self.turn.diverged_from_snapshot() {
            self.snapshots.pop_keeping_root();
        }
        let Some(snapshot) = self.snapshots.top().cloned() else {
            return;
        };

        for (pawn, cell) in &snapshot.positions {
            if let Some(from) = self.roster.relocate(*pawn, *cell) {
                if from != *cell {
                    out_events.push(Event::PawnRelocated {
                        pawn: *pawn,
                        from,
                        to: *cell,
                    });
                }
            }
        }

        self.turn.moves_left = snapshot.moves_left;
        self.turn.player_moved = false;
        self.turn.phase = TurnPhase::AwaitingPlayer;
        out_events.push(Event::MovesLeftChanged {
            moves_left: self.turn.moves_left,
        });
        out_events.push(Event::SnapshotRestored {
            depth: self.snapshots.depth(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => world.load(level, out_events),
        Command::ResetLevel => match world.level.clone() {
            Some(level) => world.load(level, out_events),
            None => warn!("reset requested before any level was loaded"),
        },
        Command::MovePlayerPawn { pawn, to } => {
            if let Err(reason) = world.check_player_move(pawn, to) {
                debug!("player move of pawn {} to {to} rejected: {reason}", pawn.get());
                out_events.push(Event::PlayerMoveRejected { pawn, to, reason });
                return;
            }

            let Some(from) = world.roster.relocate(pawn, to) else {
                return;
            };
            out_events.push(Event::PlayerPawnMoved { pawn, from, to });

            let enemies_due = world.turn.record_player_move();
            out_events.push(Event::MovesLeftChanged {
                moves_left: world.turn.moves_left,
            });
            if enemies_due {
                world.request_enemy_phase(out_events);
            }
        }
        Command::SkipPlayerMove => {
            if world.turn.phase == TurnPhase::AwaitingPlayer {
                world.request_enemy_phase(out_events);
            } else {
                warn!("skip ignored in phase {:?}", world.turn.phase);
            }
        }
        Command::ApplyEnemyTurn { report } => {
            if world.turn.phase == TurnPhase::ResolvingEnemies {
                world.apply_enemy_turn(report, out_events);
            } else {
                warn!("enemy turn ignored in phase {:?}", world.turn.phase);
            }
        }
        Command::Undo => world.undo(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{TurnPhase, World};
    use encircle_core::{
        Cell, EnemyGoal, EnemyView, LevelData, OccupancyView, PawnId, PawnKind, TargetId,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Level currently loaded, if any.
    #[must_use]
    pub fn level(world: &World) -> Option<&LevelData> {
        world.level.as_ref()
    }

    /// Tagged occupancy of every pawn and enemy target.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView {
        world.roster.occupancy()
    }

    /// Enemy pawns with their goals, ordered by identifier.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.roster.enemy_view()
    }

    /// Captures every pawn in identifier order.
    #[must_use]
    pub fn pawn_view(world: &World) -> Vec<PawnSnapshot> {
        world
            .roster
            .pawns()
            .map(|(id, pawn)| PawnSnapshot {
                id,
                kind: pawn.kind,
                cell: pawn.cell,
                goal: pawn.goal,
            })
            .collect()
    }

    /// Enemy targets with their cells.
    #[must_use]
    pub fn targets(world: &World) -> Vec<(TargetId, Cell)> {
        world.roster.targets().collect()
    }

    /// Cosmetic player target markers.
    #[must_use]
    pub fn player_targets(world: &World) -> &[Cell] {
        world.roster.player_targets()
    }

    /// Player moves remaining before the enemies act.
    #[must_use]
    pub fn moves_left(world: &World) -> u32 {
        world.turn.moves_left
    }

    /// Stage of the current turn.
    #[must_use]
    pub fn phase(world: &World) -> TurnPhase {
        world.turn.phase
    }

    /// Number of snapshots on the undo stack.
    #[must_use]
    pub fn snapshot_depth(world: &World) -> usize {
        world.snapshots.depth()
    }

    /// Immutable representation of a single pawn used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PawnSnapshot {
        /// Unique identifier assigned to the pawn.
        pub id: PawnId,
        /// Side the pawn plays for.
        pub kind: PawnKind,
        /// Cell currently occupied.
        pub cell: Cell,
        /// Goal chased by an enemy pawn.
        pub goal: Option<EnemyGoal>,
    }
}
