#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Encircle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`OccupancyView`], and respond exclusively with new
//! command batches.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

mod level;

pub use level::{EnemyPawnData, LevelData, LevelError, LEVEL_COORDINATE_LIMIT, MAX_LEVEL_SPAN};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Encircle.";

/// Wall-clock time a single animated pawn step occupies.
pub const PAWN_MOVE_DURATION: Duration = Duration::from_millis(300);

/// Pause between the end of an enemy phase and the success or fail popup.
pub const OUTCOME_REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the board with the provided level and resets the turn state.
    LoadLevel {
        /// Level description to instantiate.
        level: LevelData,
    },
    /// Reloads the most recently loaded level.
    ResetLevel,
    /// Requests that a player pawn step onto a neighbouring cell.
    MovePlayerPawn {
        /// Identifier of the player pawn to move.
        pawn: PawnId,
        /// Destination cell; must be one of the pawn's eight neighbours.
        to: Cell,
    },
    /// Hands the turn to the enemies without moving a player pawn.
    SkipPlayerMove,
    /// Applies the result of an enemy resolution pass.
    ApplyEnemyTurn {
        /// Steps and outcome computed by the turn resolver.
        report: TurnReport,
    },
    /// Restores the board to the previous snapshot.
    Undo,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level was instantiated and the first turn began.
    LevelLoaded {
        /// Number of player moves granted per turn.
        player_moves_in_turn: u32,
    },
    /// Reports that a level could not be instantiated.
    LevelRejected {
        /// Validation failure describing the malformed content.
        reason: LevelError,
    },
    /// Confirms that a player pawn stepped between two cells.
    PlayerPawnMoved {
        /// Identifier of the pawn that moved.
        pawn: PawnId,
        /// Cell occupied before the move.
        from: Cell,
        /// Cell occupied after the move.
        to: Cell,
    },
    /// Reports that a player move request was refused.
    PlayerMoveRejected {
        /// Identifier of the pawn named in the request.
        pawn: PawnId,
        /// Destination named in the request.
        to: Cell,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Updates the moves-left display.
    MovesLeftChanged {
        /// Player moves remaining before the enemies act.
        moves_left: u32,
    },
    /// Input is locked and the enemies must be resolved.
    EnemyPhaseRequested,
    /// Confirms that an enemy pawn advanced during the enemy phase.
    EnemyPawnMoved {
        /// Identifier of the enemy pawn that moved.
        pawn: PawnId,
        /// Cell occupied before the move.
        from: Cell,
        /// Cell occupied after the move.
        to: Cell,
        /// Time the step animation occupies before the next action may run.
        duration: Duration,
    },
    /// The enemy phase ended without deciding the level; input is unlocked.
    EnemyPhaseCompleted {
        /// Whether any enemy pawn moved during the phase.
        any_moved: bool,
    },
    /// Every enemy is trapped: show the success popup.
    LevelSucceeded {
        /// Delay before the popup should appear.
        reveal_after: Duration,
    },
    /// An enemy reached its target: show the fail popup.
    LevelFailed {
        /// Delay before the popup should appear.
        reveal_after: Duration,
    },
    /// A pawn was moved back by an undo.
    PawnRelocated {
        /// Identifier of the relocated pawn.
        pawn: PawnId,
        /// Cell occupied before the undo.
        from: Cell,
        /// Cell restored by the undo.
        to: Cell,
    },
    /// An undo restored a stored snapshot.
    SnapshotRestored {
        /// Number of snapshots remaining on the undo stack.
        depth: usize,
    },
}

/// Reasons a player move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    /// No pawn with the provided identifier exists.
    UnknownPawn,
    /// The identified pawn belongs to the enemy.
    NotPlayerPawn,
    /// The destination is not one of the pawn's eight neighbours.
    NotAdjacent,
    /// The destination is occupied by a pawn or target.
    Occupied,
    /// Input is locked while the enemy phase resolves.
    InputLocked,
    /// The level already ended in success or failure.
    LevelOver,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UnknownPawn => "no such pawn",
            Self::NotPlayerPawn => "pawn is not controlled by the player",
            Self::NotAdjacent => "destination is not a neighbouring cell",
            Self::Occupied => "destination is occupied",
            Self::InputLocked => "enemies are moving",
            Self::LevelOver => "level is over",
        };
        f.write_str(text)
    }
}

/// Location of a single grid square expressed as signed column and row.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided deltas, saturating at the
    /// edges of the coordinate space.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Computes the Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether `other` is one of the eight cells surrounding `self`.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.chebyshev_distance(other) == 1
    }

    /// Component-wise minimum of two cells.
    #[must_use]
    pub fn min(self, other: Cell) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum of two cells.
    #[must_use]
    pub fn max(self, other: Cell) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBounds {
    min: Cell,
    size: CellBoundsSize,
}

impl CellBounds {
    /// Constructs bounds from the minimum corner and a size.
    #[must_use]
    pub const fn from_min_and_size(min: Cell, size: CellBoundsSize) -> Self {
        Self { min, size }
    }

    /// Constructs the smallest bounds containing both corners inclusively.
    #[must_use]
    pub fn from_corners(a: Cell, b: Cell) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        let width = max.x().abs_diff(min.x()).saturating_add(1);
        let height = max.y().abs_diff(min.y()).saturating_add(1);
        Self::from_min_and_size(min, CellBoundsSize::new(width, height))
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> Cell {
        self.min
    }

    /// Corner with the largest coordinates, inclusive.
    #[must_use]
    pub fn max(&self) -> Cell {
        let far = |min: i32, extent: u32| {
            let value = i64::from(min) + i64::from(extent) - 1;
            i32::try_from(value).unwrap_or(i32::MAX)
        };
        Cell::new(
            far(self.min.x(), self.size.width()),
            far(self.min.y(), self.size.height()),
        )
    }

    /// Dimensions measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellBoundsSize {
        self.size
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width()
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height()
    }

    /// Reports whether the cell lies inside the bounds.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        let max = self.max();
        cell.x() >= self.min.x() && cell.x() <= max.x() && cell.y() >= self.min.y() && cell.y() <= max.y()
    }

    /// Returns the bounds grown by `margin` cells on every side.
    #[must_use]
    pub fn expanded(&self, margin: u32) -> Self {
        let shift = i32::try_from(margin).unwrap_or(i32::MAX);
        let grow = margin.saturating_mul(2);
        Self::from_min_and_size(
            self.min.offset(-shift, -shift),
            CellBoundsSize::new(
                self.width().saturating_add(grow),
                self.height().saturating_add(grow),
            ),
        )
    }
}

/// Size of a [`CellBounds`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBoundsSize {
    width: u32,
    height: u32,
}

impl CellBoundsSize {
    /// Creates a new size descriptor; zero extents are raised to one.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Unique identifier assigned to a pawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PawnId(u32);

impl PawnId {
    /// Creates a new pawn identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a stationary enemy target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side a pawn plays for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PawnKind {
    /// Pawn steered by the player.
    Player,
    /// Pawn steered by the turn resolver.
    Enemy,
}

/// What an enemy pawn is trying to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyGoal {
    /// A stationary target entity.
    Target(TargetId),
    /// Another enemy pawn; the relation is always mutual.
    Pawn(PawnId),
}

/// Tagged content of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// Cell holds a player pawn.
    PlayerPawn(PawnId),
    /// Cell holds an enemy pawn.
    EnemyPawn(PawnId),
    /// Cell holds a stationary enemy target.
    Target(TargetId),
    /// Cell is free.
    #[default]
    Empty,
}

impl Occupant {
    /// Reports whether the cell is free.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Occupant layers that lock cells for a path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObstacleSet {
    /// Player pawns lock their cells.
    pub player_pawns: bool,
    /// Enemy pawns lock their cells.
    pub enemy_pawns: bool,
    /// Enemy targets lock their cells.
    pub targets: bool,
}

impl ObstacleSet {
    /// Every occupant is an obstacle.
    pub const ALL: Self = Self {
        player_pawns: true,
        enemy_pawns: true,
        targets: true,
    };

    /// Player pawns and enemy targets are obstacles; enemy pawns are not.
    pub const PLAYERS_AND_TARGETS: Self = Self {
        player_pawns: true,
        enemy_pawns: false,
        targets: true,
    };

    /// Only player pawns are obstacles.
    pub const PLAYERS: Self = Self {
        player_pawns: true,
        enemy_pawns: false,
        targets: false,
    };

    /// Reports whether the occupant belongs to one of the selected layers.
    #[must_use]
    pub const fn includes(&self, occupant: Occupant) -> bool {
        match occupant {
            Occupant::PlayerPawn(_) => self.player_pawns,
            Occupant::EnemyPawn(_) => self.enemy_pawns,
            Occupant::Target(_) => self.targets,
            Occupant::Empty => false,
        }
    }
}

/// Read-only snapshot of every occupied cell on the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyView {
    cells: BTreeMap<Cell, Occupant>,
}

impl OccupancyView {
    /// Captures a view from `(cell, occupant)` pairs; empty occupants are skipped.
    #[must_use]
    pub fn from_occupants(occupants: impl IntoIterator<Item = (Cell, Occupant)>) -> Self {
        let cells = occupants
            .into_iter()
            .filter(|(_, occupant)| !occupant.is_empty())
            .collect();
        Self { cells }
    }

    /// Returns the occupant of the provided cell.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Occupant {
        self.cells.get(&cell).copied().unwrap_or_default()
    }

    /// Reports whether the cell is free for traversal.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        self.occupant(cell).is_empty()
    }

    /// Iterator over occupied cells in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Occupant)> + '_ {
        self.cells.iter().map(|(cell, occupant)| (*cell, *occupant))
    }

    /// Iterator over the cells whose occupant belongs to the obstacle set.
    pub fn cells_in(&self, obstacles: ObstacleSet) -> impl Iterator<Item = Cell> + '_ {
        self.iter()
            .filter(move |(_, occupant)| obstacles.includes(*occupant))
            .map(|(cell, _)| cell)
    }

    /// Cell currently holding the provided pawn, if any.
    #[must_use]
    pub fn cell_of_pawn(&self, pawn: PawnId) -> Option<Cell> {
        self.iter()
            .find(|(_, occupant)| {
                matches!(occupant, Occupant::PlayerPawn(id) | Occupant::EnemyPawn(id) if *id == pawn)
            })
            .map(|(cell, _)| cell)
    }

    /// Cell holding the provided target, if any.
    #[must_use]
    pub fn cell_of_target(&self, target: TargetId) -> Option<Cell> {
        self.iter()
            .find(|(_, occupant)| *occupant == Occupant::Target(target))
            .map(|(cell, _)| cell)
    }

    /// Moves whatever occupies `from` onto `to`, leaving `from` empty.
    ///
    /// Used by systems to keep a scratch copy in step with planned moves.
    pub fn relocate(&mut self, from: Cell, to: Cell) {
        if from == to {
            return;
        }
        if let Some(occupant) = self.cells.remove(&from) {
            let _ = self.cells.insert(to, occupant);
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A pawn that is mid-move during a combined enemy pass.
///
/// While planning, `from` counts as vacated and `to` as occupied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PawnTransition {
    /// Cell the pawn is leaving.
    pub from: Cell,
    /// Cell the pawn will settle on.
    pub to: Cell,
}

/// Ordered route produced by the pathfinder.
///
/// Cells are stored in travel order: the first entry is the step adjacent
/// to the start and the last entry is the goal. The start cell itself is
/// never included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    /// Wraps cells already arranged in travel order.
    #[must_use]
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// An empty path.
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Cell to move onto this turn.
    #[must_use]
    pub fn next_step(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    /// Final cell of the route.
    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Number of cells still to traverse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in travel order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Consumes the path, yielding the underlying cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

/// Result of a path query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    /// Whether the goal was reached by the search.
    pub found: bool,
    /// Extracted route; empty when not found or when start equals goal.
    pub path: Path,
}

impl PathResult {
    /// Result for a query whose start is its goal.
    #[must_use]
    pub const fn trivial() -> Self {
        Self {
            found: true,
            path: Path::empty(),
        }
    }

    /// Result for an unreachable goal.
    #[must_use]
    pub const fn unreachable() -> Self {
        Self {
            found: false,
            path: Path::empty(),
        }
    }
}

/// End-of-phase verdict produced by the turn resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// Neither side has won; play continues.
    #[default]
    Continue,
    /// Every enemy is permanently trapped.
    Success,
    /// An enemy reached its target or its partner.
    Fail,
}

/// Single enemy step decided during a resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyStep {
    /// Identifier of the enemy pawn.
    pub pawn: PawnId,
    /// Cell occupied before the step.
    pub from: Cell,
    /// Cell occupied after the step.
    pub to: Cell,
}

/// Full result of one enemy resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Steps in the order they were applied.
    pub steps: Vec<EnemyStep>,
    /// Verdict for the level.
    pub outcome: TurnOutcome,
    /// Whether any enemy moved.
    pub any_moved: bool,
}

/// Immutable description of one enemy pawn used by systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy pawn.
    pub id: PawnId,
    /// Cell currently occupied.
    pub cell: Cell,
    /// What the pawn is chasing.
    pub goal: EnemyGoal,
}

/// Read-only roster of enemy pawns in deterministic order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemy pawns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
