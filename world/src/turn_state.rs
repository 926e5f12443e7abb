//! Turn bookkeeping and the undo snapshot stack.

use std::collections::BTreeMap;

use encircle_core::{Cell, PawnId, TurnOutcome};

/// Stage of the turn cycle the board is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// No level has been loaded yet.
    #[default]
    AwaitingLevel,
    /// The player may move pawns.
    AwaitingPlayer,
    /// Input is locked until the enemy turn is applied.
    ResolvingEnemies,
    /// The level ended; only undo or reset are accepted.
    Finished(TurnOutcome),
}

/// Moves-left counter and phase of the current turn.
#[derive(Clone, Debug, Default)]
pub(crate) struct TurnState {
    pub(crate) phase: TurnPhase,
    pub(crate) moves_left: u32,
    pub(crate) moves_per_turn: u32,
    pub(crate) player_moved: bool,
}

impl TurnState {
    pub(crate) fn begin(moves_per_turn: u32) -> Self {
        Self {
            phase: TurnPhase::AwaitingPlayer,
            moves_left: moves_per_turn,
            moves_per_turn,
            player_moved: false,
        }
    }

    /// Counts one completed player move; returns whether the enemies are due.
    pub(crate) fn record_player_move(&mut self) -> bool {
        self.player_moved = true;
        self.moves_left = self.moves_left.saturating_sub(1);
        self.moves_left == 0
    }

    /// Hands the next turn back to the player.
    ///
    /// A phase in which no enemy moved grants a single move so the player is
    /// never left waiting on a no-op enemy phase.
    pub(crate) fn next_turn(&mut self, any_enemy_moved: bool) {
        self.moves_left = if any_enemy_moved {
            self.moves_per_turn
        } else {
            1
        };
        self.player_moved = false;
        self.phase = TurnPhase::AwaitingPlayer;
    }

    /// Reports whether the board differs from the top snapshot.
    pub(crate) fn diverged_from_snapshot(&self) -> bool {
        self.player_moved || matches!(self.phase, TurnPhase::Finished(_))
    }
}

/// Full board state captured at the start of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) positions: BTreeMap<PawnId, Cell>,
    pub(crate) moves_left: u32,
}

/// Undo history; never drops below the initial snapshot.
#[derive(Clone, Debug, Default)]
pub(crate) struct SnapshotStack {
    entries: Vec<Snapshot>,
}

impl SnapshotStack {
    pub(crate) fn with_initial(snapshot: Snapshot) -> Self {
        Self {
            entries: vec![snapshot],
        }
    }

    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot);
    }

    pub(crate) fn top(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// Discards the top snapshot unless it is the only one left.
    pub(crate) fn pop_keeping_root(&mut self) {
        if self.entries.len() > 1 {
            let _ = self.entries.pop();
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }
}
