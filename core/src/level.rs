//! Serializable level description and its validation rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Cell;

/// Largest absolute coordinate a level may place content on.
pub const LEVEL_COORDINATE_LIMIT: i32 = 1 << 20;

/// Widest and tallest extent, in cells, a level's content may span.
pub const MAX_LEVEL_SPAN: u32 = 512;

/// Enemy pawn placement paired with the cell it chases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyPawnData {
    /// Starting cell of the enemy pawn.
    pub cell: Cell,
    /// Cell holding the enemy's target: an enemy target or another enemy pawn.
    pub target_cell: Cell,
}

/// Initial board layout for one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    /// Starting cells of the player pawns.
    #[serde(default)]
    pub player_pawns: Vec<Cell>,
    /// Cosmetic markers the player aims for; they never block movement.
    #[serde(default)]
    pub player_targets: Vec<Cell>,
    /// Stationary targets the enemies try to reach.
    #[serde(default)]
    pub enemy_targets: Vec<Cell>,
    /// Enemy pawns with the cell of their target.
    #[serde(default)]
    pub enemy_pawns: Vec<EnemyPawnData>,
    /// Player moves granted before each enemy phase.
    pub player_moves_in_turn: u32,
}

/// Content errors detected while validating a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The level grants no player moves per turn.
    #[error("player_moves_in_turn must be at least 1")]
    NoPlayerMoves,
    /// A cell lies beyond [`LEVEL_COORDINATE_LIMIT`] on some axis.
    #[error("cell {0} lies outside the playable coordinate range")]
    CoordinateOutOfRange(Cell),
    /// The content spans more than [`MAX_LEVEL_SPAN`] cells on some axis.
    #[error("level spans {width}x{height} cells; at most {} per axis are allowed", MAX_LEVEL_SPAN)]
    TooLarge {
        /// Columns between the leftmost and rightmost content, inclusive.
        width: u32,
        /// Rows between the topmost and bottommost content, inclusive.
        height: u32,
    },
    /// Two pawns or targets claim the same cell.
    #[error("cell {0} is claimed by more than one pawn or target")]
    OverlappingCells(Cell),
    /// An enemy names a target cell that holds no target and no enemy pawn.
    #[error("enemy pawn #{enemy} targets {cell}, which holds no enemy target or enemy pawn")]
    MissingTarget {
        /// Index of the enemy pawn within the level data.
        enemy: usize,
        /// Target cell named by the enemy.
        cell: Cell,
    },
    /// An enemy chases another enemy that does not chase it back.
    #[error("enemy pawn #{enemy} chases a pawn that does not chase it back")]
    UnpairedPawnTarget {
        /// Index of the enemy pawn within the level data.
        enemy: usize,
    },
}

impl LevelData {
    /// Checks that every enemy has a valid target and no cell is claimed twice.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.player_moves_in_turn == 0 {
            return Err(LevelError::NoPlayerMoves);
        }
        self.check_extent()?;

        let mut claimed = BTreeSet::new();
        let occupied = self
            .player_pawns
            .iter()
            .chain(self.enemy_targets.iter())
            .chain(self.enemy_pawns.iter().map(|enemy| &enemy.cell));
        for cell in occupied {
            if !claimed.insert(*cell) {
                return Err(LevelError::OverlappingCells(*cell));
            }
        }

        for (index, enemy) in self.enemy_pawns.iter().enumerate() {
            if self.enemy_targets.contains(&enemy.target_cell) {
                continue;
            }

            let Some(partner) = self
                .enemy_pawns
                .iter()
                .position(|other| other.cell == enemy.target_cell)
            else {
                return Err(LevelError::MissingTarget {
                    enemy: index,
                    cell: enemy.target_cell,
                });
            };

            if partner == index || self.enemy_pawns[partner].target_cell != enemy.cell {
                return Err(LevelError::UnpairedPawnTarget { enemy: index });
            }
        }

        Ok(())
    }

    fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.player_pawns
            .iter()
            .chain(self.player_targets.iter())
            .chain(self.enemy_targets.iter())
            .copied()
            .chain(
                self.enemy_pawns
                    .iter()
                    .flat_map(|enemy| [enemy.cell, enemy.target_cell]),
            )
    }

    fn check_extent(&self) -> Result<(), LevelError> {
        let mut corners: Option<(Cell, Cell)> = None;
        for cell in self.cells() {
            let limit = LEVEL_COORDINATE_LIMIT.unsigned_abs();
            if cell.x().unsigned_abs() > limit || cell.y().unsigned_abs() > limit {
                return Err(LevelError::CoordinateOutOfRange(cell));
            }
            corners = Some(match corners {
                Some((min, max)) => (min.min(cell), max.max(cell)),
                None => (cell, cell),
            });
        }

        let Some((min, max)) = corners else {
            return Ok(());
        };
        let width = max.x().abs_diff(min.x()) + 1;
        let height = max.y().abs_diff(min.y()) + 1;
        if width > MAX_LEVEL_SPAN || height > MAX_LEVEL_SPAN {
            return Err(LevelError::TooLarge { width, height });
        }
        Ok(())
    }
}
