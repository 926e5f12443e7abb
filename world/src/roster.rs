//! Pawn and target registry owned by the world.

use std::collections::BTreeMap;

use encircle_core::{
    Cell, EnemyGoal, EnemySnapshot, EnemyView, LevelData, Occupant, OccupancyView, PawnId,
    PawnKind, TargetId,
};

/// Pawn stored inside the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PawnState {
    /// Side the pawn plays for.
    pub(crate) kind: PawnKind,
    /// Cell currently occupied.
    pub(crate) cell: Cell,
    /// Goal chased by an enemy pawn; `None` for player pawns.
    pub(crate) goal: Option<EnemyGoal>,
}

/// Registry of every pawn and target placed by the current level.
#[derive(Clone, Debug, Default)]
pub(crate) struct Roster {
    pawns: BTreeMap<PawnId, PawnState>,
    targets: BTreeMap<TargetId, Cell>,
    player_targets: Vec<Cell>,
}

impl Roster {
    /// Instantiates the roster described by already validated level data.
    ///
    /// Player pawns receive the lowest identifiers in level order, followed by
    /// enemy pawns. Enemy targets are numbered in level order.
    pub(crate) fn from_level(level: &LevelData) -> Self {
        let mut roster = Self {
            player_targets: level.player_targets.clone(),
            ..Self::default()
        };

        for (index, cell) in level.enemy_targets.iter().enumerate() {
            let _ = roster.targets.insert(TargetId::new(index as u32), *cell);
        }

        let mut next_id = 0u32;
        for cell in &level.player_pawns {
            let _ = roster.pawns.insert(
                PawnId::new(next_id),
                PawnState {
                    kind: PawnKind::Player,
                    cell: *cell,
                    goal: None,
                },
            );
            next_id += 1;
        }

        let enemy_base = next_id;
        for enemy in &level.enemy_pawns {
            let goal = roster.target_at(enemy.target_cell).map(EnemyGoal::Target).or_else(|| {
                level
                    .enemy_pawns
                    .iter()
                    .position(|other| other.cell == enemy.target_cell)
                    .map(|index| EnemyGoal::Pawn(PawnId::new(enemy_base + index as u32)))
            });
            let _ = roster.pawns.insert(
                PawnId::new(next_id),
                PawnState {
                    kind: PawnKind::Enemy,
                    cell: enemy.cell,
                    goal,
                },
            );
            next_id += 1;
        }

        roster
    }

    pub(crate) fn pawn(&self, id: PawnId) -> Option<&PawnState> {
        self.pawns.get(&id)
    }

    pub(crate) fn pawns(&self) -> impl Iterator<Item = (PawnId, &PawnState)> {
        self.pawns.iter().map(|(id, pawn)| (*id, pawn))
    }

    pub(crate) fn targets(&self) -> impl Iterator<Item = (TargetId, Cell)> + '_ {
        self.targets.iter().map(|(id, cell)| (*id, *cell))
    }

    pub(crate) fn player_targets(&self) -> &[Cell] {
        &self.player_targets
    }

    fn target_at(&self, cell: Cell) -> Option<TargetId> {
        self.targets()
            .find(|(_, target)| *target == cell)
            .map(|(id, _)| id)
    }

    /// Reports whether no pawn or enemy target occupies the cell.
    pub(crate) fn is_free(&self, cell: Cell) -> bool {
        self.pawns.values().all(|pawn| pawn.cell != cell)
            && self.targets.values().all(|target| *target != cell)
    }

    /// Moves the pawn and returns the cell it left.
    pub(crate) fn relocate(&mut self, id: PawnId, to: Cell) -> Option<Cell> {
        let pawn = self.pawns.get_mut(&id)?;
        Some(std::mem::replace(&mut pawn.cell, to))
    }

    /// Cells of every pawn keyed by identifier.
    pub(crate) fn positions(&self) -> BTreeMap<PawnId, Cell> {
        self.pawns.iter().map(|(id, pawn)| (*id, pawn.cell)).collect()
    }

    /// Tagged occupancy of pawns and enemy targets; player targets never block.
    pub(crate) fn occupancy(&self) -> OccupancyView {
        let targets = self
            .targets()
            .map(|(id, cell)| (cell, Occupant::Target(id)));
        let pawns = self.pawns().map(|(id, pawn)| {
            let occupant = match pawn.kind {
                PawnKind::Player => Occupant::PlayerPawn(id),
                PawnKind::Enemy => Occupant::EnemyPawn(id),
            };
            (pawn.cell, occupant)
        });
        OccupancyView::from_occupants(targets.chain(pawns))
    }

    pub(crate) fn enemy_view(&self) -> EnemyView {
        let snapshots = self
            .pawns()
            .filter_map(|(id, pawn)| {
                pawn.goal.map(|goal| EnemySnapshot {
                    id,
                    cell: pawn.cell,
                    goal,
                })
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }
}
