#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves the enemy phase of a turn.
//!
//! The roster is split once per level into singles, which chase a stationary
//! target, and mutual pairs, which chase each other. A resolution pass plans
//! every single against the board as left by the earlier singles, applies
//! all single steps together, checks each single for a reached target or a
//! sealed enclosure, and then advances each pair one cell from both ends.

mod roster;

use std::collections::VecDeque;

use encircle_core::{
    Cell, Command, EnemyStep, EnemyView, Event, ObstacleSet, OccupancyView, PathResult, PawnId,
    PawnTransition, TargetId, TurnOutcome, TurnReport,
};
use encircle_system_pathfinding::Pathfinder;
use log::{debug, info, warn};

use roster::Roster;

/// Resolves enemy phases in response to world events.
#[derive(Debug, Default)]
pub struct TurnResolver {
    pathfinder: Pathfinder,
    roster: Roster,
}

impl TurnResolver {
    /// Creates a resolver that plans with the provided pathfinder.
    #[must_use]
    pub fn new(pathfinder: Pathfinder) -> Self {
        Self {
            pathfinder,
            roster: Roster::default(),
        }
    }

    /// Consumes world events and emits the enemy turn when one is requested.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        occupancy: &OccupancyView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { .. } => self.classify(enemies),
                Event::EnemyPhaseRequested => {
                    let report = self.resolve(enemies, occupancy);
                    out.push(Command::ApplyEnemyTurn { report });
                }
                _ => {}
            }
        }
    }

    /// Partitions the enemy roster into singles and mutual pairs.
    pub fn classify(&mut self, enemies: &EnemyView) {
        self.roster = Roster::classify(enemies);
        debug!(
            "enemy roster: {} singles, {} pairs",
            self.roster.singles.len(),
            self.roster.pairs.len()
        );
    }

    /// Runs one enemy resolution pass against a copy of the board.
    #[must_use]
    pub fn resolve(&self, enemies: &EnemyView, occupancy: &OccupancyView) -> TurnReport {
        let mut pass = Pass {
            pathfinder: &self.pathfinder,
            board: occupancy.clone(),
            steps: Vec::new(),
            surrounded: 0,
        };

        let reached = pass.advance_singles(&self.roster.singles)
            || pass.advance_pairs(&self.roster.pairs);

        let outcome = if reached {
            TurnOutcome::Fail
        } else if pass.surrounded == enemies.len() {
            TurnOutcome::Success
        } else {
            TurnOutcome::Continue
        };
        info!(
            "enemy phase resolved: {outcome:?} ({} steps, {} of {} surrounded)",
            pass.steps.len(),
            pass.surrounded,
            enemies.len()
        );

        TurnReport {
            any_moved: !pass.steps.is_empty(),
            steps: pass.steps,
            outcome,
        }
    }
}

/// Scratch state for a single resolution pass.
struct Pass<'a> {
    pathfinder: &'a Pathfinder,
    board: OccupancyView,
    steps: Vec<EnemyStep>,
    surrounded: usize,
}

/// Search result recorded for a single while its step is pending.
struct SinglePlan {
    pawn: PawnId,
    target: TargetId,
    result: PathResult,
}

impl Pass<'_> {
    /// Plans and applies single steps; returns whether a single reached its target.
    fn advance_singles(&mut self, singles: &[(PawnId, TargetId)]) -> bool {
        let mut plans = Vec::with_capacity(singles.len());
        let mut transitions = Vec::new();
        let mut planned = Vec::new();

        for &(pawn, target) in singles {
            let (Some(from), Some(goal)) = (
                self.board.cell_of_pawn(pawn),
                self.board.cell_of_target(target),
            ) else {
                warn!("enemy pawn {} or its target is missing from the board", pawn.get());
                continue;
            };

            let result =
                self.pathfinder
                    .find_path(from, goal, &self.board, ObstacleSet::ALL, &transitions);
            if result.found && result.path.len() > 1 {
                if let Some(to) = result.path.next_step() {
                    transitions.push(PawnTransition { from, to });
                    planned.push(EnemyStep { pawn, from, to });
                }
            }
            plans.push(SinglePlan {
                pawn,
                target,
                result,
            });
        }

        for step in planned {
            self.apply(step);
        }

        for plan in &plans {
            if plan.result.found {
                if plan.result.path.len() <= 2 {
                    debug!("enemy pawn {} reached its target", plan.pawn.get());
                    return true;
                }
            } else if self.single_surrounded(plan.pawn, plan.target) {
                self.surrounded += 1;
            }
        }

        false
    }

    /// Advances each pair from both ends; returns whether a pair met.
    fn advance_pairs(&mut self, pairs: &[(PawnId, PawnId)]) -> bool {
        for &(first, second) in pairs {
            let (Some(first_cell), Some(second_cell)) =
                (self.board.cell_of_pawn(first), self.board.cell_of_pawn(second))
            else {
                warn!("enemy pair {}/{} is missing from the board", first.get(), second.get());
                continue;
            };

            let result = self.pathfinder.find_path(
                first_cell,
                second_cell,
                &self.board,
                ObstacleSet::ALL,
                &[],
            );
            if !result.found {
                for (pawn, cell) in [(first, first_cell), (second, second_cell)] {
                    if !self.escapes(cell, ObstacleSet::PLAYERS_AND_TARGETS) {
                        debug!("enemy pawn {} is surrounded", pawn.get());
                        self.surrounded += 1;
                    }
                }
                continue;
            }

            let mut gap: VecDeque<Cell> = result.path.into_cells().into();
            let _ = gap.pop_back();
            let Some(first_to) = gap.pop_front() else {
                debug!("enemy pair {}/{} met", first.get(), second.get());
                return true;
            };
            let second_to = gap.pop_back().unwrap_or(first_to);

            self.apply(EnemyStep {
                pawn: first,
                from: first_cell,
                to: first_to,
            });
            self.apply(EnemyStep {
                pawn: second,
                from: second_cell,
                to: second_to,
            });

            if gap.is_empty() {
                debug!("enemy pair {}/{} met", first.get(), second.get());
                return true;
            }
        }

        false
    }

    /// A single is surrounded when its target is sealed and it cannot escape itself.
    ///
    /// A single whose target is open yet has no route to it is counted as
    /// surrounded too.
    fn single_surrounded(&self, pawn: PawnId, target: TargetId) -> bool {
        let target_sealed = self
            .board
            .cell_of_target(target)
            .map_or(true, |cell| !self.escapes(cell, ObstacleSet::PLAYERS_AND_TARGETS));
        if !target_sealed {
            return true;
        }
        self.board
            .cell_of_pawn(pawn)
            .map_or(true, |cell| !self.escapes(cell, ObstacleSet::PLAYERS))
    }

    fn escapes(&self, cell: Cell, obstacles: ObstacleSet) -> bool {
        self.pathfinder
            .find_path_to_bounds_min(cell, &self.board, obstacles)
            .found
    }

    fn apply(&mut self, step: EnemyStep) {
        debug!("enemy pawn {} steps {} -> {}", step.pawn.get(), step.from, step.to);
        self.board.relocate(step.from, step.to);
        self.steps.push(step);
    }
}
