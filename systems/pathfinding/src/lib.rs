#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wavefront pathfinding over the unbounded cell grid.
//!
//! Every query builds a dense node graph covering the board content plus a
//! one-cell margin, floods distances outward from the start cell, and walks
//! back from the goal along strictly decreasing distances. Queries are
//! deterministic: neighbours are always visited in the same fixed order and
//! ties resolve to the first candidate in that order.

mod bounds;
mod graph;
mod search;

use encircle_core::{
    Cell, CellBounds, ObstacleSet, OccupancyView, PathResult, PawnTransition,
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bounds::{content_bounds, BOUNDS_MARGIN};

use graph::{CellGraph, GraphRequest, DENSITY_TIERS};
use search::{extract_path, propagate, StepCosts, Termination};

/// Tuning knobs for path costs and risk detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Cost of a horizontal or vertical step.
    pub cardinal_cost: f32,
    /// Cost of a diagonal step.
    pub diagonal_cost: f32,
    /// Extra cost per player pawn adjacent to the entered cell.
    pub crowd_penalty: f32,
    /// Cells within this Chebyshev distance of the goal ignore the crowd penalty.
    pub crowd_free_radius: u32,
    /// Adjacent player pawns required before a cell is checked for pincers.
    pub risk_threshold: u8,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            cardinal_cost: 1.0,
            diagonal_cost: std::f32::consts::SQRT_2,
            crowd_penalty: 4.0,
            crowd_free_radius: 2,
            risk_threshold: 3,
        }
    }
}

/// Reasons a [`PathfinderConfig`] cannot drive a search.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A cost is NaN or infinite.
    #[error("{name} must be a finite number, got {value}")]
    NonFinite {
        /// Field name as written in configuration files.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// A step cost is zero or negative.
    #[error("{name} must be greater than zero, got {value}")]
    NonPositiveStep {
        /// Field name as written in configuration files.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The crowd penalty is negative.
    #[error("crowd_penalty must not be negative, got {0}")]
    NegativeCrowdPenalty(f32),
}

impl PathfinderConfig {
    /// Checks that every cost keeps the wavefront from relaxing forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let costs = [
            ("cardinal_cost", self.cardinal_cost),
            ("diagonal_cost", self.diagonal_cost),
            ("crowd_penalty", self.crowd_penalty),
        ];
        if let Some((name, value)) = costs.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFinite { name, value });
        }
        if let Some((name, value)) = costs[..2].iter().copied().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::NonPositiveStep { name, value });
        }
        if self.crowd_penalty < 0.0 {
            return Err(ConfigError::NegativeCrowdPenalty(self.crowd_penalty));
        }
        Ok(())
    }

    fn step_costs(&self) -> StepCosts {
        StepCosts {
            cardinal: self.cardinal_cost,
            diagonal: self.diagonal_cost,
            crowd_penalty: self.crowd_penalty,
            crowd_free_radius: self.crowd_free_radius,
        }
    }
}

/// Stateless path query service.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    config: PathfinderConfig,
}

impl Pathfinder {
    /// Creates a pathfinder using the provided tuning.
    #[must_use]
    pub fn new(config: PathfinderConfig) -> Self {
        Self { config }
    }

    /// Tuning in effect for every query.
    #[must_use]
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Finds a route from `start` to `goal`.
    ///
    /// Cells whose occupant belongs to `obstacles` are impassable except for
    /// the two endpoints. `transitions` describe pawns that are mid-move: their
    /// source counts as free and their destination as blocked. The first
    /// attempt avoids risky entries; when that fails the search is repeated
    /// with risk avoidance disabled.
    #[must_use]
    pub fn find_path(
        &self,
        start: Cell,
        goal: Cell,
        occupancy: &OccupancyView,
        obstacles: ObstacleSet,
        transitions: &[PawnTransition],
    ) -> PathResult {
        if start == goal {
            return PathResult::trivial();
        }

        let bounds = content_bounds(start, Some(goal), occupancy, obstacles);
        for enter_risk in [true, false] {
            let request = GraphRequest {
                bounds,
                start,
                goal,
                occupancy,
                obstacles,
                transitions,
                enter_risk,
                risk_threshold: self.config.risk_threshold,
            };
            let result = self.run(&request, Termination::Flood);
            if result.found {
                return result;
            }
            if enter_risk {
                debug!("no safe route from {start} to {goal}; retrying without risk avoidance");
            }
        }

        PathResult::unreachable()
    }

    /// Tests whether `start` can escape to the minimum corner of the content bounds.
    ///
    /// The corner lies on the padding ring, so it is only reachable when the
    /// pawn is not enclosed by `obstacles`.
    #[must_use]
    pub fn find_path_to_bounds_min(
        &self,
        start: Cell,
        occupancy: &OccupancyView,
        obstacles: ObstacleSet,
    ) -> PathResult {
        let bounds = content_bounds(start, None, occupancy, obstacles);
        let request = GraphRequest {
            bounds,
            start,
            goal: bounds.min(),
            occupancy,
            obstacles,
            transitions: &[],
            enter_risk: false,
            risk_threshold: self.config.risk_threshold,
        };
        self.run(&request, Termination::StopAtGoal)
    }

    /// Floods the full graph for `start` and `goal` and exposes every node.
    #[must_use]
    pub fn distance_field(
        &self,
        start: Cell,
        goal: Cell,
        occupancy: &OccupancyView,
        obstacles: ObstacleSet,
        enter_risk: bool,
    ) -> Option<DistanceField> {
        let request = GraphRequest {
            bounds: content_bounds(start, Some(goal), occupancy, obstacles),
            start,
            goal,
            occupancy,
            obstacles,
            transitions: &[],
            enter_risk,
            risk_threshold: self.config.risk_threshold,
        };
        let mut graph = CellGraph::build(&request)?;
        let reached = start == goal || propagate(&mut graph, &self.config.step_costs(), Termination::Flood);

        let cells = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| FieldCell {
                cell: graph.cell_at(index),
                locked: node.locked,
                distance: node.distance.is_finite().then_some(node.distance),
                enter_risk: node.enter_risk,
                player_pawn_tiers: node.player_pawn_tiers,
            })
            .collect();

        Some(DistanceField {
            bounds: graph.bounds(),
            reached,
            cells,
        })
    }

    fn run(&self, request: &GraphRequest<'_>, termination: Termination) -> PathResult {
        if request.start == request.goal {
            return PathResult::trivial();
        }
        let Some(mut graph) = CellGraph::build(request) else {
            return PathResult::unreachable();
        };
        let found = propagate(&mut graph, &self.config.step_costs(), termination);
        if !found {
            return PathResult::unreachable();
        }
        PathResult {
            found,
            path: extract_path(&graph),
        }
    }
}

/// Per-cell state captured by [`Pathfinder::distance_field`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldCell {
    /// Board cell described by this entry.
    pub cell: Cell,
    /// Whether the cell was impassable for the query.
    pub locked: bool,
    /// Relaxed distance from the start, if the wavefront reached the cell.
    pub distance: Option<f32>,
    /// Entry directions flagged as risky, indexed like the neighbour offsets.
    pub enter_risk: [bool; 8],
    /// Player pawns on the 1-, 2- and 3-cell rings around the cell.
    pub player_pawn_tiers: [u8; DENSITY_TIERS],
}

/// Flooded search graph exposed for inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceField {
    bounds: CellBounds,
    reached: bool,
    cells: Vec<FieldCell>,
}

impl DistanceField {
    /// Region covered by the field.
    #[must_use]
    pub fn bounds(&self) -> CellBounds {
        self.bounds
    }

    /// Whether the goal was relaxed.
    #[must_use]
    pub fn reached(&self) -> bool {
        self.reached
    }

    /// Entry for the provided cell, if it lies inside the bounds.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&FieldCell> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let min = self.bounds.min();
        let x = usize::try_from(i64::from(cell.x()) - i64::from(min.x())).ok()?;
        let y = usize::try_from(i64::from(cell.y()) - i64::from(min.y())).ok()?;
        let width = usize::try_from(self.bounds.width()).ok()?;
        self.cells.get(x + y * width)
    }

    /// Entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldCell> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_constants() {
        let config = PathfinderConfig::default();
        assert_eq!(config.cardinal_cost, 1.0);
        assert_eq!(config.diagonal_cost, std::f32::consts::SQRT_2);
        assert_eq!(config.risk_threshold, 3);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PathfinderConfig =
            toml::from_str("crowd_penalty = 8.0\nrisk_threshold = 4\n").expect("parse");
        assert_eq!(config.crowd_penalty, 8.0);
        assert_eq!(config.risk_threshold, 4);
        assert_eq!(config.crowd_free_radius, 2);
    }

    #[test]
    fn costs_that_never_settle_are_rejected() {
        let with = |change: fn(&mut PathfinderConfig)| {
            let mut config = PathfinderConfig::default();
            change(&mut config);
            config.validate()
        };

        assert_eq!(PathfinderConfig::default().validate(), Ok(()));
        assert_eq!(with(|config| config.crowd_penalty = 0.0), Ok(()));
        assert_eq!(
            with(|config| config.cardinal_cost = -1.0),
            Err(ConfigError::NonPositiveStep {
                name: "cardinal_cost",
                value: -1.0
            })
        );
        assert_eq!(
            with(|config| config.diagonal_cost = 0.0),
            Err(ConfigError::NonPositiveStep {
                name: "diagonal_cost",
                value: 0.0
            })
        );
        assert!(matches!(
            with(|config| config.diagonal_cost = f32::NAN),
            Err(ConfigError::NonFinite {
                name: "diagonal_cost",
                ..
            })
        ));
        assert!(matches!(
            with(|config| config.crowd_penalty = f32::INFINITY),
            Err(ConfigError::NonFinite {
                name: "crowd_penalty",
                ..
            })
        ));
        assert_eq!(
            with(|config| config.crowd_penalty = -0.5),
            Err(ConfigError::NegativeCrowdPenalty(-0.5))
        );
    }

    #[test]
    fn distance_field_covers_bounds() {
        let field = Pathfinder::default()
            .distance_field(
                Cell::new(0, 0),
                Cell::new(2, 0),
                &OccupancyView::default(),
                ObstacleSet::ALL,
                false,
            )
            .expect("field");

        assert!(field.reached());
        assert_eq!(field.iter().count(), 5 * 3);
        assert_eq!(field.get(Cell::new(0, 0)).and_then(|cell| cell.distance), Some(0.0));
        assert_eq!(field.get(Cell::new(2, 0)).and_then(|cell| cell.distance), Some(2.0));
        assert!(field.get(Cell::new(9, 9)).is_none());
    }
}
