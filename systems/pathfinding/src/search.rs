//! Wavefront relaxation and path extraction over a [`CellGraph`].

use encircle_core::Path;

use crate::graph::{CellGraph, NEIGHBOR_OFFSETS};

/// Step costs applied while relaxing neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StepCosts {
    pub(crate) cardinal: f32,
    pub(crate) diagonal: f32,
    pub(crate) crowd_penalty: f32,
    pub(crate) crowd_free_radius: u32,
}

/// Controls when the wavefront stops expanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Termination {
    /// Expand until the frontier is exhausted.
    Flood,
    /// Stop after the round in which the goal was first relaxed.
    StopAtGoal,
}

/// Floods distances outward from the start node; returns whether the goal was relaxed.
///
/// Every node in the current frontier is expanded in the same round. A
/// neighbour joins the next frontier when it has not been expanded yet or its
/// distance improved. Entry directions flagged in the neighbour's enter-risk
/// set are skipped.
pub(crate) fn propagate(graph: &mut CellGraph, costs: &StepCosts, termination: Termination) -> bool {
    let goal = graph.goal();
    let goal_cell = graph.cell_at(goal);
    let node_count = graph.len();

    let mut frontier = vec![graph.start()];
    let mut reached = false;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        let mut queued = vec![false; node_count];

        for &current in &frontier {
            graph.nodes[current].checked = true;
            if queued[current] {
                queued[current] = false;
                next.retain(|&index| index != current);
            }
            let base = graph.nodes[current].distance;

            for (direction, (dx, dy)) in NEIGHBOR_OFFSETS.into_iter().enumerate() {
                let Some(neighbor) = graph.neighbor(current, dx, dy) else {
                    continue;
                };
                let crowded = graph.cell_at(neighbor).chebyshev_distance(goal_cell)
                    > costs.crowd_free_radius;
                let node = &mut graph.nodes[neighbor];
                if node.locked || node.enter_risk[direction] {
                    continue;
                }

                let step = if dx == 0 || dy == 0 {
                    costs.cardinal
                } else {
                    costs.diagonal
                };
                let crowd = if crowded {
                    costs.crowd_penalty * f32::from(node.player_pawn_tiers[0])
                } else {
                    0.0
                };
                let distance = base + step + crowd;

                if (!node.checked || distance < node.distance) && !queued[neighbor] {
                    queued[neighbor] = true;
                    next.push(neighbor);
                }
                node.distance = node.distance.min(distance);

                if neighbor == goal {
                    reached = true;
                }
            }
        }

        if reached && termination == Termination::StopAtGoal {
            break;
        }
        frontier = next;
    }

    reached
}

/// Walks back from the goal along strictly decreasing distances.
///
/// The returned path is in travel order and excludes the start node. An empty
/// path is returned when the goal was never relaxed or the walk cannot get
/// back to the start.
pub(crate) fn extract_path(graph: &CellGraph) -> Path {
    let start = graph.start();
    let goal = graph.goal();
    if start == goal || !graph.nodes[goal].distance.is_finite() {
        return Path::empty();
    }

    let mut cells = vec![graph.cell_at(goal)];
    let mut current = goal;
    for _ in 0..graph.len() {
        if current == start {
            break;
        }
        let Some(previous) = nearest_neighbor(graph, current) else {
            return Path::empty();
        };
        current = previous;
        cells.push(graph.cell_at(current));
    }
    if current != start {
        return Path::empty();
    }

    let _ = cells.pop();
    cells.reverse();
    Path::from_cells(cells)
}

/// First unlocked neighbour, in offset order, holding the strictly smallest distance.
fn nearest_neighbor(graph: &CellGraph, index: usize) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let Some(neighbor) = graph.neighbor(index, dx, dy) else {
            continue;
        };
        let node = &graph.nodes[neighbor];
        if node.locked || !node.distance.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, distance)| node.distance < distance) {
            best = Some((neighbor, node.distance));
        }
    }
    best.map(|(neighbor, _)| neighbor)
}
