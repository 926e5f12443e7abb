//! Plain-text views of the board, distance fields and events.

use std::fmt::Write as _;

use encircle_core::{Cell, CellBounds, EnemyGoal, Event, Occupant, PathResult, PawnKind};
use encircle_system_pathfinding::{DistanceField, BOUNDS_MARGIN};
use encircle_world::{query, World};

const EMPTY: char = '.';
const PLAYER_PAWN: char = 'P';
const ENEMY_PAWN: char = 'E';
const ENEMY_TARGET: char = 'T';
const PLAYER_TARGET: char = '+';

/// Draws the board followed by a pawn legend.
pub(crate) fn board(world: &World) -> String {
    let occupancy = query::occupancy_view(world);
    let player_targets = query::player_targets(world);
    let cells = occupancy
        .iter()
        .map(|(cell, _)| cell)
        .chain(player_targets.iter().copied());
    let Some(bounds) = covering_bounds(cells) else {
        return String::from("(empty board)\n");
    };

    let mut out = String::new();
    for y in bounds.min().y()..=bounds.max().y() {
        for x in bounds.min().x()..=bounds.max().x() {
            let cell = Cell::new(x, y);
            let glyph = match occupancy.occupant(cell) {
                Occupant::PlayerPawn(_) => PLAYER_PAWN,
                Occupant::EnemyPawn(_) => ENEMY_PAWN,
                Occupant::Target(_) => ENEMY_TARGET,
                Occupant::Empty if player_targets.contains(&cell) => PLAYER_TARGET,
                Occupant::Empty => EMPTY,
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    for pawn in query::pawn_view(world) {
        let _ = match (pawn.kind, pawn.goal) {
            (PawnKind::Player, _) => writeln!(out, "  #{} player at {}", pawn.id.get(), pawn.cell),
            (PawnKind::Enemy, Some(EnemyGoal::Target(target))) => writeln!(
                out,
                "  #{} enemy at {} chasing target #{}",
                pawn.id.get(),
                pawn.cell,
                target.get()
            ),
            (PawnKind::Enemy, Some(EnemyGoal::Pawn(partner))) => writeln!(
                out,
                "  #{} enemy at {} chasing pawn #{}",
                pawn.id.get(),
                pawn.cell,
                partner.get()
            ),
            (PawnKind::Enemy, None) => writeln!(out, "  #{} enemy at {}", pawn.id.get(), pawn.cell),
        };
    }
    let _ = writeln!(out, "moves left: {}", query::moves_left(world));
    out
}

/// Draws per-cell distances of a flooded search.
///
/// Locked cells print as `#`, unreached cells as `.`, and cells with at least
/// one risky entry direction carry a trailing `!`.
pub(crate) fn distance_field(field: &DistanceField, start: Cell, goal: Cell) -> String {
    let bounds = field.bounds();
    let mut out = String::new();

    for y in bounds.min().y()..=bounds.max().y() {
        for x in bounds.min().x()..=bounds.max().x() {
            let cell = Cell::new(x, y);
            let Some(entry) = field.get(cell) else {
                continue;
            };
            let value = if cell == start {
                String::from("S")
            } else if cell == goal {
                String::from("G")
            } else if entry.locked {
                String::from("#")
            } else {
                entry
                    .distance
                    .map_or_else(|| String::from("."), |distance| format!("{distance:.1}"))
            };
            let risk = if entry.enter_risk.iter().any(|risky| *risky) {
                '!'
            } else {
                ' '
            };
            let _ = write!(out, "{value:>6}{risk}");
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "goal {}",
        if field.reached() { "reached" } else { "not reached" }
    );
    out
}

/// Describes the outcome of a path query.
pub(crate) fn path(result: &PathResult) -> String {
    if !result.found {
        return String::from("no path\n");
    }
    let steps: Vec<String> = result.path.cells().iter().map(Cell::to_string).collect();
    if steps.is_empty() {
        return String::from("already at the goal\n");
    }
    format!("{} steps: {}\n", steps.len(), steps.join(" -> "))
}

/// One-line description of an event, if it is worth showing.
pub(crate) fn event(event: &Event) -> Option<String> {
    let line = match event {
        Event::LevelLoaded {
            player_moves_in_turn,
        } => format!("level loaded, {player_moves_in_turn} moves per turn"),
        Event::LevelRejected { reason } => format!("level rejected: {reason}"),
        Event::PlayerPawnMoved { pawn, from, to } => {
            format!("pawn #{} moved {from} -> {to}", pawn.get())
        }
        Event::PlayerMoveRejected { pawn, to, reason } => {
            format!("pawn #{} cannot move to {to}: {reason}", pawn.get())
        }
        Event::EnemyPhaseRequested => String::from("enemies are moving"),
        Event::EnemyPawnMoved { pawn, from, to, .. } => {
            format!("enemy #{} moved {from} -> {to}", pawn.get())
        }
        Event::EnemyPhaseCompleted { any_moved: false } => String::from("no enemy could move"),
        Event::LevelSucceeded { .. } => String::from("every enemy is surrounded, you win"),
        Event::LevelFailed { .. } => String::from("an enemy reached its target, you lose"),
        Event::PawnRelocated { pawn, from, to } => {
            format!("pawn #{} returned {from} -> {to}", pawn.get())
        }
        Event::SnapshotRestored { depth } => format!("undo ({depth} snapshots left)"),
        Event::MovesLeftChanged { .. } | Event::EnemyPhaseCompleted { .. } => return None,
    };
    Some(line)
}

fn covering_bounds(cells: impl Iterator<Item = Cell>) -> Option<CellBounds> {
    cells
        .fold(None, |acc: Option<(Cell, Cell)>, cell| match acc {
            Some((min, max)) => Some((min.min(cell), max.max(cell))),
            None => Some((cell, cell)),
        })
        .map(|(min, max)| CellBounds::from_corners(min, max).expanded(BOUNDS_MARGIN))
}
