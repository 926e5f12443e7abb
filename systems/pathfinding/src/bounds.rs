//! Search region calculation.

use encircle_core::{Cell, CellBounds, ObstacleSet, OccupancyView};

/// Cells of padding added around the extreme occupied coordinates.
pub const BOUNDS_MARGIN: u32 = 1;

/// Computes the search region for a query.
///
/// The region is the smallest rectangle covering `start`, `goal` (when
/// provided) and every cell whose occupant belongs to `obstacles`, grown by
/// [`BOUNDS_MARGIN`] on every side so the wavefront can always step around
/// the outermost content.
#[must_use]
pub fn content_bounds(
    start: Cell,
    goal: Option<Cell>,
    occupancy: &OccupancyView,
    obstacles: ObstacleSet,
) -> CellBounds {
    let (min, max) = occupancy
        .cells_in(obstacles)
        .chain(goal)
        .fold((start, start), |(min, max), cell| {
            (min.min(cell), max.max(cell))
        });

    CellBounds::from_corners(min, max).expanded(BOUNDS_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encircle_core::{Occupant, PawnId, TargetId};

    #[test]
    fn empty_board_pads_the_seeds() {
        let bounds = content_bounds(
            Cell::new(2, 3),
            None,
            &OccupancyView::default(),
            ObstacleSet::ALL,
        );

        assert_eq!(bounds.min(), Cell::new(1, 2));
        assert_eq!(bounds.max(), Cell::new(3, 4));
    }

    #[test]
    fn both_seeds_are_covered() {
        let bounds = content_bounds(
            Cell::new(4, 0),
            Some(Cell::new(-2, 5)),
            &OccupancyView::default(),
            ObstacleSet::ALL,
        );

        assert_eq!(bounds.min(), Cell::new(-3, -1));
        assert_eq!(bounds.max(), Cell::new(5, 6));
    }

    #[test]
    fn only_selected_layers_extend_the_region() {
        let occupancy = OccupancyView::from_occupants([
            (Cell::new(10, 0), Occupant::EnemyPawn(PawnId::new(0))),
            (Cell::new(0, -6), Occupant::PlayerPawn(PawnId::new(1))),
            (Cell::new(-4, 0), Occupant::Target(TargetId::new(0))),
        ]);

        let bounds = content_bounds(Cell::new(0, 0), None, &occupancy, ObstacleSet::PLAYERS);

        assert_eq!(bounds.min(), Cell::new(-1, -7));
        assert_eq!(bounds.max(), Cell::new(1, 1));
    }
}
