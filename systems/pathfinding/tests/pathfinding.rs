use encircle_core::{Cell, ObstacleSet, Occupant, OccupancyView, PawnId, PawnTransition, TargetId};
use encircle_system_pathfinding::{content_bounds, Pathfinder};

fn players(cells: &[(i32, i32)]) -> Vec<(Cell, Occupant)> {
    cells
        .iter()
        .enumerate()
        .map(|(index, (x, y))| {
            (
                Cell::new(*x, *y),
                Occupant::PlayerPawn(PawnId::new(100 + index as u32)),
            )
        })
        .collect()
}

fn ring_around(center: Cell) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                cells.push((center.x() + dx, center.y() + dy));
            }
        }
    }
    cells
}

/// Wall along column 1 from row -3 to row 3 with a gap at row 0.
fn gapped_wall() -> Vec<(i32, i32)> {
    (-3..=3).filter(|y| *y != 0).map(|y| (1, y)).collect()
}

fn assert_walkable(path: &[Cell], start: Cell, occupancy: &OccupancyView) {
    let mut previous = start;
    for cell in path {
        assert!(previous.is_adjacent(*cell), "{previous} -> {cell} is not a single step");
        assert!(occupancy.is_free(*cell), "{cell} is occupied");
        previous = *cell;
    }
}

#[test]
fn start_equal_to_goal_is_trivially_found() {
    let result = Pathfinder::default().find_path(
        Cell::new(3, 3),
        Cell::new(3, 3),
        &OccupancyView::default(),
        ObstacleSet::ALL,
        &[],
    );

    assert!(result.found);
    assert!(result.path.is_empty());
}

#[test]
fn open_board_walks_the_diagonal() {
    let result = Pathfinder::default().find_path(
        Cell::new(0, 0),
        Cell::new(4, 4),
        &OccupancyView::default(),
        ObstacleSet::ALL,
        &[],
    );

    assert!(result.found);
    assert_eq!(result.path.len(), 4);
    assert_eq!(result.path.next_step(), Some(Cell::new(1, 1)));
    assert_eq!(result.path.goal(), Some(Cell::new(4, 4)));
}

#[test]
fn single_blocker_is_stepped_around() {
    let occupancy = OccupancyView::from_occupants(players(&[(1, 0)]));

    let result = Pathfinder::default().find_path(
        Cell::new(0, 0),
        Cell::new(2, 0),
        &occupancy,
        ObstacleSet::ALL,
        &[],
    );

    assert!(result.found);
    assert_eq!(result.path.cells(), &[Cell::new(1, -1), Cell::new(2, 0)]);
}

#[test]
fn occupied_goal_is_still_reachable() {
    let target = Cell::new(3, 1);
    let occupancy =
        OccupancyView::from_occupants([(target, Occupant::Target(TargetId::new(0)))]);

    let result = Pathfinder::default().find_path(
        Cell::new(0, 0),
        target,
        &occupancy,
        ObstacleSet::ALL,
        &[],
    );

    assert!(result.found);
    assert_eq!(result.path.goal(), Some(target));
}

#[test]
fn boxed_pawn_cannot_reach_anything() {
    let enemy = Cell::new(0, 0);
    let mut occupants = players(&ring_around(enemy));
    occupants.push((enemy, Occupant::EnemyPawn(PawnId::new(0))));
    occupants.push((Cell::new(5, 0), Occupant::Target(TargetId::new(0))));
    let occupancy = OccupancyView::from_occupants(occupants);
    let pathfinder = Pathfinder::default();

    let to_target = pathfinder.find_path(enemy, Cell::new(5, 0), &occupancy, ObstacleSet::ALL, &[]);
    let escape = pathfinder.find_path_to_bounds_min(enemy, &occupancy, ObstacleSet::PLAYERS);

    assert!(!to_target.found);
    assert!(to_target.path.is_empty());
    assert!(!escape.found);
}

#[test]
fn free_pawn_escapes_to_bounds_corner() {
    let occupancy = OccupancyView::from_occupants(players(&[(2, 2), (-1, 3)]));
    let start = Cell::new(0, 0);

    let escape = Pathfinder::default().find_path_to_bounds_min(start, &occupancy, ObstacleSet::PLAYERS);
    let bounds = content_bounds(start, None, &occupancy, ObstacleSet::PLAYERS);

    assert!(escape.found);
    assert_eq!(escape.path.goal(), Some(bounds.min()));
    assert_walkable(escape.path.cells(), start, &occupancy);
}

#[test]
fn transition_destination_blocks_the_gap() {
    let occupancy = OccupancyView::from_occupants(players(&gapped_wall()));
    let pathfinder = Pathfinder::default();
    let start = Cell::new(0, 0);
    let goal = Cell::new(2, 0);

    let direct = pathfinder.find_path(start, goal, &occupancy, ObstacleSet::ALL, &[]);
    assert_eq!(direct.path.cells(), &[Cell::new(1, 0), goal]);

    let moving_in = PawnTransition {
        from: Cell::new(7, 7),
        to: Cell::new(1, 0),
    };
    let detour = pathfinder.find_path(start, goal, &occupancy, ObstacleSet::ALL, &[moving_in]);

    assert!(detour.found);
    assert!(!detour.path.cells().contains(&Cell::new(1, 0)));
    assert!(detour.path.len() > direct.path.len());
    assert_walkable(detour.path.cells(), start, &occupancy);
}

#[test]
fn transition_source_is_treated_as_free() {
    let mut occupants = players(&gapped_wall());
    occupants.push((Cell::new(1, 0), Occupant::EnemyPawn(PawnId::new(0))));
    let occupancy = OccupancyView::from_occupants(occupants);
    let leaving = PawnTransition {
        from: Cell::new(1, 0),
        to: Cell::new(1, 4),
    };

    let result = Pathfinder::default().find_path(
        Cell::new(0, 0),
        Cell::new(2, 0),
        &occupancy,
        ObstacleSet::ALL,
        &[leaving],
    );

    assert_eq!(result.path.next_step(), Some(Cell::new(1, 0)));
}

#[test]
fn risky_gap_is_avoided_when_a_detour_exists() {
    let mut wall = gapped_wall();
    wall.push((2, 1));
    let occupancy = OccupancyView::from_occupants(players(&wall));

    let result = Pathfinder::default().find_path(
        Cell::new(-1, 0),
        Cell::new(3, 0),
        &occupancy,
        ObstacleSet::ALL,
        &[],
    );

    assert!(result.found);
    assert!(!result.path.cells().contains(&Cell::new(1, 0)));
}

#[test]
fn risky_gap_is_used_when_nothing_else_exists() {
    let mut enclosure = Vec::new();
    for x in 1..=5 {
        enclosure.push((x, -2));
        enclosure.push((x, 2));
    }
    for y in -1..=1 {
        if y != 0 {
            enclosure.push((1, y));
        }
        enclosure.push((5, y));
    }
    enclosure.push((0, -1));
    let occupancy = OccupancyView::from_occupants(players(&enclosure));
    let start = Cell::new(-1, 0);
    let goal = Cell::new(3, 0);
    let pathfinder = Pathfinder::default();

    let field = pathfinder
        .distance_field(start, goal, &occupancy, ObstacleSet::ALL, true)
        .expect("field");
    let gap = field.get(Cell::new(1, 0)).expect("gap inside bounds");
    assert!(gap.enter_risk.iter().all(|flag| *flag));
    assert!(!field.reached());

    let result = pathfinder.find_path(start, goal, &occupancy, ObstacleSet::ALL, &[]);

    assert!(result.found);
    assert!(result.path.cells().contains(&Cell::new(1, 0)));
    assert_eq!(result.path.goal(), Some(goal));
    assert_walkable(result.path.cells(), start, &occupancy);
}

#[test]
fn distances_decrease_back_along_the_path() {
    let occupancy = OccupancyView::from_occupants(players(&[(2, 0), (2, 1), (4, 3)]));
    let start = Cell::new(0, 0);
    let goal = Cell::new(5, 1);
    let pathfinder = Pathfinder::default();

    let result = pathfinder.find_path(start, goal, &occupancy, ObstacleSet::ALL, &[]);
    let field = pathfinder
        .distance_field(start, goal, &occupancy, ObstacleSet::ALL, false)
        .expect("field");

    assert!(result.found);
    assert_walkable(result.path.cells(), start, &occupancy);
    let mut previous = 0.0;
    for cell in result.path.cells() {
        let distance = field
            .get(*cell)
            .and_then(|entry| entry.distance)
            .expect("path cell was relaxed");
        assert!(distance > previous, "{cell} does not move away from the start");
        previous = distance;
    }
}

#[test]
fn repeated_queries_are_identical() {
    let occupancy = OccupancyView::from_occupants(players(&[(1, 1), (2, -1), (3, 0), (0, 2)]));
    let pathfinder = Pathfinder::default();

    let first = pathfinder.find_path(Cell::new(0, 0), Cell::new(5, 0), &occupancy, ObstacleSet::ALL, &[]);
    let second = pathfinder.find_path(Cell::new(0, 0), Cell::new(5, 0), &occupancy, ObstacleSet::ALL, &[]);

    assert_eq!(first, second);
}

#[test]
fn no_relaxed_distance_can_be_improved_by_a_neighbour() {
    let mut occupants = players(&[(1, 0), (1, 1), (2, -2), (3, 2), (4, 0), (4, 1), (-1, 3), (6, -1)]);
    occupants.push((Cell::new(7, 2), Occupant::Target(TargetId::new(0))));
    let occupancy = OccupancyView::from_occupants(occupants);
    let start = Cell::new(-1, 0);
    let goal = Cell::new(7, 2);
    let pathfinder = Pathfinder::default();
    let config = *pathfinder.config();

    let field = pathfinder
        .distance_field(start, goal, &occupancy, ObstacleSet::ALL, false)
        .expect("field");

    assert!(field.reached());
    let mut checked_pairs = 0;
    for entry in field.iter().filter(|entry| !entry.locked) {
        let Some(distance) = entry.distance else {
            continue;
        };
        let crowd = if entry.cell.chebyshev_distance(goal) > config.crowd_free_radius {
            config.crowd_penalty * f32::from(entry.player_pawn_tiers[0])
        } else {
            0.0
        };
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, -1), (-1, 1), (1, 1)] {
            let Some(neighbor) = field.get(entry.cell.offset(dx, dy)) else {
                continue;
            };
            let Some(neighbor_distance) = neighbor.distance.filter(|_| !neighbor.locked) else {
                continue;
            };
            let step = if dx == 0 || dy == 0 {
                config.cardinal_cost
            } else {
                config.diagonal_cost
            };
            let bound = neighbor_distance + step + crowd;
            assert!(
                distance <= bound + 1e-4,
                "{} at {distance} improves to {bound} through {}",
                entry.cell,
                neighbor.cell
            );
            checked_pairs += 1;
        }
    }
    assert!(checked_pairs > 100);
}

#[test]
fn far_flung_content_is_unreachable_instead_of_failing() {
    let pathfinder = Pathfinder::default();

    for far in [Cell::new(i32::MIN, 0), Cell::new(2_000_000_000, 2_000_000_000)] {
        let occupancy =
            OccupancyView::from_occupants([(far, Occupant::PlayerPawn(PawnId::new(0)))]);

        let result =
            pathfinder.find_path(Cell::new(0, 0), Cell::new(3, 0), &occupancy, ObstacleSet::ALL, &[]);
        let escape = pathfinder.find_path_to_bounds_min(Cell::new(0, 0), &occupancy, ObstacleSet::ALL);

        assert!(!result.found, "search around {far} should be refused");
        assert!(!escape.found);
    }
}
