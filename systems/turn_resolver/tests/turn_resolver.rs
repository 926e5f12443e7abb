use encircle_core::{
    Cell, Command, EnemyGoal, EnemySnapshot, EnemyStep, EnemyView, Event, Occupant,
    OccupancyView, PawnId, TargetId, TurnOutcome,
};
use encircle_system_turn_resolver::TurnResolver;

#[derive(Default)]
struct Scene {
    occupants: Vec<(Cell, Occupant)>,
    enemies: Vec<EnemySnapshot>,
    next_pawn: u32,
}

impl Scene {
    fn single(&mut self, cell: (i32, i32), target: (i32, i32)) -> PawnId {
        let id = self.pawn();
        let target_id = TargetId::new(id.get());
        self.occupants
            .push((Cell::new(target.0, target.1), Occupant::Target(target_id)));
        self.enemy(id, cell, EnemyGoal::Target(target_id));
        id
    }

    fn pair(&mut self, a: (i32, i32), b: (i32, i32)) -> (PawnId, PawnId) {
        let first = self.pawn();
        let second = self.pawn();
        self.enemy(first, a, EnemyGoal::Pawn(second));
        self.enemy(second, b, EnemyGoal::Pawn(first));
        (first, second)
    }

    fn players(&mut self, cells: &[(i32, i32)]) {
        for (x, y) in cells {
            let id = self.pawn();
            self.occupants
                .push((Cell::new(*x, *y), Occupant::PlayerPawn(id)));
        }
    }

    fn ring(&mut self, center: (i32, i32)) {
        let mut cells = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    cells.push((center.0 + dx, center.1 + dy));
                }
            }
        }
        self.players(&cells);
    }

    fn pawn(&mut self) -> PawnId {
        let id = PawnId::new(self.next_pawn);
        self.next_pawn += 1;
        id
    }

    fn enemy(&mut self, id: PawnId, cell: (i32, i32), goal: EnemyGoal) {
        let cell = Cell::new(cell.0, cell.1);
        self.occupants.push((cell, Occupant::EnemyPawn(id)));
        self.enemies.push(EnemySnapshot { id, cell, goal });
    }

    fn views(&self) -> (EnemyView, OccupancyView) {
        (
            EnemyView::from_snapshots(self.enemies.clone()),
            OccupancyView::from_occupants(self.occupants.iter().copied()),
        )
    }

    fn resolver(&self) -> TurnResolver {
        let mut resolver = TurnResolver::default();
        resolver.classify(&self.views().0);
        resolver
    }
}

#[test]
fn single_advances_one_cell_toward_target() {
    let mut scene = Scene::default();
    let pawn = scene.single((0, 0), (5, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert!(report.any_moved);
    assert_eq!(
        report.steps,
        vec![EnemyStep {
            pawn,
            from: Cell::new(0, 0),
            to: Cell::new(1, 0),
        }]
    );
}

#[test]
fn single_next_to_target_after_its_step_fails_the_level() {
    let mut scene = Scene::default();
    let _ = scene.single((0, 0), (2, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Fail);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].to, Cell::new(1, 0));
}

#[test]
fn later_single_steps_into_cell_vacated_by_earlier_single() {
    let mut scene = Scene::default();
    let leader = scene.single((1, 0), (1, -5));
    let follower = scene.single((0, 0), (5, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(
        report.steps,
        vec![
            EnemyStep {
                pawn: leader,
                from: Cell::new(1, 0),
                to: Cell::new(1, -1),
            },
            EnemyStep {
                pawn: follower,
                from: Cell::new(0, 0),
                to: Cell::new(1, 0),
            },
        ]
    );
}

#[test]
fn boxed_single_is_surrounded_and_wins_the_level() {
    let mut scene = Scene::default();
    let _ = scene.single((0, 0), (6, 0));
    scene.ring((0, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Success);
    assert!(!report.any_moved);
    assert!(report.steps.is_empty());
}

#[test]
fn sealed_target_with_free_enemy_keeps_playing() {
    let mut scene = Scene::default();
    let _ = scene.single((-4, 0), (4, 0));
    scene.ring((4, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert!(!report.any_moved);
}

#[test]
fn sealed_target_and_sealed_enemy_count_as_surrounded() {
    let mut scene = Scene::default();
    let _ = scene.single((-4, 0), (4, 0));
    scene.ring((4, 0));
    scene.ring((-4, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Success);
}

#[test]
fn one_free_enemy_prevents_success() {
    let mut scene = Scene::default();
    let _ = scene.single((0, 0), (6, 0));
    scene.ring((0, 0));
    let _ = scene.single((0, 8), (8, 8));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert_eq!(report.steps.len(), 1);
}

#[test]
fn pair_closes_the_gap_from_both_ends_then_meets() {
    let mut scene = Scene::default();
    let (first, second) = scene.pair((0, 0), (4, 0));
    let (enemies, occupancy) = scene.views();
    let resolver = scene.resolver();

    let report = resolver.resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert_eq!(
        report.steps,
        vec![
            EnemyStep {
                pawn: first,
                from: Cell::new(0, 0),
                to: Cell::new(1, 0),
            },
            EnemyStep {
                pawn: second,
                from: Cell::new(4, 0),
                to: Cell::new(3, 0),
            },
        ]
    );

    let mut moved = occupancy.clone();
    for step in &report.steps {
        moved.relocate(step.from, step.to);
    }
    let enemies = EnemyView::from_snapshots(vec![
        EnemySnapshot {
            id: first,
            cell: Cell::new(1, 0),
            goal: EnemyGoal::Pawn(second),
        },
        EnemySnapshot {
            id: second,
            cell: Cell::new(3, 0),
            goal: EnemyGoal::Pawn(first),
        },
    ]);

    let report = resolver.resolve(&enemies, &moved);

    assert_eq!(report.outcome, TurnOutcome::Fail);
    assert_eq!(report.steps.len(), 2);
    assert!(report.steps.iter().all(|step| step.to == Cell::new(2, 0)));
}

#[test]
fn adjacent_pair_has_already_met() {
    let mut scene = Scene::default();
    let _ = scene.pair((0, 0), (1, 1));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Fail);
    assert!(report.steps.is_empty());
}

#[test]
fn boxed_pair_halves_are_both_surrounded() {
    let mut scene = Scene::default();
    let _ = scene.pair((0, 0), (6, 0));
    scene.ring((0, 0));
    scene.ring((6, 0));
    let (enemies, occupancy) = scene.views();

    let report = scene.resolver().resolve(&enemies, &occupancy);

    assert_eq!(report.outcome, TurnOutcome::Success);
}

#[test]
fn handle_classifies_on_load_and_answers_phase_requests() {
    let mut scene = Scene::default();
    let _ = scene.single((0, 0), (5, 0));
    let (enemies, occupancy) = scene.views();
    let mut resolver = TurnResolver::default();
    let mut commands = Vec::new();

    resolver.handle(
        &[Event::LevelLoaded {
            player_moves_in_turn: 1,
        }],
        &enemies,
        &occupancy,
        &mut commands,
    );
    assert!(commands.is_empty());

    resolver.handle(&[Event::EnemyPhaseRequested], &enemies, &occupancy, &mut commands);

    assert_eq!(commands.len(), 1);
    let Command::ApplyEnemyTurn { report } = &commands[0] else {
        panic!("expected an enemy turn, got {:?}", commands[0]);
    };
    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert_eq!(report.steps.len(), 1);
}
