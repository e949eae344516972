use cube_maze_core::{
    DifficultyBand, DifficultyConfig, Direction, LaneCoord, LaneOccupancy, MoveOutcome,
};
use cube_maze_system_lane_runner::{CubeController, LaneConfig, LaneField};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn single_band(gap_probability: f32, min_solid_streak: u32, max_gap_streak: u32) -> DifficultyConfig {
    DifficultyConfig::from_bands(vec![DifficultyBand {
        threshold: 0,
        gap_probability,
        min_solid_streak,
        max_gap_streak,
    }])
    .expect("band at threshold zero")
}

fn row_states(field: &LaneField, row: i64) -> Vec<LaneOccupancy> {
    (0..field.config().lanes as i32)
        .map(|lane| field.occupancy(LaneCoord::new(lane, row)))
        .collect()
}

fn is_fully_solid(field: &LaneField, row: i64) -> bool {
    row_states(field, row)
        .iter()
        .all(|occupancy| *occupancy == LaneOccupancy::Walkable)
}

#[test]
fn initial_safe_rows_are_fully_solid_for_any_seed() {
    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut field = LaneField::new(LaneConfig {
            initial_safe_rows: 3,
            difficulty: single_band(1.0, 0, u32::MAX),
            ..LaneConfig::default()
        });
        field.ensure_rows_ahead(&mut rng, 0);

        for row in 0..3 {
            assert!(
                is_fully_solid(&field, row),
                "seed {seed}: safe row {row} must be solid",
            );
        }
    }
}

#[test]
fn gap_streak_limit_forces_a_solid_row() {
    // Every unforced row gains gaps, so rows alternate in blocks: two gap
    // rows, then one forced solid row, regardless of the gap probability.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut field = LaneField::new(LaneConfig {
        initial_safe_rows: 0,
        difficulty: single_band(1.0, 0, 2),
        ..LaneConfig::default()
    });
    field.ensure_rows_ahead(&mut rng, 0);

    assert!(!is_fully_solid(&field, 0));
    assert!(!is_fully_solid(&field, 1));
    assert!(is_fully_solid(&field, 2), "third row must break the streak");
    assert!(!is_fully_solid(&field, 3));
    assert!(!is_fully_solid(&field, 4));
    assert!(is_fully_solid(&field, 5));
}

#[test]
fn solid_streak_minimum_delays_new_gaps() {
    // After every gap row, two solid rows are required before gaps return.
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut field = LaneField::new(LaneConfig {
        initial_safe_rows: 0,
        difficulty: single_band(1.0, 2, u32::MAX),
        ..LaneConfig::default()
    });
    field.ensure_rows_ahead(&mut rng, 6);

    // Rows 0 and 1 are forced solid because the streak counter starts empty.
    assert!(is_fully_solid(&field, 0));
    assert!(is_fully_solid(&field, 1));
    assert!(!is_fully_solid(&field, 2));
    assert!(is_fully_solid(&field, 3));
    assert!(is_fully_solid(&field, 4));
    assert!(!is_fully_solid(&field, 5));
}

#[test]
fn all_gap_rows_keep_the_centre_lane_walkable() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let lanes = 5;
    let mut field = LaneField::new(LaneConfig {
        lanes,
        initial_safe_rows: 0,
        difficulty: single_band(1.0, 0, u32::MAX),
        ..LaneConfig::default()
    });
    field.ensure_rows_ahead(&mut rng, 0);

    let (first, next) = field.generated_range();
    for row in first..next {
        assert_eq!(
            field.occupancy(LaneCoord::new(lanes as i32 / 2, row)),
            LaneOccupancy::Walkable,
            "row {row}: centre lane must survive the all-gap fallback",
        );
    }
}

#[test]
fn lanes_outside_the_track_are_blocked() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut field = LaneField::new(LaneConfig::default());
    field.ensure_rows_ahead(&mut rng, 0);

    assert_eq!(
        field.occupancy(LaneCoord::new(-1, 0)),
        LaneOccupancy::Blocked
    );
    assert_eq!(field.occupancy(LaneCoord::new(5, 0)), LaneOccupancy::Blocked);
}

#[test]
fn culled_rows_resolve_as_gaps() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut field = LaneField::new(LaneConfig {
        keep_behind: 2,
        ..LaneConfig::default()
    });
    field.ensure_rows_ahead(&mut rng, 10);

    let removed = field.cull_rows_behind(10);
    assert_eq!(removed, 8, "rows 0..8 fall outside the retained window");
    assert_eq!(field.generated_range().0, 8);
    assert_eq!(field.occupancy(LaneCoord::new(2, 0)), LaneOccupancy::Gap);
    assert_eq!(field.occupancy(LaneCoord::new(2, 7)), LaneOccupancy::Gap);
    assert!(
        row_states(&field, 8).contains(&LaneOccupancy::Walkable),
        "retained rows always keep at least one walkable lane",
    );
}

#[test]
fn window_advances_with_the_cube() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut field = LaneField::new(LaneConfig {
        lookahead: 6,
        keep_behind: 2,
        ..LaneConfig::default()
    });

    field.ensure_rows_ahead(&mut rng, 0);
    assert_eq!(field.generated_range(), (0, 7));

    field.ensure_rows_ahead(&mut rng, 5);
    let _ = field.cull_rows_behind(5);
    assert_eq!(field.generated_range(), (3, 12));
}

#[test]
fn same_seed_generates_identical_fields() {
    let config = LaneConfig {
        initial_safe_rows: 2,
        ..LaneConfig::default()
    };

    let mut first = LaneField::new(config.clone());
    let mut second = LaneField::new(config);
    let mut first_rng = ChaCha8Rng::seed_from_u64(99);
    let mut second_rng = ChaCha8Rng::seed_from_u64(99);
    first.ensure_rows_ahead(&mut first_rng, 20);
    second.ensure_rows_ahead(&mut second_rng, 20);

    let (start, end) = first.generated_range();
    assert_eq!(second.generated_range(), (start, end));
    for row in start..end {
        assert_eq!(
            row_states(&first, row),
            row_states(&second, row),
            "row {row} diverged between identically seeded fields",
        );
    }
}

#[test]
fn walkable_step_succeeds_and_emits_one_record() {
    let mut controller = CubeController::new(LaneCoord::new(2, 0), 2.0);
    let outcome = controller.try_move(Some(Direction::North), |_| LaneOccupancy::Walkable);

    assert_eq!(outcome, MoveOutcome::Success);
    assert_eq!(controller.position(), LaneCoord::new(2, 1));

    let mut events = Vec::new();
    controller.drain_events(&mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].from, LaneCoord::new(2, 0));
    assert_eq!(events[0].to, LaneCoord::new(2, 1));
    assert_eq!(events[0].world_position, (4.0, 2.0));
    assert_eq!(events[0].outcome, MoveOutcome::Success);
}

#[test]
fn gap_step_moves_then_marks_the_cube_fallen() {
    let mut controller = CubeController::new(LaneCoord::new(1, 3), 1.0);
    let outcome = controller.try_move(Some(Direction::East), |_| LaneOccupancy::Gap);

    assert_eq!(outcome, MoveOutcome::Falling);
    assert_eq!(controller.position(), LaneCoord::new(2, 3));
    assert!(controller.has_fallen());

    // Further input is dropped once the cube is falling.
    let outcome = controller.try_move(Some(Direction::North), |_| LaneOccupancy::Walkable);
    assert_eq!(outcome, MoveOutcome::Ignored);
    assert_eq!(controller.position(), LaneCoord::new(2, 3));
}

#[test]
fn movement_records_drain_in_emission_order() {
    let mut controller = CubeController::new(LaneCoord::new(2, 0), 1.0);
    let mut field = LaneField::new(LaneConfig {
        initial_safe_rows: 8,
        ..LaneConfig::default()
    });
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    field.ensure_rows_ahead(&mut rng, 0);

    for direction in [Direction::North, Direction::North, Direction::East] {
        let outcome = controller.try_move(Some(direction), |cell| field.occupancy(cell));
        assert_eq!(outcome, MoveOutcome::Success);
    }

    let mut events = Vec::new();
    controller.drain_events(&mut events);
    let cells: Vec<LaneCoord> = events.iter().map(|event| event.to).collect();
    assert_eq!(
        cells,
        vec![
            LaneCoord::new(2, 1),
            LaneCoord::new(2, 2),
            LaneCoord::new(3, 2),
        ],
    );

    events.clear();
    controller.drain_events(&mut events);
    assert!(events.is_empty(), "records are delivered at most once");
}
