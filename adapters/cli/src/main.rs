#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Cube Maze level generation.
//!
//! Generates a sequence of maze levels and prints each one as text, or runs
//! the endless lane demo that marches a cube over a procedurally streamed
//! track until it falls.

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use cube_maze_core::{
    BoxDimensions, CellCoord, Command, Direction, Event, LaneCoord, LaneOccupancy, MoveOutcome,
    TileInstanceId, TileKind, TilePool,
};
use cube_maze_rendering::{render_rows, GridPresentation};
use cube_maze_system_lane_runner::{CubeController, LaneConfig, LaneField};
use cube_maze_world::{apply, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Command-line options for the Cube Maze generator.
#[derive(Debug, Parser)]
#[command(name = "cube-maze", about = "Procedural rolling-cube maze generator")]
struct Cli {
    /// Global seed for the level stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of consecutive levels to generate and print.
    #[arg(long, default_value_t = 3)]
    levels: u32,

    /// Cube extent along the x axis in world units.
    #[arg(long, default_value_t = 1.0)]
    box_x: f32,

    /// Cube extent along the y axis in world units.
    #[arg(long, default_value_t = 1.0)]
    box_y: f32,

    /// Cube extent along the z axis in world units.
    #[arg(long, default_value_t = 1.0)]
    box_z: f32,

    /// Edge length of a floor tile in world units.
    #[arg(long, default_value_t = 1.0)]
    tile_length: f32,

    /// Run the endless lane demo instead of generating maze levels.
    #[arg(long)]
    lane_demo: bool,

    /// Number of forward steps to attempt in the lane demo.
    #[arg(long, default_value_t = 40)]
    steps: u32,
}

/// Tile lessor backed by plain counters; stands in for an engine-side pool.
#[derive(Debug, Default)]
struct CountingPool {
    next: u64,
    live: usize,
}

impl TilePool for CountingPool {
    fn acquire(&mut self, _kind: TileKind, _cell: CellCoord) -> Option<TileInstanceId> {
        let id = self.next;
        self.next += 1;
        self.live += 1;
        Some(TileInstanceId::new(id))
    }

    fn release(&mut self, _kind: TileKind, _instance: TileInstanceId) {
        self.live = self.live.saturating_sub(1);
    }
}

fn main() -> AnyResult<()> {
    let cli = Cli::parse();
    let presentation =
        GridPresentation::new(cli.tile_length).context("invalid --tile-length value")?;

    if cli.lane_demo {
        run_lane_demo(&cli, presentation);
        return Ok(());
    }

    run_maze_levels(&cli, presentation);
    Ok(())
}

fn run_maze_levels(cli: &Cli, presentation: GridPresentation) {
    let mut world = World::with_seed(cli.seed);
    let mut pool = CountingPool::default();
    let dimensions = BoxDimensions::new(cli.box_x, cli.box_y, cli.box_z);

    for _ in 0..cli.levels {
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::GenerateLevel { dimensions },
            &mut pool,
            &mut events,
        );
        report_level(&world, &events, presentation);
    }
}

fn report_level(world: &World, events: &[Event], presentation: GridPresentation) {
    let placed = events
        .iter()
        .filter(|event| matches!(event, Event::TilePlaced { .. }))
        .count();
    let rejected = events
        .iter()
        .filter(|event| matches!(event, Event::TileSpawnRejected { .. }))
        .count();

    for event in events {
        if let Event::LevelGenerated { level, path_length } = event {
            println!("level {} (path length {path_length})", level.get());
        }
    }

    if let Some(grid) = query::level_grid(world) {
        for row in render_rows(&grid) {
            println!("{row}");
        }
    }

    if let Some(start) = query::start_cell(world) {
        let origin = presentation.cell_to_world(start, start);
        println!(
            "start ({}, {}) -> world ({:.1}, {:.1}, {:.1})",
            start.column(),
            start.row(),
            origin.x,
            origin.y,
            origin.z,
        );
    }

    let exits = query::exit_cells(world);
    println!("tiles placed: {placed}, rejected: {rejected}, exit cells: {}", exits.len());
    println!();
}

fn run_lane_demo(cli: &Cli, presentation: GridPresentation) {
    let config = LaneConfig {
        tile_length: presentation.tile_length(),
        ..LaneConfig::default()
    };
    let lanes = config.lanes;
    let mut field = LaneField::new(config);
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut controller = CubeController::new(
        LaneCoord::new(lanes as i32 / 2, 0),
        presentation.tile_length(),
    );

    for _ in 0..cli.steps {
        let cube_row = controller.position().row();
        field.ensure_rows_ahead(&mut rng, cube_row);
        let _ = field.cull_rows_behind(cube_row);

        let direction = pick_forward_step(&field, controller.position());
        let outcome = controller.try_move(direction, |cell| field.occupancy(cell));
        if outcome == MoveOutcome::Falling {
            break;
        }
    }

    let mut moves = Vec::new();
    controller.drain_events(&mut moves);
    for record in &moves {
        println!(
            "({}, {}) -> ({}, {}) at ({:.1}, {:.1}): {:?}",
            record.from.lane(),
            record.from.row(),
            record.to.lane(),
            record.to.row(),
            record.world_position.0,
            record.world_position.1,
            record.outcome,
        );
    }

    let travelled = controller.position().row();
    if controller.has_fallen() {
        println!("cube fell after {travelled} rows");
    } else {
        println!("cube survived {travelled} rows");
    }
}

/// Greedy autopilot: prefer walking straight ahead, sidestep when the lane
/// ahead is a gap, and accept the fall only when every forward option is one.
fn pick_forward_step(field: &LaneField, position: LaneCoord) -> Option<Direction> {
    let ahead = LaneCoord::new(position.lane(), position.row() + 1);
    if field.occupancy(ahead) == LaneOccupancy::Walkable {
        return Some(Direction::North);
    }
    for (direction, lane_shift) in [(Direction::East, 1), (Direction::West, -1)] {
        let side = LaneCoord::new(position.lane() + lane_shift, position.row());
        if field.occupancy(side) == LaneOccupancy::Walkable {
            return Some(direction);
        }
    }
    Some(Direction::North)
}
