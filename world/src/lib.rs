#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Cube Maze.
//!
//! The world owns the level counter, the current occupancy grid, and the
//! tiles checked out of the external pool. Adapters mutate it exclusively
//! through [`apply`], which broadcasts [`Event`] values describing what
//! changed. Level generation is reproducible: each level draws its path from
//! a generator seeded by hashing the global seed with the level number.

use cube_maze_core::{
    BoxDimensions, CellCoord, CellState, Command, Event, LevelGrid, LevelNumber, TileInstanceId,
    TileKind, TilePool,
};
use cube_maze_system_grid_builder::GridBuilder;
use cube_maze_system_win_path::WinPath;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const DEFAULT_GLOBAL_SEED: u64 = 0x6c5e_8d10_37ab_94f2;
const LEVEL_SEED_LABEL: &str = "cube-maze/level";

/// Represents the authoritative Cube Maze level state.
#[derive(Debug)]
pub struct World {
    global_seed: u64,
    level: LevelNumber,
    grid: Option<LevelGrid>,
    tiles: Vec<TileRecord>,
    won: bool,
    path_generator: WinPath,
    grid_builder: GridBuilder,
}

impl World {
    /// Creates a new world using the default global seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_GLOBAL_SEED)
    }

    /// Creates a new world whose level sequence derives from `global_seed`.
    #[must_use]
    pub fn with_seed(global_seed: u64) -> Self {
        Self {
            global_seed,
            level: LevelNumber::new(0),
            grid: None,
            tiles: Vec::new(),
            won: false,
            path_generator: WinPath::new(),
            grid_builder: GridBuilder::new(),
        }
    }

    fn clear_level(&mut self, pool: &mut dyn TilePool, out_events: &mut Vec<Event>) {
        if self.grid.is_none() && self.tiles.is_empty() {
            return;
        }

        let mut returned = 0;
        for record in self.tiles.drain(..) {
            pool.release(record.kind, record.instance);
            returned += 1;
        }
        self.grid = None;
        self.won = false;
        out_events.push(Event::LevelCleared {
            tiles_returned: returned,
        });
    }

    fn generate_level(
        &mut self,
        dimensions: BoxDimensions,
        pool: &mut dyn TilePool,
        out_events: &mut Vec<Event>,
    ) {
        self.clear_level(pool, out_events);

        self.level = self.level.next();
        let path_length = self.level.path_length();
        let mut rng = ChaCha8Rng::seed_from_u64(derive_level_seed(self.global_seed, self.level));
        let path = self.path_generator.generate(&mut rng, path_length);
        let grid = self.grid_builder.build_grid(&path, dimensions);

        out_events.push(Event::LevelGenerated {
            level: self.level,
            path_length,
        });

        for (cell, state) in grid.iter() {
            let kind = match state {
                CellState::Border => TileKind::Border,
                CellState::Path | CellState::Exit => TileKind::Floor,
            };
            let is_exit = state == CellState::Exit;

            match pool.acquire(kind, cell) {
                Some(instance) => {
                    self.tiles.push(TileRecord {
                        instance,
                        kind,
                        cell,
                        is_exit,
                        entered: false,
                    });
                    out_events.push(Event::TilePlaced { cell, kind, is_exit });
                }
                None => out_events.push(Event::TileSpawnRejected { cell, kind }),
            }
        }

        self.grid = Some(grid);
    }

    fn mark_exit_entered(&mut self, cell: CellCoord, entered: bool, out_events: &mut Vec<Event>) {
        let mut touched = false;
        for record in self.tiles.iter_mut() {
            if record.is_exit && record.cell == cell {
                record.entered = entered;
                touched = true;
            }
        }
        if !touched {
            return;
        }

        if !self.won && all_exits_entered(&self.tiles) {
            self.won = true;
            out_events.push(Event::LevelWon { level: self.level });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// The pool is the external tile lessor; a missing instance is reported via
/// [`Event::TileSpawnRejected`] without aborting the rest of the level.
pub fn apply(
    world: &mut World,
    command: Command,
    pool: &mut dyn TilePool,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::GenerateLevel { dimensions } => {
            world.generate_level(dimensions, pool, out_events);
        }
        Command::MarkExitEntered { cell, entered } => {
            world.mark_exit_entered(cell, entered, out_events);
        }
        Command::ClearLevel => {
            world.clear_level(pool, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cube_maze_core::{CellCoord, LevelGridView, LevelNumber, TileInstanceId, TileKind};

    use super::{all_exits_entered, World};

    /// Level the world generated most recently; zero before the first level.
    #[must_use]
    pub fn level_number(world: &World) -> LevelNumber {
        world.level
    }

    /// Provides a read-only view of the active level grid, if any.
    #[must_use]
    pub fn level_grid(world: &World) -> Option<LevelGridView<'_>> {
        world.grid.as_ref().map(LevelGridView::new)
    }

    /// Cell the cube occupies when the active level begins.
    #[must_use]
    pub fn start_cell(world: &World) -> Option<CellCoord> {
        world.grid.as_ref().map(|grid| grid.start_cell())
    }

    /// Exit cells of the active level in deterministic order.
    #[must_use]
    pub fn exit_cells(world: &World) -> Vec<CellCoord> {
        world
            .grid
            .as_ref()
            .map(|grid| grid.exit_cells())
            .unwrap_or_default()
    }

    /// Reports whether every exit tile is simultaneously covered by the cube.
    ///
    /// Touching a single exit cell is not enough: the cube's whole footprint
    /// must land on the exit, which registers as every exit tile reporting
    /// the cube inside its trigger at once.
    #[must_use]
    pub fn is_win(world: &World) -> bool {
        all_exits_entered(&world.tiles)
    }

    /// Captures a read-only snapshot of every placed tile.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        let mut snapshots: Vec<TileSnapshot> = world
            .tiles
            .iter()
            .map(|record| TileSnapshot {
                instance: record.instance,
                kind: record.kind,
                cell: record.cell,
                is_exit: record.is_exit,
                entered: record.entered,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        TileView { snapshots }
    }

    /// Read-only snapshot describing all tiles placed for the active level.
    #[derive(Clone, Debug, Default)]
    pub struct TileView {
        snapshots: Vec<TileSnapshot>,
    }

    impl TileView {
        /// Iterator over the captured tile snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<TileSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single placed tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileSnapshot {
        /// Identifier the pool assigned to the checked-out instance.
        pub instance: TileInstanceId,
        /// Kind of tile occupying the cell.
        pub kind: TileKind,
        /// Cell the tile occupies.
        pub cell: CellCoord,
        /// Whether the tile belongs to the exit footprint.
        pub is_exit: bool,
        /// Whether the cube currently covers the tile's trigger.
        pub entered: bool,
    }
}

#[derive(Clone, Copy, Debug)]
struct TileRecord {
    instance: TileInstanceId,
    kind: TileKind,
    cell: CellCoord,
    is_exit: bool,
    entered: bool,
}

fn all_exits_entered(tiles: &[TileRecord]) -> bool {
    let mut any_exit = false;
    for record in tiles {
        if record.is_exit {
            any_exit = true;
            if !record.entered {
                return false;
            }
        }
    }
    any_exit
}

fn derive_level_seed(global_seed: u64, level: LevelNumber) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(LEVEL_SEED_LABEL.as_bytes());
    hasher.update(global_seed.to_le_bytes());
    hasher.update(level.get().to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
