#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cube Maze engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for observers to
//! react to deterministically. Generation systems stay pure: they consume
//! injected randomness and immutable inputs and return owned data.

use serde::{Deserialize, Serialize};

/// Cardinal roll directions available to the cube.
///
/// North/South travel along the row axis of the grid, East/West along the
/// column axis. South and East are the positive directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in deterministic order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction that undoes a roll in this direction.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Reports whether `other` is the exact opposite of this direction.
    #[must_use]
    pub fn is_opposite_of(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Returns the two directions perpendicular to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::East, Direction::West],
            Direction::East | Direction::West => [Direction::North, Direction::South],
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Signed grid coordinate used while footprints are simulated before the
/// level grid is normalized to non-negative indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridOffset {
    column: i64,
    row: i64,
}

impl GridOffset {
    /// Creates a new signed grid coordinate.
    #[must_use]
    pub const fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// Signed column component.
    #[must_use]
    pub const fn column(&self) -> i64 {
        self.column
    }

    /// Signed row component.
    #[must_use]
    pub const fn row(&self) -> i64 {
        self.row
    }

    /// Returns this coordinate translated by the provided deltas.
    #[must_use]
    pub const fn translated(self, column_delta: i64, row_delta: i64) -> Self {
        Self {
            column: self.column + column_delta,
            row: self.row + row_delta,
        }
    }
}

/// Classification assigned to every cell of a built level grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Untouched cell surrounding the playable area.
    Border,
    /// Walkable cell covered by the rolling cube's path.
    Path,
    /// Cell belonging to the exit footprint the cube must land on.
    Exit,
}

impl CellState {
    /// Canonical integer encoding: border is -1, path is 0, exit is 1.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            CellState::Border => -1,
            CellState::Path => 0,
            CellState::Exit => 1,
        }
    }

    /// Decodes the canonical integer encoding back into a cell state.
    #[must_use]
    pub const fn from_value(value: i8) -> Option<CellState> {
        match value {
            -1 => Some(CellState::Border),
            0 => Some(CellState::Path),
            1 => Some(CellState::Exit),
            _ => None,
        }
    }

    /// Reports whether the cell can be stood on.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, CellState::Path | CellState::Exit)
    }
}

/// Dense occupancy grid produced by the level builder.
///
/// Cell storage is row-major. The start cell records where the cube's first
/// footprint anchor landed after normalization and border padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelGrid {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
    start: CellCoord,
}

impl LevelGrid {
    /// Assembles a level grid from raw parts.
    ///
    /// Returns `None` when the cell count does not match the dimensions or
    /// the start cell falls outside the grid.
    #[must_use]
    pub fn from_parts(
        columns: u32,
        rows: u32,
        cells: Vec<CellState>,
        start: CellCoord,
    ) -> Option<Self> {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).ok()?;
        if cells.len() != capacity {
            return None;
        }
        if start.column() >= columns || start.row() >= rows {
            return None;
        }
        Some(Self {
            columns,
            rows,
            cells,
            start,
        })
    }

    /// Allocates a grid of the given dimensions with every cell in `state`.
    ///
    /// The start cell begins at the origin; builders relocate it once the
    /// first footprint's anchor is known.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, state: CellState) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![state; capacity],
            start: CellCoord::new(0, 0),
        }
    }

    /// Overwrites the state of the provided cell. Out-of-range cells are ignored.
    pub fn set_state(&mut self, cell: CellCoord, state: CellState) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = state;
            }
        }
    }

    /// Relocates the start cell. Out-of-range cells are ignored.
    pub fn set_start(&mut self, cell: CellCoord) {
        if cell.column() < self.columns && cell.row() < self.rows {
            self.start = cell;
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell the cube occupies when the level begins.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        self.start
    }

    /// Returns the state of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell).and_then(|index| self.cells.get(index)).copied()
    }

    /// Iterates every cell paired with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(index, state)| {
            let index = index as u64;
            let column = (index % u64::from(columns)) as u32;
            let row = (index / u64::from(columns)) as u32;
            (CellCoord::new(column, row), *state)
        })
    }

    /// Collects every cell currently marked with the provided state.
    #[must_use]
    pub fn cells_in_state(&self, state: CellState) -> Vec<CellCoord> {
        self.iter()
            .filter(|(_, cell_state)| *cell_state == state)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Collects every exit cell of the grid.
    #[must_use]
    pub fn exit_cells(&self) -> Vec<CellCoord> {
        self.cells_in_state(CellState::Exit)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only borrowed view over a [`LevelGrid`].
#[derive(Clone, Copy, Debug)]
pub struct LevelGridView<'a> {
    grid: &'a LevelGrid,
}

impl<'a> LevelGridView<'a> {
    /// Captures a new view over the provided grid.
    #[must_use]
    pub const fn new(grid: &'a LevelGrid) -> Self {
        Self { grid }
    }

    /// Returns the state of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.grid.state(cell)
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.grid.columns(), self.grid.rows())
    }

    /// Cell the cube occupies when the level begins.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        self.grid.start_cell()
    }

    /// Iterates every cell paired with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + 'a {
        self.grid.iter()
    }
}

/// Extents of the rolling box expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxDimensions {
    /// Extent along the column axis.
    pub x: f32,
    /// Extent along the vertical axis.
    pub y: f32,
    /// Extent along the row axis.
    pub z: f32,
}

impl BoxDimensions {
    /// Creates a new dimension triple.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rounds each extent to whole cells, clamping degenerate values to 1.
    #[must_use]
    pub fn clamped_extents(&self) -> BoxExtents {
        BoxExtents {
            x: clamp_extent(self.x),
            y: clamp_extent(self.y),
            z: clamp_extent(self.z),
        }
    }
}

impl Default for BoxDimensions {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

fn clamp_extent(value: f32) -> u32 {
    let rounded = value.round();
    if rounded < 1.0 {
        1
    } else {
        rounded as u32
    }
}

/// Whole-cell extents of the rolling box after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoxExtents {
    x: u32,
    y: u32,
    z: u32,
}

impl BoxExtents {
    /// Extent along the column axis measured in cells.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Extent along the vertical axis measured in cells.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Extent along the row axis measured in cells.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }
}

/// One-based level counter driving the difficulty ramp.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelNumber(u32);

impl LevelNumber {
    /// Creates a new level number wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying level index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the next level in sequence.
    #[must_use]
    pub const fn next(self) -> LevelNumber {
        LevelNumber(self.0.saturating_add(1))
    }

    /// Number of roll steps in the win path for this level.
    ///
    /// Grows by one step every other level: levels 1 and 2 roll four times,
    /// levels 3 and 4 five times, and so on.
    #[must_use]
    pub const fn path_length(&self) -> usize {
        (4 + self.0.saturating_sub(1) / 2) as usize
    }
}

/// Outcome of a single attempted cube step in the lane runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The request carried no displacement and was dropped.
    Ignored,
    /// The cube advanced onto a walkable cell.
    Success,
    /// A collider occupies the target cell; the cube did not move.
    Blocked,
    /// The cube advanced onto a gap and is now falling.
    Falling,
}

/// Grid position in the lane runner: a fixed lane index and an unbounded row.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LaneCoord {
    lane: i32,
    row: i64,
}

impl LaneCoord {
    /// Creates a new lane coordinate.
    #[must_use]
    pub const fn new(lane: i32, row: i64) -> Self {
        Self { lane, row }
    }

    /// Horizontal lane index.
    #[must_use]
    pub const fn lane(&self) -> i32 {
        self.lane
    }

    /// Forward row index, increasing in the direction of travel.
    #[must_use]
    pub const fn row(&self) -> i64 {
        self.row
    }
}

/// Result of resolving a lane cell against the generated field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaneOccupancy {
    /// A solid tile the cube can stand on.
    Walkable,
    /// A hole; entering it drops the cube.
    Gap,
    /// A collider; the cube cannot enter the cell.
    Blocked,
}

/// Difficulty parameters applied once the cube has travelled far enough.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBand {
    /// Row distance at which this band becomes active.
    pub threshold: u64,
    /// Chance for each lane of a generated row to become a gap.
    pub gap_probability: f32,
    /// Solid rows required before gaps may appear again.
    pub min_solid_streak: u32,
    /// Maximum consecutive rows that may contain gaps.
    pub max_gap_streak: u32,
}

/// Distance-keyed difficulty progression for the lane runner.
///
/// Bands are kept sorted by threshold; lookups select the band with the
/// greatest threshold not exceeding the queried row distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    bands: Vec<DifficultyBand>,
}

impl DifficultyConfig {
    /// Builds a configuration from the provided bands.
    ///
    /// A band with threshold zero is required so every distance resolves;
    /// returns `None` when the collection is empty or lacks one.
    #[must_use]
    pub fn from_bands(mut bands: Vec<DifficultyBand>) -> Option<Self> {
        if bands.is_empty() {
            return None;
        }
        bands.sort_by_key(|band| band.threshold);
        if bands[0].threshold != 0 {
            return None;
        }
        Some(Self { bands })
    }

    /// Selects the band active at the provided row distance.
    #[must_use]
    pub fn band_for(&self, distance: u64) -> &DifficultyBand {
        let mut selected = &self.bands[0];
        for band in &self.bands {
            if band.threshold <= distance {
                selected = band;
            } else {
                break;
            }
        }
        selected
    }

    /// Bands composing the progression in ascending threshold order.
    #[must_use]
    pub fn bands(&self) -> &[DifficultyBand] {
        &self.bands
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                DifficultyBand {
                    threshold: 0,
                    gap_probability: 0.15,
                    min_solid_streak: 2,
                    max_gap_streak: 1,
                },
                DifficultyBand {
                    threshold: 40,
                    gap_probability: 0.25,
                    min_solid_streak: 1,
                    max_gap_streak: 2,
                },
                DifficultyBand {
                    threshold: 120,
                    gap_probability: 0.35,
                    min_solid_streak: 1,
                    max_gap_streak: 3,
                },
            ],
        }
    }
}

/// Kinds of tiles the world requests from the pooling collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor tile covering path and exit cells.
    Floor,
    /// Border tile surrounding the playable area.
    Border,
}

/// Identifier assigned by the pooling collaborator to a checked-out tile.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileInstanceId(u64);

impl TileInstanceId {
    /// Creates a new tile instance identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque tile lessor owned by the engine side.
///
/// The world checks tiles out while instantiating a level and returns every
/// instance before building the next one. Instance lifetime beyond that
/// pairing belongs to the pool. An `acquire` returning `None` signals a
/// missing asset; the world reports it and continues without the tile.
pub trait TilePool {
    /// Requests a tile of the given kind positioned at the given cell.
    fn acquire(&mut self, kind: TileKind, cell: CellCoord) -> Option<TileInstanceId>;

    /// Returns a previously acquired tile to the pool.
    fn release(&mut self, kind: TileKind, instance: TileInstanceId);
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds the next level using the provided rolling-box dimensions.
    GenerateLevel {
        /// Extents of the rolling box in world units.
        dimensions: BoxDimensions,
    },
    /// Records engine-side trigger feedback for an exit cell.
    MarkExitEntered {
        /// Exit cell whose trigger state changed.
        cell: CellCoord,
        /// Whether the cube's footprint currently covers the cell.
        entered: bool,
    },
    /// Tears the current level down and returns every tile to the pool.
    ClearLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new level was generated and instantiated.
    LevelGenerated {
        /// Level that became active.
        level: LevelNumber,
        /// Number of roll steps in the generated win path.
        path_length: usize,
    },
    /// Confirms that a tile was checked out of the pool for a cell.
    TilePlaced {
        /// Cell the tile occupies.
        cell: CellCoord,
        /// Kind of tile that was placed.
        kind: TileKind,
        /// Whether the tile belongs to the exit footprint.
        is_exit: bool,
    },
    /// Reports that the pool failed to supply a tile for a cell.
    TileSpawnRejected {
        /// Cell that remains without a tile.
        cell: CellCoord,
        /// Kind of tile that was requested.
        kind: TileKind,
    },
    /// Confirms that the active level was torn down.
    LevelCleared {
        /// Number of tile instances returned to the pool.
        tiles_returned: usize,
    },
    /// Announces that every exit cell is simultaneously covered by the cube.
    LevelWon {
        /// Level that was completed.
        level: LevelNumber,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BoxDimensions, CellCoord, CellState, Direction, DifficultyBand, DifficultyConfig,
        LevelGrid, LevelNumber, MoveOutcome, TileInstanceId, TileKind,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn opposites_pair_up() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert!(Direction::North.is_opposite_of(Direction::South));
        assert!(!Direction::North.is_opposite_of(Direction::East));
    }

    #[test]
    fn perpendicular_excludes_own_axis() {
        for direction in Direction::ALL {
            for side in direction.perpendicular() {
                assert_ne!(side, direction);
                assert_ne!(side, direction.opposite());
            }
        }
    }

    #[test]
    fn cell_state_encoding_round_trips() {
        for state in [CellState::Border, CellState::Path, CellState::Exit] {
            assert_eq!(CellState::from_value(state.value()), Some(state));
        }
        assert_eq!(CellState::from_value(7), None);
    }

    #[test]
    fn path_length_follows_level_formula() {
        assert_eq!(LevelNumber::new(1).path_length(), 4);
        assert_eq!(LevelNumber::new(3).path_length(), 5);
        assert_eq!(LevelNumber::new(5).path_length(), 6);
    }

    #[test]
    fn degenerate_dimensions_clamp_to_unit_cells() {
        let extents = BoxDimensions::new(0.0, -3.0, 0.4).clamped_extents();
        assert_eq!(extents.x(), 1);
        assert_eq!(extents.y(), 1);
        assert_eq!(extents.z(), 1);

        let extents = BoxDimensions::new(1.6, 2.0, 2.4).clamped_extents();
        assert_eq!(extents.x(), 2);
        assert_eq!(extents.y(), 2);
        assert_eq!(extents.z(), 2);
    }

    #[test]
    fn level_grid_rejects_mismatched_parts() {
        let cells = vec![CellState::Path; 5];
        assert!(LevelGrid::from_parts(2, 3, cells, CellCoord::new(0, 0)).is_none());

        let cells = vec![CellState::Path; 6];
        assert!(LevelGrid::from_parts(2, 3, cells, CellCoord::new(2, 0)).is_none());
    }

    #[test]
    fn level_grid_indexes_row_major() {
        let mut cells = vec![CellState::Border; 6];
        cells[1 * 3 + 2] = CellState::Exit;
        let grid = LevelGrid::from_parts(3, 2, cells, CellCoord::new(0, 0)).expect("valid grid");

        assert_eq!(grid.state(CellCoord::new(2, 1)), Some(CellState::Exit));
        assert_eq!(grid.state(CellCoord::new(3, 0)), None);
        assert_eq!(grid.exit_cells(), vec![CellCoord::new(2, 1)]);
    }

    #[test]
    fn difficulty_lookup_selects_greatest_threshold_not_above_distance() {
        let config = DifficultyConfig::default();
        assert_eq!(config.band_for(0).threshold, 0);
        assert_eq!(config.band_for(39).threshold, 0);
        assert_eq!(config.band_for(40).threshold, 40);
        assert_eq!(config.band_for(1_000).threshold, 120);
    }

    #[test]
    fn difficulty_config_requires_zero_band() {
        let missing_zero = DifficultyConfig::from_bands(vec![DifficultyBand {
            threshold: 10,
            gap_probability: 0.2,
            min_solid_streak: 1,
            max_gap_streak: 1,
        }]);
        assert!(missing_zero.is_none());
        assert!(DifficultyConfig::from_bands(Vec::new()).is_none());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn tile_instance_id_round_trips_through_bincode() {
        assert_round_trip(&TileInstanceId::new(42));
    }

    #[test]
    fn tile_kind_round_trips_through_bincode() {
        assert_round_trip(&TileKind::Border);
    }

    #[test]
    fn move_outcome_round_trips_through_bincode() {
        assert_round_trip(&MoveOutcome::Falling);
    }
}
