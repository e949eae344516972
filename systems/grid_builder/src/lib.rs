#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Footprint rasterization and level-grid construction.
//!
//! The builder replays a win path as a sequence of box rolls, unions every
//! footprint the box leaves on the ground plane, and rasterizes the result
//! into a bordered occupancy grid. No randomness is involved: identical
//! inputs always produce identical grids.

use cube_maze_core::{BoxDimensions, CellCoord, CellState, Direction, GridOffset, LevelGrid};

/// Number of border cells padded onto every side of the rasterized area.
const BORDER_PADDING: u32 = 2;

/// Axis-aligned contact rectangle the box leaves on the grid after a roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    anchor: GridOffset,
    size_x: u32,
    size_z: u32,
}

impl Footprint {
    /// Creates a footprint from an anchor cell and horizontal extents.
    #[must_use]
    pub const fn new(anchor: GridOffset, size_x: u32, size_z: u32) -> Self {
        Self {
            anchor,
            size_x,
            size_z,
        }
    }

    /// Minimum-corner cell of the rectangle.
    #[must_use]
    pub const fn anchor(&self) -> GridOffset {
        self.anchor
    }

    /// Extent along the column axis measured in cells.
    #[must_use]
    pub const fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Extent along the row axis measured in cells.
    #[must_use]
    pub const fn size_z(&self) -> u32 {
        self.size_z
    }

    /// Iterates every cell covered by the rectangle.
    pub fn cells(&self) -> impl Iterator<Item = GridOffset> + '_ {
        let anchor = self.anchor;
        let size_x = i64::from(self.size_x);
        (0..i64::from(self.size_z)).flat_map(move |dz| {
            (0..size_x).map(move |dx| anchor.translated(dx, dz))
        })
    }
}

/// Rolling box simulator tracking the contact rectangle and the upright extent.
///
/// A roll tips the box over one edge: the extent along the roll axis swaps
/// with the vertical extent, and the anchor shifts by the pre-swap extent
/// (the horizontal one when rolling toward positive indices, the vertical
/// one when rolling toward negative indices).
#[derive(Clone, Copy, Debug)]
struct RollingBox {
    anchor: GridOffset,
    size_x: u32,
    size_z: u32,
    axis_y: u32,
}

impl RollingBox {
    fn resting(size_x: u32, size_z: u32, axis_y: u32) -> Self {
        Self {
            anchor: GridOffset::new(0, 0),
            size_x,
            size_z,
            axis_y,
        }
    }

    fn roll(&mut self, direction: Direction) {
        match direction {
            Direction::East => {
                self.anchor = self.anchor.translated(i64::from(self.size_x), 0);
                std::mem::swap(&mut self.size_x, &mut self.axis_y);
            }
            Direction::West => {
                self.anchor = self.anchor.translated(-i64::from(self.axis_y), 0);
                std::mem::swap(&mut self.size_x, &mut self.axis_y);
            }
            Direction::South => {
                self.anchor = self.anchor.translated(0, i64::from(self.size_z));
                std::mem::swap(&mut self.size_z, &mut self.axis_y);
            }
            Direction::North => {
                self.anchor = self.anchor.translated(0, -i64::from(self.axis_y));
                std::mem::swap(&mut self.size_z, &mut self.axis_y);
            }
        }
    }

    fn footprint(&self) -> Footprint {
        Footprint::new(self.anchor, self.size_x, self.size_z)
    }
}

/// Pure system that converts win paths into bordered level grids.
#[derive(Debug, Default)]
pub struct GridBuilder;

impl GridBuilder {
    /// Creates a new grid builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Simulates the box rolling along `path` and returns every footprint it
    /// leaves, starting with the resting footprint at the origin.
    #[must_use]
    pub fn footprints(&self, path: &[Direction], dimensions: BoxDimensions) -> Vec<Footprint> {
        let extents = dimensions.clamped_extents();
        let mut rolling = RollingBox::resting(extents.x(), extents.z(), extents.y());

        let mut footprints = Vec::with_capacity(path.len() + 1);
        footprints.push(rolling.footprint());
        for direction in path {
            rolling.roll(*direction);
            footprints.push(rolling.footprint());
        }
        footprints
    }

    /// Builds the bordered occupancy grid for the provided win path.
    ///
    /// Every footprint rasterizes as path cells except the last, whose cells
    /// inside its leading exit rectangle become exit cells; earlier
    /// footprints never overwrite a written exit cell. The playable area is
    /// then wrapped in two rings of border cells, with the inner ring's
    /// path-adjacent cells opened into a walkable buffer.
    #[must_use]
    pub fn build_grid(&self, path: &[Direction], dimensions: BoxDimensions) -> LevelGrid {
        let extents = dimensions.clamped_extents();
        let footprints = self.footprints(path, dimensions);
        let bounds = CoverageBounds::of(&footprints);

        let mut grid = LevelGrid::filled(
            bounds.columns() + 2 * BORDER_PADDING,
            bounds.rows() + 2 * BORDER_PADDING,
            CellState::Border,
        );

        let last_index = footprints.len() - 1;
        for (index, footprint) in footprints.iter().enumerate() {
            let is_last = index == last_index;
            for covered in footprint.cells() {
                let Some(cell) = bounds.to_grid(covered) else {
                    continue;
                };
                let state = if is_last && is_exit_cell(covered, footprint, extents.x(), extents.z())
                {
                    CellState::Exit
                } else {
                    match grid.state(cell) {
                        Some(CellState::Exit) => continue,
                        _ => CellState::Path,
                    }
                };
                grid.set_state(cell, state);
            }
        }

        open_border_buffer(&mut grid);

        if let Some(first) = footprints.first() {
            if let Some(start) = bounds.to_grid(first.anchor()) {
                grid.set_start(start);
            }
        }

        grid
    }
}

/// Reports whether a covered cell belongs to the exit rectangle of the final
/// footprint: the leading `size_x x size_z` corner measured from its anchor.
fn is_exit_cell(covered: GridOffset, footprint: &Footprint, size_x: u32, size_z: u32) -> bool {
    let dx = covered.column() - footprint.anchor().column();
    let dz = covered.row() - footprint.anchor().row();
    dx < i64::from(size_x) && dz < i64::from(size_z)
}

/// Marks the four neighbors of every walkable cell as path when they are
/// still border, carving a walkable buffer ring while the outer ring stays
/// untouched.
fn open_border_buffer(grid: &mut LevelGrid) {
    let walkable: Vec<CellCoord> = grid
        .iter()
        .filter(|(_, state)| state.is_walkable())
        .map(|(cell, _)| cell)
        .collect();

    for cell in walkable {
        for neighbor in cardinal_neighbors(cell, grid.columns(), grid.rows()) {
            if grid.state(neighbor) == Some(CellState::Border) {
                grid.set_state(neighbor, CellState::Path);
            }
        }
    }
}

fn cardinal_neighbors(cell: CellCoord, columns: u32, rows: u32) -> Vec<CellCoord> {
    let mut neighbors = Vec::with_capacity(4);
    if cell.row() > 0 {
        neighbors.push(CellCoord::new(cell.column(), cell.row() - 1));
    }
    if cell.column() > 0 {
        neighbors.push(CellCoord::new(cell.column() - 1, cell.row()));
    }
    if cell.column() + 1 < columns {
        neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
    }
    if cell.row() + 1 < rows {
        neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
    }
    neighbors
}

/// Bounding box of every covered cell plus the translation into grid space.
#[derive(Clone, Copy, Debug)]
struct CoverageBounds {
    min_column: i64,
    min_row: i64,
    max_column: i64,
    max_row: i64,
}

impl CoverageBounds {
    fn of(footprints: &[Footprint]) -> Self {
        let mut bounds = Self {
            min_column: 0,
            min_row: 0,
            max_column: 0,
            max_row: 0,
        };

        for footprint in footprints {
            let anchor = footprint.anchor();
            bounds.min_column = bounds.min_column.min(anchor.column());
            bounds.min_row = bounds.min_row.min(anchor.row());
            bounds.max_column = bounds
                .max_column
                .max(anchor.column() + i64::from(footprint.size_x()) - 1);
            bounds.max_row = bounds
                .max_row
                .max(anchor.row() + i64::from(footprint.size_z()) - 1);
        }

        bounds
    }

    fn columns(&self) -> u32 {
        u32::try_from(self.max_column - self.min_column + 1).unwrap_or(0)
    }

    fn rows(&self) -> u32 {
        u32::try_from(self.max_row - self.min_row + 1).unwrap_or(0)
    }

    /// Translates a covered cell into padded grid coordinates.
    fn to_grid(&self, covered: GridOffset) -> Option<CellCoord> {
        let column = covered.column() - self.min_column + i64::from(BORDER_PADDING);
        let row = covered.row() - self.min_row + i64::from(BORDER_PADDING);
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(CellCoord::new(column, row))
    }
}
