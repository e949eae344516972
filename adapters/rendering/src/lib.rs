#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Cube Maze adapters.
//!
//! Maps grid cells into world space relative to the level's start cell and
//! renders grids as text for terminal front-ends. Engine-specific concerns
//! such as meshes and materials stay on the adapter side.

use anyhow::{ensure, Result as AnyResult};
use cube_maze_core::{CellCoord, CellState, LevelGridView};
use glam::Vec3;

/// Glyph used for border cells in text renderings.
pub const BORDER_GLYPH: char = '#';
/// Glyph used for walkable path cells in text renderings.
pub const PATH_GLYPH: char = '.';
/// Glyph used for exit cells in text renderings.
pub const EXIT_GLYPH: char = 'E';
/// Glyph used for the start cell in text renderings.
pub const START_GLYPH: char = 'S';

/// Presentation parameters shared by every Cube Maze adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    tile_length: f32,
}

impl GridPresentation {
    /// Creates a presentation using the provided tile edge length.
    pub fn new(tile_length: f32) -> AnyResult<Self> {
        ensure!(
            tile_length.is_finite() && tile_length > 0.0,
            "tile length must be positive, got {tile_length}",
        );
        Ok(Self { tile_length })
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Maps a grid cell to the world-space position of its centre, measured
    /// relative to the level's start cell.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord, start: CellCoord) -> Vec3 {
        let column_delta = i64::from(cell.column()) - i64::from(start.column());
        let row_delta = i64::from(cell.row()) - i64::from(start.row());
        Vec3::new(
            column_delta as f32 * self.tile_length,
            0.0,
            row_delta as f32 * self.tile_length,
        )
    }

    /// Maps a world-space position back onto the grid cell it falls in.
    ///
    /// Returns `None` for positions left of or above the grid origin.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec3, start: CellCoord) -> Option<CellCoord> {
        let column_delta = (position.x / self.tile_length).round() as i64;
        let row_delta = (position.z / self.tile_length).round() as i64;
        let column = u32::try_from(i64::from(start.column()) + column_delta).ok()?;
        let row = u32::try_from(i64::from(start.row()) + row_delta).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Renders the grid as one text row per grid row.
///
/// The start cell renders as [`START_GLYPH`] even when it doubles as an exit
/// cell, which happens when the win path loops back onto its first footprint.
#[must_use]
pub fn render_rows(view: &LevelGridView<'_>) -> Vec<String> {
    let (columns, rows) = view.dimensions();
    let start = view.start_cell();

    (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| {
                    let cell = CellCoord::new(column, row);
                    if cell == start {
                        return START_GLYPH;
                    }
                    match view.state(cell) {
                        Some(CellState::Border) | None => BORDER_GLYPH,
                        Some(CellState::Path) => PATH_GLYPH,
                        Some(CellState::Exit) => EXIT_GLYPH,
                    }
                })
                .collect()
        })
        .collect()
}
