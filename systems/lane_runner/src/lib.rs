#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Streaming lane generator and cube movement for the runner variant.
//!
//! Instead of building a whole level upfront, the lane field keeps a sliding
//! window of generated rows around the cube: new rows appear ahead on demand
//! and far-behind rows are culled. Row layout is driven by a distance-keyed
//! difficulty ramp with streak bounds so the track never degenerates into an
//! unbroken gap or an endless safe corridor.
//!
//! Rows count northward: the cube runs toward increasing row indices.

use std::collections::VecDeque;

use cube_maze_core::{Direction, DifficultyConfig, LaneCoord, LaneOccupancy, MoveOutcome};
use rand::Rng;

/// Configuration for the lane field and its difficulty progression.
#[derive(Clone, Debug)]
pub struct LaneConfig {
    /// Number of lanes across the track.
    pub lanes: u32,
    /// Rows generated fully solid before the difficulty ramp applies.
    pub initial_safe_rows: u64,
    /// Rows kept generated ahead of the cube.
    pub lookahead: u64,
    /// Rows retained behind the cube before culling.
    pub keep_behind: u64,
    /// Side length of a tile in world units, used for movement records.
    pub tile_length: f32,
    /// Distance-keyed gap probability and streak bounds.
    pub difficulty: DifficultyConfig,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lanes: 5,
            initial_safe_rows: 3,
            lookahead: 12,
            keep_behind: 4,
            tile_length: 1.0,
            difficulty: DifficultyConfig::default(),
        }
    }
}

/// Sliding window of generated rows across a fixed set of lanes.
#[derive(Debug)]
pub struct LaneField {
    config: LaneConfig,
    rows: VecDeque<LaneRow>,
    first_row: i64,
    next_row: i64,
    solid_streak: u32,
    gap_streak: u32,
}

#[derive(Clone, Debug)]
struct LaneRow {
    gaps: Vec<bool>,
}

impl LaneRow {
    fn solid(lanes: usize) -> Self {
        Self {
            gaps: vec![false; lanes],
        }
    }

    fn has_gap(&self) -> bool {
        self.gaps.iter().any(|gap| *gap)
    }
}

impl LaneField {
    /// Creates an empty field; rows appear once `ensure_rows_ahead` runs.
    ///
    /// A zero lane count is widened to a single lane so the centre-lane
    /// fallback always has somewhere to stand.
    #[must_use]
    pub fn new(mut config: LaneConfig) -> Self {
        if config.lanes == 0 {
            config.lanes = 1;
        }
        Self {
            config,
            rows: VecDeque::new(),
            first_row: 0,
            next_row: 0,
            solid_streak: 0,
            gap_streak: 0,
        }
    }

    /// Generates rows until the window reaches `cube_row + lookahead`.
    pub fn ensure_rows_ahead<R: Rng + ?Sized>(&mut self, rng: &mut R, cube_row: i64) {
        let horizon = cube_row.saturating_add_unsigned(self.config.lookahead);
        while self.next_row <= horizon {
            self.generate_row(rng);
        }
    }

    /// Drops rows further than `keep_behind` behind the cube, returning how
    /// many were removed. Culled rows resolve as gaps afterwards.
    pub fn cull_rows_behind(&mut self, cube_row: i64) -> usize {
        let floor = cube_row.saturating_sub_unsigned(self.config.keep_behind);
        let mut removed = 0;
        while self.first_row < floor {
            if self.rows.pop_front().is_none() {
                break;
            }
            self.first_row += 1;
            removed += 1;
        }
        removed
    }

    /// Resolves the occupancy of a lane cell.
    ///
    /// Lanes outside the track are colliders; rows outside the generated
    /// window count as gaps, matching the culled void behind the cube.
    #[must_use]
    pub fn occupancy(&self, cell: LaneCoord) -> LaneOccupancy {
        if cell.lane() < 0 || cell.lane() >= self.config.lanes as i32 {
            return LaneOccupancy::Blocked;
        }
        let Some(offset) = cell.row().checked_sub(self.first_row) else {
            return LaneOccupancy::Gap;
        };
        let Ok(index) = usize::try_from(offset) else {
            return LaneOccupancy::Gap;
        };
        match self.rows.get(index) {
            Some(row) if row.gaps[cell.lane() as usize] => LaneOccupancy::Gap,
            Some(_) => LaneOccupancy::Walkable,
            None => LaneOccupancy::Gap,
        }
    }

    /// First and one-past-last row indices of the generated window.
    #[must_use]
    pub fn generated_range(&self) -> (i64, i64) {
        (self.first_row, self.next_row)
    }

    /// Configuration the field was built with.
    #[must_use]
    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    fn generate_row<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let lanes = self.config.lanes as usize;
        let row_index = self.next_row;

        let distance = u64::try_from(row_index).unwrap_or(0);
        let row = if distance < self.config.initial_safe_rows {
            LaneRow::solid(lanes)
        } else {
            let band = self.config.difficulty.band_for(distance);

            if self.solid_streak < band.min_solid_streak || self.gap_streak >= band.max_gap_streak {
                LaneRow::solid(lanes)
            } else {
                let mut gaps: Vec<bool> = (0..lanes)
                    .map(|_| rng.gen_bool(f64::from(band.gap_probability.clamp(0.0, 1.0))))
                    .collect();
                if gaps.iter().all(|gap| *gap) {
                    // Never strand the cube: the centre lane stays walkable.
                    gaps[lanes / 2] = false;
                }
                LaneRow { gaps }
            }
        };

        if row.has_gap() {
            self.gap_streak = self.gap_streak.saturating_add(1);
            self.solid_streak = 0;
        } else {
            self.solid_streak = self.solid_streak.saturating_add(1);
            self.gap_streak = 0;
        }

        self.rows.push_back(row);
        self.next_row += 1;
    }
}

/// Movement record emitted for every completed cube step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeMoved {
    /// Cell the cube occupied before the step.
    pub from: LaneCoord,
    /// Cell the cube occupies after the step.
    pub to: LaneCoord,
    /// World-space position of the destination cell centre.
    pub world_position: (f32, f32),
    /// Outcome that completed the step.
    pub outcome: MoveOutcome,
}

/// State machine tracking the cube's single occupied lane cell.
///
/// Completed moves are queued as [`CubeMoved`] records and drained once per
/// tick by the caller, so observers see at most one reaction per event in
/// emission order.
#[derive(Debug)]
pub struct CubeController {
    position: LaneCoord,
    tile_length: f32,
    fallen: bool,
    pending: VecDeque<CubeMoved>,
}

impl CubeController {
    /// Places the cube at its starting cell.
    #[must_use]
    pub fn new(start: LaneCoord, tile_length: f32) -> Self {
        Self {
            position: start,
            tile_length,
            fallen: false,
            pending: VecDeque::new(),
        }
    }

    /// Cell the cube currently occupies.
    #[must_use]
    pub const fn position(&self) -> LaneCoord {
        self.position
    }

    /// Reports whether the cube has dropped into a gap.
    #[must_use]
    pub const fn has_fallen(&self) -> bool {
        self.fallen
    }

    /// Attempts a single step in the given direction.
    ///
    /// `None` carries no displacement and is ignored, as is any input after
    /// the cube has fallen. A blocked target leaves the cube in place; a
    /// walkable target moves it; a gap moves it and marks it fallen.
    pub fn try_move<F>(&mut self, step: Option<Direction>, mut resolve: F) -> MoveOutcome
    where
        F: FnMut(LaneCoord) -> LaneOccupancy,
    {
        let Some(direction) = step else {
            return MoveOutcome::Ignored;
        };
        if self.fallen {
            return MoveOutcome::Ignored;
        }

        let target = displace(self.position, direction);
        let outcome = match resolve(target) {
            LaneOccupancy::Blocked => return MoveOutcome::Blocked,
            LaneOccupancy::Walkable => MoveOutcome::Success,
            LaneOccupancy::Gap => MoveOutcome::Falling,
        };

        let from = self.position;
        self.position = target;
        if outcome == MoveOutcome::Falling {
            self.fallen = true;
        }
        self.pending.push_back(CubeMoved {
            from,
            to: target,
            world_position: (
                target.lane() as f32 * self.tile_length,
                target.row() as f32 * self.tile_length,
            ),
            outcome,
        });

        outcome
    }

    /// Drains queued movement records into `out` in emission order.
    pub fn drain_events(&mut self, out: &mut Vec<CubeMoved>) {
        out.extend(self.pending.drain(..));
    }
}

/// Maps a direction onto a lane-space displacement. North is forward.
fn displace(cell: LaneCoord, direction: Direction) -> LaneCoord {
    match direction {
        Direction::North => LaneCoord::new(cell.lane(), cell.row() + 1),
        Direction::South => LaneCoord::new(cell.lane(), cell.row() - 1),
        Direction::East => LaneCoord::new(cell.lane() + 1, cell.row()),
        Direction::West => LaneCoord::new(cell.lane() - 1, cell.row()),
    }
}

#[cfg(test)]
mod tests {
    use super::{displace, CubeController, LaneConfig, LaneField};
    use cube_maze_core::{Direction, LaneCoord, LaneOccupancy, MoveOutcome};

    #[test]
    fn displacement_moves_one_cell() {
        let origin = LaneCoord::new(2, 5);
        assert_eq!(displace(origin, Direction::North), LaneCoord::new(2, 6));
        assert_eq!(displace(origin, Direction::South), LaneCoord::new(2, 4));
        assert_eq!(displace(origin, Direction::East), LaneCoord::new(3, 5));
        assert_eq!(displace(origin, Direction::West), LaneCoord::new(1, 5));
    }

    #[test]
    fn zero_lane_config_widens_to_one_lane() {
        let field = LaneField::new(LaneConfig {
            lanes: 0,
            ..LaneConfig::default()
        });
        assert_eq!(field.config().lanes, 1);
    }

    #[test]
    fn none_step_is_ignored_without_resolution() {
        let mut controller = CubeController::new(LaneCoord::new(0, 0), 1.0);
        let outcome = controller.try_move(None, |_| panic!("must not resolve"));
        assert_eq!(outcome, MoveOutcome::Ignored);
        assert_eq!(controller.position(), LaneCoord::new(0, 0));
    }

    #[test]
    fn blocked_target_short_circuits() {
        let mut controller = CubeController::new(LaneCoord::new(0, 0), 1.0);
        let outcome = controller.try_move(Some(Direction::East), |_| LaneOccupancy::Blocked);
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(controller.position(), LaneCoord::new(0, 0));

        let mut events = Vec::new();
        controller.drain_events(&mut events);
        assert!(events.is_empty(), "blocked steps emit no movement records");
    }
}
