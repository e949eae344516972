#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic win-path generation for the rolling cube.
//!
//! The generator emits the ordered roll directions a player must retrace to
//! reach the exit. Randomness is injected so replays and tests can pin the
//! sequence with a seeded generator.

use cube_maze_core::Direction;
use rand::Rng;

/// Shortest run of repeated directions drawn for a streak.
const MIN_RUN: u32 = 2;
/// Exclusive upper bound on the run length drawn for a streak.
const MAX_RUN: u32 = 6;

/// Pure system that produces win paths from injected randomness.
#[derive(Debug, Default)]
pub struct WinPath;

impl WinPath {
    /// Creates a new win-path generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generates `path_length` roll directions using the provided generator.
    ///
    /// A zero length yields an empty path. Directions repeat in runs of two
    /// to five rolls. Turns are perpendicular until a non-opposite turn has
    /// unlocked reversals, and a reversal immediately locks them again, so
    /// the path never oscillates back and forth.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, path_length: usize) -> Vec<Direction> {
        if path_length == 0 {
            return Vec::new();
        }

        let mut path = Vec::with_capacity(path_length);
        let mut current = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        path.push(current);

        let mut run_length = 1;
        let mut max_run = rng.gen_range(MIN_RUN..MAX_RUN);
        let mut can_reverse = false;

        while path.len() < path_length {
            if run_length < max_run {
                path.push(current);
                run_length += 1;
                continue;
            }

            let next = if can_reverse {
                Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
            } else {
                let sides = current.perpendicular();
                sides[rng.gen_range(0..sides.len())]
            };

            can_reverse = !next.is_opposite_of(current);
            current = next;
            path.push(current);
            run_length = 1;
            max_run = rng.gen_range(MIN_RUN..MAX_RUN);
        }

        path
    }
}
