//! Shortest trips across a valley whose obstacles drift one cell per minute and wrap around its
//! interior.
//!
//! The minute-0 board ([`grid::Grid`]) is turned into a cached obstacle table
//! ([`oracle::ObstacleCache`]) that repeats every lcm(interior width, interior height) minutes.
//! [`valley::Valley`] answers which cells are free at a given minute, and the searches in
//! [`search`] find the fewest minutes for one or more legs between the two openings.

pub mod config;
pub mod error;
pub mod graph;
pub mod grid;
pub mod oracle;
pub mod search;
pub mod valley;

pub use config::{LoopGuard, PriorityKey, SearchConfig, Strategy};
pub use error::{Error, Result};
pub use grid::{Grid, Pos};
pub use search::{solve, Journey};
pub use valley::Valley;

#[cfg(test)]
mod fixtures {
    pub const EXAMPLE: &str = "\
#.######
#>>.<^<#
#.<..<<#
#>v.><>#
#<^v^^>#
######.#";

    // A lone obstacle on the first interior row never catches the direct path.
    pub const SINGLE: &str = "\
#.#####
#>....#
#.....#
#.....#
#####.#";
}
