use log::debug;

use crate::error::Result;
use crate::grid::{Grid, Pos};
use crate::oracle::ObstacleCache;

// Stay, then the four orthogonal moves.
const MOVES: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Everything a search needs to know about the valley: the minute-0 board and the cached
/// obstacle table derived from it. Built once per run and never mutated.
pub struct Valley {
    grid: Grid,
    cache: ObstacleCache,
}

impl Valley {
    pub fn new(grid: Grid, max_states: usize) -> Result<Self> {
        let cache = ObstacleCache::build(&grid, max_states)?;
        debug!("{} of {} interior cells free at minute 0", cache.free_count(0),
            grid.interior_width() * grid.interior_height());
        Ok(Valley { grid, cache })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn period(&self) -> usize {
        self.cache.period()
    }

    /// Number of (position, phase) states: every interior cell plus the two openings.
    pub fn states(&self) -> usize {
        self.period() * (self.grid.interior_width() * self.grid.interior_height() + 2)
    }

    /// Openings are always free, walls never are.
    pub fn is_free(&self, p: Pos, t: usize) -> bool {
        if self.grid.is_boundary_opening(p) {
            return true;
        }
        self.grid.is_interior(p) && self.cache.is_free(p, t)
    }

    /// Positions the traveler may occupy at minute `t + 1` when standing on `p` at minute `t`.
    pub fn successors(&self, p: Pos, t: usize) -> impl Iterator<Item = Pos> + '_ {
        MOVES.iter()
            .map(move |&(dx, dy)| p.translate(dx, dy))
            .filter(move |&n| self.is_free(n, t + 1))
    }
}
