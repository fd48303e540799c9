use log::info;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::grid::{Grid, Pos};

pub fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

pub fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// Free/blocked status of every interior cell for one full period, indexed by
/// (phase, interior x, interior y).
pub struct ObstacleCache {
    period: usize,
    width: usize,
    height: usize,
    free: Vec<bool>,
}

impl ObstacleCache {
    /// Fails with `TooLarge` before allocating if the period times the interior area (plus the
    /// two openings) exceeds `max_states`.
    pub fn build(grid: &Grid, max_states: usize) -> Result<Self> {
        let width = grid.interior_width();
        let height = grid.interior_height();
        let period = lcm(width, height);
        let states = period.saturating_mul(width * height + 2);
        if states > max_states {
            return Err(Error::TooLarge { states, limit: max_states });
        }

        let slab = width * height;
        let mut free = vec![false; period * slab];
        // Phases are independent of each other.
        free.par_chunks_mut(slab).enumerate().for_each(|(t, cells)| {
            for x in 0..width {
                for y in 0..height {
                    let p = Pos::new(x as i32 + 1, y as i32 + 1);
                    cells[x * height + y] = !grid.obstacle_at(p, t);
                }
            }
        });
        info!("cached {} phases of a {}x{} interior", period, width, height);

        Ok(ObstacleCache { period, width, height, free })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// `p` must be an interior position.
    pub fn is_free(&self, p: Pos, t: usize) -> bool {
        let x = p.x as usize - 1;
        let y = p.y as usize - 1;
        debug_assert!(x < self.width && y < self.height);
        self.free[((t % self.period) * self.width + x) * self.height + y]
    }

    /// Number of unobstructed interior cells at minute `t`.
    pub fn free_count(&self, t: usize) -> usize {
        let slab = self.width * self.height;
        let phase = t % self.period;
        self.free[phase * slab..(phase + 1) * slab].iter().filter(|&&f| f).count()
    }
}
