use log::{debug, info};

use crate::config::{SearchConfig, Strategy};
use crate::error::{Error, Result};
use crate::grid::Pos;
use crate::valley::Valley;

mod best_first;
mod settled;

pub use best_first::BestFirst;
pub use settled::SettledRelaxation;

/// Progress is logged every this many expansions.
const PROGRESS_EVERY: usize = 10_000;

pub trait LegSearch {
    /// Minutes needed to get from `from` to `to`, leaving at absolute minute `depart`.
    fn shortest_leg(&mut self, from: Pos, to: Pos, depart: usize) -> Result<usize>;
}

/// Minutes taken by each leg of a trip, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Journey {
    pub legs: Vec<usize>,
}

impl Journey {
    pub fn total(&self) -> usize {
        self.legs.iter().sum()
    }
}

/// Walks `legs` legs alternating between `start` and `target`, each one departing when the
/// previous one arrived.
pub fn journey<S: LegSearch>(search: &mut S, start: Pos, target: Pos, legs: usize) -> Result<Journey> {
    let mut journey = Journey::default();
    let mut minute = 0;
    for leg in 0..legs {
        let (from, to) = if leg % 2 == 0 { (start, target) } else { (target, start) };
        let elapsed = search.shortest_leg(from, to, minute)?;
        info!("leg {}: {} -> {} leaving at minute {} took {}", leg + 1, from, to, minute, elapsed);
        minute += elapsed;
        journey.legs.push(elapsed);
    }
    Ok(journey)
}

pub fn solve(valley: &Valley, config: &SearchConfig, legs: usize) -> Result<Journey> {
    let start = valley.grid().start();
    let target = valley.grid().target();
    match config.strategy {
        Strategy::Settled => {
            journey(&mut SettledRelaxation::new(valley, config), start, target, legs)
        },
        Strategy::BestFirst { key, endgame } => {
            journey(&mut BestFirst::new(valley, config, key, endgame), start, target, legs)
        },
    }
}

fn count_expansion(n: &mut usize, limit: Option<usize>) -> Result<()> {
    *n += 1;
    if let Some(limit) = limit {
        if *n > limit {
            return Err(Error::BudgetExhausted { limit });
        }
    }
    if *n % PROGRESS_EVERY == 0 {
        debug!("{} expansions", n);
    }
    Ok(())
}
