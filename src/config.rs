use std::str::FromStr;

use crate::error::Error;

/// Ordering key for the best-first frontier. `h` is the Manhattan distance left to the target,
/// `t` the absolute minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityKey {
    /// `h`: admissible but blind to time, so it wanders.
    Heuristic,
    /// `2h + t`
    Weighted,
    /// `h + t`, the A* lower bound.
    LowerBound,
}

impl PriorityKey {
    pub fn priority(self, h: usize, t: usize) -> usize {
        match self {
            PriorityKey::Heuristic => h,
            PriorityKey::Weighted => 2 * h + t,
            PriorityKey::LowerBound => h + t,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Eager time-expanded graph with settled-node relaxation.
    Settled,
    /// Lazy priority search. With `endgame`, the search switches to a depth-first stack once
    /// the first completion is found.
    BestFirst { key: PriorityKey, endgame: bool },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::BestFirst { key: PriorityKey::LowerBound, endgame: true }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PriorityKey::*;
        let strategy = match s {
            "settled" => Strategy::Settled,
            "best-first" => Strategy::BestFirst { key: LowerBound, endgame: false },
            "heuristic" => Strategy::BestFirst { key: Heuristic, endgame: true },
            "weighted" => Strategy::BestFirst { key: Weighted, endgame: true },
            "endgame" => Strategy::BestFirst { key: LowerBound, endgame: true },
            _ => return Err(Error::Usage(format!("unknown strategy: {s}"))),
        };
        Ok(strategy)
    }
}

/// Rejects an expansion that would put the traveler on a position already visited more than
/// `max_revisits` times within its last `window` moves, unless it's on a border row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopGuard {
    pub window: usize,
    pub max_revisits: usize,
}

impl Default for LoopGuard {
    fn default() -> Self {
        LoopGuard { window: 100, max_revisits: 40 }
    }
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub strategy: Strategy,
    pub loop_guard: Option<LoopGuard>,
    /// Upper bound on period × (interior area + 2) before anything gets precomputed.
    pub max_states: usize,
    /// Give up after this many node expansions.
    pub max_expansions: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            strategy: Strategy::default(),
            loop_guard: None,
            max_states: 20_000_000,
            max_expansions: None,
        }
    }
}

impl SearchConfig {
    pub fn with_strategy(strategy: Strategy) -> Self {
        SearchConfig { strategy, ..Default::default() }
    }
}
