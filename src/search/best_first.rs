use core::cmp::Reverse;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::config::{LoopGuard, PriorityKey, SearchConfig};
use crate::error::{Error, Result};
use crate::graph::NodeKey;
use crate::grid::Pos;
use crate::search::{count_expansion, LegSearch};
use crate::valley::Valley;

/// The last few positions of one expansion chain.
#[derive(Clone, Debug)]
struct History {
    recent: VecDeque<Pos>,
    window: usize,
}

impl History {
    fn new(window: usize) -> Self {
        History { recent: VecDeque::with_capacity(window), window }
    }

    fn push(&mut self, p: Pos) {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(p);
    }

    fn visits(&self, p: Pos) -> usize {
        self.recent.iter().filter(|&&q| q == p).count()
    }
}

#[derive(Clone, Debug)]
struct Frontier {
    priority: usize,
    time: usize,
    pos: Pos,
    history: Option<History>,
}

impl Frontier {
    fn rank(&self) -> (usize, usize, Pos) {
        (self.priority, self.time, self.pos)
    }
}

impl PartialEq for Frontier {
    fn eq(&self, o: &Self) -> bool {
        self.rank() == o.rank()
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
        Some(self.cmp(o))
    }
}

impl Ord for Frontier {
    fn cmp(&self, o: &Self) -> Ordering {
        self.rank().cmp(&o.rank())
    }
}

/// Lazy best-first search over (position, minute) with branch-and-bound pruning.
///
/// Items are never updated once queued. Instead the earliest minute each (position, phase) has
/// been queued at is remembered; a later-or-equal arrival at the same state is dominated and
/// dropped, and queued items that have since been beaten are skipped when popped. With
/// `endgame`, the first completion moves whatever is left in the queue onto a stack that is
/// worked depth-first, admitting only states that could still beat the best completion.
pub struct BestFirst<'v> {
    valley: &'v Valley,
    key: PriorityKey,
    endgame: bool,
    loop_guard: Option<LoopGuard>,
    max_expansions: Option<usize>,
}

struct Leg {
    to: Pos,
    period: usize,
    earliest: FxHashMap<NodeKey, usize>,
    best: Option<usize>,
    nexpanded: usize,
}

impl Leg {
    fn bound(&self, item: &Frontier) -> usize {
        item.time + item.pos.manhattan(self.to)
    }

    fn is_pruned(&self, item: &Frontier) -> bool {
        self.best.is_some_and(|best| self.bound(item) >= best)
    }

    fn is_stale(&self, item: &Frontier) -> bool {
        let key = NodeKey::new(item.pos, item.time % self.period);
        self.earliest.get(&key).is_some_and(|&t| t < item.time)
    }

    fn arrive(&mut self, time: usize) {
        if self.best.map_or(true, |best| time < best) {
            debug!("best completion now minute {}", time);
            self.best = Some(time);
        }
    }
}

impl<'v> BestFirst<'v> {
    pub fn new(valley: &'v Valley, config: &SearchConfig, key: PriorityKey, endgame: bool) -> Self {
        BestFirst {
            valley,
            key,
            endgame,
            loop_guard: config.loop_guard,
            max_expansions: config.max_expansions,
        }
    }

    fn expand(&self, leg: &mut Leg, item: &Frontier) -> Result<Vec<Frontier>> {
        count_expansion(&mut leg.nexpanded, self.max_expansions)?;
        let grid = self.valley.grid();
        let time = item.time + 1;
        let mut children = Vec::new();
        for pos in self.valley.successors(item.pos, item.time) {
            let h = pos.manhattan(leg.to);
            if leg.best.is_some_and(|best| time + h >= best) {
                continue;
            }
            if let (Some(guard), Some(history)) = (self.loop_guard, &item.history) {
                if !grid.is_boundary_row(pos) && history.visits(pos) > guard.max_revisits {
                    continue;
                }
            }
            let key = NodeKey::new(pos, time % leg.period);
            if leg.earliest.get(&key).is_some_and(|&t| t <= time) {
                continue;
            }
            leg.earliest.insert(key, time);

            let history = item.history.as_ref().map(|recent| {
                let mut recent = recent.clone();
                recent.push(pos);
                recent
            });
            children.push(Frontier { priority: self.key.priority(h, time), time, pos, history });
        }
        Ok(children)
    }
}

impl LegSearch for BestFirst<'_> {
    fn shortest_leg(&mut self, from: Pos, to: Pos, depart: usize) -> Result<usize> {
        let mut leg = Leg {
            to,
            period: self.valley.period(),
            earliest: FxHashMap::default(),
            best: None,
            nexpanded: 0,
        };

        let mut history = self.loop_guard.map(|g| History::new(g.window));
        if let Some(h) = history.as_mut() {
            h.push(from);
        }
        let root = Frontier {
            priority: self.key.priority(from.manhattan(to), depart),
            time: depart,
            pos: from,
            history,
        };
        leg.earliest.insert(NodeKey::new(from, depart % leg.period), depart);

        let mut queue: BinaryHeap<Reverse<Frontier>> = BinaryHeap::new();
        queue.push(Reverse(root));

        while let Some(Reverse(item)) = queue.pop() {
            if leg.is_stale(&item) || leg.is_pruned(&item) {
                continue;
            }
            if item.pos == to {
                leg.arrive(item.time);
                if self.endgame {
                    break;
                }
                continue;
            }
            for child in self.expand(&mut leg, &item)? {
                queue.push(Reverse(child));
            }
        }

        if self.endgame && leg.best.is_some() {
            // Sorted descending by rank, so the most promising item gets popped first.
            let mut stack: Vec<Frontier> = queue.into_sorted_vec().into_iter().map(|Reverse(f)| f).collect();
            info!("endgame from minute {:?} with {} pending", leg.best, stack.len());
            while let Some(item) = stack.pop() {
                if leg.is_stale(&item) || leg.is_pruned(&item) {
                    continue;
                }
                if item.pos == to {
                    leg.arrive(item.time);
                    continue;
                }
                stack.extend(self.expand(&mut leg, &item)?);
            }
        }

        debug!("expanded {} states", leg.nexpanded);
        match leg.best {
            Some(best) => Ok(best - depart),
            None => Err(Error::Unreachable { from, to, depart }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::EXAMPLE;

    #[test]
    fn test_history_window() {
        let mut h = History::new(3);
        let a = Pos::new(1, 1);
        let b = Pos::new(1, 2);
        h.push(a);
        h.push(a);
        h.push(b);
        assert_eq!(h.visits(a), 2);
        h.push(b);
        assert_eq!(h.visits(a), 1);
        assert_eq!(h.visits(b), 2);
        assert_eq!(h.recent.len(), 3);
    }

    #[test]
    fn test_frontier_order() {
        let mut queue = BinaryHeap::new();
        for (priority, time) in [(5, 1), (3, 4), (3, 2), (9, 0)] {
            queue.push(Reverse(Frontier { priority, time, pos: Pos::new(1, 1), history: None }));
        }
        let order: Vec<(usize, usize)> = std::iter::from_fn(|| queue.pop())
            .map(|Reverse(f)| (f.priority, f.time))
            .collect();
        assert_eq!(order, vec![(3, 2), (3, 4), (5, 1), (9, 0)]);
    }

    const OPEN: &str = "\
#.###
#...#
#...#
###.#";

    fn leg(valley: &Valley) -> Leg {
        Leg {
            to: valley.grid().target(),
            period: valley.period(),
            earliest: FxHashMap::default(),
            best: None,
            nexpanded: 0,
        }
    }

    #[test]
    fn test_loop_guard_expand() {
        let valley = Valley::new(OPEN.parse().unwrap(), usize::MAX).unwrap();
        let start = valley.grid().start();
        let here = Pos::new(1, 1);
        let mut history = History::new(4);
        for p in [start, start, here, here] {
            history.push(p);
        }
        let item = Frontier { priority: 0, time: 5, pos: here, history: Some(history) };
        let positions = |search: &BestFirst| -> Vec<Pos> {
            search.expand(&mut leg(&valley), &item).unwrap().iter().map(|f| f.pos).collect()
        };

        let config = SearchConfig::default();
        let unguarded = BestFirst::new(&valley, &config, PriorityKey::LowerBound, true);
        assert_eq!(positions(&unguarded), vec![here, Pos::new(2, 1), start, Pos::new(1, 2)]);

        let config = SearchConfig {
            loop_guard: Some(LoopGuard { window: 4, max_revisits: 1 }),
            ..Default::default()
        };
        let guarded = BestFirst::new(&valley, &config, PriorityKey::LowerBound, true);
        // Waiting again in the interior is cut off, going back to the start row is not.
        assert_eq!(positions(&guarded), vec![Pos::new(2, 1), start, Pos::new(1, 2)]);
    }

    #[test]
    fn test_loop_guard_history_carried() {
        let valley = Valley::new(OPEN.parse().unwrap(), usize::MAX).unwrap();
        let config = SearchConfig {
            loop_guard: Some(LoopGuard { window: 4, max_revisits: 1 }),
            ..Default::default()
        };
        let search = BestFirst::new(&valley, &config, PriorityKey::LowerBound, true);
        let here = Pos::new(1, 1);
        let mut history = History::new(4);
        history.push(here);
        let item = Frontier { priority: 0, time: 1, pos: here, history: Some(history) };
        let children = search.expand(&mut leg(&valley), &item).unwrap();
        let stay = children.iter().find(|f| f.pos == here).unwrap();
        assert_eq!(stay.history.as_ref().unwrap().visits(here), 2);
    }

    #[test]
    fn test_late_departure() {
        let valley = Valley::new(EXAMPLE.parse().unwrap(), usize::MAX).unwrap();
        let grid = valley.grid();
        let mut search = BestFirst::new(&valley, &SearchConfig::default(), PriorityKey::LowerBound, true);
        // A whole period later the valley looks the same.
        let elapsed = search.shortest_leg(grid.start(), grid.target(), valley.period()).unwrap();
        assert_eq!(elapsed, 18);
    }
}
