use log::debug;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::graph::{NodeId, NodeKey, TimeGraph};
use crate::grid::Pos;
use crate::search::{count_expansion, LegSearch};
use crate::valley::Valley;

const UNKNOWN: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
struct Label {
    dist: usize,
    settled: bool,
    prev: Option<NodeId>,
}

impl Default for Label {
    fn default() -> Self {
        Label { dist: UNKNOWN, settled: false, prev: None }
    }
}

/// Dijkstra over the eager time-expanded graph, with every edge one minute long.
///
/// Relaxation never reorders anything: each round scans the reached-but-unsettled nodes for
/// the smallest distance, so a leg costs O(V²) in the worst case. Graphs are kept per direction
/// and reused by later legs.
pub struct SettledRelaxation<'v> {
    valley: &'v Valley,
    max_states: usize,
    max_expansions: Option<usize>,
    graphs: Vec<TimeGraph>,
    route: Vec<Pos>,
}

impl<'v> SettledRelaxation<'v> {
    pub fn new(valley: &'v Valley, config: &SearchConfig) -> Self {
        SettledRelaxation {
            valley,
            max_states: config.max_states,
            max_expansions: config.max_expansions,
            graphs: Vec::new(),
            route: Vec::new(),
        }
    }

    /// Positions visited by the most recent leg, one per minute, departure and arrival included.
    pub fn last_route(&self) -> &[Pos] {
        &self.route
    }

    fn graph_for(&mut self, from: Pos, to: Pos) -> Result<usize> {
        if let Some(i) = self.graphs.iter().position(|g| g.from() == from && g.to() == to) {
            return Ok(i);
        }
        let graph = TimeGraph::build(self.valley, from, to, self.max_states)?;
        self.graphs.push(graph);
        Ok(self.graphs.len() - 1)
    }
}

impl LegSearch for SettledRelaxation<'_> {
    fn shortest_leg(&mut self, from: Pos, to: Pos, depart: usize) -> Result<usize> {
        let unreachable = Error::Unreachable { from, to, depart };
        let gi = self.graph_for(from, to)?;
        let graph = &self.graphs[gi];
        let Some(source) = graph.node(NodeKey::new(from, depart % graph.period())) else {
            return Err(unreachable);
        };

        let mut labels = vec![Label::default(); graph.len()];
        labels[source.index()].dist = 0;
        let mut open: Vec<NodeId> = vec![source];
        let mut nsettled = 0;

        while !open.is_empty() {
            let mut closest = 0;
            for (i, id) in open.iter().enumerate() {
                if labels[id.index()].dist < labels[open[closest].index()].dist {
                    closest = i;
                }
            }
            let u = open.swap_remove(closest);
            labels[u.index()].settled = true;
            count_expansion(&mut nsettled, self.max_expansions)?;

            let du = labels[u.index()].dist;
            if graph.is_arrival(u) {
                debug!("settled {} nodes", nsettled);
                let mut route = Vec::with_capacity(du + 1);
                let mut at = Some(u);
                while let Some(id) = at {
                    route.push(graph.key(id).pos);
                    at = labels[id.index()].prev;
                }
                route.reverse();
                self.route = route;
                return Ok(du);
            }

            for &v in graph.edges(u) {
                let lv = &mut labels[v.index()];
                if lv.settled {
                    continue;
                }
                // Relax
                let alt = du + 1;
                if alt < lv.dist {
                    if lv.dist == UNKNOWN {
                        open.push(v);
                    }
                    lv.dist = alt;
                    lv.prev = Some(u);
                }
            }
        }

        Err(unreachable)
    }
}
