use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::grid::Pos;
use crate::valley::Valley;

/// A (position, phase) state. Orders by x, then y, then phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub pos: Pos,
    pub phase: usize,
}

impl NodeKey {
    pub fn new(pos: Pos, phase: usize) -> Self {
        NodeKey { pos, phase }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Every reachable state of one leg direction, wired to its successors one minute later.
///
/// Holds one node per phase for the departure opening and per free interior cell and phase.
/// Arrival nodes are only created for the phases some edge actually reaches, and they have no
/// outgoing edges.
pub struct TimeGraph {
    from: Pos,
    to: Pos,
    period: usize,
    keys: Vec<NodeKey>,
    edges: Vec<Vec<NodeId>>,
    index: FxHashMap<NodeKey, NodeId>,
}

impl TimeGraph {
    pub fn build(valley: &Valley, from: Pos, to: Pos, max_states: usize) -> Result<Self> {
        let states = valley.states();
        if states > max_states {
            return Err(Error::TooLarge { states, limit: max_states });
        }

        let grid = valley.grid();
        let period = valley.period();
        let mut graph = TimeGraph {
            from,
            to,
            period,
            keys: Vec::new(),
            edges: Vec::new(),
            index: FxHashMap::default(),
        };

        for phase in 0..period {
            graph.insert(NodeKey::new(from, phase));
        }
        for phase in 0..period {
            for y in 1..grid.height() as i32 - 1 {
                for x in 1..grid.width() as i32 - 1 {
                    let p = Pos::new(x, y);
                    if valley.is_free(p, phase) {
                        graph.insert(NodeKey::new(p, phase));
                    }
                }
            }
        }

        // Arrival nodes get appended while wiring, but they're never expanded.
        let expandable = graph.keys.len();
        let mut nedges = 0;
        for i in 0..expandable {
            let NodeKey { pos, phase } = graph.keys[i];
            let next_phase = (phase + 1) % period;
            let mut out = Vec::new();
            for next in valley.successors(pos, phase) {
                let key = NodeKey::new(next, next_phase);
                let id = match graph.node(key) {
                    Some(id) => id,
                    None if next == to => graph.insert(key),
                    // Only the arrival opening is missing from the index.
                    None => continue,
                };
                out.push(id);
            }
            nedges += out.len();
            graph.edges[i] = out;
        }

        info!(
            "built graph {} -> {}: {} nodes ({} arrivals), {} edges",
            from, to, graph.len(), graph.len() - expandable, nedges,
        );
        Ok(graph)
    }

    fn insert(&mut self, key: NodeKey) -> NodeId {
        let id = NodeId(self.keys.len());
        self.keys.push(key);
        self.edges.push(Vec::new());
        self.index.insert(key, id);
        id
    }

    pub fn from(&self) -> Pos {
        self.from
    }

    pub fn to(&self) -> Pos {
        self.to
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn node(&self, key: NodeKey) -> Option<NodeId> {
        self.index.get(&key).copied()
    }

    pub fn key(&self, id: NodeId) -> NodeKey {
        self.keys[id.0]
    }

    pub fn edges(&self, id: NodeId) -> &[NodeId] {
        &self.edges[id.0]
    }

    pub fn is_arrival(&self, id: NodeId) -> bool {
        self.keys[id.0].pos == self.to
    }
}
