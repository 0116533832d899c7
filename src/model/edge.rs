//! Incident edges and their directed readings.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use super::NodeId;

/// How an incident edge is seen from the node it was looked up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// anchor → neighbor (directed network)
    Outgoing,
    /// neighbor → anchor (directed network)
    Incoming,
    /// anchor -- neighbor (undirected network)
    Undirected,
}

/// One edge incident on a node, as stored in the node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incidence {
    pub neighbor: NodeId,
    pub direction: Direction,
}

impl Incidence {
    pub fn new(neighbor: NodeId, direction: Direction) -> Self {
        Self { neighbor, direction }
    }

    pub fn is_self_loop(&self, anchor: NodeId) -> bool {
        self.neighbor == anchor
    }
}

/// Directed `(tail, head)` candidates read off a single incident edge.
pub type Orientations = SmallVec<[(NodeId, NodeId); 2]>;

/// Expand one incident edge into the directed pairs it stands for.
///
/// An undirected edge `{anchor, nb}` stands for both `(nb, anchor)` and
/// `(anchor, nb)`. Nothing is materialised in the network itself. A
/// self-loop always yields the single pair `(anchor, anchor)`.
pub fn orientations(anchor: NodeId, incidence: Incidence) -> Orientations {
    if incidence.is_self_loop(anchor) {
        return smallvec![(anchor, anchor)];
    }
    let nb = incidence.neighbor;
    match incidence.direction {
        Direction::Outgoing => smallvec![(anchor, nb)],
        Direction::Incoming => smallvec![(nb, anchor)],
        Direction::Undirected => smallvec![(nb, anchor), (anchor, nb)],
    }
}
