//! In-memory network.
//!
//! This is the reference implementation of `Network`.
//! It keeps one adjacency list per node in a hash map keyed by `NodeId`.
//!
//! ## Layout
//!
//! - **Undirected edges are stored once per endpoint**, tagged
//!   `Direction::Undirected`. The two directed readings of the edge are
//!   synthesised on demand by `model::orientations`, never stored.
//! - **Directed edges** appear as `Outgoing` at the tail and `Incoming`
//!   at the head.
//! - **Self-loops** appear exactly once in their node's list.
//! - **Parallel edges are ignored**: adding an existing edge is a no-op.
//!
//! The topology is fixed once built; only compartment labels change.

use hashbrown::HashMap;

use crate::model::*;
use crate::{Error, Result};
use super::Network;

// ============================================================================
// MemoryNetwork
// ============================================================================

/// In-memory network with a compartment label per node.
#[derive(Debug, Clone)]
pub struct MemoryNetwork {
    directed: bool,
    /// Insertion order, so iteration (and therefore seeded runs) is stable.
    order: Vec<NodeId>,
    labels: HashMap<NodeId, Option<Compartment>>,
    adjacency: HashMap<NodeId, Vec<Incidence>>,
    edges: usize,
}

impl MemoryNetwork {
    fn with_direction(directed: bool) -> Self {
        Self {
            directed,
            order: Vec::new(),
            labels: HashMap::new(),
            adjacency: HashMap::new(),
            edges: 0,
        }
    }

    pub fn undirected() -> Self {
        Self::with_direction(false)
    }

    pub fn directed() -> Self {
        Self::with_direction(true)
    }

    /// Build a network from an edge list, creating endpoints as needed.
    pub fn from_edges<I, N>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
        N: Into<NodeId>,
    {
        let mut net = Self::with_direction(directed);
        for (u, v) in edges {
            net.add_edge(u.into(), v.into());
        }
        net
    }

    /// Add an unlabelled node. Returns false if it already existed.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.labels.contains_key(&id) {
            return false;
        }
        self.labels.insert(id, None);
        self.adjacency.insert(id, Vec::new());
        self.order.push(id);
        true
    }

    /// Add an edge `u → v` (or `{u, v}` when undirected). Returns false if
    /// the edge was already present.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        self.add_node(u);
        self.add_node(v);

        if self.has_edge(u, v) {
            return false;
        }

        let (at_u, at_v) = if self.directed {
            (Direction::Outgoing, Direction::Incoming)
        } else {
            (Direction::Undirected, Direction::Undirected)
        };

        self.adjacency.entry(u).or_default().push(Incidence::new(v, at_u));
        if u != v {
            self.adjacency.entry(v).or_default().push(Incidence::new(u, at_v));
        }
        self.edges += 1;
        true
    }

    /// Whether an edge `u → v` exists (either orientation when undirected).
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        let Some(incident) = self.adjacency.get(&u) else {
            return false;
        };
        incident.iter().any(|inc| {
            inc.neighbor == v
                && match inc.direction {
                    Direction::Outgoing | Direction::Undirected => true,
                    // A directed self-loop is recorded once, as outgoing.
                    Direction::Incoming => false,
                }
        })
    }
}

// ============================================================================
// Network impl
// ============================================================================

impl Network for MemoryNetwork {
    fn is_directed(&self) -> bool {
        self.directed
    }

    fn compartment(&self, node: NodeId) -> Option<&Compartment> {
        self.labels.get(&node).and_then(Option::as_ref)
    }

    fn incident_edges(&self, node: NodeId) -> Result<&[Incidence]> {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFound(format!("Node {node}")))
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    fn node_count(&self) -> usize {
        self.order.len()
    }

    fn edge_count(&self) -> usize {
        self.edges
    }

    fn set_compartment(&mut self, node: NodeId, compartment: Compartment) -> Result<Option<Compartment>> {
        let slot = self.labels
            .get_mut(&node)
            .ok_or_else(|| Error::NotFound(format!("Node {node}")))?;
        Ok(slot.replace(compartment))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId(id)
    }

    #[test]
    fn test_undirected_edge_listed_at_both_ends() {
        let net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);

        assert_eq!(net.incident_edges(n(1)).unwrap(), &[Incidence::new(n(2), Direction::Undirected)]);
        assert_eq!(net.incident_edges(n(2)).unwrap(), &[Incidence::new(n(1), Direction::Undirected)]);
        assert_eq!(net.edge_count(), 1);
        assert!(net.has_edge(n(2), n(1)));
    }

    #[test]
    fn test_directed_edge_is_outgoing_then_incoming() {
        let net = MemoryNetwork::from_edges(true, [(1u64, 2u64)]);

        assert_eq!(net.incident_edges(n(1)).unwrap(), &[Incidence::new(n(2), Direction::Outgoing)]);
        assert_eq!(net.incident_edges(n(2)).unwrap(), &[Incidence::new(n(1), Direction::Incoming)]);
        assert!(net.has_edge(n(1), n(2)));
        assert!(!net.has_edge(n(2), n(1)));
    }

    #[test]
    fn test_self_loop_listed_once() {
        let mut net = MemoryNetwork::undirected();
        assert!(net.add_edge(n(3), n(3)));
        assert_eq!(net.degree(n(3)).unwrap(), 1);
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn test_parallel_edges_ignored() {
        let mut net = MemoryNetwork::undirected();
        assert!(net.add_edge(n(1), n(2)));
        assert!(!net.add_edge(n(2), n(1)));
        assert_eq!(net.edge_count(), 1);

        let mut dnet = MemoryNetwork::directed();
        assert!(dnet.add_edge(n(1), n(2)));
        assert!(dnet.add_edge(n(2), n(1)));
        assert_eq!(dnet.edge_count(), 2);
    }

    #[test]
    fn test_set_compartment_returns_previous() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        assert_eq!(net.compartment(n(1)), None);

        let prev = net.set_compartment(n(1), Compartment::new("S")).unwrap();
        assert_eq!(prev, None);
        let prev = net.set_compartment(n(1), Compartment::new("I")).unwrap();
        assert_eq!(prev, Some(Compartment::new("S")));
        assert!(net.is_in(n(1), &Compartment::new("I")));
    }

    #[test]
    fn test_unknown_node_is_not_found() {
        let mut net = MemoryNetwork::undirected();
        assert!(net.incident_edges(n(9)).is_err());
        assert!(net.set_compartment(n(9), Compartment::new("S")).is_err());
        assert_eq!(net.compartment(n(9)), None);
    }

    #[test]
    fn test_nodes_in_insertion_order() {
        let net = MemoryNetwork::from_edges(false, [(4u64, 2u64), (2, 9)]);
        assert_eq!(net.nodes(), vec![n(4), n(2), n(9)]);
        assert_eq!(net.node_count(), 3);
    }
}
