//! # Network Trait
//!
//! This is the contract between the loci and whatever stores the graph.
//! Loci only ever ask three things of it during dispatch: is it directed,
//! what is this node's compartment, and which edges touch this node.
//!
//! ## Implementations
//!
//! | Network | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryNetwork` | `memory` | In-memory adjacency lists for simulation and testing |

pub mod memory;

use crate::model::*;
use crate::Result;

pub use memory::MemoryNetwork;

// ============================================================================
// Network Trait
// ============================================================================

/// The graph and its compartment labels, as seen by the loci.
///
/// Reads must be cheap: `compartment()` is O(1) and `incident_edges()`
/// hands back the stored adjacency so walking it costs O(degree).
pub trait Network {
    /// Whether edges carry a direction.
    fn is_directed(&self) -> bool;

    /// The node's current compartment. `None` for an unlabelled or unknown
    /// node, which satisfies no locus predicate.
    fn compartment(&self, node: NodeId) -> Option<&Compartment>;

    /// Every edge touching `node`, each listed once.
    fn incident_edges(&self, node: NodeId) -> Result<&[Incidence]>;

    /// All nodes, in a stable order.
    fn nodes(&self) -> Vec<NodeId>;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Relabel a node, returning its previous compartment.
    fn set_compartment(&mut self, node: NodeId, compartment: Compartment) -> Result<Option<Compartment>>;

    /// Number of edges touching `node`.
    fn degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.incident_edges(node)?.len())
    }

    /// Whether `node` currently carries `compartment`.
    fn is_in(&self, node: NodeId, compartment: &Compartment) -> bool {
        self.compartment(node) == Some(compartment)
    }
}
