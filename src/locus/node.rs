//! Loci of nodes in a single compartment.

use rand::Rng;
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::model::*;
use crate::network::Network;
use crate::{Error, Result};
use super::{Locus, LocusSet};

/// The nodes currently labelled with one compartment.
#[derive(Debug, Clone)]
pub struct NodeLocus {
    name: String,
    compartment: Compartment,
    elements: LocusSet<NodeId>,
}

impl NodeLocus {
    pub fn new(name: impl Into<String>, compartment: Compartment) -> Self {
        Self {
            name: name.into(),
            compartment,
            elements: LocusSet::new(),
        }
    }

    pub fn compartment(&self) -> &Compartment {
        &self.compartment
    }

    /// The underlying member set.
    pub fn members(&self) -> &LocusSet<NodeId> {
        &self.elements
    }
}

impl Locus for NodeLocus {
    type Element = NodeId;
    type Iter<'a> = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn contains(&self, node: &NodeId) -> bool {
        self.elements.contains(node)
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.elements.iter().copied()
    }

    fn compartments(&self) -> SmallVec<[&Compartment; 2]> {
        smallvec![&self.compartment]
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NodeId> {
        self.elements
            .draw(rng)
            .ok_or_else(|| Error::EmptyLocus(self.name.clone()))
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn on_leave<N: Network + ?Sized>(&mut self, _network: &N, node: NodeId, from: &Compartment) -> Result<()> {
        if *from == self.compartment && self.elements.remove(&node) {
            trace!(locus = %self.name, %node, "node left locus");
        }
        Ok(())
    }

    fn on_enter<N: Network + ?Sized>(&mut self, _network: &N, node: NodeId, to: &Compartment) -> Result<()> {
        if *to == self.compartment && self.elements.insert(node) {
            trace!(locus = %self.name, %node, "node entered locus");
        }
        Ok(())
    }
}
