//! Loci of directed node pairs whose endpoints sit in given compartments.
//!
//! An `EdgeLocus` bound to `(L, R)` holds exactly the pairs `(u, v)` such
//! that an edge joins `u` to `v` (either orientation of an undirected
//! edge), `u` is labelled `L` and `v` is labelled `R`. `(A, B)` and
//! `(B, A)` are different loci even on an undirected network.
//!
//! Both handlers only look at the edges incident on the node that
//! changed, so an update costs O(degree) regardless of network size.

use rand::Rng;
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::model::*;
use crate::network::Network;
use crate::{Error, Result};
use super::{Locus, LocusSet};

/// A directed pair `(tail, head)`.
pub type Pair = (NodeId, NodeId);

/// The directed pairs running from compartment `left` to compartment `right`.
#[derive(Debug, Clone)]
pub struct EdgeLocus {
    name: String,
    left: Compartment,
    right: Compartment,
    elements: LocusSet<Pair>,
}

impl EdgeLocus {
    pub fn new(name: impl Into<String>, left: Compartment, right: Compartment) -> Self {
        Self {
            name: name.into(),
            left,
            right,
            elements: LocusSet::new(),
        }
    }

    pub fn left(&self) -> &Compartment {
        &self.left
    }

    pub fn right(&self) -> &Compartment {
        &self.right
    }

    /// The underlying member set.
    pub fn members(&self) -> &LocusSet<Pair> {
        &self.elements
    }

    /// Whether `(u, v)` satisfies the predicate right now.
    fn matches<N: Network + ?Sized>(&self, network: &N, (u, v): Pair) -> bool {
        network.is_in(u, &self.left) && network.is_in(v, &self.right)
    }

    /// The directed candidates an incident edge stands for, checked
    /// against the network's own notion of direction.
    fn candidates<N: Network + ?Sized>(network: &N, node: NodeId, incidence: Incidence) -> Orientations {
        assert_eq!(
            network.is_directed(),
            incidence.direction != Direction::Undirected,
            "network reports directed={} but node {node} has a {:?} incidence",
            network.is_directed(),
            incidence.direction,
        );
        orientations(node, incidence)
    }
}

impl Locus for EdgeLocus {
    type Element = Pair;
    type Iter<'a> = std::iter::Copied<std::slice::Iter<'a, Pair>>;

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn contains(&self, pair: &Pair) -> bool {
        self.elements.contains(pair)
    }

    fn elements(&self) -> Self::Iter<'_> {
        self.elements.iter().copied()
    }

    fn compartments(&self) -> SmallVec<[&Compartment; 2]> {
        if self.left == self.right {
            smallvec![&self.left]
        } else {
            smallvec![&self.left, &self.right]
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Pair> {
        self.elements
            .draw(rng)
            .ok_or_else(|| Error::EmptyLocus(self.name.clone()))
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    /// Drop every pair in which `node` held the role that required `from`.
    ///
    /// Removal is decided by the role `node` occupied, not by re-testing
    /// its new label: by now the network already reports the new one.
    fn on_leave<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, from: &Compartment) -> Result<()> {
        let was_left = *from == self.left;
        let was_right = *from == self.right;
        if !was_left && !was_right {
            return Ok(());
        }

        for &incidence in network.incident_edges(node)? {
            for (u, v) in Self::candidates(network, node, incidence) {
                let stale = (was_left && u == node) || (was_right && v == node);
                if !stale || !self.elements.remove(&(u, v)) {
                    continue;
                }
                trace!(locus = %self.name, tail = %u, head = %v, "pair left locus");

                // The other endpoint hasn't moved, so it must still hold its role.
                if u != v {
                    let (other, required) = if u == node { (v, &self.right) } else { (u, &self.left) };
                    assert!(
                        network.is_in(other, required),
                        "locus {}: pair ({u}, {v}) was present but node {other} is {:?}, not {required}",
                        self.name,
                        network.compartment(other),
                    );
                }
            }
        }
        Ok(())
    }

    /// Add every incident pair that now satisfies the predicate.
    fn on_enter<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, to: &Compartment) -> Result<()> {
        let is_left = *to == self.left;
        let is_right = *to == self.right;
        if !is_left && !is_right {
            return Ok(());
        }

        assert!(
            network.is_in(node, to),
            "locus {}: node {node} reported entering {to} but the network has it as {:?}",
            self.name,
            network.compartment(node),
        );

        for &incidence in network.incident_edges(node)? {
            for pair in Self::candidates(network, node, incidence) {
                let (u, v) = pair;
                let role = (is_left && u == node) || (is_right && v == node);
                if role && self.matches(network, pair) && self.elements.insert(pair) {
                    trace!(locus = %self.name, tail = %u, head = %v, "pair entered locus");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MemoryNetwork;

    fn c(label: &str) -> Compartment {
        Compartment::new(label)
    }

    fn n(id: u64) -> NodeId {
        NodeId(id)
    }

    /// Relabel and deliver leave/enter the way the registry does.
    fn relabel(net: &mut MemoryNetwork, loci: &mut [&mut EdgeLocus], node: NodeId, to: &str) {
        let prev = net.set_compartment(node, c(to)).unwrap();
        if let Some(prev) = prev {
            for locus in loci.iter_mut() {
                locus.on_leave(&*net, node, &prev).unwrap();
            }
        }
        for locus in loci.iter_mut() {
            locus.on_enter(&*net, node, &c(to)).unwrap();
        }
    }

    #[test]
    fn test_undirected_edge_populates_each_orientation_separately() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));
        let mut is = EdgeLocus::new("IS", c("I"), c("S"));

        relabel(&mut net, &mut [&mut si, &mut is], n(1), "S");
        relabel(&mut net, &mut [&mut si, &mut is], n(2), "I");

        assert_eq!(si.members().as_slice(), &[(n(1), n(2))]);
        assert_eq!(is.members().as_slice(), &[(n(2), n(1))]);
    }

    #[test]
    fn test_directed_edge_only_one_way() {
        let mut net = MemoryNetwork::from_edges(true, [(1u64, 2u64)]);
        let mut lr = EdgeLocus::new("LR", c("L"), c("R"));
        let mut rl = EdgeLocus::new("RL", c("R"), c("L"));

        relabel(&mut net, &mut [&mut lr, &mut rl], n(1), "L");
        relabel(&mut net, &mut [&mut lr, &mut rl], n(2), "R");

        assert_eq!(lr.members().as_slice(), &[(n(1), n(2))]);
        assert!(rl.is_empty());
    }

    #[test]
    fn test_leave_removes_by_prior_role() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64), (1, 3)]);
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));

        relabel(&mut net, &mut [&mut si], n(2), "I");
        relabel(&mut net, &mut [&mut si], n(3), "I");
        relabel(&mut net, &mut [&mut si], n(1), "S");
        assert_eq!(si.len(), 2);

        // S -> R: both pairs had node 1 as the S tail.
        relabel(&mut net, &mut [&mut si], n(1), "R");
        assert!(si.is_empty());
    }

    #[test]
    fn test_head_leaving_removes_pair() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));

        relabel(&mut net, &mut [&mut si], n(1), "S");
        relabel(&mut net, &mut [&mut si], n(2), "I");
        assert_eq!(si.len(), 1);

        relabel(&mut net, &mut [&mut si], n(2), "R");
        assert!(si.is_empty());
    }

    #[test]
    fn test_move_between_own_endpoints() {
        // Node 2 going I -> S must swap (1,2) out for (2,3).
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64), (2, 3)]);
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));

        relabel(&mut net, &mut [&mut si], n(1), "S");
        relabel(&mut net, &mut [&mut si], n(3), "I");
        relabel(&mut net, &mut [&mut si], n(2), "I");
        assert_eq!(si.members().as_slice(), &[(n(1), n(2))]);

        relabel(&mut net, &mut [&mut si], n(2), "S");
        assert_eq!(si.members().as_slice(), &[(n(2), n(3))]);
    }

    #[test]
    fn test_self_loop_needs_equal_labels() {
        let mut net = MemoryNetwork::from_edges(false, [(5u64, 5u64)]);
        let mut ii = EdgeLocus::new("II", c("I"), c("I"));
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));

        relabel(&mut net, &mut [&mut ii, &mut si], n(5), "I");
        assert_eq!(ii.members().as_slice(), &[(n(5), n(5))]);
        assert!(si.is_empty());

        relabel(&mut net, &mut [&mut ii, &mut si], n(5), "S");
        assert!(ii.is_empty());
        assert!(si.is_empty());
    }

    #[test]
    fn test_same_compartment_both_ends() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut ii = EdgeLocus::new("II", c("I"), c("I"));

        relabel(&mut net, &mut [&mut ii], n(1), "I");
        relabel(&mut net, &mut [&mut ii], n(2), "I");
        assert_eq!(ii.len(), 2);

        relabel(&mut net, &mut [&mut ii], n(1), "S");
        assert!(ii.is_empty());
    }

    #[test]
    fn test_irrelevant_compartments_are_ignored() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));

        relabel(&mut net, &mut [&mut si], n(1), "R");
        relabel(&mut net, &mut [&mut si], n(2), "R");
        assert!(si.is_empty());
    }

    #[test]
    fn test_draw_on_empty_locus_fails() {
        let si = EdgeLocus::new("SI", c("S"), c("I"));
        let mut rng = rand::thread_rng();
        assert!(matches!(si.draw(&mut rng), Err(Error::EmptyLocus(name)) if name == "SI"));
    }

    #[test]
    #[should_panic(expected = "reported entering")]
    fn test_enter_before_relabel_panics() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        net.set_compartment(n(1), c("I")).unwrap();
        let mut si = EdgeLocus::new("SI", c("S"), c("I"));
        si.on_enter(&net, n(1), &c("S")).unwrap();
    }
}
