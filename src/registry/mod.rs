//! # Locus Registry
//!
//! Owns every locus of a model, by name, and fans each compartment change
//! out to the loci that care about the old or the new compartment.
//!
//! ## Dispatch order
//!
//! For one node moving `from → to`:
//!
//! 1. the network's label is overwritten with `to`
//! 2. `on_leave(node, from)` runs on every locus subscribed to `from`
//! 3. `on_enter(node, to)` runs on every locus subscribed to `to`
//!
//! No other node's change is interleaved. Edge loci depend on this: by
//! the time they run, the network already reports the new label.
//!
//! ## Seeding
//!
//! Once the registry has populated or dispatched anything it is seeded,
//! and a locus registered afterwards would start out empty. The plain
//! `add_*_locus` calls refuse with `LateLocus`; the `add_*_locus_now`
//! calls take the network and rebuild the new locus on the spot.

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::locus::{EdgeLocus, Locus, LocusKind, NodeLocus};
use crate::model::*;
use crate::network::Network;
use crate::{Error, Result};

/// Named loci plus a compartment → subscriber index.
#[derive(Debug, Clone, Default)]
pub struct LocusRegistry {
    compartments: Vec<Compartment>,
    loci: Vec<LocusKind>,
    by_name: HashMap<String, usize>,
    subscribers: HashMap<Compartment, SmallVec<[usize; 4]>>,
    seeded: bool,
}

impl LocusRegistry {
    /// A registry that accepts loci over the given compartments.
    pub fn new<I, C>(compartments: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Compartment>,
    {
        let mut registry = Self::default();
        for c in compartments {
            registry.add_compartment(c.into());
        }
        registry
    }

    /// Declare a compartment. Returns false if it was already known.
    pub fn add_compartment(&mut self, compartment: Compartment) -> bool {
        if self.knows(&compartment) {
            return false;
        }
        self.compartments.push(compartment);
        true
    }

    pub fn knows(&self, compartment: &Compartment) -> bool {
        self.compartments.contains(compartment)
    }

    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    /// Whether loci have been populated or any change dispatched.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    fn check(&self, compartment: &Compartment) -> Result<()> {
        if self.knows(compartment) {
            Ok(())
        } else {
            Err(Error::UnknownCompartment(compartment.to_string()))
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Track the nodes in `compartment` under `name`. Setup only.
    pub fn add_node_locus(&mut self, name: impl Into<String>, compartment: Compartment) -> Result<()> {
        self.check(&compartment)?;
        self.register(NodeLocus::new(name, compartment).into(), false)?;
        Ok(())
    }

    /// Track the pairs running from `left` to `right` under `name`. Setup only.
    pub fn add_edge_locus(&mut self, name: impl Into<String>, left: Compartment, right: Compartment) -> Result<()> {
        self.check(&left)?;
        self.check(&right)?;
        self.register(EdgeLocus::new(name, left, right).into(), false)?;
        Ok(())
    }

    /// `add_node_locus` at any time: the new locus is filled from `network`.
    pub fn add_node_locus_now<N: Network + ?Sized>(
        &mut self,
        network: &N,
        name: impl Into<String>,
        compartment: Compartment,
    ) -> Result<()> {
        self.check(&compartment)?;
        let idx = self.register(NodeLocus::new(name, compartment).into(), true)?;
        self.loci[idx].rebuild(network)
    }

    /// `add_edge_locus` at any time: the new locus is filled from `network`.
    pub fn add_edge_locus_now<N: Network + ?Sized>(
        &mut self,
        network: &N,
        name: impl Into<String>,
        left: Compartment,
        right: Compartment,
    ) -> Result<()> {
        self.check(&left)?;
        self.check(&right)?;
        let idx = self.register(EdgeLocus::new(name, left, right).into(), true)?;
        self.loci[idx].rebuild(network)
    }

    fn register(&mut self, locus: LocusKind, late: bool) -> Result<usize> {
        let name = locus.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateLocus(name));
        }
        if self.seeded && !late {
            return Err(Error::LateLocus(name));
        }

        let idx = self.loci.len();
        for c in locus.compartments() {
            self.subscribers.entry(c.clone()).or_default().push(idx);
        }
        debug!(locus = %name, compartments = ?locus.compartments(), "registered locus");

        self.by_name.insert(name, idx);
        self.loci.push(locus);
        Ok(idx)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<&LocusKind> {
        self.by_name.get(name).map(|&i| &self.loci[i])
    }

    /// Like `get`, but an unknown name is an error.
    pub fn locus(&self, name: &str) -> Result<&LocusKind> {
        self.get(name).ok_or_else(|| Error::UnknownLocus(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Locus names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loci.iter().map(|l| l.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocusKind> {
        self.loci.iter()
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    // ========================================================================
    // Population and dispatch
    // ========================================================================

    /// Rebuild every locus from the network's current labels.
    pub fn populate<N: Network + ?Sized>(&mut self, network: &N) -> Result<()> {
        self.seeded = true;
        for locus in &mut self.loci {
            locus.rebuild(network)?;
            debug!(locus = %locus.name(), size = locus.len(), "populated locus");
        }
        Ok(())
    }

    /// Rebuild one locus, e.g. one added after the network was seeded.
    pub fn rebuild_locus<N: Network + ?Sized>(&mut self, name: &str, network: &N) -> Result<()> {
        let idx = *self.by_name
            .get(name)
            .ok_or_else(|| Error::UnknownLocus(name.to_string()))?;
        self.loci[idx].rebuild(network)
    }

    /// Move `node` into `to`, keeping every locus exact. Returns the
    /// node's previous compartment.
    ///
    /// Moving a node into the compartment it is already in changes nothing.
    pub fn change_compartment<N: Network + ?Sized>(
        &mut self,
        network: &mut N,
        node: NodeId,
        to: Compartment,
    ) -> Result<Option<Compartment>> {
        self.check(&to)?;

        let prev = network.set_compartment(node, to.clone())?;
        self.seeded = true;
        if prev.as_ref() == Some(&to) {
            trace!(%node, compartment = %to, "compartment unchanged");
            return Ok(prev);
        }
        trace!(%node, from = ?prev, to = %to, "compartment change");

        let network = &*network;
        if let Some(from) = &prev {
            if let Some(subs) = self.subscribers.get(from) {
                for &i in subs {
                    self.loci[i].on_leave(network, node, from)?;
                }
            }
        }
        if let Some(subs) = self.subscribers.get(&to) {
            for &i in subs {
                self.loci[i].on_enter(network, node, &to)?;
            }
        }
        Ok(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::Element;
    use crate::network::MemoryNetwork;

    fn c(label: &str) -> Compartment {
        Compartment::new(label)
    }

    fn sir_registry() -> LocusRegistry {
        let mut reg = LocusRegistry::new(["S", "I", "R"]);
        reg.add_node_locus("I", c("I")).unwrap();
        reg.add_edge_locus("SI", c("S"), c("I")).unwrap();
        reg
    }

    #[test]
    fn test_unknown_compartment_rejected_at_setup() {
        let mut reg = LocusRegistry::new(["S", "I"]);
        let err = reg.add_edge_locus("SX", c("S"), c("X")).unwrap_err();
        assert!(matches!(err, Error::UnknownCompartment(ref l) if l == "X"));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut reg = sir_registry();
        let err = reg.add_node_locus("SI", c("S")).unwrap_err();
        assert!(matches!(err, Error::DuplicateLocus(ref n) if n == "SI"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_lookup() {
        let reg = sir_registry();
        assert!(reg.get("SI").unwrap().as_edge_locus().is_some());
        assert!(matches!(reg.locus("nope"), Err(Error::UnknownLocus(_))));
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["I", "SI"]);
    }

    #[test]
    fn test_change_compartment_dispatches_leave_then_enter() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();

        reg.change_compartment(&mut net, NodeId(1), c("S")).unwrap();
        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();
        assert_eq!(reg.locus("SI").unwrap().len(), 1);
        assert_eq!(reg.locus("I").unwrap().len(), 1);

        let prev = reg.change_compartment(&mut net, NodeId(2), c("R")).unwrap();
        assert_eq!(prev, Some(c("I")));
        assert!(reg.locus("SI").unwrap().is_empty());
        assert!(reg.locus("I").unwrap().is_empty());
    }

    #[test]
    fn test_unchanged_compartment_is_noop() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();
        reg.change_compartment(&mut net, NodeId(1), c("S")).unwrap();
        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();

        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();
        assert_eq!(reg.locus("SI").unwrap().len(), 1);
        assert_eq!(reg.locus("I").unwrap().len(), 1);
    }

    #[test]
    fn test_change_to_unknown_compartment_leaves_network_alone() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();
        reg.change_compartment(&mut net, NodeId(1), c("S")).unwrap();

        assert!(reg.change_compartment(&mut net, NodeId(1), c("Z")).is_err());
        assert_eq!(net.compartment(NodeId(1)), Some(&c("S")));
    }

    #[test]
    fn test_late_registration_refused_once_seeded() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();
        assert!(!reg.is_seeded());
        reg.change_compartment(&mut net, NodeId(1), c("S")).unwrap();
        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();
        assert!(reg.is_seeded());

        let err = reg.add_edge_locus("IS", c("I"), c("S")).unwrap_err();
        assert!(matches!(err, Error::LateLocus(ref n) if n == "IS"));
        let err = reg.add_node_locus("S", c("S")).unwrap_err();
        assert!(matches!(err, Error::LateLocus(_)));
        assert!(reg.get("IS").is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_populate_marks_seeded() {
        let net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();
        reg.populate(&net).unwrap();
        assert!(matches!(reg.add_node_locus("S", c("S")), Err(Error::LateLocus(_))));
    }

    #[test]
    fn test_late_locus_now_is_populated_and_tracked() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64), (2, 3)]);
        let mut reg = sir_registry();
        reg.change_compartment(&mut net, NodeId(1), c("S")).unwrap();
        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();
        reg.change_compartment(&mut net, NodeId(3), c("S")).unwrap();

        reg.add_node_locus_now(&net, "S", c("S")).unwrap();
        reg.add_edge_locus_now(&net, "IS", c("I"), c("S")).unwrap();
        assert_eq!(reg.locus("S").unwrap().len(), 2);
        assert_eq!(reg.locus("IS").unwrap().len(), 2);

        reg.change_compartment(&mut net, NodeId(3), c("R")).unwrap();
        assert_eq!(reg.locus("S").unwrap().len(), 1);
        assert!(reg.locus("IS").unwrap().contains(&Element::Edge(NodeId(2), NodeId(1))));
        assert_eq!(reg.locus("IS").unwrap().len(), 1);
    }

    #[test]
    fn test_rebuild_locus_after_seeding() {
        let mut net = MemoryNetwork::from_edges(false, [(1u64, 2u64)]);
        let mut reg = sir_registry();
        reg.change_compartment(&mut net, NodeId(2), c("I")).unwrap();
        reg.rebuild_locus("I", &net).unwrap();
        assert_eq!(reg.locus("I").unwrap().len(), 1);
        assert!(matches!(reg.rebuild_locus("nope", &net), Err(Error::UnknownLocus(_))));
    }
}
