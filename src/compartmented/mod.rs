//! # Compartmented Models
//!
//! A model declares its compartments (with the probability a node starts
//! in each), the loci the dynamics needs, and the events that fire at
//! those loci. It owns the `LocusRegistry`; every compartment change in a
//! simulation goes through `CompartmentedModel::change_compartment`.
//!
//! Each declared compartment automatically gets a node locus of the same
//! name. Further node and edge loci are added explicitly, before the
//! network is seeded; the `_now` variants add them afterwards.
//!
//! ## Built-in models
//!
//! | Model | Module | Compartments | Events |
//! |-------|--------|--------------|--------|
//! | SIR | `sir` | S, I, R | infect on SI, remove on I |
//! | SIS | `sis` | S, I | infect on SI, recover on I |

pub mod sir;
pub mod sis;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locus::{Element, Locus, LocusKind};
use crate::model::*;
use crate::network::Network;
use crate::registry::LocusRegistry;
use crate::{Error, Result};

/// Tolerance when checking that initial probabilities sum to one.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Events
// ============================================================================

/// Which node of a drawn element an event acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The node drawn from a node locus.
    Node,
    /// The tail `u` of a pair `(u, v)` drawn from an edge locus.
    Tail,
    /// The head `v` of a pair `(u, v)` drawn from an edge locus.
    Head,
}

impl Target {
    /// The node this target picks out of `element`, if the kinds agree.
    pub fn select(self, element: Element) -> Option<NodeId> {
        match (self, element) {
            (Target::Node, Element::Node(n)) => Some(n),
            (Target::Tail, Element::Edge(u, _)) => Some(u),
            (Target::Head, Element::Edge(_, v)) => Some(v),
            _ => None,
        }
    }
}

/// An event class: fires at `rate` per element of `locus`, moving the
/// targeted node into `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub locus: String,
    pub rate: f64,
    pub target: Target,
    pub to: Compartment,
}

// ============================================================================
// CompartmentedModel
// ============================================================================

/// Compartments, loci and events of one model.
#[derive(Debug, Clone)]
pub struct CompartmentedModel {
    name: String,
    initial: Vec<(Compartment, f64)>,
    registry: LocusRegistry,
    events: Vec<Event>,
}

impl CompartmentedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: Vec::new(),
            registry: LocusRegistry::default(),
            events: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a compartment that a node starts in with probability `p`,
    /// and a node locus tracking it.
    pub fn add_compartment(&mut self, compartment: impl Into<Compartment>, p: f64) -> Result<()> {
        let compartment = compartment.into();
        let p = check_probability(compartment.as_str(), p)?;
        if self.registry.is_seeded() {
            return Err(Error::LateLocus(compartment.to_string()));
        }
        if !self.registry.add_compartment(compartment.clone()) {
            return Err(Error::InvalidParameter(format!("compartment {compartment} declared twice")));
        }
        self.registry.add_node_locus(compartment.as_str(), compartment.clone())?;
        self.initial.push((compartment, p));
        Ok(())
    }

    /// Track the nodes in `compartment` under an extra name.
    pub fn track_node_locus(&mut self, name: impl Into<String>, compartment: impl Into<Compartment>) -> Result<()> {
        self.registry.add_node_locus(name, compartment.into())
    }

    /// Track the pairs running from `left` to `right`.
    pub fn track_edge_locus(
        &mut self,
        name: impl Into<String>,
        left: impl Into<Compartment>,
        right: impl Into<Compartment>,
    ) -> Result<()> {
        self.registry.add_edge_locus(name, left.into(), right.into())
    }

    /// Add an event class firing at an existing locus.
    pub fn add_event(
        &mut self,
        name: impl Into<String>,
        locus: &str,
        rate: f64,
        target: Target,
        to: impl Into<Compartment>,
    ) -> Result<()> {
        let name = name.into();
        let to = to.into();
        let rate = check_rate(&name, rate)?;
        if self.events.iter().any(|e| e.name == name) {
            return Err(Error::DuplicateEvent(name));
        }

        let kind = self.registry.locus(locus)?;
        let fits = match kind {
            LocusKind::Node(_) => target == Target::Node,
            LocusKind::Edge(_) => target != Target::Node,
        };
        if !fits {
            return Err(Error::InvalidParameter(format!(
                "event {name}: target {target:?} does not fit locus {locus}"
            )));
        }
        if !self.registry.knows(&to) {
            return Err(Error::UnknownCompartment(to.to_string()));
        }

        self.events.push(Event { name, locus: locus.to_string(), rate, target, to });
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn compartments(&self) -> &[Compartment] {
        self.registry.compartments()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn registry(&self) -> &LocusRegistry {
        &self.registry
    }

    pub fn locus(&self, name: &str) -> Result<&LocusKind> {
        self.registry.locus(name)
    }

    /// Nodes per compartment, read off the node loci.
    pub fn compartment_counts(&self) -> BTreeMap<Compartment, usize> {
        self.registry
            .compartments()
            .iter()
            .map(|c| {
                let size = self.registry.get(c.as_str()).map_or(0, |l| l.len());
                (c.clone(), size)
            })
            .collect()
    }

    // ========================================================================
    // State changes
    // ========================================================================

    /// Seed every node with a compartment drawn from the declared
    /// initial probabilities, updating loci as it goes.
    pub fn initialise<N, R>(&mut self, network: &mut N, rng: &mut R) -> Result<()>
    where
        N: Network + ?Sized,
        R: Rng + ?Sized,
    {
        let total: f64 = self.initial.iter().map(|(_, p)| p).sum();
        if self.initial.is_empty() || (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(Error::InvalidParameter(format!(
                "model {}: initial probabilities sum to {total}, not 1",
                self.name
            )));
        }

        for node in network.nodes() {
            let c = self.pick_initial(rng.gen_range(0.0..1.0));
            self.registry.change_compartment(network, node, c)?;
        }

        debug!(model = %self.name, counts = ?self.compartment_counts(), "seeded network");
        Ok(())
    }

    fn pick_initial(&self, u: f64) -> Compartment {
        let mut acc = 0.0;
        for (c, p) in &self.initial {
            acc += p;
            if u < acc {
                return c.clone();
            }
        }
        // Rounding can leave `u` just past the last boundary.
        self.initial
            .iter()
            .rev()
            .find(|(_, p)| *p > 0.0)
            .map(|(c, _)| c.clone())
            .unwrap_or_else(|| self.initial[0].0.clone())
    }

    /// Move `node` into `to`, keeping every locus exact.
    pub fn change_compartment<N: Network + ?Sized>(
        &mut self,
        network: &mut N,
        node: NodeId,
        to: impl Into<Compartment>,
    ) -> Result<Option<Compartment>> {
        self.registry.change_compartment(network, node, to.into())
    }

    /// `track_node_locus` after seeding: the locus starts out filled.
    pub fn track_node_locus_now<N: Network + ?Sized>(
        &mut self,
        network: &N,
        name: impl Into<String>,
        compartment: impl Into<Compartment>,
    ) -> Result<()> {
        self.registry.add_node_locus_now(network, name, compartment.into())
    }

    /// `track_edge_locus` after seeding: the locus starts out filled.
    pub fn track_edge_locus_now<N: Network + ?Sized>(
        &mut self,
        network: &N,
        name: impl Into<String>,
        left: impl Into<Compartment>,
        right: impl Into<Compartment>,
    ) -> Result<()> {
        self.registry.add_edge_locus_now(network, name, left.into(), right.into())
    }
}

// ============================================================================
// Parameter checks
// ============================================================================

pub(crate) fn check_probability(name: &str, p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(Error::InvalidParameter(format!("{name}: probability {p} outside [0, 1]")))
    }
}

pub(crate) fn check_rate(name: &str, r: f64) -> Result<f64> {
    if r.is_finite() && r >= 0.0 {
        Ok(r)
    } else {
        Err(Error::InvalidParameter(format!("{name}: rate {r} must be finite and non-negative")))
    }
}
