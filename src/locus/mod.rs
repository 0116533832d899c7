//! # Loci
//!
//! A locus is a named set of nodes or directed node pairs that satisfy a
//! compartment predicate, kept exact as nodes change compartment. The
//! simulation samples loci to decide where the next event happens.
//!
//! | Locus | Element | Predicate |
//! |-------|---------|-----------|
//! | `NodeLocus` | `NodeId` | node is in `C` |
//! | `EdgeLocus` | `(NodeId, NodeId)` | edge `u → v`, `u` in `L`, `v` in `R` |
//!
//! The registry owns loci as the closed variant `LocusKind`, so dispatch
//! is a `match` rather than a vtable.

pub mod set;
pub mod node;
pub mod edge;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::*;
use crate::network::Network;
use crate::Result;

pub use set::LocusSet;
pub use node::NodeLocus;
pub use edge::{EdgeLocus, Pair};

// ============================================================================
// Locus Trait
// ============================================================================

/// What every locus can do.
///
/// The handlers are pure membership updates. The registry calls
/// `on_leave` for the old compartment and then `on_enter` for the new
/// one, after the network already reports the new label.
pub trait Locus {
    type Element;

    type Iter<'a>: Iterator<Item = Self::Element> + ExactSizeIterator
    where
        Self: 'a;

    fn name(&self) -> &str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, element: &Self::Element) -> bool;

    /// Read-only view of the current members, in no particular order.
    fn elements(&self) -> Self::Iter<'_>;

    /// Compartments whose changes this locus must hear about.
    fn compartments(&self) -> SmallVec<[&Compartment; 2]>;

    /// Uniformly random member, left in place. `EmptyLocus` if there is none.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self::Element>;

    fn clear(&mut self);

    /// `node` has left `from`.
    fn on_leave<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, from: &Compartment) -> Result<()>;

    /// `node` has entered `to`.
    fn on_enter<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, to: &Compartment) -> Result<()>;

    /// Repopulate from scratch by replaying every labelled node as an enter.
    fn rebuild<N: Network + ?Sized>(&mut self, network: &N) -> Result<()> {
        self.clear();
        for node in network.nodes() {
            if let Some(c) = network.compartment(node) {
                self.on_enter(network, node, c)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Elements
// ============================================================================

/// A member of some locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Node(NodeId),
    Edge(NodeId, NodeId),
}

impl Element {
    pub fn as_node(&self) -> Option<NodeId> {
        match *self {
            Element::Node(n) => Some(n),
            Element::Edge(..) => None,
        }
    }

    pub fn as_edge(&self) -> Option<Pair> {
        match *self {
            Element::Edge(u, v) => Some((u, v)),
            Element::Node(_) => None,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Node(n) => write!(f, "{n}"),
            Element::Edge(u, v) => write!(f, "({u}, {v})"),
        }
    }
}

/// Iterator over a locus' members, in no particular order.
pub enum Elements<'a> {
    Node(std::slice::Iter<'a, NodeId>),
    Edge(std::slice::Iter<'a, Pair>),
}

impl Iterator for Elements<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        match self {
            Elements::Node(it) => it.next().map(|&n| Element::Node(n)),
            Elements::Edge(it) => it.next().map(|&(u, v)| Element::Edge(u, v)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Elements::Node(it) => it.size_hint(),
            Elements::Edge(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Elements<'_> {}

// ============================================================================
// LocusKind
// ============================================================================

/// Either kind of locus, as held by the registry.
#[derive(Debug, Clone)]
pub enum LocusKind {
    Node(NodeLocus),
    Edge(EdgeLocus),
}

impl LocusKind {
    pub fn as_node_locus(&self) -> Option<&NodeLocus> {
        match self {
            LocusKind::Node(l) => Some(l),
            LocusKind::Edge(_) => None,
        }
    }

    pub fn as_edge_locus(&self) -> Option<&EdgeLocus> {
        match self {
            LocusKind::Edge(l) => Some(l),
            LocusKind::Node(_) => None,
        }
    }
}

impl From<NodeLocus> for LocusKind {
    fn from(locus: NodeLocus) -> Self {
        LocusKind::Node(locus)
    }
}

impl From<EdgeLocus> for LocusKind {
    fn from(locus: EdgeLocus) -> Self {
        LocusKind::Edge(locus)
    }
}

impl Locus for LocusKind {
    type Element = Element;
    type Iter<'a> = Elements<'a>;

    fn name(&self) -> &str {
        match self {
            LocusKind::Node(l) => l.name(),
            LocusKind::Edge(l) => l.name(),
        }
    }

    fn len(&self) -> usize {
        match self {
            LocusKind::Node(l) => l.len(),
            LocusKind::Edge(l) => l.len(),
        }
    }

    fn contains(&self, element: &Element) -> bool {
        match (self, element) {
            (LocusKind::Node(l), Element::Node(n)) => l.contains(n),
            (LocusKind::Edge(l), Element::Edge(u, v)) => l.contains(&(*u, *v)),
            _ => false,
        }
    }

    fn elements(&self) -> Elements<'_> {
        match self {
            LocusKind::Node(l) => Elements::Node(l.members().iter()),
            LocusKind::Edge(l) => Elements::Edge(l.members().iter()),
        }
    }

    fn compartments(&self) -> SmallVec<[&Compartment; 2]> {
        match self {
            LocusKind::Node(l) => l.compartments(),
            LocusKind::Edge(l) => l.compartments(),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Element> {
        match self {
            LocusKind::Node(l) => l.draw(rng).map(Element::Node),
            LocusKind::Edge(l) => l.draw(rng).map(|(u, v)| Element::Edge(u, v)),
        }
    }

    fn clear(&mut self) {
        match self {
            LocusKind::Node(l) => l.clear(),
            LocusKind::Edge(l) => l.clear(),
        }
    }

    fn on_leave<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, from: &Compartment) -> Result<()> {
        match self {
            LocusKind::Node(l) => l.on_leave(network, node, from),
            LocusKind::Edge(l) => l.on_leave(network, node, from),
        }
    }

    fn on_enter<N: Network + ?Sized>(&mut self, network: &N, node: NodeId, to: &Compartment) -> Result<()> {
        match self {
            LocusKind::Node(l) => l.on_enter(network, node, to),
            LocusKind::Edge(l) => l.on_enter(network, node, to),
        }
    }
}
