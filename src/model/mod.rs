//! # Network Model
//!
//! Plain data shared by every layer: node identifiers, compartment labels,
//! and the incidence records a network hands out when asked about a node.
//!
//! Design rule: nothing in here knows about loci or the registry.
//! This module is pure data: no state, no randomness.

pub mod node;
pub mod compartment;
pub mod edge;

pub use node::NodeId;
pub use compartment::Compartment;
pub use edge::{Direction, Incidence, Orientations, orientations};
