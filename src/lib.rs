//! # epiloci: Loci for Compartmented Processes on Networks
//!
//! Keeps, incrementally, the sets of nodes and directed node pairs that
//! satisfy compartment predicates while a stochastic process relabels
//! nodes, so the process can sample "where the next event happens" in
//! O(1) and pay only O(degree) per relabelling.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `Network` is the contract between loci and graph storage
//! 2. **Closed variants**: `LocusKind` is an enum over node and edge loci, dispatched by `match`
//! 3. **Loci own only membership**: node data and topology stay in the network
//! 4. **One dispatch path**: every relabelling goes through `LocusRegistry::change_compartment`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use epiloci::{MemoryNetwork, StochasticDynamics, DynamicsConfig};
//! use epiloci::compartmented::sir::{self, SirParams};
//! use rand::SeedableRng;
//!
//! # fn example() -> epiloci::Result<()> {
//! let network = MemoryNetwork::from_edges(false, [(1u64, 2u64), (2, 3), (1, 4), (3, 4)]);
//! let params = SirParams::from_json(r#"{"pInfect": 0.1, "pInfected": 0.25, "pRemove": 0.05}"#)?;
//!
//! let mut sim = StochasticDynamics::new(sir::build(&params)?, network, DynamicsConfig::default())?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! sim.set_up(&mut rng)?;
//! let result = sim.run(&mut rng)?;
//! println!("{:?}", result.counts);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod network;
pub mod locus;
pub mod registry;
pub mod compartmented;
pub mod dynamics;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Compartment, Direction, Incidence, NodeId};

// ============================================================================
// Re-exports: Network
// ============================================================================

pub use network::{MemoryNetwork, Network};

// ============================================================================
// Re-exports: Loci
// ============================================================================

pub use locus::{EdgeLocus, Element, Locus, LocusKind, LocusSet, NodeLocus};
pub use registry::LocusRegistry;

// ============================================================================
// Re-exports: Models and dynamics
// ============================================================================

pub use compartmented::{CompartmentedModel, Event, Target};
pub use dynamics::{DynamicsConfig, DynamicsResult, StochasticDynamics, Termination};

// ============================================================================
// Error Types
// ============================================================================

/// Recoverable failures. A locus observing an impossible network state
/// panics instead: that is a dispatch bug, not something to handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Locus {0} is empty")]
    EmptyLocus(String),

    #[error("Unknown compartment: {0}")]
    UnknownCompartment(String),

    #[error("Unknown locus: {0}")]
    UnknownLocus(String),

    #[error("Duplicate locus: {0}")]
    DuplicateLocus(String),

    #[error("Locus {0} registered after seeding; use the _now variant")]
    LateLocus(String),

    #[error("Duplicate event: {0}")]
    DuplicateEvent(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
