//! # Stochastic Dynamics
//!
//! Gillespie simulation of a compartmented model on a network:
//!
//! - State = the network's compartment labels
//! - Events = the model's event classes
//! - Rate of an event class = its per-element rate × the size of its locus
//!
//! Each step draws a waiting time from the total rate, picks an event
//! class in proportion to its rate, draws an element uniformly from that
//! class's locus and applies the event to it. The loci keep themselves
//! exact, so a step costs O(events + degree) rather than a rescan.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::compartmented::CompartmentedModel;
use crate::locus::Locus;
use crate::model::*;
use crate::network::Network;
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// When to stop a run that hasn't died out on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicsConfig {
    /// Simulated time limit.
    pub t_max: f64,
    /// Cap on the number of events fired.
    pub max_events: Option<u64>,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            t_max: 1000.0,
            max_events: None,
        }
    }
}

impl DynamicsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.t_max.is_nan() || self.t_max <= 0.0 {
            return Err(Error::InvalidParameter(format!("tMax {} must be positive", self.t_max)));
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every event class had an empty locus or zero rate.
    Exhausted,
    /// The next event would have happened after `t_max`.
    TimeLimit,
    /// `max_events` were fired.
    EventLimit,
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Fired { event: String, node: NodeId, time: f64 },
    Stopped(Termination),
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsResult {
    pub time: f64,
    pub events: u64,
    /// Events fired, per event class.
    pub fired: BTreeMap<String, u64>,
    /// Final nodes per compartment.
    pub counts: BTreeMap<Compartment, usize>,
    pub termination: Termination,
}

// ============================================================================
// StochasticDynamics
// ============================================================================

/// A model running on a network.
pub struct StochasticDynamics<N: Network> {
    model: CompartmentedModel,
    network: N,
    config: DynamicsConfig,
    time: f64,
    events: u64,
    fired: BTreeMap<String, u64>,
}

impl<N: Network> StochasticDynamics<N> {
    pub fn new(model: CompartmentedModel, network: N, config: DynamicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            network,
            config,
            time: 0.0,
            events: 0,
            fired: BTreeMap::new(),
        })
    }

    pub fn model(&self) -> &CompartmentedModel {
        &self.model
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn into_parts(self) -> (CompartmentedModel, N) {
        (self.model, self.network)
    }

    /// Seed the network from the model's initial probabilities.
    pub fn set_up<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.time = 0.0;
        self.events = 0;
        self.fired.clear();
        self.model.initialise(&mut self.network, rng)
    }

    /// Current rate of every event class, in model order.
    pub fn rates(&self) -> Result<SmallVec<[f64; 8]>> {
        self.model
            .events()
            .iter()
            .map(|e| -> Result<f64> { Ok(e.rate * self.model.locus(&e.locus)?.len() as f64) })
            .collect()
    }

    /// Fire one event, or report why none can fire.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step> {
        let rates = self.rates()?;
        let total: f64 = rates.iter().sum();
        if !total.is_finite() {
            return Err(Error::InvalidParameter(format!("total event rate {total} is not finite")));
        }
        if total <= 0.0 {
            return Ok(Step::Stopped(Termination::Exhausted));
        }

        // u is in [0, 1), so 1 - u is never zero.
        let u: f64 = rng.gen_range(0.0..1.0);
        let dt = -(1.0 - u).ln() / total;
        if self.time + dt > self.config.t_max {
            self.time = self.config.t_max;
            return Ok(Step::Stopped(Termination::TimeLimit));
        }
        self.time += dt;

        let idx = choose(&rates, rng.gen_range(0.0..1.0) * total);
        let event = &self.model.events()[idx];
        let (name, target, to) = (event.name.clone(), event.target, event.to.clone());

        let element = self.model.locus(&event.locus)?.draw(rng)?;
        let node = target.select(element).ok_or_else(|| {
            Error::InvalidParameter(format!("event {name}: target {target:?} does not fit element {element}"))
        })?;

        trace!(event = %name, %element, %node, time = self.time, "firing event");
        self.model.change_compartment(&mut self.network, node, to)?;

        self.events += 1;
        *self.fired.entry(name.clone()).or_insert(0) += 1;
        Ok(Step::Fired { event: name, node, time: self.time })
    }

    /// Step until the dynamics dies out or hits a configured limit.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DynamicsResult> {
        let termination = loop {
            if self.config.max_events.is_some_and(|max| self.events >= max) {
                break Termination::EventLimit;
            }
            if let Step::Stopped(why) = self.step(rng)? {
                break why;
            }
        };

        debug!(
            model = %self.model.name(),
            time = self.time,
            events = self.events,
            ?termination,
            "dynamics finished"
        );

        Ok(DynamicsResult {
            time: self.time,
            events: self.events,
            fired: self.fired.clone(),
            counts: self.model.compartment_counts(),
            termination,
        })
    }
}

/// Index of the event class whose cumulative-rate slot contains `x`.
/// Classes with zero rate are never chosen.
fn choose(rates: &[f64], x: f64) -> usize {
    let mut acc = 0.0;
    let mut last = 0;
    for (i, &r) in rates.iter().enumerate() {
        if r <= 0.0 {
            continue;
        }
        acc += r;
        last = i;
        if x < acc {
            return i;
        }
    }
    last
}
