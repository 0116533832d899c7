//! Susceptible–Infected–Removed.

use serde::{Deserialize, Serialize};

use crate::Result;
use super::{CompartmentedModel, Target, check_probability, check_rate};

pub const SUSCEPTIBLE: &str = "S";
pub const INFECTED: &str = "I";
pub const REMOVED: &str = "R";

/// Edges from a susceptible node to an infected one.
pub const SI: &str = "SI";

/// SIR parameters, keyed the way experiment files spell them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SirParams {
    /// Infection rate per SI edge.
    pub p_infect: f64,
    /// Fraction of nodes initially infected.
    pub p_infected: f64,
    /// Removal rate per infected node.
    pub p_remove: f64,
}

impl SirParams {
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_rate("pInfect", self.p_infect)?;
        check_probability("pInfected", self.p_infected)?;
        check_rate("pRemove", self.p_remove)?;
        Ok(())
    }
}

/// Build an SIR model: S, I and R node loci, an SI edge locus, infection
/// of the susceptible end of an SI edge and removal of infected nodes.
pub fn build(params: &SirParams) -> Result<CompartmentedModel> {
    params.validate()?;

    let mut m = CompartmentedModel::new("SIR");
    m.add_compartment(SUSCEPTIBLE, 1.0 - params.p_infected)?;
    m.add_compartment(INFECTED, params.p_infected)?;
    m.add_compartment(REMOVED, 0.0)?;
    m.track_edge_locus(SI, SUSCEPTIBLE, INFECTED)?;

    m.add_event("infect", SI, params.p_infect, Target::Tail, INFECTED)?;
    m.add_event("remove", INFECTED, params.p_remove, Target::Node, REMOVED)?;
    Ok(m)
}
