//! Susceptible–Infected–Susceptible.

use serde::{Deserialize, Serialize};

use crate::Result;
use super::{CompartmentedModel, Target, check_probability, check_rate};
use super::sir::{INFECTED, SI, SUSCEPTIBLE};

/// SIS parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SisParams {
    pub p_infect: f64,
    pub p_infected: f64,
    /// Recovery rate per infected node; recovered nodes are susceptible again.
    pub p_recover: f64,
}

impl SisParams {
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        check_rate("pInfect", self.p_infect)?;
        check_probability("pInfected", self.p_infected)?;
        check_rate("pRecover", self.p_recover)?;
        Ok(())
    }
}

pub fn build(params: &SisParams) -> Result<CompartmentedModel> {
    params.validate()?;

    let mut m = CompartmentedModel::new("SIS");
    m.add_compartment(SUSCEPTIBLE, 1.0 - params.p_infected)?;
    m.add_compartment(INFECTED, params.p_infected)?;
    m.track_edge_locus(SI, SUSCEPTIBLE, INFECTED)?;

    m.add_event("infect", SI, params.p_infect, Target::Tail, INFECTED)?;
    m.add_event("recover", INFECTED, params.p_recover, Target::Node, SUSCEPTIBLE)?;
    Ok(m)
}
