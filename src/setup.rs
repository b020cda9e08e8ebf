use anyhow::{Context, Result};
use crate::agent::{derive_growth_rate, Agent, GrowthParams, ThermalState};
use crate::population::AgentPopulation;
use crate::rule::GrowthRule;
use cryo_cell_common::{
    GrowthRateConfig, PopulationConfig, RuleKind, SimParams, SimulationConfig, Vec3,
};
use log::{debug, info};
use rand::distr::Uniform;
use rand::prelude::*;

/// Seeds every configured population block and commits the result.
pub fn seed_population(config: &SimulationConfig, rng: &mut StdRng) -> Result<AgentPopulation> {
    let params = config.get_sim_params();
    let mut population = AgentPopulation::new();
    population.reserve(config.total_agents());

    for block in &config.populations {
        seed_block(block, config, &params, rng, &mut population)
            .with_context(|| format!("Failed to seed population '{}'", block.name))?;
    }

    let committed = population.commit();
    info!("Seeded {} agents in {} populations.", committed, config.populations.len());
    Ok(population)
}

fn seed_block(
    block: &PopulationConfig,
    config: &SimulationConfig,
    params: &SimParams,
    rng: &mut StdRng,
    population: &mut AgentPopulation,
) -> Result<()> {
    let bounds = (params.min_bound, params.max_bound);
    let dist_x = axis_distribution(block.x_range.unwrap_or(bounds))?;
    let dist_y = axis_distribution(block.y_range.unwrap_or(bounds))?;
    let dist_z = axis_distribution(block.z_range.unwrap_or(bounds))?;

    let (thermal, rule) = match block.rule {
        RuleKind::Basic => (None, GrowthRule::Basic),
        RuleKind::Thermal => (Some(initial_thermal_state(block, params)?), GrowthRule::Thermal),
    };
    let growth_rate = growth_rate_for(block, thermal.as_ref(), params)?;
    let growth = GrowthParams { growth_rate, initial_radius: block.diameter };
    debug!(
        "Population '{}': {} agents, diameter {}, growth rate {:.4}, rule {:?}.",
        block.name, block.count, block.diameter, growth_rate, rule
    );

    for _ in 0..block.count {
        let mut position =
            Vec3::new(rng.sample(&dist_x), rng.sample(&dist_y), rng.sample(&dist_z));
        if config.universe.bound_space {
            position = position.clamp_to_cube(params.min_bound, params.max_bound);
        }
        let agent = Agent::new(position, block.diameter, growth, thermal, rule)?
            .with_adherence(block.adherence);
        population.push(agent);
    }
    Ok(())
}

fn axis_distribution((lo, hi): (f64, f64)) -> Result<Uniform<f64>> {
    Uniform::new_inclusive(lo, hi)
        .map_err(|e| anyhow::anyhow!("Invalid placement range [{}, {}]: {}", lo, hi, e))
}

/// Thermal state at creation. Permeability starts at its value at the reference
/// temperature, whatever the starting temperature; cooling moves it from there.
fn initial_thermal_state(block: &PopulationConfig, params: &SimParams) -> Result<ThermalState> {
    let (Some(temperature), Some(cooling_rate), Some(initial_permeability)) =
        (block.temperature, block.cooling_rate, block.initial_permeability)
    else {
        anyhow::bail!("thermal rule needs temperature, cooling_rate and initial_permeability.");
    };
    Ok(ThermalState {
        temperature,
        cooling_rate,
        permeability: params
            .arrhenius
            .permeability(initial_permeability, params.arrhenius.reference_temperature),
        initial_permeability,
    })
}

fn growth_rate_for(
    block: &PopulationConfig,
    thermal: Option<&ThermalState>,
    params: &SimParams,
) -> Result<f64> {
    match block.growth_rate {
        GrowthRateConfig::Fixed { value } => Ok(value),
        GrowthRateConfig::Derived { area, osmotic_difference } => {
            let Some(state) = thermal else {
                anyhow::bail!("a derived growth rate requires the thermal rule.");
            };
            Ok(derive_growth_rate(
                state.permeability,
                area,
                params.arrhenius.gas_constant,
                state.temperature - state.cooling_rate,
                osmotic_difference,
            ))
        }
    }
}
