//! Per-agent growth rule.
//!
//! The rule is a pure function of one agent's current fields. It is evaluated
//! once per agent per step and never touches any other agent, so the caller may
//! evaluate the whole population in parallel.

use crate::agent::Agent;
use cryo_cell_common::SimParams;

/// The update rule an agent was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthRule {
    /// Volume change only.
    Basic,
    /// Volume change plus cooling and permeability recomputation while shrinking.
    Thermal,
}

/// Branch the rule takes for an agent's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    Growing,
    Shrinking,
    Equilibrium,
    Balanced,
}

/// New thermal values produced by a cooling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalUpdate {
    pub temperature: f64,
    pub permeability: f64,
}

/// Result of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDelta {
    /// Volume change rate to apply this step (before the time-step multiplier).
    pub volume_rate: f64,
    /// Present only when the agent cooled this step.
    pub thermal: Option<ThermalUpdate>,
}

impl StepDelta {
    fn volume(volume_rate: f64) -> Self {
        Self { volume_rate, thermal: None }
    }
}

/// Classifies an agent by the sign of its growth rate and its distance to the shrink floor.
pub fn phase(agent: &Agent, params: &SimParams) -> GrowthPhase {
    let growth = agent.growth();
    if growth.growth_rate > 0.0 {
        GrowthPhase::Growing
    } else if growth.growth_rate < 0.0 {
        if agent.diameter() > params.rule.shrink_floor(growth.initial_radius) {
            GrowthPhase::Shrinking
        } else {
            GrowthPhase::Equilibrium
        }
    } else {
        GrowthPhase::Balanced
    }
}

impl GrowthRule {
    /// Computes this step's change for `agent` without mutating it.
    pub fn evaluate(self, agent: &Agent, params: &SimParams) -> StepDelta {
        let rate = agent.growth().growth_rate;
        match phase(agent, params) {
            GrowthPhase::Growing => StepDelta::volume(rate * params.rule.scale_factor),
            GrowthPhase::Shrinking => {
                let mut delta = StepDelta::volume(rate * params.rule.scale_factor);
                if self == GrowthRule::Thermal {
                    delta.thermal = cool(agent, params);
                }
                delta
            }
            GrowthPhase::Equilibrium => StepDelta::volume(params.rule.equilibrium_delta),
            GrowthPhase::Balanced => StepDelta::volume(params.rule.balance_delta),
        }
    }
}

// Agents without thermal state, or already at the cutoff, keep their values.
fn cool(agent: &Agent, params: &SimParams) -> Option<ThermalUpdate> {
    let state = agent.thermal()?;
    if state.temperature <= params.arrhenius.cooling_cutoff {
        return None;
    }
    let temperature = state.temperature - state.cooling_rate;
    let permeability = params
        .arrhenius
        .permeability(state.initial_permeability, temperature);
    Some(ThermalUpdate { temperature, permeability })
}

/// Evaluates the agent's own rule and applies the result in place.
pub fn step_agent(agent: &mut Agent, params: &SimParams) -> StepDelta {
    let delta = agent.rule().evaluate(agent, params);
    agent.apply(&delta, params.time_step, params.min_volume);
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{GrowthParams, ThermalState};
    use cryo_cell_common::Vec3;

    fn thermal_agent(rate: f64, diameter: f64, initial_radius: f64, temperature: f64) -> Agent {
        Agent::new(
            Vec3::zero(),
            diameter,
            GrowthParams { growth_rate: rate, initial_radius },
            Some(ThermalState {
                temperature,
                cooling_rate: 1.0,
                permeability: 20.0,
                initial_permeability: 20.0,
            }),
            GrowthRule::Thermal,
        )
        .unwrap()
    }

    fn basic_agent(rate: f64, diameter: f64, initial_radius: f64) -> Agent {
        Agent::new(
            Vec3::zero(),
            diameter,
            GrowthParams { growth_rate: rate, initial_radius },
            None,
            GrowthRule::Basic,
        )
        .unwrap()
    }

    #[test]
    fn growing_agent_gets_scaled_rate() {
        let mut params = SimParams::default();
        params.rule.scale_factor = 100.0;
        let agent = thermal_agent(0.5, 10.0, 10.0, 274.0);
        let delta = GrowthRule::Thermal.evaluate(&agent, &params);
        assert_eq!(delta.volume_rate, 50.0);
        assert_eq!(delta.thermal, None);
    }

    #[test]
    fn shrinking_above_floor_cools_and_recomputes_permeability() {
        let params = SimParams::default();
        let agent = thermal_agent(-1.0, 40.0, 40.0, 274.0);
        let delta = GrowthRule::Thermal.evaluate(&agent, &params);
        assert_eq!(delta.volume_rate, -1.0);
        let update = delta.thermal.unwrap();
        assert_eq!(update.temperature, 273.0);
        assert_eq!(update.permeability, params.arrhenius.permeability(20.0, 273.0));
    }

    #[test]
    fn shrinking_at_cutoff_leaves_temperature_alone() {
        let params = SimParams::default();
        let agent = thermal_agent(-1.0, 40.0, 40.0, 263.0);
        let delta = GrowthRule::Thermal.evaluate(&agent, &params);
        assert_eq!(delta.volume_rate, -1.0);
        assert_eq!(delta.thermal, None);
    }

    #[test]
    fn equilibrium_ignores_rate_magnitude() {
        let params = SimParams::default();
        for rate in [-0.001, -30.0, -1e6] {
            let agent = thermal_agent(rate, 27.0, 40.0, 274.0);
            assert_eq!(phase(&agent, &params), GrowthPhase::Equilibrium);
            let delta = GrowthRule::Thermal.evaluate(&agent, &params);
            assert_eq!(delta.volume_rate, params.rule.equilibrium_delta);
            assert_eq!(delta.thermal, None);
        }
    }

    #[test]
    fn zero_rate_uses_balance_delta() {
        let mut params = SimParams::default();
        let agent = basic_agent(0.0, 12.0, 12.0);
        assert_eq!(GrowthRule::Basic.evaluate(&agent, &params).volume_rate, 0.0);
        params.rule.balance_delta = 1.0;
        assert_eq!(GrowthRule::Basic.evaluate(&agent, &params).volume_rate, 1.0);
    }

    #[test]
    fn basic_rule_never_touches_thermal_state() {
        let params = SimParams::default();
        let mut agent = Agent::new(
            Vec3::zero(),
            40.0,
            GrowthParams { growth_rate: -1.0, initial_radius: 40.0 },
            Some(ThermalState {
                temperature: 274.0,
                cooling_rate: 1.0,
                permeability: 20.0,
                initial_permeability: 20.0,
            }),
            GrowthRule::Basic,
        )
        .unwrap();
        let delta = step_agent(&mut agent, &params);
        assert_eq!(delta.thermal, None);
        assert_eq!(agent.thermal().unwrap().temperature, 274.0);
    }

    #[test]
    fn thermal_rule_without_thermal_state_acts_like_basic() {
        let params = SimParams::default();
        let agent = Agent::new(
            Vec3::zero(),
            40.0,
            GrowthParams { growth_rate: -2.0, initial_radius: 40.0 },
            None,
            GrowthRule::Thermal,
        )
        .unwrap();
        assert_eq!(
            GrowthRule::Thermal.evaluate(&agent, &params),
            GrowthRule::Basic.evaluate(&agent, &params)
        );
    }

    #[test]
    fn growing_step_changes_only_volume() {
        let params = SimParams::default();
        let mut agent = thermal_agent(3.0, 10.0, 10.0, 274.0);
        let before = agent.clone();
        step_agent(&mut agent, &params);
        assert!((agent.volume() - before.volume() - 3.0).abs() < 1e-9);
        assert_eq!(agent.thermal(), before.thermal());
        assert_eq!(agent.growth(), before.growth());
        assert_eq!(agent.position, before.position);
    }
}
