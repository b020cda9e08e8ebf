use anyhow::Result;
use crate::rule::{GrowthRule, StepDelta};
use cryo_cell_common::{AgentRecord, Vec3};
use std::f64::consts::PI;

/// Growth parameters fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthParams {
    /// Signed rate coefficient; its sign selects the grow/shrink/balance branch.
    pub growth_rate: f64,
    /// Reference radius for the shrink floor.
    pub initial_radius: f64,
}

/// Thermal state carried only by agents using the thermal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalState {
    pub temperature: f64,
    /// Temperature decrement per shrinking step.
    pub cooling_rate: f64,
    pub permeability: f64,
    pub initial_permeability: f64,
}

/// A simulated cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec3,
    diameter: f64,
    volume: f64,
    growth: GrowthParams,
    thermal: Option<ThermalState>,
    /// Passed through for the mechanics layer; unused by the growth rule.
    pub adherence: Option<f64>,
    rule: GrowthRule,
}

impl Agent {
    /// Builds an agent, rejecting non-finite or non-positive sizes.
    pub fn new(
        position: Vec3,
        diameter: f64,
        growth: GrowthParams,
        thermal: Option<ThermalState>,
        rule: GrowthRule,
    ) -> Result<Self> {
        if !diameter.is_finite() || diameter <= 0.0 {
            anyhow::bail!("agent diameter must be positive, got {}", diameter);
        }
        if !growth.initial_radius.is_finite() || growth.initial_radius <= 0.0 {
            anyhow::bail!("agent initial radius must be positive, got {}", growth.initial_radius);
        }
        if !growth.growth_rate.is_finite() {
            anyhow::bail!("agent growth rate must be finite, got {}", growth.growth_rate);
        }
        if let Some(t) = &thermal {
            if ![t.temperature, t.cooling_rate, t.permeability, t.initial_permeability]
                .iter()
                .all(|v| v.is_finite())
            {
                anyhow::bail!("agent thermal state must be finite: {:?}", t);
            }
        }

        Ok(Self {
            position,
            diameter,
            volume: sphere_volume(diameter),
            growth,
            thermal,
            adherence: None,
            rule,
        })
    }

    pub fn with_adherence(mut self, adherence: Option<f64>) -> Self {
        self.adherence = adherence;
        self
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn growth(&self) -> &GrowthParams {
        &self.growth
    }

    pub fn thermal(&self) -> Option<&ThermalState> {
        self.thermal.as_ref()
    }

    pub fn rule(&self) -> GrowthRule {
        self.rule
    }

    /// Adds `rate * time_step` to the volume and recomputes the diameter of the
    /// equivalent sphere. The volume never falls below `min_volume`.
    pub fn change_volume(&mut self, rate: f64, time_step: f64, min_volume: f64) {
        self.volume += rate * time_step;
        if self.volume < min_volume {
            self.volume = min_volume;
        }
        self.diameter = sphere_diameter(self.volume);
    }

    /// Commits a rule result to this agent.
    pub fn apply(&mut self, delta: &StepDelta, time_step: f64, min_volume: f64) {
        self.change_volume(delta.volume_rate, time_step, min_volume);
        if let (Some(update), Some(state)) = (delta.thermal, self.thermal.as_mut()) {
            state.temperature = update.temperature;
            state.permeability = update.permeability;
        }
    }

    pub fn record(&self) -> AgentRecord {
        AgentRecord {
            position: self.position,
            diameter: self.diameter,
            volume: self.volume,
            growth_rate: self.growth.growth_rate,
            temperature: self.thermal.map(|t| t.temperature),
            permeability: self.thermal.map(|t| t.permeability),
        }
    }
}

/// Product of hydraulic permeability, membrane area, gas constant, temperature
/// and osmotic difference.
pub fn derive_growth_rate(
    permeability: f64,
    area: f64,
    gas_constant: f64,
    temperature: f64,
    osmotic_difference: f64,
) -> f64 {
    permeability * area * gas_constant * temperature * osmotic_difference
}

#[inline]
pub fn sphere_volume(diameter: f64) -> f64 {
    PI / 6.0 * diameter.powi(3)
}

#[inline]
pub fn sphere_diameter(volume: f64) -> f64 {
    (6.0 * volume / PI).cbrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(diameter: f64, rate: f64) -> Agent {
        Agent::new(
            Vec3::zero(),
            diameter,
            GrowthParams { growth_rate: rate, initial_radius: diameter },
            None,
            GrowthRule::Basic,
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_non_positive_sizes() {
        let growth = GrowthParams { growth_rate: 1.0, initial_radius: 10.0 };
        assert!(Agent::new(Vec3::zero(), 0.0, growth, None, GrowthRule::Basic).is_err());
        assert!(Agent::new(Vec3::zero(), -3.0, growth, None, GrowthRule::Basic).is_err());
        let no_radius = GrowthParams { growth_rate: 1.0, initial_radius: 0.0 };
        assert!(Agent::new(Vec3::zero(), 10.0, no_radius, None, GrowthRule::Basic).is_err());
        let nan_rate = GrowthParams { growth_rate: f64::NAN, initial_radius: 10.0 };
        assert!(Agent::new(Vec3::zero(), 10.0, nan_rate, None, GrowthRule::Basic).is_err());
    }

    #[test]
    fn volume_and_diameter_stay_consistent() {
        let mut agent = basic(40.0, 0.0);
        assert!((sphere_diameter(agent.volume()) - 40.0).abs() < 1e-9);
        agent.change_volume(500.0, 1.0, 1e-6);
        assert!((agent.volume() - (sphere_volume(40.0) + 500.0)).abs() < 1e-6);
        assert!(agent.diameter() > 40.0);
        assert!((sphere_volume(agent.diameter()) - agent.volume()).abs() < 1e-6);
    }

    #[test]
    fn change_volume_scales_by_time_step() {
        let mut agent = basic(10.0, 0.0);
        let before = agent.volume();
        agent.change_volume(-30.0, 0.01, 1e-6);
        assert!((agent.volume() - (before - 0.3)).abs() < 1e-9);
    }

    #[test]
    fn change_volume_clamps_to_minimum() {
        let mut agent = basic(1.0, 0.0);
        agent.change_volume(-1e9, 1.0, 1e-3);
        assert_eq!(agent.volume(), 1e-3);
        assert!(agent.diameter() > 0.0);
    }

    #[test]
    fn derived_growth_rate_is_the_plain_product() {
        assert_eq!(derive_growth_rate(20.0, 1.0, 1.0, 273.0, -1.0), -5460.0);
    }
}
