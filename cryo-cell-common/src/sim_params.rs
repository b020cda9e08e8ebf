use serde::{Deserialize, Serialize};

/// Smallest volume an agent may reach; keeps the derived diameter strictly positive.
pub const MIN_AGENT_VOLUME: f64 = 5.2359877e-7;

/// Constants of the per-agent growth rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Multiplier applied to the raw growth-rate coefficient in the growing and shrinking branches.
    pub scale_factor: f64,
    /// Fraction of the initial radius below which a shrinking agent stops shrinking.
    pub shrink_floor_fraction: f64,
    /// Volume rate applied once a shrinking agent has reached the floor.
    pub equilibrium_delta: f64,
    /// Volume rate applied when the growth-rate coefficient is exactly zero.
    pub balance_delta: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        RuleParams {
            scale_factor: 1.0,
            shrink_floor_fraction: 0.7,
            equilibrium_delta: 1.0,
            balance_delta: 0.0,
        }
    }
}

impl RuleParams {
    /// Diameter at or below which the agent is at osmotic equilibrium.
    #[inline]
    pub fn shrink_floor(&self, initial_radius: f64) -> f64 {
        self.shrink_floor_fraction * initial_radius
    }
}

/// Constants of the temperature-dependent permeability relation.
///
/// The defaults are the values the cooling scenarios were tuned with; they are
/// placeholders and carry no physical calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusParams {
    pub activation_energy: f64,
    pub gas_constant: f64,
    pub reference_temperature: f64,
    /// Temperature at or below which cooling stops.
    pub cooling_cutoff: f64,
}

impl Default for ArrheniusParams {
    fn default() -> Self {
        ArrheniusParams {
            activation_energy: 1.0,
            gas_constant: 1.0,
            reference_temperature: 274.0,
            cooling_cutoff: 263.0,
        }
    }
}

impl ArrheniusParams {
    /// `Lp0 * exp((-Ea / R) * (1/T - 1/T_ref))`
    pub fn permeability(&self, initial_permeability: f64, temperature: f64) -> f64 {
        let exponent = (-self.activation_energy / self.gas_constant)
            * (1.0 / temperature - 1.0 / self.reference_temperature);
        initial_permeability * exponent.exp()
    }
}

/// Simulation parameters derived from the configuration, used during every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // World
    pub min_bound: f64,
    pub max_bound: f64,

    // Time
    pub time_step: f64,

    // Growth
    pub rule: RuleParams,
    pub arrhenius: ArrheniusParams,
    pub min_volume: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            min_bound: 0.0,
            max_bound: 100.0,
            time_step: 1.0,
            rule: RuleParams::default(),
            arrhenius: ArrheniusParams::default(),
            min_volume: MIN_AGENT_VOLUME,
        }
    }
}
