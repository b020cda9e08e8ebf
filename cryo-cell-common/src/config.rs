use anyhow::Result;
use crate::sim_params::{ArrheniusParams, RuleParams, SimParams, MIN_AGENT_VOLUME};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Configuration for the simulation box
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UniverseConfig {
    pub min_bound: f64,
    pub max_bound: f64,
    /// Clamp seeded positions into the box.
    #[serde(default = "default_bound_space")]
    pub bound_space: bool,
}

fn default_bound_space() -> bool {
    true
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub total_steps: u32,
    /// Multiplier turning a per-step volume rate into a volume change.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_record_interval")]
    pub record_interval_steps: u32,
}

fn default_time_step() -> f64 {
    1.0
}

fn default_record_interval() -> u32 {
    1
}

// Initial conditions for the simulation, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    pub seed: u64,
}

/// Growth rule constants. Every field falls back to the tuned default.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GrowthRuleConfig {
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_shrink_floor_fraction")]
    pub shrink_floor_fraction: f64,
    #[serde(default = "default_equilibrium_delta")]
    pub equilibrium_delta: f64,
    #[serde(default)]
    pub balance_delta: f64,
}

impl Default for GrowthRuleConfig {
    fn default() -> Self {
        let rule = RuleParams::default();
        GrowthRuleConfig {
            scale_factor: rule.scale_factor,
            shrink_floor_fraction: rule.shrink_floor_fraction,
            equilibrium_delta: rule.equilibrium_delta,
            balance_delta: rule.balance_delta,
        }
    }
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_shrink_floor_fraction() -> f64 {
    0.7
}

fn default_equilibrium_delta() -> f64 {
    1.0
}

/// Constants of the permeability relation and the cooling cutoff.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ThermalConfig {
    #[serde(default = "default_activation_energy")]
    pub activation_energy: f64,
    #[serde(default = "default_gas_constant")]
    pub gas_constant: f64,
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature: f64,
    #[serde(default = "default_cooling_cutoff")]
    pub cooling_cutoff: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        let a = ArrheniusParams::default();
        ThermalConfig {
            activation_energy: a.activation_energy,
            gas_constant: a.gas_constant,
            reference_temperature: a.reference_temperature,
            cooling_cutoff: a.cooling_cutoff,
        }
    }
}

fn default_activation_energy() -> f64 {
    1.0
}

fn default_gas_constant() -> f64 {
    1.0
}

fn default_reference_temperature() -> f64 {
    274.0
}

fn default_cooling_cutoff() -> f64 {
    263.0
}

/// Which update rule a population's agents carry.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Basic,
    Thermal,
}

/// How the growth-rate coefficient of a population is obtained.
#[derive(Deserialize, Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthRateConfig {
    /// Use the value as is.
    Fixed { value: f64 },
    /// `permeability * area * gas_constant * (temperature - cooling_rate) * osmotic_difference`.
    /// Only meaningful for thermal populations.
    Derived { area: f64, osmotic_difference: f64 },
}

/// One block of identically parameterized agents.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationConfig {
    pub name: String,
    pub count: u32,
    pub diameter: f64,
    #[serde(default)]
    pub x_range: Option<(f64, f64)>,
    #[serde(default)]
    pub y_range: Option<(f64, f64)>,
    #[serde(default)]
    pub z_range: Option<(f64, f64)>,
    #[serde(default)]
    pub adherence: Option<f64>,
    pub rule: RuleKind,
    pub growth_rate: GrowthRateConfig,
    // Thermal parameters (required when rule == thermal)
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub cooling_rate: Option<f64>,
    #[serde(default)]
    pub initial_permeability: Option<f64>,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_stats: bool,
    #[serde(default)]
    pub save_final_state: bool,
    #[serde(default)]
    pub save_agents_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "cryo_cell".to_string(),
            save_stats: false,
            save_final_state: false,
            save_agents_in_snapshot: false,
            format: None,
        }
    }
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub universe: UniverseConfig,
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub growth_rule: GrowthRuleConfig,
    #[serde(default)]
    pub thermal: ThermalConfig,
    pub populations: Vec<PopulationConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e)
        })?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would build agents violating the growth preconditions.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = (self.universe.min_bound, self.universe.max_bound);
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            anyhow::bail!("universe bounds must be finite with max_bound > min_bound.");
        }
        if !(self.timing.time_step > 0.0) {
            anyhow::bail!("time_step must be positive.");
        }
        let fraction = self.growth_rule.shrink_floor_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            anyhow::bail!("shrink_floor_fraction must lie in (0, 1].");
        }
        if !(self.thermal.gas_constant > 0.0) {
            anyhow::bail!("gas_constant must be positive.");
        }
        if !(self.thermal.reference_temperature > 0.0) {
            anyhow::bail!("reference_temperature must be positive.");
        }
        if !self.thermal.cooling_cutoff.is_finite() || self.thermal.cooling_cutoff <= 0.0 {
            anyhow::bail!("cooling_cutoff must be finite and positive.");
        }
        let constants = [
            ("scale_factor", self.growth_rule.scale_factor),
            ("equilibrium_delta", self.growth_rule.equilibrium_delta),
            ("balance_delta", self.growth_rule.balance_delta),
            ("activation_energy", self.thermal.activation_energy),
            ("gas_constant", self.thermal.gas_constant),
            ("reference_temperature", self.thermal.reference_temperature),
        ];
        for (name, value) in constants {
            if !value.is_finite() {
                anyhow::bail!("{} must be finite.", name);
            }
        }
        if self.populations.is_empty() {
            anyhow::bail!("at least one population must be configured.");
        }

        for pop in &self.populations {
            if pop.count == 0 {
                anyhow::bail!("population '{}': count must be greater than 0.", pop.name);
            }
            if !pop.diameter.is_finite() || pop.diameter <= 0.0 {
                anyhow::bail!("population '{}': diameter must be positive.", pop.name);
            }
            for (axis, range) in [("x", pop.x_range), ("y", pop.y_range), ("z", pop.z_range)] {
                if let Some((a, b)) = range {
                    if a > b || a < lo || b > hi {
                        anyhow::bail!(
                            "population '{}': {}_range ({}, {}) must be ordered and inside \
                             [{}, {}].",
                            pop.name,
                            axis,
                            a,
                            b,
                            lo,
                            hi
                        );
                    }
                }
            }
            if let GrowthRateConfig::Fixed { value } = pop.growth_rate {
                if !value.is_finite() {
                    anyhow::bail!("population '{}': growth rate must be finite.", pop.name);
                }
            }

            match pop.rule {
                RuleKind::Thermal => {
                    let (Some(t), Some(cr), Some(lp)) =
                        (pop.temperature, pop.cooling_rate, pop.initial_permeability)
                    else {
                        anyhow::bail!(
                            "population '{}': thermal rule needs temperature, cooling_rate \
                             and initial_permeability.",
                            pop.name
                        );
                    };
                    if !(t > 0.0) || !(cr > 0.0) || !lp.is_finite() {
                        anyhow::bail!(
                            "population '{}': temperature and cooling_rate must be positive.",
                            pop.name
                        );
                    }
                }
                RuleKind::Basic => {
                    if matches!(pop.growth_rate, GrowthRateConfig::Derived { .. }) {
                        anyhow::bail!(
                            "population '{}': a derived growth rate requires the thermal rule.",
                            pop.name
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        SimParams {
            min_bound: self.universe.min_bound,
            max_bound: self.universe.max_bound,
            time_step: self.timing.time_step,
            rule: RuleParams {
                scale_factor: self.growth_rule.scale_factor,
                shrink_floor_fraction: self.growth_rule.shrink_floor_fraction,
                equilibrium_delta: self.growth_rule.equilibrium_delta,
                balance_delta: self.growth_rule.balance_delta,
            },
            arrhenius: ArrheniusParams {
                activation_energy: self.thermal.activation_energy,
                gas_constant: self.thermal.gas_constant,
                reference_temperature: self.thermal.reference_temperature,
                cooling_cutoff: self.thermal.cooling_cutoff,
            },
            min_volume: MIN_AGENT_VOLUME,
        }
    }

    /// Total number of agents across all populations.
    pub fn total_agents(&self) -> usize {
        self.populations.iter().map(|p| p.count as usize).sum()
    }
}
