pub mod config;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    SimulationConfig, UniverseConfig, TimingConfig, InitialConditions, GrowthRuleConfig,
    ThermalConfig, PopulationConfig, RuleKind, GrowthRateConfig, OutputConfig,
};
pub use sim_params::{SimParams, RuleParams, ArrheniusParams, MIN_AGENT_VOLUME};
pub use snapshot::{Snapshot, AgentRecord};
pub use vecmath::{Vec3, clamp};
